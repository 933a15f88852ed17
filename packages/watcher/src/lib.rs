//! boundary-watch: tracks local-government boundary reviews on the
//! commission website, detects lifecycle transitions against the
//! previously persisted snapshot, and notifies chat and issue-tracker
//! sinks.
//!
//! Run shape: index snapshot → attach per-page detail → validate → plan
//! notifications → persist → dispatch → prune stale rows. Any structural
//! or lifecycle violation aborts the run before the store is touched.

pub mod config;
pub mod detail;
pub mod error;
pub mod export;
pub mod fetch;
pub mod index;
pub mod notify;
pub mod pipeline;
pub mod reconcile;
pub mod store;
pub mod types;
pub mod validate;

pub use config::Config;
pub use error::{Invariant, Result, WatchError};
pub use notify::{NotificationEvent, Sinks};
pub use pipeline::{RunOptions, RunSummary};
pub use types::{PageDetail, ReviewRecord, ReviewStatus, Snapshot};
