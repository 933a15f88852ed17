//! Persistence for review records.
//!
//! The pipeline needs four primitives, each transactional per call and
//! idempotent under retry. Cleanup runs only after successful validation
//! and persistence, never before.

use std::collections::BTreeSet;

use async_trait::async_trait;

use crate::error::Result;
use crate::types::ReviewRecord;

pub mod memory;
pub mod sqlite;

pub use memory::MemoryStore;
pub use sqlite::SqliteStore;

#[async_trait]
pub trait Store: Send + Sync {
    /// The persisted row for a slug, if any. Surfaces `StoreCorruption`
    /// if more than one row exists.
    async fn get(&self, slug: &str) -> Result<Option<ReviewRecord>>;

    /// Insert or replace the row for the record's slug.
    async fn upsert(&self, record: &ReviewRecord) -> Result<()>;

    /// Every persisted row, slug-ordered.
    async fn all(&self) -> Result<Vec<ReviewRecord>>;

    /// Prune rows whose slug is no longer in the current snapshot.
    async fn delete_all_except(&self, keep: &BTreeSet<String>) -> Result<()>;
}
