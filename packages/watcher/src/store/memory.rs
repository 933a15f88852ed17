//! In-memory store, used by tests and dry runs.

use std::collections::{BTreeMap, BTreeSet};
use std::sync::Mutex;

use async_trait::async_trait;

use crate::error::Result;
use crate::store::Store;
use crate::types::ReviewRecord;

#[derive(Debug, Default)]
pub struct MemoryStore {
    records: Mutex<BTreeMap<String, ReviewRecord>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed the store directly, bypassing the pipeline.
    pub fn seed(&self, records: Vec<ReviewRecord>) {
        let mut guard = self.records.lock().unwrap();
        for record in records {
            guard.insert(record.slug.clone(), record);
        }
    }
}

#[async_trait]
impl Store for MemoryStore {
    async fn get(&self, slug: &str) -> Result<Option<ReviewRecord>> {
        Ok(self.records.lock().unwrap().get(slug).cloned())
    }

    async fn upsert(&self, record: &ReviewRecord) -> Result<()> {
        self.records
            .lock()
            .unwrap()
            .insert(record.slug.clone(), record.clone());
        Ok(())
    }

    async fn all(&self) -> Result<Vec<ReviewRecord>> {
        Ok(self.records.lock().unwrap().values().cloned().collect())
    }

    async fn delete_all_except(&self, keep: &BTreeSet<String>) -> Result<()> {
        self.records
            .lock()
            .unwrap()
            .retain(|slug, _| keep.contains(slug));
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{ReviewRecord, ReviewStatus};

    fn record(slug: &str) -> ReviewRecord {
        ReviewRecord::new(
            slug.to_string(),
            slug.to_string(),
            format!("http://example.org/reviews/{}", slug),
            ReviewStatus::Current,
        )
    }

    #[tokio::test]
    async fn upsert_get_roundtrip_and_prune() {
        let store = MemoryStore::new();
        store.upsert(&record("babergh")).await.unwrap();
        store.upsert(&record("allerdale")).await.unwrap();

        assert_eq!(store.get("babergh").await.unwrap().unwrap().slug, "babergh");
        assert!(store.get("missing").await.unwrap().is_none());

        let keep: BTreeSet<String> = ["babergh".to_string()].into();
        store.delete_all_except(&keep).await.unwrap();

        let remaining = store.all().await.unwrap();
        assert_eq!(remaining.len(), 1);
        assert_eq!(remaining[0].slug, "babergh");
    }
}
