//! In-memory document store for dry runs and tests.

use crate::error::StorageError;
use crate::models::MessageRecord;
use crate::repository::DocumentStore;
use async_trait::async_trait;
use std::collections::BTreeMap;
use tokio::sync::RwLock;

/// Collections keyed by name, documents kept in ascending id order.
#[derive(Default)]
pub struct InMemoryDocumentStore {
    collections: RwLock<BTreeMap<String, BTreeMap<String, MessageRecord>>>,
}

impl InMemoryDocumentStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Documents of `collection` in ascending id order.
    pub async fn list(&self, collection: &str) -> Vec<(String, MessageRecord)> {
        self.collections
            .read()
            .await
            .get(collection)
            .map(|docs| docs.iter().map(|(k, v)| (k.clone(), v.clone())).collect())
            .unwrap_or_default()
    }

    pub async fn len(&self, collection: &str) -> usize {
        self.collections
            .read()
            .await
            .get(collection)
            .map_or(0, |docs| docs.len())
    }
}

#[async_trait]
impl DocumentStore for InMemoryDocumentStore {
    async fn upsert(
        &self,
        collection: &str,
        key: &str,
        record: &MessageRecord,
    ) -> Result<(), StorageError> {
        self.collections
            .write()
            .await
            .entry(collection.to_string())
            .or_default()
            .insert(key.to_string(), record.clone());
        Ok(())
    }

    async fn find_by_key(
        &self,
        collection: &str,
        key: &str,
    ) -> Result<Option<MessageRecord>, StorageError> {
        Ok(self
            .collections
            .read()
            .await
            .get(collection)
            .and_then(|docs| docs.get(key).cloned()))
    }

    fn backend(&self) -> &'static str {
        "memory"
    }
}
