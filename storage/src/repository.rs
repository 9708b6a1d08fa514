use async_trait::async_trait;

use crate::error::StorageError;
use crate::models::MessageRecord;

/// A keyed document collection. `upsert` replaces any document already stored under `key`.
#[async_trait]
pub trait DocumentStore: Send + Sync {
    async fn upsert(
        &self,
        collection: &str,
        key: &str,
        record: &MessageRecord,
    ) -> Result<(), StorageError>;

    async fn find_by_key(
        &self,
        collection: &str,
        key: &str,
    ) -> Result<Option<MessageRecord>, StorageError>;

    /// Short backend name for logs.
    fn backend(&self) -> &'static str;
}
