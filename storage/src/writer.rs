//! Store writer: builds a [`MessageRecord`] and persists it under its derived key.
//!
//! One asynchronous write operation backs three call styles: awaited ([`StoreWriter::save`]),
//! fire-and-forget ([`StoreWriter::save_detached`]) and completion callback
//! ([`StoreWriter::save_with`]). Failures are logged and reported, never retried.

use crate::error::StorageError;
use crate::models::MessageRecord;
use crate::repository::DocumentStore;
use std::sync::Arc;
use tracing::{error, info, instrument};

/// Collection the backup writes into unless configured otherwise.
pub const DEFAULT_COLLECTION: &str = "sms_backups";

/// Result of one write.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WriteOutcome {
    Saved { key: String },
    Failed { key: String, error: String },
}

impl WriteOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, WriteOutcome::Saved { .. })
    }

    pub fn key(&self) -> &str {
        match self {
            WriteOutcome::Saved { key } | WriteOutcome::Failed { key, .. } => key,
        }
    }
}

/// Writes message records into one collection of an injected [`DocumentStore`].
#[derive(Clone)]
pub struct StoreWriter {
    store: Arc<dyn DocumentStore>,
    collection: String,
}

impl StoreWriter {
    pub fn new(store: Arc<dyn DocumentStore>, collection: impl Into<String>) -> Self {
        Self {
            store,
            collection: collection.into(),
        }
    }

    pub fn collection(&self) -> &str {
        &self.collection
    }

    pub fn store(&self) -> &Arc<dyn DocumentStore> {
        &self.store
    }

    /// Upserts `record` under its derived key and returns the key.
    pub async fn write(&self, record: &MessageRecord) -> Result<String, StorageError> {
        let key = record.key();
        self.store.upsert(&self.collection, &key, record).await?;
        Ok(key)
    }

    /// Builds and writes a record; every store error becomes [`WriteOutcome::Failed`].
    #[instrument(skip(self, body), fields(backend = self.store.backend()))]
    pub async fn save_outcome(&self, sender: &str, body: &str, timestamp: i64) -> WriteOutcome {
        let record = MessageRecord::new(sender, body, timestamp);
        match self.write(&record).await {
            Ok(key) => {
                info!(
                    collection = %self.collection,
                    key = %key,
                    "SMS saved successfully"
                );
                WriteOutcome::Saved { key }
            }
            Err(e) => {
                let key = record.key();
                error!(
                    collection = %self.collection,
                    key = %key,
                    error = %e,
                    "Error saving SMS"
                );
                WriteOutcome::Failed {
                    key,
                    error: e.to_string(),
                }
            }
        }
    }

    /// Awaitable variant: true when the document was written.
    pub async fn save(&self, sender: &str, body: &str, timestamp: i64) -> bool {
        self.save_outcome(sender, body, timestamp).await.is_success()
    }

    /// Spawns the write and hands its outcome to `on_complete`. Needs a tokio runtime.
    pub fn save_with<F>(&self, sender: &str, body: &str, timestamp: i64, on_complete: F)
    where
        F: FnOnce(WriteOutcome) + Send + 'static,
    {
        let writer = self.clone();
        let sender = sender.to_string();
        let body = body.to_string();
        tokio::spawn(async move {
            let outcome = writer.save_outcome(&sender, &body, timestamp).await;
            on_complete(outcome);
        });
    }

    /// Fire-and-forget variant: the outcome only reaches the log.
    pub fn save_detached(&self, sender: &str, body: &str, timestamp: i64) {
        self.save_with(sender, body, timestamp, |_| {});
    }
}
