//! On-device SMS inbox: read-only access to already stored messages for the historical sync.

use crate::error::StorageError;
use crate::models::InboxRow;
use crate::sqlite_pool::SqlitePoolManager;
use async_trait::async_trait;
use tracing::info;

#[async_trait]
pub trait SmsInbox: Send + Sync {
    /// Up to `limit` most recent messages, newest first.
    async fn recent(&self, limit: u32) -> Result<Vec<InboxRow>, StorageError>;
}

/// Reads an Android-style `sms` table (`address`, `body`, `date`) from a SQLite file.
#[derive(Clone)]
pub struct SqliteInbox {
    pool_manager: SqlitePoolManager,
}

impl SqliteInbox {
    /// Opens the message database read-only.
    pub async fn open(database_path: &str) -> Result<Self, StorageError> {
        let pool_manager = SqlitePoolManager::open_read_only(database_path).await?;
        Ok(Self { pool_manager })
    }

    pub fn with_pool(pool_manager: SqlitePoolManager) -> Self {
        Self { pool_manager }
    }
}

#[async_trait]
impl SmsInbox for SqliteInbox {
    async fn recent(&self, limit: u32) -> Result<Vec<InboxRow>, StorageError> {
        let pool = self.pool_manager.pool();

        let rows: Vec<InboxRow> = sqlx::query_as::<_, InboxRow>(
            "SELECT address, body, date FROM sms ORDER BY date DESC LIMIT ?",
        )
        .bind(i64::from(limit))
        .fetch_all(pool)
        .await?;

        info!(count = rows.len(), limit, "Read recent inbox messages");
        Ok(rows)
    }
}

/// Inbox with no messages, for hosts without a local message database.
#[derive(Debug, Clone, Copy, Default)]
pub struct EmptyInbox;

#[async_trait]
impl SmsInbox for EmptyInbox {
    async fn recent(&self, _limit: u32) -> Result<Vec<InboxRow>, StorageError> {
        Ok(Vec::new())
    }
}
