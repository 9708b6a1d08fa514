//! SQLite document store: a local mirror of the backup collection.
//!
//! Uses SqlitePoolManager; documents live in one `documents` table keyed by (collection, id).
//! Upserts replace the whole document, so a colliding key keeps the last write.

use crate::error::StorageError;
use crate::models::MessageRecord;
use crate::repository::DocumentStore;
use crate::sqlite_pool::SqlitePoolManager;
use async_trait::async_trait;
use chrono::Utc;
use tracing::{debug, info};

#[derive(Debug, sqlx::FromRow)]
struct DocumentRow {
    id: String,
    sender: String,
    message: String,
    timestamp: i64,
    date: String,
}

#[derive(Clone)]
pub struct SqliteDocumentStore {
    pool_manager: SqlitePoolManager,
}

impl SqliteDocumentStore {
    pub async fn new(database_path: &str) -> Result<Self, StorageError> {
        let pool_manager = SqlitePoolManager::new(database_path).await?;
        let store = Self { pool_manager };
        store.init().await?;
        Ok(store)
    }

    async fn init(&self) -> Result<(), sqlx::Error> {
        info!("Creating document tables if not exist");

        let pool = self.pool_manager.pool();

        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS documents (
                collection TEXT NOT NULL,
                id TEXT NOT NULL,
                sender TEXT NOT NULL,
                message TEXT NOT NULL,
                timestamp INTEGER NOT NULL,
                date TEXT NOT NULL,
                updated_at TEXT NOT NULL,
                PRIMARY KEY (collection, id)
            )
            "#,
        )
        .execute(pool)
        .await?;

        sqlx::query(
            r#"
            CREATE INDEX IF NOT EXISTS idx_documents_timestamp ON documents(timestamp);
            CREATE INDEX IF NOT EXISTS idx_documents_sender ON documents(sender);
            "#,
        )
        .execute(pool)
        .await?;

        info!("Document tables created successfully");
        Ok(())
    }

    /// Documents of `collection` in ascending id order, i.e. newest message first.
    pub async fn list(
        &self,
        collection: &str,
        limit: i64,
    ) -> Result<Vec<(String, MessageRecord)>, StorageError> {
        let pool = self.pool_manager.pool();

        let rows: Vec<DocumentRow> = sqlx::query_as::<_, DocumentRow>(
            "SELECT id, sender, message, timestamp, date FROM documents WHERE collection = ? ORDER BY id ASC LIMIT ?",
        )
        .bind(collection)
        .bind(limit)
        .fetch_all(pool)
        .await?;

        info!(collection = %collection, count = rows.len(), "Listed documents");

        Ok(rows
            .into_iter()
            .map(|row| {
                (
                    row.id,
                    MessageRecord {
                        sender: row.sender,
                        message: row.message,
                        timestamp: row.timestamp,
                        date: row.date,
                    },
                )
            })
            .collect())
    }

    pub async fn count(&self, collection: &str) -> Result<i64, StorageError> {
        let pool = self.pool_manager.pool();
        let total: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM documents WHERE collection = ?")
            .bind(collection)
            .fetch_one(pool)
            .await?;
        Ok(total.0)
    }
}

#[async_trait]
impl DocumentStore for SqliteDocumentStore {
    async fn upsert(
        &self,
        collection: &str,
        key: &str,
        record: &MessageRecord,
    ) -> Result<(), StorageError> {
        let pool = self.pool_manager.pool();

        sqlx::query(
            r#"
            INSERT INTO documents (collection, id, sender, message, timestamp, date, updated_at)
            VALUES (?, ?, ?, ?, ?, ?, ?)
            ON CONFLICT(collection, id) DO UPDATE SET
                sender = excluded.sender,
                message = excluded.message,
                timestamp = excluded.timestamp,
                date = excluded.date,
                updated_at = excluded.updated_at
            "#,
        )
        .bind(collection)
        .bind(key)
        .bind(&record.sender)
        .bind(&record.message)
        .bind(record.timestamp)
        .bind(&record.date)
        .bind(Utc::now())
        .execute(pool)
        .await?;

        debug!(collection = %collection, key = %key, "Upserted document");
        Ok(())
    }

    async fn find_by_key(
        &self,
        collection: &str,
        key: &str,
    ) -> Result<Option<MessageRecord>, StorageError> {
        let pool = self.pool_manager.pool();

        let record = sqlx::query_as::<_, MessageRecord>(
            "SELECT sender, message, timestamp, date FROM documents WHERE collection = ? AND id = ?",
        )
        .bind(collection)
        .bind(key)
        .fetch_optional(pool)
        .await?;

        Ok(record)
    }

    fn backend(&self) -> &'static str {
        "sqlite"
    }
}
