//! Base config: logging, document store, on-device inbox. Loaded from env.

use anyhow::Result;
use std::env;
use std::fmt;
use std::str::FromStr;
use storage::{DEFAULT_COLLECTION, FIRESTORE_DEFAULT_BASE_URL, FIRESTORE_DEFAULT_DATABASE};

/// Which [`storage::DocumentStore`] receives the backup.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreBackend {
    Firestore,
    Sqlite,
    Memory,
}

impl FromStr for StoreBackend {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "firestore" => Ok(StoreBackend::Firestore),
            "sqlite" => Ok(StoreBackend::Sqlite),
            "memory" => Ok(StoreBackend::Memory),
            other => anyhow::bail!(
                "STORE_BACKEND must be one of firestore, sqlite, memory (got {})",
                other
            ),
        }
    }
}

impl fmt::Display for StoreBackend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            StoreBackend::Firestore => "firestore",
            StoreBackend::Sqlite => "sqlite",
            StoreBackend::Memory => "memory",
        };
        f.write_str(name)
    }
}

/// Firestore REST connection settings.
#[derive(Debug, Clone)]
pub struct FirestoreSettings {
    /// FIRESTORE_PROJECT_ID
    pub project_id: Option<String>,
    /// FIRESTORE_DATABASE
    pub database: String,
    /// FIRESTORE_BASE_URL (points at the emulator or a mock server in tests)
    pub base_url: String,
    /// FIRESTORE_API_KEY
    pub api_key: Option<String>,
    /// FIRESTORE_BEARER_TOKEN
    pub bearer_token: Option<String>,
}

/// Base config: logging, store, inbox only.
#[derive(Debug, Clone)]
pub struct BaseConfig {
    /// LOG_FILE
    pub log_file: String,
    /// STORE_BACKEND
    pub store_backend: StoreBackend,
    /// STORE_COLLECTION
    pub collection: String,
    /// DATABASE_URL: SQLite file for the `sqlite` backend
    pub database_url: String,
    pub firestore: FirestoreSettings,
    /// SMS_INBOX_PATH: SQLite file with an Android-style `sms` table; unset means empty inbox
    pub inbox_path: Option<String>,
}

fn non_empty(key: &str) -> Option<String> {
    env::var(key).ok().filter(|s| !s.trim().is_empty())
}

impl BaseConfig {
    /// Load from environment variables.
    pub fn load() -> Result<Self> {
        let log_file =
            env::var("LOG_FILE").unwrap_or_else(|_| "logs/sms-backup.log".to_string());
        let store_backend = match non_empty("STORE_BACKEND") {
            Some(s) => s.parse()?,
            None => StoreBackend::Sqlite,
        };
        let collection =
            non_empty("STORE_COLLECTION").unwrap_or_else(|| DEFAULT_COLLECTION.to_string());
        let database_url =
            env::var("DATABASE_URL").unwrap_or_else(|_| "./data/sms_backup.db".to_string());
        let firestore = FirestoreSettings {
            project_id: non_empty("FIRESTORE_PROJECT_ID"),
            database: non_empty("FIRESTORE_DATABASE")
                .unwrap_or_else(|| FIRESTORE_DEFAULT_DATABASE.to_string()),
            base_url: non_empty("FIRESTORE_BASE_URL")
                .unwrap_or_else(|| FIRESTORE_DEFAULT_BASE_URL.to_string()),
            api_key: non_empty("FIRESTORE_API_KEY"),
            bearer_token: non_empty("FIRESTORE_BEARER_TOKEN"),
        };
        let inbox_path = non_empty("SMS_INBOX_PATH");

        Ok(Self {
            log_file,
            store_backend,
            collection,
            database_url,
            firestore,
            inbox_path,
        })
    }

    /// Validate config (e.g. Firestore needs a project id and a parseable base URL).
    pub fn validate(&self) -> Result<()> {
        if self.store_backend == StoreBackend::Firestore {
            if self.firestore.project_id.is_none() {
                anyhow::bail!("STORE_BACKEND=firestore requires FIRESTORE_PROJECT_ID");
            }
            if reqwest::Url::parse(&self.firestore.base_url).is_err() {
                anyhow::bail!(
                    "FIRESTORE_BASE_URL is set but not a valid URL: {}",
                    self.firestore.base_url
                );
            }
        }
        if self.collection.contains('/') {
            anyhow::bail!("STORE_COLLECTION must not contain '/': {}", self.collection);
        }
        Ok(())
    }
}
