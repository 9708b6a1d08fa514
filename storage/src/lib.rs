//! Storage crate: backup documents, document stores, and the on-device SMS inbox.
//!
//! ## Modules
//!
//! - [`error`] – Storage error types
//! - [`models`] – MessageRecord (with derived key), InboxRow
//! - [`repository`] – DocumentStore trait
//! - [`writer`] – StoreWriter, the awaited / detached / callback write paths
//! - [`sqlite_store`] – SqliteDocumentStore (local mirror)
//! - [`firestore`] – FirestoreStore (Cloud Firestore REST)
//! - [`memory_store`] – InMemoryDocumentStore
//! - [`inbox`] – SmsInbox trait, SqliteInbox, EmptyInbox
//! - [`sqlite_pool`] – SqlitePoolManager

mod error;
mod firestore;
mod inbox;
mod memory_store;
mod models;
mod repository;
mod sqlite_pool;
mod sqlite_store;
mod writer;

#[cfg(test)]
mod sqlite_store_test;

pub use error::StorageError;
pub use firestore::{
    FirestoreConfig, FirestoreStore, FIRESTORE_DEFAULT_BASE_URL, FIRESTORE_DEFAULT_DATABASE,
};
pub use inbox::{EmptyInbox, SmsInbox, SqliteInbox};
pub use memory_store::InMemoryDocumentStore;
pub use models::{derived_key, format_local_date, InboxRow, MessageRecord, SENDER_PREFIX_LEN};
pub use repository::DocumentStore;
pub use sqlite_pool::SqlitePoolManager;
pub use sqlite_store::SqliteDocumentStore;
pub use writer::{StoreWriter, WriteOutcome, DEFAULT_COLLECTION};
