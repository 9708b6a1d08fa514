//! Unit tests for SqliteDocumentStore.
//!
//! Covers upsert/find_by_key, last-write-wins on key collision and newest-first listing.

use crate::models::{derived_key, MessageRecord};
use crate::repository::DocumentStore;
use crate::sqlite_store::SqliteDocumentStore;
use tempfile::TempDir;

async fn open_store(dir: &TempDir) -> SqliteDocumentStore {
    let path = dir.path().join("backup.db");
    SqliteDocumentStore::new(path.to_str().unwrap())
        .await
        .expect("Failed to create store")
}

#[tokio::test]
async fn test_upsert_and_find_by_key() {
    let dir = TempDir::new().unwrap();
    let store = open_store(&dir).await;

    let record = MessageRecord::new("12345", "hello", 1_700_000_000_000);
    store
        .upsert("sms_backups", &record.key(), &record)
        .await
        .expect("Failed to upsert");

    let found = store
        .find_by_key("sms_backups", "9223370336854775807_12345")
        .await
        .expect("Failed to query")
        .expect("Document missing");

    assert_eq!(found, record);
}

#[tokio::test]
async fn test_find_by_key_not_found() {
    let dir = TempDir::new().unwrap();
    let store = open_store(&dir).await;

    let found = store
        .find_by_key("sms_backups", "non-existent-key")
        .await
        .expect("Failed to query");

    assert!(found.is_none());
}

#[tokio::test]
async fn test_colliding_key_keeps_last_write() {
    let dir = TempDir::new().unwrap();
    let store = open_store(&dir).await;

    let first = MessageRecord::new("1234567", "first", 500);
    let second = MessageRecord::new("1234599", "second", 500);
    assert_eq!(first.key(), second.key());

    store.upsert("sms_backups", &first.key(), &first).await.unwrap();
    store.upsert("sms_backups", &second.key(), &second).await.unwrap();

    assert_eq!(store.count("sms_backups").await.unwrap(), 1);
    let found = store
        .find_by_key("sms_backups", &first.key())
        .await
        .unwrap()
        .unwrap();
    assert_eq!(found.message, "second");
    assert_eq!(found.sender, "1234599");
}

#[tokio::test]
async fn test_list_surfaces_newest_first() {
    let dir = TempDir::new().unwrap();
    let store = open_store(&dir).await;

    for (i, ts) in [1_600_000_000_000i64, 1_700_000_000_000, 1_650_000_000_000]
        .iter()
        .enumerate()
    {
        let record = MessageRecord::new("555", &format!("msg {}", i), *ts);
        store.upsert("sms_backups", &record.key(), &record).await.unwrap();
    }

    let docs = store.list("sms_backups", 10).await.unwrap();
    let timestamps: Vec<i64> = docs.iter().map(|(_, r)| r.timestamp).collect();

    assert_eq!(
        timestamps,
        vec![1_700_000_000_000, 1_650_000_000_000, 1_600_000_000_000]
    );
    assert_eq!(docs[0].0, derived_key(1_700_000_000_000, "555"));
}

#[tokio::test]
async fn test_list_respects_collection_and_limit() {
    let dir = TempDir::new().unwrap();
    let store = open_store(&dir).await;

    for ts in 0..5 {
        let record = MessageRecord::new("a", "x", ts);
        store.upsert("one", &record.key(), &record).await.unwrap();
    }
    let other = MessageRecord::new("b", "y", 1);
    store.upsert("two", &other.key(), &other).await.unwrap();

    assert_eq!(store.list("one", 3).await.unwrap().len(), 3);
    assert_eq!(store.count("one").await.unwrap(), 5);
    assert_eq!(store.count("two").await.unwrap(), 1);
}
