//! Integration tests for [`storage::StoreWriter`].
//!
//! Uses a mockall store to check keys, collection routing and error conversion, and the
//! in-memory store for the detached and callback paths.

use async_trait::async_trait;
use mockall::{mock, predicate::eq};
use std::sync::Arc;
use std::time::Duration;
use storage::{
    DocumentStore, InMemoryDocumentStore, MessageRecord, StorageError, StoreWriter, WriteOutcome,
    DEFAULT_COLLECTION,
};
use tokio::sync::oneshot;

mock! {
    pub Store {}

    #[async_trait]
    impl DocumentStore for Store {
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

        fn backend(&self) -> &'static str;
    }
}

/// **Test: save writes under the derived key in the configured collection.**
///
/// **Setup:** Mock store expecting exactly one upsert for ("sms_backups", "9223370336854775807_12345").
/// **Action:** `save("12345", "hello", 1700000000000)`.
/// **Expected:** true; the record carries sender, body and timestamp.
#[tokio::test]
async fn test_save_uses_derived_key() {
    let mut store = MockStore::new();
    store.expect_backend().return_const("mock");
    store
        .expect_upsert()
        .with(
            eq(DEFAULT_COLLECTION),
            eq("9223370336854775807_12345"),
            mockall::predicate::function(|r: &MessageRecord| {
                r.sender == "12345" && r.message == "hello" && r.timestamp == 1_700_000_000_000
            }),
        )
        .times(1)
        .returning(|_, _, _| Ok(()));

    let writer = StoreWriter::new(Arc::new(store), DEFAULT_COLLECTION);

    assert!(writer.save("12345", "hello", 1_700_000_000_000).await);
}

/// **Test: store errors become false / Failed, never a panic or Err.**
#[tokio::test]
async fn test_save_converts_store_error() {
    let mut store = MockStore::new();
    store.expect_backend().return_const("mock");
    store
        .expect_upsert()
        .times(2)
        .returning(|_, _, _| Err(StorageError::Http("connection reset".to_string())));

    let writer = StoreWriter::new(Arc::new(store), DEFAULT_COLLECTION);

    assert!(!writer.save("12345", "hello", 1).await);

    match writer.save_outcome("12345", "hello", 1).await {
        WriteOutcome::Failed { key, error } => {
            assert_eq!(key, "9223372036854775806_12345");
            assert!(error.contains("connection reset"));
        }
        other => panic!("unexpected outcome: {:?}", other),
    }
}

/// **Test: save_with reports the outcome through the callback.**
#[tokio::test]
async fn test_save_with_reports_outcome() {
    let store = Arc::new(InMemoryDocumentStore::new());
    let writer = StoreWriter::new(store.clone(), "custom");
    let (tx, rx) = oneshot::channel();

    writer.save_with("BANK", "balance", 99, move |outcome| {
        let _ = tx.send(outcome);
    });

    let outcome = tokio::time::timeout(Duration::from_secs(1), rx)
        .await
        .expect("callback not invoked")
        .unwrap();
    assert!(outcome.is_success());
    assert_eq!(outcome.key(), "9223372036854775708_BANK");
    assert_eq!(store.len("custom").await, 1);
}

/// **Test: save_detached eventually writes without the caller awaiting anything.**
#[tokio::test]
async fn test_save_detached_writes_in_background() {
    let store = Arc::new(InMemoryDocumentStore::new());
    let writer = StoreWriter::new(store.clone(), DEFAULT_COLLECTION);

    writer.save_detached("12345", "hello", 1_700_000_000_000);

    let mut written = false;
    for _ in 0..50 {
        if store.len(DEFAULT_COLLECTION).await == 1 {
            written = true;
            break;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    assert!(written);
}
