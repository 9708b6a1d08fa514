//! Integration tests for [`storage::FirestoreStore`] against a mockito server.
//!
//! Checks the request shape of upserts, error mapping, and document decoding on lookup.

use mockito::Matcher;
use storage::{DocumentStore, FirestoreConfig, FirestoreStore, MessageRecord, StorageError};

const DOC_PATH: &str =
    "/v1/projects/demo/databases/(default)/documents/sms_backups/9223370336854775807_12345";

fn store_for(server: &mockito::ServerGuard) -> FirestoreStore {
    FirestoreStore::new(
        FirestoreConfig::new("demo")
            .with_base_url(&server.url())
            .with_api_key(Some("test-key".to_string()))
            .with_bearer_token(Some("test-token".to_string())),
    )
    .expect("Failed to create store")
}

fn sample_record() -> MessageRecord {
    MessageRecord {
        sender: "12345".to_string(),
        message: "hello".to_string(),
        timestamp: 1_700_000_000_000,
        date: "2023-11-14 22:13:20".to_string(),
    }
}

/// **Test: Upsert PATCHes the derived-key document with typed fields and credentials.**
#[tokio::test]
async fn test_upsert_sends_patch() {
    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("PATCH", DOC_PATH)
        .match_query(Matcher::UrlEncoded("key".into(), "test-key".into()))
        .match_header("authorization", "Bearer test-token")
        .match_body(Matcher::PartialJson(serde_json::json!({
            "fields": {
                "sender": { "stringValue": "12345" },
                "message": { "stringValue": "hello" },
                "timestamp": { "integerValue": "1700000000000" }
            }
        })))
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body("{}")
        .create_async()
        .await;

    let store = store_for(&server);
    let record = sample_record();
    store
        .upsert("sms_backups", &record.key(), &record)
        .await
        .expect("upsert should succeed");

    mock.assert_async().await;
}

/// **Test: Non-2xx responses surface as StorageError::Remote with status and body.**
#[tokio::test]
async fn test_upsert_maps_rejection() {
    let mut server = mockito::Server::new_async().await;
    let _mock = server
        .mock("PATCH", DOC_PATH)
        .match_query(Matcher::Any)
        .with_status(403)
        .with_body("PERMISSION_DENIED")
        .create_async()
        .await;

    let store = store_for(&server);
    let record = sample_record();
    let err = store
        .upsert("sms_backups", &record.key(), &record)
        .await
        .unwrap_err();

    match err {
        StorageError::Remote { status, body } => {
            assert_eq!(status, 403);
            assert_eq!(body, "PERMISSION_DENIED");
        }
        other => panic!("unexpected error: {:?}", other),
    }
}

/// **Test: GET decodes a stored document back into a MessageRecord.**
#[tokio::test]
async fn test_find_by_key_decodes_document() {
    let mut server = mockito::Server::new_async().await;
    let _mock = server
        .mock("GET", DOC_PATH)
        .match_query(Matcher::Any)
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(
            r#"{
                "name": "projects/demo/databases/(default)/documents/sms_backups/9223370336854775807_12345",
                "fields": {
                    "sender": { "stringValue": "12345" },
                    "message": { "stringValue": "hello" },
                    "timestamp": { "integerValue": "1700000000000" },
                    "date": { "stringValue": "2023-11-14 22:13:20" }
                },
                "createTime": "2023-11-14T22:13:21.000000Z",
                "updateTime": "2023-11-14T22:13:21.000000Z"
            }"#,
        )
        .create_async()
        .await;

    let store = store_for(&server);
    let found = store
        .find_by_key("sms_backups", "9223370336854775807_12345")
        .await
        .unwrap();

    assert_eq!(found, Some(sample_record()));
}

/// **Test: 404 on GET means the document does not exist.**
#[tokio::test]
async fn test_find_by_key_not_found() {
    let mut server = mockito::Server::new_async().await;
    let _mock = server
        .mock("GET", DOC_PATH)
        .match_query(Matcher::Any)
        .with_status(404)
        .with_body(r#"{"error":{"code":404,"status":"NOT_FOUND"}}"#)
        .create_async()
        .await;

    let store = store_for(&server);
    let found = store
        .find_by_key("sms_backups", "9223370336854775807_12345")
        .await
        .unwrap();

    assert!(found.is_none());
}
