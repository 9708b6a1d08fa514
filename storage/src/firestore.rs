//! Cloud Firestore document store over the REST API.
//!
//! Writes are `PATCH {base}/v1/projects/{project}/databases/{db}/documents/{collection}/{key}`
//! with typed `fields`, which creates or fully replaces the document. Lookups are `GET` on the
//! same URL; 404 means absent.
//!
//! Authentication is an API key (`?key=`), a bearer token, or both.

use crate::error::StorageError;
use crate::models::MessageRecord;
use crate::repository::DocumentStore;
use async_trait::async_trait;
use reqwest::{Client, StatusCode, Url};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

pub const FIRESTORE_DEFAULT_BASE_URL: &str = "https://firestore.googleapis.com";
pub const FIRESTORE_DEFAULT_DATABASE: &str = "(default)";

#[derive(Debug, Clone)]
pub struct FirestoreConfig {
    pub base_url: String,
    pub project_id: String,
    pub database: String,
    pub api_key: Option<String>,
    pub bearer_token: Option<String>,
}

impl FirestoreConfig {
    pub fn new(project_id: &str) -> Self {
        Self {
            base_url: FIRESTORE_DEFAULT_BASE_URL.to_string(),
            project_id: project_id.to_string(),
            database: FIRESTORE_DEFAULT_DATABASE.to_string(),
            api_key: None,
            bearer_token: None,
        }
    }

    pub fn with_base_url(mut self, base_url: &str) -> Self {
        self.base_url = base_url.to_string();
        self
    }

    pub fn with_api_key(mut self, api_key: Option<String>) -> Self {
        self.api_key = api_key;
        self
    }

    pub fn with_bearer_token(mut self, bearer_token: Option<String>) -> Self {
        self.bearer_token = bearer_token;
        self
    }
}

#[derive(Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct StringValue {
    #[serde(default)]
    string_value: String,
}

/// Firestore encodes int64 as a decimal string.
#[derive(Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct IntegerValue {
    #[serde(default)]
    integer_value: String,
}

#[derive(Debug, Default, Serialize, Deserialize)]
struct Fields {
    #[serde(default)]
    sender: StringValue,
    #[serde(default)]
    message: StringValue,
    #[serde(default)]
    timestamp: IntegerValue,
    #[serde(default)]
    date: StringValue,
}

#[derive(Debug, Serialize, Deserialize)]
struct Document {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    name: Option<String>,
    #[serde(default)]
    fields: Fields,
}

impl From<&MessageRecord> for Document {
    fn from(record: &MessageRecord) -> Self {
        Self {
            name: None,
            fields: Fields {
                sender: StringValue {
                    string_value: record.sender.clone(),
                },
                message: StringValue {
                    string_value: record.message.clone(),
                },
                timestamp: IntegerValue {
                    integer_value: record.timestamp.to_string(),
                },
                date: StringValue {
                    string_value: record.date.clone(),
                },
            },
        }
    }
}

impl TryFrom<Document> for MessageRecord {
    type Error = StorageError;

    fn try_from(doc: Document) -> Result<Self, Self::Error> {
        let timestamp = doc.fields.timestamp.integer_value.parse().map_err(|_| {
            StorageError::Serialization(format!(
                "invalid integerValue for timestamp: {:?}",
                doc.fields.timestamp.integer_value
            ))
        })?;
        Ok(MessageRecord {
            sender: doc.fields.sender.string_value,
            message: doc.fields.message.string_value,
            timestamp,
            date: doc.fields.date.string_value,
        })
    }
}

/// Firestore REST implementation of [`DocumentStore`].
#[derive(Debug, Clone)]
pub struct FirestoreStore {
    client: Client,
    config: FirestoreConfig,
}

impl FirestoreStore {
    pub fn new(config: FirestoreConfig) -> Result<Self, StorageError> {
        Url::parse(&config.base_url)
            .map_err(|e| StorageError::Config(format!("invalid Firestore base URL: {}", e)))?;
        let client = Client::builder().build()?;
        Ok(Self { client, config })
    }

    fn document_url(&self, collection: &str, key: &str) -> Result<Url, StorageError> {
        let mut url = Url::parse(&self.config.base_url)
            .map_err(|e| StorageError::Config(format!("invalid Firestore base URL: {}", e)))?;
        url.path_segments_mut()
            .map_err(|_| StorageError::Config("Firestore base URL cannot be a base".to_string()))?
            .pop_if_empty()
            .extend([
                "v1",
                "projects",
                self.config.project_id.as_str(),
                "databases",
                self.config.database.as_str(),
                "documents",
                collection,
                key,
            ]);
        if let Some(api_key) = &self.config.api_key {
            url.query_pairs_mut().append_pair("key", api_key);
        }
        Ok(url)
    }

    fn authorize(&self, request: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        match &self.config.bearer_token {
            Some(token) => request.bearer_auth(token),
            None => request,
        }
    }
}

#[async_trait]
impl DocumentStore for FirestoreStore {
    async fn upsert(
        &self,
        collection: &str,
        key: &str,
        record: &MessageRecord,
    ) -> Result<(), StorageError> {
        let url = self.document_url(collection, key)?;
        debug!(url = %url, "step: Firestore PATCH document");

        let response = self
            .authorize(self.client.patch(url))
            .json(&Document::from(record))
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(StorageError::Remote {
                status: status.as_u16(),
                body,
            });
        }

        info!(collection = %collection, key = %key, "Firestore document written");
        Ok(())
    }

    async fn find_by_key(
        &self,
        collection: &str,
        key: &str,
    ) -> Result<Option<MessageRecord>, StorageError> {
        let url = self.document_url(collection, key)?;
        debug!(url = %url, "step: Firestore GET document");

        let response = self.authorize(self.client.get(url)).send().await?;

        let status = response.status();
        if status == StatusCode::NOT_FOUND {
            return Ok(None);
        }
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(StorageError::Remote {
                status: status.as_u16(),
                body,
            });
        }

        let doc: Document = response.json().await?;
        MessageRecord::try_from(doc).map(Some)
    }

    fn backend(&self) -> &'static str {
        "firestore"
    }
}
