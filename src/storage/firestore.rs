//! `FirestoreStore` - Document Storage over the Firestore REST API
//!
//! `TigerStyle`: Production backend, feature-gated.
//!
//! Requires the `firestore` feature flag:
//! ```toml
//! mindmap-storage = { version = "0.1", features = ["firestore"] }
//! ```
//!
//! Talks to `https://firestore.googleapis.com/v1` by default; point
//! `with_base_url` at a local emulator for development. Credential
//! discovery is outside this crate; callers pass a ready OAuth bearer
//! token (or none, for emulators).

use std::collections::HashMap;
use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::constants::{FIRESTORE_LIST_PAGE_SIZE_COUNT, FIRESTORE_REQUEST_TIMEOUT_MS};

use super::backend::{DocumentStore, RecordStore};
use super::error::{StorageError, StorageResult};
use super::record::{Document, Record, RECORD_ID_FIELD};

// =============================================================================
// Constants
// =============================================================================

/// Default Firestore REST endpoint
const FIRESTORE_API_URL: &str = "https://firestore.googleapis.com/v1";

/// Default database id within a project
const DEFAULT_DATABASE_ID: &str = "(default)";

// =============================================================================
// Wire Types
// =============================================================================

/// A Firestore typed value.
///
/// Firestore's REST API wraps every field value in a single-variant object
/// naming its type. Only the variants this crate produces are modeled.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
enum FirestoreValue {
    NullValue(Option<()>),
    BooleanValue(bool),
    /// Integers travel as decimal strings
    IntegerValue(String),
    DoubleValue(f64),
    StringValue(String),
    TimestampValue(String),
    ArrayValue(FirestoreArray),
    MapValue(FirestoreMap),
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct FirestoreArray {
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    values: Vec<FirestoreValue>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct FirestoreMap {
    #[serde(default, skip_serializing_if = "HashMap::is_empty")]
    fields: HashMap<String, FirestoreValue>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct FirestoreDocument {
    /// Full resource name: projects/{p}/databases/{d}/documents/{coll}/{id}
    #[serde(default, skip_serializing_if = "String::is_empty")]
    name: String,
    #[serde(default, skip_serializing_if = "HashMap::is_empty")]
    fields: HashMap<String, FirestoreValue>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ListDocumentsResponse {
    #[serde(default)]
    documents: Vec<FirestoreDocument>,
    next_page_token: Option<String>,
}

#[derive(Debug, Deserialize)]
struct FirestoreErrorBody {
    error: FirestoreErrorDetail,
}

#[derive(Debug, Deserialize)]
struct FirestoreErrorDetail {
    message: String,
    #[serde(default)]
    status: Option<String>,
}

// =============================================================================
// Value Mapping
// =============================================================================

fn json_to_firestore(value: &Value) -> FirestoreValue {
    match value {
        Value::Null => FirestoreValue::NullValue(None),
        Value::Bool(b) => FirestoreValue::BooleanValue(*b),
        Value::Number(n) => {
            if let Some(i) = n.as_i64() {
                FirestoreValue::IntegerValue(i.to_string())
            } else {
                FirestoreValue::DoubleValue(n.as_f64().unwrap_or(f64::NAN))
            }
        }
        Value::String(s) => FirestoreValue::StringValue(s.clone()),
        Value::Array(items) => FirestoreValue::ArrayValue(FirestoreArray {
            values: items.iter().map(json_to_firestore).collect(),
        }),
        Value::Object(map) => FirestoreValue::MapValue(FirestoreMap {
            fields: map
                .iter()
                .map(|(k, v)| (k.clone(), json_to_firestore(v)))
                .collect(),
        }),
    }
}

fn firestore_to_json(value: &FirestoreValue) -> Value {
    match value {
        FirestoreValue::NullValue(_) => Value::Null,
        FirestoreValue::BooleanValue(b) => Value::Bool(*b),
        FirestoreValue::IntegerValue(s) => s
            .parse::<i64>()
            .map_or_else(|_| Value::String(s.clone()), Value::from),
        FirestoreValue::DoubleValue(d) => {
            serde_json::Number::from_f64(*d).map_or(Value::Null, Value::Number)
        }
        FirestoreValue::StringValue(s) | FirestoreValue::TimestampValue(s) => {
            Value::String(s.clone())
        }
        FirestoreValue::ArrayValue(arr) => {
            Value::Array(arr.values.iter().map(firestore_to_json).collect())
        }
        FirestoreValue::MapValue(map) => Value::Object(
            map.fields
                .iter()
                .map(|(k, v)| (k.clone(), firestore_to_json(v)))
                .collect(),
        ),
    }
}

fn record_to_fields(record: &Record) -> HashMap<String, FirestoreValue> {
    record
        .iter()
        .filter(|(name, _)| name.as_str() != RECORD_ID_FIELD)
        .map(|(name, value)| (name.clone(), json_to_firestore(value)))
        .collect()
}

fn fields_to_record(fields: &HashMap<String, FirestoreValue>) -> Record {
    let mut record = Record::new();
    for (name, value) in fields {
        record.set(name.clone(), firestore_to_json(value));
    }
    record
}

/// Extract the document id from a full resource name.
fn document_id(name: &str) -> &str {
    name.rsplit('/').next().unwrap_or(name)
}

// =============================================================================
// FirestoreStore
// =============================================================================

/// Firestore document backend for production use.
///
/// `TigerStyle`: Explicit configuration, typed wire structs, status-mapped
/// errors.
///
/// # Example
///
/// ```rust,ignore
/// let store = FirestoreStore::new("mindmap-platform")
///     .with_auth_token(token);
/// let doc = store.read("mood_entries", "abc").await?;
/// ```
#[derive(Debug, Clone)]
pub struct FirestoreStore {
    /// HTTP client
    client: reqwest::Client,
    /// GCP project id
    project_id: String,
    /// Database id within the project
    database_id: String,
    /// OAuth bearer token, absent for emulator use
    auth_token: Option<String>,
    /// API base URL (override for emulators)
    base_url: String,
}

impl FirestoreStore {
    /// Create a new `FirestoreStore` for the given project.
    ///
    /// # Panics
    /// Panics if the HTTP client cannot be constructed.
    #[must_use]
    pub fn new(project_id: impl Into<String>) -> Self {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_millis(FIRESTORE_REQUEST_TIMEOUT_MS))
            .build()
            .expect("failed to build HTTP client");

        Self {
            client,
            project_id: project_id.into(),
            database_id: DEFAULT_DATABASE_ID.to_string(),
            auth_token: None,
            base_url: FIRESTORE_API_URL.to_string(),
        }
    }

    /// Set the OAuth bearer token.
    #[must_use]
    pub fn with_auth_token(mut self, token: impl Into<String>) -> Self {
        self.auth_token = Some(token.into());
        self
    }

    /// Use a non-default database within the project.
    #[must_use]
    pub fn with_database_id(mut self, database_id: impl Into<String>) -> Self {
        self.database_id = database_id.into();
        self
    }

    /// Set a custom base URL (Firestore emulator, proxies).
    #[must_use]
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into();
        self
    }

    /// Get the project id.
    #[must_use]
    pub fn project_id(&self) -> &str {
        &self.project_id
    }

    fn collection_url(&self, collection: &str) -> String {
        format!(
            "{}/projects/{}/databases/{}/documents/{}",
            self.base_url, self.project_id, self.database_id, collection
        )
    }

    fn document_url(&self, collection: &str, id: &str) -> String {
        format!("{}/{}", self.collection_url(collection), id)
    }

    fn request(&self, method: reqwest::Method, url: &str) -> reqwest::RequestBuilder {
        let mut builder = self.client.request(method, url);
        if let Some(token) = &self.auth_token {
            builder = builder.header("Authorization", format!("Bearer {token}"));
        }
        builder
    }

    /// Map a non-success response to a storage error.
    fn parse_error(status: reqwest::StatusCode, body: &str, id: &str) -> StorageError {
        if let Ok(err) = serde_json::from_str::<FirestoreErrorBody>(body) {
            return match err.error.status.as_deref() {
                Some("NOT_FOUND") => StorageError::not_found(id),
                Some("ALREADY_EXISTS") => StorageError::already_exists(id),
                Some("UNAUTHENTICATED" | "PERMISSION_DENIED") => {
                    StorageError::connection(err.error.message)
                }
                _ => StorageError::query(err.error.message),
            };
        }

        match status {
            reqwest::StatusCode::NOT_FOUND => StorageError::not_found(id),
            reqwest::StatusCode::CONFLICT => StorageError::already_exists(id),
            reqwest::StatusCode::UNAUTHORIZED | reqwest::StatusCode::FORBIDDEN => {
                StorageError::connection(format!("HTTP {status}"))
            }
            reqwest::StatusCode::SERVICE_UNAVAILABLE | reqwest::StatusCode::BAD_GATEWAY => {
                StorageError::connection(format!("Firestore unavailable: HTTP {status}"))
            }
            _ => StorageError::query(format!("HTTP {status}: {body}")),
        }
    }

    fn transport_error(e: &reqwest::Error) -> StorageError {
        if e.is_timeout() || e.is_connect() {
            StorageError::connection(e.to_string())
        } else {
            StorageError::query(e.to_string())
        }
    }

    async fn parse_document(response: reqwest::Response, id: &str) -> StorageResult<Record> {
        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| Self::transport_error(&e))?;

        if !status.is_success() {
            return Err(Self::parse_error(status, &body, id));
        }

        let document: FirestoreDocument = serde_json::from_str(&body)
            .map_err(|e| StorageError::serialization(format!("bad document body: {e}")))?;

        let mut record = fields_to_record(&document.fields);
        record.set(RECORD_ID_FIELD, document_id(&document.name));
        Ok(record)
    }
}

// =============================================================================
// RecordStore Implementation
// =============================================================================

#[async_trait]
impl RecordStore for FirestoreStore {
    #[tracing::instrument(skip(self, data))]
    async fn create(&self, collection: &str, data: &Record) -> StorageResult<Record> {
        let mut url = self.collection_url(collection);
        if let Some(supplied) = data.id() {
            url = format!("{url}?documentId={supplied}");
        }

        let body = FirestoreDocument {
            name: String::new(),
            fields: record_to_fields(data),
        };

        let response = self
            .request(reqwest::Method::POST, &url)
            .json(&body)
            .send()
            .await
            .map_err(|e| Self::transport_error(&e))?;

        Self::parse_document(response, data.id().unwrap_or_default()).await
    }

    #[tracing::instrument(skip(self))]
    async fn read(&self, collection: &str, id: &str) -> StorageResult<Option<Record>> {
        let url = self.document_url(collection, id);

        let response = self
            .request(reqwest::Method::GET, &url)
            .send()
            .await
            .map_err(|e| Self::transport_error(&e))?;

        if response.status() == reqwest::StatusCode::NOT_FOUND {
            return Ok(None);
        }

        Ok(Some(Self::parse_document(response, id).await?))
    }

    #[tracing::instrument(skip(self, data))]
    async fn update(&self, collection: &str, id: &str, data: &Record) -> StorageResult<Record> {
        // Patch only the supplied field paths; require the document to exist
        let mut url = format!(
            "{}?currentDocument.exists=true",
            self.document_url(collection, id)
        );
        for (name, _) in data.iter().filter(|(n, _)| n.as_str() != RECORD_ID_FIELD) {
            url.push_str(&format!("&updateMask.fieldPaths={name}"));
        }

        let body = FirestoreDocument {
            name: String::new(),
            fields: record_to_fields(data),
        };

        let response = self
            .request(reqwest::Method::PATCH, &url)
            .json(&body)
            .send()
            .await
            .map_err(|e| Self::transport_error(&e))?;

        Self::parse_document(response, id).await
    }

    #[tracing::instrument(skip(self))]
    async fn delete(&self, collection: &str, id: &str) -> StorageResult<bool> {
        // The exists precondition turns "already gone" into a 404
        let url = format!(
            "{}?currentDocument.exists=true",
            self.document_url(collection, id)
        );

        let response = self
            .request(reqwest::Method::DELETE, &url)
            .send()
            .await
            .map_err(|e| Self::transport_error(&e))?;

        let status = response.status();
        if status.is_success() {
            return Ok(true);
        }

        let body = response
            .text()
            .await
            .map_err(|e| Self::transport_error(&e))?;
        match Self::parse_error(status, &body, id) {
            StorageError::NotFound { .. } => Ok(false),
            err => Err(err),
        }
    }
}

// =============================================================================
// DocumentStore Implementation
// =============================================================================

#[async_trait]
impl DocumentStore for FirestoreStore {
    /// Enumerate the whole collection, page by page, fully materialized.
    #[tracing::instrument(skip(self))]
    async fn list_documents(&self, collection: &str) -> StorageResult<Vec<Document>> {
        let base_url = self.collection_url(collection);
        let mut documents = Vec::new();
        let mut page_token: Option<String> = None;

        loop {
            let mut url = format!("{base_url}?pageSize={FIRESTORE_LIST_PAGE_SIZE_COUNT}");
            if let Some(token) = &page_token {
                url.push_str(&format!("&pageToken={token}"));
            }

            let response = self
                .request(reqwest::Method::GET, &url)
                .send()
                .await
                .map_err(|e| Self::transport_error(&e))?;

            let status = response.status();
            let body = response
                .text()
                .await
                .map_err(|e| Self::transport_error(&e))?;

            if !status.is_success() {
                return Err(Self::parse_error(status, &body, collection));
            }

            let page: ListDocumentsResponse = serde_json::from_str(&body)
                .map_err(|e| StorageError::serialization(format!("bad list body: {e}")))?;

            for doc in page.documents {
                let id = document_id(&doc.name).to_string();
                documents.push(Document::new(id, fields_to_record(&doc.fields)));
            }

            match page.next_page_token {
                Some(token) if !token.is_empty() => page_token = Some(token),
                _ => break,
            }
        }

        Ok(documents)
    }
}

// =============================================================================
// Tests (wire mapping; no network)
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_json_to_firestore_scalars() {
        assert!(matches!(
            json_to_firestore(&json!(null)),
            FirestoreValue::NullValue(_)
        ));
        assert!(matches!(
            json_to_firestore(&json!(true)),
            FirestoreValue::BooleanValue(true)
        ));
        assert!(
            matches!(json_to_firestore(&json!(42)), FirestoreValue::IntegerValue(s) if s == "42")
        );
        assert!(
            matches!(json_to_firestore(&json!(1.5)), FirestoreValue::DoubleValue(d) if d == 1.5)
        );
        assert!(
            matches!(json_to_firestore(&json!("hi")), FirestoreValue::StringValue(s) if s == "hi")
        );
    }

    #[test]
    fn test_value_mapping_roundtrip() {
        let original = json!({
            "name": "Ana",
            "age": 29,
            "scores": [1, 2.5, "three", null],
            "nested": {"consent": true}
        });

        let roundtripped = firestore_to_json(&json_to_firestore(&original));
        assert_eq!(roundtripped, original);
    }

    #[test]
    fn test_timestamp_becomes_string() {
        let ts = FirestoreValue::TimestampValue("2024-01-01T00:00:00Z".to_string());
        assert_eq!(firestore_to_json(&ts), json!("2024-01-01T00:00:00Z"));
    }

    #[test]
    fn test_record_to_fields_strips_id() {
        let record = Record::new().with_field("id", "abc").with_field("mood", "calm");
        let fields = record_to_fields(&record);

        assert!(!fields.contains_key("id"));
        assert!(fields.contains_key("mood"));
    }

    #[test]
    fn test_document_id_extraction() {
        let name = "projects/p/databases/(default)/documents/users/abc-123";
        assert_eq!(document_id(name), "abc-123");
        assert_eq!(document_id("bare"), "bare");
    }

    #[test]
    fn test_urls() {
        let store = FirestoreStore::new("mindmap-test").with_base_url("http://localhost:8080/v1");

        assert_eq!(
            store.collection_url("users"),
            "http://localhost:8080/v1/projects/mindmap-test/databases/(default)/documents/users"
        );
        assert_eq!(
            store.document_url("users", "abc"),
            "http://localhost:8080/v1/projects/mindmap-test/databases/(default)/documents/users/abc"
        );
    }

    #[test]
    fn test_parse_error_by_status_field() {
        let body = r#"{"error": {"code": 404, "message": "no such doc", "status": "NOT_FOUND"}}"#;
        let err = FirestoreStore::parse_error(reqwest::StatusCode::NOT_FOUND, body, "abc");
        assert!(matches!(err, StorageError::NotFound { id } if id == "abc"));

        let body = r#"{"error": {"code": 409, "message": "exists", "status": "ALREADY_EXISTS"}}"#;
        let err = FirestoreStore::parse_error(reqwest::StatusCode::CONFLICT, body, "abc");
        assert!(matches!(err, StorageError::AlreadyExists { .. }));
    }

    #[test]
    fn test_parse_error_falls_back_to_http_status() {
        let err = FirestoreStore::parse_error(
            reqwest::StatusCode::SERVICE_UNAVAILABLE,
            "not json",
            "abc",
        );
        assert!(matches!(err, StorageError::Connection { .. }));
        assert!(err.is_transient());
    }
}
