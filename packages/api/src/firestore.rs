//! # Cloud Firestore over REST
//!
//! [`FirestoreStore`] is the [`DocumentStore`] that goes with [`FirebaseAuth`]:
//! profiles at `users/{uid}` and the feature collections live in the project's
//! Firestore database, so every device reads the same stored role.
//!
//! | Operation | Request |
//! |-----------|---------|
//! | `get` | `GET documents/{collection}/{id}`, 404 is `None` |
//! | `set` | `PATCH documents/{collection}/{id}` without a field mask (full replace) |
//! | `delete` | `DELETE documents/{collection}/{id}`, 404 is fine |
//! | `list` | `GET documents/{collection}?pageSize=..&pageToken=..` until the last page |
//!
//! Requests carry the signed-in user's ID token as a bearer token when there is
//! one. Document bodies convert between plain JSON and Firestore's typed values
//! (`stringValue`, `integerValue`, `mapValue`, ...). Subscriptions observe writes
//! made through this handle only.

use std::sync::Arc;
use std::time::Duration;

use reqwest::{Method, RequestBuilder, Response, StatusCode};
use serde::Deserialize;
use serde_json::{Map, Value};
use store::{
    validate_collection, validate_id, Document, DocumentStore, Listeners, StoreError, Subscription,
};

use crate::auth::FirebaseAuth;
use crate::settings::{FirebaseSettings, SettingsError};

const PAGE_SIZE: u32 = 300;

#[derive(Debug, Deserialize)]
struct RawDocument {
    name: String,
    #[serde(default)]
    fields: Map<String, Value>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ListResponse {
    #[serde(default)]
    documents: Vec<RawDocument>,
    #[serde(default)]
    next_page_token: Option<String>,
}

impl RawDocument {
    fn into_document(self) -> Document {
        let id = self.name.rsplit('/').next().unwrap_or_default().to_string();
        Document::new(id, decode_fields(&self.fields))
    }
}

fn typed(kind: &str, value: Value) -> Value {
    let mut map = Map::new();
    map.insert(kind.to_string(), value);
    Value::Object(map)
}

/// Plain JSON to a Firestore `Value`.
fn encode_value(value: &Value) -> Value {
    match value {
        Value::Null => typed("nullValue", Value::Null),
        Value::Bool(b) => typed("booleanValue", Value::Bool(*b)),
        Value::Number(n) if n.is_i64() || n.is_u64() => {
            typed("integerValue", Value::String(n.to_string()))
        }
        Value::Number(n) => typed("doubleValue", Value::Number(n.clone())),
        Value::String(s) => typed("stringValue", Value::String(s.clone())),
        Value::Array(items) => {
            let mut array = Map::new();
            array.insert(
                "values".to_string(),
                Value::Array(items.iter().map(encode_value).collect()),
            );
            typed("arrayValue", Value::Object(array))
        }
        Value::Object(fields) => typed("mapValue", encode_fields(fields)),
    }
}

/// `{"fields": {..}}` for a document body or a map value.
fn encode_fields(fields: &Map<String, Value>) -> Value {
    let encoded = fields
        .iter()
        .map(|(k, v)| (k.clone(), encode_value(v)))
        .collect();
    let mut body = Map::new();
    body.insert("fields".to_string(), Value::Object(encoded));
    Value::Object(body)
}

/// A Firestore `Value` to plain JSON. Unknown kinds are dropped.
fn decode_value(value: &Value) -> Option<Value> {
    let (kind, inner) = value.as_object()?.iter().next()?;
    match kind.as_str() {
        "nullValue" => Some(Value::Null),
        "booleanValue" => inner.as_bool().map(Value::Bool),
        "integerValue" => inner
            .as_i64()
            .or_else(|| inner.as_str()?.parse().ok())
            .map(Value::from),
        "doubleValue" => inner
            .as_f64()
            .and_then(serde_json::Number::from_f64)
            .map(Value::Number),
        "stringValue" | "timestampValue" | "referenceValue" | "bytesValue" => {
            inner.as_str().map(|s| Value::String(s.to_string()))
        }
        "geoPointValue" => Some(inner.clone()),
        "arrayValue" => Some(Value::Array(
            inner
                .get("values")
                .and_then(Value::as_array)
                .map(|values| values.iter().filter_map(decode_value).collect())
                .unwrap_or_default(),
        )),
        "mapValue" => Some(
            inner
                .get("fields")
                .and_then(Value::as_object)
                .map(decode_fields)
                .unwrap_or_else(|| Value::Object(Map::new())),
        ),
        _ => None,
    }
}

fn decode_fields(fields: &Map<String, Value>) -> Value {
    Value::Object(
        fields
            .iter()
            .filter_map(|(k, v)| Some((k.clone(), decode_value(v)?)))
            .collect(),
    )
}

fn transport(e: reqwest::Error) -> StoreError {
    StoreError::Unavailable(e.to_string())
}

/// Firestore-backed DocumentStore.
#[derive(Clone)]
pub struct FirestoreStore {
    http: reqwest::Client,
    documents_url: String,
    auth: Option<FirebaseAuth>,
    listeners: Arc<Listeners>,
}

impl std::fmt::Debug for FirestoreStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FirestoreStore")
            .field("documents_url", &self.documents_url)
            .finish()
    }
}

impl FirestoreStore {
    /// Store for `settings.project_id`, authorised by `auth`'s current session.
    pub fn new(
        settings: &FirebaseSettings,
        auth: Option<FirebaseAuth>,
        timeout: Duration,
    ) -> Result<Self, SettingsError> {
        let project = settings.require_project_id()?;
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(SettingsError::HttpClient)?;
        Ok(Self {
            http,
            documents_url: format!(
                "{}/projects/{}/databases/(default)/documents",
                settings.firestore_base_url.trim_end_matches('/'),
                project
            ),
            auth,
            listeners: Listeners::new(),
        })
    }

    fn collection_url(&self, collection: &str) -> String {
        format!("{}/{}", self.documents_url, collection)
    }

    fn document_url(&self, collection: &str, id: &str) -> String {
        format!("{}/{}/{}", self.documents_url, collection, id)
    }

    fn request(&self, method: Method, url: &str) -> RequestBuilder {
        let builder = self.http.request(method, url);
        match self.auth.as_ref().and_then(|auth| auth.id_token()) {
            Some(token) => builder.bearer_auth(token),
            None => builder,
        }
    }

    /// Send, treating 404 as `None` and other failures as errors.
    async fn send(&self, builder: RequestBuilder) -> Result<Option<Response>, StoreError> {
        let resp = builder.send().await.map_err(transport)?;
        let status = resp.status();
        if status == StatusCode::NOT_FOUND {
            return Ok(None);
        }
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            tracing::warn!(%status, "firestore rejected request");
            return Err(StoreError::Rejected(format!("HTTP {status}: {body}")));
        }
        Ok(Some(resp))
    }

    async fn fetch_collection(&self, collection: &str) -> Result<Vec<Document>, StoreError> {
        let url = self.collection_url(collection);
        let mut docs = Vec::new();
        let mut page_token: Option<String> = None;
        loop {
            let mut query = vec![("pageSize", PAGE_SIZE.to_string())];
            if let Some(token) = &page_token {
                query.push(("pageToken", token.clone()));
            }
            let Some(resp) = self.send(self.request(Method::GET, &url).query(&query)).await? else {
                break;
            };
            let page: ListResponse = resp.json().await.map_err(transport)?;
            docs.extend(page.documents.into_iter().map(RawDocument::into_document));
            match page.next_page_token.filter(|t| !t.is_empty()) {
                Some(token) => page_token = Some(token),
                None => break,
            }
        }
        docs.sort_by(|a, b| a.id.cmp(&b.id));
        tracing::debug!(collection, count = docs.len(), "firestore list");
        Ok(docs)
    }

    async fn remove(&self, collection: &str, id: &str) -> Result<(), StoreError> {
        let url = self.document_url(collection, id);
        self.send(self.request(Method::DELETE, &url)).await?;
        Ok(())
    }

    async fn notify(&self, collection: &str) -> Result<(), StoreError> {
        if self.listeners.is_watched(collection) {
            let snapshot = self.fetch_collection(collection).await?;
            self.listeners.publish(collection, snapshot);
        }
        Ok(())
    }
}

impl DocumentStore for FirestoreStore {
    async fn get(&self, collection: &str, id: &str) -> Result<Option<Value>, StoreError> {
        validate_collection(collection)?;
        validate_id(id)?;
        let url = self.document_url(collection, id);
        let Some(resp) = self.send(self.request(Method::GET, &url)).await? else {
            return Ok(None);
        };
        let raw: RawDocument = resp.json().await.map_err(transport)?;
        Ok(Some(raw.into_document().data))
    }

    async fn set(&self, collection: &str, id: &str, data: Value) -> Result<(), StoreError> {
        validate_collection(collection)?;
        validate_id(id)?;
        let Value::Object(fields) = &data else {
            return Err(StoreError::Rejected(format!(
                "{collection}/{id}: document body must be an object"
            )));
        };
        let url = self.document_url(collection, id);
        let resp = self
            .send(self.request(Method::PATCH, &url).json(&encode_fields(fields)))
            .await?;
        if resp.is_none() {
            return Err(StoreError::Rejected(format!("{collection}/{id}: not found")));
        }
        self.notify(collection).await
    }

    async fn delete(&self, collection: &str, id: &str) -> Result<(), StoreError> {
        validate_collection(collection)?;
        validate_id(id)?;
        self.remove(collection, id).await?;
        self.notify(collection).await
    }

    async fn list(&self, collection: &str) -> Result<Vec<Document>, StoreError> {
        validate_collection(collection)?;
        self.fetch_collection(collection).await
    }

    async fn delete_all(&self, collection: &str) -> Result<(), StoreError> {
        validate_collection(collection)?;
        for doc in self.fetch_collection(collection).await? {
            self.remove(collection, &doc.id).await?;
        }
        self.notify(collection).await
    }

    async fn subscribe(&self, collection: &str) -> Result<Subscription, StoreError> {
        validate_collection(collection)?;
        let snapshot = self.fetch_collection(collection).await?;
        Ok(self.listeners.subscribe(collection, snapshot))
    }
}
