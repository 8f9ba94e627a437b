//! # Documents and the [`DocumentStore`] trait
//!
//! A store holds JSON documents grouped into collections. Collection paths are
//! slash-separated and alternate collection and document segments, so they always
//! have an odd number of segments:
//!
//! | Path | Meaning |
//! |------|---------|
//! | `users` | top-level collection |
//! | `users/{uid}/cases` | sub-collection owned by the `users/{uid}` document |
//! | `private_chats/{room}/messages` | sub-collection owned by a chat room |
//!
//! Document ids are a single non-empty segment. Backends validate both with
//! [`validate_collection`] and [`validate_id`] before touching storage.
//!
//! All trait methods are async so the same repository code runs against the
//! in-memory store ([`crate::MemoryStore`]), the filesystem store
//! ([`crate::FileStore`]) or any remote backend.

use std::future::Future;

use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::error::StoreError;
use crate::query::Query;
use crate::subscription::Subscription;

/// A stored document: its id within the collection plus its JSON body.
#[derive(Clone, Debug, PartialEq)]
pub struct Document {
    pub id: String,
    pub data: Value,
}

impl Document {
    pub fn new(id: impl Into<String>, data: Value) -> Self {
        Self {
            id: id.into(),
            data,
        }
    }

    /// Deserialize the document body into `T`.
    pub fn decode<T: DeserializeOwned>(&self) -> Result<T, StoreError> {
        serde_json::from_value(self.data.clone()).map_err(|source| StoreError::Decode {
            id: self.id.clone(),
            source,
        })
    }

    /// Look up a top-level field of the body.
    pub fn field(&self, name: &str) -> Option<&Value> {
        self.data.get(name)
    }
}

/// Async keyed document store.
pub trait DocumentStore: Send + Sync {
    /// Fetch one document body, `None` when absent.
    fn get(
        &self,
        collection: &str,
        id: &str,
    ) -> impl Future<Output = Result<Option<Value>, StoreError>> + Send;

    /// Create or replace a document.
    fn set(
        &self,
        collection: &str,
        id: &str,
        data: Value,
    ) -> impl Future<Output = Result<(), StoreError>> + Send;

    /// Remove a document. Removing a missing document succeeds.
    fn delete(
        &self,
        collection: &str,
        id: &str,
    ) -> impl Future<Output = Result<(), StoreError>> + Send;

    /// All documents of a collection, ordered by id.
    fn list(
        &self,
        collection: &str,
    ) -> impl Future<Output = Result<Vec<Document>, StoreError>> + Send;

    /// Remove every document of a collection.
    fn delete_all(&self, collection: &str) -> impl Future<Output = Result<(), StoreError>> + Send;

    /// Open a live snapshot subscription on a collection.
    fn subscribe(
        &self,
        collection: &str,
    ) -> impl Future<Output = Result<Subscription, StoreError>> + Send;

    /// List a collection and apply a [`Query`] to the result.
    fn query(
        &self,
        collection: &str,
        query: &Query,
    ) -> impl Future<Output = Result<Vec<Document>, StoreError>> + Send {
        async move {
            let docs = self.list(collection).await?;
            Ok(query.apply(docs))
        }
    }
}

/// Generate a fresh random document id.
pub fn new_document_id() -> String {
    uuid::Uuid::new_v4().simple().to_string()
}

/// Check that a collection path has an odd number of non-empty segments.
pub fn validate_collection(collection: &str) -> Result<(), StoreError> {
    let segments: Vec<&str> = collection.split('/').collect();
    if segments.iter().any(|s| s.is_empty()) || segments.len() % 2 == 0 {
        return Err(StoreError::InvalidPath(collection.to_string()));
    }
    Ok(())
}

/// Check that a document id is a single non-empty segment.
pub fn validate_id(id: &str) -> Result<(), StoreError> {
    if id.is_empty() || id.contains('/') || id == "." || id == ".." {
        return Err(StoreError::InvalidPath(id.to_string()));
    }
    Ok(())
}
