//! # Filesystem-backed document store
//!
//! [`FileStore`] is a [`DocumentStore`] implementation that persists every document
//! as one JSON file. It is used by the command-line front end and by offline
//! clients to keep profiles and case files across restarts.
//!
//! ## Layout
//!
//! ```text
//! <base_dir>/
//! ├── users/
//! │   ├── <uid>.json           # users/<uid>
//! │   └── <uid>/
//! │       └── cases/
//! │           └── <id>.json    # users/<uid>/cases/<id>
//! └── forum_posts/
//!     └── <id>.json
//! ```
//!
//! Writes go to a temporary file that is renamed into place, so readers never see
//! a half-written document. Subscriptions only observe writes made through this
//! process's handles.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use serde_json::Value;

use crate::document::{validate_collection, validate_id, Document, DocumentStore};
use crate::error::StoreError;
use crate::subscription::{Listeners, Subscription};

/// Filesystem-backed DocumentStore.
#[derive(Clone, Debug)]
pub struct FileStore {
    base: PathBuf,
    listeners: Arc<Listeners>,
    write_lock: Arc<Mutex<()>>,
}

impl FileStore {
    pub fn new(base: PathBuf) -> Self {
        Self {
            base,
            listeners: Listeners::new(),
            write_lock: Arc::new(Mutex::new(())),
        }
    }

    pub fn base(&self) -> &Path {
        &self.base
    }

    fn collection_dir(&self, collection: &str) -> PathBuf {
        collection
            .split('/')
            .fold(self.base.clone(), |path, segment| path.join(segment))
    }

    fn document_path(&self, collection: &str, id: &str) -> PathBuf {
        self.collection_dir(collection).join(format!("{id}.json"))
    }

    fn read_collection(&self, collection: &str) -> Result<Vec<Document>, StoreError> {
        let dir = self.collection_dir(collection);
        let entries = match std::fs::read_dir(&dir) {
            Ok(entries) => entries,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(e.into()),
        };

        let mut docs = Vec::new();
        for entry in entries {
            let path = entry?.path();
            if path.extension().and_then(|e| e.to_str()) != Some("json") {
                continue;
            }
            let Some(id) = path.file_stem().and_then(|s| s.to_str()) else {
                continue;
            };
            let bytes = std::fs::read(&path)?;
            let data = serde_json::from_slice(&bytes).map_err(|source| StoreError::Decode {
                id: id.to_string(),
                source,
            })?;
            docs.push(Document::new(id, data));
        }
        docs.sort_by(|a, b| a.id.cmp(&b.id));
        Ok(docs)
    }

    fn notify(&self, collection: &str) -> Result<(), StoreError> {
        if self.listeners.is_watched(collection) {
            let snapshot = self.read_collection(collection)?;
            self.listeners.publish(collection, snapshot);
        }
        Ok(())
    }
}

impl DocumentStore for FileStore {
    async fn get(&self, collection: &str, id: &str) -> Result<Option<Value>, StoreError> {
        validate_collection(collection)?;
        validate_id(id)?;
        match std::fs::read(self.document_path(collection, id)) {
            Ok(bytes) => serde_json::from_slice(&bytes)
                .map(Some)
                .map_err(|source| StoreError::Decode {
                    id: id.to_string(),
                    source,
                }),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    async fn set(&self, collection: &str, id: &str, data: Value) -> Result<(), StoreError> {
        validate_collection(collection)?;
        validate_id(id)?;
        let path = self.document_path(collection, id);
        let bytes = serde_json::to_vec_pretty(&data)?;

        let _guard = self.write_lock.lock().unwrap_or_else(|e| e.into_inner());
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let tmp = path.with_extension("json.tmp");
        std::fs::write(&tmp, bytes)?;
        std::fs::rename(&tmp, &path)?;
        self.notify(collection)
    }

    async fn delete(&self, collection: &str, id: &str) -> Result<(), StoreError> {
        validate_collection(collection)?;
        validate_id(id)?;
        let _guard = self.write_lock.lock().unwrap_or_else(|e| e.into_inner());
        match std::fs::remove_file(self.document_path(collection, id)) {
            Ok(()) => self.notify(collection),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }

    async fn list(&self, collection: &str) -> Result<Vec<Document>, StoreError> {
        validate_collection(collection)?;
        self.read_collection(collection)
    }

    async fn delete_all(&self, collection: &str) -> Result<(), StoreError> {
        validate_collection(collection)?;
        let _guard = self.write_lock.lock().unwrap_or_else(|e| e.into_inner());
        for doc in self.read_collection(collection)? {
            match std::fs::remove_file(self.document_path(collection, &doc.id)) {
                Ok(()) => {}
                Err(e) if e.kind() == ErrorKind::NotFound => {}
                Err(e) => return Err(e.into()),
            }
        }
        self.notify(collection)
    }

    async fn subscribe(&self, collection: &str) -> Result<Subscription, StoreError> {
        validate_collection(collection)?;
        let _guard = self.write_lock.lock().unwrap_or_else(|e| e.into_inner());
        let snapshot = self.read_collection(collection)?;
        Ok(self.listeners.subscribe(collection, snapshot))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[tokio::test]
    async fn test_file_store_roundtrip() {
        let dir = tempfile::tempdir().unwrap();

        let store = FileStore::new(dir.path().to_path_buf());
        store
            .set("users", "u1", json!({ "uid": "u1", "role": "lawyer" }))
            .await
            .unwrap();
        store
            .set("users/u1/cases", "c1", json!({ "caseNumber": "42/2024" }))
            .await
            .unwrap();

        // Re-open from same directory
        let reopened = FileStore::new(dir.path().to_path_buf());
        let user = reopened.get("users", "u1").await.unwrap().unwrap();
        assert_eq!(user["role"], "lawyer");

        let users = reopened.list("users").await.unwrap();
        assert_eq!(users.len(), 1);
        let cases = reopened.list("users/u1/cases").await.unwrap();
        assert_eq!(cases[0].data["caseNumber"], "42/2024");
    }

    #[tokio::test]
    async fn test_missing_collection_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileStore::new(dir.path().to_path_buf());
        assert!(store.list("forum_posts").await.unwrap().is_empty());
        assert!(store.get("forum_posts", "nope").await.unwrap().is_none());
        store.delete("forum_posts", "nope").await.unwrap();
    }

    #[tokio::test]
    async fn test_corrupt_document_reports_decode_error() {
        let dir = tempfile::tempdir().unwrap();
        let users = dir.path().join("users");
        std::fs::create_dir_all(&users).unwrap();
        std::fs::write(users.join("bad.json"), b"{ not json").unwrap();

        let store = FileStore::new(dir.path().to_path_buf());
        let err = store.get("users", "bad").await.unwrap_err();
        assert!(matches!(err, StoreError::Decode { ref id, .. } if id == "bad"));
    }

    #[tokio::test]
    async fn test_delete_all_and_subscription() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileStore::new(dir.path().to_path_buf());
        store
            .set("users/u1/chat_history", "m1", json!({ "text": "q" }))
            .await
            .unwrap();

        let mut sub = store.subscribe("users/u1/chat_history").await.unwrap();
        assert_eq!(sub.next().await.unwrap().len(), 1);

        store
            .set("users/u1/chat_history", "m2", json!({ "text": "a" }))
            .await
            .unwrap();
        assert_eq!(sub.next().await.unwrap().len(), 2);

        store.delete_all("users/u1/chat_history").await.unwrap();
        assert!(sub.next().await.unwrap().is_empty());
        assert!(store.list("users/u1/chat_history").await.unwrap().is_empty());
    }
}
