use std::collections::BTreeMap;
use std::sync::{Arc, Mutex, MutexGuard};

use serde_json::Value;

use crate::document::{validate_collection, validate_id, Document, DocumentStore};
use crate::error::StoreError;
use crate::subscription::{Listeners, Subscription};

type Collections = BTreeMap<String, BTreeMap<String, Value>>;

/// In-memory DocumentStore for testing and offline mode.
#[derive(Clone, Debug, Default)]
pub struct MemoryStore {
    collections: Arc<Mutex<Collections>>,
    listeners: Arc<Listeners>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of live subscriptions on `collection`.
    pub fn active_subscriptions(&self, collection: &str) -> usize {
        self.listeners.active(collection)
    }

    fn lock(&self) -> MutexGuard<'_, Collections> {
        self.collections.lock().unwrap_or_else(|e| e.into_inner())
    }

    // Called with the data lock held so snapshots publish in write order.
    fn notify(&self, collections: &Collections, collection: &str) {
        if self.listeners.is_watched(collection) {
            self.listeners
                .publish(collection, snapshot(collections, collection));
        }
    }
}

fn snapshot(collections: &Collections, collection: &str) -> Vec<Document> {
    collections
        .get(collection)
        .map(|docs| {
            docs.iter()
                .map(|(id, data)| Document::new(id.clone(), data.clone()))
                .collect()
        })
        .unwrap_or_default()
}

impl DocumentStore for MemoryStore {
    async fn get(&self, collection: &str, id: &str) -> Result<Option<Value>, StoreError> {
        validate_collection(collection)?;
        validate_id(id)?;
        Ok(self
            .lock()
            .get(collection)
            .and_then(|docs| docs.get(id))
            .cloned())
    }

    async fn set(&self, collection: &str, id: &str, data: Value) -> Result<(), StoreError> {
        validate_collection(collection)?;
        validate_id(id)?;
        let mut collections = self.lock();
        collections
            .entry(collection.to_string())
            .or_default()
            .insert(id.to_string(), data);
        self.notify(&collections, collection);
        Ok(())
    }

    async fn delete(&self, collection: &str, id: &str) -> Result<(), StoreError> {
        validate_collection(collection)?;
        validate_id(id)?;
        let mut collections = self.lock();
        let removed = collections
            .get_mut(collection)
            .and_then(|docs| docs.remove(id))
            .is_some();
        if removed {
            self.notify(&collections, collection);
        }
        Ok(())
    }

    async fn list(&self, collection: &str) -> Result<Vec<Document>, StoreError> {
        validate_collection(collection)?;
        Ok(snapshot(&self.lock(), collection))
    }

    async fn delete_all(&self, collection: &str) -> Result<(), StoreError> {
        validate_collection(collection)?;
        let mut collections = self.lock();
        collections.remove(collection);
        self.notify(&collections, collection);
        Ok(())
    }

    async fn subscribe(&self, collection: &str) -> Result<Subscription, StoreError> {
        validate_collection(collection)?;
        let collections = self.lock();
        Ok(self
            .listeners
            .subscribe(collection, snapshot(&collections, collection)))
    }
}
