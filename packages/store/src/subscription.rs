//! # Live collection snapshots
//!
//! Backends keep one [`Listeners`] registry. Subscribing to a collection opens (or
//! joins) a `tokio::sync::watch` channel for it; every write to a watched
//! collection publishes a fresh snapshot of the whole collection.
//!
//! A [`Subscription`] is the subscriber's handle. It is released when dropped: the
//! registry forgets the subscriber, and the channel itself is torn down when its
//! last subscriber goes away. The handle only holds a weak reference to the
//! registry, so once every handle to the backing store is gone the sequence ends
//! and [`Subscription::next`] returns `None`.

use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, Weak};

use tokio::sync::watch;

use crate::document::Document;

struct Channel {
    tx: watch::Sender<Vec<Document>>,
    subscribers: HashSet<u64>,
}

/// Registry of open subscriptions, keyed by collection path.
#[derive(Default)]
pub struct Listeners {
    channels: Mutex<HashMap<String, Channel>>,
    next_id: AtomicU64,
}

impl std::fmt::Debug for Listeners {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let watched: Vec<String> = self
            .channels
            .lock()
            .map(|c| c.keys().cloned().collect())
            .unwrap_or_default();
        f.debug_struct("Listeners").field("watched", &watched).finish()
    }
}

impl Listeners {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Register a subscriber. `snapshot` seeds the channel when the collection is
    /// not watched yet; an existing channel already carries the latest snapshot.
    pub fn subscribe(self: &Arc<Self>, collection: &str, snapshot: Vec<Document>) -> Subscription {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let mut channels = self.channels.lock().unwrap_or_else(|e| e.into_inner());
        let channel = channels
            .entry(collection.to_string())
            .or_insert_with(|| Channel {
                tx: watch::Sender::new(snapshot),
                subscribers: HashSet::new(),
            });
        channel.subscribers.insert(id);
        let rx = channel.tx.subscribe();
        tracing::debug!(collection, id, "subscription opened");

        Subscription {
            collection: collection.to_string(),
            id,
            rx,
            listeners: Arc::downgrade(self),
            delivered_initial: false,
        }
    }

    /// Whether anyone is listening to `collection`.
    pub fn is_watched(&self, collection: &str) -> bool {
        self.channels
            .lock()
            .map(|c| c.contains_key(collection))
            .unwrap_or(false)
    }

    /// Push a new snapshot to the subscribers of `collection`, if any.
    pub fn publish(&self, collection: &str, snapshot: Vec<Document>) {
        let channels = self.channels.lock().unwrap_or_else(|e| e.into_inner());
        if let Some(channel) = channels.get(collection) {
            channel.tx.send_replace(snapshot);
        }
    }

    /// Number of live subscriptions on `collection`.
    pub fn active(&self, collection: &str) -> usize {
        self.channels
            .lock()
            .map(|c| c.get(collection).map_or(0, |ch| ch.subscribers.len()))
            .unwrap_or(0)
    }

    fn release(&self, collection: &str, id: u64) {
        let mut channels = self.channels.lock().unwrap_or_else(|e| e.into_inner());
        if let Some(channel) = channels.get_mut(collection) {
            channel.subscribers.remove(&id);
            if channel.subscribers.is_empty() {
                channels.remove(collection);
            }
        }
        tracing::debug!(collection, id, "subscription released");
    }
}

/// Handle to a live sequence of collection snapshots.
pub struct Subscription {
    collection: String,
    id: u64,
    rx: watch::Receiver<Vec<Document>>,
    listeners: Weak<Listeners>,
    delivered_initial: bool,
}

impl std::fmt::Debug for Subscription {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Subscription")
            .field("collection", &self.collection)
            .field("id", &self.id)
            .finish()
    }
}

impl Subscription {
    pub fn collection(&self) -> &str {
        &self.collection
    }

    /// The next snapshot. The first call yields the current contents immediately;
    /// later calls wait for a write. `None` once the store is gone.
    pub async fn next(&mut self) -> Option<Vec<Document>> {
        if !self.delivered_initial {
            self.delivered_initial = true;
            return Some(self.rx.borrow_and_update().clone());
        }
        if self.listeners.strong_count() == 0 {
            return None;
        }
        self.rx.changed().await.ok()?;
        Some(self.rx.borrow_and_update().clone())
    }

    /// The most recent snapshot, without waiting.
    pub fn latest(&self) -> Vec<Document> {
        self.rx.borrow().clone()
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        if let Some(listeners) = self.listeners.upgrade() {
            listeners.release(&self.collection, self.id);
        }
    }
}
