use store::{new_document_id, Direction, Document, DocumentStore, Query, StoreError};

use super::Live;
use crate::error::RepositoryError;
use crate::models::ChatMessage;

fn history_path(uid: &str) -> String {
    format!("users/{uid}/chat_history")
}

fn decode_message(doc: &Document) -> Result<ChatMessage, StoreError> {
    let mut message: ChatMessage = doc.decode()?;
    message.id = doc.id.clone();
    Ok(message)
}

fn by_timestamp() -> Query {
    Query::new().order_by("timestamp", Direction::Ascending)
}

/// Per-user AI chat transcript.
#[derive(Debug, Clone)]
pub struct ChatHistoryRepository<S> {
    store: S,
}

impl<S: DocumentStore> ChatHistoryRepository<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    pub async fn save(&self, uid: &str, message: &ChatMessage) -> Result<String, RepositoryError> {
        let id = new_document_id();
        let data = serde_json::to_value(message).map_err(StoreError::from)?;
        self.store.set(&history_path(uid), &id, data).await?;
        Ok(id)
    }

    /// The transcript, oldest first.
    pub async fn history(&self, uid: &str) -> Result<Vec<ChatMessage>, RepositoryError> {
        let docs = self.store.query(&history_path(uid), &by_timestamp()).await?;
        docs.iter()
            .map(|doc| decode_message(doc).map_err(RepositoryError::from))
            .collect()
    }

    pub async fn subscribe(&self, uid: &str) -> Result<Live<ChatMessage>, RepositoryError> {
        let subscription = self.store.subscribe(&history_path(uid)).await?;
        Ok(Live::new(subscription, by_timestamp(), decode_message))
    }

    pub async fn clear(&self, uid: &str) -> Result<(), RepositoryError> {
        self.store.delete_all(&history_path(uid)).await?;
        tracing::info!(uid, "chat history cleared");
        Ok(())
    }
}
