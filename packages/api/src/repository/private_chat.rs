use store::{new_document_id, Direction, Document, DocumentStore, Query, StoreError};

use super::{require, Live};
use crate::error::RepositoryError;
use crate::models::{ChatRoomSummary, PrivateMessage};

const ROOMS: &str = "private_chats";

fn messages_path(room: &str) -> String {
    format!("{ROOMS}/{room}/messages")
}

fn decode_message(doc: &Document) -> Result<PrivateMessage, StoreError> {
    let mut message: PrivateMessage = doc.decode()?;
    message.id = doc.id.clone();
    Ok(message)
}

fn oldest_first() -> Query {
    Query::new().order_by("timestamp", Direction::Ascending)
}

/// Direct messages between two users, grouped by room id.
#[derive(Debug, Clone)]
pub struct PrivateChatRepository<S> {
    store: S,
}

impl<S: DocumentStore> PrivateChatRepository<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    /// Append a message to the room and update the room summary.
    pub async fn send(
        &self,
        room: &str,
        sender_id: &str,
        text: &str,
    ) -> Result<PrivateMessage, RepositoryError> {
        require(text, "message")?;
        let message = PrivateMessage {
            id: new_document_id(),
            sender_id: sender_id.to_string(),
            text: text.trim().to_string(),
            timestamp: chrono::Utc::now().timestamp_millis(),
        };
        let data = serde_json::to_value(&message).map_err(StoreError::from)?;
        self.store
            .set(&messages_path(room), &message.id, data)
            .await?;

        let summary = ChatRoomSummary {
            last_message: message.text.clone(),
            timestamp: message.timestamp,
        };
        let data = serde_json::to_value(&summary).map_err(StoreError::from)?;
        self.store.set(ROOMS, room, data).await?;
        Ok(message)
    }

    pub async fn messages(&self, room: &str) -> Result<Vec<PrivateMessage>, RepositoryError> {
        let docs = self.store.query(&messages_path(room), &oldest_first()).await?;
        docs.iter()
            .map(|doc| decode_message(doc).map_err(RepositoryError::from))
            .collect()
    }

    pub async fn summary(&self, room: &str) -> Result<Option<ChatRoomSummary>, RepositoryError> {
        match self.store.get(ROOMS, room).await? {
            Some(data) => Ok(Some(Document::new(room, data).decode()?)),
            None => Ok(None),
        }
    }

    pub async fn subscribe(&self, room: &str) -> Result<Live<PrivateMessage>, RepositoryError> {
        let subscription = self.store.subscribe(&messages_path(room)).await?;
        Ok(Live::new(subscription, oldest_first(), decode_message))
    }
}
