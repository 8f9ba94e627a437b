//! # Feature repositories
//!
//! Each repository wraps a [`DocumentStore`](store::DocumentStore) handle and owns
//! one part of the document tree:
//!
//! | Repository | Collection |
//! |------------|------------|
//! | [`CaseRepository`] | `users/{uid}/cases` |
//! | [`ChatHistoryRepository`] | `users/{uid}/chat_history` |
//! | [`CommunityRepository`] | `users` (lawyers), `forum_posts` |
//! | [`PrivateChatRepository`] | `private_chats/{room}`, `private_chats/{room}/messages` |
//!
//! Live views are exposed as [`Live`] handles over a store subscription.

mod cases;
mod chat_history;
mod community;
mod private_chat;

pub use cases::CaseRepository;
pub use chat_history::ChatHistoryRepository;
pub use community::{CommunityRepository, FORUM_ANSWER_NAME_FALLBACK, FORUM_POSTS};
pub use private_chat::PrivateChatRepository;

use store::{Document, Query, StoreError, Subscription};

use crate::error::RepositoryError;

type Decoder<T> = fn(&Document) -> Result<T, StoreError>;

/// Typed, ordered view over a collection subscription. Dropping it releases the
/// subscription.
#[derive(Debug)]
pub struct Live<T> {
    subscription: Subscription,
    query: Query,
    decode: Decoder<T>,
}

impl<T> Live<T> {
    fn new(subscription: Subscription, query: Query, decode: Decoder<T>) -> Self {
        Self {
            subscription,
            query,
            decode,
        }
    }

    /// The next snapshot; `None` once the store is gone.
    pub async fn next(&mut self) -> Option<Result<Vec<T>, RepositoryError>> {
        let docs = self.subscription.next().await?;
        Some(self.decode_all(docs))
    }

    /// The latest snapshot without waiting.
    pub fn latest(&self) -> Result<Vec<T>, RepositoryError> {
        self.decode_all(self.subscription.latest())
    }

    fn decode_all(&self, docs: Vec<Document>) -> Result<Vec<T>, RepositoryError> {
        self.query
            .apply(docs)
            .iter()
            .map(|doc| (self.decode)(doc).map_err(RepositoryError::from))
            .collect()
    }
}

fn require(value: &str, what: &str) -> Result<(), RepositoryError> {
    if value.trim().is_empty() {
        return Err(RepositoryError::Invalid(format!("{what} must not be blank")));
    }
    Ok(())
}
