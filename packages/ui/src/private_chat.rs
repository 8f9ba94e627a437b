use api::auth::IdentityProvider;
use api::models::{chat_room_id, PrivateMessage};
use api::repository::{Live, PrivateChatRepository};
use api::RepositoryError;
use store::DocumentStore;

/// One-to-one chat between the signed-in user and another user.
pub struct PrivateChatViewModel<S, I> {
    repository: PrivateChatRepository<S>,
    identity: I,
}

impl<S: DocumentStore, I: IdentityProvider> PrivateChatViewModel<S, I> {
    pub fn new(store: S, identity: I) -> Self {
        Self {
            repository: PrivateChatRepository::new(store),
            identity,
        }
    }

    pub fn current_user_id(&self) -> Option<String> {
        self.identity.current_uid()
    }

    fn room_with(&self, other_uid: &str) -> Result<(String, String), RepositoryError> {
        let me = self
            .identity
            .current_uid()
            .ok_or(RepositoryError::NotSignedIn)?;
        let room = chat_room_id(&me, other_uid);
        Ok((me, room))
    }

    /// Live messages with `other_uid`. Drop the handle to stop listening.
    pub async fn open(&self, other_uid: &str) -> Result<Live<PrivateMessage>, RepositoryError> {
        let (_, room) = self.room_with(other_uid)?;
        self.repository.subscribe(&room).await
    }

    /// Send `text` to `other_uid`. Blank text is ignored.
    pub async fn send_message(&self, other_uid: &str, text: &str) -> Result<(), RepositoryError> {
        if text.trim().is_empty() {
            return Ok(());
        }
        let (me, room) = self.room_with(other_uid)?;
        self.repository.send(&room, &me, text).await?;
        Ok(())
    }
}
