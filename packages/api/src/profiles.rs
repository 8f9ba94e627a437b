//! User profiles at `users/{uid}`.

use std::future::Future;

use store::{Document, DocumentStore, StoreError};

use crate::models::{Role, UserProfile};

pub const USERS: &str = "users";

/// Keyed store of one [`UserProfile`] per uid.
pub trait ProfileStore: Send + Sync {
    fn get(&self, uid: &str)
        -> impl Future<Output = Result<Option<UserProfile>, StoreError>> + Send;

    fn put(&self, profile: &UserProfile) -> impl Future<Output = Result<(), StoreError>> + Send;
}

/// [`ProfileStore`] over any [`DocumentStore`].
#[derive(Debug, Clone)]
pub struct ProfileRepository<S> {
    store: S,
}

impl<S: DocumentStore> ProfileRepository<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    /// Profiles registered with `role`. Stored roles match case-insensitively.
    pub async fn with_role(&self, role: Role) -> Result<Vec<Document>, StoreError> {
        let users = self.store.list(USERS).await?;
        Ok(users
            .into_iter()
            .filter(|doc| {
                doc.field("role")
                    .and_then(|v| v.as_str())
                    .and_then(|s| s.parse::<Role>().ok())
                    == Some(role)
            })
            .collect())
    }
}

impl<S: DocumentStore> ProfileStore for ProfileRepository<S> {
    async fn get(&self, uid: &str) -> Result<Option<UserProfile>, StoreError> {
        match self.store.get(USERS, uid).await? {
            Some(data) => Document::new(uid, data).decode().map(Some),
            None => Ok(None),
        }
    }

    async fn put(&self, profile: &UserProfile) -> Result<(), StoreError> {
        let data = serde_json::to_value(profile)?;
        self.store.set(USERS, &profile.uid, data).await
    }
}
