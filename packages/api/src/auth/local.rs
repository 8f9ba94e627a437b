//! Identity provider backed by a [`DocumentStore`], for tests and offline use.
//!
//! Accounts live in the `accounts` collection, keyed by uid, with Argon2 password
//! hashes. Federated accounts carry the provider id and subject instead of a
//! hash. The current session is per handle and is not persisted.

use std::sync::{Arc, Mutex, MutexGuard};

use serde::{Deserialize, Serialize};
use store::{new_document_id, DocumentStore, MemoryStore};

use super::identity::{FederatedCredential, Identity, IdentityProvider};
use super::password::{hash_password, verify_password};
use crate::error::AuthError;

pub const ACCOUNTS: &str = "accounts";

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Account {
    #[serde(default)]
    email: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    password_hash: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    display_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    provider_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    subject: Option<String>,
}

impl Account {
    fn identity(&self, uid: String) -> Identity {
        Identity {
            uid,
            email: Some(self.email.clone()).filter(|e| !e.is_empty()),
            display_name: self.display_name.clone(),
        }
    }
}

/// Local accounts over any document store.
#[derive(Debug, Clone, Default)]
pub struct LocalIdentityProvider<S> {
    store: S,
    current: Arc<Mutex<Option<String>>>,
}

/// Local accounts held only in memory.
pub type MemoryIdentityProvider = LocalIdentityProvider<MemoryStore>;

impl<S: DocumentStore> LocalIdentityProvider<S> {
    pub fn new(store: S) -> Self {
        Self {
            store,
            current: Arc::new(Mutex::new(None)),
        }
    }

    fn current(&self) -> MutexGuard<'_, Option<String>> {
        self.current.lock().unwrap_or_else(|e| e.into_inner())
    }

    async fn accounts(&self) -> Result<Vec<(String, Account)>, AuthError> {
        let docs = self.store.list(ACCOUNTS).await?;
        docs.into_iter()
            .map(|doc| -> Result<_, AuthError> { Ok((doc.id.clone(), doc.decode::<Account>()?)) })
            .collect()
    }

    async fn find(
        &self,
        matches: impl Fn(&Account) -> bool,
    ) -> Result<Option<(String, Account)>, AuthError> {
        Ok(self
            .accounts()
            .await?
            .into_iter()
            .find(|(_, account)| matches(account)))
    }

    async fn save(&self, uid: &str, account: &Account) -> Result<(), AuthError> {
        let data = serde_json::to_value(account).map_err(store::StoreError::from)?;
        Ok(self.store.set(ACCOUNTS, uid, data).await?)
    }

    fn start_session(&self, uid: String, account: &Account) -> Identity {
        *self.current() = Some(uid.clone());
        account.identity(uid)
    }

    /// Number of accounts, including federated ones.
    pub async fn account_count(&self) -> Result<usize, AuthError> {
        Ok(self.accounts().await?.len())
    }
}

impl<S: DocumentStore> IdentityProvider for LocalIdentityProvider<S> {
    async fn sign_in_with_password(
        &self,
        email: &str,
        password: &str,
    ) -> Result<Identity, AuthError> {
        let (uid, account) = self
            .find(|a| a.password_hash.is_some() && a.email.eq_ignore_ascii_case(email))
            .await?
            .ok_or(AuthError::InvalidCredentials)?;
        let hash = account
            .password_hash
            .as_deref()
            .ok_or(AuthError::InvalidCredentials)?;
        if !verify_password(password, hash)? {
            return Err(AuthError::InvalidCredentials);
        }
        Ok(self.start_session(uid, &account))
    }

    async fn create_account(&self, email: &str, password: &str) -> Result<Identity, AuthError> {
        if self
            .find(|a| a.email.eq_ignore_ascii_case(email))
            .await?
            .is_some()
        {
            return Err(AuthError::AccountAlreadyExists);
        }
        let account = Account {
            email: email.to_string(),
            password_hash: Some(hash_password(password)?),
            display_name: None,
            provider_id: None,
            subject: None,
        };
        let uid = new_document_id();
        self.save(&uid, &account).await?;
        tracing::debug!(%uid, "account created");
        Ok(self.start_session(uid, &account))
    }

    async fn sign_in_with_federated_credential(
        &self,
        credential: &FederatedCredential,
    ) -> Result<Identity, AuthError> {
        let existing = self
            .find(|a| {
                a.provider_id.as_deref() == Some(credential.provider_id.as_str())
                    && a.subject.as_deref() == Some(credential.subject.as_str())
            })
            .await?;
        let (uid, account) = match existing {
            Some(found) => found,
            None => {
                let account = Account {
                    email: credential.email.clone().unwrap_or_default(),
                    password_hash: None,
                    display_name: credential.display_name.clone(),
                    provider_id: Some(credential.provider_id.clone()),
                    subject: Some(credential.subject.clone()),
                };
                let uid = new_document_id();
                self.save(&uid, &account).await?;
                (uid, account)
            }
        };
        Ok(self.start_session(uid, &account))
    }

    async fn delete_current_account(&self) -> Result<(), AuthError> {
        let Some(uid) = self.current_uid() else {
            return Err(AuthError::Unknown("No active session".to_string()));
        };
        self.store.delete(ACCOUNTS, &uid).await?;
        self.sign_out();
        Ok(())
    }

    fn sign_out(&self) {
        self.current().take();
    }

    fn current_uid(&self) -> Option<String> {
        self.current().clone()
    }
}
