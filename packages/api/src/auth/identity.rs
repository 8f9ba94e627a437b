//! The identity-provider seam.

use std::future::Future;

use crate::error::AuthError;

/// An authenticated identity as issued by the provider.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Identity {
    pub uid: String,
    pub email: Option<String>,
    pub display_name: Option<String>,
}

/// Proof of a completed third-party sign-in, exchanged with the identity
/// provider for an [`Identity`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FederatedCredential {
    /// Provider id as the identity provider knows it, e.g. `google.com`.
    pub provider_id: String,
    /// Stable account id at the third-party provider.
    pub subject: String,
    pub access_token: String,
    pub display_name: Option<String>,
    pub email: Option<String>,
}

/// External service that authenticates users and issues `uid`s.
///
/// Implementations hold at most one active session. Successful sign-in and
/// account creation make the returned identity current.
pub trait IdentityProvider: Send + Sync {
    fn sign_in_with_password(
        &self,
        email: &str,
        password: &str,
    ) -> impl Future<Output = Result<Identity, AuthError>> + Send;

    /// Create an account and sign it in.
    fn create_account(
        &self,
        email: &str,
        password: &str,
    ) -> impl Future<Output = Result<Identity, AuthError>> + Send;

    /// Sign in with a third-party credential, creating the account on first use.
    fn sign_in_with_federated_credential(
        &self,
        credential: &FederatedCredential,
    ) -> impl Future<Output = Result<Identity, AuthError>> + Send;

    /// Delete the account of the current session and end the session.
    fn delete_current_account(&self) -> impl Future<Output = Result<(), AuthError>> + Send;

    /// End the current session. Does nothing when signed out.
    fn sign_out(&self);

    fn current_uid(&self) -> Option<String>;
}
