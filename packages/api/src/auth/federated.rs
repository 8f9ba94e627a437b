//! The federated (OAuth) sign-in seam.

use std::future::Future;

use reqwest::Url;

use super::identity::FederatedCredential;
use crate::error::AuthError;

/// Where to send the user to start a third-party sign-in.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignInRequest {
    pub url: String,
    /// CSRF state the provider echoes back in [`ProviderResult`].
    pub state: String,
}

/// What the provider hands back to the redirect URL.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProviderResult {
    pub code: String,
    pub state: String,
}

impl ProviderResult {
    /// Parse `code` and `state` out of an OAuth redirect URL.
    pub fn from_redirect_url(url: &str) -> Result<Self, AuthError> {
        let url = Url::parse(url).map_err(|e| AuthError::InvalidInput(e.to_string()))?;
        let mut code = None;
        let mut state = None;
        for (key, value) in url.query_pairs() {
            match key.as_ref() {
                "code" => code = Some(value.into_owned()),
                "state" => state = Some(value.into_owned()),
                "error" => return Err(AuthError::Unknown(format!("Sign-in cancelled: {value}"))),
                _ => {}
            }
        }
        match (code, state) {
            (Some(code), Some(state)) => Ok(Self { code, state }),
            _ => Err(AuthError::InvalidInput(
                "Redirect is missing code or state".to_string(),
            )),
        }
    }
}

/// Third-party OAuth provider.
pub trait FederatedProvider: Send + Sync {
    /// Build the authorization URL, requesting identity and email claims.
    fn begin_sign_in(&self) -> Result<SignInRequest, AuthError>;

    /// Exchange the provider's redirect result for a credential.
    fn complete_sign_in(
        &self,
        result: &ProviderResult,
    ) -> impl Future<Output = Result<FederatedCredential, AuthError>> + Send;

    /// Forget the cached account choice so the next sign-in shows the account chooser.
    fn revoke_account_selection(&self) -> impl Future<Output = Result<(), AuthError>> + Send;
}

fn not_configured() -> AuthError {
    AuthError::InvalidInput("Google sign-in is not configured".to_string())
}

/// An absent provider refuses to start or finish a sign-in. Revoking is a no-op.
impl<F: FederatedProvider> FederatedProvider for Option<F> {
    fn begin_sign_in(&self) -> Result<SignInRequest, AuthError> {
        match self {
            Some(provider) => provider.begin_sign_in(),
            None => Err(not_configured()),
        }
    }

    async fn complete_sign_in(
        &self,
        result: &ProviderResult,
    ) -> Result<FederatedCredential, AuthError> {
        match self {
            Some(provider) => provider.complete_sign_in(result).await,
            None => Err(not_configured()),
        }
    }

    async fn revoke_account_selection(&self) -> Result<(), AuthError> {
        match self {
            Some(provider) => provider.revoke_account_selection().await,
            None => Ok(()),
        }
    }
}
