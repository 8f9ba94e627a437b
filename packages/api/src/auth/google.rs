//! # Google OAuth 2.0 implementation
//!
//! Implements the Google Authorization Code flow with PKCE as a
//! [`FederatedProvider`].
//!
//! ## Types
//!
//! - [`GoogleUser`]: deserialization target for the Google userinfo API response
//!   (`googleapis.com/oauth2/v2/userinfo`).
//! - [`ConfiguredClient`]: a fully-typed `oauth2::Client` alias with auth and token
//!   endpoints set.
//! - [`GoogleOAuth`]: the public handler that wraps an [`OAuthConfig`].
//!
//! ## Flow
//!
//! 1. **[`begin_sign_in`](GoogleOAuth::begin_sign_in)** builds an authorization URL
//!    requesting `openid`, `email` and `profile` scopes, generates a random PKCE
//!    challenge, and keeps the CSRF state and verifier in memory for 10 minutes.
//!    After [`revoke_account_selection`](GoogleOAuth::revoke_account_selection) the
//!    next URL also carries `prompt=select_account`.
//!
//! 2. **[`complete_sign_in`](GoogleOAuth::complete_sign_in)** takes the redirect
//!    result. It:
//!    - Removes the pending state (a state is usable once and only before expiry).
//!    - Exchanges the authorization code and PKCE verifier for an access token.
//!    - Fetches the user's profile from the Google userinfo endpoint and returns it
//!      as a [`FederatedCredential`] for the identity provider.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use chrono::{DateTime, Duration, Utc};
use oauth2::basic::BasicClient;
use oauth2::{
    AuthorizationCode, CsrfToken, EndpointNotSet, EndpointSet, PkceCodeChallenge,
    PkceCodeVerifier, Scope, TokenResponse,
};
use reqwest::Client;
use serde::Deserialize;

use super::config::OAuthConfig;
use super::federated::{FederatedProvider, ProviderResult, SignInRequest};
use super::identity::FederatedCredential;
use crate::error::AuthError;

const USERINFO_URL: &str = "https://www.googleapis.com/oauth2/v2/userinfo";
pub const GOOGLE_PROVIDER_ID: &str = "google.com";

/// Google user info from API.
#[derive(Debug, Deserialize)]
struct GoogleUser {
    id: String,
    email: Option<String>,
    name: Option<String>,
}

/// OAuth client type with auth URL and token URL set.
type ConfiguredClient = oauth2::Client<
    oauth2::basic::BasicErrorResponse,
    oauth2::basic::BasicTokenResponse,
    oauth2::basic::BasicTokenIntrospectionResponse,
    oauth2::StandardRevocableToken,
    oauth2::basic::BasicRevocationErrorResponse,
    EndpointSet,
    EndpointNotSet,
    EndpointNotSet,
    EndpointNotSet,
    EndpointSet,
>;

struct PendingSignIn {
    verifier: String,
    expires_at: DateTime<Utc>,
}

/// Google OAuth handler.
#[derive(Clone)]
pub struct GoogleOAuth {
    config: OAuthConfig,
    http: Client,
    pending: Arc<Mutex<HashMap<String, PendingSignIn>>>,
    select_account: Arc<AtomicBool>,
}

impl GoogleOAuth {
    /// Create a new Google OAuth handler.
    pub fn new(config: OAuthConfig) -> Result<Self, AuthError> {
        let http = reqwest::ClientBuilder::new()
            .redirect(reqwest::redirect::Policy::none())
            .build()?;
        Ok(Self {
            config,
            http,
            pending: Arc::new(Mutex::new(HashMap::new())),
            select_account: Arc::new(AtomicBool::new(false)),
        })
    }

    fn create_client(&self) -> ConfiguredClient {
        BasicClient::new(self.config.client_id.clone())
            .set_client_secret(self.config.client_secret.clone())
            .set_auth_uri(self.config.auth_url.clone())
            .set_token_uri(self.config.token_url.clone())
            .set_redirect_uri(self.config.redirect_url.clone())
    }

    /// Take the verifier for `state`, rejecting unknown or expired states.
    fn take_verifier(&self, state: &str) -> Result<String, AuthError> {
        let mut pending = self.pending.lock().unwrap_or_else(|e| e.into_inner());
        let now = Utc::now();
        pending.retain(|_, p| p.expires_at > now);
        pending
            .remove(state)
            .map(|p| p.verifier)
            .ok_or_else(|| AuthError::Unknown("Invalid or expired OAuth state".to_string()))
    }

    async fn fetch_user(&self, access_token: &str) -> Result<GoogleUser, AuthError> {
        let resp = self
            .http
            .get(USERINFO_URL)
            .bearer_auth(access_token)
            .send()
            .await?;
        let status = resp.status();
        if !status.is_success() {
            return Err(AuthError::Unknown(format!(
                "Google userinfo returned {status}"
            )));
        }
        Ok(resp.json().await?)
    }
}

impl FederatedProvider for GoogleOAuth {
    fn begin_sign_in(&self) -> Result<SignInRequest, AuthError> {
        let client = self.create_client();
        let (pkce_challenge, pkce_verifier) = PkceCodeChallenge::new_random_sha256();

        let mut request = client
            .authorize_url(CsrfToken::new_random)
            .add_scope(Scope::new("openid".to_string()))
            .add_scope(Scope::new("email".to_string()))
            .add_scope(Scope::new("profile".to_string()))
            .set_pkce_challenge(pkce_challenge);
        if self.select_account.swap(false, Ordering::SeqCst) {
            request = request.add_extra_param("prompt", "select_account");
        }
        let (auth_url, csrf_state) = request.url();

        let state = csrf_state.secret().clone();
        let now = Utc::now();
        let mut pending = self.pending.lock().unwrap_or_else(|e| e.into_inner());
        pending.retain(|_, p| p.expires_at > now);
        pending.insert(
            state.clone(),
            PendingSignIn {
                verifier: pkce_verifier.secret().clone(),
                expires_at: now + Duration::minutes(10),
            },
        );
        drop(pending);
        tracing::debug!("google sign-in started");

        Ok(SignInRequest {
            url: auth_url.to_string(),
            state,
        })
    }

    async fn complete_sign_in(
        &self,
        result: &ProviderResult,
    ) -> Result<FederatedCredential, AuthError> {
        let pkce_verifier = self.take_verifier(&result.state)?;

        let token_result = self
            .create_client()
            .exchange_code(AuthorizationCode::new(result.code.clone()))
            .set_pkce_verifier(PkceCodeVerifier::new(pkce_verifier))
            .request_async(&self.http)
            .await
            .map_err(|e| AuthError::Unknown(format!("Token exchange failed: {e}")))?;

        let access_token = token_result.access_token().secret().clone();
        let google_user = self.fetch_user(&access_token).await?;
        tracing::info!(subject = %google_user.id, "google sign-in completed");

        Ok(FederatedCredential {
            provider_id: GOOGLE_PROVIDER_ID.to_string(),
            subject: google_user.id,
            access_token,
            display_name: google_user.name,
            email: google_user.email,
        })
    }

    async fn revoke_account_selection(&self) -> Result<(), AuthError> {
        self.select_account.store(true, Ordering::SeqCst);
        Ok(())
    }
}
