//! # Firebase Authentication over the Identity Toolkit REST API
//!
//! | Operation | Endpoint |
//! |-----------|----------|
//! | password sign-in | `accounts:signInWithPassword` |
//! | account creation | `accounts:signUp` |
//! | federated sign-in | `accounts:signInWithIdp` |
//! | account deletion | `accounts:delete` |
//!
//! Every request carries the project's web API key as `?key=`. The session is the
//! `localId` (the uid) plus the `idToken` of the last successful call; signing out
//! just forgets it.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::json;

use super::identity::{FederatedCredential, Identity, IdentityProvider};
use crate::error::AuthError;
use crate::settings::FirebaseSettings;

#[derive(Debug, Clone)]
struct FirebaseSession {
    uid: String,
    id_token: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct AuthResponse {
    local_id: String,
    id_token: String,
    #[serde(default)]
    email: Option<String>,
    #[serde(default)]
    display_name: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ErrorEnvelope {
    error: ErrorBody,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    message: String,
}

/// Map an Identity Toolkit error message to an [`AuthError`].
///
/// Messages look like `EMAIL_EXISTS` or `WEAK_PASSWORD : Password should be at
/// least 6 characters`.
pub fn map_identity_toolkit_error(message: &str) -> AuthError {
    let code = message.split(" : ").next().unwrap_or(message).trim();
    match code {
        "EMAIL_NOT_FOUND" | "INVALID_PASSWORD" | "INVALID_LOGIN_CREDENTIALS" | "USER_DISABLED"
        | "INVALID_IDP_RESPONSE" => AuthError::InvalidCredentials,
        "EMAIL_EXISTS" | "FEDERATED_USER_ID_ALREADY_LINKED" => AuthError::AccountAlreadyExists,
        "INVALID_EMAIL" | "MISSING_EMAIL" | "MISSING_PASSWORD" | "WEAK_PASSWORD" => {
            AuthError::InvalidInput(message.to_string())
        }
        _ => AuthError::Unknown(message.to_string()),
    }
}

/// Form-encoded `postBody` for `accounts:signInWithIdp`.
fn idp_post_body(credential: &FederatedCredential) -> String {
    oauth2::url::form_urlencoded::Serializer::new(String::new())
        .append_pair("access_token", &credential.access_token)
        .append_pair("providerId", &credential.provider_id)
        .finish()
}

/// Identity provider backed by Firebase Authentication.
#[derive(Clone)]
pub struct FirebaseAuth {
    http: reqwest::Client,
    base_url: String,
    api_key: String,
    session: Arc<Mutex<Option<FirebaseSession>>>,
}

impl FirebaseAuth {
    pub fn new(settings: &FirebaseSettings, timeout: Duration) -> Result<Self, AuthError> {
        let http = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            http,
            base_url: settings.auth_base_url.trim_end_matches('/').to_string(),
            api_key: settings.api_key.clone(),
            session: Arc::new(Mutex::new(None)),
        })
    }

    async fn call<T: DeserializeOwned>(
        &self,
        method: &str,
        body: serde_json::Value,
    ) -> Result<T, AuthError> {
        let url = format!("{}/accounts:{}", self.base_url, method);
        tracing::debug!(method, "identity toolkit request");
        let resp = self
            .http
            .post(&url)
            .query(&[("key", self.api_key.as_str())])
            .json(&body)
            .send()
            .await?;

        let status = resp.status();
        if !status.is_success() {
            let text = resp.text().await.unwrap_or_default();
            let message = serde_json::from_str::<ErrorEnvelope>(&text)
                .map(|e| e.error.message)
                .unwrap_or_else(|_| format!("HTTP {status}"));
            tracing::warn!(method, %status, %message, "identity toolkit rejected request");
            return Err(map_identity_toolkit_error(&message));
        }
        Ok(resp.json().await?)
    }

    fn start_session(&self, resp: AuthResponse) -> Identity {
        *self.session.lock().unwrap_or_else(|e| e.into_inner()) = Some(FirebaseSession {
            uid: resp.local_id.clone(),
            id_token: resp.id_token,
        });
        Identity {
            uid: resp.local_id,
            email: resp.email,
            display_name: resp.display_name,
        }
    }

    /// ID token of the signed-in user, for calls to other Firebase services.
    pub fn id_token(&self) -> Option<String> {
        self.session().map(|s| s.id_token)
    }

    fn session(&self) -> Option<FirebaseSession> {
        self.session
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
    }
}

impl IdentityProvider for FirebaseAuth {
    async fn sign_in_with_password(
        &self,
        email: &str,
        password: &str,
    ) -> Result<Identity, AuthError> {
        let resp: AuthResponse = self
            .call(
                "signInWithPassword",
                json!({ "email": email, "password": password, "returnSecureToken": true }),
            )
            .await?;
        Ok(self.start_session(resp))
    }

    async fn create_account(&self, email: &str, password: &str) -> Result<Identity, AuthError> {
        let resp: AuthResponse = self
            .call(
                "signUp",
                json!({ "email": email, "password": password, "returnSecureToken": true }),
            )
            .await?;
        Ok(self.start_session(resp))
    }

    async fn sign_in_with_federated_credential(
        &self,
        credential: &FederatedCredential,
    ) -> Result<Identity, AuthError> {
        let post_body = idp_post_body(credential);
        let resp: AuthResponse = self
            .call(
                "signInWithIdp",
                json!({
                    "postBody": post_body,
                    "requestUri": "http://localhost",
                    "returnSecureToken": true,
                    "returnIdpCredential": true,
                }),
            )
            .await?;
        Ok(self.start_session(resp))
    }

    async fn delete_current_account(&self) -> Result<(), AuthError> {
        let Some(session) = self.session() else {
            return Err(AuthError::Unknown("No active session".to_string()));
        };
        let _: serde_json::Value = self
            .call("delete", json!({ "idToken": session.id_token }))
            .await?;
        tracing::info!(uid = %session.uid, "account deleted");
        self.sign_out();
        Ok(())
    }

    fn sign_out(&self) {
        self.session
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .take();
    }

    fn current_uid(&self) -> Option<String> {
        self.session().map(|s| s.uid)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn settings() -> FirebaseSettings {
        FirebaseSettings {
            api_key: "key".into(),
            auth_base_url: "https://identitytoolkit.googleapis.com/v1/".into(),
            project_id: "lawsphere-test".into(),
            firestore_base_url: "https://firestore.googleapis.com/v1".into(),
        }
    }

    #[test]
    fn test_error_mapping() {
        assert_eq!(
            map_identity_toolkit_error("INVALID_LOGIN_CREDENTIALS"),
            AuthError::InvalidCredentials
        );
        assert_eq!(
            map_identity_toolkit_error("EMAIL_EXISTS"),
            AuthError::AccountAlreadyExists
        );
        assert_eq!(
            map_identity_toolkit_error("WEAK_PASSWORD : Password should be at least 6 characters"),
            AuthError::InvalidInput(
                "WEAK_PASSWORD : Password should be at least 6 characters".into()
            )
        );
        assert!(matches!(
            map_identity_toolkit_error("TOO_MANY_ATTEMPTS_TRY_LATER"),
            AuthError::Unknown(_)
        ));
    }

    #[test]
    fn test_session_lifecycle() {
        let auth = FirebaseAuth::new(&settings(), Duration::from_secs(5)).unwrap();
        assert_eq!(auth.base_url, "https://identitytoolkit.googleapis.com/v1");
        assert!(auth.current_uid().is_none());

        let identity = auth.start_session(AuthResponse {
            local_id: "u1".into(),
            id_token: "token".into(),
            email: Some("a@x.com".into()),
            display_name: None,
        });
        assert_eq!(identity.uid, "u1");
        assert_eq!(auth.current_uid().as_deref(), Some("u1"));
        assert_eq!(auth.id_token().as_deref(), Some("token"));

        auth.sign_out();
        auth.sign_out();
        assert!(auth.current_uid().is_none());
    }

    #[tokio::test]
    async fn test_delete_without_session_fails_locally() {
        let auth = FirebaseAuth::new(&settings(), Duration::from_secs(5)).unwrap();
        assert!(auth.delete_current_account().await.is_err());
    }

    #[test]
    fn test_idp_post_body_is_form_encoded() {
        let credential = FederatedCredential {
            provider_id: "google.com".into(),
            subject: "g-1".into(),
            access_token: "ya29.a&b=c+d".into(),
            display_name: None,
            email: None,
        };
        let body = idp_post_body(&credential);
        assert_eq!(body, "access_token=ya29.a%26b%3Dc%2Bd&providerId=google.com");

        let pairs: Vec<(String, String)> = oauth2::url::form_urlencoded::parse(body.as_bytes())
            .into_owned()
            .collect();
        assert_eq!(pairs[0], ("access_token".into(), "ya29.a&b=c+d".into()));
    }
}
