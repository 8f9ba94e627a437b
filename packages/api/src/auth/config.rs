//! OAuth provider configuration.

use oauth2::{AuthUrl, ClientId, ClientSecret, RedirectUrl, TokenUrl};

use crate::settings::{GoogleSettings, SettingsError};

const GOOGLE_AUTH_URL: &str = "https://accounts.google.com/o/oauth2/v2/auth";
const GOOGLE_TOKEN_URL: &str = "https://oauth2.googleapis.com/token";

/// OAuth provider configuration.
#[derive(Debug, Clone)]
pub struct OAuthConfig {
    pub client_id: ClientId,
    pub client_secret: ClientSecret,
    pub auth_url: AuthUrl,
    pub token_url: TokenUrl,
    pub redirect_url: RedirectUrl,
}

impl OAuthConfig {
    /// Create Google OAuth config from settings.
    pub fn google(settings: &GoogleSettings) -> Result<Self, SettingsError> {
        if settings.client_id.trim().is_empty() {
            return Err(SettingsError::Missing("google.client_id"));
        }

        Ok(Self {
            client_id: ClientId::new(settings.client_id.clone()),
            client_secret: ClientSecret::new(settings.client_secret.clone()),
            auth_url: AuthUrl::new(GOOGLE_AUTH_URL.to_string())
                .map_err(|source| SettingsError::InvalidUrl { key: "auth_url", source })?,
            token_url: TokenUrl::new(GOOGLE_TOKEN_URL.to_string())
                .map_err(|source| SettingsError::InvalidUrl { key: "token_url", source })?,
            redirect_url: RedirectUrl::new(settings.redirect_url.clone()).map_err(|source| {
                SettingsError::InvalidUrl {
                    key: "google.redirect_url",
                    source,
                }
            })?,
        })
    }
}
