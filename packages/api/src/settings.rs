//! Layered application settings.
//!
//! Built-in defaults, then an optional `lawsphere.toml`, then environment
//! variables prefixed `LAWSPHERE_` with `__` between nested keys, e.g.
//! `LAWSPHERE_FIREBASE__API_KEY`.

use std::path::Path;
use std::time::Duration;

use config::{Config, ConfigError, Environment, File, FileFormat};
use serde::Deserialize;
use thiserror::Error;

pub const CONFIG_FILE: &str = "lawsphere.toml";
pub const ENV_PREFIX: &str = "LAWSPHERE";

#[derive(Debug, Error)]
pub enum SettingsError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error("invalid URL for {key}: {source}")]
    InvalidUrl {
        key: &'static str,
        #[source]
        source: oauth2::url::ParseError,
    },
    #[error("{0} is not configured")]
    Missing(&'static str),
    #[error("cannot build HTTP client: {0}")]
    HttpClient(#[source] reqwest::Error),
}

#[derive(Debug, Clone, Deserialize)]
pub struct ApiSettings {
    pub base_url: String,
    pub timeout_secs: u64,
}

impl ApiSettings {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct AuthSettings {
    pub timeout_secs: u64,
}

impl AuthSettings {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct FirebaseSettings {
    pub api_key: String,
    pub auth_base_url: String,
    /// Firestore project holding `users/{uid}` and the feature collections.
    pub project_id: String,
    pub firestore_base_url: String,
}

impl FirebaseSettings {
    pub fn is_configured(&self) -> bool {
        !self.api_key.trim().is_empty()
    }

    /// The Firestore project id, required whenever Firebase is configured.
    pub fn require_project_id(&self) -> Result<&str, SettingsError> {
        let project = self.project_id.trim();
        if project.is_empty() {
            return Err(SettingsError::Missing("firebase.project_id"));
        }
        Ok(project)
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct GoogleSettings {
    pub client_id: String,
    pub client_secret: String,
    pub redirect_url: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct StoreSettings {
    pub data_dir: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    pub api: ApiSettings,
    pub auth: AuthSettings,
    pub firebase: FirebaseSettings,
    pub google: GoogleSettings,
    pub store: StoreSettings,
}

impl Settings {
    /// Load from `lawsphere.toml` in the working directory and the environment.
    pub fn new() -> Result<Self, SettingsError> {
        Self::load(Path::new(CONFIG_FILE), ENV_PREFIX)
    }

    pub fn load(file: &Path, env_prefix: &str) -> Result<Self, SettingsError> {
        let config = Config::builder()
            .set_default("api.base_url", "http://10.0.2.2:3000/")?
            .set_default("api.timeout_secs", 60)?
            .set_default("auth.timeout_secs", 30)?
            .set_default("firebase.api_key", "")?
            .set_default(
                "firebase.auth_base_url",
                "https://identitytoolkit.googleapis.com/v1",
            )?
            .set_default("firebase.project_id", "")?
            .set_default(
                "firebase.firestore_base_url",
                "https://firestore.googleapis.com/v1",
            )?
            .set_default("google.client_id", "")?
            .set_default("google.client_secret", "")?
            .set_default(
                "google.redirect_url",
                "http://localhost:8080/auth/google/callback",
            )?
            .set_default("store.data_dir", "lawsphere-data")?
            .add_source(
                File::from(file)
                    .format(FileFormat::Toml)
                    .required(false),
            )
            .add_source(
                Environment::with_prefix(env_prefix)
                    .prefix_separator("_")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        Ok(config.try_deserialize()?)
    }
}
