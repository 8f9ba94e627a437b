//! Error types for authentication, the remote AI API and the feature repositories.

use store::StoreError;
use thiserror::Error;

use crate::models::Role;

/// Failure of an authentication operation.
///
/// Identity-provider and store failures are folded into this taxonomy;
/// [`AuthError::RoleMismatch`] is the only kind raised by the coordinator itself.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum AuthError {
    #[error("Invalid email or password")]
    InvalidCredentials,
    #[error("An account with this email already exists")]
    AccountAlreadyExists,
    #[error("Access denied: this account is registered as {stored}")]
    RoleMismatch { stored: Role },
    #[error("Could not save profile: {0}")]
    ProfilePersistenceFailed(String),
    #[error("Network unavailable")]
    NetworkUnavailable,
    #[error("Request timed out")]
    Timeout,
    #[error("{0}")]
    InvalidInput(String),
    #[error("Authentication failed: {0}")]
    Unknown(String),
}

impl From<StoreError> for AuthError {
    fn from(e: StoreError) -> Self {
        match e {
            StoreError::Unavailable(_) => AuthError::NetworkUnavailable,
            other => AuthError::Unknown(other.to_string()),
        }
    }
}

impl From<reqwest::Error> for AuthError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            AuthError::Timeout
        } else if e.is_connect() {
            AuthError::NetworkUnavailable
        } else {
            AuthError::Unknown(e.to_string())
        }
    }
}

/// Failure talking to the LawSphere AI API.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("server returned {status}: {body}")]
    Server { status: u16, body: String },
    #[error("invalid base URL: {0}")]
    BaseUrl(String),
}

/// Failure of a feature repository.
#[derive(Debug, Error)]
pub enum RepositoryError {
    #[error(transparent)]
    Store(#[from] StoreError),
    #[error("not found: {0}")]
    NotFound(String),
    #[error("not permitted: {0}")]
    Forbidden(String),
    #[error("invalid input: {0}")]
    Invalid(String),
    #[error("not signed in")]
    NotSignedIn,
}
