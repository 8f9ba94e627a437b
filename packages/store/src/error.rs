//! Store error type.

use thiserror::Error;

/// Errors surfaced by a [`crate::DocumentStore`] backend.
#[derive(Debug, Error)]
pub enum StoreError {
    /// A collection path or document id is malformed.
    #[error("invalid document path: {0}")]
    InvalidPath(String),

    /// The backend cannot be reached.
    #[error("store unavailable: {0}")]
    Unavailable(String),

    /// A stored document does not match the expected shape.
    #[error("failed to decode document {id}: {source}")]
    Decode {
        id: String,
        #[source]
        source: serde_json::Error,
    },

    /// The backend answered but refused the request.
    #[error("store rejected request: {0}")]
    Rejected(String),

    #[error("failed to encode document: {0}")]
    Encode(#[from] serde_json::Error),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}
