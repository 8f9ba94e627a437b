use serde::{Deserialize, Serialize};

/// One turn of the AI legal chat.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatMessage {
    /// Document id; not stored in the document body.
    #[serde(default, skip_serializing)]
    pub id: String,
    #[serde(default)]
    pub text: String,
    #[serde(default)]
    pub is_user: bool,
    #[serde(default)]
    pub sources: Vec<String>,
    /// Milliseconds since the Unix epoch.
    #[serde(default)]
    pub timestamp: i64,
}

impl ChatMessage {
    pub fn user(text: impl Into<String>) -> Self {
        Self::new(text, true, Vec::new())
    }

    pub fn assistant(text: impl Into<String>, sources: Vec<String>) -> Self {
        Self::new(text, false, sources)
    }

    fn new(text: impl Into<String>, is_user: bool, sources: Vec<String>) -> Self {
        Self {
            id: String::new(),
            text: text.into(),
            is_user,
            sources,
            timestamp: chrono::Utc::now().timestamp_millis(),
        }
    }
}
