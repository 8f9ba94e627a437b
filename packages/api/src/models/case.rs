use serde::{Deserialize, Serialize};

fn default_status() -> String {
    "Active".to_string()
}

/// A court case tracked by a lawyer, stored at `users/{uid}/cases/{id}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CaseFile {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub client_name: String,
    #[serde(default)]
    pub case_number: String,
    #[serde(default)]
    pub court_name: String,
    /// Free-form date, ISO `YYYY-MM-DD` sorts correctly.
    #[serde(default)]
    pub next_hearing_date: String,
    #[serde(default = "default_status")]
    pub status: String,
    #[serde(default)]
    pub notes: String,
}

impl CaseFile {
    pub fn new(
        client_name: impl Into<String>,
        case_number: impl Into<String>,
        court_name: impl Into<String>,
        next_hearing_date: impl Into<String>,
        notes: impl Into<String>,
    ) -> Self {
        Self {
            id: String::new(),
            client_name: client_name.into(),
            case_number: case_number.into(),
            court_name: court_name.into(),
            next_hearing_date: next_hearing_date.into(),
            status: default_status(),
            notes: notes.into(),
        }
    }
}
