//! Observable authentication state and success payloads.

use crate::models::UserProfile;

/// State of the current authentication attempt, as shown by the UI.
///
/// `Idle` is only seen before the first attempt and after logout. Every
/// operation publishes `Loading` before it does any asynchronous work, then
/// settles on `Success` or `Error`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum AuthState {
    #[default]
    Idle,
    Loading,
    Success,
    Error(String),
}

impl AuthState {
    pub fn is_loading(&self) -> bool {
        matches!(self, AuthState::Loading)
    }
}

/// Result of a successful sign-in or signup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthSuccess {
    pub uid: String,
    /// Stored profile. `None` for a password login whose account has no profile.
    pub profile: Option<UserProfile>,
    /// A profile was created by this operation.
    pub created: bool,
    pub federated: bool,
}

impl AuthSuccess {
    pub fn message(&self) -> String {
        match (self.federated, self.created) {
            (false, false) => "Login Successful".to_string(),
            (false, true) => "Signup Successful".to_string(),
            (true, false) => "Welcome back".to_string(),
            (true, true) => match &self.profile {
                Some(profile) => format!("Account Created as {}", profile.role),
                None => "Account Created".to_string(),
            },
        }
    }
}
