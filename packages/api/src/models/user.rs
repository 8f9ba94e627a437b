//! # User roles and profiles
//!
//! ## [`Role`]
//!
//! Every LawSphere account declares exactly one role when its profile is created:
//! `citizen` or `lawyer`. The role is fixed for the lifetime of the account and
//! decides which app sections are shown ([`Role::tabs`]) and who may answer forum
//! questions ([`Role::can_answer_forum`]).
//!
//! Roles serialise as lowercase strings and parse case-insensitively, so a stored
//! `"Lawyer"` still reads back as [`Role::Lawyer`]. Any other string is rejected.
//!
//! ## [`UserProfile`]
//!
//! The persisted record at `users/{uid}`: `{uid, name, email, role}`. It is written
//! once, at signup or at the first federated sign-in, and never rewritten by the
//! sign-in flows.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Declared user category.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Role {
    Citizen,
    Lawyer,
}

/// Sections of the app shell.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Tab {
    Chat,
    Explorer,
    Community,
    Drafting,
    Dashboard,
    Guide,
    Profile,
}

impl Tab {
    pub fn title(&self) -> &'static str {
        match self {
            Tab::Chat => "Chat",
            Tab::Explorer => "BNS",
            Tab::Community => "Forum",
            Tab::Drafting => "Draft",
            Tab::Dashboard => "Cases",
            Tab::Guide => "Help",
            Tab::Profile => "Me",
        }
    }
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Citizen => "citizen",
            Role::Lawyer => "lawyer",
        }
    }

    /// App sections available to this role, in display order.
    pub fn tabs(&self) -> &'static [Tab] {
        match self {
            Role::Lawyer => &[
                Tab::Chat,
                Tab::Explorer,
                Tab::Community,
                Tab::Drafting,
                Tab::Dashboard,
                Tab::Profile,
            ],
            Role::Citizen => &[
                Tab::Chat,
                Tab::Explorer,
                Tab::Community,
                Tab::Drafting,
                Tab::Guide,
                Tab::Profile,
            ],
        }
    }

    /// Only lawyers answer forum questions.
    pub fn can_answer_forum(&self) -> bool {
        matches!(self, Role::Lawyer)
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error for a string that is not a known role.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownRole(pub String);

impl fmt::Display for UnknownRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown role: {:?}", self.0)
    }
}

impl std::error::Error for UnknownRole {}

impl FromStr for Role {
    type Err = UnknownRole;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s.eq_ignore_ascii_case("citizen") {
            Ok(Role::Citizen)
        } else if s.eq_ignore_ascii_case("lawyer") {
            Ok(Role::Lawyer)
        } else {
            Err(UnknownRole(s.to_string()))
        }
    }
}

impl Serialize for Role {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for Role {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

/// Persisted profile at `users/{uid}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserProfile {
    pub uid: String,
    pub name: String,
    pub email: String,
    pub role: Role,
}

impl UserProfile {
    /// Display name, falling back to email if name is not set.
    pub fn display_name(&self) -> &str {
        if self.name.trim().is_empty() {
            &self.email
        } else {
            &self.name
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_role_parses_case_insensitively() {
        assert_eq!("citizen".parse::<Role>().unwrap(), Role::Citizen);
        assert_eq!("Lawyer".parse::<Role>().unwrap(), Role::Lawyer);
        assert_eq!(" LAWYER ".parse::<Role>().unwrap(), Role::Lawyer);
        assert!("admin".parse::<Role>().is_err());
    }

    #[test]
    fn test_profile_serialises_lowercase_role() {
        let profile = UserProfile {
            uid: "u1".into(),
            name: "Asha".into(),
            email: "a@x.com".into(),
            role: Role::Citizen,
        };
        let value = serde_json::to_value(&profile).unwrap();
        assert_eq!(
            value,
            json!({ "uid": "u1", "name": "Asha", "email": "a@x.com", "role": "citizen" })
        );
    }

    #[test]
    fn test_profile_reads_capitalised_role() {
        let profile: UserProfile = serde_json::from_value(json!({
            "uid": "u1", "name": "Dev", "email": "d@x.com", "role": "Lawyer"
        }))
        .unwrap();
        assert_eq!(profile.role, Role::Lawyer);
    }

    #[test]
    fn test_tabs_depend_on_role() {
        assert!(Role::Lawyer.tabs().contains(&Tab::Dashboard));
        assert!(!Role::Lawyer.tabs().contains(&Tab::Guide));
        assert!(Role::Citizen.tabs().contains(&Tab::Guide));
        assert!(!Role::Citizen.tabs().contains(&Tab::Dashboard));
        assert_eq!(Role::Citizen.tabs().len(), 6);
    }

    #[test]
    fn test_forum_privileges() {
        assert!(Role::Lawyer.can_answer_forum());
        assert!(!Role::Citizen.can_answer_forum());
    }

    #[test]
    fn test_display_name_falls_back_to_email() {
        let profile = UserProfile {
            uid: "u1".into(),
            name: " ".into(),
            email: "a@x.com".into(),
            role: Role::Citizen,
        };
        assert_eq!(profile.display_name(), "a@x.com");
    }
}
