//! # API crate: core services for LawSphere
//!
//! Everything the LawSphere front ends call lives here, behind explicit
//! dependencies so each service can be built against fakes in tests.
//!
//! ## Modules
//!
//! | Module | Purpose |
//! |--------|---------|
//! | [`auth`] | [`AuthSession`] coordinator, identity and federated provider seams, Firebase, Google OAuth and local providers |
//! | [`client`] | [`LawAssistant`] seam and the HTTP client for the AI API |
//! | [`error`] | `AuthError`, `ApiError`, `RepositoryError` |
//! | [`firestore`] | [`FirestoreStore`], the Cloud Firestore document store used with Firebase accounts |
//! | [`models`] | Roles, profiles, cases, chat, forum, sections and drafting templates |
//! | [`profiles`] | [`ProfileStore`] seam over `users/{uid}` |
//! | [`repository`] | Cases, chat history, community and private chat over a document store |
//! | [`settings`] | Layered configuration (defaults, `lawsphere.toml`, environment) |

pub mod auth;
pub mod client;
pub mod error;
pub mod firestore;
pub mod models;
pub mod profiles;
pub mod repository;
pub mod settings;

pub use auth::{AuthSession, AuthState, AuthSuccess, FederatedProvider, IdentityProvider};
pub use client::{ChatResponse, Language, LawApiClient, LawAssistant};
pub use error::{ApiError, AuthError, RepositoryError};
pub use firestore::FirestoreStore;
pub use models::{Role, Tab, UserProfile};
pub use profiles::{ProfileRepository, ProfileStore};
pub use settings::Settings;
