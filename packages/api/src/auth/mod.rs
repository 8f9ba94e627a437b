//! Authentication: the [`AuthSession`] coordinator, its provider seams and their
//! implementations.

mod config;
mod coordinator;
mod federated;
mod firebase;
mod google;
mod identity;
mod local;
mod password;
mod state;

pub use config::OAuthConfig;
pub use coordinator::{AuthSession, DEFAULT_TIMEOUT, MIN_PASSWORD_LEN};
pub use federated::{FederatedProvider, ProviderResult, SignInRequest};
pub use firebase::{map_identity_toolkit_error, FirebaseAuth};
pub use google::{GoogleOAuth, GOOGLE_PROVIDER_ID};
pub use identity::{FederatedCredential, Identity, IdentityProvider};
pub use local::{LocalIdentityProvider, MemoryIdentityProvider, ACCOUNTS};
pub use password::{hash_password, verify_password};
pub use state::{AuthState, AuthSuccess};
