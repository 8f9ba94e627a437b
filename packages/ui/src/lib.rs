//! View-models for the LawSphere screens.
//!
//! Each view-model owns its observable state in `tokio::sync::watch` channels; a
//! screen subscribes to the receivers and calls the async intents. Rendering
//! itself lives in the platform front ends.

mod cases;
mod chat;
mod community;
mod private_chat;

pub use cases::CaseDashboardViewModel;
pub use chat::{ChatViewModel, NO_ANSWER, NO_COMPARISON};
pub use community::CommunityViewModel;
pub use private_chat::PrivateChatViewModel;
