//! Domain records shared by the repositories, the client and the view-models.

mod case;
mod chat;
mod community;
mod draft;
mod private_chat;
mod section;
mod user;

pub use case::CaseFile;
pub use chat::ChatMessage;
pub use community::{default_news, ForumAnswer, ForumPost, LawyerProfile, NewsArticle};
pub use draft::{render_html, DraftInput, DraftTemplate};
pub use private_chat::{chat_room_id, ChatRoomSummary, PrivateMessage};
pub use section::{filter_by_category, load_sections, search_sections, BnsSection, ALL_CATEGORIES};
pub use user::{Role, Tab, UnknownRole, UserProfile};
