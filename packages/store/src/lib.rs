pub mod document;
pub mod error;
pub mod query;
pub mod subscription;

mod file_store;
mod memory;

pub use document::{new_document_id, validate_collection, validate_id, Document, DocumentStore};
pub use error::StoreError;
pub use file_store::FileStore;
pub use memory::MemoryStore;
pub use query::{Direction, Query};
pub use subscription::{Listeners, Subscription};
