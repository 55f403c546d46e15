pub mod document;
pub mod store;

pub use document::{StorySummary, STORY_FILE};
pub use store::{Story, StoryListing, StoryStore};

#[derive(Debug, thiserror::Error)]
pub enum StoryError {
    #[error("stories path not configured")]
    RootUnset,
    #[error("stories directory not found")]
    RootNotFound,
    #[error("invalid slug format")]
    InvalidSlug,
    #[error("a story with this slug already exists")]
    AlreadyExists,
    #[error("story not found")]
    NotFound,
    #[error("malformed story document: {0}")]
    InvalidDocument(String),
    #[error("storage error: {0}")]
    Io(#[from] std::io::Error),
}
