//! Domain types for the training loader.
//!
//! - Content: typed slide/module records and their translations
//! - Collection: the ordered set published to the cache

pub mod collection;
pub mod content;

// Re-export commonly used types
pub use collection::{Collection, CollectionBuilder};
pub use content::{
    ContentBody, ContentKind, ContentRecord, ContentValidationError, PageFields, Quiz,
    QuizAnswer, RawContent,
};
