//! Core loading logic.
//!
//! This module contains:
//! - Local: YAML content files and slug derivation
//! - Loader: the local/wiki/publish orchestration

pub mod loader;
pub mod local;

// Re-export commonly used types
pub use loader::{LoadError, TrainingLoader, INVALID_WIKI_CONTENT};
pub use local::{slug_from_path, trim_numeric_prefix};
