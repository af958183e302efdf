//! training-loader - Training content aggregation
//!
//! Collects training slides and modules from two sources into one ordered
//! collection and publishes it to a cache for downstream consumers.
//!
//! # Sources
//!
//! - Local YAML files matched by a glob pattern (trusted, fail-fast)
//! - Wiki component pages linked from a base page, each with its
//!   translated subpages (untrusted, skipped on failure)
//!
//! # Modules
//!
//! - `adapters`: External systems (wiki API, cache, diagnostics)
//! - `core`: Loader orchestration and local files
//! - `domain`: Data structures (ContentRecord, Collection)
//! - `wiki`: Page parsing, component/translation discovery, assembly
//! - `cli`: Command-line interface
//!
//! # Usage
//!
//! ```bash
//! # Load local content for every configured loader
//! training-loader load
//!
//! # Include wiki components and their translations
//! training-loader load --wiki --only slides
//! ```

pub mod adapters;
pub mod cli;
pub mod config;
pub mod core;
pub mod domain;
pub mod wiki;

// Re-export main types at crate root for convenience
pub use adapters::{ContentCache, DiagnosticSink, WikiTransport};
pub use config::LoaderConfig;
pub use core::{LoadError, TrainingLoader};
pub use domain::{Collection, ContentKind, ContentRecord, PageFields};
pub use wiki::ContentAssembler;
