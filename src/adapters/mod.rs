//! Adapter interfaces for external systems.
//!
//! The loader talks to three collaborators it does not own: the wiki
//! (read queries and page content), the cache that receives the published
//! collection, and a sink for diagnostics about skipped content.

pub mod cache;
pub mod diagnostics;
pub mod mediawiki;
pub mod static_wiki;

use async_trait::async_trait;
use serde_json::Value;
use thiserror::Error;

pub use cache::{CacheError, ContentCache, JsonFileCache, MemoryCache};
pub use diagnostics::{Diagnostic, DiagnosticLevel, DiagnosticSink, RecordingSink, TracingSink};
pub use mediawiki::{MediaWikiClient, WikiSettings};
pub use static_wiki::StaticWiki;

/// Errors raised by a wiki transport
#[derive(Debug, Error)]
pub enum TransportError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Wiki API returned HTTP {0}")]
    Status(u16),

    #[error("Wiki API error [{code}]: {info}")]
    Api { code: String, info: String },

    #[error("Invalid wiki API URL '{0}'")]
    InvalidUrl(String),

    #[error("Unexpected wiki API response: {0}")]
    Decode(String),

    #[error("Wiki request exhausted {0} retries")]
    RetriesExhausted(usize),
}

/// Read access to a wiki
#[async_trait]
pub trait WikiTransport: Send + Sync {
    /// Run an `action=query` request and return its `query` member.
    ///
    /// `Ok(None)` means the wiki answered without query data.
    async fn query(&self, params: &[(&str, String)]) -> Result<Option<Value>, TransportError>;

    /// Latest wikitext of a page, or `None` if the page does not exist
    async fn get_page_content(&self, title: &str) -> Result<Option<String>, TransportError>;
}
