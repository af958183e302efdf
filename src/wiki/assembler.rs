//! Builds one content record from a wiki page.
//!
//! A component page holds the record as JSON. When that JSON names a
//! `wiki_page`, the authored text lives there: it is parsed for the record's
//! fields, and each translated subpage (`<wiki_page>/<code>`) is parsed into
//! the record's translations.

use indexmap::IndexMap;
use std::sync::Arc;

use serde_json::Value;
use thiserror::Error;
use tracing::{debug, instrument};

use crate::adapters::{TransportError, WikiTransport};
use crate::domain::{ContentKind, ContentRecord, PageFields, RawContent};

use super::parser::WikiSlideParser;
use super::resolver::resolve_translations;

/// Failures that abort the assembly of a single page
#[derive(Debug, Error)]
pub enum AssembleError {
    #[error("Failed to fetch wiki page '{page}': {source}")]
    Transport {
        page: String,
        #[source]
        source: TransportError,
    },

    #[error("Wiki page '{page}' is not valid content JSON: {source}")]
    InvalidJson {
        page: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("Wiki page '{0}' does not exist")]
    MissingPage(String),
}

/// Assembles records of one content kind
pub struct ContentAssembler {
    transport: Arc<dyn WikiTransport>,
    kind: ContentKind,
}

impl ContentAssembler {
    pub fn new(transport: Arc<dyn WikiTransport>, kind: ContentKind) -> Self {
        Self { transport, kind }
    }

    pub fn kind(&self) -> ContentKind {
        self.kind
    }

    pub fn transport(&self) -> &dyn WikiTransport {
        self.transport.as_ref()
    }

    /// Assemble the record stored on `page_title`.
    ///
    /// `Ok(None)` when the page does not exist. Any failure fetching the
    /// referenced page or one of its translations fails the whole page.
    #[instrument(skip(self), fields(kind = %self.kind))]
    pub async fn assemble(&self, page_title: &str) -> Result<Option<ContentRecord>, AssembleError> {
        let Some(text) = self.fetch(page_title).await? else {
            debug!("Wiki page does not exist");
            return Ok(None);
        };

        let invalid_json = |source| AssembleError::InvalidJson {
            page: page_title.to_string(),
            source,
        };
        let value: Value = serde_json::from_str(&text).map_err(invalid_json)?;
        if value.is_null() {
            return Ok(None);
        }
        let raw: RawContent = serde_json::from_value(value).map_err(invalid_json)?;

        let slug = wiki_slug(raw.slug.as_deref(), raw.wiki_page.as_deref(), page_title);
        let mut record = raw.into_record(self.kind, slug);
        let mut translations = IndexMap::new();

        if let Some(wiki_page) = record.wiki_page.clone() {
            record.merge_page_fields(self.page_fields(&wiki_page).await?);

            for code in resolve_translations(self.transport(), Some(&wiki_page)).await {
                let translated_page = format!("{}/{}", wiki_page, code);
                let fields = self.page_fields(&translated_page).await?;
                translations.insert(code, fields);
            }
        }

        debug!(slug = %record.slug, translations = translations.len(), "Assembled wiki content");
        record.translations = Some(translations);
        Ok(Some(record))
    }

    /// Fetch and parse a wikitext page into fields of this assembler's kind
    async fn page_fields(&self, page: &str) -> Result<PageFields, AssembleError> {
        let text = self
            .fetch(page)
            .await?
            .ok_or_else(|| AssembleError::MissingPage(page.to_string()))?;

        Ok(WikiSlideParser::new(&text).fields(self.kind))
    }

    async fn fetch(&self, page: &str) -> Result<Option<String>, AssembleError> {
        self.transport
            .get_page_content(page)
            .await
            .map_err(|source| AssembleError::Transport {
                page: page.to_string(),
                source,
            })
    }
}

/// Slug of a wiki record: its own `slug` field, else derived from the
/// referenced page, else from the page it was stored on.
pub fn wiki_slug(slug: Option<&str>, wiki_page: Option<&str>, page_title: &str) -> String {
    if let Some(slug) = slug.map(str::trim).filter(|s| !s.is_empty()) {
        return slug.to_string();
    }

    let source = wiki_page.unwrap_or(page_title);
    let last = source.rsplit('/').next().unwrap_or(source);

    last.trim()
        .split(|c: char| c.is_whitespace() || c == '_')
        .filter(|part| !part.is_empty())
        .collect::<Vec<_>>()
        .join("-")
        .to_lowercase()
}
