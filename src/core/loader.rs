//! Loads training content from local files and the wiki, then publishes it.
//!
//! Each public operation builds a fresh collection, runs its phases in
//! order, and writes the result to the cache exactly once. Local files are
//! trusted, so any failure there aborts the call before anything is
//! published. Wiki pages are not: a page that is missing, fails to assemble,
//! or fails validation is reported and skipped.

use std::path::PathBuf;
use std::sync::Arc;

use serde_json::{json, Value};
use thiserror::Error;
use tracing::{debug, info, instrument, warn};

use crate::adapters::{CacheError, ContentCache, DiagnosticLevel, DiagnosticSink, WikiTransport};
use crate::config::LoaderConfig;
use crate::domain::{Collection, CollectionBuilder};
use crate::wiki::{resolve_components, ContentAssembler};

use super::local;

/// Message reported for every skipped wiki page
pub const INVALID_WIKI_CONTENT: &str = "Invalid wiki training content";

/// Errors that fail a whole load call
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("Invalid file pattern '{pattern}': {source}")]
    Pattern {
        pattern: String,
        #[source]
        source: glob::PatternError,
    },

    #[error("Failed to list content files: {0}")]
    Glob(#[from] glob::GlobError),

    #[error("Failed to read {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse {}: {source}", .path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },

    #[error("Failed to publish collection '{key}': {source}")]
    Cache {
        key: String,
        #[source]
        source: CacheError,
    },
}

/// Loader for one kind of training content
pub struct TrainingLoader {
    config: LoaderConfig,
    assembler: ContentAssembler,
    cache: Arc<dyn ContentCache>,
    diagnostics: Arc<dyn DiagnosticSink>,
}

impl TrainingLoader {
    pub fn new(
        config: LoaderConfig,
        transport: Arc<dyn WikiTransport>,
        cache: Arc<dyn ContentCache>,
        diagnostics: Arc<dyn DiagnosticSink>,
    ) -> Self {
        let assembler = ContentAssembler::new(transport, config.content_kind);
        Self {
            config,
            assembler,
            cache,
            diagnostics,
        }
    }

    pub fn config(&self) -> &LoaderConfig {
        &self.config
    }

    /// Load local files and publish them
    #[instrument(skip(self), fields(cache_key = %self.config.cache_key))]
    pub async fn load_local_content(&self) -> Result<(), LoadError> {
        let mut builder = CollectionBuilder::new();
        self.load_from_files(&mut builder).await?;
        self.publish(builder.build()).await
    }

    /// Load local files, then wiki components, and publish both
    #[instrument(skip(self), fields(cache_key = %self.config.cache_key))]
    pub async fn load_local_and_wiki_content(&self) -> Result<(), LoadError> {
        let mut builder = CollectionBuilder::new();
        self.load_from_files(&mut builder).await?;
        self.load_from_wiki(&mut builder).await;
        self.publish(builder.build()).await
    }

    async fn load_from_files(&self, builder: &mut CollectionBuilder) -> Result<(), LoadError> {
        let files = local::matching_files(&self.config.local_file_pattern)?;

        for path in &files {
            let record = local::load_file(
                path,
                self.config.content_kind,
                self.config.trim_numeric_id_prefix,
            )
            .await?;
            debug!(path = %path.display(), slug = %record.slug, "Loaded content file");
            builder.push(record);
        }

        info!(count = files.len(), pattern = %self.config.local_file_pattern, "Loaded local content");
        Ok(())
    }

    async fn load_from_wiki(&self, builder: &mut CollectionBuilder) {
        let Some(base_page) = self.config.wiki_base_page.as_deref() else {
            warn!("No wiki base page configured, skipping wiki content");
            return;
        };

        let components = resolve_components(self.assembler.transport(), base_page).await;
        let mut loaded = 0usize;

        for page in &components {
            match self.assembler.assemble(page).await {
                Ok(Some(record)) => match record.validate() {
                    Ok(()) => {
                        builder.push(record);
                        loaded += 1;
                    }
                    Err(error) => {
                        let content = serde_json::to_value(&record).unwrap_or_default();
                        self.report_skipped(page, content, Some(error.to_string()));
                    }
                },
                Ok(None) => self.report_skipped(page, Value::Null, None),
                Err(error) => self.report_skipped(page, Value::Null, Some(error.to_string())),
            }
        }

        info!(
            base_page,
            components = components.len(),
            loaded,
            skipped = components.len() - loaded,
            "Loaded wiki content"
        );
    }

    fn report_skipped(&self, page: &str, content: Value, error: Option<String>) {
        let mut extra = json!({ "page": page, "content": content });
        if let Some(error) = error {
            extra["error"] = Value::String(error);
        }
        self.diagnostics
            .capture(INVALID_WIKI_CONTENT, DiagnosticLevel::Warning, extra);
    }

    async fn publish(&self, collection: Collection) -> Result<(), LoadError> {
        let key = &self.config.cache_key;
        self.cache
            .write(key, &collection)
            .await
            .map_err(|source| LoadError::Cache {
                key: key.clone(),
                source,
            })?;

        info!(key = %key, records = collection.len(), "Published collection");
        Ok(())
    }
}
