//! Configuration for training content loaders.
//!
//! Configuration sources (highest priority first):
//! 1. Environment variables (TRAINING_WIKI_API_URL, TRAINING_CACHE_DIR)
//! 2. Config file (.training-loader/config.yaml, or `--config`)
//! 3. Defaults (meta.wikimedia.org, ~/.training-loader/cache)
//!
//! Config file discovery:
//! - Searches current directory and parents for .training-loader/config.yaml
//! - Relative paths and file patterns resolve against the project root
//!   (the directory containing .training-loader/)

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::Deserialize;
use thiserror::Error;

use crate::adapters::{JsonFileCache, WikiSettings};
use crate::domain::ContentKind;

const CONFIG_DIR: &str = ".training-loader";
const CONFIG_FILE: &str = "config.yaml";

/// Invalid loader configuration
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Cache key cannot be empty")]
    EmptyCacheKey,

    #[error("Local file pattern cannot be empty")]
    EmptyFilePattern,

    #[error("Invalid local file pattern '{pattern}': {source}")]
    InvalidFilePattern {
        pattern: String,
        #[source]
        source: glob::PatternError,
    },

    #[error("Wiki base page cannot be blank (omit it to disable wiki loading)")]
    BlankWikiBasePage,

    #[error("Loader '{0}' is defined more than once")]
    DuplicateLoader(String),
}

/// Everything one loader needs, validated at construction
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoaderConfig {
    /// Kind of record every source is mapped into
    pub content_kind: ContentKind,

    /// Key the collection is published under
    pub cache_key: String,

    /// Glob pattern for local YAML files
    pub local_file_pattern: String,

    /// Strip a leading `NNN-` from file names when deriving slugs
    pub trim_numeric_id_prefix: bool,

    /// Wiki page whose links are the wiki components
    pub wiki_base_page: Option<String>,
}

impl LoaderConfig {
    pub fn new(
        content_kind: ContentKind,
        cache_key: impl Into<String>,
        local_file_pattern: impl Into<String>,
        trim_numeric_id_prefix: bool,
        wiki_base_page: Option<String>,
    ) -> Result<Self, ConfigError> {
        let cache_key = cache_key.into();
        if cache_key.trim().is_empty() {
            return Err(ConfigError::EmptyCacheKey);
        }

        let local_file_pattern = local_file_pattern.into();
        if local_file_pattern.trim().is_empty() {
            return Err(ConfigError::EmptyFilePattern);
        }
        glob::Pattern::new(&local_file_pattern).map_err(|source| {
            ConfigError::InvalidFilePattern {
                pattern: local_file_pattern.clone(),
                source,
            }
        })?;

        if wiki_base_page.as_deref().is_some_and(|page| page.trim().is_empty()) {
            return Err(ConfigError::BlankWikiBasePage);
        }

        Ok(Self {
            content_kind,
            cache_key,
            local_file_pattern,
            trim_numeric_id_prefix,
            wiki_base_page,
        })
    }
}

/// Raw config file schema (matches YAML structure)
#[derive(Debug, Clone, Deserialize)]
pub struct ConfigFile {
    pub version: String,
    #[serde(default)]
    pub wiki: WikiSettings,
    #[serde(default)]
    pub cache: CacheSection,
    #[serde(default)]
    pub loaders: Vec<LoaderSection>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct CacheSection {
    /// Cache directory (relative to the project root)
    pub directory: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoaderSection {
    pub name: String,
    pub content_kind: ContentKind,
    /// Defaults to the loader name
    pub cache_key: Option<String>,
    pub local_file_pattern: String,
    #[serde(default)]
    pub trim_numeric_id_prefix: bool,
    pub wiki_base_page: Option<String>,
}

/// A configured loader and the name it is selected by
#[derive(Debug, Clone)]
pub struct NamedLoader {
    pub name: String,
    pub config: LoaderConfig,
}

/// Resolved configuration with absolute paths
#[derive(Debug, Clone)]
pub struct ResolvedConfig {
    pub wiki: WikiSettings,
    pub cache_dir: PathBuf,
    pub loaders: Vec<NamedLoader>,
    /// Path to config file (if found)
    pub config_file: Option<PathBuf>,
}

impl ResolvedConfig {
    pub fn loader(&self, name: &str) -> Option<&NamedLoader> {
        self.loaders.iter().find(|l| l.name == name)
    }
}

/// Find config file by searching current directory and parents
fn find_config_file() -> Option<PathBuf> {
    let mut current = std::env::current_dir().ok()?;

    loop {
        let config_path = current.join(CONFIG_DIR).join(CONFIG_FILE);
        if config_path.exists() {
            return Some(config_path);
        }

        if !current.pop() {
            break;
        }
    }

    None
}

/// Load and parse config file
fn load_config_file(path: &Path) -> Result<ConfigFile> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {}", path.display()))?;

    serde_yaml::from_str(&content)
        .with_context(|| format!("Failed to parse config file: {}", path.display()))
}

/// Resolve a path that may be relative to the project root
fn resolve_path(base: &Path, path_str: &str) -> PathBuf {
    let path = PathBuf::from(path_str);
    if path.is_absolute() {
        path
    } else {
        base.join(path)
            .canonicalize()
            .unwrap_or_else(|_| base.join(path_str))
    }
}

/// Anchor a relative glob pattern at the project root
fn resolve_pattern(base: &Path, pattern: &str) -> String {
    if Path::new(pattern).is_absolute() {
        pattern.to_string()
    } else {
        base.join(pattern).to_string_lossy().into_owned()
    }
}

/// Project root for a config file: the parent of .training-loader/, or the
/// file's own directory when it lives anywhere else
fn project_root(config_path: &Path) -> PathBuf {
    let dir = match config_path.parent() {
        Some(dir) if !dir.as_os_str().is_empty() => dir,
        _ => return PathBuf::from("."),
    };

    if dir.file_name().is_some_and(|name| name == CONFIG_DIR) {
        dir.parent()
            .map(Path::to_path_buf)
            .unwrap_or_else(|| PathBuf::from("."))
    } else {
        dir.to_path_buf()
    }
}

fn resolve_loaders(base: &Path, sections: Vec<LoaderSection>) -> Result<Vec<NamedLoader>> {
    let mut loaders: Vec<NamedLoader> = Vec::with_capacity(sections.len());

    for section in sections {
        if loaders.iter().any(|l| l.name == section.name) {
            return Err(ConfigError::DuplicateLoader(section.name).into());
        }

        let config = LoaderConfig::new(
            section.content_kind,
            section.cache_key.unwrap_or_else(|| section.name.clone()),
            resolve_pattern(base, &section.local_file_pattern),
            section.trim_numeric_id_prefix,
            section.wiki_base_page,
        )
        .with_context(|| format!("Invalid configuration for loader '{}'", section.name))?;

        loaders.push(NamedLoader {
            name: section.name,
            config,
        });
    }

    Ok(loaders)
}

/// Load configuration from all sources.
///
/// An explicit path must exist; otherwise the nearest config file is used,
/// and without one the defaults apply with no loaders configured.
pub fn load_config(explicit: Option<&Path>) -> Result<ResolvedConfig> {
    let config_file = match explicit {
        Some(path) => Some(path.to_path_buf()),
        None => find_config_file(),
    };

    let (mut wiki, mut cache_dir, loaders) = if let Some(ref config_path) = config_file {
        let config = load_config_file(config_path)?;
        let base_dir = project_root(config_path);

        let cache_dir = match config.cache.directory {
            Some(ref dir) => resolve_path(&base_dir, dir),
            None => JsonFileCache::default_dir()?,
        };
        let loaders = resolve_loaders(&base_dir, config.loaders)?;

        (config.wiki, cache_dir, loaders)
    } else {
        (WikiSettings::default(), JsonFileCache::default_dir()?, Vec::new())
    };

    if let Ok(api_url) = std::env::var("TRAINING_WIKI_API_URL") {
        wiki.api_url = api_url;
    }
    if let Ok(dir) = std::env::var("TRAINING_CACHE_DIR") {
        cache_dir = PathBuf::from(dir);
    }

    Ok(ResolvedConfig {
        wiki,
        cache_dir,
        loaders,
        config_file,
    })
}
