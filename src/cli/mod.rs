//! Command-line interface for training-loader.
//!
//! Provides commands for loading configured content into the cache and for
//! inspecting how the wiki side resolves components, translations, and
//! individual pages.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};

use crate::adapters::{JsonFileCache, MediaWikiClient, TracingSink, WikiTransport};
use crate::config::{self, NamedLoader, ResolvedConfig};
use crate::core::TrainingLoader;
use crate::domain::ContentKind;
use crate::wiki::{resolve_components, resolve_translations, ContentAssembler};

/// training-loader - Load training slides and modules into the content cache
#[derive(Parser, Debug)]
#[command(name = "training-loader")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Config file (defaults to the nearest .training-loader/config.yaml)
    #[arg(long, global = true, env = "TRAINING_LOADER_CONFIG")]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Load content for every configured loader and publish it
    Load {
        /// Also load components linked from each loader's wiki base page
        #[arg(long)]
        wiki: bool,

        /// Only run the loader with this name
        #[arg(long)]
        only: Option<String>,
    },

    /// List the component pages linked from a wiki base page
    Components {
        /// Base page title
        base_page: String,
    },

    /// List languages a wiki page has been translated into
    Translations {
        /// Page title
        page: String,
    },

    /// Assemble one wiki component page and print it as JSON
    Assemble {
        /// Component page title
        page: String,

        /// Kind of content to assemble
        #[arg(short, long, value_enum, default_value = "slide")]
        kind: KindArg,
    },

    /// Show resolved configuration (debug)
    Config,
}

/// Content kind for CLI (maps to ContentKind)
#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum KindArg {
    Slide,
    Module,
}

impl From<KindArg> for ContentKind {
    fn from(k: KindArg) -> Self {
        match k {
            KindArg::Slide => ContentKind::Slide,
            KindArg::Module => ContentKind::Module,
        }
    }
}

impl Cli {
    /// Execute the CLI command
    pub async fn execute(self) -> Result<()> {
        let cfg = config::load_config(self.config.as_deref())?;

        match self.command {
            Commands::Load { wiki, only } => load(&cfg, wiki, only.as_deref()).await,
            Commands::Components { base_page } => list_components(&cfg, &base_page).await,
            Commands::Translations { page } => list_translations(&cfg, &page).await,
            Commands::Assemble { page, kind } => assemble_page(&cfg, &page, kind.into()).await,
            Commands::Config => show_config(&cfg),
        }
    }
}

fn wiki_client(cfg: &ResolvedConfig) -> Result<Arc<dyn WikiTransport>> {
    let client = MediaWikiClient::new(cfg.wiki.clone())
        .context("Failed to create wiki API client")?;
    Ok(Arc::new(client))
}

/// Run the selected loaders against the file cache
async fn load(cfg: &ResolvedConfig, include_wiki: bool, only: Option<&str>) -> Result<()> {
    if cfg.loaders.is_empty() {
        anyhow::bail!("No loaders configured. Add a loaders section to .training-loader/config.yaml");
    }

    let selected: Vec<&NamedLoader> = match only {
        Some(name) => vec![cfg
            .loader(name)
            .with_context(|| format!("No loader named '{}'", name))?],
        None => cfg.loaders.iter().collect(),
    };

    let transport = wiki_client(cfg)?;
    let cache = Arc::new(JsonFileCache::new(&cfg.cache_dir));
    let sink = Arc::new(TracingSink);

    for named in selected {
        let loader = TrainingLoader::new(
            named.config.clone(),
            transport.clone(),
            cache.clone(),
            sink.clone(),
        );

        let result = if include_wiki {
            loader.load_local_and_wiki_content().await
        } else {
            loader.load_local_content().await
        };
        result.with_context(|| format!("Loader '{}' failed", named.name))?;

        let published = cache
            .read(&named.config.cache_key)
            .await?
            .map(|entry| entry.records.len())
            .unwrap_or(0);

        println!(
            "✓ {} ({}): {} records → {}",
            named.name,
            named.config.content_kind,
            published,
            cache.entry_path(&named.config.cache_key).display()
        );
    }

    Ok(())
}

async fn list_components(cfg: &ResolvedConfig, base_page: &str) -> Result<()> {
    let transport = wiki_client(cfg)?;
    let components = resolve_components(transport.as_ref(), base_page).await;

    if components.is_empty() {
        println!("No component pages linked from '{}'", base_page);
        return Ok(());
    }

    for title in &components {
        println!("{}", title);
    }
    println!();
    println!("{} component(s)", components.len());

    Ok(())
}

async fn list_translations(cfg: &ResolvedConfig, page: &str) -> Result<()> {
    let transport = wiki_client(cfg)?;
    let languages = resolve_translations(transport.as_ref(), Some(page)).await;

    if languages.is_empty() {
        println!("No translations of '{}'", page);
    } else {
        println!("{}", languages.join(" "));
    }

    Ok(())
}

async fn assemble_page(cfg: &ResolvedConfig, page: &str, kind: ContentKind) -> Result<()> {
    let assembler = ContentAssembler::new(wiki_client(cfg)?, kind);

    let Some(record) = assembler.assemble(page).await? else {
        println!("Page '{}' does not exist", page);
        return Ok(());
    };

    println!("{}", serde_json::to_string_pretty(&record)?);
    if let Err(e) = record.validate() {
        eprintln!("⚠ {}", e);
    }

    Ok(())
}

fn show_config(cfg: &ResolvedConfig) -> Result<()> {
    println!("Training Loader Configuration");
    println!();
    println!(
        "Config file: {}",
        cfg.config_file
            .as_ref()
            .map(|p| p.display().to_string())
            .unwrap_or_else(|| "(none - using defaults)".to_string())
    );
    println!();
    println!("Wiki:");
    println!("  API URL:     {}", cfg.wiki.api_url);
    println!("  User agent:  {}", cfg.wiki.user_agent);
    println!("  Timeout:     {}s", cfg.wiki.timeout_seconds);
    println!("  Max retries: {}", cfg.wiki.max_retries);
    println!();
    println!("Cache directory: {}", cfg.cache_dir.display());
    println!();
    println!("Loaders:");
    if cfg.loaders.is_empty() {
        println!("  (none)");
    }
    for named in &cfg.loaders {
        let c = &named.config;
        println!("  {} [{}]", named.name, c.content_kind);
        println!("    cache key:  {}", c.cache_key);
        println!("    files:      {}", c.local_file_pattern);
        println!("    trim ids:   {}", c.trim_numeric_id_prefix);
        println!(
            "    wiki base:  {}",
            c.wiki_base_page.as_deref().unwrap_or("(none)")
        );
    }

    Ok(())
}
