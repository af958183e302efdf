//! Shared fixtures for loader integration tests.

#![allow(dead_code)]

use std::path::Path;
use std::sync::Arc;

use tempfile::TempDir;
use training_loader::adapters::{MemoryCache, RecordingSink, StaticWiki};
use training_loader::{ContentKind, LoaderConfig, TrainingLoader};

pub const BASE_PAGE: &str = "Training modules/dashboard/slides";

/// Write a file under the temp dir, creating parent directories
pub fn write_file(root: &Path, relative: &str, body: &str) {
    let path = root.join(relative);
    std::fs::create_dir_all(path.parent().unwrap()).unwrap();
    std::fs::write(path, body).unwrap();
}

/// Two local slide files, in an order glob will sort
pub fn slide_fixtures() -> TempDir {
    let temp = TempDir::new().unwrap();
    write_file(
        temp.path(),
        "slides/001-welcome.yml",
        "id: 1\ntitle: Welcome\ncontent: Hello there.\n",
    );
    write_file(
        temp.path(),
        "slides/002-editing.yml",
        "id: 2\ntitle: Editing\ncontent: Click edit.\n",
    );
    temp
}

pub fn slide_config(root: &Path, trim: bool, wiki_base_page: Option<&str>) -> LoaderConfig {
    LoaderConfig::new(
        ContentKind::Slide,
        "slides",
        format!("{}/slides/*.yml", root.display()),
        trim,
        wiki_base_page.map(str::to_string),
    )
    .unwrap()
}

/// JSON stored on a component page pointing at its authored page
pub fn component_json(slug: &str, wiki_page: &str) -> String {
    serde_json::json!({ "slug": slug, "wiki_page": wiki_page }).to_string()
}

pub struct Harness {
    pub loader: TrainingLoader,
    pub wiki: Arc<StaticWiki>,
    pub cache: Arc<MemoryCache>,
    pub sink: Arc<RecordingSink>,
}

pub fn harness(config: LoaderConfig, wiki: StaticWiki) -> Harness {
    let wiki = Arc::new(wiki);
    let cache = Arc::new(MemoryCache::new());
    let sink = Arc::new(RecordingSink::new());
    let loader = TrainingLoader::new(config, wiki.clone(), cache.clone(), sink.clone());

    Harness {
        loader,
        wiki,
        cache,
        sink,
    }
}
