//! Local Content Integration Tests
//!
//! Tests for the file phase: glob order, slug derivation, fail-fast parsing,
//! and publishing exactly once per call.

mod common;

use common::{harness, slide_config, slide_fixtures, write_file};
use tempfile::TempDir;
use training_loader::adapters::StaticWiki;
use training_loader::{ContentKind, LoadError, LoaderConfig};

#[tokio::test]
async fn test_local_content_published_in_glob_order() {
    let temp = slide_fixtures();
    let h = harness(slide_config(temp.path(), true, None), StaticWiki::new());

    h.loader.load_local_content().await.unwrap();

    let collection = h.cache.get("slides").unwrap();
    assert_eq!(collection.slugs(), vec!["welcome", "editing"]);
    assert_eq!(collection.records()[0].display_name(), "Welcome");
    assert_eq!(collection.records()[1].id, Some(2));
    assert!(collection.iter().all(|r| r.translations.is_none()));
    assert_eq!(h.cache.write_count("slides"), 1);
}

#[tokio::test]
async fn test_slugs_keep_numeric_prefix_when_not_trimming() {
    let temp = slide_fixtures();
    let h = harness(slide_config(temp.path(), false, None), StaticWiki::new());

    h.loader.load_local_content().await.unwrap();

    let collection = h.cache.get("slides").unwrap();
    assert_eq!(collection.slugs(), vec!["001-welcome", "002-editing"]);
}

#[tokio::test]
async fn test_local_only_never_touches_wiki() {
    let temp = slide_fixtures();
    let h = harness(
        slide_config(temp.path(), true, Some(common::BASE_PAGE)),
        StaticWiki::new().with_links(common::BASE_PAGE, ["Anything"]),
    );

    h.loader.load_local_content().await.unwrap();

    assert!(h.wiki.requests().is_empty());
    assert_eq!(h.cache.get("slides").unwrap().len(), 2);
}

#[tokio::test]
async fn test_parse_failure_aborts_without_publishing() {
    let temp = slide_fixtures();
    write_file(temp.path(), "slides/003-broken.yml", "title: [unclosed\n");
    let h = harness(slide_config(temp.path(), true, None), StaticWiki::new());

    let result = h.loader.load_local_content().await;

    match result {
        Err(LoadError::Parse { path, .. }) => {
            assert!(path.ends_with("003-broken.yml"));
        }
        other => panic!("Expected parse error, got {:?}", other),
    }
    assert_eq!(h.cache.write_count("slides"), 0);
    assert!(h.cache.get("slides").is_none());
}

#[tokio::test]
async fn test_no_matching_files_publishes_empty_collection() {
    let temp = TempDir::new().unwrap();
    let h = harness(slide_config(temp.path(), true, None), StaticWiki::new());

    h.loader.load_local_content().await.unwrap();

    assert_eq!(h.cache.write_count("slides"), 1);
    assert!(h.cache.get("slides").unwrap().is_empty());
}

#[tokio::test]
async fn test_duplicate_slugs_are_preserved() {
    let temp = TempDir::new().unwrap();
    write_file(temp.path(), "a/010-intro.yml", "name: A\ndescription: First\n");
    write_file(temp.path(), "b/020-intro.yml", "name: B\ndescription: Second\n");

    let config = LoaderConfig::new(
        ContentKind::Module,
        "modules",
        format!("{}/*/*.yml", temp.path().display()),
        true,
        None,
    )
    .unwrap();
    let h = harness(config, StaticWiki::new());

    h.loader.load_local_content().await.unwrap();

    let collection = h.cache.get("modules").unwrap();
    assert_eq!(collection.slugs(), vec!["intro", "intro"]);
    assert_eq!(collection.records()[1].display_name(), "B");
    assert_eq!(collection.records()[0].kind(), ContentKind::Module);
}

#[tokio::test]
async fn test_each_call_builds_a_fresh_collection() {
    let temp = slide_fixtures();
    let h = harness(slide_config(temp.path(), true, None), StaticWiki::new());

    h.loader.load_local_content().await.unwrap();
    h.loader.load_local_content().await.unwrap();

    assert_eq!(h.cache.write_count("slides"), 2);
    assert_eq!(h.cache.get("slides").unwrap().len(), 2);
}
