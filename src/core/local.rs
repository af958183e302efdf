//! Local YAML content files.
//!
//! Local files ship with the application, so any failure here is fatal to
//! the load that hit it.

use std::path::{Path, PathBuf};

use crate::domain::{ContentKind, ContentRecord, RawContent};

use super::loader::LoadError;

/// Files matching a glob pattern, in glob order
pub fn matching_files(pattern: &str) -> Result<Vec<PathBuf>, LoadError> {
    let paths = glob::glob(pattern).map_err(|source| LoadError::Pattern {
        pattern: pattern.to_string(),
        source,
    })?;

    paths
        .map(|entry| entry.map_err(LoadError::from))
        .collect()
}

/// Slug for a content file: its stem, optionally without an `NNN-` prefix
pub fn slug_from_path(path: &Path, trim_numeric_id_prefix: bool) -> String {
    let stem = path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();

    if trim_numeric_id_prefix {
        trim_numeric_prefix(&stem).to_string()
    } else {
        stem
    }
}

/// `"042-overview"` -> `"overview"`; anything else is returned unchanged
pub fn trim_numeric_prefix(name: &str) -> &str {
    let digits = name.bytes().take_while(u8::is_ascii_digit).count();
    if digits == 0 {
        return name;
    }

    name[digits..].strip_prefix('-').unwrap_or(name)
}

/// Parse one YAML file into a record of the given kind
pub async fn load_file(
    path: &Path,
    kind: ContentKind,
    trim_numeric_id_prefix: bool,
) -> Result<ContentRecord, LoadError> {
    let content = tokio::fs::read_to_string(path)
        .await
        .map_err(|source| LoadError::Io {
            path: path.to_path_buf(),
            source,
        })?;

    let raw: RawContent = serde_yaml::from_str(&content).map_err(|source| LoadError::Parse {
        path: path.to_path_buf(),
        source,
    })?;

    Ok(raw.into_record(kind, slug_from_path(path, trim_numeric_id_prefix)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_slug_from_path() {
        let path = Path::new("/content/slides/042-overview.yml");
        assert_eq!(slug_from_path(path, true), "overview");
        assert_eq!(slug_from_path(path, false), "042-overview");
    }

    #[test]
    fn test_trim_numeric_prefix_edge_cases() {
        assert_eq!(trim_numeric_prefix("003-intro"), "intro");
        assert_eq!(trim_numeric_prefix("intro"), "intro");
        assert_eq!(trim_numeric_prefix("2024"), "2024");
        assert_eq!(trim_numeric_prefix("12abc"), "12abc");
        assert_eq!(trim_numeric_prefix("1-2-3"), "2-3");
        assert_eq!(trim_numeric_prefix("-intro"), "-intro");
    }

    #[tokio::test]
    async fn test_load_file_maps_kind() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("010-editing.yml");
        std::fs::write(&path, "name: Editing\ndescription: How to edit\n").unwrap();

        let record = load_file(&path, ContentKind::Module, true).await.unwrap();
        assert_eq!(record.slug, "editing");
        assert_eq!(record.display_name(), "Editing");
        assert!(record.translations.is_none());
    }

    #[tokio::test]
    async fn test_load_file_parse_error() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("broken.yml");
        std::fs::write(&path, "title: [unclosed\n").unwrap();

        let result = load_file(&path, ContentKind::Slide, false).await;
        assert!(matches!(result, Err(LoadError::Parse { .. })));
    }

    #[test]
    fn test_matching_files_sorted() {
        let temp = TempDir::new().unwrap();
        for name in ["002-b.yml", "001-a.yml", "notes.txt"] {
            std::fs::write(temp.path().join(name), "title: x\n").unwrap();
        }

        let pattern = format!("{}/*.yml", temp.path().display());
        let files = matching_files(&pattern).unwrap();
        let names: Vec<_> = files
            .iter()
            .map(|p| p.file_name().unwrap().to_string_lossy().into_owned())
            .collect();
        assert_eq!(names, vec!["001-a.yml", "002-b.yml"]);
    }
}
