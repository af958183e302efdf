//! The published collection and the builder that accumulates it.

use serde::{Deserialize, Serialize};

use super::content::ContentRecord;

/// Ordered, immutable set of loaded records.
///
/// Order is discovery order; duplicate slugs are kept as-is.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Collection {
    records: Vec<ContentRecord>,
}

impl Collection {
    pub fn records(&self) -> &[ContentRecord] {
        &self.records
    }

    pub fn iter(&self) -> std::slice::Iter<'_, ContentRecord> {
        self.records.iter()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Slugs in collection order
    pub fn slugs(&self) -> Vec<&str> {
        self.records.iter().map(|r| r.slug.as_str()).collect()
    }

    pub fn into_records(self) -> Vec<ContentRecord> {
        self.records
    }
}

impl<'a> IntoIterator for &'a Collection {
    type Item = &'a ContentRecord;
    type IntoIter = std::slice::Iter<'a, ContentRecord>;

    fn into_iter(self) -> Self::IntoIter {
        self.records.iter()
    }
}

/// Append-only accumulator owned by one load call
#[derive(Debug, Default)]
pub struct CollectionBuilder {
    records: Vec<ContentRecord>,
}

impl CollectionBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, record: ContentRecord) {
        self.records.push(record);
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Freeze the accumulated records for publishing
    pub fn build(self) -> Collection {
        Collection {
            records: self.records,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{ContentKind, RawContent};

    fn record(slug: &str) -> ContentRecord {
        RawContent::default().into_record(ContentKind::Slide, slug)
    }

    #[test]
    fn test_builder_preserves_order_and_duplicates() {
        let mut builder = CollectionBuilder::new();
        builder.push(record("b"));
        builder.push(record("a"));
        builder.push(record("b"));
        assert_eq!(builder.len(), 3);

        let collection = builder.build();
        assert_eq!(collection.slugs(), vec!["b", "a", "b"]);
    }

    #[test]
    fn test_empty_collection_serializes_as_empty_array() {
        let collection = CollectionBuilder::new().build();
        assert!(collection.is_empty());
        assert_eq!(serde_json::to_string(&collection).unwrap(), "[]");
    }
}
