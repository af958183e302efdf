//! In-memory wiki for offline runs and tests.
//!
//! Answers the same queries the loader issues against a real wiki
//! (`prop=links`, `meta=messagegroupstats`, page content) from fixed data,
//! and records every request it sees.

use std::collections::{HashMap, HashSet};
use std::sync::Mutex;

use async_trait::async_trait;
use serde_json::{json, Value};

use super::{TransportError, WikiTransport};

#[derive(Debug, Default)]
pub struct StaticWiki {
    pages: HashMap<String, String>,
    links: HashMap<String, Vec<String>>,
    stats: HashMap<String, Vec<(String, u64, u64)>>,
    failing: HashSet<String>,
    requests: Mutex<Vec<String>>,
}

impl StaticWiki {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a page with the given raw content
    pub fn with_page(mut self, title: impl Into<String>, content: impl Into<String>) -> Self {
        self.pages.insert(title.into(), content.into());
        self
    }

    /// Set the pages linked from a base page
    pub fn with_links<I, S>(mut self, base_page: impl Into<String>, titles: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.links
            .insert(base_page.into(), titles.into_iter().map(Into::into).collect());
        self
    }

    /// Add a translation stats row (`code`, `total`, `translated`) for a page
    pub fn with_stats(
        mut self,
        page: impl Into<String>,
        code: impl Into<String>,
        total: u64,
        translated: u64,
    ) -> Self {
        self.stats
            .entry(page.into())
            .or_default()
            .push((code.into(), total, translated));
        self
    }

    /// Make every request touching `title` fail with an HTTP 503
    pub fn with_failure(mut self, title: impl Into<String>) -> Self {
        self.failing.insert(title.into());
        self
    }

    /// Requests seen so far, as `kind:target`
    pub fn requests(&self) -> Vec<String> {
        self.requests
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
    }

    fn record(&self, request: String) {
        self.requests
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push(request);
    }

    fn check(&self, target: &str) -> Result<(), TransportError> {
        if self.failing.contains(target) {
            Err(TransportError::Status(503))
        } else {
            Ok(())
        }
    }
}

fn param<'a>(params: &'a [(&str, String)], key: &str) -> Option<&'a str> {
    params
        .iter()
        .find(|(k, _)| *k == key)
        .map(|(_, v)| v.as_str())
}

#[async_trait]
impl WikiTransport for StaticWiki {
    async fn query(&self, params: &[(&str, String)]) -> Result<Option<Value>, TransportError> {
        if param(params, "prop") == Some("links") {
            let title = param(params, "titles").unwrap_or_default();
            self.record(format!("links:{}", title));
            self.check(title)?;

            let page = match self.links.get(title) {
                Some(links) => json!({
                    "title": title,
                    "links": links.iter().map(|t| json!({ "ns": 0, "title": t })).collect::<Vec<_>>(),
                }),
                None => json!({ "title": title }),
            };
            return Ok(Some(json!({ "pages": [page] })));
        }

        if param(params, "meta") == Some("messagegroupstats") {
            let group = param(params, "mgsgroup").unwrap_or_default();
            self.record(format!("stats:{}", group));
            let page = group.strip_prefix("page-").unwrap_or(group);
            self.check(page)?;

            return Ok(self.stats.get(page).map(|rows| {
                let rows: Vec<Value> = rows
                    .iter()
                    .map(|(code, total, translated)| {
                        json!({ "code": code, "total": total, "translated": translated })
                    })
                    .collect();
                json!({ "messagegroupstats": rows })
            }));
        }

        self.record("query:unsupported".to_string());
        Ok(None)
    }

    async fn get_page_content(&self, title: &str) -> Result<Option<String>, TransportError> {
        self.record(format!("page:{}", title));
        self.check(title)?;
        Ok(self.pages.get(title).cloned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_answers_links_and_pages() {
        let wiki = StaticWiki::new()
            .with_links("Base", ["A", "B"])
            .with_page("A", "{}");

        let data = wiki
            .query(&[("prop", "links".to_string()), ("titles", "Base".to_string())])
            .await
            .unwrap()
            .unwrap();
        assert_eq!(data["pages"][0]["links"][1]["title"], "B");

        assert_eq!(wiki.get_page_content("A").await.unwrap().as_deref(), Some("{}"));
        assert!(wiki.get_page_content("B").await.unwrap().is_none());
        assert_eq!(wiki.requests(), vec!["links:Base", "page:A", "page:B"]);
    }

    #[tokio::test]
    async fn test_failure_injection() {
        let wiki = StaticWiki::new().with_page("A", "x").with_failure("A");
        assert!(matches!(
            wiki.get_page_content("A").await,
            Err(TransportError::Status(503))
        ));
    }
}
