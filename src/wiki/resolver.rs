//! Component and translation discovery for wiki base pages.
//!
//! Both resolvers absorb every failure into an empty result: callers can
//! always proceed with zero components or zero translations.

use serde_json::Value;
use tracing::{debug, warn};

use crate::adapters::mediawiki::first_page;
use crate::adapters::WikiTransport;

/// Links fetched per base page. Results beyond this are not followed:
/// there is no continuation, so a base page linking more pages than this
/// only contributes the first batch.
pub const MAX_COMPONENT_LINKS: u32 = 500;

/// Titles of the pages linked from `base_page`, in wiki order
pub async fn resolve_components(transport: &dyn WikiTransport, base_page: &str) -> Vec<String> {
    let params = [
        ("prop", "links".to_string()),
        ("titles", base_page.to_string()),
        ("pllimit", MAX_COMPONENT_LINKS.to_string()),
    ];

    match transport.query(&params).await {
        Ok(Some(data)) => {
            let titles = link_titles(&data).unwrap_or_default();
            debug!(base_page, count = titles.len(), "Resolved component pages");
            titles
        }
        Ok(None) => {
            warn!(base_page, "No link data returned for base page");
            Vec::new()
        }
        Err(error) => {
            warn!(base_page, %error, "Failed to query component links");
            Vec::new()
        }
    }
}

/// Language codes with a started translation of `base_page`, in wiki order.
///
/// `None` or an empty title short-circuits without touching the wiki.
pub async fn resolve_translations(
    transport: &dyn WikiTransport,
    base_page: Option<&str>,
) -> Vec<String> {
    let Some(base_page) = base_page.filter(|page| !page.is_empty()) else {
        return Vec::new();
    };

    let params = [
        ("meta", "messagegroupstats".to_string()),
        ("mgsgroup", format!("page-{}", base_page)),
    ];

    match transport.query(&params).await {
        Ok(Some(data)) => {
            let languages = translated_languages(&data);
            debug!(base_page, ?languages, "Resolved translations");
            languages
        }
        Ok(None) => Vec::new(),
        Err(error) => {
            warn!(base_page, %error, "Failed to query translation stats");
            Vec::new()
        }
    }
}

/// `pages[0].links[*].title` of a `prop=links` query
pub fn link_titles(data: &Value) -> Option<Vec<String>> {
    let links = first_page(data)?.get("links")?.as_array()?;
    Some(
        links
            .iter()
            .filter_map(|link| link.get("title").and_then(Value::as_str))
            .map(str::to_string)
            .collect(),
    )
}

/// Codes of languages whose stats show translatable and translated units.
///
/// Zero `total` means the group does not apply; zero `translated` means
/// nobody has started. Both are excluded.
pub fn translated_languages(data: &Value) -> Vec<String> {
    let Some(stats) = data.get("messagegroupstats").and_then(Value::as_array) else {
        return Vec::new();
    };

    stats
        .iter()
        .filter(|entry| count(entry, "total") > 0 && count(entry, "translated") > 0)
        .filter_map(|entry| entry.get("code").and_then(Value::as_str))
        .map(str::to_string)
        .collect()
}

fn count(entry: &Value, field: &str) -> u64 {
    entry.get(field).and_then(Value::as_u64).unwrap_or(0)
}
