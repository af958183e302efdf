//! MediaWiki Action API client.
//!
//! Issues GET requests against `api.php` with bounded retry on throttling
//! and server errors. Only the read side of the API is used.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{StatusCode, Url};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, warn};

use super::{TransportError, WikiTransport};

/// Connection settings for the wiki API
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WikiSettings {
    /// Full URL of the wiki's api.php
    #[serde(default = "default_api_url")]
    pub api_url: String,

    #[serde(default = "default_user_agent")]
    pub user_agent: String,

    /// Per-request timeout in seconds (default: 30)
    #[serde(default = "default_timeout_seconds")]
    pub timeout_seconds: u64,

    /// Retries after the first attempt (default: 2)
    #[serde(default = "default_max_retries")]
    pub max_retries: usize,

    /// Base backoff delay, doubled per attempt (default: 500ms)
    #[serde(default = "default_retry_delay_ms")]
    pub retry_delay_ms: u64,
}

fn default_api_url() -> String {
    "https://meta.wikimedia.org/w/api.php".to_string()
}
fn default_user_agent() -> String {
    concat!("training-loader/", env!("CARGO_PKG_VERSION")).to_string()
}
fn default_timeout_seconds() -> u64 {
    30
}
fn default_max_retries() -> usize {
    2
}
fn default_retry_delay_ms() -> u64 {
    500
}

impl Default for WikiSettings {
    fn default() -> Self {
        Self {
            api_url: default_api_url(),
            user_agent: default_user_agent(),
            timeout_seconds: default_timeout_seconds(),
            max_retries: default_max_retries(),
            retry_delay_ms: default_retry_delay_ms(),
        }
    }
}

/// Wiki transport backed by the MediaWiki Action API
pub struct MediaWikiClient {
    settings: WikiSettings,
    api_url: Url,
    client: reqwest::Client,
}

impl MediaWikiClient {
    pub fn new(settings: WikiSettings) -> Result<Self, TransportError> {
        let api_url = Url::parse(&settings.api_url)
            .map_err(|_| TransportError::InvalidUrl(settings.api_url.clone()))?;

        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(settings.timeout_seconds))
            .user_agent(settings.user_agent.clone())
            .build()?;

        Ok(Self {
            settings,
            api_url,
            client,
        })
    }

    pub fn api_url(&self) -> &str {
        self.api_url.as_str()
    }

    /// GET the API with the given parameters and return the decoded body
    async fn request_json(&self, params: &[(&str, String)]) -> Result<Value, TransportError> {
        let mut pairs: Vec<(&str, &str)> = Vec::with_capacity(params.len() + 2);
        pairs.push(("format", "json"));
        pairs.push(("formatversion", "2"));
        for (key, value) in params {
            if !value.is_empty() {
                pairs.push((*key, value.as_str()));
            }
        }

        let max_retries = self.settings.max_retries;
        for attempt in 0..=max_retries {
            let response = self
                .client
                .get(self.api_url.clone())
                .query(&pairs)
                .send()
                .await;

            match response {
                Ok(response) => {
                    let status = response.status();
                    if !status.is_success() {
                        if attempt < max_retries && is_retryable_status(status) {
                            warn!(%status, attempt, "Wiki API throttled or failing, retrying");
                            self.wait_before_retry(attempt).await;
                            continue;
                        }
                        return Err(TransportError::Status(status.as_u16()));
                    }

                    let payload: Value = response.json().await?;
                    if let Some(error) = payload.get("error") {
                        return Err(api_error(error));
                    }
                    return Ok(payload);
                }
                Err(error) => {
                    if attempt < max_retries && is_retryable_error(&error) {
                        warn!(%error, attempt, "Wiki API request failed, retrying");
                        self.wait_before_retry(attempt).await;
                        continue;
                    }
                    return Err(error.into());
                }
            }
        }

        Err(TransportError::RetriesExhausted(max_retries))
    }

    async fn wait_before_retry(&self, attempt: usize) {
        let exponent = u32::try_from(attempt).unwrap_or(8).min(8);
        let delay = self.settings.retry_delay_ms.saturating_mul(1u64 << exponent);
        tokio::time::sleep(Duration::from_millis(delay)).await;
    }
}

#[async_trait]
impl WikiTransport for MediaWikiClient {
    async fn query(&self, params: &[(&str, String)]) -> Result<Option<Value>, TransportError> {
        let mut full = Vec::with_capacity(params.len() + 1);
        full.push(("action", "query".to_string()));
        full.extend(params.iter().cloned());

        let payload = self.request_json(&full).await?;
        Ok(payload.get("query").cloned())
    }

    async fn get_page_content(&self, title: &str) -> Result<Option<String>, TransportError> {
        debug!(title, "Fetching page content");
        let query = self
            .query(&[
                ("titles", title.to_string()),
                ("prop", "revisions".to_string()),
                ("rvprop", "content".to_string()),
                ("rvslots", "main".to_string()),
            ])
            .await?;

        Ok(query.as_ref().and_then(page_content_from_query))
    }
}

/// First page of a `query.pages` member.
///
/// `formatversion=2` returns an array, version 1 an object keyed by page id.
pub fn first_page(query: &Value) -> Option<&Value> {
    match query.get("pages")? {
        Value::Array(pages) => pages.first(),
        Value::Object(pages) => pages.values().next(),
        _ => None,
    }
}

/// Wikitext of the latest revision in a `prop=revisions` query result
pub fn page_content_from_query(query: &Value) -> Option<String> {
    let page = first_page(query)?;

    // v1 marks missing pages with "missing": "", v2 with "missing": true
    match page.get("missing") {
        None | Some(Value::Bool(false)) => {}
        Some(_) => return None,
    }

    let revision = page.get("revisions")?.as_array()?.first()?;
    let content = revision
        .pointer("/slots/main/content")
        .or_else(|| revision.pointer("/slots/main/*"))
        .or_else(|| revision.get("content"))
        .or_else(|| revision.get("*"))?
        .as_str()?;

    if content.is_empty() {
        None
    } else {
        Some(content.to_string())
    }
}

fn api_error(error: &Value) -> TransportError {
    let code = error
        .get("code")
        .and_then(Value::as_str)
        .unwrap_or("unknown_error");
    let info = error
        .get("info")
        .and_then(Value::as_str)
        .unwrap_or("unknown info");

    TransportError::Api {
        code: code.to_string(),
        info: info.to_string(),
    }
}

fn is_retryable_status(status: StatusCode) -> bool {
    status == StatusCode::TOO_MANY_REQUESTS || status.is_server_error()
}

fn is_retryable_error(error: &reqwest::Error) -> bool {
    error.is_timeout() || error.is_connect() || error.is_request()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_invalid_api_url_rejected() {
        let settings = WikiSettings {
            api_url: "not a url".to_string(),
            ..Default::default()
        };
        assert!(matches!(
            MediaWikiClient::new(settings),
            Err(TransportError::InvalidUrl(_))
        ));
    }

    #[test]
    fn test_default_settings() {
        let client = MediaWikiClient::new(WikiSettings::default()).unwrap();
        assert_eq!(client.api_url(), "https://meta.wikimedia.org/w/api.php");
    }

    #[test]
    fn test_page_content_formatversion_2() {
        let query = json!({
            "pages": [{
                "title": "Training modules/dashboard/slides",
                "revisions": [{ "slots": { "main": { "content": "{\"slug\": \"x\"}" } } }]
            }]
        });
        assert_eq!(
            page_content_from_query(&query).as_deref(),
            Some("{\"slug\": \"x\"}")
        );
    }

    #[test]
    fn test_page_content_formatversion_1() {
        let query = json!({
            "pages": {
                "1234": {
                    "title": "Some page",
                    "revisions": [{ "slots": { "main": { "*": "== Title ==" } } }]
                }
            }
        });
        assert_eq!(page_content_from_query(&query).as_deref(), Some("== Title =="));
    }

    #[test]
    fn test_missing_page_has_no_content() {
        let v2 = json!({ "pages": [{ "title": "Nope", "missing": true }] });
        let v1 = json!({ "pages": { "-1": { "title": "Nope", "missing": "" } } });
        let empty = json!({ "pages": [] });

        assert!(page_content_from_query(&v2).is_none());
        assert!(page_content_from_query(&v1).is_none());
        assert!(page_content_from_query(&empty).is_none());
    }

    #[test]
    fn test_api_error_payload() {
        let err = api_error(&json!({ "code": "badvalue", "info": "Unrecognized value" }));
        assert_eq!(
            err.to_string(),
            "Wiki API error [badvalue]: Unrecognized value"
        );
    }

    #[test]
    fn test_retryable_statuses() {
        assert!(is_retryable_status(StatusCode::TOO_MANY_REQUESTS));
        assert!(is_retryable_status(StatusCode::BAD_GATEWAY));
        assert!(!is_retryable_status(StatusCode::NOT_FOUND));
    }
}
