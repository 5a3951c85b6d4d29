//! Web search provider adapters
//!
//! Wraps the Google Programmable Search (Custom Search JSON API) behind the
//! `SearchProvider` boundary. Failures are logged and yield an empty result
//! list; they never cross the boundary as errors.

use async_trait::async_trait;
use delver_core::{DelverError, DelverResult, ErrorContext, SearchConfig};
use serde::Deserialize;
use std::time::Duration;
use tracing::debug;
use url::Url;

/// The external search boundary: one query in, ranked URLs out
#[async_trait]
pub trait SearchProvider: Send + Sync {
    /// Returns result URLs in rank order; empty on no results or failure.
    async fn search(&self, query: &str) -> Vec<String>;
}

/// Google Custom Search JSON API response shape (links only)
#[derive(Debug, Deserialize)]
struct SearchResponse {
    #[serde(default)]
    items: Vec<SearchItem>,
}

#[derive(Debug, Deserialize)]
struct SearchItem {
    link: String,
}

/// Whether a search result link is a fetchable web URL
fn is_web_url(link: &str) -> bool {
    Url::parse(link)
        .map(|u| matches!(u.scheme(), "http" | "https"))
        .unwrap_or(false)
}

/// Search client for the Google Custom Search JSON API
pub struct GoogleSearchClient {
    http: reqwest::Client,
    config: SearchConfig,
}

impl GoogleSearchClient {
    pub fn new(config: SearchConfig) -> DelverResult<Self> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .user_agent(concat!("delver/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| DelverError::Search {
                message: format!("Failed to create HTTP client: {}", e),
                source: Some(Box::new(e)),
                context: ErrorContext::new("search").with_operation("new"),
            })?;

        Ok(Self { http, config })
    }

    fn credentials(&self) -> DelverResult<(String, String)> {
        let api_key = self
            .config
            .api_key
            .clone()
            .or_else(|| std::env::var("GOOGLE_API_KEY").ok())
            .ok_or_else(|| DelverError::Search {
                message: "Google API key not found".to_string(),
                source: None,
                context: ErrorContext::new("search")
                    .with_operation("credentials")
                    .with_suggestion("Set GOOGLE_API_KEY or search.api_key in the config"),
            })?;

        let engine_id = self
            .config
            .engine_id
            .clone()
            .or_else(|| std::env::var("GOOGLE_CX").ok())
            .ok_or_else(|| DelverError::Search {
                message: "Google search engine ID not found".to_string(),
                source: None,
                context: ErrorContext::new("search")
                    .with_operation("credentials")
                    .with_suggestion("Set GOOGLE_CX or search.engine_id in the config"),
            })?;

        Ok((api_key, engine_id))
    }

    async fn search_inner(&self, query: &str) -> DelverResult<Vec<String>> {
        let (api_key, engine_id) = self.credentials()?;

        let response = self
            .http
            .get(&self.config.endpoint)
            .query(&[
                ("key", api_key.as_str()),
                ("cx", engine_id.as_str()),
                ("q", query),
            ])
            .send()
            .await
            .map_err(|e| DelverError::Search {
                message: format!("Search request failed: {}", e),
                source: Some(Box::new(e)),
                context: ErrorContext::new("search").with_operation("search"),
            })?;

        if !response.status().is_success() {
            return Err(DelverError::Search {
                message: format!("Search API returned status {}", response.status()),
                source: None,
                context: ErrorContext::new("search")
                    .with_operation("search")
                    .with_suggestion("Check API key quota and search engine ID"),
            });
        }

        let body: SearchResponse = response.json().await.map_err(|e| DelverError::Search {
            message: format!("Failed to parse search response: {}", e),
            source: Some(Box::new(e)),
            context: ErrorContext::new("search").with_operation("parse_response"),
        })?;

        Ok(body
            .items
            .into_iter()
            .map(|item| item.link)
            .filter(|link| is_web_url(link))
            .collect())
    }
}

#[async_trait]
impl SearchProvider for GoogleSearchClient {
    async fn search(&self, query: &str) -> Vec<String> {
        match self.search_inner(query).await {
            Ok(links) => {
                debug!(query = query, results = links.len(), "Search completed");
                links
            }
            Err(e) => {
                e.log();
                Vec::new()
            }
        }
    }
}
