//! Webpage text extraction
//!
//! Resolves a URL to plain page text through the Jina reader service. Any
//! failure (timeouts, paywalls, fetch errors) yields an empty string past
//! this boundary.

use async_trait::async_trait;
use delver_core::{DelverError, DelverResult, ErrorContext, ExtractorConfig};
use std::time::Duration;
use tracing::debug;

/// The external page-extraction boundary
#[async_trait]
pub trait PageExtractor: Send + Sync {
    /// Returns the page's plain text content; empty string on failure.
    async fn extract(&self, url: &str) -> String;
}

/// Extractor backed by the Jina reader (`https://r.jina.ai/<url>`)
pub struct JinaReaderExtractor {
    http: reqwest::Client,
    config: ExtractorConfig,
}

impl JinaReaderExtractor {
    pub fn new(config: ExtractorConfig) -> DelverResult<Self> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .user_agent(concat!("delver/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| DelverError::Extraction {
                message: format!("Failed to create HTTP client: {}", e),
                source: Some(Box::new(e)),
                context: ErrorContext::new("extractor").with_operation("new"),
            })?;

        Ok(Self { http, config })
    }

    fn api_key(&self) -> Option<String> {
        self.config
            .api_key
            .clone()
            .or_else(|| std::env::var("JINA_API_KEY").ok())
    }

    async fn extract_inner(&self, url: &str) -> DelverResult<String> {
        let reader_url = format!("{}{}", self.config.base_url, url);

        let mut request = self.http.get(&reader_url);
        if let Some(api_key) = self.api_key() {
            request = request.bearer_auth(api_key);
        }

        let response = request.send().await.map_err(|e| DelverError::Extraction {
            message: format!("Fetch failed for {}: {}", url, e),
            source: Some(Box::new(e)),
            context: ErrorContext::new("extractor").with_operation("fetch"),
        })?;

        let status = response.status();
        if !status.is_success() {
            return Err(DelverError::Extraction {
                message: format!("Reader returned status {} for {}", status, url),
                source: None,
                context: ErrorContext::new("extractor").with_operation("fetch"),
            });
        }

        response.text().await.map_err(|e| DelverError::Extraction {
            message: format!("Failed to read page body for {}: {}", url, e),
            source: Some(Box::new(e)),
            context: ErrorContext::new("extractor").with_operation("read_body"),
        })
    }
}

#[async_trait]
impl PageExtractor for JinaReaderExtractor {
    async fn extract(&self, url: &str) -> String {
        match self.extract_inner(url).await {
            Ok(text) => {
                debug!(url = url, chars = text.len(), "Page extracted");
                text
            }
            Err(e) => {
                e.log();
                String::new()
            }
        }
    }
}
