//! Per-link processing pipeline
//!
//! Fetch (through the session cache), evaluate usefulness, and extract
//! relevant context for a single link. Every failure path collapses to
//! `None`; one bad link never disturbs its batch.

use crate::cache::ContentCache;
use crate::parse::parse_usefulness;
use crate::prompts;
use crate::types::{LinkTask, Usefulness};
use delver_providers::{DecisionClient, PageExtractor};
use std::sync::Arc;
use tracing::{debug, info};

/// Truncate to at most `max_chars` characters, respecting char boundaries
pub(crate) fn truncate_chars(text: &str, max_chars: usize) -> &str {
    match text.char_indices().nth(max_chars) {
        Some((byte_index, _)) => &text[..byte_index],
        None => text,
    }
}

/// Processes one link task into an extracted context, or nothing
pub struct LinkProcessor {
    llm: Arc<dyn DecisionClient>,
    extractor: Arc<dyn PageExtractor>,
    max_page_chars: usize,
}

impl LinkProcessor {
    pub fn new(
        llm: Arc<dyn DecisionClient>,
        extractor: Arc<dyn PageExtractor>,
        max_page_chars: usize,
    ) -> Self {
        Self {
            llm,
            extractor,
            max_page_chars,
        }
    }

    /// Run the fetch → evaluate → extract pipeline for one link.
    ///
    /// Returns the extracted context, or `None` when the page could not be
    /// fetched, was judged not useful, or yielded no relevant text.
    pub async fn process(
        &self,
        task: &LinkTask,
        user_query: &str,
        cache: &ContentCache,
    ) -> Option<String> {
        let page_text = self.fetch(&task.url, cache).await;
        if page_text.is_empty() {
            debug!(url = %task.url, "No content extracted, skipping link");
            return None;
        }

        let snippet = truncate_chars(&page_text, self.max_page_chars);

        let verdict =
            parse_usefulness(&self.llm.decide(&prompts::usefulness(user_query, snippet)).await);
        info!(url = %task.url, verdict = ?verdict, "Page usefulness evaluated");

        if verdict != Usefulness::Useful {
            return None;
        }

        let context = self
            .llm
            .decide(&prompts::extraction(
                user_query,
                &task.originating_query,
                snippet,
            ))
            .await;

        if context.is_empty() {
            debug!(url = %task.url, "Extraction produced no relevant context");
            return None;
        }

        info!(url = %task.url, chars = context.len(), "Context extracted");
        Some(context)
    }

    /// Resolve page text through the cache, fetching on miss.
    ///
    /// The result is cached even when empty, so a URL rediscovered in a later
    /// iteration is not fetched again.
    async fn fetch(&self, url: &str, cache: &ContentCache) -> String {
        if let Some(text) = cache.get(url).await {
            debug!(url = url, "Cache hit");
            return text;
        }

        info!(url = url, "Fetching content");
        let text = self.extractor.extract(url).await;
        cache.insert(url, text.clone()).await;
        text
    }
}
