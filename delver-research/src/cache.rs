//! Session-scoped cache of extracted page text

use std::collections::HashMap;
use tokio::sync::RwLock;

/// Memoized URL-to-text store shared by one research run.
///
/// Entries are never evicted, and an empty string is a real entry: it records
/// a fetch that failed or produced nothing, so the URL is not fetched again
/// when a later iteration rediscovers it. Presence must therefore be checked
/// explicitly, not through emptiness of the returned text.
#[derive(Debug, Default)]
pub struct ContentCache {
    entries: RwLock<HashMap<String, String>>,
}

impl ContentCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Previously extracted text, or `None` if the URL was never fetched
    pub async fn get(&self, url: &str) -> Option<String> {
        self.entries.read().await.get(url).cloned()
    }

    pub async fn insert(&self, url: impl Into<String>, text: impl Into<String>) {
        self.entries.write().await.insert(url.into(), text.into());
    }

    pub async fn contains(&self, url: &str) -> bool {
        self.entries.read().await.contains_key(url)
    }

    pub async fn len(&self) -> usize {
        self.entries.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.entries.read().await.is_empty()
    }
}
