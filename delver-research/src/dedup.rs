//! Per-iteration link deduplication

use crate::types::LinkTask;
use std::collections::HashSet;

/// Collapse one iteration's search results into unique link tasks.
///
/// `results` must be in query issue order. A URL returned by several queries
/// is attributed to the first query that surfaced it; later occurrences are
/// dropped. Output order is first-discovery order, which keeps runs
/// reproducible for identical inputs regardless of search completion order.
pub fn dedupe_links(results: &[(String, Vec<String>)]) -> Vec<LinkTask> {
    let mut seen = HashSet::new();
    let mut tasks = Vec::new();

    for (query, links) in results {
        for link in links {
            if seen.insert(link.as_str()) {
                tasks.push(LinkTask {
                    url: link.clone(),
                    originating_query: query.clone(),
                });
            }
        }
    }

    tasks
}
