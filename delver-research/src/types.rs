//! Types for the iterative research engine

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Research run configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResearchConfig {
    /// Maximum number of research iterations
    pub iteration_limit: usize,
    /// Concurrency ceiling for simultaneously in-flight link tasks
    pub max_concurrent_tasks: usize,
    /// Number of link tasks awaited together before the next group starts
    pub batch_size: usize,
    /// Page text cap (in characters) passed to the decision function
    pub max_page_chars: usize,
}

impl Default for ResearchConfig {
    fn default() -> Self {
        Self {
            iteration_limit: 10,
            max_concurrent_tasks: 10,
            batch_size: 10,
            max_page_chars: 20_000,
        }
    }
}

/// Mutable state for one research run.
///
/// Owned and mutated only by the loop controller. `all_search_queries` and
/// `aggregated_contexts` are append-only: contexts are never reordered or
/// deduplicated, and queries may repeat across iterations.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResearchSession {
    pub id: Uuid,
    pub user_query: String,
    pub iteration_limit: usize,
    pub iteration_index: usize,
    pub all_search_queries: Vec<String>,
    pub aggregated_contexts: Vec<String>,
    pub started_at: DateTime<Utc>,
}

impl ResearchSession {
    pub fn new(user_query: impl Into<String>, iteration_limit: usize) -> Self {
        Self {
            id: Uuid::new_v4(),
            user_query: user_query.into(),
            iteration_limit,
            iteration_index: 0,
            all_search_queries: Vec::new(),
            aggregated_contexts: Vec::new(),
            started_at: Utc::now(),
        }
    }
}

/// One unit of link-processing work, valid for a single iteration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LinkTask {
    /// Discovered URL
    pub url: String,
    /// The search query whose results first surfaced this URL
    pub originating_query: String,
}

/// The query planner's verdict for the next iteration
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum QueryPlanDecision {
    /// Search these queries next (an empty list ends research)
    Continue(Vec<String>),
    /// No further research is needed
    Done,
}

/// Binary relevance verdict for a fetched page
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Usefulness {
    Useful,
    NotUseful,
}

/// Final result of a research run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResearchReport {
    /// Session this report belongs to
    pub session_id: Uuid,
    /// The researched topic
    pub topic: String,
    /// The synthesized report document
    pub content: String,
    /// Number of iterations performed
    pub iterations_run: usize,
    /// Search queries accumulated across iterations, including queries
    /// planned for an iteration the limit prevented from running
    pub queries_planned: usize,
    /// Number of extracted contexts the report is based on
    pub contexts_gathered: usize,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
}
