//! Final report synthesis

use crate::prompts;
use delver_providers::DecisionClient;
use std::sync::Arc;
use tracing::info;

/// Turns the aggregated contexts into the final report document
pub struct ReportSynthesizer {
    llm: Arc<dyn DecisionClient>,
}

impl ReportSynthesizer {
    pub fn new(llm: Arc<dyn DecisionClient>) -> Self {
        Self { llm }
    }

    /// Produce the final report for the user's query.
    ///
    /// The decision function's text is the report; an underlying failure
    /// yields an empty document rather than an error.
    pub async fn synthesize(&self, user_query: &str, contexts: &[String]) -> String {
        info!(contexts = contexts.len(), "Generating final report");
        self.llm
            .decide(&prompts::final_report(user_query, contexts))
            .await
    }
}
