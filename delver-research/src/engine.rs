//! Research loop controller
//!
//! Drives the iteration cycle: plan queries, fan out searches, deduplicate
//! links, process them under the bounded scheduler, then ask the planner
//! whether to continue. Owns the session state and the per-run content
//! cache, and hands the aggregated contexts to the synthesizer at the end.

use crate::cache::ContentCache;
use crate::dedup::dedupe_links;
use crate::planner::QueryPlanner;
use crate::processor::LinkProcessor;
use crate::scheduler::WorkScheduler;
use crate::synthesizer::ReportSynthesizer;
use crate::types::{QueryPlanDecision, ResearchConfig, ResearchReport, ResearchSession};
use chrono::Utc;
use delver_core::{DelverError, DelverResult, ErrorContext, RetryConfig};
use delver_providers::{DecisionClient, PageExtractor, SearchProvider};
use futures::future::join_all;
use std::sync::Arc;
use tracing::info;

pub struct ResearchEngine {
    config: ResearchConfig,
    search: Arc<dyn SearchProvider>,
    planner: QueryPlanner,
    processor: LinkProcessor,
    synthesizer: ReportSynthesizer,
    scheduler: WorkScheduler,
}

impl ResearchEngine {
    pub fn new(
        config: ResearchConfig,
        llm: Arc<dyn DecisionClient>,
        search: Arc<dyn SearchProvider>,
        extractor: Arc<dyn PageExtractor>,
    ) -> Self {
        Self {
            planner: QueryPlanner::new(Arc::clone(&llm)),
            processor: LinkProcessor::new(Arc::clone(&llm), extractor, config.max_page_chars),
            synthesizer: ReportSynthesizer::new(llm),
            scheduler: WorkScheduler::new(config.max_concurrent_tasks, config.batch_size),
            search,
            config,
        }
    }

    /// Override the retry policy used for initial query generation
    pub fn with_planner_retry(mut self, retry: RetryConfig) -> Self {
        self.planner = self.planner.with_retry(retry);
        self
    }

    /// Run one full research session for the topic.
    ///
    /// Fatal only when no initial queries can be obtained; everything else
    /// self-heals into an early finalization.
    pub async fn run(&self, topic: &str) -> DelverResult<ResearchReport> {
        if self.config.iteration_limit == 0 {
            return Err(DelverError::Config {
                message: "iteration_limit must be at least 1".to_string(),
                source: None,
                context: ErrorContext::new("engine").with_operation("run"),
            });
        }

        let mut session = ResearchSession::new(topic, self.config.iteration_limit);
        info!(
            session_id = %session.id,
            topic = topic,
            iteration_limit = session.iteration_limit,
            "Starting research session"
        );

        let initial_queries = self.planner.generate_initial(topic).await?;
        if initial_queries.is_empty() {
            return Err(DelverError::Planning {
                message: "No search queries were generated".to_string(),
                context: ErrorContext::new("engine")
                    .with_operation("initialize")
                    .with_suggestion("Try a more specific research topic"),
            });
        }
        session.all_search_queries.extend(initial_queries.iter().cloned());

        let cache = ContentCache::new();
        let mut current_queries = initial_queries;
        let mut iterations_run = 0;

        loop {
            iterations_run += 1;
            info!(
                iteration = session.iteration_index + 1,
                queries = current_queries.len(),
                "=== Research iteration ==="
            );

            // Searching: one search per query, concurrently. Attribution later
            // depends on issue order, which join_all preserves positionally.
            let searches = current_queries.iter().map(|query| async move {
                (query.clone(), self.search.search(query).await)
            });
            let search_results: Vec<(String, Vec<String>)> = join_all(searches).await;

            let tasks = dedupe_links(&search_results);
            info!(unique_links = tasks.len(), "Aggregated unique links for this iteration");

            // Processing
            let user_query = &session.user_query;
            let outcomes = self
                .scheduler
                .execute(tasks, |task| {
                    let cache = &cache;
                    async move { self.processor.process(&task, user_query, cache).await }
                })
                .await?;

            let before = session.aggregated_contexts.len();
            session.aggregated_contexts.extend(outcomes.into_iter().flatten());

            let gained = session.aggregated_contexts.len() - before;
            if gained == 0 {
                info!("No useful contexts were found in this iteration");
            } else {
                info!(
                    new_contexts = gained,
                    total_contexts = session.aggregated_contexts.len(),
                    "Contexts aggregated"
                );
            }

            // Planning: anything short of at least one new query ends research.
            let decision = self
                .planner
                .plan_next(
                    &session.user_query,
                    &session.all_search_queries,
                    &session.aggregated_contexts,
                )
                .await;

            match decision {
                QueryPlanDecision::Done => {
                    info!("Planner indicated no further research is needed");
                    break;
                }
                QueryPlanDecision::Continue(new_queries) if new_queries.is_empty() => {
                    info!("Planner provided no new queries, ending research");
                    break;
                }
                QueryPlanDecision::Continue(new_queries) => {
                    info!(new_queries = new_queries.len(), "Planner provided new search queries");
                    session.all_search_queries.extend(new_queries.iter().cloned());
                    current_queries = new_queries;
                    session.iteration_index += 1;
                    if session.iteration_index >= session.iteration_limit {
                        info!(limit = session.iteration_limit, "Iteration limit reached");
                        break;
                    }
                }
            }
        }

        // Finalizing
        let content = self
            .synthesizer
            .synthesize(&session.user_query, &session.aggregated_contexts)
            .await;

        let report = ResearchReport {
            session_id: session.id,
            topic: session.user_query.clone(),
            content,
            iterations_run,
            queries_planned: session.all_search_queries.len(),
            contexts_gathered: session.aggregated_contexts.len(),
            started_at: session.started_at,
            finished_at: Utc::now(),
        };

        info!(
            session_id = %session.id,
            iterations = report.iterations_run,
            contexts = report.contexts_gathered,
            "Research session complete"
        );

        Ok(report)
    }
}
