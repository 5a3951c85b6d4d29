//! Query planning around the decision function

use crate::parse::{parse_plan_decision, parse_query_list};
use crate::prompts;
use crate::types::QueryPlanDecision;
use delver_core::{retry_async, DelverError, DelverResult, ErrorContext, RetryConfig};
use delver_providers::DecisionClient;
use std::sync::Arc;
use tracing::{info, warn};

/// Plans search queries and decides whether research should continue
pub struct QueryPlanner {
    llm: Arc<dyn DecisionClient>,
    retry: RetryConfig,
}

impl QueryPlanner {
    pub fn new(llm: Arc<dyn DecisionClient>) -> Self {
        Self {
            llm,
            retry: RetryConfig::fixed(3, 2000),
        }
    }

    /// Override the retry policy for initial query generation
    pub fn with_retry(mut self, retry: RetryConfig) -> Self {
        self.retry = retry;
        self
    }

    /// Generate the initial search queries for a research topic.
    ///
    /// Empty decision-function responses are retried; if every attempt comes
    /// back empty the run cannot make progress and the error is fatal. A
    /// non-empty response that is not a query list falls back to the topic
    /// itself so the run can still proceed.
    pub async fn generate_initial(&self, user_query: &str) -> DelverResult<Vec<String>> {
        let response = retry_async(
            || async move {
                let response = self.llm.decide(&prompts::initial_queries(user_query)).await;
                if response.trim().is_empty() {
                    Err(DelverError::Planning {
                        message: "Decision function returned an empty response".to_string(),
                        context: ErrorContext::new("planner")
                            .with_operation("generate_initial")
                            .with_suggestion("Check LLM provider availability and credentials"),
                    })
                } else {
                    Ok(response)
                }
            },
            &self.retry,
            "generate_initial_queries",
        )
        .await?;

        match parse_query_list(&response) {
            Some(queries) => {
                info!(count = queries.len(), "Generated initial search queries");
                Ok(queries)
            }
            None => {
                warn!("Decision function did not return a query list, falling back to the original query");
                Ok(vec![user_query.to_string()])
            }
        }
    }

    /// Ask whether research should continue, and with which new queries.
    ///
    /// No retry here: a planning failure ends research early instead of
    /// aborting the run.
    pub async fn plan_next(
        &self,
        user_query: &str,
        all_queries: &[String],
        contexts: &[String],
    ) -> QueryPlanDecision {
        let response = self
            .llm
            .decide(&prompts::next_plan(user_query, all_queries, contexts))
            .await;

        if response.trim().is_empty() {
            warn!("Decision function returned an empty planning response");
            return QueryPlanDecision::Continue(Vec::new());
        }

        parse_plan_decision(&response)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use delver_providers::DecisionMessage;
    use std::collections::VecDeque;
    use std::sync::Mutex;

    /// Replays a fixed sequence of responses, then empty strings
    struct ScriptedClient {
        responses: Mutex<VecDeque<&'static str>>,
        calls: Mutex<usize>,
    }

    impl ScriptedClient {
        fn new(responses: &[&'static str]) -> Arc<Self> {
            Arc::new(Self {
                responses: Mutex::new(responses.iter().copied().collect()),
                calls: Mutex::new(0),
            })
        }

        fn calls(&self) -> usize {
            *self.calls.lock().unwrap()
        }
    }

    #[async_trait]
    impl DecisionClient for ScriptedClient {
        async fn decide(&self, _messages: &[DecisionMessage]) -> String {
            *self.calls.lock().unwrap() += 1;
            self.responses
                .lock()
                .unwrap()
                .pop_front()
                .unwrap_or_default()
                .to_string()
        }
    }

    fn fast_planner(client: Arc<ScriptedClient>) -> QueryPlanner {
        QueryPlanner::new(client).with_retry(RetryConfig::fixed(3, 1))
    }

    #[tokio::test]
    async fn retries_until_a_response_arrives() {
        let client = ScriptedClient::new(&["", "", r#"["q1", "q2"]"#]);
        let planner = fast_planner(Arc::clone(&client));

        let queries = planner.generate_initial("topic").await.unwrap();

        assert_eq!(queries, vec!["q1".to_string(), "q2".to_string()]);
        assert_eq!(client.calls(), 3);
    }

    #[tokio::test]
    async fn aborts_when_all_attempts_are_empty() {
        let client = ScriptedClient::new(&["", "", ""]);
        let planner = fast_planner(Arc::clone(&client));

        let result = planner.generate_initial("topic").await;

        assert!(result.is_err());
        assert_eq!(client.calls(), 3);
    }

    #[tokio::test]
    async fn malformed_list_falls_back_to_user_query() {
        let client = ScriptedClient::new(&["I suggest searching for various things."]);
        let planner = fast_planner(client);

        let queries = planner.generate_initial("impact of X").await.unwrap();

        assert_eq!(queries, vec!["impact of X".to_string()]);
    }

    #[tokio::test]
    async fn plan_next_recognizes_the_sentinel() {
        let client = ScriptedClient::new(&["<done>"]);
        let planner = fast_planner(client);

        let decision = planner.plan_next("topic", &[], &[]).await;
        assert_eq!(decision, QueryPlanDecision::Done);
    }

    #[tokio::test]
    async fn plan_next_is_not_retried() {
        let client = ScriptedClient::new(&[]);
        let planner = fast_planner(Arc::clone(&client));

        let decision = planner.plan_next("topic", &[], &[]).await;

        assert_eq!(decision, QueryPlanDecision::Continue(Vec::new()));
        assert_eq!(client.calls(), 1);
    }

    #[tokio::test]
    async fn plan_next_treats_garbage_as_empty_continue() {
        let client = ScriptedClient::new(&["not json"]);
        let planner = fast_planner(client);

        let decision = planner.plan_next("topic", &[], &[]).await;
        assert_eq!(decision, QueryPlanDecision::Continue(Vec::new()));
    }
}
