//! End-to-end tests for the research engine with mock collaborators

use async_trait::async_trait;
use delver_core::RetryConfig;
use delver_providers::{DecisionClient, DecisionMessage, PageExtractor, SearchProvider};
use delver_research::{ResearchConfig, ResearchEngine};
use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

/// Mock decision function dispatching on the system prompt of each call
struct MockDecision {
    /// Responses handed out to successive planning calls; `<done>` afterwards
    plan_responses: Mutex<VecDeque<String>>,
    /// User messages of final-report requests
    report_requests: Mutex<Vec<String>>,
    usefulness_calls: AtomicUsize,
    plan_calls: AtomicUsize,
    /// When true, every call returns an empty string (provider outage)
    dead: bool,
}

impl MockDecision {
    fn new(plan_responses: &[&str]) -> Arc<Self> {
        Arc::new(Self {
            plan_responses: Mutex::new(plan_responses.iter().map(|s| s.to_string()).collect()),
            report_requests: Mutex::new(Vec::new()),
            usefulness_calls: AtomicUsize::new(0),
            plan_calls: AtomicUsize::new(0),
            dead: false,
        })
    }

    fn dead() -> Arc<Self> {
        Arc::new(Self {
            plan_responses: Mutex::new(VecDeque::new()),
            report_requests: Mutex::new(Vec::new()),
            usefulness_calls: AtomicUsize::new(0),
            plan_calls: AtomicUsize::new(0),
            dead: true,
        })
    }
}

#[async_trait]
impl DecisionClient for MockDecision {
    async fn decide(&self, messages: &[DecisionMessage]) -> String {
        if self.dead {
            return String::new();
        }

        let system = messages.first().map(|m| m.content.as_str()).unwrap_or("");
        let user = messages.last().map(|m| m.content.as_str()).unwrap_or("");

        if system.contains("precise research assistant") {
            r#"["X impact studies"]"#.to_string()
        } else if system.contains("evaluator of research relevance") {
            self.usefulness_calls.fetch_add(1, Ordering::SeqCst);
            if user.contains("useful-page-marker") {
                "Yes".to_string()
            } else {
                "No".to_string()
            }
        } else if system.contains("extracting and summarizing") {
            "finding 1".to_string()
        } else if system.contains("systematic research planner") {
            self.plan_calls.fetch_add(1, Ordering::SeqCst);
            self.plan_responses
                .lock()
                .unwrap()
                .pop_front()
                .unwrap_or_else(|| "<done>".to_string())
        } else if system.contains("skilled report writer") {
            self.report_requests.lock().unwrap().push(user.to_string());
            "# Report on X".to_string()
        } else {
            String::new()
        }
    }
}

/// Mock search provider backed by a fixed query → links table
struct MockSearch {
    results: HashMap<String, Vec<String>>,
    calls: Mutex<Vec<String>>,
}

impl MockSearch {
    fn new(results: &[(&str, &[&str])]) -> Arc<Self> {
        Arc::new(Self {
            results: results
                .iter()
                .map(|(q, links)| {
                    (
                        q.to_string(),
                        links.iter().map(|l| l.to_string()).collect(),
                    )
                })
                .collect(),
            calls: Mutex::new(Vec::new()),
        })
    }

    fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }
}

#[async_trait]
impl SearchProvider for MockSearch {
    async fn search(&self, query: &str) -> Vec<String> {
        self.calls.lock().unwrap().push(query.to_string());
        self.results.get(query).cloned().unwrap_or_default()
    }
}

/// Mock page extractor backed by a fixed url → text table
struct MockExtractor {
    pages: HashMap<String, String>,
    fetches: Mutex<Vec<String>>,
}

impl MockExtractor {
    fn new(pages: &[(&str, &str)]) -> Arc<Self> {
        Arc::new(Self {
            pages: pages
                .iter()
                .map(|(u, t)| (u.to_string(), t.to_string()))
                .collect(),
            fetches: Mutex::new(Vec::new()),
        })
    }

    fn fetch_count(&self) -> usize {
        self.fetches.lock().unwrap().len()
    }
}

#[async_trait]
impl PageExtractor for MockExtractor {
    async fn extract(&self, url: &str) -> String {
        self.fetches.lock().unwrap().push(url.to_string());
        self.pages.get(url).cloned().unwrap_or_default()
    }
}

fn engine(
    config: ResearchConfig,
    llm: Arc<MockDecision>,
    search: Arc<MockSearch>,
    extractor: Arc<MockExtractor>,
) -> ResearchEngine {
    ResearchEngine::new(config, llm, search, extractor)
        .with_planner_retry(RetryConfig::fixed(3, 1))
}

#[tokio::test]
async fn single_iteration_run_collects_one_context() {
    let llm = MockDecision::new(&[]);
    let search = MockSearch::new(&[("X impact studies", &["https://site.a", "https://site.b"])]);
    let extractor = MockExtractor::new(&[
        ("https://site.a", "useful-page-marker study results"),
        ("https://site.b", "unrelated blog post"),
    ]);

    let config = ResearchConfig {
        iteration_limit: 1,
        ..ResearchConfig::default()
    };
    let report = engine(config, Arc::clone(&llm), Arc::clone(&search), extractor)
        .run("impact of X")
        .await
        .unwrap();

    assert_eq!(report.iterations_run, 1);
    assert_eq!(report.contexts_gathered, 1);
    assert_eq!(report.queries_planned, 1);
    assert_eq!(report.content, "# Report on X");
    assert_eq!(report.topic, "impact of X");

    // Both pages were evaluated, the single search was issued once.
    assert_eq!(llm.usefulness_calls.load(Ordering::SeqCst), 2);
    assert_eq!(search.call_count(), 1);

    // The report request carried exactly the one gathered context.
    let requests = llm.report_requests.lock().unwrap();
    assert_eq!(requests.len(), 1);
    assert!(requests[0].contains("Gathered Relevant Contexts:\nfinding 1\n"));
}

#[tokio::test]
async fn rediscovered_url_is_not_refetched_but_is_reevaluated() {
    // The planner asks for a second iteration that rediscovers the same URL.
    let llm = MockDecision::new(&[r#"["X impact studies again"]"#]);
    let search = MockSearch::new(&[
        ("X impact studies", &["https://site.a"]),
        ("X impact studies again", &["https://site.a"]),
    ]);
    let extractor = MockExtractor::new(&[("https://site.a", "useful-page-marker text")]);

    let config = ResearchConfig {
        iteration_limit: 5,
        ..ResearchConfig::default()
    };
    let report = engine(
        config,
        Arc::clone(&llm),
        Arc::clone(&search),
        Arc::clone(&extractor),
    )
    .run("impact of X")
    .await
    .unwrap();

    assert_eq!(report.iterations_run, 2);
    // Fetched once, served from cache the second time, but usefulness is
    // re-evaluated against the cached text in the later iteration.
    assert_eq!(extractor.fetch_count(), 1);
    assert_eq!(llm.usefulness_calls.load(Ordering::SeqCst), 2);
    assert_eq!(report.contexts_gathered, 2);
}

#[tokio::test]
async fn empty_iteration_still_consults_the_planner() {
    let llm = MockDecision::new(&[]);
    let search = MockSearch::new(&[("X impact studies", &["https://dead.link"])]);
    // Every fetch fails: the extractor knows no pages.
    let extractor = MockExtractor::new(&[]);

    let config = ResearchConfig {
        iteration_limit: 3,
        ..ResearchConfig::default()
    };
    let report = engine(config, Arc::clone(&llm), Arc::clone(&search), extractor)
        .run("impact of X")
        .await
        .unwrap();

    assert_eq!(report.contexts_gathered, 0);
    assert_eq!(report.iterations_run, 1);
    // A fruitless iteration is not a stopping condition by itself.
    assert_eq!(llm.plan_calls.load(Ordering::SeqCst), 1);
    assert_eq!(report.content, "# Report on X");
}

#[tokio::test]
async fn dead_decision_function_aborts_before_any_search() {
    let llm = MockDecision::dead();
    let search = MockSearch::new(&[]);
    let extractor = MockExtractor::new(&[]);

    let config = ResearchConfig {
        iteration_limit: 3,
        ..ResearchConfig::default()
    };
    let result = engine(config, llm, Arc::clone(&search), extractor)
        .run("impact of X")
        .await;

    assert!(result.is_err());
    assert_eq!(search.call_count(), 0);
}

#[tokio::test]
async fn iteration_limit_caps_the_loop() {
    // The planner always wants more; the limit must stop it.
    let llm = MockDecision::new(&[
        r#"["follow-up 1"]"#,
        r#"["follow-up 2"]"#,
        r#"["follow-up 3"]"#,
        r#"["follow-up 4"]"#,
    ]);
    let search = MockSearch::new(&[
        ("X impact studies", &["https://site.a"]),
        ("follow-up 1", &["https://site.b"]),
        ("follow-up 2", &["https://site.c"]),
    ]);
    let extractor = MockExtractor::new(&[]);

    let config = ResearchConfig {
        iteration_limit: 2,
        ..ResearchConfig::default()
    };
    let report = engine(config, llm, Arc::clone(&search), extractor)
        .run("impact of X")
        .await
        .unwrap();

    assert_eq!(report.iterations_run, 2);
    assert_eq!(search.call_count(), 2);
    // Initial query plus both planned follow-ups; the last was never searched.
    assert_eq!(report.queries_planned, 3);
}
