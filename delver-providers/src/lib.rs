//! Delver Providers - External collaborator adapters
//!
//! Implements the four collaborator boundaries the research engine depends
//! on: the decision function (LLM), the search provider, the page extractor,
//! and the report sink. Each adapter converts its underlying failures into
//! the boundary's documented neutral result.

pub mod extract;
pub mod llm;
pub mod report;
pub mod search;

pub use extract::{JinaReaderExtractor, PageExtractor};
pub use llm::{
    clean_response, create_auto_client, configs, DecisionClient, DecisionMessage, MessageRole,
    SiumaiDecisionClient,
};
pub use report::ReportSink;
pub use search::{GoogleSearchClient, SearchProvider};
