//! Core configuration type definitions

use serde::{Deserialize, Serialize};

/// Top-level Delver configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DelverConfig {
    /// Decision-function (LLM) settings
    pub llm: LlmConfig,
    /// Search provider settings
    pub search: SearchConfig,
    /// Page extractor settings
    pub extractor: ExtractorConfig,
    /// Final report output settings
    pub report: ReportConfig,
}

/// LLM provider configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LlmConfig {
    /// Provider name (openai, anthropic, ollama, groq, auto)
    pub provider: String,
    /// Model identifier
    pub model: String,
    /// API key (falls back to the provider's environment variable)
    pub api_key: Option<String>,
    /// Custom base URL (required for ollama)
    pub base_url: Option<String>,
    /// Sampling temperature
    pub temperature: f32,
    /// Maximum tokens per response
    pub max_tokens: Option<u32>,
}

/// Search provider configuration (Google Programmable Search)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchConfig {
    /// API key (falls back to GOOGLE_API_KEY)
    pub api_key: Option<String>,
    /// Programmable search engine ID (falls back to GOOGLE_CX)
    pub engine_id: Option<String>,
    /// Search API endpoint
    pub endpoint: String,
    /// Per-request timeout in seconds
    pub timeout_secs: u64,
}

/// Page extractor configuration (Jina reader)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExtractorConfig {
    /// Reader base URL, prepended to the page URL
    pub base_url: String,
    /// Optional API key (falls back to JINA_API_KEY)
    pub api_key: Option<String>,
    /// Per-request timeout in seconds
    pub timeout_secs: u64,
}

/// Report output configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportConfig {
    /// Path the final report is written to
    pub output_path: String,
}
