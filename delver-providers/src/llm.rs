//! Decision-function client integration using siumai
//!
//! The decision function is the single LLM boundary of the system: it takes
//! role-tagged messages and returns plain text with chain-of-thought markers
//! stripped. Underlying call failures surface as an empty string, never as an
//! error visible to callers.

use async_trait::async_trait;
use delver_core::{DelverError, DelverResult, ErrorContext, LlmConfig};
use regex::Regex;
use siumai::models;
use siumai::prelude::*;
use std::sync::OnceLock;
use tracing::{info, warn};

/// Role tag for a decision-function message
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MessageRole {
    System,
    User,
}

/// One role-tagged message sent to the decision function
#[derive(Debug, Clone)]
pub struct DecisionMessage {
    pub role: MessageRole,
    pub content: String,
}

impl DecisionMessage {
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: MessageRole::System,
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: MessageRole::User,
            content: content.into(),
        }
    }
}

/// The external decision function (the system's single LLM boundary)
#[async_trait]
pub trait DecisionClient: Send + Sync {
    /// Send role-tagged messages and return the cleaned plain-text response.
    /// Returns an empty string on any underlying failure.
    async fn decide(&self, messages: &[DecisionMessage]) -> String;
}

/// Removes chain-of-thought markers like `<think>...</think>` and stray tags
pub fn clean_response(response: &str) -> String {
    static THINK_BLOCK: OnceLock<Regex> = OnceLock::new();
    let re = THINK_BLOCK
        .get_or_init(|| Regex::new(r"(?s)<think>.*?</think>").expect("think-tag regex"));

    let cleaned = re.replace_all(response, "");
    cleaned
        .replace("<think>", "")
        .replace("</think>", "")
        .trim()
        .to_string()
}

/// Unified decision client that supports multiple providers
pub struct SiumaiDecisionClient {
    client: Box<dyn LlmClient>,
    config: LlmConfig,
}

impl SiumaiDecisionClient {
    /// Create a new decision client for a concrete provider
    pub async fn new(config: LlmConfig) -> DelverResult<Self> {
        let client = Self::build_client(&config).await?;

        info!(
            "Created decision client for provider: {} with model: {}",
            config.provider, config.model
        );

        Ok(Self { client, config })
    }

    /// Build the appropriate siumai client based on configuration
    async fn build_client(config: &LlmConfig) -> DelverResult<Box<dyn LlmClient>> {
        match config.provider.as_str() {
            "openai" => {
                let api_key = config
                    .api_key
                    .clone()
                    .or_else(|| std::env::var("OPENAI_API_KEY").ok())
                    .ok_or_else(|| Self::config_error("OpenAI API key not found"))?;

                let mut builder = LlmBuilder::new()
                    .openai()
                    .api_key(&api_key)
                    .model(&config.model)
                    .temperature(config.temperature);

                if let Some(max_tokens) = config.max_tokens {
                    builder = builder.max_tokens(max_tokens);
                }

                if let Some(base_url) = &config.base_url {
                    builder = builder.base_url(base_url);
                }

                let client = builder
                    .build()
                    .await
                    .map_err(|e| Self::llm_error("openai", &e))?;

                Ok(Box::new(client))
            }
            "anthropic" => {
                let api_key = config
                    .api_key
                    .clone()
                    .or_else(|| std::env::var("ANTHROPIC_API_KEY").ok())
                    .ok_or_else(|| Self::config_error("Anthropic API key not found"))?;

                let mut builder = LlmBuilder::new()
                    .anthropic()
                    .api_key(&api_key)
                    .model(&config.model)
                    .temperature(config.temperature);

                if let Some(max_tokens) = config.max_tokens {
                    builder = builder.max_tokens(max_tokens);
                }

                let client = builder
                    .build()
                    .await
                    .map_err(|e| Self::llm_error("anthropic", &e))?;

                Ok(Box::new(client))
            }
            "ollama" => {
                let base_url = config
                    .base_url
                    .clone()
                    .unwrap_or_else(|| "http://localhost:11434".to_string());

                let mut builder = LlmBuilder::new()
                    .ollama()
                    .model(&config.model)
                    .base_url(&base_url)
                    .temperature(config.temperature);

                if let Some(max_tokens) = config.max_tokens {
                    builder = builder.max_tokens(max_tokens);
                }

                let client = builder
                    .build()
                    .await
                    .map_err(|e| Self::llm_error("ollama", &e))?;

                Ok(Box::new(client))
            }
            "groq" => {
                let api_key = config
                    .api_key
                    .clone()
                    .or_else(|| std::env::var("GROQ_API_KEY").ok())
                    .ok_or_else(|| Self::config_error("Groq API key not found"))?;

                let mut builder = LlmBuilder::new()
                    .groq()
                    .api_key(&api_key)
                    .model(&config.model)
                    .temperature(config.temperature);

                if let Some(max_tokens) = config.max_tokens {
                    builder = builder.max_tokens(max_tokens);
                }

                let client = builder
                    .build()
                    .await
                    .map_err(|e| Self::llm_error("groq", &e))?;

                Ok(Box::new(client))
            }
            provider => Err(DelverError::Config {
                message: format!("Unsupported LLM provider: {}", provider),
                source: None,
                context: ErrorContext::new("llm")
                    .with_operation("build_client")
                    .with_suggestion("Use one of: openai, anthropic, ollama, groq, auto"),
            }),
        }
    }

    fn config_error(message: &str) -> DelverError {
        DelverError::Config {
            message: message.to_string(),
            source: None,
            context: ErrorContext::new("llm")
                .with_operation("build_client")
                .with_suggestion("Set the provider's API key environment variable"),
        }
    }

    fn llm_error(provider: &str, error: &dyn std::fmt::Display) -> DelverError {
        DelverError::Llm {
            message: format!("Failed to build {} client: {}", provider, error),
            provider: Some(provider.to_string()),
            context: ErrorContext::new("llm").with_operation("build_client"),
        }
    }

    /// Get the current configuration
    pub fn config(&self) -> &LlmConfig {
        &self.config
    }
}

#[async_trait]
impl DecisionClient for SiumaiDecisionClient {
    async fn decide(&self, messages: &[DecisionMessage]) -> String {
        let chat_messages: Vec<ChatMessage> = messages
            .iter()
            .map(|m| match m.role {
                MessageRole::System => system!(m.content.as_str()),
                MessageRole::User => user!(m.content.as_str()),
            })
            .collect();

        match self.client.chat(chat_messages).await {
            Ok(response) => match response.content_text() {
                Some(content) => clean_response(content),
                None => {
                    warn!(
                        provider = %self.config.provider,
                        "No text content in decision-function response"
                    );
                    String::new()
                }
            },
            Err(e) => {
                warn!(
                    provider = %self.config.provider,
                    error = %e,
                    "Decision-function call failed"
                );
                String::new()
            }
        }
    }
}

/// Helper functions for creating common LLM configurations
pub mod configs {
    use super::*;

    pub fn openai_gpt4o_mini() -> LlmConfig {
        LlmConfig {
            provider: "openai".to_string(),
            model: models::openai::GPT_4O_MINI.to_string(),
            api_key: None,
            base_url: None,
            temperature: 0.7,
            max_tokens: Some(2000),
        }
    }

    pub fn anthropic_claude_haiku() -> LlmConfig {
        LlmConfig {
            provider: "anthropic".to_string(),
            model: models::anthropic::CLAUDE_HAIKU_3_5.to_string(),
            api_key: None,
            base_url: None,
            temperature: 0.7,
            max_tokens: Some(2000),
        }
    }

    pub fn groq_llama3() -> LlmConfig {
        LlmConfig {
            provider: "groq".to_string(),
            model: "llama-3.1-8b-instant".to_string(),
            api_key: None,
            base_url: None,
            temperature: 0.7,
            max_tokens: Some(2000),
        }
    }

    pub fn ollama_llama3(base_url: Option<String>) -> LlmConfig {
        LlmConfig {
            provider: "ollama".to_string(),
            model: "llama3.2".to_string(),
            api_key: None,
            base_url: base_url.or_else(|| Some("http://localhost:11434".to_string())),
            temperature: 0.7,
            max_tokens: Some(2000),
        }
    }
}

/// Create a decision client with automatic provider detection
pub async fn create_auto_client() -> DelverResult<SiumaiDecisionClient> {
    let providers = vec![
        ("openai", "OPENAI_API_KEY", configs::openai_gpt4o_mini()),
        (
            "anthropic",
            "ANTHROPIC_API_KEY",
            configs::anthropic_claude_haiku(),
        ),
        ("groq", "GROQ_API_KEY", configs::groq_llama3()),
    ];

    for (provider_name, env_var, config) in providers {
        if std::env::var(env_var).is_ok() {
            info!("Auto-detected {} provider", provider_name);
            match SiumaiDecisionClient::new(config).await {
                Ok(client) => return Ok(client),
                Err(e) => {
                    warn!("Failed to create {} client: {}", provider_name, e);
                    continue;
                }
            }
        }
    }

    info!("Trying Ollama as fallback");
    SiumaiDecisionClient::new(configs::ollama_llama3(None)).await
}
