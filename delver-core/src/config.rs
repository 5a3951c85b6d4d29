//! Configuration management

use crate::error::{DelverError, DelverResult};
use crate::types::{DelverConfig, ExtractorConfig, LlmConfig, ReportConfig, SearchConfig};

use std::path::{Path, PathBuf};

impl Default for DelverConfig {
    fn default() -> Self {
        Self {
            llm: LlmConfig {
                provider: "auto".to_string(),
                model: "gpt-4o-mini".to_string(),
                api_key: None,
                base_url: None,
                temperature: 0.7,
                max_tokens: Some(2000),
            },
            search: SearchConfig {
                api_key: None,
                engine_id: None,
                endpoint: "https://www.googleapis.com/customsearch/v1".to_string(),
                timeout_secs: 15,
            },
            extractor: ExtractorConfig {
                base_url: "https://r.jina.ai/".to_string(),
                api_key: None,
                timeout_secs: 30,
            },
            report: ReportConfig {
                output_path: "research_report.md".to_string(),
            },
        }
    }
}

impl DelverConfig {
    /// Load configuration from a TOML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> DelverResult<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| DelverError::Config {
            message: format!("Failed to read config file: {}", e),
            source: Some(Box::new(e)),
            context: crate::ErrorContext::new("config")
                .with_operation("read_file")
                .with_suggestion("Check if the config file exists and is readable"),
        })?;

        let config: DelverConfig = toml::from_str(&content).map_err(|e| DelverError::Config {
            message: format!("Failed to parse config: {}", e),
            source: Some(Box::new(e)),
            context: crate::ErrorContext::new("config")
                .with_operation("parse_toml")
                .with_suggestion("Check TOML syntax in config file"),
        })?;

        Ok(config)
    }

    /// Save configuration to a TOML file
    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> DelverResult<()> {
        let content = toml::to_string_pretty(self).map_err(|e| DelverError::Config {
            message: format!("Failed to serialize config: {}", e),
            source: Some(Box::new(e)),
            context: crate::ErrorContext::new("config").with_operation("serialize_toml"),
        })?;

        std::fs::write(path, content).map_err(|e| DelverError::Config {
            message: format!("Failed to write config file: {}", e),
            source: Some(Box::new(e)),
            context: crate::ErrorContext::new("config")
                .with_operation("write_file")
                .with_suggestion("Check if the directory exists and is writable"),
        })?;

        Ok(())
    }

    /// Default config file location (~/.config/delver/config.toml on Linux)
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("delver").join("config.toml"))
    }

    /// Validate configuration values
    pub fn validate(&self) -> DelverResult<()> {
        if self.llm.model.is_empty() {
            return Err(crate::config_error!("llm.model must not be empty", "config"));
        }

        if !(0.0..=2.0).contains(&self.llm.temperature) {
            return Err(crate::config_error!(
                "llm.temperature must be between 0.0 and 2.0",
                "config"
            ));
        }

        if let Some(max_tokens) = self.llm.max_tokens {
            if max_tokens == 0 {
                return Err(crate::config_error!(
                    "llm.max_tokens must be greater than 0",
                    "config"
                ));
            }
        }

        if self.search.endpoint.is_empty() {
            return Err(crate::config_error!(
                "search.endpoint must not be empty",
                "config"
            ));
        }

        if self.extractor.base_url.is_empty() {
            return Err(crate::config_error!(
                "extractor.base_url must not be empty",
                "config"
            ));
        }

        if self.report.output_path.is_empty() {
            return Err(crate::config_error!(
                "report.output_path must not be empty",
                "config"
            ));
        }

        Ok(())
    }
}
