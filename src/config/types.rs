//! Configuration Types
//!
//! All configuration structures with sensible defaults.
//! Supports global and project level configuration.

use serde::{Deserialize, Serialize};

use crate::ai::provider::ProviderConfig;
use crate::constants::{analysis, network, request};
use crate::types::{ExpandError, Result};

/// Root configuration structure
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Configuration version
    pub version: String,

    /// LLM provider settings
    pub llm: LlmConfig,

    /// Expansion policy (tunable constants)
    pub expansion: ExpansionPolicy,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            version: "1.0".to_string(),
            llm: LlmConfig::default(),
            expansion: ExpansionPolicy::default(),
        }
    }
}

impl Config {
    /// Validate configuration values are within acceptable ranges.
    /// Returns `ExpandError::Config` on validation failure.
    pub fn validate(&self) -> Result<()> {
        if !(0.0..=2.0).contains(&self.llm.temperature) {
            return Err(ExpandError::Config(format!(
                "LLM temperature must be between 0.0 and 2.0, got {}",
                self.llm.temperature
            )));
        }

        if self.llm.timeout_secs == 0 {
            return Err(ExpandError::Config(
                "LLM timeout_secs must be greater than 0".to_string(),
            ));
        }

        self.expansion.validate()
    }
}

// =============================================================================
// LLM Configuration
// =============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LlmConfig {
    /// Provider name: "openai", "ollama", "claude-code"
    pub provider: String,

    /// Model name
    pub model: String,

    /// Request timeout in seconds
    pub timeout_secs: u64,

    /// Temperature for generation
    /// Default: 0.7, expansion favours varied prose over determinism
    pub temperature: f32,

    /// Custom API endpoint
    pub api_base: Option<String>,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            provider: "openai".to_string(),
            model: "gpt-4o-mini".to_string(),
            timeout_secs: network::DEFAULT_TIMEOUT_SECS,
            temperature: 0.7,
            api_base: None,
        }
    }
}

impl LlmConfig {
    /// Convert into the provider factory configuration
    pub fn to_provider_config(&self) -> ProviderConfig {
        ProviderConfig {
            provider: self.provider.clone(),
            model: Some(self.model.clone()),
            timeout_secs: self.timeout_secs,
            api_key: None,
            api_base: self.api_base.clone(),
        }
    }
}

// =============================================================================
// Expansion Policy
// =============================================================================

/// Tunable policy constants for gap analysis, prompt sizing and generation.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ExpansionPolicy {
    /// Fraction of a point's fair share below which its section is underdeveloped
    pub underdeveloped_threshold: f64,

    /// Maximum gaps addressed per generation request
    pub max_gaps_per_request: usize,

    /// Word budget for a missing description block
    pub description_block_words: usize,

    /// Word budget for a missing tags block
    pub tags_block_words: usize,

    /// Deficit above which a document-wide gap is emitted when nothing specific is missing
    pub general_expansion_min_words: usize,

    /// Output tokens requested per target word
    pub tokens_per_word: f64,

    /// Ceiling for the output-size parameter
    pub max_output_tokens: usize,

    /// Floor for the output-size parameter
    pub min_output_tokens: usize,

    /// Maximum reference snippets appended to the prompt
    pub max_reference_snippets: usize,

    /// Ceiling for the generation call (seconds)
    pub generation_timeout_secs: u64,
}

impl Default for ExpansionPolicy {
    fn default() -> Self {
        Self {
            underdeveloped_threshold: analysis::UNDERDEVELOPED_THRESHOLD,
            max_gaps_per_request: request::MAX_GAPS_PER_REQUEST,
            description_block_words: analysis::DESCRIPTION_BLOCK_WORDS,
            tags_block_words: analysis::TAGS_BLOCK_WORDS,
            general_expansion_min_words: analysis::GENERAL_EXPANSION_MIN_WORDS,
            tokens_per_word: request::TOKENS_PER_WORD,
            max_output_tokens: request::MAX_OUTPUT_TOKENS,
            min_output_tokens: request::MIN_OUTPUT_TOKENS,
            max_reference_snippets: request::MAX_REFERENCE_SNIPPETS,
            generation_timeout_secs: network::GENERATION_TIMEOUT_SECS,
        }
    }
}

impl ExpansionPolicy {
    pub fn validate(&self) -> Result<()> {
        if !(0.0..=1.0).contains(&self.underdeveloped_threshold) {
            return Err(ExpandError::Config(format!(
                "expansion.underdeveloped_threshold must be between 0.0 and 1.0, got {}",
                self.underdeveloped_threshold
            )));
        }

        if self.max_gaps_per_request == 0 {
            return Err(ExpandError::Config(
                "expansion.max_gaps_per_request must be greater than 0".to_string(),
            ));
        }

        if self.tokens_per_word <= 0.0 {
            return Err(ExpandError::Config(format!(
                "expansion.tokens_per_word must be positive, got {}",
                self.tokens_per_word
            )));
        }

        if self.min_output_tokens > self.max_output_tokens {
            return Err(ExpandError::Config(format!(
                "expansion.min_output_tokens ({}) exceeds max_output_tokens ({})",
                self.min_output_tokens, self.max_output_tokens
            )));
        }

        if self.generation_timeout_secs == 0 {
            return Err(ExpandError::Config(
                "expansion.generation_timeout_secs must be greater than 0".to_string(),
            ));
        }

        Ok(())
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.version, "1.0");
        assert_eq!(config.llm.provider, "openai");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_default_policy_matches_constants() {
        let policy = ExpansionPolicy::default();
        assert_eq!(policy.underdeveloped_threshold, 0.4);
        assert_eq!(policy.max_gaps_per_request, 3);
        assert_eq!(policy.description_block_words, 150);
        assert_eq!(policy.tags_block_words, 50);
        assert_eq!(policy.generation_timeout_secs, 60);
    }

    #[test]
    fn test_invalid_threshold_rejected() {
        let mut config = Config::default();
        config.expansion.underdeveloped_threshold = 1.5;
        assert!(matches!(config.validate(), Err(ExpandError::Config(_))));
    }

    #[test]
    fn test_invalid_output_bounds_rejected() {
        let mut config = Config::default();
        config.expansion.min_output_tokens = 10_000;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_provider_config_conversion() {
        let llm = LlmConfig {
            provider: "ollama".to_string(),
            model: "llama3:latest".to_string(),
            ..LlmConfig::default()
        };
        let provider = llm.to_provider_config();
        assert_eq!(provider.provider, "ollama");
        assert_eq!(provider.model.as_deref(), Some("llama3:latest"));
        assert!(provider.api_key.is_none());
    }
}
