//! Claude Code CLI Provider
//!
//! LLM provider using the local Claude Code CLI in print mode.
//! The CLI has no output-size flag; `max_output_tokens` is enforced through
//! the prompt word target instead.

use async_trait::async_trait;
use serde_json::Value;
use std::process::Stdio;
use std::time::{Duration, Instant};
use tokio::process::Command;
use tokio::time::timeout;
use tracing::{debug, info};

use super::{
    GenerationParams, LlmProvider, LlmResponse, ProviderConfig, ResponseTiming,
    TokenUsage,
};
use crate::types::{ErrorCategory, ExpandError, LlmError, Result};

const DEFAULT_MODEL: &str = "sonnet";

/// Claude Code CLI Provider
pub struct ClaudeCodeProvider {
    model: String,
    timeout_secs: u64,
}

impl ClaudeCodeProvider {
    pub fn new(config: ProviderConfig) -> Self {
        Self {
            model: config.model.unwrap_or_else(|| DEFAULT_MODEL.to_string()),
            timeout_secs: config.timeout_secs,
        }
    }

    /// Execute a single Claude Code CLI call
    async fn execute(&self, prompt: &str, params: &GenerationParams) -> Result<LlmResponse> {
        let model = if params.model.is_empty() {
            &self.model
        } else {
            &params.model
        };
        let start_time = Instant::now();

        debug!("Executing Claude Code CLI (model={})", model);

        let mut cmd = Command::new("claude");
        cmd.arg("-p")
            .arg(prompt)
            .arg("--output-format")
            .arg("json")
            .arg("--model")
            .arg(model)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped());

        let child = cmd.spawn().map_err(|e| {
            LlmError::with_provider(
                ErrorCategory::Unavailable,
                format!("Failed to spawn Claude Code CLI: {}. Is it installed?", e),
                "claude-code",
            )
        })?;

        let output = timeout(
            Duration::from_secs(self.timeout_secs),
            child.wait_with_output(),
        )
        .await
        .map_err(|_| {
            ExpandError::timeout("Claude Code CLI", Duration::from_secs(self.timeout_secs))
        })?
        .map_err(|e| ExpandError::LlmApi(format!("Claude Code execution failed: {}", e)))?;

        let elapsed = start_time.elapsed();
        let stdout = String::from_utf8_lossy(&output.stdout);

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            let error_msg = if stderr.trim().is_empty() {
                "Process exited with non-zero status"
            } else {
                stderr.as_ref()
            };
            return Err(ExpandError::LlmApi(format!(
                "Claude Code failed: {}",
                error_msg
            )));
        }

        let response: Value = serde_json::from_str(&stdout)?;
        let content = Self::extract_result(&response)?;

        Ok(LlmResponse::with_metrics(
            content,
            Self::extract_usage(&response),
            ResponseTiming::from_duration(elapsed),
        ))
    }

    /// Pull the generated text out of the CLI JSON envelope
    fn extract_result(response: &Value) -> Result<String> {
        if response
            .get("is_error")
            .and_then(|v| v.as_bool())
            .unwrap_or(false)
        {
            let error_msg = response
                .get("result")
                .and_then(|v| v.as_str())
                .unwrap_or("Unknown API error");
            return Err(ExpandError::LlmApi(format!(
                "Claude Code API error: {}",
                error_msg
            )));
        }

        response
            .get("result")
            .and_then(|v| v.as_str())
            .map(str::to_string)
            .ok_or_else(|| {
                LlmError::with_provider(
                    ErrorCategory::EmptyResponse,
                    "No result in Claude Code response",
                    "claude-code",
                )
                .into()
            })
    }

    fn extract_usage(response: &Value) -> TokenUsage {
        let usage = response.get("usage");

        TokenUsage {
            input_tokens: usage
                .and_then(|u| u.get("input_tokens"))
                .and_then(|v| v.as_u64())
                .unwrap_or(0) as u32,
            output_tokens: usage
                .and_then(|u| u.get("output_tokens"))
                .and_then(|v| v.as_u64())
                .unwrap_or(0) as u32,
        }
    }
}

#[async_trait]
impl LlmProvider for ClaudeCodeProvider {
    async fn generate(&self, prompt: &str, params: &GenerationParams) -> Result<LlmResponse> {
        info!("Generating with Claude Code CLI (model: {})", self.model);
        self.execute(prompt, params).await
    }

    fn name(&self) -> &str {
        "claude-code"
    }

    fn model(&self) -> &str {
        &self.model
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extract_usage() {
        let response = serde_json::json!({
            "usage": {
                "input_tokens": 1000,
                "output_tokens": 500
            }
        });

        let usage = ClaudeCodeProvider::extract_usage(&response);
        assert_eq!(usage.input_tokens, 1000);
        assert_eq!(usage.output_tokens, 500);
        assert_eq!(usage.total(), 1500);
    }

    #[test]
    fn test_extract_result_text() {
        let response = serde_json::json!({
            "is_error": false,
            "result": "### Outro\nThanks for watching."
        });
        let content = ClaudeCodeProvider::extract_result(&response).unwrap();
        assert!(content.starts_with("### Outro"));
    }

    #[test]
    fn test_extract_result_error_flag() {
        let response = serde_json::json!({
            "is_error": true,
            "result": "Credit balance too low"
        });
        let err = ClaudeCodeProvider::extract_result(&response).unwrap_err();
        assert!(err.to_string().contains("Credit balance too low"));
    }

    #[test]
    fn test_extract_result_missing() {
        let response = serde_json::json!({ "usage": {} });
        let err = ClaudeCodeProvider::extract_result(&response).unwrap_err();
        assert!(matches!(err, ExpandError::Llm(_)));
    }
}
