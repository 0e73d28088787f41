//! Generation Adapter
//!
//! One call into the configured provider under a timeout. Failures are logged
//! with their category and reported as `None`; the orchestrator treats that
//! as "no expansion this round".

use regex::Regex;
use std::sync::LazyLock;
use std::time::Duration;
use tracing::{info, warn};

use super::document::word_count;
use super::types::GenerationRequest;
use crate::ai::provider::SharedProvider;
use crate::ai::timeout::with_timeout;
use crate::constants::network;
use crate::types::{ErrorCategory, LlmError, Result};

static PREAMBLE_PATTERNS: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    [
        r"(?i)^(?:i'll|i will|i'm going to|i am going to|let me|i've|i have)\s+(?:now\s+)?(?:expand|add|continue|write|extend|create|provide|generate|develop|flesh)",
        r"(?i)^here(?:'s|’s| is| are)\s+(?:what|how)\s+i\b.*:\s*$",
        r"(?i)^here(?:'s|’s| is| are)\s+(?:the|your|an?|some)\s+(?:[\w-]+\s+){0,3}(?:content|sections?|expansion|script|continuation|additions?|text)\b",
        r"(?i)^continuing\s+(?:from|with|where|on from)\b",
        r"(?i)^(?:sure|certainly|of course|absolutely)[!.,:]",
    ]
    .iter()
    .map(|p| Regex::new(p).expect("preamble pattern is valid"))
    .collect()
});

static FENCE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?s)^```[\w-]*[ \t]*\n(.*?)\n?```\s*$").expect("fence pattern is valid")
});

/// Remove conversational lead-ins and a wrapping code fence.
///
/// Only lines before the first heading or first line of real content are
/// inspected; the body is never touched.
pub fn strip_preamble(text: &str) -> String {
    let mut current = text.trim();
    loop {
        let stripped = unwrap_fence(strip_leading_lines(current));
        if stripped.len() == current.len() {
            return stripped.to_string();
        }
        current = stripped;
    }
}

fn strip_leading_lines(text: &str) -> &str {
    let mut rest = text;
    loop {
        let (line, tail) = rest.split_once('\n').unwrap_or((rest, ""));
        let trimmed = line.trim();

        let is_preamble = trimmed.is_empty()
            || (!trimmed.starts_with('#') && PREAMBLE_PATTERNS.iter().any(|re| re.is_match(trimmed)));
        if !is_preamble || rest.is_empty() {
            return rest.trim_start();
        }
        rest = tail;
    }
}

fn unwrap_fence(text: &str) -> &str {
    FENCE_RE
        .captures(text)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().trim())
        .unwrap_or(text)
}

#[derive(Clone)]
pub struct GenerationAdapter {
    provider: SharedProvider,
    timeout: Duration,
}

impl GenerationAdapter {
    pub fn new(provider: SharedProvider) -> Self {
        Self {
            provider,
            timeout: Duration::from_secs(network::GENERATION_TIMEOUT_SECS),
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn provider(&self) -> &SharedProvider {
        &self.provider
    }

    /// Generate and clean expansion text; `None` on any failure
    pub async fn generate(&self, request: &GenerationRequest) -> Option<String> {
        match self.try_generate(request).await {
            Ok(content) => Some(content),
            Err(err) => {
                warn!(
                    provider = %self.provider.name(),
                    category = %err.category(self.provider.name()),
                    error = %err,
                    "Generation failed, keeping original document"
                );
                None
            }
        }
    }

    /// Generate and clean expansion text, surfacing the failure reason
    pub async fn try_generate(&self, request: &GenerationRequest) -> Result<String> {
        let response = with_timeout(
            self.timeout,
            self.provider
                .generate(&request.prompt_text, &request.model_params),
            "expansion generation",
        )
        .await?;

        let content = strip_preamble(&response.content);
        if content.is_empty() {
            return Err(LlmError::with_provider(
                ErrorCategory::EmptyResponse,
                "Generator returned no usable content",
                self.provider.name(),
            )
            .into());
        }

        info!(
            "Generated {} words (requested {}) via {}/{} in {}ms, {} tokens",
            word_count(&content),
            request.word_target,
            self.provider.name(),
            self.provider.model(),
            response.timing.total_ms,
            response.usage.total()
        );
        Ok(content)
    }
}
