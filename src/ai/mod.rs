//! AI Integration Layer
//!
//! Provider abstraction, prompt construction and timeouts for generation calls.

pub mod prompt;
pub mod provider;
pub mod timeout;

pub use prompt::{PromptBuilder, PromptSection, PromptTemplates};
pub use provider::{
    ClaudeCodeProvider, GenerationParams, LlmProvider, LlmResponse, OllamaProvider,
    OpenAiProvider, ProviderConfig, ResponseTiming, SharedProvider, TokenUsage,
    create_provider,
};
pub use timeout::with_timeout;
