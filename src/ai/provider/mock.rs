//! Scripted provider for tests

use async_trait::async_trait;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use super::{GenerationParams, LlmProvider, LlmResponse};
use crate::types::{ExpandError, Result};

pub enum MockBehavior {
    Reply(String),
    Fail(String),
    Slow(Duration, String),
}

pub struct MockProvider {
    behavior: MockBehavior,
    calls: AtomicUsize,
    last_prompt: Mutex<Option<String>>,
    last_params: Mutex<Option<GenerationParams>>,
}

impl MockProvider {
    pub fn new(behavior: MockBehavior) -> Self {
        Self {
            behavior,
            calls: AtomicUsize::new(0),
            last_prompt: Mutex::new(None),
            last_params: Mutex::new(None),
        }
    }

    pub fn replying(content: impl Into<String>) -> Self {
        Self::new(MockBehavior::Reply(content.into()))
    }

    pub fn failing(message: impl Into<String>) -> Self {
        Self::new(MockBehavior::Fail(message.into()))
    }

    pub fn slow(delay: Duration, content: impl Into<String>) -> Self {
        Self::new(MockBehavior::Slow(delay, content.into()))
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn last_prompt(&self) -> Option<String> {
        self.last_prompt.lock().unwrap().clone()
    }

    pub fn last_params(&self) -> Option<GenerationParams> {
        self.last_params.lock().unwrap().clone()
    }
}

#[async_trait]
impl LlmProvider for MockProvider {
    async fn generate(&self, prompt: &str, params: &GenerationParams) -> Result<LlmResponse> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        *self.last_prompt.lock().unwrap() = Some(prompt.to_string());
        *self.last_params.lock().unwrap() = Some(params.clone());

        match &self.behavior {
            MockBehavior::Reply(content) => Ok(LlmResponse::content_only(content.clone())),
            MockBehavior::Fail(message) => Err(ExpandError::LlmApi(message.clone())),
            MockBehavior::Slow(delay, content) => {
                tokio::time::sleep(*delay).await;
                Ok(LlmResponse::content_only(content.clone()))
            }
        }
    }

    fn name(&self) -> &str {
        "mock"
    }

    fn model(&self) -> &str {
        "mock-model"
    }
}
