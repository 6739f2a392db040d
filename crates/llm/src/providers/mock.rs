//! Mock generator provider for tests and offline runs.

use crate::client::{LlmClient, LlmRequest, LlmResponse};
use scoperag_core::{AppError, AppResult};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

/// Deterministic stand-in for a real generator.
///
/// Echoes a fixed-form answer derived from the prompt and counts how many
/// times it was invoked, so tests can assert that short-circuit paths never
/// reach the generator.
#[derive(Debug, Clone, Default)]
pub struct MockClient {
    calls: Arc<AtomicUsize>,
    fail_with: Option<String>,
}

impl MockClient {
    /// Create a new mock client.
    pub fn new() -> Self {
        Self::default()
    }

    /// A mock that fails every completion with the given message. Lets
    /// tests exercise generator-failure handling.
    pub fn failing(message: impl Into<String>) -> Self {
        Self {
            calls: Arc::new(AtomicUsize::new(0)),
            fail_with: Some(message.into()),
        }
    }

    /// Number of completions performed so far.
    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait::async_trait]
impl LlmClient for MockClient {
    fn provider_name(&self) -> &str {
        "mock"
    }

    async fn complete(&self, request: &LlmRequest) -> AppResult<LlmResponse> {
        self.calls.fetch_add(1, Ordering::SeqCst);

        if let Some(message) = &self.fail_with {
            return Err(AppError::Llm(message.clone()));
        }

        // First prompt line is enough to make the output traceable in tests.
        let first_line = request.prompt.lines().next().unwrap_or("");
        Ok(LlmResponse {
            content: format!("[mock answer] {}", first_line),
            model: request.model.clone(),
        })
    }
}
