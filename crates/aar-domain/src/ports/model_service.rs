//! Model Service port: the LLM facade shared by all analysis agents.

use async_trait::async_trait;

use crate::error::Result;

/// A single chat-style completion request.
#[derive(Debug, Clone)]
pub struct ModelRequest {
    /// The agent's role/instructions prompt.
    pub system_prompt: String,
    /// The code/context being reviewed.
    pub user_prompt: String,
    /// Upper bound on response tokens.
    pub max_tokens: u32,
    /// Sampling temperature.
    pub temperature: f32,
}

/// A completion response.
#[derive(Debug, Clone)]
pub struct ModelResponse {
    /// Raw text returned by the model (expected to contain JSON, possibly
    /// fenced or preceded by commentary — callers decode it leniently).
    pub content: String,
    /// Total tokens billed for this call, if the provider reports it.
    pub tokens_used: Option<u32>,
}

/// Facade over a chat-completion LLM provider. Implementations may run in
/// `mock_mode`, returning deterministic canned responses for tests and
/// offline operation.
#[async_trait]
pub trait ModelService: Send + Sync {
    /// Run one completion request.
    async fn complete(&self, request: ModelRequest) -> Result<ModelResponse>;

    /// Whether this instance is running in mock mode (no network calls).
    fn mock_mode(&self) -> bool;
}
