//! [`ModelService`] facade over an OpenAI-compatible chat-completion API.
//!
//! In `mock_mode`, no network call is made: a deterministic synthetic
//! response is derived from the request so tests and offline runs produce
//! stable output.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use aar_domain::error::{Error, Result};
use aar_domain::ports::{ModelRequest, ModelResponse, ModelService};

/// Facade over an OpenAI-compatible `/chat/completions` endpoint.
pub struct OpenAiService {
    client: reqwest::Client,
    base_url: String,
    api_key: Option<String>,
    model: String,
    mock_mode: bool,
}

impl OpenAiService {
    /// Create a live service instance.
    #[must_use]
    pub fn live(base_url: impl Into<String>, api_key: String, model: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: base_url.into(),
            api_key: Some(api_key),
            model: model.into(),
            mock_mode: false,
        }
    }

    /// Create a mock instance: `complete` never touches the network.
    #[must_use]
    pub fn mock() -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: String::new(),
            api_key: None,
            model: "mock".to_string(),
            mock_mode: true,
        }
    }
}

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    max_tokens: u32,
    temperature: f32,
}

#[derive(Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
    usage: Option<ChatUsage>,
}

#[derive(Deserialize)]
struct ChatChoice {
    message: ChatChoiceMessage,
}

#[derive(Deserialize)]
struct ChatChoiceMessage {
    content: String,
}

#[derive(Deserialize)]
struct ChatUsage {
    total_tokens: Option<u32>,
}

#[async_trait]
impl ModelService for OpenAiService {
    async fn complete(&self, request: ModelRequest) -> Result<ModelResponse> {
        if self.mock_mode {
            return Ok(mock_response(&request));
        }

        let api_key = self
            .api_key
            .as_deref()
            .ok_or_else(|| Error::internal("OpenAiService is not in mock mode but has no API key"))?;

        let body = ChatRequest {
            model: &self.model,
            messages: vec![
                ChatMessage {
                    role: "system",
                    content: &request.system_prompt,
                },
                ChatMessage {
                    role: "user",
                    content: &request.user_prompt,
                },
            ],
            max_tokens: request.max_tokens,
            temperature: request.temperature,
        };

        let response = self
            .client
            .post(format!("{}/chat/completions", self.base_url))
            .bearer_auth(api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| Error::transient_with_source("model service request failed", e))?;

        if response.status().as_u16() == 429 {
            return Err(Error::transient("model service rate limit exceeded"));
        }
        if !response.status().is_success() {
            return Err(Error::fatal(format!(
                "model service returned HTTP {}",
                response.status()
            )));
        }

        let parsed: ChatResponse = response
            .json()
            .await
            .map_err(|e| Error::fatal_with_source("decoding model service response", e))?;
        let content = parsed
            .choices
            .into_iter()
            .next()
            .map(|c| c.message.content)
            .ok_or_else(|| Error::fatal("model service returned no choices"))?;
        let tokens_used = parsed.usage.and_then(|u| u.total_tokens);

        Ok(ModelResponse {
            content,
            tokens_used,
        })
    }

    fn mock_mode(&self) -> bool {
        self.mock_mode
    }
}

/// Deterministic canned finding, keyed off the user prompt's length so
/// different inputs still yield distinguishable (but stable) output.
fn mock_response(request: &ModelRequest) -> ModelResponse {
    let severity = if request.user_prompt.len() % 2 == 0 {
        "Medium"
    } else {
        "Low"
    };
    let content = format!(
        r#"[{{"category":"Smell","severity":"{severity}","description":"mock finding","explanation":"generated in mock mode, no model call was made","filePath":null,"symbol":null}}]"#
    );
    ModelResponse {
        content,
        tokens_used: Some(0),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn mock_mode_never_touches_network() {
        let service = OpenAiService::mock();
        assert!(service.mock_mode());
        let response = service
            .complete(ModelRequest {
                system_prompt: "sys".to_string(),
                user_prompt: "user".to_string(),
                max_tokens: 100,
                temperature: 0.0,
            })
            .await
            .unwrap();
        assert!(response.content.contains("mock finding"));
    }
}
