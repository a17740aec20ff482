use super::GenerativeBackend;
use crate::core::config::GenerationConfig;
use crate::core::error::StageError;
use async_trait::async_trait;
use reqwest::StatusCode;
use serde::{Deserialize, Serialize};

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    temperature: f64,
    max_tokens: u32,
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: Option<ChoiceMessage>,
}

#[derive(Debug, Deserialize)]
struct ChoiceMessage {
    content: Option<String>,
}

/// OpenRouter-compatible chat completion client.
pub struct OpenRouterClient {
    config: GenerationConfig,
    client: reqwest::Client,
}

impl OpenRouterClient {
    pub fn new(config: GenerationConfig) -> Self {
        Self {
            config,
            client: reqwest::Client::new(),
        }
    }

    pub fn config(&self) -> &GenerationConfig {
        &self.config
    }
}

#[async_trait]
impl GenerativeBackend for OpenRouterClient {
    fn backend_name(&self) -> &'static str {
        "openrouter"
    }

    fn is_configured(&self) -> bool {
        self.config.has_credentials()
    }

    async fn complete(&self, prompt: &str) -> Result<String, StageError> {
        let api_key = match self.config.api_key.as_deref() {
            Some(key) if !key.trim().is_empty() => key,
            _ => {
                return Err(StageError::BackendUnavailable(
                    "missing API credentials".to_string(),
                ))
            }
        };

        let payload = ChatRequest {
            model: &self.config.model,
            messages: vec![ChatMessage {
                role: "user",
                content: prompt,
            }],
            temperature: self.config.temperature,
            max_tokens: self.config.max_tokens,
        };

        tracing::debug!(
            model = %self.config.model,
            prompt_chars = prompt.len(),
            "sending completion request"
        );

        let response = self
            .client
            .post(&self.config.endpoint)
            .bearer_auth(api_key)
            .json(&payload)
            .timeout(self.config.timeout())
            .send()
            .await
            .map_err(|e| StageError::BackendUnavailable(e.to_string()))?;

        let status = response.status();
        if status != StatusCode::OK {
            return Err(StageError::BackendUnavailable(format!(
                "server returned status: {}",
                status
            )));
        }

        let body = response
            .text()
            .await
            .map_err(|e| StageError::BackendUnavailable(e.to_string()))?;
        let parsed: ChatResponse = serde_json::from_str(&body)
            .map_err(|e| StageError::MalformedResponse(e.to_string()))?;

        parsed
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message)
            .and_then(|message| message.content)
            .ok_or_else(|| {
                StageError::MalformedResponse("response has no message content".to_string())
            })
    }
}
