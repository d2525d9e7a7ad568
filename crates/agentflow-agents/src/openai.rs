//! OpenAI-compatible chat-completion client.
//!
//! POST {base_url}/chat/completions
//! Headers:
//!   Authorization: Bearer {api_key}
//!   content-type: application/json

use agentflow_core::{LlmConfig, SecretValue};
use serde::{Deserialize, Serialize};

use crate::completion::{CompletionClient, CompletionError, Prompt};

/// Fixed sampling parameters sent with every request.
#[derive(Debug, Clone, PartialEq)]
pub struct SamplingSettings {
    pub model: String,
    pub temperature: f64,
    pub max_tokens: u32,
}

impl Default for SamplingSettings {
    fn default() -> Self {
        let defaults = LlmConfig::default();
        Self {
            model: defaults.model,
            temperature: defaults.temperature,
            max_tokens: defaults.max_tokens,
        }
    }
}

/// Calls a hosted chat-completion endpoint over HTTP.
///
/// The inner `reqwest::Client` pools connections and is shared by concurrent
/// workflow runs.
#[derive(Debug, Clone)]
pub struct OpenAiClient {
    http: reqwest::Client,
    base_url: String,
    api_key: SecretValue,
    settings: SamplingSettings,
}

impl OpenAiClient {
    pub fn new(base_url: impl Into<String>, api_key: SecretValue, settings: SamplingSettings) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: base_url.into(),
            api_key,
            settings,
        }
    }

    pub fn from_config(config: &LlmConfig, api_key: SecretValue) -> Self {
        Self::new(
            config.base_url.clone(),
            api_key,
            SamplingSettings {
                model: config.model.clone(),
                temperature: config.temperature,
                max_tokens: config.max_tokens,
            },
        )
    }

    pub fn settings(&self) -> &SamplingSettings {
        &self.settings
    }

    fn endpoint(&self) -> String {
        format!("{}/chat/completions", self.base_url.trim_end_matches('/'))
    }
}

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: [ChatMessage<'a>; 2],
    temperature: f64,
    max_tokens: u32,
}

#[derive(Serialize)]
struct ChatMessage<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<ChatChoice>,
}

#[derive(Deserialize)]
struct ChatChoice {
    message: ChatChoiceMessage,
}

#[derive(Deserialize)]
struct ChatChoiceMessage {
    #[serde(default)]
    content: Option<String>,
}

#[derive(Deserialize)]
struct ErrorEnvelope {
    error: ErrorBody,
}

#[derive(Deserialize)]
struct ErrorBody {
    message: String,
}

#[async_trait::async_trait]
impl CompletionClient for OpenAiClient {
    async fn complete(&self, prompt: &Prompt) -> Result<String, CompletionError> {
        let body = ChatRequest {
            model: &self.settings.model,
            messages: [
                ChatMessage {
                    role: "system",
                    content: &prompt.system,
                },
                ChatMessage {
                    role: "user",
                    content: &prompt.user,
                },
            ],
            temperature: self.settings.temperature,
            max_tokens: self.settings.max_tokens,
        };

        tracing::debug!(model = %self.settings.model, url = %self.endpoint(), "sending chat completion request");

        let response = self
            .http
            .post(self.endpoint())
            .bearer_auth(self.api_key.expose())
            .json(&body)
            .send()
            .await
            .map_err(|err| CompletionError::Transport(format!("HTTP request failed: {err}")))?;

        let status = response.status();
        let response_text = response.text().await.map_err(|err| {
            CompletionError::Transport(format!("Failed to read response body: {err}"))
        })?;

        if !status.is_success() {
            let message = serde_json::from_str::<ErrorEnvelope>(&response_text)
                .map(|envelope| envelope.error.message)
                .unwrap_or(response_text);
            return Err(CompletionError::Provider {
                status: status.as_u16(),
                message,
            });
        }

        let parsed: ChatResponse = serde_json::from_str(&response_text).map_err(|err| {
            CompletionError::MalformedResponse(format!("Failed to parse response JSON: {err}"))
        })?;

        let choice = parsed.choices.into_iter().next().ok_or_else(|| {
            CompletionError::MalformedResponse("Response contained no choices".to_string())
        })?;

        match choice.message.content {
            Some(content) if !content.is_empty() => Ok(content),
            _ => Err(CompletionError::EmptyContent),
        }
    }
}
