//! Shared "get completion" capability used by every agent.
//!
//! The client returns a tagged `Result`; only [`get_completion`] flattens a
//! failure into the `Error: ...` text that flows through a workflow.

use agentflow_core::{redact_secrets, redact_with_report};
use thiserror::Error;
use tracing::{debug, info, warn};

/// System and user instructions for one completion request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Prompt {
    pub system: String,
    pub user: String,
}

impl Prompt {
    pub fn new(system: impl Into<String>, user: impl Into<String>) -> Self {
        Self {
            system: system.into(),
            user: user.into(),
        }
    }
}

/// Why a completion request produced no usable text.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CompletionError {
    #[error("Received empty content from API.")]
    EmptyContent,
    #[error("Error code: {status} - {message}")]
    Provider { status: u16, message: String },
    #[error("{0}")]
    Transport(String),
    #[error("{0}")]
    MalformedResponse(String),
}

impl CompletionError {
    pub fn kind(&self) -> &'static str {
        match self {
            CompletionError::EmptyContent => "empty_content",
            CompletionError::Provider { .. } => "provider",
            CompletionError::Transport(_) => "transport",
            CompletionError::MalformedResponse(_) => "malformed_response",
        }
    }

    /// Text stored in place of an agent's output when the call failed.
    pub fn into_agent_text(self) -> String {
        let details = redact_secrets(&self.to_string());
        match self {
            CompletionError::Provider { .. } => {
                format!("Error: Could not get a response from the AI. Details: {details}")
            }
            _ => format!("Error: An unexpected error occurred. Details: {details}"),
        }
    }
}

/// A hosted chat-completion endpoint.
///
/// Implementations make exactly one attempt per call.
#[async_trait::async_trait]
pub trait CompletionClient: Send + Sync {
    async fn complete(&self, prompt: &Prompt) -> Result<String, CompletionError>;
}

/// Run `prompt` through `client` on behalf of `agent`, turning any failure
/// into error text.
pub async fn get_completion(client: &dyn CompletionClient, agent: &str, prompt: &Prompt) -> String {
    debug!(agent, prompt_chars = prompt.user.len(), "calling LLM");

    match client.complete(prompt).await {
        Ok(content) => {
            info!(agent, output_chars = content.len(), "LLM call successful");
            content
        }
        Err(err) => {
            let (message, redactions) = redact_with_report(&err.to_string());
            if !redactions.is_empty() {
                warn!(agent, fields = ?redactions, "redacted potential secrets from completion error");
            }
            warn!(agent, kind = err.kind(), error = %message, "LLM call failed");
            err.into_agent_text()
        }
    }
}

#[cfg(test)]
pub(crate) mod testing {
    use super::*;
    use std::sync::Mutex;

    /// Completion client returning a canned result and recording prompts.
    pub struct FakeClient {
        reply: Result<String, CompletionError>,
        prompts: Mutex<Vec<Prompt>>,
    }

    impl FakeClient {
        pub fn replying(text: &str) -> Self {
            Self {
                reply: Ok(text.to_string()),
                prompts: Mutex::new(Vec::new()),
            }
        }

        pub fn failing(err: CompletionError) -> Self {
            Self {
                reply: Err(err),
                prompts: Mutex::new(Vec::new()),
            }
        }

        pub fn prompts(&self) -> Vec<Prompt> {
            self.prompts.lock().unwrap().clone()
        }
    }

    #[async_trait::async_trait]
    impl CompletionClient for FakeClient {
        async fn complete(&self, prompt: &Prompt) -> Result<String, CompletionError> {
            self.prompts.lock().unwrap().push(prompt.clone());
            self.reply.clone()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::testing::FakeClient;
    use super::*;

    #[tokio::test]
    async fn success_is_returned_verbatim() {
        let client = FakeClient::replying("  spaced output  ");
        let text = get_completion(&client, "Tester", &Prompt::new("sys", "user")).await;
        assert_eq!(text, "  spaced output  ");
    }

    #[tokio::test]
    async fn provider_errors_pass_message_through() {
        let client = FakeClient::failing(CompletionError::Provider {
            status: 429,
            message: "Rate limit reached".into(),
        });
        let text = get_completion(&client, "Tester", &Prompt::new("sys", "user")).await;
        assert_eq!(
            text,
            "Error: Could not get a response from the AI. Details: Error code: 429 - Rate limit reached"
        );
    }

    #[tokio::test]
    async fn empty_content_is_an_error() {
        let client = FakeClient::failing(CompletionError::EmptyContent);
        let text = get_completion(&client, "Tester", &Prompt::new("sys", "user")).await;
        assert_eq!(
            text,
            "Error: An unexpected error occurred. Details: Received empty content from API."
        );
    }

    #[test]
    fn transport_errors_use_generic_prefix() {
        let text = CompletionError::Transport("connection refused".into()).into_agent_text();
        assert_eq!(
            text,
            "Error: An unexpected error occurred. Details: connection refused"
        );
    }

    #[test]
    fn provider_messages_are_redacted() {
        let text = CompletionError::Provider {
            status: 401,
            message: "Incorrect API key provided: sk-abcdefghijklmnop".into(),
        }
        .into_agent_text();
        assert!(text.starts_with("Error: Could not get a response from the AI."));
        assert!(!text.contains("sk-abcdefghijklmnop"));
        assert!(text.contains("[REDACTED]"));
    }
}
