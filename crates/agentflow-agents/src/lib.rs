//! LLM-backed agents for AgentFlow workflows.
//!
//! Every agent builds a role-specific prompt pair and hands it to a shared
//! [`CompletionClient`]; failures come back as `Error: ...` text.

use std::sync::Arc;

use agentflow_core::{AgentFlowError, AgentRegistry, AppConfig};

pub mod completion;
pub mod critic;
pub mod openai;
pub mod presenter;
pub mod researcher;
pub mod summarizer;

pub use completion::{CompletionClient, CompletionError, Prompt, get_completion};
pub use critic::{CRITIC, CriticAgent};
pub use openai::{OpenAiClient, SamplingSettings};
pub use presenter::{PRESENTER, PresenterAgent};
pub use researcher::{RESEARCHER, ResearcherAgent};
pub use summarizer::{SUMMARIZER, SummarizerAgent};

/// Registry holding the four reference agents, all sharing `client`.
pub fn default_registry(client: Arc<dyn CompletionClient>) -> AgentRegistry {
    AgentRegistry::new()
        .with_agent(Arc::new(ResearcherAgent::new(client.clone())))
        .with_agent(Arc::new(SummarizerAgent::new(client.clone())))
        .with_agent(Arc::new(CriticAgent::new(client.clone())))
        .with_agent(Arc::new(PresenterAgent::new(client)))
}

/// Build the reference registry against the configured endpoint.
///
/// Fails when the credential named by `llm.api_key_env` is absent, so callers
/// can refuse to start.
pub fn registry_from_config(config: &AppConfig) -> Result<AgentRegistry, AgentFlowError> {
    let api_key = config.llm_api_key()?;
    let client = OpenAiClient::from_config(&config.llm, api_key);
    tracing::info!(
        model = %client.settings().model,
        base_url = %config.llm.base_url,
        "completion client configured"
    );
    Ok(default_registry(Arc::new(client)))
}
