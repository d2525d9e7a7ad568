//! Critic agent for checking a summary against the research it came from.

use std::sync::Arc;

use agentflow_core::Agent;

use crate::completion::{CompletionClient, Prompt, get_completion};

pub const CRITIC: &str = "Critic";

const SYSTEM_PROMPT: &str = "You are a meticulous critic. Analyze a summary together with the \
original research material it was based on. Look for inconsistencies, missing key points, \
or bias in the summary. Reply with a concise list of actionable points for improvement; \
if the summary is good, say so clearly.\n\
Example Output:\n\
- The summary misses point X from the research.\n\
- The tone leans towards Y; rephrase for neutrality.\n\
- The point about Z is accurate and well summarized.";

/// Critic agent that validates a summary and suggests improvements.
pub struct CriticAgent {
    client: Arc<dyn CompletionClient>,
}

impl CriticAgent {
    pub fn new(client: Arc<dyn CompletionClient>) -> Self {
        Self { client }
    }

    pub fn prompt(context: &str) -> Prompt {
        Prompt::new(
            SYSTEM_PROMPT,
            format!(
                "Please critique the following summary based on the provided research context.\n\n{context}"
            ),
        )
    }
}

#[async_trait::async_trait]
impl Agent for CriticAgent {
    fn name(&self) -> &str {
        CRITIC
    }

    async fn run(&self, input: &str) -> String {
        tracing::info!(agent = CRITIC, input_chars = input.len(), "critic reviewing summary");
        get_completion(self.client.as_ref(), CRITIC, &Self::prompt(input)).await
    }
}
