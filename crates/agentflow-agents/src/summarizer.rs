//! Summarizer agent.

use std::sync::Arc;

use agentflow_core::Agent;

use crate::completion::{CompletionClient, Prompt, get_completion};

pub const SUMMARIZER: &str = "Summarizer";

const SYSTEM_PROMPT: &str = "You are an expert summarizer. Distill the research text you are \
given into a concise, neutral, easy-to-read summary. Focus on the key points and present \
them clearly.";

pub struct SummarizerAgent {
    client: Arc<dyn CompletionClient>,
}

impl SummarizerAgent {
    pub fn new(client: Arc<dyn CompletionClient>) -> Self {
        Self { client }
    }

    pub fn prompt(text: &str) -> Prompt {
        Prompt::new(
            SYSTEM_PROMPT,
            format!("Please summarize the following text:\n\n{text}"),
        )
    }
}

#[async_trait::async_trait]
impl Agent for SummarizerAgent {
    fn name(&self) -> &str {
        SUMMARIZER
    }

    async fn run(&self, input: &str) -> String {
        get_completion(self.client.as_ref(), SUMMARIZER, &Self::prompt(input)).await
    }
}
