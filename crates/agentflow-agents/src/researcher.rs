//! Researcher agent: gathers facts and viewpoints on a topic from the model's own knowledge.

use std::sync::Arc;

use agentflow_core::Agent;

use crate::completion::{CompletionClient, Prompt, get_completion};

pub const RESEARCHER: &str = "Researcher";

const SYSTEM_PROMPT: &str = "You are a world-class researcher. Gather relevant information, \
key facts, and arguments on the topic you are given. Do not write a summary. \
Answer with a structured list of bullet points that covers the main aspects, \
including differing viewpoints, based on your internal knowledge.\n\
Example Output:\n\
- A central point about the topic.\n\
- A point offering a different perspective.\n\
- A statistic or key fact related to the topic.";

/// Researcher agent that turns a query into bullet-point findings.
pub struct ResearcherAgent {
    client: Arc<dyn CompletionClient>,
}

impl ResearcherAgent {
    pub fn new(client: Arc<dyn CompletionClient>) -> Self {
        Self { client }
    }

    pub fn prompt(topic: &str) -> Prompt {
        Prompt::new(
            SYSTEM_PROMPT,
            format!("Please conduct research on the following topic: {topic}"),
        )
    }
}

#[async_trait::async_trait]
impl Agent for ResearcherAgent {
    fn name(&self) -> &str {
        RESEARCHER
    }

    async fn run(&self, input: &str) -> String {
        tracing::info!(agent = RESEARCHER, "researcher collecting findings");
        get_completion(self.client.as_ref(), RESEARCHER, &Self::prompt(input)).await
    }
}
