//! Presenter agent: folds critique into a polished final report.

use std::sync::Arc;

use agentflow_core::Agent;

use crate::completion::{CompletionClient, Prompt, get_completion};

pub const PRESENTER: &str = "Presenter";

const SYSTEM_PROMPT: &str = "You are the final presenter. Combine a summary and its critique \
into one polished, well-structured report for a professional audience. Apply the critique's \
suggestions to improve the summary, but do not mention the critique itself in the report.";

pub struct PresenterAgent {
    client: Arc<dyn CompletionClient>,
}

impl PresenterAgent {
    pub fn new(client: Arc<dyn CompletionClient>) -> Self {
        Self { client }
    }

    pub fn prompt(context: &str) -> Prompt {
        Prompt::new(
            SYSTEM_PROMPT,
            format!(
                "Using the following context, please generate the final polished report. \
                 Incorporate the feedback from the critique to improve the initial summary.\n\n{context}"
            ),
        )
    }
}

#[async_trait::async_trait]
impl Agent for PresenterAgent {
    fn name(&self) -> &str {
        PRESENTER
    }

    async fn run(&self, input: &str) -> String {
        get_completion(self.client.as_ref(), PRESENTER, &Self::prompt(input)).await
    }
}
