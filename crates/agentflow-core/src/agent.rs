//! Agent contract and the name-keyed registry the orchestrator dispatches through.

use std::collections::BTreeMap;
use std::sync::Arc;

/// A named text-to-text transformation.
///
/// `run` never fails: implementations turn their own failures into text so a
/// workflow can always run to completion.
#[async_trait::async_trait]
pub trait Agent: Send + Sync {
    /// Name the agent is registered under.
    fn name(&self) -> &str;

    /// Transform the resolved input into this agent's output.
    async fn run(&self, input: &str) -> String;
}

/// Immutable-after-startup mapping from agent name to implementation.
#[derive(Clone, Default)]
pub struct AgentRegistry {
    agents: BTreeMap<String, Arc<dyn Agent>>,
}

impl AgentRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register an agent under its own name, replacing any previous holder.
    pub fn with_agent(mut self, agent: Arc<dyn Agent>) -> Self {
        self.agents.insert(agent.name().to_string(), agent);
        self
    }

    /// Register an agent under an explicit name.
    pub fn with_named(mut self, name: impl Into<String>, agent: Arc<dyn Agent>) -> Self {
        self.agents.insert(name.into(), agent);
        self
    }

    pub fn get(&self, name: &str) -> Option<&Arc<dyn Agent>> {
        self.agents.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.agents.contains_key(name)
    }

    pub fn names(&self) -> Vec<&str> {
        self.agents.keys().map(String::as_str).collect()
    }

    pub fn len(&self) -> usize {
        self.agents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.agents.is_empty()
    }
}

impl std::fmt::Debug for AgentRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AgentRegistry")
            .field("agents", &self.names())
            .finish()
    }
}
