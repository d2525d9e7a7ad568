//! Declarative workflow definitions.
//!
//! A definition is a JSON document naming an ordered list of steps:
//!
//! ```json
//! {
//!   "name": "Research and Report",
//!   "steps": [
//!     { "step": 1, "agent": "Researcher", "input_key": "initial_query", "output_key": "research" },
//!     { "step": 3, "agent": "Critic", "input_key": ["research", "summary"], "output_key": "critique" }
//!   ]
//! }
//! ```

use std::collections::BTreeSet;
use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::AgentFlowError;

/// Ordered list of steps plus descriptive metadata. Immutable once loaded.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkflowDefinition {
    pub name: String,
    pub steps: Vec<StepSpec>,
}

impl WorkflowDefinition {
    /// Read and parse a definition from disk.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, AgentFlowError> {
        let path = path.as_ref();
        let raw = fs::read_to_string(path)
            .map_err(|err| AgentFlowError::config_io(path.to_path_buf(), err))?;
        let definition = serde_json::from_str(&raw)
            .map_err(|err| AgentFlowError::invalid_workflow(path.to_path_buf(), err))?;
        Ok(definition)
    }

    /// Parse a definition from an in-memory JSON document.
    pub fn from_json_str(raw: &str) -> Result<Self, AgentFlowError> {
        serde_json::from_str(raw)
            .map_err(|err| AgentFlowError::InvalidConfiguration(format!("invalid workflow: {err}")))
    }

    /// Agent names referenced by the steps, deduplicated.
    pub fn agent_names(&self) -> BTreeSet<&str> {
        self.steps.iter().map(|step| step.agent.as_str()).collect()
    }
}

/// One declared invocation of a named agent.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StepSpec {
    /// Display label only; not checked for order or uniqueness.
    pub step: i64,
    pub agent: String,
    pub input_key: InputKey,
    pub output_key: String,
}

/// Context keys feeding a step: one key, or an ordered list of keys.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum InputKey {
    Single(String),
    Many(Vec<String>),
}

impl InputKey {
    pub fn keys(&self) -> Vec<&str> {
        match self {
            InputKey::Single(key) => vec![key.as_str()],
            InputKey::Many(keys) => keys.iter().map(String::as_str).collect(),
        }
    }
}

impl From<&str> for InputKey {
    fn from(key: &str) -> Self {
        InputKey::Single(key.to_string())
    }
}

impl From<Vec<&str>> for InputKey {
    fn from(keys: Vec<&str>) -> Self {
        InputKey::Many(keys.into_iter().map(str::to_string).collect())
    }
}

impl StepSpec {
    pub fn new(
        step: i64,
        agent: impl Into<String>,
        input_key: impl Into<InputKey>,
        output_key: impl Into<String>,
    ) -> Self {
        Self {
            step,
            agent: agent.into(),
            input_key: input_key.into(),
            output_key: output_key.into(),
        }
    }
}
