use std::path::PathBuf;

use thiserror::Error;

/// Core error type for AgentFlow.
#[derive(Debug, Error)]
pub enum AgentFlowError {
    #[error("configuration error: {0}")]
    InvalidConfiguration(String),
    #[error("missing environment variable: {0}")]
    MissingSecret(String),
    #[error("I/O error while reading {path}: {source}")]
    ConfigIo {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid workflow definition in {path}: {source}")]
    InvalidWorkflow {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("workflow '{workflow}' has no step naming a registered agent")]
    NoResolvableSteps { workflow: String },
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl AgentFlowError {
    pub fn config_io(path: PathBuf, source: std::io::Error) -> Self {
        Self::ConfigIo { path, source }
    }

    pub fn invalid_workflow(path: PathBuf, source: serde_json::Error) -> Self {
        Self::InvalidWorkflow { path, source }
    }
}
