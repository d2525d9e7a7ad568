//! AgentFlow core abstractions.
//!
//! This crate holds the workflow definition model, the per-run execution
//! context, the agent contract and registry, and the orchestrator that runs a
//! definition step by step.

mod agent;
mod config;
mod context;
mod diagram;
mod error;
pub mod metrics;
mod orchestrator;
mod security;
mod telemetry;
mod workflow;

pub use agent::{Agent, AgentRegistry};
pub use config::{
    AppConfig, ConfigLoader, LlmConfig, LoggingConfig, ServerConfig, WorkflowConfig,
};
pub use context::{ExecutionContext, INITIAL_QUERY_KEY, missing_key_placeholder};
pub use diagram::{DiagramFormat, render_graphviz, render_mermaid};
pub use error::AgentFlowError;
pub use orchestrator::{
    FINAL_OUTPUT_KEY, MISSING_FINAL_OUTPUT, Orchestrator, WorkflowLogEntry, WorkflowResult,
    prepare_agent_input,
};
pub use security::{SecretValue, redact_secrets, redact_with_report, require_env};
pub use telemetry::{LogStream, TelemetryOptions, init_telemetry};
pub use workflow::{InputKey, StepSpec, WorkflowDefinition};
