//! Sequential workflow execution.
//!
//! Runs the steps of a [`WorkflowDefinition`] in declared order, resolving each
//! step's input from a per-run [`ExecutionContext`], dispatching to the named
//! agent and recording what went in and what came out.

use std::collections::HashSet;
use std::path::Path;
use std::time::Instant;

use serde::{Deserialize, Serialize};
use tracing::{Instrument, debug, info, info_span, warn};
use uuid::Uuid;

use crate::agent::AgentRegistry;
use crate::context::{ExecutionContext, INITIAL_QUERY_KEY};
use crate::error::AgentFlowError;
use crate::metrics;
use crate::workflow::{InputKey, StepSpec, WorkflowDefinition};

/// Context key read for [`WorkflowResult::final_output`].
pub const FINAL_OUTPUT_KEY: &str = "final_report";
/// Returned as `final_output` when no executed step wrote [`FINAL_OUTPUT_KEY`].
pub const MISSING_FINAL_OUTPUT: &str = "Workflow did not produce a final report.";

/// Record of one executed step.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkflowLogEntry {
    pub step: i64,
    #[serde(rename = "agent")]
    pub agent_name: String,
    #[serde(rename = "input")]
    pub input_text: String,
    #[serde(rename = "output")]
    pub output_text: String,
}

/// Outcome of a full run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkflowResult {
    pub final_output: String,
    pub workflow_log: Vec<WorkflowLogEntry>,
}

/// Owns the loaded definition and the agent registry; both are read-only
/// after construction, so one orchestrator can serve concurrent runs.
#[derive(Debug)]
pub struct Orchestrator {
    definition: WorkflowDefinition,
    registry: AgentRegistry,
}

impl Orchestrator {
    pub fn new(definition: WorkflowDefinition, registry: AgentRegistry) -> Self {
        for name in definition.agent_names() {
            if !registry.contains(name) {
                warn!(agent = %name, workflow = %definition.name, "workflow references unregistered agent; its steps will be skipped");
            }
        }

        let mut produced: HashSet<&str> = HashSet::from([INITIAL_QUERY_KEY]);
        for step in &definition.steps {
            for key in step.input_key.keys() {
                if !produced.contains(key) {
                    warn!(step = step.step, key, "input key is not produced by any earlier step");
                }
            }
            if registry.contains(&step.agent) {
                produced.insert(step.output_key.as_str());
            }
        }

        info!(
            workflow = %definition.name,
            steps = definition.steps.len(),
            agents = ?registry.names(),
            "orchestrator initialised"
        );

        Self {
            definition,
            registry,
        }
    }

    /// Load the definition from disk and pair it with `registry`.
    pub fn from_path(path: impl AsRef<Path>, registry: AgentRegistry) -> Result<Self, AgentFlowError> {
        let definition = WorkflowDefinition::load(path)?;
        Ok(Self::new(definition, registry))
    }

    pub fn definition(&self) -> &WorkflowDefinition {
        &self.definition
    }

    pub fn registry(&self) -> &AgentRegistry {
        &self.registry
    }

    /// Execute every step for `initial_query`.
    ///
    /// Agent failures never abort the run; they arrive as text in the log and
    /// context. The only hard error is a non-empty definition in which no step
    /// names a registered agent.
    pub async fn run_workflow(&self, initial_query: &str) -> Result<WorkflowResult, AgentFlowError> {
        let resolvable = self
            .definition
            .steps
            .iter()
            .any(|step| self.registry.contains(&step.agent));
        if !self.definition.steps.is_empty() && !resolvable {
            return Err(AgentFlowError::NoResolvableSteps {
                workflow: self.definition.name.clone(),
            });
        }

        let run_id = Uuid::new_v4();
        let span = info_span!("workflow.run", %run_id, workflow = %self.definition.name);
        Ok(self.execute(initial_query).instrument(span).await)
    }

    async fn execute(&self, initial_query: &str) -> WorkflowResult {
        info!(steps = self.definition.steps.len(), "starting workflow");
        let started = Instant::now();

        let mut context = ExecutionContext::seeded(initial_query);
        let mut workflow_log = Vec::with_capacity(self.definition.steps.len());

        for step in &self.definition.steps {
            let Some(agent) = self.registry.get(&step.agent) else {
                warn!(step = step.step, agent = %step.agent, "agent not registered; skipping step");
                metrics::record_skipped_step(&step.agent);
                continue;
            };

            let input_text = prepare_agent_input(step, &context);
            info!(step = step.step, agent = %step.agent, "running step");

            let step_started = Instant::now();
            let output_text = agent.run(&input_text).await;
            let duration_ms = step_started.elapsed().as_millis() as u64;

            let status = if output_text.starts_with("Error:") {
                "error"
            } else {
                "ok"
            };
            metrics::record_step(&step.agent, status, duration_ms);
            debug!(
                step = step.step,
                agent = %step.agent,
                output_key = %step.output_key,
                duration_ms,
                status,
                "step finished"
            );

            context.insert(step.output_key.clone(), output_text.clone());
            workflow_log.push(WorkflowLogEntry {
                step: step.step,
                agent_name: step.agent.clone(),
                input_text,
                output_text,
            });
        }

        let final_output = context
            .get(FINAL_OUTPUT_KEY)
            .map(str::to_string)
            .unwrap_or_else(|| MISSING_FINAL_OUTPUT.to_string());

        info!(
            executed = workflow_log.len(),
            duration_ms = started.elapsed().as_millis() as u64,
            "workflow finished"
        );

        WorkflowResult {
            final_output,
            workflow_log,
        }
    }
}

/// Build the text handed to a step's agent from the current context.
///
/// A single key yields its value, or the empty string when absent. A key list
/// yields one labelled block per key, joined by newlines, with a placeholder
/// body for absent keys.
pub fn prepare_agent_input(step: &StepSpec, context: &ExecutionContext) -> String {
    match &step.input_key {
        InputKey::Single(key) => context.get_or_empty(key).to_string(),
        InputKey::Many(keys) => keys
            .iter()
            .map(|key| {
                let label = key.to_uppercase();
                format!(
                    "--- START OF {label} ---\n{}\n--- END OF {label} ---\n",
                    context.get_or_placeholder(key)
                )
            })
            .collect::<Vec<_>>()
            .join("\n"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::agent::Agent;
    use std::sync::{Arc, Mutex};

    /// Echoes its input with a prefix and remembers every input it saw.
    struct Recorder {
        name: String,
        seen: Mutex<Vec<String>>,
    }

    impl Recorder {
        fn new(name: &str) -> Arc<Self> {
            Arc::new(Self {
                name: name.to_string(),
                seen: Mutex::new(Vec::new()),
            })
        }

        fn seen(&self) -> Vec<String> {
            self.seen.lock().unwrap().clone()
        }
    }

    #[async_trait::async_trait]
    impl Agent for Recorder {
        fn name(&self) -> &str {
            &self.name
        }

        async fn run(&self, input: &str) -> String {
            self.seen.lock().unwrap().push(input.to_string());
            format!("{} saw [{}]", self.name, input)
        }
    }

    fn step(n: i64, agent: &str, input: impl Into<InputKey>, output: &str) -> StepSpec {
        StepSpec::new(n, agent, input, output)
    }

    fn definition(steps: Vec<StepSpec>) -> WorkflowDefinition {
        WorkflowDefinition {
            name: "test".into(),
            steps,
        }
    }

    #[test]
    fn single_key_resolves_value_or_empty() {
        let mut context = ExecutionContext::seeded("query");
        context.insert("research", "facts");

        assert_eq!(
            prepare_agent_input(&step(1, "A", "research", "x"), &context),
            "facts"
        );
        assert_eq!(
            prepare_agent_input(&step(1, "A", "missing", "x"), &context),
            ""
        );
    }

    #[test]
    fn multi_key_builds_labelled_blocks() {
        let mut context = ExecutionContext::seeded("query");
        context.insert("research", "facts");
        context.insert("summary", "short");

        let input = prepare_agent_input(&step(3, "Critic", vec!["research", "summary"], "c"), &context);
        assert_eq!(
            input,
            "--- START OF RESEARCH ---\nfacts\n--- END OF RESEARCH ---\n\n--- START OF SUMMARY ---\nshort\n--- END OF SUMMARY ---\n"
        );
    }

    #[test]
    fn multi_key_missing_uses_placeholder() {
        let context = ExecutionContext::seeded("query");
        let input = prepare_agent_input(&step(1, "A", vec!["critique"], "x"), &context);
        assert_eq!(
            input,
            "--- START OF CRITIQUE ---\n'critique' not found in context\n--- END OF CRITIQUE ---\n"
        );
    }

    #[test]
    fn empty_key_list_yields_empty_input() {
        let context = ExecutionContext::seeded("query");
        let input = prepare_agent_input(&step(1, "A", InputKey::Many(vec![]), "x"), &context);
        assert_eq!(input, "");
    }

    #[tokio::test]
    async fn log_records_input_before_own_output_is_merged() {
        let agent = Recorder::new("Echo");
        let registry = AgentRegistry::new().with_agent(agent.clone());
        let orchestrator = Orchestrator::new(
            definition(vec![step(1, "Echo", "draft", "draft")]),
            registry,
        );

        let result = orchestrator.run_workflow("q").await.unwrap();
        assert_eq!(result.workflow_log.len(), 1);
        assert_eq!(result.workflow_log[0].input_text, "");
        assert_eq!(result.workflow_log[0].output_text, "Echo saw []");
        assert_eq!(agent.seen(), vec![String::new()]);
    }

    #[tokio::test]
    async fn unregistered_agents_are_skipped() {
        let registry = AgentRegistry::new().with_agent(Recorder::new("Known"));
        let orchestrator = Orchestrator::new(
            definition(vec![
                step(1, "Ghost", "initial_query", "haunt"),
                step(2, "Known", "haunt", "final_report"),
            ]),
            registry,
        );

        let result = orchestrator.run_workflow("q").await.unwrap();
        assert_eq!(result.workflow_log.len(), 1);
        assert_eq!(result.workflow_log[0].step, 2);
        // The skipped step never wrote its key, so the single-key read is empty.
        assert_eq!(result.workflow_log[0].input_text, "");
        assert_eq!(result.final_output, "Known saw []");
    }

    #[tokio::test]
    async fn final_output_falls_back_when_never_written() {
        let registry = AgentRegistry::new().with_agent(Recorder::new("A"));
        let orchestrator = Orchestrator::new(
            definition(vec![step(1, "A", "initial_query", "summary")]),
            registry,
        );

        let result = orchestrator.run_workflow("q").await.unwrap();
        assert_eq!(result.final_output, MISSING_FINAL_OUTPUT);
    }

    #[tokio::test]
    async fn colliding_output_keys_keep_last_write() {
        let registry = AgentRegistry::new()
            .with_agent(Recorder::new("First"))
            .with_agent(Recorder::new("Second"));
        let orchestrator = Orchestrator::new(
            definition(vec![
                step(1, "First", "initial_query", "final_report"),
                step(2, "Second", "initial_query", "final_report"),
            ]),
            registry,
        );

        let result = orchestrator.run_workflow("q").await.unwrap();
        assert_eq!(result.final_output, "Second saw [q]");
    }

    #[tokio::test]
    async fn step_labels_are_copied_verbatim() {
        let registry = AgentRegistry::new().with_agent(Recorder::new("A"));
        let orchestrator = Orchestrator::new(
            definition(vec![
                step(10, "A", "initial_query", "a"),
                step(3, "A", "a", "b"),
                step(3, "A", "b", "c"),
            ]),
            registry,
        );

        let result = orchestrator.run_workflow("q").await.unwrap();
        let labels: Vec<i64> = result.workflow_log.iter().map(|e| e.step).collect();
        assert_eq!(labels, vec![10, 3, 3]);
    }

    #[tokio::test]
    async fn no_resolvable_steps_is_hard_error() {
        let orchestrator = Orchestrator::new(
            definition(vec![step(1, "Ghost", "initial_query", "final_report")]),
            AgentRegistry::new(),
        );

        let err = orchestrator.run_workflow("q").await.unwrap_err();
        assert!(matches!(err, AgentFlowError::NoResolvableSteps { .. }));
    }

    #[tokio::test]
    async fn empty_definition_returns_fallback() {
        let orchestrator = Orchestrator::new(definition(vec![]), AgentRegistry::new());

        let result = orchestrator.run_workflow("q").await.unwrap();
        assert!(result.workflow_log.is_empty());
        assert_eq!(result.final_output, MISSING_FINAL_OUTPUT);
    }

    #[tokio::test]
    async fn concurrent_runs_do_not_share_context() {
        let registry = AgentRegistry::new().with_agent(Recorder::new("A"));
        let orchestrator = Arc::new(Orchestrator::new(
            definition(vec![step(1, "A", "initial_query", "final_report")]),
            registry,
        ));

        let first = tokio::spawn({
            let orchestrator = orchestrator.clone();
            async move { orchestrator.run_workflow("one").await }
        });
        let second = tokio::spawn({
            let orchestrator = orchestrator.clone();
            async move { orchestrator.run_workflow("two").await }
        });

        let first = first.await.unwrap().unwrap();
        let second = second.await.unwrap().unwrap();
        assert_eq!(first.final_output, "A saw [one]");
        assert_eq!(second.final_output, "A saw [two]");
    }

    #[test]
    fn log_entries_serialize_with_wire_names() {
        let entry = WorkflowLogEntry {
            step: 1,
            agent_name: "Researcher".into(),
            input_text: "in".into(),
            output_text: "out".into(),
        };
        let value = serde_json::to_value(&entry).unwrap();
        assert_eq!(
            value,
            serde_json::json!({"step": 1, "agent": "Researcher", "input": "in", "output": "out"})
        );
    }
}
