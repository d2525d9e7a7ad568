use std::sync::Arc;

use agentflow_api::{AppState, build_router};
use agentflow_core::{Agent, AgentRegistry, Orchestrator, WorkflowDefinition};
use axum::http::StatusCode;
use axum_test::TestServer;
use serde_json::{Value, json};

const WORKFLOW: &str = r#"{
    "name": "Research, Critique, and Report Workflow",
    "steps": [
        {"step": 1, "agent": "Researcher", "input_key": "initial_query", "output_key": "research"},
        {"step": 2, "agent": "Summarizer", "input_key": "research", "output_key": "summary"},
        {"step": 3, "agent": "Critic", "input_key": ["research", "summary"], "output_key": "critique"},
        {"step": 4, "agent": "Presenter", "input_key": ["summary", "critique"], "output_key": "final_report"}
    ]
}"#;

struct Echo(&'static str);

#[async_trait::async_trait]
impl Agent for Echo {
    fn name(&self) -> &str {
        self.0
    }

    async fn run(&self, input: &str) -> String {
        format!("{} saw {} chars", self.0, input.len())
    }
}

fn server_with(registry: AgentRegistry) -> TestServer {
    let definition = WorkflowDefinition::from_json_str(WORKFLOW).expect("workflow parses");
    let state = AppState::new(Orchestrator::new(definition, registry), 2);
    TestServer::new(build_router(state)).expect("test server starts")
}

fn full_registry() -> AgentRegistry {
    ["Researcher", "Summarizer", "Critic", "Presenter"]
        .into_iter()
        .fold(AgentRegistry::new(), |registry, name| {
            registry.with_agent(Arc::new(Echo(name)))
        })
}

#[tokio::test]
async fn run_workflow_returns_final_output_and_log() {
    let server = server_with(full_registry());

    let response = server
        .post("/run-workflow")
        .json(&json!({ "query": "quantum batteries" }))
        .await;
    response.assert_status_ok();

    let body: Value = response.json();
    let log = body["workflow_log"].as_array().expect("log array");
    assert_eq!(log.len(), 4);
    assert_eq!(log[0]["step"], 1);
    assert_eq!(log[0]["agent"], "Researcher");
    assert_eq!(log[0]["input"], "quantum batteries");
    assert_eq!(body["final_output"], log[3]["output"]);
}

#[tokio::test]
async fn missing_presenter_yields_fallback_report() {
    let registry = AgentRegistry::new()
        .with_agent(Arc::new(Echo("Researcher")))
        .with_agent(Arc::new(Echo("Summarizer")))
        .with_agent(Arc::new(Echo("Critic")));
    let server = server_with(registry);

    let response = server
        .post("/run-workflow")
        .json(&json!({ "query": "anything" }))
        .await;
    response.assert_status_ok();

    let body: Value = response.json();
    assert_eq!(body["workflow_log"].as_array().map(Vec::len), Some(3));
    assert_eq!(body["final_output"], "Workflow did not produce a final report.");
}

#[tokio::test]
async fn run_without_resolvable_steps_is_server_error() {
    let server = server_with(AgentRegistry::new());

    let response = server
        .post("/run-workflow")
        .json(&json!({ "query": "anything" }))
        .expect_failure()
        .await;
    response.assert_status(StatusCode::INTERNAL_SERVER_ERROR);

    let body: Value = response.json();
    assert!(body["error"].as_str().is_some_and(|msg| !msg.is_empty()));
}

#[tokio::test]
async fn malformed_body_is_rejected() {
    let server = server_with(full_registry());

    let response = server
        .post("/run-workflow")
        .json(&json!({ "question": "wrong field" }))
        .expect_failure()
        .await;
    assert!(response.status_code().is_client_error());
}

#[tokio::test]
async fn workflow_config_echoes_definition() {
    let server = server_with(full_registry());

    let body: Value = server.get("/get-workflow-config").await.json();
    assert_eq!(body["name"], "Research, Critique, and Report Workflow");
    assert_eq!(body["steps"][0]["input_key"], "initial_query");
    assert_eq!(body["steps"][2]["input_key"], json!(["research", "summary"]));
    assert_eq!(body["steps"][3]["output_key"], "final_report");
}

#[tokio::test]
async fn diagram_defaults_to_mermaid() {
    let server = server_with(full_registry());

    let body: Value = server.get("/workflow-diagram").await.json();
    assert_eq!(body["format"], "mermaid");
    let diagram = body["diagram"].as_str().expect("diagram text");
    assert!(diagram.starts_with("graph TD;"));
    assert!(diagram.contains("User Input"));
    assert!(diagram.contains("Final Output"));
}

#[tokio::test]
async fn diagram_supports_graphviz_and_rejects_unknown() {
    let server = server_with(full_registry());

    let body: Value = server
        .get("/workflow-diagram")
        .add_query_param("format", "graphviz")
        .await
        .json();
    assert_eq!(body["format"], "graphviz");
    assert!(body["diagram"].as_str().is_some_and(|d| d.starts_with("digraph")));

    server
        .get("/workflow-diagram")
        .add_query_param("format", "ascii")
        .expect_failure()
        .await
        .assert_status(StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn health_reports_workflow_and_capacity() {
    let server = server_with(full_registry());

    let body: Value = server.get("/health").await.json();
    assert_eq!(body["status"], "ok");
    assert_eq!(body["steps"], 4);
    assert_eq!(body["agents"], json!(["Critic", "Presenter", "Researcher", "Summarizer"]));
    assert_eq!(body["capacity"]["max_concurrent_runs"], 2);
    assert_eq!(body["capacity"]["active_runs"], 0);
}

#[tokio::test]
async fn root_serves_welcome_message() {
    let server = server_with(full_registry());

    let body: Value = server.get("/").await.json();
    assert!(body["message"].as_str().is_some_and(|msg| msg.contains("AgentFlow")));
}
