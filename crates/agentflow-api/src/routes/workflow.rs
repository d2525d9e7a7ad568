use agentflow_core::{DiagramFormat, WorkflowDefinition, WorkflowResult};
use axum::{
    Json, Router,
    extract::{Query, State},
    http::StatusCode,
    routing::{get, post},
};
use serde::{Deserialize, Serialize};
use tracing::{error, info};

use crate::{error::AppError, state::AppState};

#[derive(Debug, Deserialize)]
pub struct RunWorkflowRequest {
    pub query: String,
}

#[derive(Debug, Default, Deserialize)]
pub struct DiagramParams {
    pub format: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct DiagramResponse {
    pub format: &'static str,
    pub diagram: String,
}

pub fn workflow_router() -> Router<AppState> {
    Router::new()
        .route("/run-workflow", post(run_workflow))
        .route("/get-workflow-config", get(workflow_config))
        .route("/workflow-diagram", get(workflow_diagram))
}

async fn run_workflow(
    State(state): State<AppState>,
    Json(request): Json<RunWorkflowRequest>,
) -> Result<Json<WorkflowResult>, AppError> {
    let _permit = state.acquire_run_permit()?;
    let orchestrator = state.orchestrator();

    info!(query_len = request.query.len(), "workflow run requested");
    match orchestrator.run_workflow(&request.query).await {
        Ok(result) => Ok(Json(result)),
        Err(err) => {
            error!(error = %err, "workflow run failed");
            Err(AppError::from(err))
        }
    }
}

async fn workflow_config(State(state): State<AppState>) -> Json<WorkflowDefinition> {
    Json(state.orchestrator().definition().clone())
}

async fn workflow_diagram(
    State(state): State<AppState>,
    Query(params): Query<DiagramParams>,
) -> Result<Json<DiagramResponse>, AppError> {
    let format = match params.format.as_deref() {
        None => DiagramFormat::default(),
        Some(raw) => raw
            .parse::<DiagramFormat>()
            .map_err(|err| AppError::new(StatusCode::BAD_REQUEST, err))?,
    };

    let orchestrator = state.orchestrator();
    Ok(Json(DiagramResponse {
        format: format.label(),
        diagram: format.render(orchestrator.definition()),
    }))
}
