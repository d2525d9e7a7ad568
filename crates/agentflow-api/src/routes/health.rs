use axum::{Json, Router, extract::State, http::StatusCode, routing::get};
use serde::Serialize;

use crate::state::{AppState, CapacitySnapshot};

#[derive(Serialize)]
struct HealthResponse {
    status: &'static str,
    workflow: String,
    steps: usize,
    agents: Vec<String>,
    capacity: CapacitySnapshot,
}

pub fn health_router() -> Router<AppState> {
    Router::new()
        .route("/", get(live))
        .route("/ready", get(ready))
}

async fn live(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(build_response("ok", &state))
}

async fn ready(State(state): State<AppState>) -> (StatusCode, Json<HealthResponse>) {
    let capacity = state.capacity();
    if capacity.available_runs == 0 {
        return (
            StatusCode::SERVICE_UNAVAILABLE,
            Json(build_response("degraded", &state)),
        );
    }

    (StatusCode::OK, Json(build_response("ok", &state)))
}

fn build_response(status: &'static str, state: &AppState) -> HealthResponse {
    let orchestrator = state.orchestrator();
    HealthResponse {
        status,
        workflow: orchestrator.definition().name.clone(),
        steps: orchestrator.definition().steps.len(),
        agents: orchestrator
            .registry()
            .names()
            .into_iter()
            .map(str::to_string)
            .collect(),
        capacity: state.capacity(),
    }
}
