mod health;
mod workflow;

use axum::{Json, Router, routing::get};
use health::health_router;
use serde::Serialize;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use workflow::workflow_router;

use crate::state::AppState;

#[derive(Serialize)]
struct WelcomeResponse {
    message: &'static str,
}

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/", get(welcome))
        .nest("/health", health_router())
        .merge(workflow_router())
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

async fn welcome() -> Json<WelcomeResponse> {
    Json(WelcomeResponse {
        message: "Welcome to the AgentFlow workflow orchestrator API",
    })
}
