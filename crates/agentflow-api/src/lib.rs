//! HTTP surface for AgentFlow: run the loaded workflow, inspect its
//! definition, and render it as a diagram.

pub mod error;
pub mod routes;
pub mod state;

pub use routes::build_router;
pub use state::AppState;
