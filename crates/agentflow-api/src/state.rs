use std::sync::Arc;

use agentflow_core::Orchestrator;
use axum::http::StatusCode;
use serde::Serialize;
use tokio::sync::{OwnedSemaphorePermit, Semaphore, TryAcquireError};

use crate::error::AppError;

/// Shared handler state. The orchestrator is read-only after startup; each
/// request builds its own execution context.
#[derive(Clone)]
pub struct AppState {
    orchestrator: Arc<Orchestrator>,
    run_permits: Arc<Semaphore>,
    max_runs: usize,
}

impl AppState {
    pub fn new(orchestrator: Orchestrator, max_concurrent_runs: usize) -> Self {
        let max_runs = max_concurrent_runs.max(1);
        Self {
            orchestrator: Arc::new(orchestrator),
            run_permits: Arc::new(Semaphore::new(max_runs)),
            max_runs,
        }
    }

    pub fn orchestrator(&self) -> Arc<Orchestrator> {
        self.orchestrator.clone()
    }

    /// Reserve a run slot without waiting; excess requests are rejected.
    pub fn acquire_run_permit(&self) -> Result<OwnedSemaphorePermit, AppError> {
        match self.run_permits.clone().try_acquire_owned() {
            Ok(permit) => Ok(permit),
            Err(TryAcquireError::NoPermits) => Err(AppError::new(
                StatusCode::TOO_MANY_REQUESTS,
                "workflow capacity reached; retry once a run finishes",
            )),
            Err(TryAcquireError::Closed) => Err(AppError::new(
                StatusCode::SERVICE_UNAVAILABLE,
                "workflow executor unavailable",
            )),
        }
    }

    pub fn capacity(&self) -> CapacitySnapshot {
        let available = self.run_permits.available_permits();
        CapacitySnapshot {
            max_concurrent_runs: self.max_runs,
            available_runs: available,
            active_runs: self.max_runs.saturating_sub(available),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct CapacitySnapshot {
    pub max_concurrent_runs: usize,
    pub available_runs: usize,
    pub active_runs: usize,
}
