use std::net::SocketAddr;

use agentflow_agents::registry_from_config;
use agentflow_api::{AppState, build_router};
use agentflow_core::{ConfigLoader, Orchestrator, TelemetryOptions, init_telemetry, metrics};
use anyhow::{Context, Result};
use tokio::{net::TcpListener, signal};
use tracing::{error, info};

#[tokio::main]
async fn main() -> Result<()> {
    let config = ConfigLoader::load(None)?;
    init_telemetry(TelemetryOptions::from_logging(&config.logging))?;
    metrics::init_metrics_from_env("agentflow-api");

    let registry = registry_from_config(&config).inspect_err(|err| {
        error!(error = %err, "cannot start without an LLM credential");
    })?;
    let orchestrator = Orchestrator::from_path(&config.workflow.path, registry)
        .with_context(|| {
            format!(
                "failed to load workflow definition from {}",
                config.workflow.path.display()
            )
        })?;

    info!(
        workflow = %orchestrator.definition().name,
        steps = orchestrator.definition().steps.len(),
        "workflow definition loaded"
    );

    let addr: SocketAddr = config
        .server
        .listen_addr
        .parse()
        .with_context(|| format!("invalid listen address '{}'", config.server.listen_addr))?;

    let state = AppState::new(orchestrator, config.server.max_concurrent_runs);
    let app = build_router(state);

    info!("AgentFlow API listening on {}", addr);

    let listener = TcpListener::bind(addr).await?;
    axum::serve(listener, app.into_make_service())
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(err) = signal::ctrl_c().await {
            error!(error = %err, "failed to listen for Ctrl+C");
            std::future::pending::<()>().await;
        }
    };
    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(err) => {
                error!(error = %err, "failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };
    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    info!("shutdown signal received, stopping server");
}
