use once_cell::sync::OnceCell;
use opentelemetry::metrics::{Counter, Histogram, Meter};
use opentelemetry::{KeyValue, global};
use tracing::info;

struct StepMetrics {
    steps: Counter<u64>,
    duration_ms: Histogram<f64>,
    skipped: Counter<u64>,
}

static METRICS: OnceCell<StepMetrics> = OnceCell::new();

fn handles() -> &'static StepMetrics {
    METRICS.get_or_init(|| {
        let meter: Meter = global::meter("agentflow.orchestrator");
        StepMetrics {
            steps: meter
                .u64_counter("agentflow_steps_total")
                .with_description("Executed workflow steps by agent and status")
                .init(),
            duration_ms: meter
                .f64_histogram("agentflow_step_duration_ms")
                .with_description("Agent runtime per workflow step in milliseconds")
                .init(),
            skipped: meter
                .u64_counter("agentflow_steps_skipped_total")
                .with_description("Steps skipped because their agent is not registered")
                .init(),
        }
    })
}

/// Hint to operators that OTEL metrics export can be configured externally.
pub fn init_metrics_from_env(service_name: &str) {
    if std::env::var("AGENTFLOW_OTEL_METRICS_ENDPOINT").is_ok() {
        info!(
            target = "telemetry",
            "AGENTFLOW_OTEL_METRICS_ENDPOINT detected for {service_name}. Configure an OTLP meter provider in your deployment to export step metrics."
        );
    }
}

/// Record one executed step (no-op if no provider installed).
pub fn record_step(agent: &str, status: &str, duration_ms: u64) {
    let metrics = handles();
    let attrs = [
        KeyValue::new("agent", agent.to_string()),
        KeyValue::new("status", status.to_string()),
    ];

    metrics.steps.add(1, &attrs);
    metrics.duration_ms.record(duration_ms as f64, &attrs);
}

pub fn record_skipped_step(agent: &str) {
    handles()
        .skipped
        .add(1, &[KeyValue::new("agent", agent.to_string())]);
}
