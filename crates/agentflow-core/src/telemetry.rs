//! Process-wide `tracing` subscriber setup shared by the server and the CLI.

use std::sync::OnceLock;

use tracing_subscriber::{EnvFilter, fmt};

use crate::{AgentFlowError, LoggingConfig};

static SUBSCRIBER_INSTALLED: OnceLock<()> = OnceLock::new();

/// Where formatted events are written.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogStream {
    #[default]
    Stdout,
    /// Keeps stdout clean for machine-readable command output.
    Stderr,
}

#[derive(Debug, Clone)]
pub struct TelemetryOptions {
    /// Explicit filter directive; wins over `RUST_LOG` and `level`.
    pub filter: Option<String>,
    pub level: String,
    pub stream: LogStream,
    pub with_ansi: bool,
}

impl Default for TelemetryOptions {
    fn default() -> Self {
        Self::from_logging(&LoggingConfig::default())
    }
}

impl TelemetryOptions {
    pub fn from_logging(config: &LoggingConfig) -> Self {
        Self {
            filter: None,
            level: config.level.clone(),
            stream: LogStream::Stdout,
            with_ansi: true,
        }
    }

    pub fn to_stderr(mut self) -> Self {
        self.stream = LogStream::Stderr;
        self
    }

    /// Filter directive actually applied: explicit filter, then `RUST_LOG`,
    /// then the configured level.
    pub fn resolve_filter(&self) -> String {
        self.filter
            .clone()
            .or_else(|| {
                std::env::var("RUST_LOG")
                    .ok()
                    .filter(|value| !value.trim().is_empty())
            })
            .unwrap_or_else(|| self.level.clone())
    }
}

/// Install the global subscriber. Later calls are no-ops.
pub fn init_telemetry(options: TelemetryOptions) -> Result<(), AgentFlowError> {
    if SUBSCRIBER_INSTALLED.get().is_some() {
        return Ok(());
    }

    let filter = EnvFilter::try_new(options.resolve_filter()).map_err(|err| {
        AgentFlowError::InvalidConfiguration(format!("invalid log filter: {err}"))
    })?;
    let builder = fmt::Subscriber::builder()
        .with_env_filter(filter)
        .with_ansi(options.with_ansi)
        .with_target(false);

    let installed = match options.stream {
        LogStream::Stdout => builder.try_init(),
        LogStream::Stderr => builder.with_writer(std::io::stderr).try_init(),
    };
    installed.map_err(|err| {
        AgentFlowError::InvalidConfiguration(format!("telemetry init failed: {err}"))
    })?;

    SUBSCRIBER_INSTALLED.get_or_init(|| ());
    Ok(())
}
