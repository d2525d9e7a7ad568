use std::{
    env, fs,
    path::{Path, PathBuf},
};

use serde::Deserialize;

use crate::{AgentFlowError, SecretValue, require_env};

const DEFAULT_CONFIG_PATH: &str = "agentflow.toml";
const CONFIG_PATH_ENV: &str = "AGENTFLOW_CONFIG";

/// Top-level application configuration.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub llm: LlmConfig,
    pub workflow: WorkflowConfig,
    pub server: ServerConfig,
    pub logging: LoggingConfig,
}

impl AppConfig {
    /// Resolve the configured LLM secret value (from environment only).
    pub fn llm_api_key(&self) -> Result<SecretValue, AgentFlowError> {
        require_env(&self.llm.api_key_env)
    }
}

/// Helper to load configuration with guard rails.
pub struct ConfigLoader;

impl ConfigLoader {
    /// Load configuration from a provided path or discoverable defaults.
    ///
    /// Resolution order:
    /// 1. Explicit `path` argument.
    /// 2. `AGENTFLOW_CONFIG` environment variable.
    /// 3. `agentflow.toml` in the current working directory, when present.
    /// 4. Built-in defaults.
    ///
    /// Environment overrides are applied last.
    pub fn load(path: Option<PathBuf>) -> Result<AppConfig, AgentFlowError> {
        let mut config = match resolve_path(path) {
            Some(candidate) => Self::from_file(&candidate)?,
            None => AppConfig::default(),
        };

        apply_env_overrides(&mut config)?;
        Self::validate(&config)?;
        Ok(config)
    }

    /// Parse a TOML document without consulting the environment.
    pub fn from_toml_str(raw: &str) -> Result<AppConfig, AgentFlowError> {
        let config: AppConfig = toml::from_str(raw)
            .map_err(|err| AgentFlowError::InvalidConfiguration(err.to_string()))?;
        Self::validate(&config)?;
        Ok(config)
    }

    fn from_file(path: &Path) -> Result<AppConfig, AgentFlowError> {
        let raw = fs::read_to_string(path)
            .map_err(|err| AgentFlowError::config_io(path.to_path_buf(), err))?;
        toml::from_str(&raw).map_err(|err| AgentFlowError::InvalidConfiguration(err.to_string()))
    }

    fn validate(config: &AppConfig) -> Result<(), AgentFlowError> {
        if config.llm.api_key_env.trim().is_empty() {
            return Err(AgentFlowError::InvalidConfiguration(
                "llm.api_key_env must reference an environment variable".into(),
            ));
        }
        if config.llm.model.trim().is_empty() {
            return Err(AgentFlowError::InvalidConfiguration(
                "llm.model must not be empty".into(),
            ));
        }
        if !(0.0..=2.0).contains(&config.llm.temperature) {
            return Err(AgentFlowError::InvalidConfiguration(format!(
                "llm.temperature must be within 0.0..=2.0, got {}",
                config.llm.temperature
            )));
        }
        if config.llm.max_tokens == 0 {
            return Err(AgentFlowError::InvalidConfiguration(
                "llm.max_tokens must be positive".into(),
            ));
        }
        if config.server.max_concurrent_runs == 0 {
            return Err(AgentFlowError::InvalidConfiguration(
                "server.max_concurrent_runs must be positive".into(),
            ));
        }
        Ok(())
    }
}

fn resolve_path(path: Option<PathBuf>) -> Option<PathBuf> {
    if let Some(path) = path {
        return Some(path);
    }

    if let Ok(from_env) = env::var(CONFIG_PATH_ENV) {
        if !from_env.trim().is_empty() {
            return Some(PathBuf::from(from_env));
        }
    }

    let default = Path::new(DEFAULT_CONFIG_PATH);
    default.exists().then(|| default.to_path_buf())
}

fn non_empty_env(var: &str) -> Option<String> {
    env::var(var)
        .ok()
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
}

fn apply_env_overrides(config: &mut AppConfig) -> Result<(), AgentFlowError> {
    if let Some(addr) = non_empty_env("AGENTFLOW_LISTEN_ADDR") {
        config.server.listen_addr = addr;
    }
    if let Some(path) = non_empty_env("AGENTFLOW_WORKFLOW_PATH") {
        config.workflow.path = PathBuf::from(path);
    }
    if let Some(model) = non_empty_env("AGENTFLOW_MODEL") {
        config.llm.model = model;
    }
    if let Some(limit) = non_empty_env("AGENTFLOW_MAX_CONCURRENT_RUNS") {
        config.server.max_concurrent_runs = limit.parse().map_err(|_| {
            AgentFlowError::InvalidConfiguration(format!(
                "AGENTFLOW_MAX_CONCURRENT_RUNS must be a positive integer, got '{limit}'"
            ))
        })?;
    }
    Ok(())
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LlmConfig {
    pub model: String,
    pub base_url: String,
    pub api_key_env: String,
    pub temperature: f64,
    pub max_tokens: u32,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            model: "gpt-4o-mini".to_string(),
            base_url: "https://api.openai.com/v1".to_string(),
            api_key_env: "OPENAI_API_KEY".to_string(),
            temperature: 0.7,
            max_tokens: 1024,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct WorkflowConfig {
    pub path: PathBuf,
}

impl Default for WorkflowConfig {
    fn default() -> Self {
        Self {
            path: PathBuf::from("config/workflow.json"),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub listen_addr: String,
    pub max_concurrent_runs: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            listen_addr: "127.0.0.1:8000".to_string(),
            max_concurrent_runs: 4,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
        }
    }
}
