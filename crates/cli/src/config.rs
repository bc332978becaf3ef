//! Configuration loading from ferry.toml.

use std::collections::HashMap;
use std::path::Path;
use std::time::Duration;

use mcp::ServerConfig;
use runtime::{OllamaBackend, SessionConfig};
use serde::Deserialize;
use serde_json::Value;

pub const DEFAULT_CONFIG_FILE: &str = "ferry.toml";

const DEFAULT_SYSTEM_PROMPT: &str = "Follow system instructions and use the provided tools to assist the user. ALWAYS CALL CURRENT DATE TOOL FIRST";

/// Top-level configuration.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    /// System prompt placed at the start of every session.
    pub system_prompt: String,

    /// Model round trips allowed per user turn.
    pub max_iterations: usize,

    /// Chat model endpoint.
    pub model: ModelConfig,

    /// Tool server to spawn.
    pub server: ToolServerConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            system_prompt: DEFAULT_SYSTEM_PROMPT.to_string(),
            max_iterations: runtime::DEFAULT_MAX_ITERATIONS,
            model: ModelConfig::default(),
            server: ToolServerConfig::default(),
        }
    }
}

/// Chat model endpoint configuration.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ModelConfig {
    /// Ollama base URL.
    pub base_url: String,

    /// Model identifier.
    pub name: String,

    /// Request timeout in seconds.
    pub timeout_secs: u64,

    /// Model options passed through verbatim (temperature, num_ctx, ...).
    pub options: Option<Value>,
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            base_url: runtime::llm::DEFAULT_BASE_URL.to_string(),
            name: "llama3.1:8b".to_string(),
            timeout_secs: runtime::llm::DEFAULT_TIMEOUT.as_secs(),
            options: None,
        }
    }
}

/// Tool server configuration.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ToolServerConfig {
    /// Name used in logs.
    pub name: String,

    /// Command that starts the server.
    pub command: String,

    /// Arguments for the command.
    pub args: Vec<String>,

    /// Extra environment for the server process.
    pub env: HashMap<String, String>,

    /// Per-request timeout in seconds.
    pub timeout_secs: u64,
}

impl Default for ToolServerConfig {
    fn default() -> Self {
        Self {
            name: "tools".to_string(),
            command: "python".to_string(),
            args: vec!["ollama_mcp.py".to_string()],
            env: HashMap::new(),
            timeout_secs: mcp::DEFAULT_TIMEOUT.as_secs(),
        }
    }
}

impl Config {
    /// Load configuration from a TOML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path.as_ref())?;
        Self::parse(&content)
    }

    /// Load `path` if it exists, otherwise use defaults.
    pub fn load_or_default(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        if path.as_ref().exists() {
            Self::load(path)
        } else {
            Ok(Self::default())
        }
    }

    /// Parse configuration from TOML string.
    pub fn parse(toml: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(toml).map_err(|e| ConfigError::Parse(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Apply `FERRY_MODEL` and `FERRY_BASE_URL` from the environment.
    pub fn apply_env(&mut self) {
        self.apply_overrides(
            std::env::var("FERRY_MODEL").ok(),
            std::env::var("FERRY_BASE_URL").ok(),
        );
    }

    fn apply_overrides(&mut self, model: Option<String>, base_url: Option<String>) {
        if let Some(model) = model.filter(|m| !m.is_empty()) {
            self.model.name = model;
        }
        if let Some(base_url) = base_url.filter(|u| !u.is_empty()) {
            self.model.base_url = base_url;
        }
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.max_iterations == 0 {
            return Err(ConfigError::Invalid(
                "max_iterations must be at least 1".into(),
            ));
        }
        if self.server.command.is_empty() {
            return Err(ConfigError::Invalid("server.command is empty".into()));
        }
        Ok(())
    }

    /// Build the chat backend.
    pub fn backend(&self) -> runtime::Result<OllamaBackend> {
        let mut builder = OllamaBackend::builder(&self.model.name)
            .base_url(&self.model.base_url)
            .timeout(Duration::from_secs(self.model.timeout_secs));
        if let Some(options) = &self.model.options {
            builder = builder.options(options.clone());
        }
        builder.build()
    }

    /// Describe the tool server to spawn.
    pub fn server(&self) -> ServerConfig {
        let server = &self.server;
        ServerConfig {
            name: server.name.clone(),
            command: server.command.clone(),
            args: server.args.clone(),
            env: server.env.clone(),
            timeout: Duration::from_secs(server.timeout_secs),
        }
    }

    /// Session settings.
    pub fn session(&self) -> SessionConfig {
        SessionConfig::default()
            .with_system(self.system_prompt.clone())
            .with_max_iterations(self.max_iterations)
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read config: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to parse config: {0}")]
    Parse(String),

    #[error("invalid config: {0}")]
    Invalid(String),
}
