//! Configuration loading, validation, and management for GoalFlow.
//!
//! Loads configuration from `~/.goalflow/config.toml` (or an explicit path)
//! with environment variable overrides. Validates all settings at startup.
//! The resulting [`AppConfig`] is passed explicitly into component
//! constructors; nothing downstream reads the environment.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::{Path, PathBuf};

/// The root configuration structure.
///
/// Maps directly to `~/.goalflow/config.toml`.
#[derive(Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// API key (can be overridden per-provider)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,

    /// Default LLM provider
    #[serde(default = "default_provider")]
    pub default_provider: String,

    /// Default model
    #[serde(default = "default_model")]
    pub default_model: String,

    /// Default temperature
    #[serde(default = "default_temperature")]
    pub default_temperature: f32,

    /// Default max tokens per LLM response
    #[serde(default = "default_max_tokens")]
    pub default_max_tokens: u32,

    /// Timeout for a single LLM request
    #[serde(default = "default_llm_timeout")]
    pub llm_timeout_secs: u64,

    /// Tool backend configuration
    #[serde(default)]
    pub backend: BackendConfig,

    /// Gateway configuration
    #[serde(default)]
    pub gateway: GatewayConfig,

    /// Pipeline configuration
    #[serde(default)]
    pub pipeline: PipelineConfig,

    /// Provider-specific configurations
    #[serde(default)]
    pub providers: HashMap<String, ProviderConfig>,
}

fn default_provider() -> String {
    "gemini".into()
}
fn default_model() -> String {
    "gemini-2.0-flash".into()
}
fn default_temperature() -> f32 {
    0.2
}
fn default_max_tokens() -> u32 {
    2048
}
fn default_llm_timeout() -> u64 {
    120
}

/// Redact a secret string for Debug output.
fn redact(s: &Option<String>) -> &'static str {
    match s {
        Some(_) => "[REDACTED]",
        None => "None",
    }
}

impl std::fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppConfig")
            .field("api_key", &redact(&self.api_key))
            .field("default_provider", &self.default_provider)
            .field("default_model", &self.default_model)
            .field("default_temperature", &self.default_temperature)
            .field("default_max_tokens", &self.default_max_tokens)
            .field("llm_timeout_secs", &self.llm_timeout_secs)
            .field("backend", &self.backend)
            .field("gateway", &self.gateway)
            .field("pipeline", &self.pipeline)
            .field("providers", &self.providers)
            .finish()
    }
}

impl std::fmt::Debug for ProviderConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProviderConfig")
            .field("api_key", &redact(&self.api_key))
            .field("api_url", &self.api_url)
            .field("default_model", &self.default_model)
            .finish()
    }
}

impl std::fmt::Debug for GatewayConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GatewayConfig")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("shared_secret", &redact(&self.shared_secret))
            .finish()
    }
}

/// Where the reference tools send their requests.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BackendConfig {
    #[serde(default = "default_backend_url")]
    pub base_url: String,

    /// Bound on every remote tool invocation
    #[serde(default = "default_backend_timeout")]
    pub timeout_secs: u64,

    /// Sent as the `X-Service-Name` header
    #[serde(default = "default_service_name")]
    pub service_name: String,
}

fn default_backend_url() -> String {
    "http://localhost:5001/demo".into()
}
fn default_backend_timeout() -> u64 {
    10
}
fn default_service_name() -> String {
    "goalflow-agent".into()
}

impl Default for BackendConfig {
    fn default() -> Self {
        Self {
            base_url: default_backend_url(),
            timeout_secs: default_backend_timeout(),
            service_name: default_service_name(),
        }
    }
}

#[derive(Clone, Serialize, Deserialize)]
pub struct GatewayConfig {
    #[serde(default = "default_port")]
    pub port: u16,

    #[serde(default = "default_host")]
    pub host: String,

    /// HMAC-SHA256 secret for `X-Signature` validation. Unset = no validation.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub shared_secret: Option<String>,
}

fn default_port() -> u16 {
    5080
}
fn default_host() -> String {
    "127.0.0.1".into()
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            port: default_port(),
            host: default_host(),
            shared_secret: None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelineConfig {
    /// Candidate goals offered to the selector for every payload
    #[serde(default = "default_goals")]
    pub goals: Vec<String>,

    /// Upper bound on payloads processed at the same time
    #[serde(default = "default_max_concurrent_runs")]
    pub max_concurrent_runs: usize,
}

fn default_goals() -> Vec<String> {
    vec![
        "Monitor all air track states".into(),
        "Trigger DSS for target X".into(),
        "Check air tracks and then run DSS".into(),
        "Monitor tracks and notify me".into(),
    ]
}
fn default_max_concurrent_runs() -> usize {
    4
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            goals: default_goals(),
            max_concurrent_runs: default_max_concurrent_runs(),
        }
    }
}

#[derive(Clone, Default, Serialize, Deserialize)]
pub struct ProviderConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_url: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_model: Option<String>,
}

impl AppConfig {
    /// Load configuration from `path`, or from the default path
    /// (~/.goalflow/config.toml), then apply environment overrides:
    /// - `GOALFLOW_API_KEY` (highest priority), `GEMINI_API_KEY`, `OPENAI_API_KEY`
    /// - `GOALFLOW_PROVIDER`, `GOALFLOW_MODEL`
    /// - `BACKEND_BASE_URL`
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let default_path = Self::config_dir().join("config.toml");
        let mut config = Self::load_from(path.unwrap_or(&default_path))?;
        config.apply_env_overrides(|key| std::env::var(key).ok());
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a specific file path.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            tracing::info!("No config file found at {}, using defaults", path.display());
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::ReadError {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;

        let config: Self = toml::from_str(&content).map_err(|e| ConfigError::ParseError {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;

        config.validate()?;
        Ok(config)
    }

    /// Apply overrides from an environment lookup.
    pub fn apply_env_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(key) = lookup("GOALFLOW_API_KEY") {
            self.api_key = Some(key);
        } else if self.api_key.is_none() {
            self.api_key = lookup("GEMINI_API_KEY").or_else(|| lookup("OPENAI_API_KEY"));
        }

        if let Some(provider) = lookup("GOALFLOW_PROVIDER") {
            self.default_provider = provider;
        }

        if let Some(model) = lookup("GOALFLOW_MODEL") {
            self.default_model = model;
        }

        if let Some(url) = lookup("BACKEND_BASE_URL") {
            self.backend.base_url = url;
        }
    }

    /// Get the configuration directory path.
    pub fn config_dir() -> PathBuf {
        dirs_home().join(".goalflow")
    }

    /// Validate the configuration.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.default_temperature < 0.0 || self.default_temperature > 2.0 {
            return Err(ConfigError::ValidationError(
                "default_temperature must be between 0.0 and 2.0".into(),
            ));
        }

        if self.llm_timeout_secs == 0 {
            return Err(ConfigError::ValidationError(
                "llm_timeout_secs must be > 0".into(),
            ));
        }

        if self.backend.timeout_secs == 0 {
            return Err(ConfigError::ValidationError(
                "backend.timeout_secs must be > 0".into(),
            ));
        }

        if self.pipeline.goals.is_empty() {
            return Err(ConfigError::ValidationError(
                "pipeline.goals must contain at least one goal".into(),
            ));
        }

        if self.pipeline.max_concurrent_runs == 0 {
            return Err(ConfigError::ValidationError(
                "pipeline.max_concurrent_runs must be > 0".into(),
            ));
        }

        Ok(())
    }

    /// Check if an API key is available (from config or environment).
    pub fn has_api_key(&self) -> bool {
        self.api_key.is_some()
            || self
                .providers
                .get(&self.default_provider)
                .is_some_and(|p| p.api_key.is_some())
    }

    /// Generate a default config TOML string (for `onboard` command).
    pub fn default_toml() -> String {
        let config = Self::default();
        toml::to_string_pretty(&config).unwrap_or_default()
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            default_provider: default_provider(),
            default_model: default_model(),
            default_temperature: default_temperature(),
            default_max_tokens: default_max_tokens(),
            llm_timeout_secs: default_llm_timeout(),
            backend: BackendConfig::default(),
            gateway: GatewayConfig::default(),
            pipeline: PipelineConfig::default(),
            providers: HashMap::new(),
        }
    }
}

/// Get the user's home directory.
fn dirs_home() -> PathBuf {
    #[cfg(target_os = "windows")]
    {
        std::env::var("USERPROFILE")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("C:\\Users\\Default"))
    }
    #[cfg(not(target_os = "windows"))]
    {
        std::env::var("HOME")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("/tmp"))
    }
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file at {path}: {reason}")]
    ReadError { path: PathBuf, reason: String },

    #[error("Failed to parse config file at {path}: {reason}")]
    ParseError { path: PathBuf, reason: String },

    #[error("Configuration validation failed: {0}")]
    ValidationError(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    fn env(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn default_config_is_valid() {
        let config = AppConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.default_provider, "gemini");
        assert_eq!(config.backend.timeout_secs, 10);
        assert_eq!(config.pipeline.goals.len(), 4);
        assert_eq!(config.pipeline.goals[0], "Monitor all air track states");
    }

    #[test]
    fn config_roundtrip_toml() {
        let config = AppConfig::default();
        let toml_str = toml::to_string_pretty(&config).unwrap();
        let parsed: AppConfig = toml::from_str(&toml_str).unwrap();
        assert_eq!(parsed.default_provider, config.default_provider);
        assert_eq!(parsed.gateway.port, config.gateway.port);
        assert_eq!(parsed.pipeline.goals, config.pipeline.goals);
    }

    #[test]
    fn invalid_temperature_rejected() {
        let config = AppConfig {
            default_temperature: 5.0,
            ..AppConfig::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn empty_goals_rejected() {
        let mut config = AppConfig::default();
        config.pipeline.goals.clear();
        assert!(config.validate().is_err());
    }

    #[test]
    fn zero_backend_timeout_rejected() {
        let mut config = AppConfig::default();
        config.backend.timeout_secs = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn missing_config_file_returns_defaults() {
        let result = AppConfig::load_from(Path::new("/nonexistent/config.toml"));
        assert!(result.is_ok());
        assert_eq!(result.unwrap().default_provider, "gemini");
    }

    #[test]
    fn loads_partial_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(
            &path,
            r#"
default_provider = "openai"
default_model = "gpt-4o-mini"

[backend]
base_url = "http://backend.local/api"
timeout_secs = 3

[pipeline]
goals = ["Monitor tracks and notify me"]

[providers.openai]
api_key = "sk-test"
"#,
        )
        .unwrap();

        let config = AppConfig::load_from(&path).unwrap();
        assert_eq!(config.default_provider, "openai");
        assert_eq!(config.backend.base_url, "http://backend.local/api");
        assert_eq!(config.backend.timeout_secs, 3);
        assert_eq!(config.backend.service_name, "goalflow-agent");
        assert_eq!(config.pipeline.goals, vec!["Monitor tracks and notify me"]);
        assert_eq!(config.pipeline.max_concurrent_runs, 4);
        assert!(config.has_api_key());
    }

    #[test]
    fn unparseable_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "default_provider = [").unwrap();
        assert!(matches!(
            AppConfig::load_from(&path),
            Err(ConfigError::ParseError { .. })
        ));
    }

    #[test]
    fn env_overrides_apply() {
        let mut config = AppConfig::default();
        config.apply_env_overrides(env(&[
            ("GEMINI_API_KEY", "gm-key"),
            ("GOALFLOW_MODEL", "gemini-1.5-pro"),
            ("BACKEND_BASE_URL", "http://override/demo"),
        ]));
        assert_eq!(config.api_key.as_deref(), Some("gm-key"));
        assert_eq!(config.default_model, "gemini-1.5-pro");
        assert_eq!(config.backend.base_url, "http://override/demo");
    }

    #[test]
    fn goalflow_key_beats_file_key() {
        let mut config = AppConfig {
            api_key: Some("from-file".into()),
            ..AppConfig::default()
        };
        config.apply_env_overrides(env(&[("GEMINI_API_KEY", "gm-key")]));
        assert_eq!(config.api_key.as_deref(), Some("from-file"));

        config.apply_env_overrides(env(&[("GOALFLOW_API_KEY", "gf-key")]));
        assert_eq!(config.api_key.as_deref(), Some("gf-key"));
    }

    #[test]
    fn debug_redacts_secrets() {
        let mut config = AppConfig {
            api_key: Some("super-secret".into()),
            ..AppConfig::default()
        };
        config.gateway.shared_secret = Some("hmac-secret".into());
        let debug = format!("{config:?}");
        assert!(!debug.contains("super-secret"));
        assert!(!debug.contains("hmac-secret"));
        assert!(debug.contains("[REDACTED]"));
    }

    #[test]
    fn default_toml_generation() {
        let toml_str = AppConfig::default_toml();
        assert!(toml_str.contains("gemini"));
        assert!(toml_str.contains("Monitor all air track states"));
    }
}
