//! Assistant configuration.
//!
//! One YAML file describes how to launch the tool server, which model
//! endpoint to talk to, and the session deadlines. The API key itself stays
//! out of the file — only the name of the environment variable holding it is
//! configured.

use std::path::Path;
use std::time::Duration;

use serde::Deserialize;
use thiserror::Error;

use crate::mcp::session::SessionTimeouts;
use crate::mcp::types::ServerConfig;

/// Configuration loading and validation errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file '{path}': {reason}")]
    Unreadable { path: String, reason: String },

    #[error("failed to parse config file '{path}': {reason}")]
    Invalid { path: String, reason: String },

    #[error("environment variable '{var}' is not set (it should hold the model API key)")]
    MissingApiKey { var: String },
}

/// Model endpoint settings.
#[derive(Debug, Clone, Deserialize)]
pub struct ModelConfig {
    #[serde(default = "default_base_url")]
    pub base_url: String,
    #[serde(default = "default_model_name")]
    pub model_name: String,
    /// Name of the environment variable holding the API key.
    #[serde(default = "default_api_key_env")]
    pub api_key_env: String,
}

fn default_base_url() -> String {
    "https://generativelanguage.googleapis.com".to_string()
}

fn default_model_name() -> String {
    "gemini-1.5-flash".to_string()
}

fn default_api_key_env() -> String {
    "GEMINI_API_KEY".to_string()
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            model_name: default_model_name(),
            api_key_env: default_api_key_env(),
        }
    }
}

/// Session deadlines, in milliseconds.
#[derive(Debug, Clone, Copy, Deserialize)]
pub struct TimeoutConfig {
    #[serde(default = "default_init_ms")]
    pub init_ms: u64,
    #[serde(default = "default_call_ms")]
    pub call_ms: u64,
    #[serde(default = "default_shutdown_ms")]
    pub shutdown_ms: u64,
}

fn default_init_ms() -> u64 {
    10_000
}

fn default_call_ms() -> u64 {
    30_000
}

fn default_shutdown_ms() -> u64 {
    5_000
}

impl Default for TimeoutConfig {
    fn default() -> Self {
        Self {
            init_ms: default_init_ms(),
            call_ms: default_call_ms(),
            shutdown_ms: default_shutdown_ms(),
        }
    }
}

impl From<TimeoutConfig> for SessionTimeouts {
    fn from(cfg: TimeoutConfig) -> Self {
        Self {
            init: Duration::from_millis(cfg.init_ms),
            call: Duration::from_millis(cfg.call_ms),
            shutdown: Duration::from_millis(cfg.shutdown_ms),
        }
    }
}

/// Top-level assistant configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct AssistantConfig {
    /// How to launch the tool-server child process.
    pub server: ServerConfig,
    #[serde(default)]
    pub model: ModelConfig,
    #[serde(default)]
    pub timeouts: TimeoutConfig,
}

impl AssistantConfig {
    /// Load and parse the YAML config file.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path).map_err(|e| ConfigError::Unreadable {
            path: path.display().to_string(),
            reason: e.to_string(),
        })?;

        serde_yaml::from_str(&text).map_err(|e| ConfigError::Invalid {
            path: path.display().to_string(),
            reason: e.to_string(),
        })
    }

    /// Resolve the model API key from the configured environment variable.
    pub fn resolve_api_key(&self) -> Result<String, ConfigError> {
        std::env::var(&self.model.api_key_env)
            .ok()
            .filter(|v| !v.is_empty())
            .ok_or_else(|| ConfigError::MissingApiKey {
                var: self.model.api_key_env.clone(),
            })
    }
}

// ─── Tests ───────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn write_config(yaml: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(yaml.as_bytes()).unwrap();
        file
    }

    #[test]
    fn minimal_config_fills_defaults() {
        let file = write_config(
            r#"
server:
  command: python
  args: ["server.py"]
"#,
        );
        let cfg = AssistantConfig::load(file.path()).unwrap();
        assert_eq!(cfg.server.command, "python");
        assert_eq!(cfg.server.args, vec!["server.py"]);
        assert_eq!(cfg.model.model_name, "gemini-1.5-flash");
        assert_eq!(cfg.model.api_key_env, "GEMINI_API_KEY");
        assert_eq!(cfg.timeouts.call_ms, 30_000);
    }

    #[test]
    fn full_config_overrides_defaults() {
        let file = write_config(
            r#"
server:
  command: ./target/debug/sams-tools
  cwd: /opt/sams
model:
  base_url: http://localhost:9999
  model_name: gemini-custom
  api_key_env: SAMS_MODEL_KEY
timeouts:
  init_ms: 2000
  call_ms: 5000
  shutdown_ms: 1000
"#,
        );
        let cfg = AssistantConfig::load(file.path()).unwrap();
        assert_eq!(cfg.server.cwd.as_deref(), Some("/opt/sams"));
        assert_eq!(cfg.model.base_url, "http://localhost:9999");
        assert_eq!(cfg.model.api_key_env, "SAMS_MODEL_KEY");

        let timeouts: SessionTimeouts = cfg.timeouts.into();
        assert_eq!(timeouts.init, Duration::from_millis(2000));
        assert_eq!(timeouts.call, Duration::from_millis(5000));
    }

    #[test]
    fn missing_file_is_reported() {
        let err = AssistantConfig::load(Path::new("/no/such/config.yaml")).unwrap_err();
        assert!(matches!(err, ConfigError::Unreadable { .. }));
    }

    #[test]
    fn config_without_server_section_is_invalid() {
        let file = write_config("model:\n  model_name: g\n");
        let err = AssistantConfig::load(file.path()).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { .. }));
    }

    #[test]
    fn resolve_api_key_reads_configured_variable() {
        let file = write_config(
            r#"
server:
  command: python
model:
  api_key_env: SAMS_TEST_KEY_VAR
"#,
        );
        let cfg = AssistantConfig::load(file.path()).unwrap();

        std::env::remove_var("SAMS_TEST_KEY_VAR");
        assert!(matches!(
            cfg.resolve_api_key().unwrap_err(),
            ConfigError::MissingApiKey { var } if var == "SAMS_TEST_KEY_VAR"
        ));

        std::env::set_var("SAMS_TEST_KEY_VAR", "secret");
        assert_eq!(cfg.resolve_api_key().unwrap(), "secret");
        std::env::remove_var("SAMS_TEST_KEY_VAR");
    }
}
