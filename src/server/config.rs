//! Configuration loading for medassistd and the medassist CLI.
//!
//! Configuration is loaded from TOML files with the following resolution order:
//! 1. `--config <path>` (CLI flag)
//! 2. `~/.medassist/config.toml` (user)
//! 3. `/etc/medassist/config.toml` (system)

use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};

use crate::diagnosis::GateConfig;
use crate::model::ArtifactPaths;
use crate::{MedAssistError, Result};

/// Service configuration.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub artifacts: ArtifactPaths,
    #[serde(default)]
    pub gate: GateConfig,
    #[serde(default)]
    pub triage: TriageConfig,
}

/// Server network configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    /// Address to bind to (default: 127.0.0.1:9750).
    #[serde(default = "default_address")]
    pub address: String,
    #[serde(default)]
    pub limits: LimitsConfig,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            address: default_address(),
            limits: LimitsConfig::default(),
        }
    }
}

fn default_address() -> String {
    "127.0.0.1:9750".to_string()
}

/// Resource limits.
#[derive(Debug, Clone, Deserialize)]
pub struct LimitsConfig {
    /// Maximum concurrent requests (default: 100).
    #[serde(default = "default_max_concurrent")]
    pub max_concurrent_requests: usize,
    /// Request timeout in seconds (default: 30).
    #[serde(default = "default_timeout")]
    pub request_timeout_secs: u64,
    /// Longest accepted request line in bytes (default: 65536).
    #[serde(default = "default_max_request_bytes")]
    pub max_request_bytes: usize,
}

impl Default for LimitsConfig {
    fn default() -> Self {
        Self {
            max_concurrent_requests: default_max_concurrent(),
            request_timeout_secs: default_timeout(),
            max_request_bytes: default_max_request_bytes(),
        }
    }
}

fn default_max_concurrent() -> usize {
    100
}

fn default_timeout() -> u64 {
    30
}

fn default_max_request_bytes() -> usize {
    64 * 1024
}

/// Emergency triage settings.
#[derive(Debug, Clone, Deserialize)]
pub struct TriageConfig {
    /// Helpline attached to every emergency reply.
    #[serde(default = "default_helpline")]
    pub helpline: String,
}

impl Default for TriageConfig {
    fn default() -> Self {
        Self {
            helpline: default_helpline(),
        }
    }
}

fn default_helpline() -> String {
    "911 or local equivalent 1-800-HEALTH".to_string()
}

impl Config {
    /// Load configuration from the standard locations.
    ///
    /// Resolution order:
    /// 1. Explicit path (if provided)
    /// 2. `~/.medassist/config.toml`
    /// 3. `/etc/medassist/config.toml`
    pub fn load(explicit_path: Option<&Path>) -> Result<Self> {
        let path = Self::resolve_config_path(explicit_path)?.ok_or_else(|| {
            MedAssistError::Configuration(
                "No config file found. Create ~/.medassist/config.toml or /etc/medassist/config.toml"
                    .to_string(),
            )
        })?;
        Self::load_from_file(&path)
    }

    /// Like [`load`](Self::load), but falls back to defaults when no file exists.
    ///
    /// An explicit path that does not exist is still an error.
    pub fn load_or_default(explicit_path: Option<&Path>) -> Result<Self> {
        match Self::resolve_config_path(explicit_path)? {
            Some(path) => Self::load_from_file(&path),
            None => Ok(Self::default()),
        }
    }

    fn load_from_file(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path).map_err(|e| {
            MedAssistError::Configuration(format!("Failed to read config file {path:?}: {e}"))
        })?;
        let config: Config = toml::from_str(&content).map_err(|e| {
            MedAssistError::Configuration(format!("Failed to parse config file {path:?}: {e}"))
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Reject values the service cannot run with.
    pub fn validate(&self) -> Result<()> {
        self.gate.validate()?;
        if self.server.limits.max_concurrent_requests == 0 {
            return Err(MedAssistError::Configuration(
                "server.limits.max_concurrent_requests must be at least 1".to_string(),
            ));
        }
        if self.server.limits.request_timeout_secs == 0 {
            return Err(MedAssistError::Configuration(
                "server.limits.request_timeout_secs must be at least 1".to_string(),
            ));
        }
        Ok(())
    }

    /// Resolve the config file path, `None` when no candidate exists.
    fn resolve_config_path(explicit: Option<&Path>) -> Result<Option<PathBuf>> {
        if let Some(path) = explicit {
            if path.exists() {
                return Ok(Some(path.to_path_buf()));
            }
            return Err(MedAssistError::Configuration(format!(
                "Config file not found: {path:?}"
            )));
        }

        // User config
        if let Some(home) = dirs::home_dir() {
            let user_config = home.join(".medassist").join("config.toml");
            if user_config.exists() {
                return Ok(Some(user_config));
            }
        }

        // System config
        let system_config = PathBuf::from("/etc/medassist/config.toml");
        if system_config.exists() {
            return Ok(Some(system_config));
        }

        Ok(None)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_has_expected_values() {
        let config = Config::default();
        assert_eq!(config.server.address, "127.0.0.1:9750");
        assert_eq!(config.server.limits.max_concurrent_requests, 100);
        assert_eq!(config.server.limits.request_timeout_secs, 30);
        assert_eq!(config.server.limits.max_request_bytes, 65536);
        assert_eq!(config.gate.min_confidence, 0.12);
        assert_eq!(config.gate.oov_max_tokens, 2);
        assert!(config.triage.helpline.contains("911"));
    }

    #[test]
    fn parse_minimal_config() {
        let toml = r#"
            [server]
            address = "0.0.0.0:9750"
        "#;
        let config: Config = toml::from_str(toml).unwrap();
        assert_eq!(config.server.address, "0.0.0.0:9750");
        // Defaults preserved
        assert_eq!(config.server.limits.max_concurrent_requests, 100);
        assert_eq!(config.gate, GateConfig::default());
    }

    #[test]
    fn parse_full_config() {
        let toml = r#"
            [server]
            address = "127.0.0.1:9750"

            [server.limits]
            max_concurrent_requests = 8
            request_timeout_secs = 5
            max_request_bytes = 1024

            [artifacts]
            model = "/opt/medassist/model.json"
            disease_info = "/opt/medassist/disease_info.json"

            [gate]
            min_confidence = 0.2
            oov_max_tokens = 3

            [triage]
            helpline = "112"
        "#;
        let config: Config = toml::from_str(toml).unwrap();
        assert_eq!(config.server.limits.max_concurrent_requests, 8);
        assert_eq!(config.server.limits.request_timeout_secs, 5);
        assert_eq!(config.server.limits.max_request_bytes, 1024);
        assert_eq!(
            config.artifacts.model,
            PathBuf::from("/opt/medassist/model.json")
        );
        assert_eq!(
            config.artifacts.disease_info,
            PathBuf::from("/opt/medassist/disease_info.json")
        );
        assert_eq!(config.gate.min_confidence, 0.2);
        assert_eq!(config.gate.oov_max_tokens, 3);
        assert_eq!(config.triage.helpline, "112");
    }

    #[test]
    fn partial_gate_section_keeps_other_default() {
        let toml = r#"
            [gate]
            oov_max_tokens = 4
        "#;
        let config: Config = toml::from_str(toml).unwrap();
        assert_eq!(config.gate.oov_max_tokens, 4);
        assert_eq!(config.gate.min_confidence, 0.12);
    }

    #[test]
    fn config_not_found_returns_error() {
        let result = Config::load(Some(Path::new("/nonexistent/config.toml")));
        let err = result.unwrap_err().to_string();
        assert!(err.contains("Config file not found"));

        let result = Config::load_or_default(Some(Path::new("/nonexistent/config.toml")));
        assert!(result.is_err());
    }

    #[test]
    fn invalid_threshold_fails_validation() {
        let toml = r#"
            [gate]
            min_confidence = -0.5
        "#;
        let config: Config = toml::from_str(toml).unwrap();
        assert!(config.validate().is_err());
    }

    #[test]
    fn zero_concurrency_fails_validation() {
        let mut config = Config::default();
        config.server.limits.max_concurrent_requests = 0;
        assert!(config.validate().is_err());
    }
}
