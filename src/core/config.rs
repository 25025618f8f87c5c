//! # Configuration
//!
//! Centralizes all settings with a clear override hierarchy:
//! defaults → config file → env vars → CLI flags.
//!
//! Config lives at `~/.banter/config.toml`. If missing on first run, a
//! commented-out default is generated so users can discover all options.

use log::{debug, info, warn};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::fs;
use std::path::PathBuf;
use std::time::Duration;

// ============================================================================
// Config Structs (all fields Option<T> for sparse TOML)
// ============================================================================

#[derive(Debug, Default, Deserialize, Serialize)]
pub struct BanterConfig {
    #[serde(default)]
    pub general: GeneralConfig,
    #[serde(default)]
    pub backend: BackendConfig,
    #[serde(default)]
    pub models: Vec<ModelEntry>,
}

#[derive(Debug, Default, Deserialize, Serialize)]
pub struct GeneralConfig {
    pub default_model: Option<String>,
}

#[derive(Debug, Default, Deserialize, Serialize)]
pub struct BackendConfig {
    pub base_url: Option<String>,
    pub request_timeout_secs: Option<u64>,
}

/// One choice in the model picker. The name is an opaque identifier passed
/// through to the backend unvalidated.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, Eq)]
pub struct ModelEntry {
    pub name: String,
    pub description: Option<String>,
}

// ============================================================================
// Defaults
// ============================================================================

pub const DEFAULT_BASE_URL: &str = "http://localhost:8000";
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 60;
pub const DEFAULT_MODEL: &str = "llama-3.3-70b-versatile";

/// The built-in model set, used when the config file declares none.
fn default_models() -> Vec<ModelEntry> {
    fn entry(name: &str, description: &str) -> ModelEntry {
        ModelEntry {
            name: name.to_string(),
            description: Some(description.to_string()),
        }
    }
    vec![
        entry("llama-3.3-70b-versatile", "Balanced default"),
        entry("llama-3.1-8b-instant", "Fast, lightweight"),
        entry("openai/gpt-oss-120b", "Large open-weight model"),
        entry("qwen/qwen3-32b", "Strong on code"),
    ]
}

// ============================================================================
// Resolved Config (concrete values, no Options)
// ============================================================================

#[derive(Debug, Clone)]
pub struct ResolvedConfig {
    pub base_url: String,
    pub request_timeout: Duration,
    pub model_name: String,
    pub models: Vec<ModelEntry>,
}

// ============================================================================
// Error Type
// ============================================================================

#[derive(Debug)]
pub enum ConfigError {
    Io(std::io::Error),
    Parse(toml::de::Error),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::Io(e) => write!(f, "config I/O error: {e}"),
            ConfigError::Parse(e) => write!(f, "config parse error: {e}"),
        }
    }
}

impl std::error::Error for ConfigError {}

// ============================================================================
// Loading
// ============================================================================

/// Returns the path to `~/.banter/config.toml`.
pub fn config_path() -> Option<PathBuf> {
    dirs::home_dir().map(|h| h.join(".banter").join("config.toml"))
}

/// Load config from `~/.banter/config.toml`.
///
/// If the file doesn't exist, generates a commented-out default and
/// returns `BanterConfig::default()`. If it exists but is malformed,
/// returns `ConfigError::Parse`.
pub fn load_config() -> Result<BanterConfig, ConfigError> {
    let path = match config_path() {
        Some(p) => p,
        None => {
            warn!("Could not determine home directory, using default config");
            return Ok(BanterConfig::default());
        }
    };

    if !path.exists() {
        info!("No config file found, generating default at {}", path.display());
        generate_default_config(&path);
        return Ok(BanterConfig::default());
    }

    let contents = fs::read_to_string(&path).map_err(ConfigError::Io)?;
    let config: BanterConfig = toml::from_str(&contents).map_err(ConfigError::Parse)?;
    info!("Loaded config from {}", path.display());
    debug!("Config: {:?}", config);
    Ok(config)
}

/// Generates a commented-out default config file at the given path.
fn generate_default_config(path: &PathBuf) {
    let default_content = r#"# banter configuration
# All settings are optional — defaults are used for anything not specified.
# Override hierarchy: defaults → this file → env vars → CLI flags.

# [backend]
# base_url = "http://localhost:8000"   # Or set BANTER_BACKEND_URL env var
# request_timeout_secs = 60

# [general]
# default_model = "llama-3.3-70b-versatile"   # Or set BANTER_MODEL env var

# [[models]]
# name = "llama-3.3-70b-versatile"
# description = "Balanced default"

# [[models]]
# name = "llama-3.1-8b-instant"
# description = "Fast, lightweight"
"#;

    if let Some(parent) = path.parent() {
        if let Err(e) = fs::create_dir_all(parent) {
            warn!("Failed to create config directory: {}", e);
            return;
        }
    }
    if let Err(e) = fs::write(path, default_content) {
        warn!("Failed to write default config: {}", e);
    }
}

// ============================================================================
// Resolution
// ============================================================================

/// Resolve the final config by collapsing: defaults → config file → env vars → CLI.
///
/// `cli_base_url` and `cli_model` come from CLI flags (None = not specified).
pub fn resolve(
    config: &BanterConfig,
    cli_base_url: Option<&str>,
    cli_model: Option<&str>,
) -> ResolvedConfig {
    // Backend URL: CLI → env → config → default
    let base_url = cli_base_url
        .map(|s| s.to_string())
        .or_else(|| std::env::var("BANTER_BACKEND_URL").ok())
        .or_else(|| config.backend.base_url.clone())
        .unwrap_or_else(|| DEFAULT_BASE_URL.to_string());

    // Model: CLI → env → config → default
    let model_name = cli_model
        .map(|s| s.to_string())
        .or_else(|| std::env::var("BANTER_MODEL").ok())
        .or_else(|| config.general.default_model.clone())
        .unwrap_or_else(|| DEFAULT_MODEL.to_string());

    let request_timeout = Duration::from_secs(
        config
            .backend
            .request_timeout_secs
            .unwrap_or(DEFAULT_REQUEST_TIMEOUT_SECS),
    );

    let models = if config.models.is_empty() {
        default_models()
    } else {
        config.models.clone()
    };

    ResolvedConfig {
        base_url: base_url.trim_end_matches('/').to_string(),
        request_timeout,
        model_name,
        models,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_parses() {
        let config = BanterConfig::default();
        assert!(config.models.is_empty());
        assert!(config.general.default_model.is_none());
        assert!(config.backend.base_url.is_none());
    }

    #[test]
    fn test_resolve_uses_defaults_when_empty() {
        let config = BanterConfig::default();
        let resolved = resolve(&config, None, None);
        assert_eq!(resolved.base_url, DEFAULT_BASE_URL);
        assert_eq!(
            resolved.request_timeout,
            Duration::from_secs(DEFAULT_REQUEST_TIMEOUT_SECS)
        );
        assert_eq!(resolved.model_name, DEFAULT_MODEL);
        assert!(!resolved.models.is_empty(), "built-in model set kicks in");
    }

    #[test]
    fn test_resolve_config_values_override_defaults() {
        let config = BanterConfig {
            general: GeneralConfig {
                default_model: Some("my-model".to_string()),
            },
            backend: BackendConfig {
                base_url: Some("http://backend:9000/".to_string()),
                request_timeout_secs: Some(10),
            },
            models: vec![ModelEntry {
                name: "my-model".to_string(),
                description: None,
            }],
        };
        let resolved = resolve(&config, None, None);
        assert_eq!(resolved.base_url, "http://backend:9000");
        assert_eq!(resolved.request_timeout, Duration::from_secs(10));
        assert_eq!(resolved.model_name, "my-model");
        assert_eq!(resolved.models.len(), 1);
    }

    #[test]
    fn test_resolve_cli_flags_win() {
        let config = BanterConfig {
            general: GeneralConfig {
                default_model: Some("config-model".to_string()),
            },
            backend: BackendConfig {
                base_url: Some("http://config:8000".to_string()),
                request_timeout_secs: None,
            },
            models: vec![],
        };
        let resolved = resolve(&config, Some("http://cli:8000"), Some("cli-model"));
        assert_eq!(resolved.base_url, "http://cli:8000");
        assert_eq!(resolved.model_name, "cli-model");
    }

    #[test]
    fn test_toml_round_trip() {
        let toml_str = r#"
[backend]
base_url = "http://192.168.1.50:8000"
request_timeout_secs = 30

[general]
default_model = "llama-3.1-8b-instant"

[[models]]
name = "llama-3.3-70b-versatile"
description = "Balanced default"

[[models]]
name = "llama-3.1-8b-instant"
"#;
        let config: BanterConfig = toml::from_str(toml_str).unwrap();
        assert_eq!(
            config.backend.base_url.as_deref(),
            Some("http://192.168.1.50:8000")
        );
        assert_eq!(config.backend.request_timeout_secs, Some(30));
        assert_eq!(config.models.len(), 2);
        assert_eq!(config.models[0].name, "llama-3.3-70b-versatile");
        assert_eq!(config.models[1].description, None);
    }

    #[test]
    fn test_sparse_toml_parses() {
        // Only override one thing — everything else stays default
        let toml_str = r#"
[general]
default_model = "my-model"
"#;
        let config: BanterConfig = toml::from_str(toml_str).unwrap();
        assert_eq!(config.general.default_model.as_deref(), Some("my-model"));
        assert!(config.backend.base_url.is_none());
        assert!(config.models.is_empty());
    }
}
