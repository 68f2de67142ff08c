//! Configuration resolution and loading.
//!
//! Resolution order: CLI argument → environment variables → XDG paths → defaults.

use std::path::{Path, PathBuf};

use crate::config::RecurrenceConfig;
use crate::validate::validate_config;

/// Where a configuration file was found.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ConfigSource {
    /// Explicitly provided via CLI argument.
    CliArgument,

    /// Set via environment variable.
    Environment,

    /// Found in XDG config directory.
    XdgConfig,

    /// Using built-in defaults.
    #[default]
    BuiltinDefault,
}

impl std::fmt::Display for ConfigSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigSource::CliArgument => write!(f, "CLI argument"),
            ConfigSource::Environment => write!(f, "environment variable"),
            ConfigSource::XdgConfig => write!(f, "XDG config"),
            ConfigSource::BuiltinDefault => write!(f, "builtin default"),
        }
    }
}

/// Environment variable names.
const ENV_CONFIG_PATH: &str = "RC_CONFIG";
const ENV_CONFIG_DIR: &str = "RC_CONFIG_DIR";

/// Standard config file name.
const CONFIG_FILENAME: &str = "recurrence.json";

/// Application name for XDG directories.
const APP_NAME: &str = "recurrence";

/// Resolve the configuration file path.
///
/// Resolution order:
/// 1. Explicit CLI path (if provided)
/// 2. RC_CONFIG environment variable
/// 3. RC_CONFIG_DIR environment variable + filename
/// 4. XDG config directory (~/.config/recurrence/)
/// 5. Built-in defaults (None)
///
/// The CLI path is returned even when it does not exist so that loading
/// reports the missing file instead of silently using defaults.
pub fn resolve_config_path(cli_path: Option<&Path>) -> (Option<PathBuf>, ConfigSource) {
    // 1. CLI argument
    if let Some(path) = cli_path {
        return (Some(path.to_path_buf()), ConfigSource::CliArgument);
    }

    // 2. Environment variable (direct path)
    if let Ok(env_path) = std::env::var(ENV_CONFIG_PATH) {
        let path = PathBuf::from(env_path);
        if path.exists() {
            return (Some(path), ConfigSource::Environment);
        }
    }

    // 3. Environment variable (config dir)
    if let Ok(config_dir) = std::env::var(ENV_CONFIG_DIR) {
        let path = PathBuf::from(config_dir).join(CONFIG_FILENAME);
        if path.exists() {
            return (Some(path), ConfigSource::Environment);
        }
    }

    // 4. XDG config directory
    if let Some(dir) = xdg_config_dir() {
        let path = dir.join(CONFIG_FILENAME);
        if path.exists() {
            return (Some(path), ConfigSource::XdgConfig);
        }
    }

    // 5. Built-in default (None)
    (None, ConfigSource::BuiltinDefault)
}

/// Get the XDG config directory for recurrence analysis.
pub fn xdg_config_dir() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join(APP_NAME))
}

/// A configuration together with where it came from.
#[derive(Debug, Clone)]
pub struct LoadedConfig {
    pub config: RecurrenceConfig,
    pub source: ConfigSource,
    pub path: Option<PathBuf>,
}

/// Resolve, read and parse the configuration without validating it.
///
/// Callers that layer overrides on top validate the merged result.
pub fn read_config(cli_path: Option<&Path>) -> rc_common::Result<LoadedConfig> {
    let (path, source) = resolve_config_path(cli_path);
    let config: RecurrenceConfig = match &path {
        Some(p) => {
            let raw = std::fs::read_to_string(p)?;
            serde_json::from_str(&raw).map_err(|e| {
                rc_common::Error::Config(format!("{}: {e}", p.display()))
            })?
        }
        None => RecurrenceConfig::default(),
    };
    Ok(LoadedConfig {
        config,
        source,
        path,
    })
}

/// Resolve, read, parse and validate the configuration.
pub fn load_config(cli_path: Option<&Path>) -> rc_common::Result<LoadedConfig> {
    let loaded = read_config(cli_path)?;
    validate_config(&loaded.config)?;
    Ok(loaded)
}
