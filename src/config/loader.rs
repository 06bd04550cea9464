//! Configuration loading functionality.
//!
//! This module provides the [`ConfigLoader`] type for loading the service
//! configuration from a YAML file, applying environment overrides, and
//! validating the result before anything is built from it.

use std::fs;
use std::net::SocketAddr;
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::error::{ConfigError, ConfigResult};
use crate::verification::ProviderKind;

use super::types::{ServiceConfig, StorageSettings};

/// Environment variable overriding `server.bind`.
pub const ENV_BIND: &str = "CHECKIN_BIND";
/// Environment variable overriding `verification.provider`.
pub const ENV_PROVIDER: &str = "CHECKIN_PROVIDER";
/// Environment variable overriding `verification.similarity_threshold`.
pub const ENV_SIMILARITY_THRESHOLD: &str = "CHECKIN_SIMILARITY_THRESHOLD";
/// Environment variable overriding `storage.roster`.
pub const ENV_ROSTER_PATH: &str = "CHECKIN_ROSTER_PATH";
/// Environment variable overriding `storage.photo_dir`.
pub const ENV_PHOTO_DIR: &str = "CHECKIN_PHOTO_DIR";
/// Environment variable overriding `storage.ledger`.
pub const ENV_LEDGER_PATH: &str = "CHECKIN_LEDGER_PATH";

/// Loads and provides access to the service configuration.
///
/// # File format
///
/// ```text
/// server:
///   bind: "0.0.0.0:8000"
///   max_request_bytes: 10485760
/// verification:
///   provider: deterministic        # or "demo"
///   similarity_threshold: 0.80
///   demo:
///     suffixes: ["001", "DEMO"]
/// storage:
///   roster: roster.yaml            # relative to this file
///   photo_dir: media/photos
///   ledger: data/attendance.jsonl
/// ```
///
/// # Example
///
/// ```no_run
/// use attendance_checkin::config::ConfigLoader;
///
/// let loader = ConfigLoader::load("./config/checkin.yaml")?;
/// println!("Threshold: {}", loader.config().verification.similarity_threshold);
/// # Ok::<(), attendance_checkin::error::ConfigError>(())
/// ```
#[derive(Debug, Clone)]
pub struct ConfigLoader {
    config: ServiceConfig,
    source: Option<PathBuf>,
}

impl ConfigLoader {
    /// Loads configuration from the specified file, then applies
    /// `CHECKIN_*` environment overrides.
    ///
    /// Relative storage paths are resolved against the file's directory.
    pub fn load<P: AsRef<Path>>(path: P) -> ConfigResult<Self> {
        Self::load_with(path, |key| std::env::var(key).ok())
    }

    /// Like [`load`](Self::load), reading overrides through `lookup`.
    pub fn load_with<P, F>(path: P, lookup: F) -> ConfigResult<Self>
    where
        P: AsRef<Path>,
        F: Fn(&str) -> Option<String>,
    {
        let path = path.as_ref();
        let path_str = path.display().to_string();

        let content = fs::read_to_string(path).map_err(|_| ConfigError::NotFound {
            path: path_str.clone(),
        })?;

        let mut config = Self::parse_yaml(&content, &path_str)?;
        if let Some(base) = path.parent() {
            resolve_storage_paths(&mut config.storage, base);
        }
        apply_overrides(&mut config, lookup)?;
        validate(&config)?;

        debug!(path = %path_str, "configuration loaded");
        Ok(Self {
            config,
            source: Some(path.to_path_buf()),
        })
    }

    /// Builds configuration from defaults and `CHECKIN_*` environment
    /// variables alone.
    pub fn from_env() -> ConfigResult<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds configuration from defaults and overrides read through `lookup`.
    pub fn from_lookup<F>(lookup: F) -> ConfigResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = ServiceConfig::default();
        apply_overrides(&mut config, lookup)?;
        validate(&config)?;
        Ok(Self {
            config,
            source: None,
        })
    }

    /// Parses and validates configuration from a YAML string, without
    /// environment overrides.
    pub fn from_yaml_str(yaml: &str) -> ConfigResult<Self> {
        let config = Self::parse_yaml(yaml, "<inline>")?;
        validate(&config)?;
        Ok(Self {
            config,
            source: None,
        })
    }

    fn parse_yaml(content: &str, path: &str) -> ConfigResult<ServiceConfig> {
        if content.trim().is_empty() {
            return Ok(ServiceConfig::default());
        }

        serde_yaml::from_str(content).map_err(|e| ConfigError::Parse {
            path: path.to_string(),
            message: e.to_string(),
        })
    }

    /// Returns the loaded configuration.
    pub fn config(&self) -> &ServiceConfig {
        &self.config
    }

    /// Consumes the loader, returning the configuration.
    pub fn into_config(self) -> ServiceConfig {
        self.config
    }

    /// The file the configuration was read from, if any.
    pub fn source(&self) -> Option<&Path> {
        self.source.as_deref()
    }
}

/// Checks that a similarity threshold is a number within `[0, 1]`.
pub fn validate_threshold(value: f64) -> ConfigResult<f64> {
    if value.is_finite() && (0.0..=1.0).contains(&value) {
        Ok(value)
    } else {
        Err(ConfigError::InvalidThreshold { value })
    }
}

/// Checks every setting that can be checked without touching storage.
pub fn validate(config: &ServiceConfig) -> ConfigResult<()> {
    config.verification.provider.parse::<ProviderKind>()?;
    validate_threshold(config.verification.similarity_threshold)?;

    config
        .server
        .bind
        .parse::<SocketAddr>()
        .map_err(|e| ConfigError::InvalidValue {
            key: "server.bind".to_string(),
            message: e.to_string(),
        })?;

    if config.server.max_request_bytes == 0 {
        return Err(ConfigError::InvalidValue {
            key: "server.max_request_bytes".to_string(),
            message: "must be greater than zero".to_string(),
        });
    }

    Ok(())
}

fn apply_overrides<F>(config: &mut ServiceConfig, lookup: F) -> ConfigResult<()>
where
    F: Fn(&str) -> Option<String>,
{
    if let Some(bind) = lookup(ENV_BIND) {
        config.server.bind = bind;
    }
    if let Some(provider) = lookup(ENV_PROVIDER) {
        config.verification.provider = provider;
    }
    if let Some(raw) = lookup(ENV_SIMILARITY_THRESHOLD) {
        config.verification.similarity_threshold =
            raw.trim().parse().map_err(|_| ConfigError::InvalidValue {
                key: ENV_SIMILARITY_THRESHOLD.to_string(),
                message: format!("'{raw}' is not a number"),
            })?;
    }
    if let Some(roster) = lookup(ENV_ROSTER_PATH) {
        config.storage.roster = Some(PathBuf::from(roster));
    }
    if let Some(photo_dir) = lookup(ENV_PHOTO_DIR) {
        config.storage.photo_dir = Some(PathBuf::from(photo_dir));
    }
    if let Some(ledger) = lookup(ENV_LEDGER_PATH) {
        config.storage.ledger = Some(PathBuf::from(ledger));
    }
    Ok(())
}

fn resolve_storage_paths(storage: &mut StorageSettings, base: &Path) {
    for path in [
        &mut storage.roster,
        &mut storage.photo_dir,
        &mut storage.ledger,
    ]
    .into_iter()
    .flatten()
    {
        if path.is_relative() {
            *path = base.join(&*path);
        }
    }
}
