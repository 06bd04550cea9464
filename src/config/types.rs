//! Configuration types for the check-in service.
//!
//! These structures are deserialized from the YAML configuration file. Every
//! section and field is optional and falls back to its default.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::verification::{DEFAULT_DEMO_SUFFIXES, DETERMINISTIC_PROVIDER_NAME};

/// Default similarity threshold for accepting a check-in.
pub const DEFAULT_SIMILARITY_THRESHOLD: f64 = 0.80;

/// Default listen address.
pub const DEFAULT_BIND: &str = "0.0.0.0:8000";

/// Default maximum request body size (10 MiB).
pub const DEFAULT_MAX_REQUEST_BYTES: usize = 10 * 1024 * 1024;

/// The complete service configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ServiceConfig {
    /// HTTP server settings.
    pub server: ServerSettings,
    /// Verification provider and decision threshold.
    pub verification: VerificationSettings,
    /// Where employees, photos and events are kept.
    pub storage: StorageSettings,
}

/// HTTP server settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ServerSettings {
    /// Socket address to listen on.
    pub bind: String,
    /// Largest accepted request body, in bytes.
    pub max_request_bytes: usize,
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            bind: DEFAULT_BIND.to_string(),
            max_request_bytes: DEFAULT_MAX_REQUEST_BYTES,
        }
    }
}

/// Verification settings, read once when the pipeline is built.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct VerificationSettings {
    /// Name of the active verification provider.
    pub provider: String,
    /// Minimum score for a check-in to be accepted.
    pub similarity_threshold: f64,
    /// Settings for the `demo` provider.
    pub demo: DemoSettings,
}

impl Default for VerificationSettings {
    fn default() -> Self {
        Self {
            provider: DETERMINISTIC_PROVIDER_NAME.to_string(),
            similarity_threshold: DEFAULT_SIMILARITY_THRESHOLD,
            demo: DemoSettings::default(),
        }
    }
}

/// Settings for the `demo` provider.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct DemoSettings {
    /// Employee code suffixes that are always accepted.
    pub suffixes: Vec<String>,
}

impl Default for DemoSettings {
    fn default() -> Self {
        Self {
            suffixes: DEFAULT_DEMO_SUFFIXES.iter().map(|s| s.to_string()).collect(),
        }
    }
}

/// Storage locations. Unset locations keep data in memory only.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct StorageSettings {
    /// YAML roster of employees loaded at startup.
    pub roster: Option<PathBuf>,
    /// Directory where uploaded reference photos are written.
    pub photo_dir: Option<PathBuf>,
    /// JSON-lines file holding the attendance ledger.
    pub ledger: Option<PathBuf>,
}
