//! Configuration loading and management for the check-in service.
//!
//! Configuration comes from an optional YAML file plus `CHECKIN_*`
//! environment overrides. It is read once at startup and passed explicitly to
//! everything built from it; nothing reads configuration at request time.
//!
//! # Example
//!
//! ```no_run
//! use attendance_checkin::config::ConfigLoader;
//!
//! let config = ConfigLoader::load("./config/checkin.yaml").unwrap();
//! println!("Provider: {}", config.config().verification.provider);
//! ```

mod loader;
mod types;

pub use loader::{
    ConfigLoader, ENV_BIND, ENV_LEDGER_PATH, ENV_PHOTO_DIR, ENV_PROVIDER, ENV_ROSTER_PATH,
    ENV_SIMILARITY_THRESHOLD, validate, validate_threshold,
};
pub use types::{
    DEFAULT_BIND, DEFAULT_MAX_REQUEST_BYTES, DEFAULT_SIMILARITY_THRESHOLD, DemoSettings,
    ServerSettings, ServiceConfig, StorageSettings, VerificationSettings,
};
