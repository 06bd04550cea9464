//! Application state for the check-in API.
//!
//! This module defines the shared state available to all request handlers
//! and how it is assembled from configuration at startup.

use std::sync::Arc;

use tracing::info;

use crate::checkin::CheckInPipeline;
use crate::config::ServiceConfig;
use crate::directory::{InMemoryDirectory, PhotoStore, load_roster};
use crate::error::{ConfigError, ConfigResult};
use crate::ledger::{AttendanceLedger, InMemoryLedger, JsonlLedger};

/// Shared application state.
///
/// Cloning is cheap; every field is reference-counted or small.
#[derive(Clone)]
pub struct AppState {
    pipeline: Arc<CheckInPipeline>,
    directory: Arc<InMemoryDirectory>,
    ledger: Arc<dyn AttendanceLedger>,
    photos: Arc<PhotoStore>,
    max_request_bytes: usize,
}

impl AppState {
    /// Creates application state from already-built collaborators.
    ///
    /// `pipeline` must have been built over the same directory and ledger.
    pub fn new(
        pipeline: CheckInPipeline,
        directory: Arc<InMemoryDirectory>,
        ledger: Arc<dyn AttendanceLedger>,
        photos: PhotoStore,
        max_request_bytes: usize,
    ) -> Self {
        Self {
            pipeline: Arc::new(pipeline),
            directory,
            ledger,
            photos: Arc::new(photos),
            max_request_bytes,
        }
    }

    /// Builds the full service from configuration.
    ///
    /// Seeds the directory from the roster, opens the ledger, and selects the
    /// verification provider. Any failure aborts startup.
    pub fn bootstrap(config: &ServiceConfig) -> ConfigResult<Self> {
        let storage = &config.storage;

        let directory = Arc::new(InMemoryDirectory::new());
        if let Some(roster) = &storage.roster {
            load_roster(roster, &directory)?;
        }

        let ledger: Arc<dyn AttendanceLedger> = match &storage.ledger {
            Some(path) => Arc::new(
                JsonlLedger::open(path).map_err(|e| ConfigError::storage(path, e))?,
            ),
            None => {
                info!("no ledger path configured; attendance events are kept in memory");
                Arc::new(InMemoryLedger::new())
            }
        };

        let pipeline =
            CheckInPipeline::from_settings(&config.verification, directory.clone(), ledger.clone())?;

        Ok(Self::new(
            pipeline,
            directory,
            ledger,
            PhotoStore::new(storage.photo_dir.clone()),
            config.server.max_request_bytes,
        ))
    }

    /// The check-in pipeline.
    pub fn pipeline(&self) -> &Arc<CheckInPipeline> {
        &self.pipeline
    }

    /// The employee directory.
    pub fn directory(&self) -> &Arc<InMemoryDirectory> {
        &self.directory
    }

    /// The attendance ledger.
    pub fn ledger(&self) -> &Arc<dyn AttendanceLedger> {
        &self.ledger
    }

    /// Where uploaded reference photos are stored.
    pub fn photos(&self) -> &Arc<PhotoStore> {
        &self.photos
    }

    /// Largest accepted request body, in bytes.
    pub fn max_request_bytes(&self) -> usize {
        self.max_request_bytes
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ConfigLoader;
    use std::fs;

    #[test]
    fn test_app_state_is_clone() {
        fn assert_clone<T: Clone + Send + Sync>() {}
        assert_clone::<AppState>();
    }

    #[test]
    fn test_bootstrap_with_defaults() {
        let state = AppState::bootstrap(&ServiceConfig::default()).unwrap();
        assert_eq!(state.pipeline().provider_name(), "deterministic");
        assert_eq!(state.pipeline().threshold(), 0.80);
        assert!(state.directory().is_empty().unwrap());
        assert_eq!(*state.photos().as_ref(), PhotoStore::Memory);
    }

    #[test]
    fn test_bootstrap_from_storage_settings() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(
            dir.path().join("roster.yaml"),
            "employees:\n  - { code: EMP001, display_name: Ana Torres, photo: emp001.png }\n",
        )
        .unwrap();
        fs::write(
            dir.path().join("checkin.yaml"),
            "verification:\n  provider: demo\nstorage:\n  roster: roster.yaml\n  ledger: data/attendance.jsonl\n  photo_dir: photos\n",
        )
        .unwrap();

        let loader = ConfigLoader::load_with(dir.path().join("checkin.yaml"), |_: &str| None).unwrap();
        let state = AppState::bootstrap(loader.config()).unwrap();

        assert_eq!(state.pipeline().provider_name(), "demo");
        assert_eq!(state.directory().len().unwrap(), 1);
        assert!(dir.path().join("data/attendance.jsonl").is_file());
        assert_eq!(
            *state.photos().as_ref(),
            PhotoStore::Disk {
                dir: dir.path().join("photos")
            }
        );
    }

    #[test]
    fn test_bootstrap_rejects_corrupt_ledger() {
        let dir = tempfile::tempdir().unwrap();
        let ledger = dir.path().join("attendance.jsonl");
        fs::write(&ledger, "garbage\n").unwrap();

        let mut config = ServiceConfig::default();
        config.storage.ledger = Some(ledger);
        assert!(matches!(
            AppState::bootstrap(&config),
            Err(ConfigError::Storage { .. })
        ));
    }
}
