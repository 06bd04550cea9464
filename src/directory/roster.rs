//! Seeding the directory from a YAML roster file.

use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use tracing::{info, warn};

use crate::error::{ConfigError, ConfigResult};
use crate::models::{EmployeeStatus, ReferenceImage};

use super::memory::{InMemoryDirectory, NewEmployee};

/// Top-level structure of a roster file.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RosterFile {
    /// Employees to register.
    #[serde(default)]
    pub employees: Vec<RosterEntry>,
}

/// One employee in a roster file.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RosterEntry {
    /// Employee code.
    pub code: String,
    /// Human-readable name.
    pub display_name: String,
    /// Initial status; active when omitted.
    #[serde(default)]
    pub status: EmployeeStatus,
    /// Reference photo path, relative to the roster file.
    pub photo: PathBuf,
}

/// Registers every employee listed in the roster at `path`.
///
/// Photos are not read here: a missing photo only surfaces when that
/// employee checks in. Returns the number of employees registered.
pub fn load_roster(path: &Path, directory: &InMemoryDirectory) -> ConfigResult<usize> {
    let roster_error = |message: String| ConfigError::Roster {
        path: path.display().to_string(),
        message,
    };

    let content = fs::read_to_string(path).map_err(|e| roster_error(e.to_string()))?;
    let roster: RosterFile =
        serde_yaml::from_str(&content).map_err(|e| roster_error(e.to_string()))?;
    let base = path.parent().unwrap_or_else(|| Path::new("."));

    for entry in &roster.employees {
        let photo = if entry.photo.is_relative() {
            base.join(&entry.photo)
        } else {
            entry.photo.clone()
        };

        if !photo.is_file() {
            warn!(
                employee_code = %entry.code,
                photo = %photo.display(),
                "reference photo missing; check-ins will fail until it is restored"
            );
        }

        directory
            .create(NewEmployee {
                code: entry.code.clone(),
                display_name: entry.display_name.clone(),
                status: entry.status,
                reference_image: ReferenceImage::File(photo),
            })
            .map_err(|e| roster_error(e.to_string()))?;
    }

    info!(path = %path.display(), count = roster.employees.len(), "roster loaded");
    Ok(roster.employees.len())
}
