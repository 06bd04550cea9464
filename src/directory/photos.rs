//! Storage for uploaded reference photos.

use std::fs;
use std::path::PathBuf;

use tracing::info;
use uuid::Uuid;

use crate::error::{DirectoryError, DirectoryResult};
use crate::imaging::DecodedImage;
use crate::models::{EmployeeCode, ReferenceImage};

/// Where uploaded reference photos are kept.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum PhotoStore {
    /// Photos stay in memory for the life of the process.
    #[default]
    Memory,
    /// Photos are written as files under `dir`.
    Disk {
        /// Target directory, created on first write.
        dir: PathBuf,
    },
}

impl PhotoStore {
    /// Disk storage when a directory is configured, memory otherwise.
    pub fn new(dir: Option<PathBuf>) -> Self {
        match dir {
            Some(dir) => PhotoStore::Disk { dir },
            None => PhotoStore::Memory,
        }
    }

    /// Stores a validated photo and returns a handle to it.
    ///
    /// Each upload gets a fresh file name, so replacing an employee's photo
    /// never overwrites the previous file.
    pub fn store(&self, code: &EmployeeCode, image: DecodedImage) -> DirectoryResult<ReferenceImage> {
        match self {
            PhotoStore::Memory => Ok(ReferenceImage::from(image.bytes)),
            PhotoStore::Disk { dir } => {
                let storage_error = |e: std::io::Error| DirectoryError::Storage {
                    message: format!("failed to write photo under '{}': {e}", dir.display()),
                };

                fs::create_dir_all(dir).map_err(storage_error)?;
                let path = dir.join(format!(
                    "{}-{}.{}",
                    code.as_str().to_ascii_lowercase(),
                    Uuid::new_v4().simple(),
                    image.extension()
                ));
                fs::write(&path, &image.bytes).map_err(storage_error)?;

                info!(employee_code = %code, path = %path.display(), "reference photo stored");
                Ok(ReferenceImage::File(path))
            }
        }
    }
}
