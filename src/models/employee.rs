//! Employee model and related types.
//!
//! This module defines the Employee struct, the validated [`EmployeeCode`]
//! business key, and the [`ReferenceImage`] handle used to read an
//! employee's stored photo.

use std::fmt;
use std::fs::File;
use std::io::{self, Cursor, Read};
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{DirectoryError, DirectoryResult};

/// Maximum length of an employee code.
pub const MAX_CODE_LEN: usize = 50;

/// Maximum length of an employee display name.
pub const MAX_DISPLAY_NAME_LEN: usize = 200;

/// A validated employee code.
///
/// Codes are non-empty, at most [`MAX_CODE_LEN`] characters, and restricted
/// to uppercase ASCII letters, digits, hyphen and underscore.
///
/// # Examples
///
/// ```
/// use attendance_checkin::models::EmployeeCode;
///
/// let code = EmployeeCode::parse("EMP-001").unwrap();
/// assert_eq!(code.as_str(), "EMP-001");
/// assert!(EmployeeCode::parse("emp001").is_err());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct EmployeeCode(String);

impl EmployeeCode {
    /// Validates and wraps an employee code.
    pub fn parse(code: &str) -> DirectoryResult<Self> {
        let invalid = |reason: &str| DirectoryError::InvalidCode {
            code: code.to_string(),
            reason: reason.to_string(),
        };

        if code.is_empty() {
            return Err(invalid("must not be empty"));
        }
        if code.len() > MAX_CODE_LEN {
            return Err(invalid(&format!(
                "must be at most {MAX_CODE_LEN} characters"
            )));
        }
        if !code
            .chars()
            .all(|c| c.is_ascii_uppercase() || c.is_ascii_digit() || c == '-' || c == '_')
        {
            return Err(invalid(
                "only uppercase letters, digits, hyphens and underscores are allowed",
            ));
        }

        Ok(Self(code.to_string()))
    }

    /// Returns the code as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for EmployeeCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl TryFrom<String> for EmployeeCode {
    type Error = DirectoryError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<EmployeeCode> for String {
    fn from(code: EmployeeCode) -> Self {
        code.0
    }
}

/// Whether an employee may check in.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EmployeeStatus {
    /// The employee may check in.
    #[default]
    Active,
    /// The employee is registered but may not check in.
    Inactive,
}

impl EmployeeStatus {
    /// Returns the wire name of the status.
    pub fn as_str(&self) -> &'static str {
        match self {
            EmployeeStatus::Active => "active",
            EmployeeStatus::Inactive => "inactive",
        }
    }
}

impl FromStr for EmployeeStatus {
    type Err = DirectoryError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "active" => Ok(EmployeeStatus::Active),
            "inactive" => Ok(EmployeeStatus::Inactive),
            other => Err(DirectoryError::InvalidField {
                field: "status".to_string(),
                message: format!("'{other}' must be 'active' or 'inactive'"),
            }),
        }
    }
}

/// Handle to an employee's stored reference photo.
///
/// The image is never kept open: every read acquires a fresh handle through
/// [`ReferenceImage::open`] which is closed when it goes out of scope.
#[derive(Debug, Clone)]
pub enum ReferenceImage {
    /// A photo stored as a file on disk.
    File(PathBuf),
    /// A photo held in memory.
    Inline(Arc<[u8]>),
}

impl ReferenceImage {
    /// Opens a readable handle to the image bytes.
    pub fn open(&self) -> io::Result<Box<dyn Read + Send + '_>> {
        match self {
            ReferenceImage::File(path) => Ok(Box::new(File::open(path)?)),
            ReferenceImage::Inline(bytes) => Ok(Box::new(Cursor::new(&bytes[..]))),
        }
    }

    /// Reads the whole image into memory.
    ///
    /// The underlying handle is released before this returns, on success
    /// and on error alike.
    pub fn read_all(&self) -> io::Result<Vec<u8>> {
        let mut handle = self.open()?;
        let mut bytes = Vec::new();
        handle.read_to_end(&mut bytes)?;
        Ok(bytes)
    }

    /// Returns the file path when the image lives on disk.
    pub fn location(&self) -> Option<&Path> {
        match self {
            ReferenceImage::File(path) => Some(path),
            ReferenceImage::Inline(_) => None,
        }
    }
}

impl From<Vec<u8>> for ReferenceImage {
    fn from(bytes: Vec<u8>) -> Self {
        ReferenceImage::Inline(bytes.into())
    }
}

/// An employee registered in the directory.
#[derive(Debug, Clone)]
pub struct Employee {
    /// Unique, immutable business key.
    pub code: EmployeeCode,
    /// Human-readable name.
    pub display_name: String,
    /// Whether the employee may check in.
    pub status: EmployeeStatus,
    /// The stored reference photo.
    pub reference_image: ReferenceImage,
    /// When the employee was registered.
    pub created_at: DateTime<Utc>,
    /// When the employee was last modified.
    pub updated_at: DateTime<Utc>,
}

impl Employee {
    /// Returns true if the employee may check in.
    pub fn is_active(&self) -> bool {
        self.status == EmployeeStatus::Active
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_parse_accepts_valid_codes() {
        for code in ["EMP001", "A", "EMP-001", "EMP_001", "0123456789"] {
            assert!(EmployeeCode::parse(code).is_ok(), "{code} should be valid");
        }
    }

    #[test]
    fn test_parse_rejects_lowercase_and_symbols() {
        for code in ["emp001", "EMP 001", "EMP.001", "EMPÑ01", ""] {
            assert!(
                matches!(
                    EmployeeCode::parse(code),
                    Err(DirectoryError::InvalidCode { .. })
                ),
                "{code:?} should be rejected"
            );
        }
    }

    #[test]
    fn test_parse_rejects_long_codes() {
        let code = "A".repeat(MAX_CODE_LEN + 1);
        assert!(EmployeeCode::parse(&code).is_err());
        assert!(EmployeeCode::parse(&"A".repeat(MAX_CODE_LEN)).is_ok());
    }

    #[test]
    fn test_code_deserialization_validates() {
        let code: EmployeeCode = serde_json::from_str("\"EMP001\"").unwrap();
        assert_eq!(code.as_str(), "EMP001");
        assert!(serde_json::from_str::<EmployeeCode>("\"emp001\"").is_err());
    }

    #[test]
    fn test_status_serialization() {
        assert_eq!(
            serde_json::to_string(&EmployeeStatus::Active).unwrap(),
            "\"active\""
        );
        assert_eq!(
            serde_json::to_string(&EmployeeStatus::Inactive).unwrap(),
            "\"inactive\""
        );
    }

    #[test]
    fn test_status_from_str() {
        assert_eq!(
            "inactive".parse::<EmployeeStatus>().unwrap(),
            EmployeeStatus::Inactive
        );
        match "suspended".parse::<EmployeeStatus>() {
            Err(DirectoryError::InvalidField { field, .. }) => assert_eq!(field, "status"),
            other => panic!("Expected InvalidField error, got {other:?}"),
        }
    }

    #[test]
    fn test_inline_reference_image_reads_bytes() {
        let image = ReferenceImage::from(vec![1u8, 2, 3]);
        assert_eq!(image.read_all().unwrap(), vec![1, 2, 3]);
        assert!(image.location().is_none());
    }

    #[test]
    fn test_file_reference_image_reads_bytes() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(b"reference").unwrap();

        let image = ReferenceImage::File(file.path().to_path_buf());
        assert_eq!(image.read_all().unwrap(), b"reference");
        assert_eq!(image.location(), Some(file.path()));
    }

    #[test]
    fn test_missing_file_reference_image_errors() {
        let image = ReferenceImage::File(PathBuf::from("/nonexistent/photo.png"));
        assert!(image.read_all().is_err());
    }
}
