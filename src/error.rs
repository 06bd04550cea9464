//! Error types for the attendance check-in service.
//!
//! Each collaborator has its own strongly-typed error built with `thiserror`.
//! [`CheckInError`] is the error surfaced by the check-in pipeline and carries
//! an [`ErrorKind`] used by the HTTP layer to pick a status code.

use std::path::Path;

use thiserror::Error;

/// Coarse classification of a check-in failure.
///
/// The HTTP layer maps `NotFound` to 404, `InvalidState` and `InvalidInput`
/// to 400, and `Unexpected` to an opaque 500.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// The referenced employee does not exist.
    NotFound,
    /// The employee exists but cannot check in, or its data is damaged.
    InvalidState,
    /// The caller supplied something that cannot be evaluated.
    InvalidInput,
    /// Anything else; never exposed to the caller in detail.
    Unexpected,
}

/// The error type returned by the check-in pipeline.
///
/// # Example
///
/// ```
/// use attendance_checkin::error::{CheckInError, ErrorKind};
///
/// let error = CheckInError::EmployeeNotFound {
///     code: "NOPE".to_string(),
/// };
/// assert_eq!(error.to_string(), "Employee not found: NOPE");
/// assert_eq!(error.kind(), ErrorKind::NotFound);
/// ```
#[derive(Debug, Error)]
pub enum CheckInError {
    /// No employee is registered under the given code.
    #[error("Employee not found: {code}")]
    EmployeeNotFound {
        /// The code that was looked up.
        code: String,
    },

    /// The employee is registered but inactive.
    #[error("Employee '{code}' is inactive")]
    EmployeeInactive {
        /// The inactive employee's code.
        code: String,
    },

    /// The stored reference image could not be read.
    #[error("Reference image for employee '{code}' could not be read: {message}")]
    ReferenceImageUnreadable {
        /// The employee whose reference image is unreadable.
        code: String,
        /// A description of the read failure.
        message: String,
    },

    /// The captured image was not valid base64 or not a parseable image.
    #[error("Invalid capture image: {0}")]
    InvalidImage(#[from] ImageDecodeError),

    /// The verification provider could not evaluate the images.
    #[error("Verification by provider '{provider}' failed: {message}")]
    VerificationFailed {
        /// The name of the provider that failed.
        provider: String,
        /// A description of the provider failure.
        message: String,
    },

    /// The employee directory failed while looking up the employee.
    #[error("Employee directory error: {0}")]
    Directory(#[from] DirectoryError),

    /// The attendance ledger failed to record the event.
    #[error("Attendance ledger error: {0}")]
    Ledger(#[from] LedgerError),
}

impl CheckInError {
    /// Returns the taxonomy class of this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            CheckInError::EmployeeNotFound { .. } => ErrorKind::NotFound,
            CheckInError::EmployeeInactive { .. }
            | CheckInError::ReferenceImageUnreadable { .. } => ErrorKind::InvalidState,
            CheckInError::InvalidImage(_) | CheckInError::VerificationFailed { .. } => {
                ErrorKind::InvalidInput
            }
            CheckInError::Directory(_) | CheckInError::Ledger(_) => ErrorKind::Unexpected,
        }
    }
}

/// A type alias for Results that return CheckInError.
pub type CheckInResult<T> = Result<T, CheckInError>;

/// Failure to turn a caller-supplied image string into image bytes.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ImageDecodeError {
    /// The payload was empty after stripping the data-URI header.
    #[error("image payload is empty")]
    Empty,

    /// The payload was not valid base64.
    #[error("image payload is not valid base64: {message}")]
    Base64 {
        /// The decoder's description of the problem.
        message: String,
    },

    /// The bytes decoded from base64 are not a readable image.
    #[error("image data could not be parsed: {message}")]
    Unparseable {
        /// The image decoder's description of the problem.
        message: String,
    },
}

/// Errors raised by a verification provider.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ProviderError {
    /// One of the byte streams could not be interpreted by the provider.
    #[error("malformed {which} image: {message}")]
    MalformedInput {
        /// Which input was rejected ("reference" or "capture").
        which: &'static str,
        /// A description of the problem.
        message: String,
    },

    /// The provider produced a score outside `[0.0, 1.0]`.
    #[error("score {score} is outside the range [0, 1]")]
    ScoreOutOfRange {
        /// The offending score.
        score: f64,
    },

    /// The provider did not answer within its own deadline.
    #[error("verification timed out after {elapsed_ms} ms")]
    Timeout {
        /// How long the provider waited before giving up.
        elapsed_ms: u64,
    },

    /// Any other backend failure.
    #[error("{message}")]
    Backend {
        /// A description of the failure.
        message: String,
    },
}

/// A type alias for Results that return ProviderError.
pub type ProviderResult<T> = Result<T, ProviderError>;

/// Configuration errors. These are fatal at startup, never per-request.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Configuration file was not found at the specified path.
    #[error("Configuration file not found: {path}")]
    NotFound {
        /// The path that was not found.
        path: String,
    },

    /// Configuration file could not be parsed.
    #[error("Failed to parse configuration file '{path}': {message}")]
    Parse {
        /// The path to the file that failed to parse.
        path: String,
        /// A description of the parse error.
        message: String,
    },

    /// The configured provider name matches no known implementation.
    #[error("Unknown verification provider '{name}' (known providers: {known})")]
    UnknownProvider {
        /// The configured name.
        name: String,
        /// Comma-separated list of supported names.
        known: String,
    },

    /// The similarity threshold is not a number within `[0, 1]`.
    #[error("Similarity threshold must be within [0, 1], got {value}")]
    InvalidThreshold {
        /// The rejected threshold.
        value: f64,
    },

    /// A single setting holds an unusable value.
    #[error("Invalid value for '{key}': {message}")]
    InvalidValue {
        /// The setting or environment variable name.
        key: String,
        /// A description of the problem.
        message: String,
    },

    /// The employee roster could not be loaded.
    #[error("Failed to load roster '{path}': {message}")]
    Roster {
        /// The roster file path.
        path: String,
        /// A description of the problem.
        message: String,
    },

    /// A storage backend could not be opened.
    #[error("Failed to open storage '{path}': {message}")]
    Storage {
        /// The storage location.
        path: String,
        /// A description of the problem.
        message: String,
    },
}

impl ConfigError {
    pub(crate) fn storage(path: &Path, message: impl ToString) -> Self {
        ConfigError::Storage {
            path: path.display().to_string(),
            message: message.to_string(),
        }
    }
}

/// A type alias for Results that return ConfigError.
pub type ConfigResult<T> = Result<T, ConfigError>;

/// Errors raised by the employee directory and its admin operations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DirectoryError {
    /// The employee code does not follow the `[A-Z0-9_-]` format.
    #[error("Invalid employee code '{code}': {reason}")]
    InvalidCode {
        /// The rejected code.
        code: String,
        /// Why the code was rejected.
        reason: String,
    },

    /// An employee with this code already exists.
    #[error("An employee with code '{code}' already exists")]
    DuplicateCode {
        /// The duplicated code.
        code: String,
    },

    /// No employee is registered under this code.
    #[error("Employee not found: {code}")]
    NotFound {
        /// The code that was looked up.
        code: String,
    },

    /// A field other than the code holds an invalid value.
    #[error("Invalid employee field '{field}': {message}")]
    InvalidField {
        /// The field that was invalid.
        field: String,
        /// A description of what made the field invalid.
        message: String,
    },

    /// An uploaded reference photo is not a usable image.
    #[error("Invalid reference photo: {0}")]
    InvalidPhoto(#[from] ImageDecodeError),

    /// The backing store failed.
    #[error("Directory storage failure: {message}")]
    Storage {
        /// A description of the failure.
        message: String,
    },
}

/// A type alias for Results that return DirectoryError.
pub type DirectoryResult<T> = Result<T, DirectoryError>;

/// Errors raised by an attendance ledger.
#[derive(Debug, Error)]
pub enum LedgerError {
    /// Reading or writing the ledger file failed.
    #[error("I/O error on ledger '{path}': {message}")]
    Io {
        /// The ledger location.
        path: String,
        /// A description of the failure.
        message: String,
    },

    /// A stored line could not be decoded.
    #[error("Corrupt ledger entry in '{path}' at line {line}: {message}")]
    Corrupt {
        /// The ledger location.
        path: String,
        /// The 1-based line number.
        line: usize,
        /// A description of the problem.
        message: String,
    },

    /// An event could not be serialized.
    #[error("Failed to serialize attendance event: {message}")]
    Serialization {
        /// A description of the problem.
        message: String,
    },

    /// A writer panicked while holding the ledger lock.
    #[error("Ledger lock poisoned")]
    Poisoned,
}

/// A type alias for Results that return LedgerError.
pub type LedgerResult<T> = Result<T, LedgerError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_employee_not_found_displays_code() {
        let error = CheckInError::EmployeeNotFound {
            code: "NOPE".to_string(),
        };
        assert_eq!(error.to_string(), "Employee not found: NOPE");
    }

    #[test]
    fn test_inactive_displays_code() {
        let error = CheckInError::EmployeeInactive {
            code: "EMP001".to_string(),
        };
        assert_eq!(error.to_string(), "Employee 'EMP001' is inactive");
    }

    #[test]
    fn test_invalid_image_wraps_decode_error() {
        let error: CheckInError = ImageDecodeError::Base64 {
            message: "Invalid byte 45, offset 3.".to_string(),
        }
        .into();
        assert_eq!(
            error.to_string(),
            "Invalid capture image: image payload is not valid base64: Invalid byte 45, offset 3."
        );
    }

    #[test]
    fn test_error_kinds() {
        let cases = [
            (
                CheckInError::EmployeeNotFound { code: "X".into() },
                ErrorKind::NotFound,
            ),
            (
                CheckInError::EmployeeInactive { code: "X".into() },
                ErrorKind::InvalidState,
            ),
            (
                CheckInError::ReferenceImageUnreadable {
                    code: "X".into(),
                    message: "gone".into(),
                },
                ErrorKind::InvalidState,
            ),
            (
                CheckInError::InvalidImage(ImageDecodeError::Empty),
                ErrorKind::InvalidInput,
            ),
            (
                CheckInError::VerificationFailed {
                    provider: "deterministic".into(),
                    message: "boom".into(),
                },
                ErrorKind::InvalidInput,
            ),
            (
                CheckInError::Ledger(LedgerError::Poisoned),
                ErrorKind::Unexpected,
            ),
            (
                CheckInError::Directory(DirectoryError::Storage {
                    message: "poisoned".into(),
                }),
                ErrorKind::Unexpected,
            ),
        ];

        for (error, kind) in cases {
            assert_eq!(error.kind(), kind, "wrong kind for {error}");
        }
    }

    #[test]
    fn test_unknown_provider_lists_known_names() {
        let error = ConfigError::UnknownProvider {
            name: "facenet".to_string(),
            known: "deterministic, demo".to_string(),
        };
        assert_eq!(
            error.to_string(),
            "Unknown verification provider 'facenet' (known providers: deterministic, demo)"
        );
    }

    #[test]
    fn test_provider_timeout_display() {
        let error = ProviderError::Timeout { elapsed_ms: 1500 };
        assert_eq!(error.to_string(), "verification timed out after 1500 ms");
    }

    #[test]
    fn test_errors_implement_std_error() {
        fn assert_error<T: std::error::Error + Send + Sync + 'static>() {}
        assert_error::<CheckInError>();
        assert_error::<ConfigError>();
        assert_error::<DirectoryError>();
        assert_error::<LedgerError>();
        assert_error::<ProviderError>();
    }

    #[test]
    fn test_error_propagation_with_question_mark() {
        fn lookup() -> DirectoryResult<()> {
            Err(DirectoryError::Storage {
                message: "lock poisoned".to_string(),
            })
        }

        fn check_in() -> CheckInResult<()> {
            lookup()?;
            Ok(())
        }

        let error = check_in().unwrap_err();
        assert_eq!(error.kind(), ErrorKind::Unexpected);
    }
}
