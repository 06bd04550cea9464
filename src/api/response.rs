//! Response types for the check-in API.
//!
//! This module defines the success bodies, the error body, and the mapping
//! from domain errors to HTTP status codes.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{CheckInError, DirectoryError, LedgerError};
use crate::models::{CheckInOutcome, Employee, EmployeeStatus};

/// API error response structure.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiError {
    /// Error code for programmatic handling.
    pub code: String,
    /// Human-readable error message.
    pub message: String,
    /// Optional details about the error.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

impl ApiError {
    /// Creates a new API error.
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
            details: None,
        }
    }

    /// Creates a new API error with details.
    pub fn with_details(
        code: impl Into<String>,
        message: impl Into<String>,
        details: impl Into<String>,
    ) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
            details: Some(details.into()),
        }
    }

    /// Creates a validation error response.
    pub fn validation_error(message: impl Into<String>) -> Self {
        Self::new("VALIDATION_ERROR", message)
    }

    /// Creates a malformed JSON error response.
    pub fn malformed_json(message: impl Into<String>) -> Self {
        Self::new("MALFORMED_JSON", message)
    }

    /// Creates an employee not found error response.
    pub fn employee_not_found(code: &str) -> Self {
        Self::new("EMPLOYEE_NOT_FOUND", format!("Employee not found: {code}"))
    }
}

/// API error with HTTP status code.
#[derive(Debug)]
pub struct ApiErrorResponse {
    /// The HTTP status code.
    pub status: StatusCode,
    /// The error body.
    pub error: ApiError,
}

impl ApiErrorResponse {
    /// Pairs an error body with a status code.
    pub fn new(status: StatusCode, error: ApiError) -> Self {
        Self { status, error }
    }

    /// A 400 response.
    pub fn bad_request(error: ApiError) -> Self {
        Self::new(StatusCode::BAD_REQUEST, error)
    }

    /// An opaque 500 response. Details belong in the log, not the body.
    pub fn internal() -> Self {
        Self::new(
            StatusCode::INTERNAL_SERVER_ERROR,
            ApiError::new("INTERNAL_ERROR", "Internal server error"),
        )
    }
}

impl IntoResponse for ApiErrorResponse {
    fn into_response(self) -> Response {
        (self.status, Json(self.error)).into_response()
    }
}

impl From<CheckInError> for ApiErrorResponse {
    fn from(error: CheckInError) -> Self {
        match error {
            CheckInError::EmployeeNotFound { code } => {
                ApiErrorResponse::new(StatusCode::NOT_FOUND, ApiError::employee_not_found(&code))
            }
            CheckInError::EmployeeInactive { code } => ApiErrorResponse::bad_request(
                ApiError::with_details(
                    "EMPLOYEE_INACTIVE",
                    format!("Employee '{code}' is inactive"),
                    "Inactive employees cannot check in",
                ),
            ),
            CheckInError::ReferenceImageUnreadable { code, .. } => ApiErrorResponse::bad_request(
                ApiError::with_details(
                    "REFERENCE_IMAGE_UNAVAILABLE",
                    format!("Reference image for employee '{code}' is unavailable"),
                    "The stored reference photo must be replaced before this employee can check in",
                ),
            ),
            CheckInError::InvalidImage(e) => {
                ApiErrorResponse::bad_request(ApiError::new("INVALID_IMAGE", e.to_string()))
            }
            CheckInError::VerificationFailed { provider, message } => {
                ApiErrorResponse::bad_request(ApiError::with_details(
                    "VERIFICATION_FAILED",
                    "The images could not be compared",
                    format!("{provider}: {message}"),
                ))
            }
            CheckInError::Directory(_) | CheckInError::Ledger(_) => ApiErrorResponse::internal(),
        }
    }
}

impl From<DirectoryError> for ApiErrorResponse {
    fn from(error: DirectoryError) -> Self {
        match error {
            DirectoryError::InvalidCode { code, reason } => {
                ApiErrorResponse::bad_request(ApiError::with_details(
                    "INVALID_EMPLOYEE_CODE",
                    format!("Invalid employee code '{code}'"),
                    reason,
                ))
            }
            DirectoryError::DuplicateCode { code } => ApiErrorResponse::new(
                StatusCode::CONFLICT,
                ApiError::new(
                    "DUPLICATE_EMPLOYEE_CODE",
                    format!("Employee code '{code}' is already registered"),
                ),
            ),
            DirectoryError::NotFound { code } => {
                ApiErrorResponse::new(StatusCode::NOT_FOUND, ApiError::employee_not_found(&code))
            }
            DirectoryError::InvalidField { field, message } => ApiErrorResponse::bad_request(
                ApiError::validation_error(format!("{field} {message}")),
            ),
            DirectoryError::InvalidPhoto(e) => {
                ApiErrorResponse::bad_request(ApiError::new("INVALID_IMAGE", e.to_string()))
            }
            DirectoryError::Storage { .. } => ApiErrorResponse::internal(),
        }
    }
}

impl From<LedgerError> for ApiErrorResponse {
    fn from(_: LedgerError) -> Self {
        ApiErrorResponse::internal()
    }
}

/// Response body for a completed check-in.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CheckInResponse {
    /// Whether the check-in was accepted.
    pub decision: bool,
    /// Similarity score in `[0.0, 1.0]`.
    pub score: f64,
    /// The threshold the score was compared against.
    pub threshold_used: f64,
    /// The employee who checked in.
    pub employee_code: String,
    /// When the attempt was recorded (RFC 3339).
    pub timestamp: DateTime<Utc>,
}

impl From<CheckInOutcome> for CheckInResponse {
    fn from(outcome: CheckInOutcome) -> Self {
        Self {
            decision: outcome.decision,
            score: outcome.score,
            threshold_used: outcome.threshold_used,
            employee_code: outcome.employee_code,
            timestamp: outcome.timestamp,
        }
    }
}

/// An employee as returned by the employee endpoints.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmployeeResponse {
    /// Unique employee code.
    pub employee_code: String,
    /// Human-readable name.
    pub display_name: String,
    /// Check-in eligibility.
    pub status: EmployeeStatus,
    /// File path of the reference photo, when stored on disk.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reference_image_path: Option<String>,
    /// When the employee was registered.
    pub created_at: DateTime<Utc>,
    /// When the employee was last modified.
    pub updated_at: DateTime<Utc>,
}

impl From<&Employee> for EmployeeResponse {
    fn from(employee: &Employee) -> Self {
        Self {
            employee_code: employee.code.to_string(),
            display_name: employee.display_name.clone(),
            status: employee.status,
            reference_image_path: employee
                .reference_image
                .location()
                .map(|path| path.display().to_string()),
            created_at: employee.created_at,
            updated_at: employee.updated_at,
        }
    }
}

/// Response body for `GET /health`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    /// Always `"ok"` when the service answers.
    pub status: String,
    /// Name of the active verification provider.
    pub provider: String,
    /// Configured similarity threshold.
    pub similarity_threshold: f64,
}
