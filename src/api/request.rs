//! Request types for the check-in API.
//!
//! This module defines the JSON request bodies and query strings accepted by
//! the HTTP endpoints.

use serde::{Deserialize, Serialize};

use crate::ledger::EventFilter;
use crate::models::{EmployeeStatus, MAX_CODE_LEN};

use super::response::ApiError;

/// Largest page size for event listings.
pub const MAX_EVENT_LIMIT: usize = 1000;

/// Request body for the `/api/check-in` endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CheckInRequest {
    /// Code of the employee checking in.
    pub employee_code: String,
    /// The captured photo as a data-URI or raw base64.
    pub capture_image: String,
}

impl CheckInRequest {
    /// Checks field presence and length before the pipeline runs.
    pub fn validate(&self) -> Result<(), ApiError> {
        if self.employee_code.trim().is_empty() {
            return Err(ApiError::validation_error("employee_code must not be empty"));
        }
        if self.employee_code.chars().count() > MAX_CODE_LEN {
            return Err(ApiError::validation_error(format!(
                "employee_code must be at most {MAX_CODE_LEN} characters"
            )));
        }
        if self.capture_image.trim().is_empty() {
            return Err(ApiError::validation_error("capture_image must not be empty"));
        }
        Ok(())
    }
}

/// Request body for `POST /api/employees`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CreateEmployeeRequest {
    /// Unique employee code.
    pub employee_code: String,
    /// Human-readable name.
    pub display_name: String,
    /// Initial status; active when omitted.
    #[serde(default)]
    pub status: EmployeeStatus,
    /// Reference photo as a data-URI or raw base64.
    pub reference_image: String,
}

/// Request body for `PATCH /api/employees/:code`.
///
/// Omitted fields are left unchanged.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct UpdateEmployeeRequest {
    /// New display name.
    #[serde(default)]
    pub display_name: Option<String>,
    /// New status.
    #[serde(default)]
    pub status: Option<EmployeeStatus>,
    /// Replacement reference photo as a data-URI or raw base64.
    #[serde(default)]
    pub reference_image: Option<String>,
}

/// Query string for `GET /api/attendance-events`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct EventQuery {
    /// Only events for this employee.
    pub employee_code: Option<String>,
    /// Maximum number of events to return.
    pub limit: Option<usize>,
}

impl EventQuery {
    /// Converts the query into a ledger filter.
    pub fn into_filter(self) -> Result<EventFilter, ApiError> {
        if matches!(self.limit, Some(limit) if limit == 0 || limit > MAX_EVENT_LIMIT) {
            return Err(ApiError::validation_error(format!(
                "limit must be between 1 and {MAX_EVENT_LIMIT}"
            )));
        }

        Ok(EventFilter {
            employee_code: self.employee_code.filter(|code| !code.is_empty()),
            limit: self.limit,
        })
    }
}
