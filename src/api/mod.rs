//! HTTP API for the attendance check-in service.
//!
//! This module provides the REST endpoints for checking in, managing the
//! employee directory, and reading the attendance ledger.

mod handlers;
mod request;
mod response;
mod state;

pub use handlers::create_router;
pub use request::{
    CheckInRequest, CreateEmployeeRequest, EventQuery, MAX_EVENT_LIMIT, UpdateEmployeeRequest,
};
pub use response::{ApiError, ApiErrorResponse, CheckInResponse, EmployeeResponse, HealthResponse};
pub use state::AppState;
