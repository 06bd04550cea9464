//! HTTP request handlers for the check-in API.
//!
//! This module contains the handler functions for all API endpoints. Every
//! request gets a correlation id that is logged on each line it produces.
//! Work that touches images or storage runs on tokio's blocking pool.

use std::fmt;
use std::time::Instant;

use axum::{
    Json, Router,
    extract::{
        DefaultBodyLimit, Path, Query, State,
        rejection::{JsonRejection, QueryRejection},
    },
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
};
use tracing::{error, info, warn};
use uuid::Uuid;

use crate::directory::{EmployeeDirectory, EmployeeUpdate, NewEmployee, validate_display_name};
use crate::error::DirectoryError;
use crate::imaging::decode_image_data;
use crate::models::{EmployeeCode, ReferenceImage};

use super::request::{CheckInRequest, CreateEmployeeRequest, EventQuery, UpdateEmployeeRequest};
use super::response::{
    ApiError, ApiErrorResponse, CheckInResponse, EmployeeResponse, HealthResponse,
};
use super::state::AppState;

/// Creates the API router with all endpoints.
pub fn create_router(state: AppState) -> Router {
    let body_limit = state.max_request_bytes();

    Router::new()
        .route("/health", get(health_handler))
        .route("/api/check-in", post(check_in_handler))
        .route(
            "/api/employees",
            get(list_employees_handler).post(create_employee_handler),
        )
        .route("/api/employees/active", get(list_active_employees_handler))
        .route(
            "/api/employees/:code",
            get(get_employee_handler)
                .patch(update_employee_handler)
                .delete(delete_employee_handler),
        )
        .route("/api/attendance-events", get(list_events_handler))
        .route("/api/attendance-events/:id", get(get_event_handler))
        .layer(DefaultBodyLimit::max(body_limit))
        .with_state(state)
}

/// Handler for GET /health.
async fn health_handler(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        provider: state.pipeline().provider_name().to_string(),
        similarity_threshold: state.pipeline().threshold(),
    })
}

/// Handler for POST /api/check-in.
///
/// Validates the request, runs the check-in pipeline and returns the
/// decision.
async fn check_in_handler(
    State(state): State<AppState>,
    payload: Result<Json<CheckInRequest>, JsonRejection>,
) -> Response {
    let correlation_id = Uuid::new_v4();
    info!(correlation_id = %correlation_id, "Processing check-in request");

    let request = match payload {
        Ok(Json(request)) => request,
        Err(rejection) => return json_rejection(correlation_id, rejection).into_response(),
    };

    if let Err(error) = request.validate() {
        warn!(
            correlation_id = %correlation_id,
            error = %error.message,
            "Check-in request failed validation"
        );
        return ApiErrorResponse::bad_request(error).into_response();
    }

    let start_time = Instant::now();
    let pipeline = state.pipeline().clone();
    let CheckInRequest {
        employee_code,
        capture_image,
    } = request;

    let result = run_blocking(correlation_id, move || {
        pipeline
            .check_in(&employee_code, &capture_image)
            .map_err(|e| reject(correlation_id, e))
    })
    .await;

    match result {
        Ok(outcome) => {
            info!(
                correlation_id = %correlation_id,
                employee_code = %outcome.employee_code,
                event_id = %outcome.event_id,
                decision = outcome.decision,
                score = outcome.score,
                duration_us = start_time.elapsed().as_micros(),
                "Check-in completed"
            );
            (StatusCode::OK, Json(CheckInResponse::from(outcome))).into_response()
        }
        Err(response) => response.into_response(),
    }
}

/// Handler for GET /api/employees.
async fn list_employees_handler(
    State(state): State<AppState>,
) -> Result<Json<Vec<EmployeeResponse>>, ApiErrorResponse> {
    list_employees(&state, false)
}

/// Handler for GET /api/employees/active.
async fn list_active_employees_handler(
    State(state): State<AppState>,
) -> Result<Json<Vec<EmployeeResponse>>, ApiErrorResponse> {
    list_employees(&state, true)
}

fn list_employees(
    state: &AppState,
    active_only: bool,
) -> Result<Json<Vec<EmployeeResponse>>, ApiErrorResponse> {
    let correlation_id = Uuid::new_v4();
    let employees = state
        .directory()
        .list(active_only)
        .map_err(|e| reject(correlation_id, e))?;

    info!(
        correlation_id = %correlation_id,
        active_only,
        count = employees.len(),
        "Listed employees"
    );
    Ok(Json(employees.iter().map(EmployeeResponse::from).collect()))
}

/// Handler for POST /api/employees.
///
/// Registers an employee with an uploaded reference photo.
async fn create_employee_handler(
    State(state): State<AppState>,
    payload: Result<Json<CreateEmployeeRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<EmployeeResponse>), ApiErrorResponse> {
    let correlation_id = Uuid::new_v4();
    info!(correlation_id = %correlation_id, "Processing employee registration");

    let Json(request) = payload.map_err(|rejection| json_rejection(correlation_id, rejection))?;

    let employee = run_blocking(correlation_id, move || {
        let code = EmployeeCode::parse(&request.employee_code)
            .map_err(|e| reject(correlation_id, e))?;

        // Checked up front so a rejected request does not leave an orphaned
        // photo.
        if state
            .directory()
            .is_code_taken(&code)
            .map_err(|e| reject(correlation_id, e))?
        {
            return Err(reject(
                correlation_id,
                DirectoryError::DuplicateCode {
                    code: code.to_string(),
                },
            ));
        }
        validate_display_name(&request.display_name).map_err(|e| reject(correlation_id, e))?;

        let reference_image = store_photo(&state, &code, &request.reference_image)
            .map_err(|e| reject(correlation_id, e))?;

        state
            .directory()
            .create(NewEmployee {
                code: request.employee_code,
                display_name: request.display_name,
                status: request.status,
                reference_image,
            })
            .map_err(|e| reject(correlation_id, e))
    })
    .await?;

    info!(
        correlation_id = %correlation_id,
        employee_code = %employee.code,
        "Employee registered"
    );
    Ok((StatusCode::CREATED, Json(EmployeeResponse::from(&employee))))
}

/// Handler for GET /api/employees/:code.
async fn get_employee_handler(
    State(state): State<AppState>,
    Path(code): Path<String>,
) -> Result<Json<EmployeeResponse>, ApiErrorResponse> {
    let correlation_id = Uuid::new_v4();
    let employee = state
        .directory()
        .find_by_code(&code)
        .map_err(|e| reject(correlation_id, e))?
        .ok_or_else(|| reject(correlation_id, DirectoryError::NotFound { code }))?;

    Ok(Json(EmployeeResponse::from(&employee)))
}

/// Handler for PATCH /api/employees/:code.
async fn update_employee_handler(
    State(state): State<AppState>,
    Path(code): Path<String>,
    payload: Result<Json<UpdateEmployeeRequest>, JsonRejection>,
) -> Result<Json<EmployeeResponse>, ApiErrorResponse> {
    let correlation_id = Uuid::new_v4();
    info!(correlation_id = %correlation_id, employee_code = %code, "Processing employee update");

    let Json(request) = payload.map_err(|rejection| json_rejection(correlation_id, rejection))?;

    let employee = run_blocking(correlation_id, move || {
        let existing = state
            .directory()
            .find_by_code(&code)
            .map_err(|e| reject(correlation_id, e))?
            .ok_or_else(|| {
                reject(
                    correlation_id,
                    DirectoryError::NotFound { code: code.clone() },
                )
            })?;

        if let Some(display_name) = &request.display_name {
            validate_display_name(display_name).map_err(|e| reject(correlation_id, e))?;
        }

        let reference_image = request
            .reference_image
            .as_deref()
            .map(|data| store_photo(&state, &existing.code, data))
            .transpose()
            .map_err(|e| reject(correlation_id, e))?;

        state
            .directory()
            .update(
                &code,
                EmployeeUpdate {
                    display_name: request.display_name,
                    status: request.status,
                    reference_image,
                },
            )
            .map_err(|e| reject(correlation_id, e))
    })
    .await?;

    info!(
        correlation_id = %correlation_id,
        employee_code = %employee.code,
        status = employee.status.as_str(),
        "Employee updated"
    );
    Ok(Json(EmployeeResponse::from(&employee)))
}

/// Handler for DELETE /api/employees/:code.
///
/// Recorded attendance events are kept.
async fn delete_employee_handler(
    State(state): State<AppState>,
    Path(code): Path<String>,
) -> Result<StatusCode, ApiErrorResponse> {
    let correlation_id = Uuid::new_v4();
    state
        .directory()
        .remove(&code)
        .map_err(|e| reject(correlation_id, e))?;

    info!(correlation_id = %correlation_id, employee_code = %code, "Employee removed");
    Ok(StatusCode::NO_CONTENT)
}

/// Handler for GET /api/attendance-events.
///
/// Newest first, optionally filtered by `employee_code` and capped by
/// `limit`.
async fn list_events_handler(
    State(state): State<AppState>,
    query: Result<Query<EventQuery>, QueryRejection>,
) -> Response {
    let correlation_id = Uuid::new_v4();

    let filter = match query {
        Ok(Query(query)) => query.into_filter(),
        Err(rejection) => Err(ApiError::validation_error(rejection.body_text())),
    };
    let filter = match filter {
        Ok(filter) => filter,
        Err(error) => {
            warn!(correlation_id = %correlation_id, error = %error.message, "Invalid event query");
            return ApiErrorResponse::bad_request(error).into_response();
        }
    };

    match state.ledger().list(&filter) {
        Ok(events) => {
            info!(
                correlation_id = %correlation_id,
                employee_code = ?filter.employee_code,
                count = events.len(),
                "Listed attendance events"
            );
            Json(events).into_response()
        }
        Err(e) => reject(correlation_id, e).into_response(),
    }
}

/// Handler for GET /api/attendance-events/:id.
async fn get_event_handler(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Response {
    let correlation_id = Uuid::new_v4();

    let Ok(id) = Uuid::parse_str(&id) else {
        warn!(correlation_id = %correlation_id, id = %id, "Malformed event id");
        return ApiErrorResponse::bad_request(ApiError::validation_error(format!(
            "'{id}' is not a valid event id"
        )))
        .into_response();
    };

    match state.ledger().get(id) {
        Ok(Some(event)) => Json(event).into_response(),
        Ok(None) => ApiErrorResponse::new(
            StatusCode::NOT_FOUND,
            ApiError::new("EVENT_NOT_FOUND", format!("Attendance event not found: {id}")),
        )
        .into_response(),
        Err(e) => reject(correlation_id, e).into_response(),
    }
}

/// Validates an uploaded photo and hands it to the photo store.
fn store_photo(
    state: &AppState,
    code: &EmployeeCode,
    data: &str,
) -> Result<ReferenceImage, DirectoryError> {
    let image = decode_image_data(data)?;
    state.photos().store(code, image)
}

/// Runs `work` on the blocking pool. A panicked task becomes an opaque 500.
async fn run_blocking<T, F>(correlation_id: Uuid, work: F) -> Result<T, ApiErrorResponse>
where
    F: FnOnce() -> Result<T, ApiErrorResponse> + Send + 'static,
    T: Send + 'static,
{
    tokio::task::spawn_blocking(work).await.unwrap_or_else(|e| {
        error!(correlation_id = %correlation_id, error = %e, "Blocking task failed");
        Err(ApiErrorResponse::internal())
    })
}

/// Converts a domain error into a response, logging it first.
///
/// Server-side failures are logged with full context at `error`; the body
/// stays opaque. Client errors are logged at `warn`.
fn reject<E>(correlation_id: Uuid, error: E) -> ApiErrorResponse
where
    E: fmt::Display + Into<ApiErrorResponse>,
{
    let message = error.to_string();
    let response: ApiErrorResponse = error.into();

    if response.status.is_server_error() {
        error!(correlation_id = %correlation_id, error = %message, "Request failed");
    } else {
        warn!(
            correlation_id = %correlation_id,
            code = %response.error.code,
            error = %message,
            "Request rejected"
        );
    }
    response
}

/// Maps a JSON body rejection to an API error.
fn json_rejection(correlation_id: Uuid, rejection: JsonRejection) -> ApiErrorResponse {
    let error = match &rejection {
        JsonRejection::JsonDataError(err) => {
            let body_text = err.body_text();
            warn!(
                correlation_id = %correlation_id,
                error = %body_text,
                "JSON data error"
            );
            if body_text.contains("missing field") {
                ApiError::validation_error(body_text)
            } else {
                ApiError::malformed_json(body_text)
            }
        }
        JsonRejection::JsonSyntaxError(err) => {
            warn!(
                correlation_id = %correlation_id,
                error = %err,
                "JSON syntax error"
            );
            ApiError::malformed_json(format!("Invalid JSON syntax: {err}"))
        }
        JsonRejection::MissingJsonContentType(_) => {
            ApiError::new("MISSING_CONTENT_TYPE", "Content-Type must be application/json")
        }
        other => {
            warn!(
                correlation_id = %correlation_id,
                error = %other.body_text(),
                "Request body rejected"
            );
            return ApiErrorResponse::new(
                other.status(),
                ApiError::new("INVALID_BODY", other.body_text()),
            );
        }
    };
    ApiErrorResponse::bad_request(error)
}
