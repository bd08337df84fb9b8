//! HTTP request handlers for the rest requirement API.
//!
//! This module contains the handler functions for all API endpoints.

use std::time::Instant;

use axum::{
    Json, Router,
    extract::{State, rejection::JsonRejection},
    http::{HeaderValue, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
};
use serde::Serialize;
use tracing::{info, warn};
use uuid::Uuid;

use crate::evaluation::{Roster, check_rest, evaluate_roster};
use crate::models::{Duty, DutyTransition};

use super::request::{RestCheckRequest, RosterRequest};
use super::response::{ApiError, ApiErrorResponse, HealthResponse};
use super::state::AppState;

/// Response header carrying the per-request correlation id.
pub const CORRELATION_HEADER: &str = "x-correlation-id";

const SERVICE_NAME: &str = "rest-engine";

/// Creates the API router with all endpoints.
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/rest-check", post(rest_check_handler))
        .route("/rest-check/roster", post(roster_handler))
        .route("/health", get(health_handler))
        .route("/rules", get(rules_handler))
        .with_state(state)
}

/// Tags a response with the correlation id.
fn with_correlation(mut response: Response, correlation_id: Uuid) -> Response {
    if let Ok(value) = HeaderValue::from_str(&correlation_id.to_string()) {
        response.headers_mut().insert(CORRELATION_HEADER, value);
    }
    response
}

fn json_response<T: Serialize>(status: StatusCode, correlation_id: Uuid, body: T) -> Response {
    with_correlation((status, Json(body)).into_response(), correlation_id)
}

fn error_response(correlation_id: Uuid, err: impl Into<ApiErrorResponse>) -> Response {
    let api_error: ApiErrorResponse = err.into();
    with_correlation(api_error.into_response(), correlation_id)
}

/// Maps a body extraction failure to an API error.
fn rejection_error(rejection: JsonRejection, correlation_id: Uuid) -> ApiError {
    match rejection {
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
            ApiError::malformed_json(format!("Invalid JSON syntax: {}", err))
        }
        JsonRejection::MissingJsonContentType(_) => {
            ApiError::new("MISSING_CONTENT_TYPE", "Content-Type must be application/json")
        }
        _ => ApiError::malformed_json("Failed to parse request body"),
    }
}

/// Handler for POST /rest-check.
///
/// Evaluates a single duty transition and returns its rest check report.
async fn rest_check_handler(
    State(state): State<AppState>,
    payload: Result<Json<RestCheckRequest>, JsonRejection>,
) -> Response {
    let correlation_id = Uuid::new_v4();
    info!(correlation_id = %correlation_id, "Processing rest check request");

    let request = match payload {
        Ok(Json(req)) => req,
        Err(rejection) => {
            let error = rejection_error(rejection, correlation_id);
            return error_response(correlation_id, ApiErrorResponse::bad_request(error));
        }
    };

    let settings = state.settings();
    let selection = match request.selection(settings.default_regime) {
        Ok(selection) => selection,
        Err(err) => {
            warn!(correlation_id = %correlation_id, error = %err, "Rejected regime");
            return error_response(correlation_id, err);
        }
    };
    let options = request.options();
    let transition: DutyTransition = request.into();

    let start_time = Instant::now();
    match check_rest(&transition, selection, options, state.rules(), settings) {
        Ok(report) => {
            info!(
                correlation_id = %correlation_id,
                crew_id = transition.crew_id.as_deref().unwrap_or("-"),
                regime = %report.regime,
                classification = %report.classification,
                wocl_overlap = report.wocl_overlap,
                required_minutes = report.total_required_minutes,
                actual_minutes = report.actual_rest_minutes,
                status = %report.status,
                duration_us = start_time.elapsed().as_micros(),
                "Rest check completed"
            );
            json_response(StatusCode::OK, correlation_id, report)
        }
        Err(err) => {
            warn!(
                correlation_id = %correlation_id,
                error = %err,
                "Rest check failed"
            );
            error_response(correlation_id, err)
        }
    }
}

/// Handler for POST /rest-check/roster.
///
/// Evaluates every rest between consecutive duties on a roster.
async fn roster_handler(
    State(state): State<AppState>,
    payload: Result<Json<RosterRequest>, JsonRejection>,
) -> Response {
    let correlation_id = Uuid::new_v4();
    info!(correlation_id = %correlation_id, "Processing roster request");

    let request = match payload {
        Ok(Json(req)) => req,
        Err(rejection) => {
            let error = rejection_error(rejection, correlation_id);
            return error_response(correlation_id, ApiErrorResponse::bad_request(error));
        }
    };

    let settings = state.settings();
    let selection = match request.selection(settings.default_regime) {
        Ok(selection) => selection,
        Err(err) => {
            warn!(correlation_id = %correlation_id, error = %err, "Rejected regime");
            return error_response(correlation_id, err);
        }
    };
    let options = request.options();
    let duties: Vec<Duty> = request.duties.into_iter().map(Into::into).collect();
    let roster = Roster {
        crew_id: request.crew_id.as_deref(),
        timezone: request.timezone.as_deref(),
        duties: &duties,
    };

    let start_time = Instant::now();
    match evaluate_roster(roster, selection, options, state.rules(), settings) {
        Ok(report) => {
            info!(
                correlation_id = %correlation_id,
                crew_id = request.crew_id.as_deref().unwrap_or("-"),
                duties = duties.len(),
                overall_status = %report.overall_status,
                duration_us = start_time.elapsed().as_micros(),
                "Roster check completed"
            );
            json_response(StatusCode::OK, correlation_id, report)
        }
        Err(err) => {
            warn!(
                correlation_id = %correlation_id,
                error = %err,
                "Roster check failed"
            );
            error_response(correlation_id, err)
        }
    }
}

/// Handler for GET /health.
async fn health_handler(State(state): State<AppState>) -> impl IntoResponse {
    Json(HealthResponse {
        ok: true,
        service: SERVICE_NAME.to_string(),
        engine_version: env!("CARGO_PKG_VERSION").to_string(),
        ruleset_version: state.rules().version().to_string(),
    })
}

/// Handler for GET /rules.
///
/// Returns the loaded rule table.
async fn rules_handler(State(state): State<AppState>) -> Response {
    Json(state.rules()).into_response()
}
