//! HTTP API module for the rest requirement engine.
//!
//! This module provides the REST API endpoints for checking crew rest
//! between duties against the loaded flight-time-limitation rules.

mod handlers;
mod request;
mod response;
mod state;

pub use handlers::{CORRELATION_HEADER, create_router};
pub use request::{DutyRequest, RestCheckRequest, RosterRequest};
pub use response::{ApiError, ApiErrorResponse, HealthResponse};
pub use state::AppState;
