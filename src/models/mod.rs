//! Core data models for the rest requirement engine.
//!
//! This module contains all the domain models used throughout the engine.

mod airport;
mod duty;
mod regime;
mod rest_check;

pub use airport::{Airport, AirportClass, normalize_airport_code, validate_airport_code};
pub use duty::{DisruptionReason, Duty, DutyTransition, MAX_INTERVAL_DAYS};
pub use regime::{RegimeSelection, RuleRegime};
pub use rest_check::{
    Adjustment, AdjustmentKind, Baseline, RestCheckReport, RestRequirement, RestStatus,
    RosterReport, format_minutes, minutes_to_hours,
};
