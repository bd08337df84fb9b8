//! Evaluation logic for the rest requirement engine.
//!
//! This module contains airport classification, WOCL and night detection,
//! the rest rule engine, compliance evaluation, and roster evaluation across
//! consecutive duties.

mod airport_registry;
mod check;
mod compliance;
mod rest_rules;
mod roster;
mod wocl;

pub use airport_registry::{AirportRegistry, DEFAULT_HOME_AIRPORTS};
pub use check::check_rest;
pub use compliance::ComplianceEvaluator;
pub use rest_rules::{
    RegimeEvaluation, RestRuleEngine, RuleOptions, compute_baseline, recovery_floor,
};
pub use roster::{Roster, evaluate_roster};
pub use wocl::{
    BaseTimezone, WoclDetection, detect_window, detect_wocl, overlaps_wocl, resolve_timezone,
    window_overlap_seconds,
};
