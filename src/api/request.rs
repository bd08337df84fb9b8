//! Request types for the rest requirement API.
//!
//! This module defines the JSON request structures for the `/rest-check`
//! and `/rest-check/roster` endpoints.

use chrono::{DateTime, FixedOffset};
use serde::{Deserialize, Serialize};

use crate::error::EngineResult;
use crate::evaluation::RuleOptions;
use crate::models::{DisruptionReason, Duty, DutyTransition, RegimeSelection};

fn default_true() -> bool {
    true
}

/// Resolves an optional regime name against the configured default.
fn resolve_selection(
    regime: Option<&str>,
    default: RegimeSelection,
) -> EngineResult<RegimeSelection> {
    match regime {
        Some(name) => name.parse(),
        None => Ok(default),
    }
}

/// Request body for the `/rest-check` endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RestCheckRequest {
    /// Crew member the transition belongs to.
    #[serde(default)]
    pub crew_id: Option<String>,
    /// Identifier of the duty before the rest.
    #[serde(default)]
    pub previous_duty_id: Option<String>,
    /// Identifier of the duty after the rest.
    #[serde(default)]
    pub next_duty_id: Option<String>,
    /// Report time of the previous duty.
    #[serde(default)]
    pub previous_duty_start: Option<DateTime<FixedOffset>>,
    /// When the previous duty ended.
    pub previous_duty_end: DateTime<FixedOffset>,
    /// When the previous duty was rostered to end.
    #[serde(default)]
    pub previous_duty_planned_end: Option<DateTime<FixedOffset>>,
    /// Why the previous duty ran past its planned end.
    #[serde(default)]
    pub disruption: Option<DisruptionReason>,
    /// When the next duty starts.
    pub next_duty_start: DateTime<FixedOffset>,
    /// Airport where the previous duty finished.
    #[serde(default)]
    pub arrival_airport: Option<String>,
    /// Airport where the next duty reports.
    pub departure_airport: String,
    /// Timezone of the base.
    #[serde(default)]
    pub timezone: Option<String>,
    /// `EASA`, `OMA` or `GOVERNING`; the configured default when absent.
    #[serde(default)]
    pub regime: Option<String>,
    /// Apply WOCL extensions.
    #[serde(default = "default_true")]
    pub apply_wocl: bool,
    /// Apply travel-time extensions.
    #[serde(default = "default_true")]
    pub apply_travel: bool,
    /// Apply night recovery floors.
    #[serde(default = "default_true")]
    pub apply_recovery: bool,
}

impl RestCheckRequest {
    /// The regime selection for this request.
    pub fn selection(&self, default: RegimeSelection) -> EngineResult<RegimeSelection> {
        resolve_selection(self.regime.as_deref(), default)
    }

    /// The adjustment switches for this request.
    pub fn options(&self) -> RuleOptions {
        RuleOptions {
            apply_wocl: self.apply_wocl,
            apply_travel: self.apply_travel,
            apply_recovery: self.apply_recovery,
        }
    }
}

impl From<RestCheckRequest> for DutyTransition {
    fn from(req: RestCheckRequest) -> Self {
        DutyTransition {
            crew_id: req.crew_id,
            previous_duty_id: req.previous_duty_id,
            next_duty_id: req.next_duty_id,
            previous_duty_start: req.previous_duty_start,
            previous_duty_end: req.previous_duty_end,
            previous_duty_planned_end: req.previous_duty_planned_end,
            disruption: req.disruption,
            next_duty_start: req.next_duty_start,
            arrival_airport: req.arrival_airport,
            departure_airport: req.departure_airport,
            timezone: req.timezone,
        }
    }
}

/// Request body for the `/rest-check/roster` endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RosterRequest {
    /// Crew member the roster belongs to.
    #[serde(default)]
    pub crew_id: Option<String>,
    /// Timezone of the base.
    #[serde(default)]
    pub timezone: Option<String>,
    /// `EASA`, `OMA` or `GOVERNING`; the configured default when absent.
    #[serde(default)]
    pub regime: Option<String>,
    /// Apply WOCL extensions.
    #[serde(default = "default_true")]
    pub apply_wocl: bool,
    /// Apply travel-time extensions.
    #[serde(default = "default_true")]
    pub apply_travel: bool,
    /// Apply night recovery floors.
    #[serde(default = "default_true")]
    pub apply_recovery: bool,
    /// The duties on the roster, in any order.
    pub duties: Vec<DutyRequest>,
}

impl RosterRequest {
    /// The regime selection for this request.
    pub fn selection(&self, default: RegimeSelection) -> EngineResult<RegimeSelection> {
        resolve_selection(self.regime.as_deref(), default)
    }

    /// The adjustment switches for this request.
    pub fn options(&self) -> RuleOptions {
        RuleOptions {
            apply_wocl: self.apply_wocl,
            apply_travel: self.apply_travel,
            apply_recovery: self.apply_recovery,
        }
    }
}

/// A duty in a roster request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DutyRequest {
    /// Identifier of the duty.
    #[serde(default)]
    pub duty_id: Option<String>,
    /// Report time.
    pub start: DateTime<FixedOffset>,
    /// Off-duty time.
    pub end: DateTime<FixedOffset>,
    /// Rostered off-duty time, when the duty ran late.
    #[serde(default)]
    pub planned_end: Option<DateTime<FixedOffset>>,
    /// Why the duty ran past its planned end.
    #[serde(default)]
    pub disruption: Option<DisruptionReason>,
    /// Airport the duty reports at.
    pub origin: String,
    /// Airport the duty finishes at.
    pub destination: String,
}

impl From<DutyRequest> for Duty {
    fn from(req: DutyRequest) -> Self {
        Duty {
            duty_id: req.duty_id,
            start: req.start,
            end: req.end,
            planned_end: req.planned_end,
            disruption: req.disruption,
            origin: req.origin,
            destination: req.destination,
        }
    }
}
