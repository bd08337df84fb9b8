//! Rest requirement and rest check report models.
//!
//! This module contains the [`RestRequirement`] built by the rule engine and
//! the [`RestCheckReport`] handed back to callers. The report's `rest_checks`
//! list is the audit artifact downstream systems persist, so its field set
//! and ordering are part of the public contract.

use chrono::{DateTime, FixedOffset};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::airport::AirportClass;
use super::regime::RuleRegime;

/// Converts whole minutes into decimal hours rounded to two places.
///
/// ```
/// use rest_engine::models::minutes_to_hours;
/// use rust_decimal::Decimal;
///
/// assert_eq!(minutes_to_hours(690), Decimal::new(115, 1));
/// assert_eq!(minutes_to_hours(-60), Decimal::new(-1, 0));
/// ```
pub fn minutes_to_hours(minutes: i64) -> Decimal {
    (Decimal::from(minutes) / Decimal::from(60)).round_dp(2)
}

/// Formats minutes as `"{h}h {mm}m"`, keeping the sign.
///
/// ```
/// use rest_engine::models::format_minutes;
///
/// assert_eq!(format_minutes(690), "11h 30m");
/// assert_eq!(format_minutes(-60), "-1h 00m");
/// ```
pub fn format_minutes(minutes: i64) -> String {
    let sign = if minutes < 0 { "-" } else { "" };
    let abs = minutes.abs();
    format!("{}{}h {:02}m", sign, abs / 60, abs % 60)
}

/// The family an adjustment belongs to.
///
/// Families are applied in declaration order: every WOCL row, then every
/// travel row, then the recovery floors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AdjustmentKind {
    /// Extension for a rest that overlaps the window of circadian low.
    Wocl,
    /// Travel-time extension for a rest taken away from base.
    Travel,
    /// Recovery floor after a night or disrupted duty.
    Recovery,
}

impl std::fmt::Display for AdjustmentKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AdjustmentKind::Wocl => write!(f, "WOCL"),
            AdjustmentKind::Travel => write!(f, "Travel"),
            AdjustmentKind::Recovery => write!(f, "Recovery"),
        }
    }
}

/// One rule considered during an evaluation.
///
/// Rules whose conditions did not hold stay in the list with
/// `applied == false`; only applied rows contribute to the total.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Adjustment {
    /// Stable identifier, e.g. `WOCL_OMA_HOME`.
    pub code: String,
    /// The family this rule belongs to.
    pub kind: AdjustmentKind,
    /// Human-readable description of the rule.
    pub description: String,
    /// The rule's extension in minutes. For a recovery row, the uplift
    /// needed to reach its floor.
    pub amount_minutes: i64,
    /// The rule's extension in decimal hours.
    pub amount_hours: Decimal,
    /// The rest a recovery row requires, measured from the previous duty's
    /// end.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub floor_minutes: Option<i64>,
    /// Whether the extension was added to the requirement.
    pub applied: bool,
    /// Why the rule did or did not apply.
    pub reason: String,
}

impl Adjustment {
    /// Minutes this adjustment adds to the total.
    pub fn contribution_minutes(&self) -> i64 {
        if self.applied { self.amount_minutes } else { 0 }
    }
}

/// The baseline rest before any adjustment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Baseline {
    /// Identifier of the baseline rule, e.g. `BASE_OMA_HOME`.
    pub rule: String,
    /// Human-readable description of the rule.
    pub description: String,
    /// The rule's minimum rest in minutes.
    pub minimum_minutes: i64,
    /// Length of the preceding duty when it was taken into account.
    pub preceding_duty_minutes: Option<i64>,
    /// The baseline in minutes.
    pub minutes: i64,
    /// The baseline in decimal hours.
    pub hours: Decimal,
}

/// The rest a transition requires under one regime.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RestRequirement {
    /// The regime the requirement was computed under.
    pub regime: RuleRegime,
    /// Home or Away classification of the rest location.
    pub classification: AirportClass,
    /// Whether the rest overlaps the window of circadian low.
    pub wocl_overlap: bool,
    /// Minutes of the rest inside the window.
    pub wocl_overlap_minutes: i64,
    /// Whether the duty before the rest touched the night window.
    pub night_duty: bool,
    /// The baseline requirement.
    pub baseline: Baseline,
    /// Every adjustment considered, in application order.
    pub adjustments: Vec<Adjustment>,
    /// Baseline plus applied adjustments, in minutes.
    pub total_minutes: i64,
    /// Baseline plus applied adjustments, in decimal hours.
    pub total_hours: Decimal,
}

impl RestRequirement {
    /// Returns the adjustments that contributed to the total.
    pub fn applied_adjustments(&self) -> impl Iterator<Item = &Adjustment> {
        self.adjustments.iter().filter(|a| a.applied)
    }

    /// Looks up an adjustment by code.
    pub fn adjustment(&self, code: &str) -> Option<&Adjustment> {
        self.adjustments.iter().find(|a| a.code == code)
    }
}

/// Traffic-light outcome of a rest check.
///
/// Ordered from best to worst so the worst status of a roster is its maximum.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RestStatus {
    /// Actual rest meets the requirement.
    Ok,
    /// Short of the requirement by no more than the at-risk tolerance.
    AtRisk,
    /// Short of the requirement by more than the tolerance.
    NonCompliant,
}

impl std::fmt::Display for RestStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RestStatus::Ok => write!(f, "OK"),
            RestStatus::AtRisk => write!(f, "At-Risk"),
            RestStatus::NonCompliant => write!(f, "Non-Compliant"),
        }
    }
}

/// The outcome of checking one duty transition.
///
/// `compliant` is exactly `actual_rest_minutes >= total_required_minutes`;
/// an [`RestStatus::AtRisk`] rest is not compliant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RestCheckReport {
    /// Crew member the transition belongs to.
    #[serde(default)]
    pub crew_id: Option<String>,
    /// Identifier of the duty before the rest.
    #[serde(default)]
    pub previous_duty_id: Option<String>,
    /// Identifier of the duty after the rest.
    #[serde(default)]
    pub next_duty_id: Option<String>,
    /// Version of the rule set that produced the report.
    pub ruleset_version: String,
    /// The governing regime.
    pub regime: RuleRegime,
    /// Home or Away classification of the rest location.
    pub classification: AirportClass,
    /// Whether the rest overlaps the window of circadian low.
    pub wocl_overlap: bool,
    /// Whether the duty before the rest touched the night window.
    pub night_duty: bool,
    /// The baseline requirement.
    pub baseline: Baseline,
    /// Every adjustment considered, in application order.
    pub rest_checks: Vec<Adjustment>,
    /// Total required rest in minutes.
    pub total_required_minutes: i64,
    /// Total required rest in decimal hours.
    pub total_required_hours: Decimal,
    /// Actual rest in minutes.
    pub actual_rest_minutes: i64,
    /// Actual rest in decimal hours.
    pub actual_rest_hours: Decimal,
    /// Whether actual rest meets the requirement.
    pub compliant: bool,
    /// Actual minus required, in minutes (negative when short).
    pub margin_minutes: i64,
    /// Actual minus required, in decimal hours.
    pub margin_hours: Decimal,
    /// Minutes short of the requirement (zero when compliant).
    pub shortfall_minutes: i64,
    /// Traffic-light status.
    pub status: RestStatus,
    /// Earliest report time that would satisfy the requirement.
    pub next_earliest_report: DateTime<FixedOffset>,
    /// Requirements of the regimes that did not govern.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub alternatives: Vec<RestRequirement>,
    /// Human-readable summary lines.
    pub notes: Vec<String>,
}

/// Rest checks for every consecutive pair of duties on a roster.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RosterReport {
    /// Crew member the roster belongs to.
    #[serde(default)]
    pub crew_id: Option<String>,
    /// One report per transition, in chronological order.
    pub transitions: Vec<RestCheckReport>,
    /// The worst status across all transitions.
    pub overall_status: RestStatus,
    /// Whether every transition is compliant.
    pub compliant: bool,
}
