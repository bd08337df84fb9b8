//! Compliance evaluation.
//!
//! Compares actual rest against a [`RestRequirement`] and produces the
//! [`RestCheckReport`] returned to callers.

use chrono::{DateTime, Duration, FixedOffset};
use tracing::debug;

use crate::error::{EngineError, EngineResult};
use crate::models::{
    RestCheckReport, RestRequirement, RestStatus, format_minutes, minutes_to_hours,
};

/// Turns a requirement and the actual rest into a report.
#[derive(Debug, Clone)]
pub struct ComplianceEvaluator {
    ruleset_version: String,
    at_risk_tolerance_minutes: i64,
}

impl ComplianceEvaluator {
    /// Creates an evaluator stamping reports with `ruleset_version`.
    ///
    /// A shortfall of at most `at_risk_tolerance_minutes` is reported as
    /// [`RestStatus::AtRisk`]; anything larger is non-compliant.
    pub fn new(ruleset_version: impl Into<String>, at_risk_tolerance_minutes: i64) -> Self {
        Self {
            ruleset_version: ruleset_version.into(),
            at_risk_tolerance_minutes: at_risk_tolerance_minutes.max(0),
        }
    }

    /// Classifies a shortfall in minutes.
    pub fn status_for(&self, shortfall_minutes: i64) -> RestStatus {
        if shortfall_minutes <= 0 {
            RestStatus::Ok
        } else if shortfall_minutes <= self.at_risk_tolerance_minutes {
            RestStatus::AtRisk
        } else {
            RestStatus::NonCompliant
        }
    }

    /// Evaluates actual rest against a requirement.
    ///
    /// `rest_started` is when the previous duty ended; the earliest legal
    /// report time is that instant plus the total requirement. Identifiers
    /// and alternatives are left empty for the caller to fill.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::InvalidInput`] if `actual_rest_minutes` is
    /// negative.
    ///
    /// # Example
    ///
    /// ```
    /// use rest_engine::evaluation::ComplianceEvaluator;
    /// use rest_engine::models::RestStatus;
    ///
    /// let evaluator = ComplianceEvaluator::new("3.3.1", 30);
    /// assert_eq!(evaluator.status_for(0), RestStatus::Ok);
    /// assert_eq!(evaluator.status_for(30), RestStatus::AtRisk);
    /// assert_eq!(evaluator.status_for(31), RestStatus::NonCompliant);
    /// ```
    pub fn evaluate(
        &self,
        actual_rest_minutes: i64,
        requirement: RestRequirement,
        rest_started: DateTime<FixedOffset>,
    ) -> EngineResult<RestCheckReport> {
        if actual_rest_minutes < 0 {
            return Err(EngineError::invalid_input(
                "actual_rest",
                format!("actual rest of {} minutes is negative", actual_rest_minutes),
            ));
        }

        let required = requirement.total_minutes;
        let margin = actual_rest_minutes - required;
        let shortfall = (-margin).max(0);
        let status = self.status_for(shortfall);

        let mut notes = vec![format!(
            "Base requirement {} ({} {}, {})",
            format_minutes(requirement.baseline.minutes),
            requirement.regime,
            requirement.classification,
            requirement.baseline.rule
        )];
        if let Some(duty) = requirement.baseline.preceding_duty_minutes {
            if duty > requirement.baseline.minimum_minutes {
                notes.push(format!(
                    "Baseline raised to preceding duty length {}",
                    format_minutes(duty)
                ));
            }
        }
        notes.extend(
            requirement
                .applied_adjustments()
                .map(|a| format!("{} ({})", a.description, a.reason)),
        );
        if shortfall > 0 {
            notes.push(format!("Rest short by {}", format_minutes(shortfall)));
        }

        debug!(
            regime = %requirement.regime,
            required_minutes = required,
            actual_rest_minutes,
            status = %status,
            "Evaluated rest compliance"
        );

        Ok(RestCheckReport {
            crew_id: None,
            previous_duty_id: None,
            next_duty_id: None,
            ruleset_version: self.ruleset_version.clone(),
            regime: requirement.regime,
            classification: requirement.classification,
            wocl_overlap: requirement.wocl_overlap,
            night_duty: requirement.night_duty,
            baseline: requirement.baseline,
            rest_checks: requirement.adjustments,
            total_required_minutes: required,
            total_required_hours: requirement.total_hours,
            actual_rest_minutes,
            actual_rest_hours: minutes_to_hours(actual_rest_minutes),
            compliant: actual_rest_minutes >= required,
            margin_minutes: margin,
            margin_hours: minutes_to_hours(margin),
            shortfall_minutes: shortfall,
            status,
            next_earliest_report: rest_started + Duration::minutes(required),
            alternatives: Vec::new(),
            notes,
        })
    }
}
