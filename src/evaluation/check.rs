//! End-to-end rest check for a single transition.

use crate::config::{RuleSet, Settings};
use crate::error::EngineResult;
use crate::models::{DutyTransition, RegimeSelection, RestCheckReport};

use super::compliance::ComplianceEvaluator;
use super::rest_rules::{RestRuleEngine, RuleOptions};

/// Computes the requirement for a transition and checks its actual rest.
///
/// Evaluates every regime in `selection`, reports against the governing
/// one and carries the others as alternatives. The report depends only on
/// its inputs, so the same transition always produces the same report.
///
/// # Arguments
///
/// * `transition` - The rest period to check
/// * `selection` - Which regime(s) to evaluate
/// * `options` - Per-request adjustment switches
/// * `rules` - The loaded rule table
/// * `settings` - Process settings (base timezone, airports, tolerance)
///
/// # Example
///
/// ```no_run
/// use rest_engine::config::{ConfigLoader, Settings};
/// use rest_engine::evaluation::{RuleOptions, check_rest};
/// use rest_engine::models::{DutyTransition, RegimeSelection, RestStatus};
/// use chrono::DateTime;
///
/// let settings = Settings::default();
/// let loader = ConfigLoader::load(&settings.rules_path)?;
///
/// let transition = DutyTransition {
///     crew_id: Some("crew_001".to_string()),
///     previous_duty_id: None,
///     next_duty_id: None,
///     previous_duty_start: None,
///     previous_duty_end: DateTime::parse_from_rfc3339("2026-01-10T08:00:00Z").unwrap(),
///     previous_duty_planned_end: None,
///     disruption: None,
///     next_duty_start: DateTime::parse_from_rfc3339("2026-01-10T22:00:00Z").unwrap(),
///     arrival_airport: Some("JFK".to_string()),
///     departure_airport: "JFK".to_string(),
///     timezone: None,
/// };
///
/// let report = check_rest(
///     &transition,
///     RegimeSelection::Governing,
///     RuleOptions::default(),
///     loader.rules(),
///     &settings,
/// )?;
/// assert_eq!(report.status, RestStatus::Ok);
/// # Ok::<(), rest_engine::error::EngineError>(())
/// ```
pub fn check_rest(
    transition: &DutyTransition,
    selection: RegimeSelection,
    options: RuleOptions,
    rules: &RuleSet,
    settings: &Settings,
) -> EngineResult<RestCheckReport> {
    let evaluation =
        RestRuleEngine::new(rules, settings).evaluate_selection(transition, selection, options)?;

    let evaluator = ComplianceEvaluator::new(rules.version(), settings.at_risk_tolerance_minutes);
    let report = evaluator.evaluate(
        transition.rest_minutes(),
        evaluation.governing,
        transition.previous_duty_end,
    )?;

    Ok(RestCheckReport {
        crew_id: transition.crew_id.clone(),
        previous_duty_id: transition.previous_duty_id.clone(),
        next_duty_id: transition.next_duty_id.clone(),
        alternatives: evaluation.alternatives,
        ..report
    })
}
