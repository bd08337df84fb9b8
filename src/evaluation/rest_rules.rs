//! Rest requirement rules.
//!
//! This module provides the [`RestRuleEngine`], which turns a duty transition
//! into a [`RestRequirement`] under one or more rule regimes:
//!
//! 1. Classify the rest location as Home or Away
//! 2. Look up the baseline for (regime, classification), floored by the
//!    preceding duty length when the rule asks for it
//! 3. Test the rest interval against the WOCL
//! 4. Walk the regime's adjustment rows in order (WOCL rows, then travel
//!    rows), recording every row and adding those whose conditions hold
//! 5. Classify the previous duty against the night window and raise the
//!    total to each recovery floor that applies

use chrono::{DateTime, Days, FixedOffset, Utc};
use tracing::debug;

use crate::config::{
    AdjustmentRule, BaselineRule, NightHistory, RecoveryRule, RecoveryTrigger, RuleSet, Settings,
};
use crate::error::EngineResult;
use crate::models::{
    Adjustment, AdjustmentKind, AirportClass, Baseline, DutyTransition, RegimeSelection,
    RestRequirement, RuleRegime, format_minutes, minutes_to_hours,
};

use super::wocl::{BaseTimezone, WoclDetection, detect_window, resolve_timezone};

/// Per-request switches for adjustment families.
///
/// A switched-off family is still reported, with every row marked as not
/// applied.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RuleOptions {
    /// Apply WOCL extensions.
    pub apply_wocl: bool,
    /// Apply travel-time extensions.
    pub apply_travel: bool,
    /// Apply recovery floors after night and disrupted duties.
    pub apply_recovery: bool,
}

impl RuleOptions {
    /// Every family switched off.
    pub const NONE: RuleOptions = RuleOptions {
        apply_wocl: false,
        apply_travel: false,
        apply_recovery: false,
    };

    fn enables(&self, kind: AdjustmentKind) -> bool {
        match kind {
            AdjustmentKind::Wocl => self.apply_wocl,
            AdjustmentKind::Travel => self.apply_travel,
            AdjustmentKind::Recovery => self.apply_recovery,
        }
    }
}

impl Default for RuleOptions {
    fn default() -> Self {
        Self {
            apply_wocl: true,
            apply_travel: true,
            apply_recovery: true,
        }
    }
}

/// The requirement that governs a transition and those that did not.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegimeEvaluation {
    /// The largest requirement among the evaluated regimes.
    pub governing: RestRequirement,
    /// Requirements of the other evaluated regimes, in regime order.
    pub alternatives: Vec<RestRequirement>,
}

/// Computes rest requirements from a rule table and process settings.
///
/// The engine borrows its configuration and holds no state of its own, so
/// any number of evaluations can run at once.
///
/// # Example
///
/// ```no_run
/// use rest_engine::config::{ConfigLoader, Settings};
/// use rest_engine::evaluation::{RestRuleEngine, RuleOptions};
/// use rest_engine::models::{DutyTransition, RuleRegime};
/// use chrono::DateTime;
///
/// let settings = Settings::default();
/// let loader = ConfigLoader::load(&settings.rules_path)?;
/// let engine = RestRuleEngine::new(loader.rules(), &settings);
///
/// let transition = DutyTransition {
///     crew_id: None,
///     previous_duty_id: None,
///     next_duty_id: None,
///     previous_duty_start: None,
///     previous_duty_end: DateTime::parse_from_rfc3339("2026-01-10T22:00:00Z").unwrap(),
///     previous_duty_planned_end: None,
///     disruption: None,
///     next_duty_start: DateTime::parse_from_rfc3339("2026-01-11T10:00:00Z").unwrap(),
///     arrival_airport: Some("LHR".to_string()),
///     departure_airport: "LHR".to_string(),
///     timezone: None,
/// };
///
/// let requirement = engine.evaluate(&transition, RuleRegime::Easa, RuleOptions::default())?;
/// assert_eq!(requirement.total_minutes, 12 * 60);
/// # Ok::<(), rest_engine::error::EngineError>(())
/// ```
#[derive(Debug, Clone, Copy)]
pub struct RestRuleEngine<'a> {
    rules: &'a RuleSet,
    settings: &'a Settings,
}

impl<'a> RestRuleEngine<'a> {
    /// Creates an engine over a rule table and settings.
    pub fn new(rules: &'a RuleSet, settings: &'a Settings) -> Self {
        Self { rules, settings }
    }

    /// Evaluates a transition under a regime named by string.
    ///
    /// The name is checked before anything else, so an unknown regime is
    /// reported even when the transition is also invalid.
    pub fn evaluate_named(
        &self,
        transition: &DutyTransition,
        regime: &str,
        options: RuleOptions,
    ) -> EngineResult<RestRequirement> {
        let regime: RuleRegime = regime.parse()?;
        self.evaluate(transition, regime, options)
    }

    /// Evaluates a transition under one regime.
    ///
    /// # Errors
    ///
    /// - [`EngineError::InvalidInput`](crate::error::EngineError::InvalidInput)
    ///   if the transition fails validation
    /// - [`EngineError::UnknownRegime`](crate::error::EngineError::UnknownRegime)
    ///   if the rule table has no baseline for the regime
    /// - [`EngineError::TimezoneResolution`](crate::error::EngineError::TimezoneResolution)
    ///   if the transition's or the base's timezone does not resolve
    pub fn evaluate(
        &self,
        transition: &DutyTransition,
        regime: RuleRegime,
        options: RuleOptions,
    ) -> EngineResult<RestRequirement> {
        transition.validate()?;

        let classification = self.settings.home_airports.classify_rest_location(
            transition.arrival_airport.as_deref(),
            &transition.departure_airport,
        );

        let baseline_rule = self.rules.baseline_for(regime, classification)?;
        let baseline = compute_baseline(baseline_rule, transition.preceding_duty_minutes());

        let timezone = transition
            .timezone
            .as_deref()
            .unwrap_or(&self.settings.base_timezone);
        let base = resolve_timezone(timezone)?;
        let wocl = detect_window(
            transition.previous_duty_end,
            transition.next_duty_start,
            &base,
            self.rules.wocl_window(),
        )?;

        let mut adjustments: Vec<Adjustment> = self
            .rules
            .adjustments_for(regime)
            .map(|rule| self.consider(rule, classification, &wocl, options))
            .collect();

        let mut total_minutes = baseline.minutes
            + adjustments
                .iter()
                .map(Adjustment::contribution_minutes)
                .sum::<i64>();

        let history = self.night_history(transition, &base)?;
        for rule in self.rules.recovery_for(regime) {
            let floor = recovery_floor(rule, transition.previous_duty_end, &base);
            let row =
                self.consider_recovery(rule, &history, transition, floor, total_minutes, options);
            total_minutes += row.contribution_minutes();
            adjustments.push(row);
        }

        debug!(
            regime = %regime,
            classification = %classification,
            timezone = %timezone,
            wocl_overlap = wocl.overlaps,
            wocl_overlap_minutes = wocl.overlap_minutes,
            night_duty = ?history.night_duty,
            baseline_minutes = baseline.minutes,
            total_minutes,
            "Computed rest requirement"
        );

        Ok(RestRequirement {
            regime,
            classification,
            wocl_overlap: wocl.overlaps,
            wocl_overlap_minutes: wocl.overlap_minutes,
            night_duty: history.night_duty.unwrap_or(false),
            baseline,
            adjustments,
            total_minutes,
            total_hours: minutes_to_hours(total_minutes),
        })
    }

    /// Evaluates a transition under every selected regime.
    ///
    /// The largest total governs; on a tie the regime that comes first in
    /// [`RuleRegime::ALL`] wins.
    pub fn evaluate_selection(
        &self,
        transition: &DutyTransition,
        selection: RegimeSelection,
        options: RuleOptions,
    ) -> EngineResult<RegimeEvaluation> {
        let mut requirements = selection
            .regimes()
            .into_iter()
            .map(|regime| self.evaluate(transition, regime, options))
            .collect::<EngineResult<Vec<_>>>()?;

        let governing_index = requirements
            .iter()
            .enumerate()
            .fold(0, |best, (i, r)| {
                if r.total_minutes > requirements[best].total_minutes { i } else { best }
            });
        let governing = requirements.remove(governing_index);

        if !requirements.is_empty() {
            debug!(
                selection = %selection,
                governing = %governing.regime,
                total_minutes = governing.total_minutes,
                "Selected governing regime"
            );
        }

        Ok(RegimeEvaluation {
            governing,
            alternatives: requirements,
        })
    }

    /// Classifies the previous duty, as operated and as planned, against the
    /// night window.
    fn night_history(
        &self,
        transition: &DutyTransition,
        base: &BaseTimezone,
    ) -> EngineResult<NightHistory> {
        let window = self.rules.night_rules().window;
        let touches_night = |start: DateTime<FixedOffset>, end| {
            detect_window(start, end, base, window).map(|d| d.overlaps)
        };

        let night_duty = transition
            .previous_duty_start
            .map(|start| touches_night(start, transition.previous_duty_end))
            .transpose()?;
        let planned = (
            transition.previous_duty_start,
            transition.previous_duty_planned_end,
        );
        let planned_night_duty = match planned {
            (Some(start), Some(planned_end)) => Some(touches_night(start, planned_end)?),
            _ => None,
        };

        Ok(NightHistory {
            night_duty,
            planned_night_duty,
            disrupted: transition.disruption.is_some_and(|d| d.is_operational()),
        })
    }

    fn consider(
        &self,
        rule: &AdjustmentRule,
        classification: AirportClass,
        wocl: &WoclDetection,
        options: RuleOptions,
    ) -> Adjustment {
        let window = self.rules.wocl_window();
        let applied = options.enables(rule.kind) && rule.applies(classification, wocl.overlaps);

        let reason = if !options.enables(rule.kind) {
            "disabled by request".to_string()
        } else if !rule.matches_classification(classification) {
            let wanted = rule
                .classification
                .map(|c| c.to_string())
                .unwrap_or_default();
            format!("rest location is {}, rule applies to {}", classification, wanted)
        } else if rule.requires_wocl && !applied {
            format!("rest does not overlap WOCL {}", window)
        } else if rule.requires_wocl {
            format!(
                "rest overlaps WOCL {} for {}",
                window,
                format_minutes(wocl.overlap_minutes)
            )
        } else {
            match rule.classification {
                Some(c) => format!("rest location is {}", c),
                None => "applies to every rest".to_string(),
            }
        };

        Adjustment {
            code: rule.code.clone(),
            kind: rule.kind,
            description: rule.description.clone(),
            amount_minutes: rule.amount_minutes,
            amount_hours: minutes_to_hours(rule.amount_minutes),
            floor_minutes: None,
            applied,
            reason,
        }
    }

    fn consider_recovery(
        &self,
        rule: &RecoveryRule,
        history: &NightHistory,
        transition: &DutyTransition,
        floor_minutes: i64,
        running_total: i64,
        options: RuleOptions,
    ) -> Adjustment {
        let window = self.rules.night_rules().window;
        let applied = options.enables(AdjustmentKind::Recovery) && rule.applies(history);
        let uplift = (floor_minutes - running_total).max(0);

        let reason = if !options.enables(AdjustmentKind::Recovery) {
            "disabled by request".to_string()
        } else if applied {
            let cause = match (rule.trigger, transition.disruption) {
                (RecoveryTrigger::DisruptedIntoNight, Some(reason)) => {
                    format!("{} pushed previous duty into night {}", reason, window)
                }
                _ => format!("previous duty touches night {}", window),
            };
            if uplift > 0 {
                format!("{}; rest raised to {}", cause, format_minutes(floor_minutes))
            } else {
                format!(
                    "{}; requirement already meets {}",
                    cause,
                    format_minutes(floor_minutes)
                )
            }
        } else {
            match history.night_duty {
                None => "previous duty start unknown".to_string(),
                Some(false) => format!("previous duty does not touch night {}", window),
                Some(true) => match rule.trigger {
                    RecoveryTrigger::NightDuty => format!("previous duty touches night {}", window),
                    RecoveryTrigger::DisruptedIntoNight if !history.disrupted => {
                        "no delay, diversion or disruption reported".to_string()
                    }
                    RecoveryTrigger::DisruptedIntoNight => match history.planned_night_duty {
                        None => "planned end of previous duty unknown".to_string(),
                        Some(_) => "previous duty was planned as a night duty".to_string(),
                    },
                },
            }
        };

        Adjustment {
            code: rule.code.clone(),
            kind: AdjustmentKind::Recovery,
            description: rule.description.clone(),
            amount_minutes: uplift,
            amount_hours: minutes_to_hours(uplift),
            floor_minutes: Some(floor_minutes),
            applied,
            reason,
        }
    }
}

/// Rest a recovery row requires, in minutes from the end of the previous
/// duty.
///
/// The floor is the row's minimum, or the time until `not_before_next_day`
/// on the local day after the duty ended when that is longer.
pub fn recovery_floor(
    rule: &RecoveryRule,
    previous_duty_end: DateTime<FixedOffset>,
    base: &BaseTimezone,
) -> i64 {
    let end = previous_duty_end.with_timezone(&Utc);
    let local_release = rule.not_before_next_day.and_then(|time| {
        base.local_date(end)
            .checked_add_days(Days::new(1))
            .map(|day| base.instant_at(day.and_time(time)))
    });

    match local_release {
        Some(release) => rule.minimum_minutes.max((release - end).num_minutes()),
        None => rule.minimum_minutes,
    }
}

/// Computes the baseline from its rule and the preceding duty length.
pub fn compute_baseline(rule: &BaselineRule, preceding_duty_minutes: Option<i64>) -> Baseline {
    let preceding = preceding_duty_minutes.filter(|_| rule.at_least_preceding_duty);
    let minutes = preceding.map_or(rule.minimum_minutes, |duty| duty.max(rule.minimum_minutes));

    Baseline {
        rule: rule.code.clone(),
        description: rule.description.clone(),
        minimum_minutes: rule.minimum_minutes,
        preceding_duty_minutes: preceding,
        minutes,
        hours: minutes_to_hours(minutes),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::test_support::{flat_ten_hour_rules, standard_rules};
    use crate::error::EngineError;
    use crate::models::DisruptionReason;
    use proptest::prelude::*;

    fn ts(s: &str) -> DateTime<FixedOffset> {
        DateTime::parse_from_rfc3339(s).unwrap()
    }

    fn transition(end: &str, start: &str, arrival: &str, departure: &str) -> DutyTransition {
        DutyTransition {
            crew_id: None,
            previous_duty_id: None,
            next_duty_id: None,
            previous_duty_start: None,
            previous_duty_end: ts(end),
            previous_duty_planned_end: None,
            disruption: None,
            next_duty_start: ts(start),
            arrival_airport: Some(arrival.to_string()),
            departure_airport: departure.to_string(),
            timezone: None,
        }
    }

    /// Rest 08:00-18:00 London winter time, outside the WOCL.
    fn daytime_rest(airport: &str) -> DutyTransition {
        transition("2026-01-10T08:00:00Z", "2026-01-10T18:00:00Z", airport, airport)
    }

    /// Rest 20:00-09:00 London winter time, across the WOCL.
    fn overnight_rest(airport: &str) -> DutyTransition {
        transition("2026-01-10T20:00:00Z", "2026-01-11T09:00:00Z", airport, airport)
    }

    fn codes(requirement: &RestRequirement) -> Vec<(&str, bool)> {
        requirement
            .adjustments
            .iter()
            .map(|a| (a.code.as_str(), a.applied))
            .collect()
    }

    #[test]
    fn test_easa_home_outside_wocl_is_baseline_only() {
        let rules = flat_ten_hour_rules();
        let settings = Settings::default();
        let engine = RestRuleEngine::new(&rules, &settings);

        let req = engine
            .evaluate(&daytime_rest("LHR"), RuleRegime::Easa, RuleOptions::default())
            .unwrap();

        assert_eq!(req.classification, AirportClass::Home);
        assert!(!req.wocl_overlap);
        assert_eq!(req.baseline.minutes, 600);
        assert_eq!(req.total_minutes, 600);
        assert_eq!(codes(&req), vec![("WOCL_EASA", false)]);
        assert_eq!(req.applied_adjustments().count(), 0);
    }

    #[test]
    fn test_easa_wocl_adds_two_hours_home_or_away() {
        let rules = flat_ten_hour_rules();
        let settings = Settings::default();
        let engine = RestRuleEngine::new(&rules, &settings);

        for airport in ["LHR", "JFK"] {
            let req = engine
                .evaluate(&overnight_rest(airport), RuleRegime::Easa, RuleOptions::default())
                .unwrap();
            assert!(req.wocl_overlap);
            assert_eq!(req.total_minutes, 720, "airport {}", airport);
            assert_eq!(codes(&req), vec![("WOCL_EASA", true)]);
        }
    }

    #[test]
    fn test_oma_away_with_wocl_adds_wocl_and_travel() {
        let rules = flat_ten_hour_rules();
        let settings = Settings::default();
        let engine = RestRuleEngine::new(&rules, &settings);

        let req = engine
            .evaluate(&overnight_rest("JFK"), RuleRegime::Oma, RuleOptions::default())
            .unwrap();

        assert_eq!(req.classification, AirportClass::Away);
        assert_eq!(req.total_minutes, 690);
        assert_eq!(
            codes(&req),
            vec![
                ("WOCL_OMA_HOME", false),
                ("WOCL_OMA_AWAY", true),
                ("TRAVEL_OMA_AWAY", true)
            ]
        );
    }

    #[test]
    fn test_oma_away_travel_applies_without_wocl() {
        let rules = flat_ten_hour_rules();
        let settings = Settings::default();
        let engine = RestRuleEngine::new(&rules, &settings);

        let req = engine
            .evaluate(&daytime_rest("JFK"), RuleRegime::Oma, RuleOptions::default())
            .unwrap();

        assert_eq!(req.total_minutes, 660);
        assert!(req.adjustment("TRAVEL_OMA_AWAY").unwrap().applied);
        assert!(!req.adjustment("WOCL_OMA_AWAY").unwrap().applied);
    }

    #[test]
    fn test_oma_home_without_wocl_is_baseline_only() {
        let rules = standard_rules();
        let settings = Settings::default();
        let engine = RestRuleEngine::new(&rules, &settings);

        let req = engine
            .evaluate(&daytime_rest("LGW"), RuleRegime::Oma, RuleOptions::default())
            .unwrap();

        assert_eq!(req.baseline.rule, "BASE_OMA_HOME");
        assert_eq!(req.total_minutes, req.baseline.minutes);
        assert_eq!(req.applied_adjustments().count(), 0);
        let travel = req.adjustment("TRAVEL_OMA_AWAY").unwrap();
        assert_eq!(travel.reason, "rest location is Home, rule applies to Away");
    }

    #[test]
    fn test_oma_home_with_wocl_adds_one_hour() {
        let rules = standard_rules();
        let settings = Settings::default();
        let engine = RestRuleEngine::new(&rules, &settings);

        let req = engine
            .evaluate(&overnight_rest("LCY"), RuleRegime::Oma, RuleOptions::default())
            .unwrap();

        assert_eq!(req.total_minutes, 720 + 60);
        let wocl = req.adjustment("WOCL_OMA_HOME").unwrap();
        assert!(wocl.applied);
        assert_eq!(wocl.reason, "rest overlaps WOCL 02:00-06:00 for 4h 00m");
    }

    #[test]
    fn test_away_arrival_makes_rest_away() {
        let rules = standard_rules();
        let settings = Settings::default();
        let engine = RestRuleEngine::new(&rules, &settings);

        let t = transition("2026-01-10T08:00:00Z", "2026-01-10T18:00:00Z", "CDG", "LHR");
        let req = engine.evaluate(&t, RuleRegime::Oma, RuleOptions::default()).unwrap();
        assert_eq!(req.classification, AirportClass::Away);
    }

    #[test]
    fn test_baseline_floored_by_preceding_duty() {
        let rules = standard_rules();
        let settings = Settings::default();
        let engine = RestRuleEngine::new(&rules, &settings);

        let mut t = daytime_rest("LHR");
        t.previous_duty_start = Some(ts("2026-01-09T19:00:00Z"));

        let req = engine.evaluate(&t, RuleRegime::Easa, RuleOptions::default()).unwrap();
        assert_eq!(req.baseline.minimum_minutes, 600);
        assert_eq!(req.baseline.preceding_duty_minutes, Some(13 * 60));
        assert_eq!(req.baseline.minutes, 13 * 60);
        assert_eq!(req.total_minutes, 13 * 60);
    }

    #[test]
    fn test_baseline_floor_ignored_when_rule_disables_it() {
        let rules = flat_ten_hour_rules();
        let settings = Settings::default();
        let engine = RestRuleEngine::new(&rules, &settings);

        let mut t = daytime_rest("LHR");
        t.previous_duty_start = Some(ts("2026-01-09T19:00:00Z"));

        let req = engine.evaluate(&t, RuleRegime::Easa, RuleOptions::default()).unwrap();
        assert_eq!(req.baseline.preceding_duty_minutes, None);
        assert_eq!(req.baseline.minutes, 600);
    }

    #[test]
    fn test_disabled_families_are_recorded_not_applied() {
        let rules = flat_ten_hour_rules();
        let settings = Settings::default();
        let engine = RestRuleEngine::new(&rules, &settings);

        let req = engine
            .evaluate(&overnight_rest("JFK"), RuleRegime::Oma, RuleOptions::NONE)
            .unwrap();

        assert!(req.wocl_overlap);
        assert_eq!(req.total_minutes, 600);
        assert_eq!(req.adjustments.len(), 3);
        assert!(req.adjustments.iter().all(|a| a.reason == "disabled by request"));
    }

    #[test]
    fn test_transition_timezone_overrides_base() {
        let rules = flat_ten_hour_rules();
        let settings = Settings::default();
        let engine = RestRuleEngine::new(&rules, &settings);

        // 08:00-18:00Z is 03:00-13:00 in New York winter time.
        let mut t = daytime_rest("LHR");
        t.timezone = Some("America/New_York".to_string());

        let req = engine.evaluate(&t, RuleRegime::Easa, RuleOptions::default()).unwrap();
        assert!(req.wocl_overlap);
        assert_eq!(req.wocl_overlap_minutes, 180);
    }

    #[test]
    fn test_unknown_timezone_propagates() {
        let rules = flat_ten_hour_rules();
        let settings = Settings::default();
        let engine = RestRuleEngine::new(&rules, &settings);

        let mut t = daytime_rest("LHR");
        t.timezone = Some("Moon/Base".to_string());

        let err = engine
            .evaluate(&t, RuleRegime::Easa, RuleOptions::default())
            .unwrap_err();
        assert!(matches!(err, EngineError::TimezoneResolution { .. }));
    }

    #[test]
    fn test_unknown_regime_name_is_rejected_first() {
        let rules = flat_ten_hour_rules();
        let settings = Settings::default();
        let engine = RestRuleEngine::new(&rules, &settings);

        let invalid = transition("2026-01-10T18:00:00Z", "2026-01-10T08:00:00Z", "LHR", "LHR");
        let err = engine
            .evaluate_named(&invalid, "CAA", RuleOptions::default())
            .unwrap_err();
        assert_eq!(
            err,
            EngineError::UnknownRegime {
                regime: "CAA".to_string()
            }
        );
    }

    #[test]
    fn test_invalid_transition_is_rejected() {
        let rules = flat_ten_hour_rules();
        let settings = Settings::default();
        let engine = RestRuleEngine::new(&rules, &settings);

        let invalid = transition("2026-01-10T18:00:00Z", "2026-01-10T08:00:00Z", "LHR", "LHR");
        let err = engine
            .evaluate(&invalid, RuleRegime::Oma, RuleOptions::default())
            .unwrap_err();
        assert!(matches!(err, EngineError::InvalidInput { ref field, .. } if field == "next_duty_start"));
    }

    #[test]
    fn test_governing_selection_takes_largest_total() {
        let rules = flat_ten_hour_rules();
        let settings = Settings::default();
        let engine = RestRuleEngine::new(&rules, &settings);

        // Away with WOCL: EASA 12h, OMA 11h30m.
        let eval = engine
            .evaluate_selection(
                &overnight_rest("JFK"),
                RegimeSelection::Governing,
                RuleOptions::default(),
            )
            .unwrap();
        assert_eq!(eval.governing.regime, RuleRegime::Easa);
        assert_eq!(eval.governing.total_minutes, 720);
        assert_eq!(eval.alternatives.len(), 1);
        assert_eq!(eval.alternatives[0].regime, RuleRegime::Oma);
        assert_eq!(eval.alternatives[0].total_minutes, 690);

        // Away without WOCL: EASA 10h, OMA 11h.
        let eval = engine
            .evaluate_selection(
                &daytime_rest("JFK"),
                RegimeSelection::Governing,
                RuleOptions::default(),
            )
            .unwrap();
        assert_eq!(eval.governing.regime, RuleRegime::Oma);
        assert_eq!(eval.governing.total_minutes, 660);
    }

    #[test]
    fn test_governing_tie_prefers_first_regime() {
        let rules = flat_ten_hour_rules();
        let settings = Settings::default();
        let engine = RestRuleEngine::new(&rules, &settings);

        // Home without WOCL: both 10h.
        let eval = engine
            .evaluate_selection(
                &daytime_rest("LHR"),
                RegimeSelection::Governing,
                RuleOptions::default(),
            )
            .unwrap();
        assert_eq!(eval.governing.regime, RuleRegime::Easa);
    }

    #[test]
    fn test_single_selection_has_no_alternatives() {
        let rules = flat_ten_hour_rules();
        let settings = Settings::default();
        let engine = RestRuleEngine::new(&rules, &settings);

        let eval = engine
            .evaluate_selection(
                &daytime_rest("LHR"),
                RegimeSelection::Single(RuleRegime::Oma),
                RuleOptions::default(),
            )
            .unwrap();
        assert_eq!(eval.governing.regime, RuleRegime::Oma);
        assert!(eval.alternatives.is_empty());
    }

    #[test]
    fn test_evaluation_is_repeatable() {
        let rules = standard_rules();
        let settings = Settings::default();
        let engine = RestRuleEngine::new(&rules, &settings);

        let t = overnight_rest("JFK");
        let first = engine.evaluate(&t, RuleRegime::Oma, RuleOptions::default()).unwrap();
        let second = engine.evaluate(&t, RuleRegime::Oma, RuleOptions::default()).unwrap();
        assert_eq!(first, second);
    }

    /// A duty 20:00-05:00 London winter time followed by a rest at base.
    fn after_night_duty(next_start: &str) -> DutyTransition {
        DutyTransition {
            previous_duty_start: Some(ts("2026-01-10T20:00:00Z")),
            ..transition("2026-01-11T05:00:00Z", next_start, "LHR", "LHR")
        }
    }

    /// A duty planned 14:00-23:30 that a delay pushed to 02:00.
    fn delayed_into_night(reason: DisruptionReason) -> DutyTransition {
        DutyTransition {
            previous_duty_start: Some(ts("2026-01-10T14:00:00Z")),
            previous_duty_planned_end: Some(ts("2026-01-10T23:30:00Z")),
            disruption: Some(reason),
            ..transition("2026-01-11T02:00:00Z", "2026-01-12T06:00:00Z", "LHR", "LHR")
        }
    }

    #[test]
    fn test_rest_after_night_duty_is_raised_to_thirty_hours() {
        let rules = standard_rules();
        let settings = Settings::default();
        let engine = RestRuleEngine::new(&rules, &settings);

        let t = after_night_duty("2026-01-12T08:00:00Z");
        let req = engine.evaluate(&t, RuleRegime::Oma, RuleOptions::default()).unwrap();

        assert!(req.night_duty);
        // 12h baseline + 1h WOCL, then raised to the 30h floor.
        let after_night = req.adjustment("REST_AFTER_NIGHT").unwrap();
        assert!(after_night.applied);
        assert_eq!(after_night.kind, AdjustmentKind::Recovery);
        assert_eq!(after_night.floor_minutes, Some(1800));
        assert_eq!(after_night.amount_minutes, 1800 - 780);
        assert_eq!(
            after_night.reason,
            "previous duty touches night 00:59-04:59; rest raised to 30h 00m"
        );
        assert_eq!(req.total_minutes, 1800);

        let disruption = req.adjustment("DISRUPTION_RECOVERY").unwrap();
        assert!(!disruption.applied);
        assert_eq!(disruption.reason, "no delay, diversion or disruption reported");
        assert_eq!(disruption.amount_minutes, 0);
    }

    #[test]
    fn test_recovery_rows_come_after_every_adjustment() {
        let rules = standard_rules();
        let settings = Settings::default();
        let engine = RestRuleEngine::new(&rules, &settings);

        let t = after_night_duty("2026-01-12T08:00:00Z");
        let req = engine.evaluate(&t, RuleRegime::Oma, RuleOptions::default()).unwrap();
        let kinds: Vec<AdjustmentKind> = req.adjustments.iter().map(|a| a.kind).collect();
        assert_eq!(
            kinds,
            vec![
                AdjustmentKind::Wocl,
                AdjustmentKind::Wocl,
                AdjustmentKind::Travel,
                AdjustmentKind::Recovery,
                AdjustmentKind::Recovery
            ]
        );
    }

    #[test]
    fn test_night_floor_runs_to_eight_next_morning_when_later() {
        let rules = standard_rules();
        let settings = Settings::default();
        let engine = RestRuleEngine::new(&rules, &settings);

        // Ends 01:30 local; 08:00 the next day is 30h 30m away.
        let t = DutyTransition {
            previous_duty_start: Some(ts("2026-01-10T18:00:00Z")),
            ..transition("2026-01-11T01:30:00Z", "2026-01-12T09:00:00Z", "LHR", "LHR")
        };
        let req = engine.evaluate(&t, RuleRegime::Oma, RuleOptions::default()).unwrap();

        let after_night = req.adjustment("REST_AFTER_NIGHT").unwrap();
        assert_eq!(after_night.floor_minutes, Some(30 * 60 + 30));
        assert_eq!(req.total_minutes, 30 * 60 + 30);
    }

    #[test]
    fn test_day_duty_gets_no_recovery_floor() {
        let rules = standard_rules();
        let settings = Settings::default();
        let engine = RestRuleEngine::new(&rules, &settings);

        let t = DutyTransition {
            previous_duty_start: Some(ts("2026-01-10T06:00:00Z")),
            ..transition("2026-01-10T14:00:00Z", "2026-01-11T02:00:00Z", "LHR", "LHR")
        };
        let req = engine.evaluate(&t, RuleRegime::Oma, RuleOptions::default()).unwrap();

        assert!(!req.night_duty);
        let after_night = req.adjustment("REST_AFTER_NIGHT").unwrap();
        assert!(!after_night.applied);
        assert_eq!(after_night.reason, "previous duty does not touch night 00:59-04:59");
        assert_eq!(req.total_minutes, 720);
    }

    #[test]
    fn test_unknown_previous_start_skips_recovery() {
        let rules = standard_rules();
        let settings = Settings::default();
        let engine = RestRuleEngine::new(&rules, &settings);

        let req = engine
            .evaluate(&overnight_rest("LHR"), RuleRegime::Oma, RuleOptions::default())
            .unwrap();
        assert!(!req.night_duty);
        for code in ["REST_AFTER_NIGHT", "DISRUPTION_RECOVERY"] {
            assert_eq!(req.adjustment(code).unwrap().reason, "previous duty start unknown");
        }
    }

    #[test]
    fn test_disruption_into_night_is_recognized() {
        let standard = standard_rules();
        let mut night = standard.night_rules().clone();
        night.recovery.retain(|r| r.code == "DISRUPTION_RECOVERY");
        let rules = standard.with_night_rules(night);
        let settings = Settings::default();
        let engine = RestRuleEngine::new(&rules, &settings);

        let t = delayed_into_night(DisruptionReason::Delay);
        let req = engine.evaluate(&t, RuleRegime::Oma, RuleOptions::default()).unwrap();

        let disruption = req.adjustment("DISRUPTION_RECOVERY").unwrap();
        assert!(disruption.applied);
        assert_eq!(
            disruption.reason,
            "delay pushed previous duty into night 00:59-04:59; rest raised to 30h 00m"
        );
        assert_eq!(req.total_minutes, 1800);
    }

    #[test]
    fn test_disruption_floor_needs_operational_reason_and_day_plan() {
        let rules = standard_rules();
        let settings = Settings::default();
        let engine = RestRuleEngine::new(&rules, &settings);

        let t = delayed_into_night(DisruptionReason::Other);
        let other = engine.evaluate(&t, RuleRegime::Oma, RuleOptions::default()).unwrap();
        let row = other.adjustment("DISRUPTION_RECOVERY").unwrap();
        assert!(!row.applied);
        assert_eq!(row.reason, "no delay, diversion or disruption reported");

        let planned_night = DutyTransition {
            previous_duty_planned_end: Some(ts("2026-01-11T01:30:00Z")),
            ..delayed_into_night(DisruptionReason::Diversion)
        };
        let req = engine
            .evaluate(&planned_night, RuleRegime::Oma, RuleOptions::default())
            .unwrap();
        let row = req.adjustment("DISRUPTION_RECOVERY").unwrap();
        assert!(!row.applied);
        assert_eq!(row.reason, "previous duty was planned as a night duty");

        let no_plan = DutyTransition {
            previous_duty_planned_end: None,
            ..delayed_into_night(DisruptionReason::Diversion)
        };
        let req = engine.evaluate(&no_plan, RuleRegime::Oma, RuleOptions::default()).unwrap();
        assert_eq!(
            req.adjustment("DISRUPTION_RECOVERY").unwrap().reason,
            "planned end of previous duty unknown"
        );
        // The night floor still applies on its own.
        assert!(req.adjustment("REST_AFTER_NIGHT").unwrap().applied);
    }

    #[test]
    fn test_recovery_can_be_switched_off() {
        let rules = standard_rules();
        let settings = Settings::default();
        let engine = RestRuleEngine::new(&rules, &settings);

        let options = RuleOptions {
            apply_recovery: false,
            ..RuleOptions::default()
        };
        let t = after_night_duty("2026-01-12T08:00:00Z");
        let req = engine.evaluate(&t, RuleRegime::Oma, options).unwrap();

        assert!(req.night_duty);
        assert_eq!(req.total_minutes, 780);
        let after_night = req.adjustment("REST_AFTER_NIGHT").unwrap();
        assert!(!after_night.applied);
        assert_eq!(after_night.reason, "disabled by request");
        assert_eq!(after_night.contribution_minutes(), 0);
    }

    #[test]
    fn test_easa_has_no_recovery_rows() {
        let rules = standard_rules();
        let settings = Settings::default();
        let engine = RestRuleEngine::new(&rules, &settings);

        let t = after_night_duty("2026-01-12T08:00:00Z");
        let req = engine.evaluate(&t, RuleRegime::Easa, RuleOptions::default()).unwrap();
        assert!(req.night_duty);
        assert!(req.adjustments.iter().all(|a| a.kind != AdjustmentKind::Recovery));
    }

    #[test]
    fn test_recovery_floor_follows_base_clock() {
        let rules = standard_rules();
        let rule = &rules.night_rules().recovery[0];

        // Ends 23:30Z, which is 01:30 on the next day at +02:00.
        let utc = resolve_timezone("UTC").unwrap();
        let east = resolve_timezone("+02:00").unwrap();
        let end = ts("2026-01-10T23:30:00Z");
        assert_eq!(recovery_floor(rule, end, &utc), 1800);
        assert_eq!(recovery_floor(rule, end, &east), 30 * 60 + 30);
    }

    proptest! {
        #[test]
        fn prop_total_is_baseline_plus_non_negative_adjustments(
            start_minute in 0i64..(3 * 24 * 60),
            rest in 60i64..(30 * 60),
            away in proptest::bool::ANY,
            oma in proptest::bool::ANY,
        ) {
            let rules = standard_rules();
            let settings = Settings::default();
            let engine = RestRuleEngine::new(&rules, &settings);

            let end = ts("2026-02-01T00:00:00Z") + chrono::Duration::minutes(start_minute);
            let start = end + chrono::Duration::minutes(rest);
            let airport = if away { "JFK" } else { "LHR" };
            let t = DutyTransition {
                previous_duty_end: end,
                next_duty_start: start,
                ..transition("2026-01-01T00:00:00Z", "2026-01-01T01:00:00Z", airport, airport)
            };
            let regime = if oma { RuleRegime::Oma } else { RuleRegime::Easa };

            let req = engine.evaluate(&t, regime, RuleOptions::default()).unwrap();
            prop_assert!(req.adjustments.iter().all(|a| a.amount_minutes >= 0));
            prop_assert!(req.total_minutes >= req.baseline.minutes);

            // Switching families on never lowers the total.
            let none = engine.evaluate(&t, regime, RuleOptions::NONE).unwrap();
            let wocl_only = engine
                .evaluate(&t, regime, RuleOptions { apply_wocl: true, ..RuleOptions::NONE })
                .unwrap();
            prop_assert!(none.total_minutes <= wocl_only.total_minutes);
            prop_assert!(wocl_only.total_minutes <= req.total_minutes);
        }
    }
}
