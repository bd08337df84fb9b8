//! Rule-set configuration types.
//!
//! This module contains the strongly-typed rule table deserialized from the
//! YAML files of a rule-set directory. Baselines and adjustment amounts are
//! data so they can be corrected without touching engine logic.

use std::collections::BTreeSet;

use chrono::{NaiveDate, NaiveTime};
use serde::{Deserialize, Serialize};

use crate::error::{EngineError, EngineResult};
use crate::models::{AdjustmentKind, AirportClass, RuleRegime};

/// Metadata identifying a rule set.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RuleSetMetadata {
    /// Short name of the rule set.
    pub name: String,
    /// Version reported by the health endpoint and stamped on every report.
    pub version: String,
    /// Date from which the rule set applies.
    pub effective_date: NaiveDate,
}

/// The baseline rest for one (regime, classification) pair.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BaselineRule {
    /// Stable identifier, e.g. `BASE_OMA_HOME`.
    pub code: String,
    /// The regime this row belongs to.
    pub regime: RuleRegime,
    /// The rest location classification this row applies to.
    pub classification: AirportClass,
    /// Minimum rest in minutes.
    pub minimum_minutes: i64,
    /// When set, the baseline is at least as long as the preceding duty.
    #[serde(default)]
    pub at_least_preceding_duty: bool,
    /// Human-readable description.
    pub description: String,
}

/// One row of the adjustment table.
///
/// A row applies when the regime matches, the classification matches (or
/// the row has none) and, for rows with `requires_wocl`, the rest overlaps
/// the window of circadian low.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AdjustmentRule {
    /// Stable identifier, e.g. `WOCL_OMA_AWAY`.
    pub code: String,
    /// The family the row belongs to.
    pub kind: AdjustmentKind,
    /// The regime this row belongs to.
    pub regime: RuleRegime,
    /// Restricts the row to one classification; `None` means either.
    #[serde(default)]
    pub classification: Option<AirportClass>,
    /// Whether the row needs a WOCL overlap to apply.
    #[serde(default)]
    pub requires_wocl: bool,
    /// Extension in minutes.
    pub amount_minutes: i64,
    /// Human-readable description.
    pub description: String,
}

impl AdjustmentRule {
    /// Returns true if the row's classification condition holds.
    pub fn matches_classification(&self, classification: AirportClass) -> bool {
        self.classification.is_none_or(|c| c == classification)
    }

    /// Returns true if every condition of the row holds.
    pub fn applies(&self, classification: AirportClass, wocl_overlap: bool) -> bool {
        self.matches_classification(classification) && (!self.requires_wocl || wocl_overlap)
    }
}

/// A half-open window of local time, `[start, end)`.
///
/// When `end` is not after `start` the window wraps past midnight. The rule
/// table uses one for the window of circadian low and one for night duties.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LocalWindow {
    /// First minute inside the window.
    pub start: NaiveTime,
    /// First minute after the window.
    pub end: NaiveTime,
}

impl LocalWindow {
    /// The standard window of circadian low, 02:00-06:00.
    pub fn wocl() -> Self {
        Self::between(2, 0, 6, 0)
    }

    /// The standard night window, 00:59-04:59. A duty touching it is a
    /// night duty.
    pub fn night() -> Self {
        Self::between(0, 59, 4, 59)
    }

    fn between(start_hour: u32, start_minute: u32, end_hour: u32, end_minute: u32) -> Self {
        Self {
            start: NaiveTime::from_hms_opt(start_hour, start_minute, 0).unwrap_or_default(),
            end: NaiveTime::from_hms_opt(end_hour, end_minute, 0).unwrap_or_default(),
        }
    }

    /// Returns true if the window runs past midnight.
    pub fn wraps_midnight(&self) -> bool {
        self.end <= self.start
    }

    /// Returns true if the window contains no time at all.
    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }
}

impl std::fmt::Display for LocalWindow {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}-{}", self.start.format("%H:%M"), self.end.format("%H:%M"))
    }
}

/// What makes a recovery floor apply to a rest.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RecoveryTrigger {
    /// The duty before the rest touched the night window.
    NightDuty,
    /// A delay, diversion or disruption pushed a duty planned outside the
    /// night window into it.
    DisruptedIntoNight,
}

impl std::fmt::Display for RecoveryTrigger {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RecoveryTrigger::NightDuty => write!(f, "night duty"),
            RecoveryTrigger::DisruptedIntoNight => write!(f, "disrupted into night"),
        }
    }
}

/// How the duty before a rest relates to the night window.
///
/// `None` means the engine could not tell, e.g. because the duty's start or
/// planned end was not supplied.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct NightHistory {
    /// Whether the duty as operated touched the night window.
    pub night_duty: Option<bool>,
    /// Whether the duty as planned touched the night window.
    pub planned_night_duty: Option<bool>,
    /// Whether the duty carries a delay, diversion or disruption.
    pub disrupted: bool,
}

/// A minimum rest that replaces the computed requirement when it is longer.
///
/// Unlike an adjustment row, a recovery row does not add a fixed amount. It
/// raises the running total to its floor, measured from the end of the
/// previous duty.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecoveryRule {
    /// Stable identifier, e.g. `REST_AFTER_NIGHT`.
    pub code: String,
    /// The regime this row belongs to.
    pub regime: RuleRegime,
    /// The condition under which the floor applies.
    pub trigger: RecoveryTrigger,
    /// The floor in minutes.
    pub minimum_minutes: i64,
    /// When set, the rest also lasts until this local time on the day after
    /// the previous duty ended, if that is later.
    #[serde(default)]
    pub not_before_next_day: Option<NaiveTime>,
    /// Human-readable description.
    pub description: String,
}

impl RecoveryRule {
    /// Returns true if the row's trigger holds for the previous duty.
    pub fn applies(&self, history: &NightHistory) -> bool {
        match self.trigger {
            RecoveryTrigger::NightDuty => history.night_duty == Some(true),
            RecoveryTrigger::DisruptedIntoNight => {
                history.disrupted
                    && history.night_duty == Some(true)
                    && history.planned_night_duty == Some(false)
            }
        }
    }
}

/// `night.yaml` file structure: the night window and the recovery floors
/// that follow night duties.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NightRules {
    /// Local window that makes a duty a night duty.
    pub window: LocalWindow,
    /// Recovery rows in table order.
    #[serde(default)]
    pub recovery: Vec<RecoveryRule>,
}

impl Default for NightRules {
    fn default() -> Self {
        Self {
            window: LocalWindow::night(),
            recovery: Vec::new(),
        }
    }
}

/// `baselines.yaml` file structure.
#[derive(Debug, Clone, Deserialize)]
pub struct BaselinesConfig {
    /// Baseline rows.
    pub baselines: Vec<BaselineRule>,
}

/// `adjustments.yaml` file structure.
#[derive(Debug, Clone, Deserialize)]
pub struct AdjustmentsConfig {
    /// Adjustment rows, in table order.
    pub adjustments: Vec<AdjustmentRule>,
}

/// `wocl.yaml` file structure.
#[derive(Debug, Clone, Deserialize)]
pub struct WoclConfig {
    /// The window of circadian low.
    pub wocl: LocalWindow,
}

/// The complete rule table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RuleSet {
    /// Rule-set metadata.
    metadata: RuleSetMetadata,
    /// Baseline rows.
    baselines: Vec<BaselineRule>,
    /// Adjustment rows in application order.
    adjustments: Vec<AdjustmentRule>,
    /// The window of circadian low.
    wocl: LocalWindow,
    /// Night window and recovery floors.
    night: NightRules,
}

impl RuleSet {
    /// Creates a rule set from its component parts.
    ///
    /// Adjustment rows are stably ordered by family, so every WOCL row comes
    /// before every travel row while table order is kept within a family.
    pub fn new(
        metadata: RuleSetMetadata,
        baselines: Vec<BaselineRule>,
        adjustments: Vec<AdjustmentRule>,
        wocl: LocalWindow,
    ) -> Self {
        let mut ordered = adjustments;
        ordered.sort_by_key(|rule| rule.kind);
        Self {
            metadata,
            baselines,
            adjustments: ordered,
            wocl,
            night: NightRules::default(),
        }
    }

    /// Replaces the night window and recovery floors.
    pub fn with_night_rules(mut self, night: NightRules) -> Self {
        self.night = night;
        self
    }

    /// Returns the rule-set metadata.
    pub fn metadata(&self) -> &RuleSetMetadata {
        &self.metadata
    }

    /// Returns the rule-set version.
    pub fn version(&self) -> &str {
        &self.metadata.version
    }

    /// Returns all baseline rows.
    pub fn baselines(&self) -> &[BaselineRule] {
        &self.baselines
    }

    /// Returns all adjustment rows in application order.
    pub fn adjustments(&self) -> &[AdjustmentRule] {
        &self.adjustments
    }

    /// Returns the window of circadian low.
    pub fn wocl_window(&self) -> LocalWindow {
        self.wocl
    }

    /// Returns the night window and recovery floors.
    pub fn night_rules(&self) -> &NightRules {
        &self.night
    }

    /// Returns the recovery rows of a regime in table order.
    pub fn recovery_for(&self, regime: RuleRegime) -> impl Iterator<Item = &RecoveryRule> {
        self.night.recovery.iter().filter(move |r| r.regime == regime)
    }

    /// Returns the regimes the table defines baselines for.
    pub fn regimes(&self) -> BTreeSet<RuleRegime> {
        self.baselines.iter().map(|b| b.regime).collect()
    }

    /// Finds the baseline row for a regime and classification.
    ///
    /// A regime without baseline rows is not part of this rule set and is
    /// reported as [`EngineError::UnknownRegime`].
    pub fn baseline_for(
        &self,
        regime: RuleRegime,
        classification: AirportClass,
    ) -> EngineResult<&BaselineRule> {
        self.baselines
            .iter()
            .find(|b| b.regime == regime && b.classification == classification)
            .ok_or_else(|| EngineError::UnknownRegime {
                regime: regime.to_string(),
            })
    }

    /// Returns the adjustment rows of a regime in application order.
    pub fn adjustments_for(&self, regime: RuleRegime) -> impl Iterator<Item = &AdjustmentRule> {
        self.adjustments.iter().filter(move |a| a.regime == regime)
    }

    /// Checks the table for internal consistency.
    ///
    /// Every regime needs exactly one baseline per classification. Amounts
    /// and floors must be non-negative, every row must refer to a regime with
    /// baselines, codes must be unique, and neither window may be empty.
    pub fn validate(&self) -> Result<(), String> {
        for regime in self.regimes() {
            for classification in [AirportClass::Home, AirportClass::Away] {
                let count = self
                    .baselines
                    .iter()
                    .filter(|b| b.regime == regime && b.classification == classification)
                    .count();
                if count != 1 {
                    return Err(format!(
                        "expected one {} baseline for {}, found {}",
                        classification, regime, count
                    ));
                }
            }
        }

        if let Some(b) = self.baselines.iter().find(|b| b.minimum_minutes < 0) {
            return Err(format!("baseline {} has a negative minimum", b.code));
        }

        for rule in &self.adjustments {
            if rule.amount_minutes < 0 {
                return Err(format!("adjustment {} has a negative amount", rule.code));
            }
            if !self.regimes().contains(&rule.regime) {
                return Err(format!(
                    "adjustment {} refers to regime {} which has no baseline",
                    rule.code, rule.regime
                ));
            }
        }

        for rule in &self.night.recovery {
            if rule.minimum_minutes < 0 {
                return Err(format!("recovery {} has a negative minimum", rule.code));
            }
            if !self.regimes().contains(&rule.regime) {
                return Err(format!(
                    "recovery {} refers to regime {} which has no baseline",
                    rule.code, rule.regime
                ));
            }
        }

        let mut codes = BTreeSet::new();
        let all_codes = self
            .baselines
            .iter()
            .map(|b| &b.code)
            .chain(self.adjustments.iter().map(|a| &a.code))
            .chain(self.night.recovery.iter().map(|r| &r.code));
        for code in all_codes {
            if !codes.insert(code) {
                return Err(format!("duplicate rule code {}", code));
            }
        }

        if self.wocl.is_empty() {
            return Err("WOCL window is empty".to_string());
        }
        if self.night.window.is_empty() {
            return Err("night window is empty".to_string());
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::test_support::{extension_minutes, standard_rules};

    #[test]
    fn test_adjustments_are_ordered_wocl_before_travel() {
        let rules = standard_rules();
        let codes: Vec<&str> = rules
            .adjustments_for(RuleRegime::Oma)
            .map(|a| a.code.as_str())
            .collect();
        assert_eq!(codes, vec!["WOCL_OMA_HOME", "WOCL_OMA_AWAY", "TRAVEL_OMA_AWAY"]);
    }

    #[test]
    fn test_extension_table() {
        let rules = standard_rules();
        let cases = [
            (RuleRegime::Easa, AirportClass::Home, false, 0),
            (RuleRegime::Easa, AirportClass::Home, true, 120),
            (RuleRegime::Easa, AirportClass::Away, true, 120),
            (RuleRegime::Easa, AirportClass::Away, false, 0),
            (RuleRegime::Oma, AirportClass::Home, false, 0),
            (RuleRegime::Oma, AirportClass::Home, true, 60),
            (RuleRegime::Oma, AirportClass::Away, false, 60),
            (RuleRegime::Oma, AirportClass::Away, true, 90),
        ];
        for (regime, class, wocl, expected) in cases {
            assert_eq!(
                extension_minutes(&rules, regime, class, wocl),
                expected,
                "{} {} wocl={}",
                regime,
                class,
                wocl
            );
        }
    }

    #[test]
    fn test_baseline_lookup() {
        let rules = standard_rules();
        let baseline = rules.baseline_for(RuleRegime::Oma, AirportClass::Home).unwrap();
        assert_eq!(baseline.code, "BASE_OMA_HOME");
        assert_eq!(baseline.minimum_minutes, 720);
    }

    #[test]
    fn test_missing_regime_is_unknown() {
        let mut rules = standard_rules();
        rules.baselines.retain(|b| b.regime != RuleRegime::Easa);
        rules.adjustments.retain(|a| a.regime != RuleRegime::Easa);
        rules.night.recovery.retain(|r| r.regime != RuleRegime::Easa);
        let err = rules
            .baseline_for(RuleRegime::Easa, AirportClass::Home)
            .unwrap_err();
        assert_eq!(
            err,
            EngineError::UnknownRegime {
                regime: "EASA".to_string()
            }
        );
        assert!(rules.validate().is_ok());
    }

    #[test]
    fn test_standard_rules_validate() {
        assert!(standard_rules().validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_negative_amount() {
        let mut rules = standard_rules();
        rules.adjustments[0].amount_minutes = -30;
        assert!(rules.validate().unwrap_err().contains("negative amount"));
    }

    #[test]
    fn test_validate_rejects_missing_classification() {
        let mut rules = standard_rules();
        rules.baselines.retain(|b| b.code != "BASE_EASA_AWAY");
        assert!(rules.validate().unwrap_err().contains("Away baseline for EASA"));
    }

    #[test]
    fn test_validate_rejects_duplicate_codes() {
        let mut rules = standard_rules();
        rules.adjustments[1].code = rules.adjustments[0].code.clone();
        assert!(rules.validate().unwrap_err().contains("duplicate"));
    }

    #[test]
    fn test_standard_windows() {
        let wocl = LocalWindow::wocl();
        assert_eq!(wocl.start, NaiveTime::from_hms_opt(2, 0, 0).unwrap());
        assert_eq!(wocl.end, NaiveTime::from_hms_opt(6, 0, 0).unwrap());
        assert!(!wocl.wraps_midnight());
        assert_eq!(wocl.to_string(), "02:00-06:00");
        assert_eq!(LocalWindow::night().to_string(), "00:59-04:59");
    }

    #[test]
    fn test_recovery_rows_belong_to_oma() {
        let rules = standard_rules();
        let codes: Vec<&str> = rules
            .recovery_for(RuleRegime::Oma)
            .map(|r| r.code.as_str())
            .collect();
        assert_eq!(codes, vec!["REST_AFTER_NIGHT", "DISRUPTION_RECOVERY"]);
        assert_eq!(rules.recovery_for(RuleRegime::Easa).count(), 0);
    }

    #[test]
    fn test_recovery_triggers() {
        let rules = standard_rules();
        let after_night = &rules.night_rules().recovery[0];
        let disruption = &rules.night_rules().recovery[1];

        let unknown = NightHistory::default();
        assert!(!after_night.applies(&unknown));
        assert!(!disruption.applies(&unknown));

        let planned_night = NightHistory {
            night_duty: Some(true),
            planned_night_duty: Some(true),
            disrupted: true,
        };
        assert!(after_night.applies(&planned_night));
        assert!(!disruption.applies(&planned_night));

        let pushed_into_night = NightHistory {
            planned_night_duty: Some(false),
            ..planned_night
        };
        assert!(disruption.applies(&pushed_into_night));

        let undisrupted = NightHistory {
            disrupted: false,
            ..pushed_into_night
        };
        assert!(!disruption.applies(&undisrupted));
    }

    #[test]
    fn test_validate_rejects_recovery_for_unknown_regime() {
        let mut rules = standard_rules();
        rules.baselines.retain(|b| b.regime != RuleRegime::Oma);
        rules.adjustments.retain(|a| a.regime != RuleRegime::Oma);
        assert!(rules.validate().unwrap_err().contains("recovery REST_AFTER_NIGHT"));
    }

    #[test]
    fn test_validate_rejects_duplicate_recovery_code() {
        let mut rules = standard_rules();
        rules.night.recovery[1].code = "BASE_OMA_HOME".to_string();
        assert!(rules.validate().unwrap_err().contains("duplicate rule code BASE_OMA_HOME"));
    }

    #[test]
    fn test_validate_rejects_empty_night_window() {
        let mut rules = standard_rules();
        rules.night.window.end = rules.night.window.start;
        assert_eq!(rules.validate().unwrap_err(), "night window is empty");
    }
}
