//! In-memory rule table used by unit tests.
//!
//! Mirrors `config/ftl` so unit tests do not depend on the working directory.

use chrono::{NaiveDate, NaiveTime};

use crate::models::{AdjustmentKind, AirportClass, RuleRegime};

use super::types::{
    AdjustmentRule, BaselineRule, LocalWindow, NightRules, RecoveryRule, RecoveryTrigger, RuleSet,
    RuleSetMetadata,
};

fn baseline(
    code: &str,
    regime: RuleRegime,
    classification: AirportClass,
    minimum_minutes: i64,
) -> BaselineRule {
    BaselineRule {
        code: code.to_string(),
        regime,
        classification,
        minimum_minutes,
        at_least_preceding_duty: true,
        description: format!("{} {} minimum rest", regime, classification),
    }
}

fn adjustment(
    code: &str,
    kind: AdjustmentKind,
    regime: RuleRegime,
    classification: Option<AirportClass>,
    requires_wocl: bool,
    amount_minutes: i64,
) -> AdjustmentRule {
    AdjustmentRule {
        code: code.to_string(),
        kind,
        regime,
        classification,
        requires_wocl,
        amount_minutes,
        description: format!("{} adjustment", code),
    }
}

/// Total of the adjustment rows that apply for a regime, classification and
/// WOCL outcome.
pub(crate) fn extension_minutes(
    rules: &RuleSet,
    regime: RuleRegime,
    classification: AirportClass,
    wocl_overlap: bool,
) -> i64 {
    rules
        .adjustments_for(regime)
        .filter(|a| a.applies(classification, wocl_overlap))
        .map(|a| a.amount_minutes)
        .sum()
}

pub(crate) fn standard_rules() -> RuleSet {
    let metadata = RuleSetMetadata {
        name: "Test FTL rest rules".to_string(),
        version: "3.3.1".to_string(),
        effective_date: NaiveDate::from_ymd_opt(2025, 10, 19).unwrap(),
    };

    let baselines = vec![
        baseline("BASE_EASA_HOME", RuleRegime::Easa, AirportClass::Home, 600),
        baseline("BASE_EASA_AWAY", RuleRegime::Easa, AirportClass::Away, 600),
        baseline("BASE_OMA_HOME", RuleRegime::Oma, AirportClass::Home, 720),
        baseline("BASE_OMA_AWAY", RuleRegime::Oma, AirportClass::Away, 600),
    ];

    // Travel row first to prove the rule set reorders by family.
    let adjustments = vec![
        adjustment(
            "TRAVEL_OMA_AWAY",
            AdjustmentKind::Travel,
            RuleRegime::Oma,
            Some(AirportClass::Away),
            false,
            60,
        ),
        adjustment("WOCL_EASA", AdjustmentKind::Wocl, RuleRegime::Easa, None, true, 120),
        adjustment(
            "WOCL_OMA_HOME",
            AdjustmentKind::Wocl,
            RuleRegime::Oma,
            Some(AirportClass::Home),
            true,
            60,
        ),
        adjustment(
            "WOCL_OMA_AWAY",
            AdjustmentKind::Wocl,
            RuleRegime::Oma,
            Some(AirportClass::Away),
            true,
            30,
        ),
    ];

    let night = NightRules {
        window: LocalWindow::night(),
        recovery: vec![
            RecoveryRule {
                code: "REST_AFTER_NIGHT".to_string(),
                regime: RuleRegime::Oma,
                trigger: RecoveryTrigger::NightDuty,
                minimum_minutes: 1800,
                not_before_next_day: NaiveTime::from_hms_opt(8, 0, 0),
                description: "Rest after a night duty".to_string(),
            },
            RecoveryRule {
                code: "DISRUPTION_RECOVERY".to_string(),
                regime: RuleRegime::Oma,
                trigger: RecoveryTrigger::DisruptedIntoNight,
                minimum_minutes: 1800,
                not_before_next_day: None,
                description: "Disruption recovery".to_string(),
            },
        ],
    };

    RuleSet::new(metadata, baselines, adjustments, LocalWindow::wocl()).with_night_rules(night)
}

/// Same table with every baseline at 10 hours, no preceding-duty floor and
/// no recovery floors.
pub(crate) fn flat_ten_hour_rules() -> RuleSet {
    let standard = standard_rules();
    let baselines = standard
        .baselines()
        .iter()
        .cloned()
        .map(|mut b| {
            b.minimum_minutes = 600;
            b.at_least_preceding_duty = false;
            b
        })
        .collect();
    RuleSet::new(
        standard.metadata().clone(),
        baselines,
        standard.adjustments().to_vec(),
        standard.wocl_window(),
    )
}
