//! Duty and duty-transition models.
//!
//! This module defines the [`DutyTransition`] evaluated by the rest engine
//! and the [`Duty`] records a roster is made of.

use chrono::{DateTime, Duration, FixedOffset};
use serde::{Deserialize, Serialize};

use crate::error::{EngineError, EngineResult};

use super::airport::validate_airport_code;

/// Longest duty or rest the engine accepts, in days.
pub const MAX_INTERVAL_DAYS: i64 = 366;

/// Why a duty ran differently from its plan.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DisruptionReason {
    /// The duty started or finished late.
    Delay,
    /// The flight landed somewhere other than planned.
    Diversion,
    /// Any other operational disruption.
    Disruption,
    /// A change that does not count as a disruption.
    Other,
}

impl DisruptionReason {
    /// Returns true if the reason can entitle the crew to disruption
    /// recovery.
    pub fn is_operational(&self) -> bool {
        !matches!(self, DisruptionReason::Other)
    }
}

impl std::fmt::Display for DisruptionReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DisruptionReason::Delay => write!(f, "delay"),
            DisruptionReason::Diversion => write!(f, "diversion"),
            DisruptionReason::Disruption => write!(f, "disruption"),
            DisruptionReason::Other => write!(f, "other"),
        }
    }
}

fn check_span(
    field: &str,
    from: DateTime<FixedOffset>,
    to: DateTime<FixedOffset>,
    what: &str,
) -> EngineResult<()> {
    if to - from > Duration::days(MAX_INTERVAL_DAYS) {
        return Err(EngineError::invalid_input(
            field,
            format!("{} is longer than {} days", what, MAX_INTERVAL_DAYS),
        ));
    }
    Ok(())
}

/// The rest period between two consecutive duties.
///
/// `arrival_airport` is where the previous duty finished and
/// `departure_airport` is where the next duty reports; together they locate
/// the rest. Timestamps carry their own UTC offset, so the rest duration is
/// independent of `timezone`, which only selects the local clock used for
/// the WOCL and night checks.
///
/// # Example
///
/// ```
/// use rest_engine::models::DutyTransition;
/// use chrono::DateTime;
///
/// let transition = DutyTransition {
///     crew_id: Some("crew_001".to_string()),
///     previous_duty_id: None,
///     next_duty_id: None,
///     previous_duty_start: None,
///     previous_duty_end: DateTime::parse_from_rfc3339("2026-03-10T20:00:00Z").unwrap(),
///     previous_duty_planned_end: None,
///     disruption: None,
///     next_duty_start: DateTime::parse_from_rfc3339("2026-03-11T08:00:00Z").unwrap(),
///     arrival_airport: Some("LHR".to_string()),
///     departure_airport: "LHR".to_string(),
///     timezone: None,
/// };
/// assert_eq!(transition.rest_minutes(), 720);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DutyTransition {
    /// Crew member the transition belongs to.
    #[serde(default)]
    pub crew_id: Option<String>,
    /// Identifier of the duty before the rest.
    #[serde(default)]
    pub previous_duty_id: Option<String>,
    /// Identifier of the duty the rest leads into.
    #[serde(default)]
    pub next_duty_id: Option<String>,
    /// Report time of the previous duty, when known.
    #[serde(default)]
    pub previous_duty_start: Option<DateTime<FixedOffset>>,
    /// When the previous duty ended (rest begins).
    pub previous_duty_end: DateTime<FixedOffset>,
    /// When the previous duty was planned to end, if it ran differently.
    #[serde(default)]
    pub previous_duty_planned_end: Option<DateTime<FixedOffset>>,
    /// Why the previous duty departed from its plan.
    #[serde(default)]
    pub disruption: Option<DisruptionReason>,
    /// When the next duty starts (rest ends).
    pub next_duty_start: DateTime<FixedOffset>,
    /// Airport where the previous duty finished.
    #[serde(default)]
    pub arrival_airport: Option<String>,
    /// Airport where the next duty reports.
    pub departure_airport: String,
    /// Timezone of the base; the configured base timezone applies when absent.
    #[serde(default)]
    pub timezone: Option<String>,
}

impl DutyTransition {
    /// Returns the rest duration in whole minutes.
    pub fn rest_minutes(&self) -> i64 {
        (self.next_duty_start - self.previous_duty_end).num_minutes()
    }

    /// Returns the length of the previous duty in whole minutes, if its
    /// start is known.
    pub fn preceding_duty_minutes(&self) -> Option<i64> {
        self.previous_duty_start
            .map(|start| (self.previous_duty_end - start).num_minutes())
    }

    /// Checks the transition before any rule is applied.
    ///
    /// Rejects a next duty that does not start strictly after the previous
    /// duty ended, a previous duty (actual or planned) with a non-positive
    /// length, rests and duties longer than [`MAX_INTERVAL_DAYS`], and
    /// airport codes that are not IATA/ICAO shaped.
    pub fn validate(&self) -> EngineResult<()> {
        if self.next_duty_start <= self.previous_duty_end {
            return Err(EngineError::invalid_input(
                "next_duty_start",
                format!(
                    "next duty start {} must be after previous duty end {}",
                    self.next_duty_start.to_rfc3339(),
                    self.previous_duty_end.to_rfc3339()
                ),
            ));
        }
        check_span(
            "next_duty_start",
            self.previous_duty_end,
            self.next_duty_start,
            "rest",
        )?;

        if let Some(start) = self.previous_duty_start {
            if start >= self.previous_duty_end {
                return Err(EngineError::invalid_input(
                    "previous_duty_start",
                    "previous duty must have a positive length",
                ));
            }
            check_span(
                "previous_duty_start",
                start,
                self.previous_duty_end,
                "previous duty",
            )?;

            if let Some(planned_end) = self.previous_duty_planned_end {
                if planned_end <= start {
                    return Err(EngineError::invalid_input(
                        "previous_duty_planned_end",
                        "planned end must be after the previous duty start",
                    ));
                }
                check_span(
                    "previous_duty_planned_end",
                    start,
                    planned_end,
                    "planned duty",
                )?;
            }
        }

        validate_airport_code("departure_airport", &self.departure_airport)?;
        if let Some(arrival) = &self.arrival_airport {
            validate_airport_code("arrival_airport", arrival)?;
        }

        if let Some(tz) = &self.timezone {
            if tz.trim().is_empty() {
                return Err(EngineError::invalid_input("timezone", "timezone is empty"));
            }
        }

        Ok(())
    }
}

/// A single duty on a crew roster.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Duty {
    /// Identifier of the duty.
    #[serde(default)]
    pub duty_id: Option<String>,
    /// Report time.
    pub start: DateTime<FixedOffset>,
    /// Off-duty time.
    pub end: DateTime<FixedOffset>,
    /// Planned off-duty time, when the duty ran differently.
    #[serde(default)]
    pub planned_end: Option<DateTime<FixedOffset>>,
    /// Why the duty departed from its plan.
    #[serde(default)]
    pub disruption: Option<DisruptionReason>,
    /// Airport the duty reports at.
    pub origin: String,
    /// Airport the duty finishes at.
    pub destination: String,
}

impl Duty {
    /// Checks one duty of a roster.
    ///
    /// `index` is the duty's position in the roster as submitted, and every
    /// error names the field as `duties[index].<field>`.
    pub fn validate(&self, index: usize) -> EngineResult<()> {
        let field = |name: &str| format!("duties[{}].{}", index, name);

        if self.end <= self.start {
            return Err(EngineError::invalid_input(
                field("end"),
                format!(
                    "duty end {} must be after its start {}",
                    self.end.to_rfc3339(),
                    self.start.to_rfc3339()
                ),
            ));
        }
        check_span(&field("end"), self.start, self.end, "duty")?;

        if let Some(planned_end) = self.planned_end {
            if planned_end <= self.start {
                return Err(EngineError::invalid_input(
                    field("planned_end"),
                    "planned end must be after the duty start",
                ));
            }
            check_span(&field("planned_end"), self.start, planned_end, "planned duty")?;
        }

        validate_airport_code(&field("origin"), &self.origin)?;
        validate_airport_code(&field("destination"), &self.destination)?;

        Ok(())
    }

    /// Builds the transition from this duty into `next`.
    pub fn transition_to(
        &self,
        next: &Duty,
        crew_id: Option<&str>,
        timezone: Option<&str>,
    ) -> DutyTransition {
        DutyTransition {
            crew_id: crew_id.map(str::to_string),
            previous_duty_id: self.duty_id.clone(),
            next_duty_id: next.duty_id.clone(),
            previous_duty_start: Some(self.start),
            previous_duty_end: self.end,
            previous_duty_planned_end: self.planned_end,
            disruption: self.disruption,
            next_duty_start: next.start,
            arrival_airport: Some(self.destination.clone()),
            departure_airport: next.origin.clone(),
            timezone: timezone.map(str::to_string),
        }
    }
}
