//! Roster evaluation.
//!
//! Checks every rest on a crew roster by pairing consecutive duties.

use tracing::debug;

use crate::config::{RuleSet, Settings};
use crate::error::{EngineError, EngineResult};
use crate::models::{Duty, RegimeSelection, RestStatus, RosterReport};

use super::check::check_rest;
use super::rest_rules::RuleOptions;

/// A crew roster to evaluate.
#[derive(Debug, Clone, Copy)]
pub struct Roster<'a> {
    /// Crew member the roster belongs to.
    pub crew_id: Option<&'a str>,
    /// Timezone of the base, when it differs from the configured one.
    pub timezone: Option<&'a str>,
    /// The duties, in any order.
    pub duties: &'a [Duty],
}

/// Evaluates every consecutive pair of duties on a roster.
///
/// Duties are sorted by report time. Each pair becomes a transition from
/// the earlier duty's off-duty time and destination to the later duty's
/// report time and origin. The overall status is the worst transition
/// status; fewer than two duties give an empty, compliant report.
///
/// Errors name the offending field by the duty's position in `duties` as
/// submitted, e.g. `duties[2].end`, whatever its place after sorting.
///
/// # Errors
///
/// Returns [`EngineError::InvalidInput`] if a duty is invalid on its own or
/// two duties overlap, plus any error a single transition check can raise.
pub fn evaluate_roster(
    roster: Roster<'_>,
    selection: RegimeSelection,
    options: RuleOptions,
    rules: &RuleSet,
    settings: &Settings,
) -> EngineResult<RosterReport> {
    for (index, duty) in roster.duties.iter().enumerate() {
        duty.validate(index)?;
    }

    let mut duties: Vec<(usize, &Duty)> = roster.duties.iter().enumerate().collect();
    duties.sort_by_key(|(index, duty)| (duty.start, *index));

    let transitions = duties
        .windows(2)
        .map(|pair| {
            let ((previous_index, previous), (next_index, next)) = (pair[0], pair[1]);
            if next.start < previous.end {
                return Err(EngineError::invalid_input(
                    format!("duties[{}].start", next_index),
                    format!(
                        "duty starting {} overlaps duties[{}], which ends {}",
                        next.start.to_rfc3339(),
                        previous_index,
                        previous.end.to_rfc3339()
                    ),
                ));
            }
            let transition = previous.transition_to(next, roster.crew_id, roster.timezone);
            check_rest(&transition, selection, options, rules, settings)
                .map_err(|err| locate_in_roster(err, previous_index, next_index))
        })
        .collect::<EngineResult<Vec<_>>>()?;

    let overall_status = transitions
        .iter()
        .map(|report| report.status)
        .max()
        .unwrap_or(RestStatus::Ok);
    let compliant = transitions.iter().all(|report| report.compliant);

    debug!(
        crew_id = roster.crew_id.unwrap_or("-"),
        duties = roster.duties.len(),
        transitions = transitions.len(),
        overall_status = %overall_status,
        "Evaluated roster"
    );

    Ok(RosterReport {
        crew_id: roster.crew_id.map(str::to_string),
        transitions,
        overall_status,
        compliant,
    })
}

/// Renames a transition field after the roster duty it came from.
fn locate_in_roster(err: EngineError, previous: usize, next: usize) -> EngineError {
    match err {
        EngineError::InvalidInput { field, message } => {
            let field = match field.as_str() {
                "previous_duty_start" => format!("duties[{}].start", previous),
                "previous_duty_end" => format!("duties[{}].end", previous),
                "previous_duty_planned_end" => format!("duties[{}].planned_end", previous),
                "arrival_airport" => format!("duties[{}].destination", previous),
                "next_duty_start" => format!("duties[{}].start", next),
                "departure_airport" => format!("duties[{}].origin", next),
                _ => field,
            };
            EngineError::InvalidInput { field, message }
        }
        other => other,
    }
}
