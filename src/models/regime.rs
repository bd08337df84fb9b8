//! Rule regime identifiers.
//!
//! A regime names the body of rules that produces a rest requirement. The
//! engine evaluates one regime per transition, or every regime with the
//! largest requirement governing when [`RegimeSelection::Governing`] is asked
//! for.

use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::EngineError;

/// A flight-time-limitation rule regime.
///
/// # Example
///
/// ```
/// use rest_engine::models::RuleRegime;
///
/// let regime: RuleRegime = "oma".parse().unwrap();
/// assert_eq!(regime, RuleRegime::Oma);
/// assert_eq!(regime.to_string(), "OMA");
/// assert!("FAA".parse::<RuleRegime>().is_err());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum RuleRegime {
    /// The EASA rest-extension rules.
    #[serde(rename = "EASA")]
    Easa,
    /// The operator's own manual, with separate home and away rules.
    #[serde(rename = "OMA")]
    Oma,
}

impl RuleRegime {
    /// Every regime, in the order used for reporting and tie-breaking.
    pub const ALL: [RuleRegime; 2] = [RuleRegime::Easa, RuleRegime::Oma];

    /// The stable identifier used in configuration and reports.
    pub fn as_str(&self) -> &'static str {
        match self {
            RuleRegime::Easa => "EASA",
            RuleRegime::Oma => "OMA",
        }
    }
}

impl std::fmt::Display for RuleRegime {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RuleRegime {
    type Err = EngineError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "EASA" => Ok(RuleRegime::Easa),
            "OMA" => Ok(RuleRegime::Oma),
            _ => Err(EngineError::UnknownRegime {
                regime: s.to_string(),
            }),
        }
    }
}

/// Which regime(s) an evaluation runs under.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RegimeSelection {
    /// Evaluate a single regime.
    Single(RuleRegime),
    /// Evaluate every regime; the largest total requirement governs.
    Governing,
}

impl RegimeSelection {
    /// The regimes to evaluate, in reporting order.
    pub fn regimes(&self) -> Vec<RuleRegime> {
        match self {
            RegimeSelection::Single(regime) => vec![*regime],
            RegimeSelection::Governing => RuleRegime::ALL.to_vec(),
        }
    }
}

impl std::fmt::Display for RegimeSelection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RegimeSelection::Single(regime) => write!(f, "{}", regime),
            RegimeSelection::Governing => write!(f, "GOVERNING"),
        }
    }
}

impl FromStr for RegimeSelection {
    type Err = EngineError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.trim().eq_ignore_ascii_case("GOVERNING") {
            return Ok(RegimeSelection::Governing);
        }
        s.parse().map(RegimeSelection::Single)
    }
}
