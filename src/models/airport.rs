//! Airport model and home/away classification types.
//!
//! Airport codes arrive as free text from rostering systems. They are
//! normalized (trimmed, upper-cased) before comparison and only checked for
//! IATA/ICAO shape, never against an airport database.

use serde::{Deserialize, Serialize};

use crate::error::{EngineError, EngineResult};

/// Whether an airport is one of the operator's bases.
///
/// # Example
///
/// ```
/// use rest_engine::models::AirportClass;
///
/// assert_eq!(AirportClass::Home.to_string(), "Home");
/// assert_eq!(serde_json::to_string(&AirportClass::Away).unwrap(), "\"away\"");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AirportClass {
    /// The airport is in the configured base set.
    Home,
    /// Any airport outside the base set.
    Away,
}

impl std::fmt::Display for AirportClass {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AirportClass::Home => write!(f, "Home"),
            AirportClass::Away => write!(f, "Away"),
        }
    }
}

/// An airport code together with its derived classification.
///
/// The classification is computed by an
/// [`AirportRegistry`](crate::evaluation::AirportRegistry) for each
/// evaluation and is never stored alongside configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Airport {
    /// The normalized code (upper case, no surrounding whitespace).
    pub code: String,
    /// Home or Away relative to the active base set.
    pub class: AirportClass,
}

/// Normalizes an airport code for comparison.
///
/// ```
/// use rest_engine::models::normalize_airport_code;
///
/// assert_eq!(normalize_airport_code("  lhr "), "LHR");
/// ```
pub fn normalize_airport_code(raw: &str) -> String {
    raw.trim().to_ascii_uppercase()
}

/// Validates the syntax of an airport code and returns it normalized.
///
/// A code is accepted when, after trimming, it is three (IATA) or four
/// (ICAO) ASCII letters or digits. `field` names the request field in the
/// resulting [`EngineError::InvalidInput`].
///
/// ```
/// use rest_engine::models::validate_airport_code;
///
/// assert_eq!(validate_airport_code("departure_airport", "egll").unwrap(), "EGLL");
/// assert!(validate_airport_code("departure_airport", "LONDON").is_err());
/// ```
pub fn validate_airport_code(field: &str, raw: &str) -> EngineResult<String> {
    let code = normalize_airport_code(raw);

    if code.is_empty() {
        return Err(EngineError::invalid_input(field, "airport code is empty"));
    }
    if !(3..=4).contains(&code.len()) {
        return Err(EngineError::invalid_input(
            field,
            format!("airport code '{}' must be 3 or 4 characters", code),
        ));
    }
    if !code.chars().all(|c| c.is_ascii_alphanumeric()) {
        return Err(EngineError::invalid_input(
            field,
            format!("airport code '{}' must be alphanumeric", code),
        ));
    }

    Ok(code)
}
