//! Home/away airport classification.
//!
//! This module provides the [`AirportRegistry`], which classifies airport
//! codes against the operator's configured base airports.

use std::collections::BTreeSet;

use tracing::debug;

use crate::models::{Airport, AirportClass, normalize_airport_code};

/// The base airports used when no override is configured.
pub const DEFAULT_HOME_AIRPORTS: [&str; 3] = ["LHR", "LGW", "LCY"];

/// Classifies airport codes as Home or Away.
///
/// Classification is total: any string that is not a configured base,
/// after trimming and case-folding, is Away. The registry is built once at
/// start-up and only read afterwards.
///
/// # Example
///
/// ```
/// use rest_engine::evaluation::AirportRegistry;
/// use rest_engine::models::AirportClass;
///
/// let registry = AirportRegistry::default();
/// assert_eq!(registry.classify("lhr"), AirportClass::Home);
/// assert_eq!(registry.classify("JFK"), AirportClass::Away);
///
/// let custom = AirportRegistry::new(["MAN"]);
/// assert_eq!(custom.classify("LHR"), AirportClass::Away);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AirportRegistry {
    home: BTreeSet<String>,
}

impl AirportRegistry {
    /// Creates a registry whose base set is exactly `codes`.
    ///
    /// Codes are normalized; blank entries are dropped.
    pub fn new<I, S>(codes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let home = codes
            .into_iter()
            .map(|c| normalize_airport_code(c.as_ref()))
            .filter(|c| !c.is_empty())
            .collect();
        Self { home }
    }

    /// Returns the configured base airports in sorted order.
    pub fn home_airports(&self) -> impl Iterator<Item = &str> {
        self.home.iter().map(String::as_str)
    }

    /// Returns true if no base airport is configured.
    pub fn is_empty(&self) -> bool {
        self.home.is_empty()
    }

    /// Classifies a single airport code.
    pub fn classify(&self, code: &str) -> AirportClass {
        if self.home.contains(&normalize_airport_code(code)) {
            AirportClass::Home
        } else {
            AirportClass::Away
        }
    }

    /// Returns the normalized airport with its classification.
    pub fn resolve(&self, code: &str) -> Airport {
        Airport {
            code: normalize_airport_code(code),
            class: self.classify(code),
        }
    }

    /// Classifies the location of a rest.
    ///
    /// The rest is at Home only when the airport the previous duty arrived
    /// at (if known) and the airport the next duty departs from are both
    /// bases.
    pub fn classify_rest_location(&self, arrival: Option<&str>, departure: &str) -> AirportClass {
        let departure = self.resolve(departure);
        let arrival = arrival.map(|code| self.resolve(code));

        let class = match &arrival {
            Some(a) if a.class == AirportClass::Away => AirportClass::Away,
            _ => departure.class,
        };

        debug!(
            arrival = arrival.as_ref().map(|a| a.code.as_str()).unwrap_or("-"),
            departure = %departure.code,
            classification = %class,
            "Classified rest location"
        );

        class
    }
}

impl Default for AirportRegistry {
    fn default() -> Self {
        Self::new(DEFAULT_HOME_AIRPORTS)
    }
}
