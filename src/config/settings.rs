//! Process settings read from the environment.
//!
//! Settings are read once at start-up into an immutable [`Settings`] value
//! that is passed by reference into every evaluation.

use std::path::PathBuf;

use crate::error::{EngineError, EngineResult};
use crate::evaluation::{AirportRegistry, resolve_timezone};
use crate::models::{RegimeSelection, RuleRegime};

/// Base timezone used when a transition carries none.
pub const ENV_BASE_TIMEZONE: &str = "REST_ENGINE_BASE_TIMEZONE";
/// Comma-separated base airports; replaces the default set.
pub const ENV_HOME_AIRPORTS: &str = "REST_ENGINE_HOME_AIRPORTS";
/// Rule-set directory.
pub const ENV_RULES_PATH: &str = "REST_ENGINE_RULES_PATH";
/// HTTP bind address.
pub const ENV_BIND_ADDR: &str = "REST_ENGINE_BIND_ADDR";
/// Regime used when a request names none.
pub const ENV_DEFAULT_REGIME: &str = "REST_ENGINE_DEFAULT_REGIME";
/// Largest shortfall, in minutes, reported as at-risk rather than non-compliant.
pub const ENV_AT_RISK_TOLERANCE: &str = "REST_ENGINE_AT_RISK_TOLERANCE_MINUTES";

/// Immutable process configuration.
#[derive(Debug, Clone)]
pub struct Settings {
    /// Timezone identifier of the base.
    pub base_timezone: String,
    /// Base airports.
    pub home_airports: AirportRegistry,
    /// Directory holding the rule-set YAML files.
    pub rules_path: PathBuf,
    /// Address the HTTP server binds to.
    pub bind_addr: String,
    /// Regime selection used when a request names none.
    pub default_regime: RegimeSelection,
    /// Largest shortfall in minutes still reported as at-risk.
    pub at_risk_tolerance_minutes: i64,
}

impl Settings {
    /// Loads settings from the process environment.
    pub fn from_env() -> EngineResult<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Loads settings through `lookup`, applying defaults for absent keys.
    ///
    /// # Example
    ///
    /// ```
    /// use rest_engine::config::Settings;
    /// use rest_engine::models::AirportClass;
    ///
    /// let settings = Settings::from_lookup(|key| match key {
    ///     "REST_ENGINE_HOME_AIRPORTS" => Some("MAN,EDI".to_string()),
    ///     _ => None,
    /// })?;
    /// assert_eq!(settings.home_airports.classify("MAN"), AirportClass::Home);
    /// assert_eq!(settings.home_airports.classify("LHR"), AirportClass::Away);
    /// # Ok::<(), rest_engine::error::EngineError>(())
    /// ```
    pub fn from_lookup<F>(lookup: F) -> EngineResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut settings = Self::default();

        if let Some(value) = lookup(ENV_BASE_TIMEZONE) {
            resolve_timezone(&value).map_err(|e| EngineError::InvalidSetting {
                key: ENV_BASE_TIMEZONE.to_string(),
                value: value.clone(),
                reason: e.to_string(),
            })?;
            settings.base_timezone = value.trim().to_string();
        }

        if let Some(value) = lookup(ENV_HOME_AIRPORTS) {
            let registry = AirportRegistry::new(value.split(','));
            if registry.is_empty() {
                return Err(EngineError::InvalidSetting {
                    key: ENV_HOME_AIRPORTS.to_string(),
                    value,
                    reason: "at least one airport is required".to_string(),
                });
            }
            settings.home_airports = registry;
        }

        if let Some(value) = lookup(ENV_RULES_PATH) {
            settings.rules_path = PathBuf::from(value);
        }

        if let Some(value) = lookup(ENV_BIND_ADDR) {
            settings.bind_addr = value;
        }

        if let Some(value) = lookup(ENV_DEFAULT_REGIME) {
            settings.default_regime =
                value.parse::<RegimeSelection>().map_err(|e| EngineError::InvalidSetting {
                    key: ENV_DEFAULT_REGIME.to_string(),
                    value: value.clone(),
                    reason: e.to_string(),
                })?;
        }

        if let Some(value) = lookup(ENV_AT_RISK_TOLERANCE) {
            settings.at_risk_tolerance_minutes = value
                .trim()
                .parse::<i64>()
                .ok()
                .filter(|minutes| *minutes >= 0)
                .ok_or_else(|| EngineError::InvalidSetting {
                    key: ENV_AT_RISK_TOLERANCE.to_string(),
                    value: value.clone(),
                    reason: "must be a non-negative number of minutes".to_string(),
                })?;
        }

        Ok(settings)
    }

    // Default value functions
    fn default_base_timezone() -> String {
        "Europe/London".to_string()
    }
    fn default_rules_path() -> PathBuf {
        PathBuf::from("./config/ftl")
    }
    fn default_bind_addr() -> String {
        "0.0.0.0:8080".to_string()
    }
    fn default_at_risk_tolerance() -> i64 {
        30
    }
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            base_timezone: Self::default_base_timezone(),
            home_airports: AirportRegistry::default(),
            rules_path: Self::default_rules_path(),
            bind_addr: Self::default_bind_addr(),
            default_regime: RegimeSelection::Single(RuleRegime::Oma),
            at_risk_tolerance_minutes: Self::default_at_risk_tolerance(),
        }
    }
}
