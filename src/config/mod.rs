//! Configuration loading and management for the rest requirement engine.
//!
//! Two kinds of configuration exist. The rule table (baselines, adjustment
//! rows, the WOCL and night windows, recovery floors, rule-set version) is
//! loaded from YAML files by [`ConfigLoader`]; process settings (base
//! timezone, base airports, bind address) come from the environment through
//! [`Settings`]. Both are built once at start-up and are read-only afterwards.
//!
//! # Example
//!
//! ```no_run
//! use rest_engine::config::{ConfigLoader, Settings};
//!
//! let settings = Settings::from_env().unwrap();
//! let loader = ConfigLoader::load(&settings.rules_path).unwrap();
//! println!("Loaded rule set {}", loader.version());
//! ```

mod loader;
mod settings;
mod types;

#[cfg(test)]
pub(crate) mod test_support;

pub use loader::ConfigLoader;
pub use settings::{
    ENV_AT_RISK_TOLERANCE, ENV_BASE_TIMEZONE, ENV_BIND_ADDR, ENV_DEFAULT_REGIME,
    ENV_HOME_AIRPORTS, ENV_RULES_PATH, Settings,
};
pub use types::{
    AdjustmentRule, AdjustmentsConfig, BaselineRule, BaselinesConfig, LocalWindow, NightHistory,
    NightRules, RecoveryRule, RecoveryTrigger, RuleSet, RuleSetMetadata, WoclConfig,
};
