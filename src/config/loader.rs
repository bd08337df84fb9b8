//! Rule-set loading functionality.
//!
//! This module provides the [`ConfigLoader`] type for loading the rest rule
//! table from YAML files.

use std::fs;
use std::path::Path;

use tracing::info;

use crate::error::{EngineError, EngineResult};

use super::types::{
    AdjustmentsConfig, BaselinesConfig, NightRules, RuleSet, RuleSetMetadata, WoclConfig,
};

/// Loads and provides access to the rest rule table.
///
/// # Directory Structure
///
/// The rule-set directory should have the following structure:
/// ```text
/// config/ftl/
/// ├── ruleset.yaml     # Name, version and effective date
/// ├── baselines.yaml   # Baseline rest per regime and classification
/// ├── adjustments.yaml # WOCL and travel extensions
/// ├── wocl.yaml        # Window of circadian low
/// └── night.yaml       # Night window and recovery floors
/// ```
///
/// # Example
///
/// ```no_run
/// use rest_engine::config::ConfigLoader;
/// use rest_engine::models::{AirportClass, RuleRegime};
///
/// let loader = ConfigLoader::load("./config/ftl")?;
/// let baseline = loader.rules().baseline_for(RuleRegime::Easa, AirportClass::Home)?;
/// println!("EASA home baseline: {} minutes", baseline.minimum_minutes);
/// # Ok::<(), rest_engine::error::EngineError>(())
/// ```
#[derive(Debug, Clone)]
pub struct ConfigLoader {
    rules: RuleSet,
}

impl ConfigLoader {
    /// Loads the rule set from the specified directory.
    ///
    /// # Returns
    ///
    /// Returns a `ConfigLoader` on success, or an error if:
    /// - Any required file is missing ([`EngineError::ConfigNotFound`])
    /// - Any file contains invalid YAML or an unknown regime
    ///   ([`EngineError::ConfigParseError`])
    /// - The table is inconsistent, e.g. a regime lacks a baseline for one
    ///   classification ([`EngineError::ConfigParseError`])
    pub fn load<P: AsRef<Path>>(path: P) -> EngineResult<Self> {
        let path = path.as_ref();

        let metadata = Self::load_yaml::<RuleSetMetadata>(&path.join("ruleset.yaml"))?;
        let baselines = Self::load_yaml::<BaselinesConfig>(&path.join("baselines.yaml"))?;
        let adjustments = Self::load_yaml::<AdjustmentsConfig>(&path.join("adjustments.yaml"))?;
        let wocl = Self::load_yaml::<WoclConfig>(&path.join("wocl.yaml"))?;
        let night = Self::load_yaml::<NightRules>(&path.join("night.yaml"))?;

        let rules = RuleSet::new(
            metadata,
            baselines.baselines,
            adjustments.adjustments,
            wocl.wocl,
        )
        .with_night_rules(night);

        rules
            .validate()
            .map_err(|message| EngineError::ConfigParseError {
                path: path.display().to_string(),
                message,
            })?;

        info!(
            path = %path.display(),
            ruleset = %rules.metadata().name,
            version = %rules.version(),
            baselines = rules.baselines().len(),
            adjustments = rules.adjustments().len(),
            recovery = rules.night_rules().recovery.len(),
            "Loaded rest rule set"
        );

        Ok(Self { rules })
    }

    /// Wraps an already-built rule set.
    pub fn from_rules(rules: RuleSet) -> Self {
        Self { rules }
    }

    /// Loads and parses a YAML file.
    fn load_yaml<T: serde::de::DeserializeOwned>(path: &Path) -> EngineResult<T> {
        let path_str = path.display().to_string();

        let content = fs::read_to_string(path).map_err(|_| EngineError::ConfigNotFound {
            path: path_str.clone(),
        })?;

        serde_yaml::from_str(&content).map_err(|e| EngineError::ConfigParseError {
            path: path_str,
            message: e.to_string(),
        })
    }

    /// Returns the loaded rule table.
    pub fn rules(&self) -> &RuleSet {
        &self.rules
    }

    /// Returns the rule-set version.
    pub fn version(&self) -> &str {
        self.rules.version()
    }
}
