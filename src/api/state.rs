//! Application state for the rest requirement API.
//!
//! This module defines the shared application state that is available
//! to all request handlers.

use std::sync::Arc;

use crate::config::{ConfigLoader, RuleSet, Settings};

/// Shared application state.
///
/// Holds the process settings and the loaded rule table. Both are built
/// once at start-up and never mutated, so handlers read them without locks.
#[derive(Clone)]
pub struct AppState {
    settings: Arc<Settings>,
    config: Arc<ConfigLoader>,
}

impl AppState {
    /// Creates a new application state.
    pub fn new(settings: Settings, config: ConfigLoader) -> Self {
        Self {
            settings: Arc::new(settings),
            config: Arc::new(config),
        }
    }

    /// Returns the process settings.
    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    /// Returns the loaded rule table.
    pub fn rules(&self) -> &RuleSet {
        self.config.rules()
    }
}
