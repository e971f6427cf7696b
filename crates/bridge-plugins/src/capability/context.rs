//! Shared runtime context handed to every capability.

use std::sync::{PoisonError, RwLock};

use serde_json::{Map, Value};

/// Plugin-wide context visible to every capability invocation.
///
/// Settings start empty and are extended by `plugin.init`. Later keys replace
/// earlier ones.
#[derive(Debug, Default)]
pub struct PluginContext {
    plugin_name: String,
    settings: RwLock<Map<String, Value>>,
}

impl PluginContext {
    /// Creates a context for the named plugin.
    #[must_use]
    pub fn new(plugin_name: impl Into<String>) -> Self {
        Self {
            plugin_name: plugin_name.into(),
            settings: RwLock::new(Map::new()),
        }
    }

    /// Name of the loaded plugin.
    #[must_use]
    pub fn plugin_name(&self) -> &str {
        &self.plugin_name
    }

    /// Returns a copy of a single setting.
    #[must_use]
    pub fn setting(&self, key: &str) -> Option<Value> {
        let settings = self.settings.read().unwrap_or_else(PoisonError::into_inner);
        settings.get(key).cloned()
    }

    /// Returns a snapshot of every setting.
    #[must_use]
    pub fn settings(&self) -> Map<String, Value> {
        self.settings
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Merges `config` into the settings.
    pub fn apply_settings(&self, config: &Map<String, Value>) {
        let mut settings = self
            .settings
            .write()
            .unwrap_or_else(PoisonError::into_inner);
        for (key, value) in config {
            settings.insert(key.clone(), value.clone());
        }
    }
}
