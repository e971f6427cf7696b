//! Health reporter double that records lifecycle events.

use std::sync::Mutex;

use bridge_config::Config;
use bridge_plugins::LoadedPlugin;

use crate::bootstrap::BootstrapError;
use crate::health::HealthReporter;
use crate::session::SessionSummary;

/// Records health events for assertions.
#[derive(Default)]
pub struct RecordingHealthReporter {
    events: Mutex<Vec<HealthEvent>>,
}

impl RecordingHealthReporter {
    /// Captures a copy of the recorded events.
    pub fn events(&self) -> Vec<HealthEvent> {
        self.events
            .lock()
            .expect("health reporter mutex poisoned")
            .clone()
    }

    fn record(&self, event: HealthEvent) {
        self.events
            .lock()
            .expect("health reporter mutex poisoned")
            .push(event);
    }
}

impl HealthReporter for RecordingHealthReporter {
    fn bootstrap_starting(&self, _config: &Config) {
        self.record(HealthEvent::BootstrapStarting);
    }

    fn plugin_loaded(&self, plugin: &LoadedPlugin) {
        self.record(HealthEvent::PluginLoaded(plugin.manifest().name.clone()));
    }

    fn bootstrap_succeeded(&self, _config: &Config) {
        self.record(HealthEvent::BootstrapSucceeded);
    }

    fn bootstrap_failed(&self, error: &BootstrapError) {
        self.record(HealthEvent::BootstrapFailed(error.to_string()));
    }

    fn session_finished(&self, summary: &SessionSummary) {
        self.record(HealthEvent::SessionFinished(*summary));
    }
}

/// Structured health events tracked during scenarios.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HealthEvent {
    /// Bootstrap started.
    BootstrapStarting,
    /// A plugin with the given manifest name was loaded.
    PluginLoaded(String),
    /// Bootstrap completed successfully.
    BootstrapSucceeded,
    /// Bootstrap failed with an error description.
    BootstrapFailed(String),
    /// The request loop ended.
    SessionFinished(SessionSummary),
}
