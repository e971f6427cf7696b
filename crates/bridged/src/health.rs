//! Structured health reporting for bridge lifecycle events.

use std::sync::Arc;

use bridge_config::Config;
use bridge_plugins::LoadedPlugin;

use crate::bootstrap::BootstrapError;
use crate::session::SessionSummary;

/// Observer trait used to surface lifecycle events to telemetry sinks.
pub trait HealthReporter: Send + Sync {
    /// Invoked before the plugin is resolved.
    fn bootstrap_starting(&self, config: &Config);

    /// Invoked after the plugin has been loaded and indexed.
    fn plugin_loaded(&self, plugin: &LoadedPlugin);

    /// Invoked after bootstrap completes successfully.
    fn bootstrap_succeeded(&self, config: &Config);

    /// Invoked when bootstrap fails.
    fn bootstrap_failed(&self, error: &BootstrapError);

    /// Invoked when the request loop ends.
    fn session_finished(&self, summary: &SessionSummary);
}

impl<T> HealthReporter for Arc<T>
where
    T: HealthReporter,
{
    fn bootstrap_starting(&self, config: &Config) {
        (**self).bootstrap_starting(config);
    }

    fn plugin_loaded(&self, plugin: &LoadedPlugin) {
        (**self).plugin_loaded(plugin);
    }

    fn bootstrap_succeeded(&self, config: &Config) {
        (**self).bootstrap_succeeded(config);
    }

    fn bootstrap_failed(&self, error: &BootstrapError) {
        (**self).bootstrap_failed(error);
    }

    fn session_finished(&self, summary: &SessionSummary) {
        (**self).session_finished(summary);
    }
}

/// Default reporter that records lifecycle events using `tracing`.
#[derive(Debug, Default, Clone, Copy)]
pub struct StructuredHealthReporter;

impl StructuredHealthReporter {
    /// Builds a new reporter.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }
}

impl HealthReporter for StructuredHealthReporter {
    fn bootstrap_starting(&self, config: &Config) {
        tracing::info!(
            target: "bridged::health",
            event = "bootstrap_starting",
            plugin = config.plugin().unwrap_or_default(),
            "starting bridge bootstrap"
        );
    }

    fn plugin_loaded(&self, plugin: &LoadedPlugin) {
        let manifest = plugin.manifest();
        tracing::info!(
            target: "bridged::health",
            event = "plugin_loaded",
            specifier = plugin.specifier(),
            name = %manifest.name,
            version = %manifest.version,
            actions = manifest.actions.len(),
            providers = manifest.providers.len(),
            evaluators = manifest.evaluators.len(),
            services = manifest.services.len(),
            routes = manifest.routes.len(),
            "plugin loaded"
        );
    }

    fn bootstrap_succeeded(&self, config: &Config) {
        tracing::info!(
            target: "bridged::health",
            event = "bootstrap_succeeded",
            debug = config.debug(),
            dispatch_mode = %config.dispatch_mode(),
            log_format = ?config.log_format(),
            "bridge bootstrap completed"
        );
    }

    fn bootstrap_failed(&self, error: &BootstrapError) {
        tracing::error!(
            target: "bridged::health",
            event = "bootstrap_failed",
            error = %error,
            "bridge bootstrap failed"
        );
    }

    fn session_finished(&self, summary: &SessionSummary) {
        tracing::info!(
            target: "bridged::health",
            event = "session_finished",
            responses = summary.responses,
            errors = summary.errors,
            services_stopped = summary.services_stopped,
            "bridge session finished"
        );
    }
}
