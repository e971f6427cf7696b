//! Scenario world for the bootstrap behavioural suite.

use std::cell::RefCell;
use std::sync::Arc;

use bridge_config::Config;
use bridge_plugins::PluginCatalog;

use super::fixtures::{ServiceProbe, fixture_plugin};
use super::reporter::RecordingHealthReporter;
use crate::bootstrap::{BootstrapError, Bridge, bootstrap_with};

/// Scenario world shared across bootstrap steps.
pub struct BootstrapWorld {
    catalog: PluginCatalog,
    pub reporter: Arc<RecordingHealthReporter>,
    bridge: Option<Bridge>,
    bootstrap_error: Option<BootstrapError>,
    output: Vec<String>,
}

impl BootstrapWorld {
    /// Builds a world with an empty catalog.
    pub fn new() -> Self {
        Self {
            catalog: PluginCatalog::new(),
            reporter: Arc::new(RecordingHealthReporter::default()),
            bridge: None,
            bootstrap_error: None,
            output: Vec::new(),
        }
    }

    /// Registers the fixture plugin under `specifier`.
    pub fn register_fixture(&mut self, specifier: &str) {
        let catalog = std::mem::take(&mut self.catalog);
        self.catalog = catalog.with_plugin(specifier, || {
            Some(fixture_plugin(&Arc::new(ServiceProbe::default())))
        });
    }

    /// Registers a specifier whose factory exports nothing.
    pub fn register_hollow(&mut self, specifier: &str) {
        let catalog = std::mem::take(&mut self.catalog);
        self.catalog = catalog.with_plugin(specifier, || None);
    }

    /// Runs the bootstrap sequence for `plugin`.
    pub fn bootstrap(&mut self, plugin: &str) {
        let config = Config::for_plugin(plugin).with_log_filter("off");
        match bootstrap_with(config, &self.catalog, self.reporter.clone()) {
            Ok(bridge) => self.bridge = Some(bridge),
            Err(error) => self.bootstrap_error = Some(error),
        }
    }

    /// Serves `input` through the bootstrapped bridge.
    pub fn serve(&mut self, input: &str) {
        let bridge = self.bridge.as_ref().expect("bridge bootstrapped");
        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .expect("runtime builds");
        let (_, output) = runtime
            .block_on(bridge.serve(input.as_bytes(), Vec::new()))
            .expect("session completes");
        self.output = String::from_utf8(output)
            .expect("output is UTF-8")
            .lines()
            .map(str::to_owned)
            .collect();
    }

    /// Returns the bootstrap error, if any.
    pub fn bootstrap_error(&self) -> Option<&BootstrapError> {
        self.bootstrap_error.as_ref()
    }

    /// Returns the bridge, if bootstrap succeeded.
    pub fn bridge(&self) -> Option<&Bridge> {
        self.bridge.as_ref()
    }

    /// Lines written by the last session.
    pub fn output(&self) -> &[String] {
        &self.output
    }
}

impl Default for BootstrapWorld {
    fn default() -> Self {
        Self::new()
    }
}

/// Default test world fixture.
pub fn world() -> RefCell<BootstrapWorld> {
    RefCell::new(BootstrapWorld::new())
}
