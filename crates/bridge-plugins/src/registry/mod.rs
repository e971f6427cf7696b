//! Capability index built from a loaded plugin.
//!
//! The [`CapabilityIndex`] holds one lookup table per capability kind: four
//! keyed by name (actions, providers, evaluators, and services by service
//! type) and one keyed by route path. It is built once during bootstrap and
//! never mutated afterwards, so the dispatcher shares it behind an `Arc`
//! without locking.
//!
//! When two capabilities of the same kind share a key, the one registered
//! last replaces the earlier one and a warning is logged.

use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use tracing::warn;

use crate::capability::{Action, Evaluator, PluginInit, Provider, Service};
use crate::error::PluginError;
use crate::plugin::Plugin;
use crate::route::Route;

const REGISTRY_TARGET: &str = concat!(env!("CARGO_PKG_NAME"), "::registry");

/// Immutable lookup tables for a loaded plugin.
pub struct CapabilityIndex {
    name: String,
    description: String,
    version: String,
    init: Option<Arc<dyn PluginInit>>,
    actions: BTreeMap<String, Arc<dyn Action>>,
    providers: BTreeMap<String, Arc<dyn Provider>>,
    evaluators: BTreeMap<String, Arc<dyn Evaluator>>,
    services: BTreeMap<String, Arc<dyn Service>>,
    routes: BTreeMap<String, Route>,
}

impl CapabilityIndex {
    /// Indexes every capability declared by `plugin`.
    ///
    /// # Errors
    ///
    /// Returns [`PluginError::Manifest`] when the plugin name, or any
    /// capability key, is empty.
    pub fn build(plugin: Plugin) -> Result<Self, PluginError> {
        let parts = plugin.into_parts();
        if parts.name.trim().is_empty() {
            return Err(PluginError::manifest("plugin name must not be empty"));
        }
        let plugin_name = parts.name.as_str();

        let actions = index_table(plugin_name, "action", parts.actions, |a| {
            a.name().to_owned()
        })?;
        let providers = index_table(plugin_name, "provider", parts.providers, |p| {
            p.name().to_owned()
        })?;
        let evaluators = index_table(plugin_name, "evaluator", parts.evaluators, |e| {
            e.name().to_owned()
        })?;
        let services = index_table(plugin_name, "service", parts.services, |s| {
            s.service_type().to_owned()
        })?;
        let routes = index_table(plugin_name, "route", parts.routes, |r| r.path().to_owned())?;

        Ok(Self {
            name: parts.name,
            description: parts.description,
            version: parts.version,
            init: parts.init,
            actions,
            providers,
            evaluators,
            services,
            routes,
        })
    }

    /// Plugin name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Plugin description.
    #[must_use]
    pub fn description(&self) -> &str {
        &self.description
    }

    /// Plugin version.
    #[must_use]
    pub fn version(&self) -> &str {
        &self.version
    }

    /// Initialisation hook, if the plugin declared one.
    #[must_use]
    pub fn init(&self) -> Option<&Arc<dyn PluginInit>> {
        self.init.as_ref()
    }

    /// Looks up an action by name.
    #[must_use]
    pub fn action(&self, name: &str) -> Option<&Arc<dyn Action>> {
        self.actions.get(name)
    }

    /// Looks up a provider by name.
    #[must_use]
    pub fn provider(&self, name: &str) -> Option<&Arc<dyn Provider>> {
        self.providers.get(name)
    }

    /// Looks up an evaluator by name.
    #[must_use]
    pub fn evaluator(&self, name: &str) -> Option<&Arc<dyn Evaluator>> {
        self.evaluators.get(name)
    }

    /// Looks up a service by service type.
    #[must_use]
    pub fn service(&self, service_type: &str) -> Option<&Arc<dyn Service>> {
        self.services.get(service_type)
    }

    /// Looks up a route by path.
    #[must_use]
    pub fn route(&self, path: &str) -> Option<&Route> {
        self.routes.get(path)
    }

    /// Indexed actions ordered by name.
    pub fn actions(&self) -> impl Iterator<Item = &Arc<dyn Action>> {
        self.actions.values()
    }

    /// Indexed providers ordered by name.
    pub fn providers(&self) -> impl Iterator<Item = &Arc<dyn Provider>> {
        self.providers.values()
    }

    /// Indexed evaluators ordered by name.
    pub fn evaluators(&self) -> impl Iterator<Item = &Arc<dyn Evaluator>> {
        self.evaluators.values()
    }

    /// Indexed services ordered by service type.
    pub fn services(&self) -> impl Iterator<Item = &Arc<dyn Service>> {
        self.services.values()
    }

    /// Indexed routes ordered by path.
    pub fn routes(&self) -> impl Iterator<Item = &Route> {
        self.routes.values()
    }

    /// Total number of indexed capabilities across all tables.
    #[must_use]
    pub fn len(&self) -> usize {
        self.actions.len()
            + self.providers.len()
            + self.evaluators.len()
            + self.services.len()
            + self.routes.len()
    }

    /// Returns `true` when the plugin declared no capabilities.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl fmt::Debug for CapabilityIndex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CapabilityIndex")
            .field("name", &self.name)
            .field("version", &self.version)
            .field("actions", &self.actions.keys().collect::<Vec<_>>())
            .field("providers", &self.providers.keys().collect::<Vec<_>>())
            .field("evaluators", &self.evaluators.keys().collect::<Vec<_>>())
            .field("services", &self.services.keys().collect::<Vec<_>>())
            .field("routes", &self.routes.keys().collect::<Vec<_>>())
            .finish_non_exhaustive()
    }
}

fn index_table<T>(
    plugin: &str,
    kind: &'static str,
    items: Vec<T>,
    key_of: impl Fn(&T) -> String,
) -> Result<BTreeMap<String, T>, PluginError> {
    let mut table = BTreeMap::new();
    for item in items {
        let key = key_of(&item);
        if key.trim().is_empty() {
            return Err(PluginError::manifest(format!(
                "{kind} declared by plugin '{plugin}' has an empty identifier"
            )));
        }
        if table.insert(key.clone(), item).is_some() {
            warn!(
                target: REGISTRY_TARGET,
                plugin,
                kind,
                key = %key,
                "duplicate capability replaced by later registration"
            );
        }
    }
    Ok(table)
}
