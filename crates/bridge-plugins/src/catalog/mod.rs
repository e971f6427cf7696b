//! Plugin resolution and loading.
//!
//! Plugins are compiled into the bridge binary and registered in a
//! [`PluginCatalog`] under a specifier. Loading resolves the specifier,
//! indexes the returned bundle, and projects the manifest. Any failure here
//! is fatal: the bridge must exit before the ready handshake.

use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use tracing::{debug, info};

use crate::error::PluginError;
use crate::manifest::CapabilityManifest;
use crate::plugin::Plugin;
use crate::registry::CapabilityIndex;

const LOADER_TARGET: &str = concat!(env!("CARGO_PKG_NAME"), "::loader");

/// Resolves plugin specifiers to capability bundles.
pub trait PluginSource: Send + Sync {
    /// Resolves `specifier` to its bundle.
    ///
    /// # Errors
    ///
    /// Returns [`PluginError::NotFound`] for an unknown specifier and
    /// [`PluginError::MissingBundle`] when the plugin exports nothing.
    fn resolve(&self, specifier: &str) -> Result<Plugin, PluginError>;

    /// Specifiers this source can resolve, in display order.
    fn specifiers(&self) -> Vec<String>;
}

type PluginFactory = Box<dyn Fn() -> Option<Plugin> + Send + Sync>;

/// Compiled-in table of plugin factories.
///
/// A factory returning `None` models a plugin that exists but exports no
/// capability bundle.
///
/// # Example
///
/// ```
/// use bridge_plugins::{Plugin, PluginCatalog, PluginSource};
///
/// let catalog = PluginCatalog::new()
///     .with_plugin("demo", || Some(Plugin::new("demo", "Demonstration")));
/// assert_eq!(catalog.specifiers(), vec![String::from("demo")]);
/// assert!(catalog.resolve("missing").is_err());
/// ```
#[derive(Default)]
pub struct PluginCatalog {
    factories: BTreeMap<String, PluginFactory>,
}

impl PluginCatalog {
    /// Creates an empty catalog.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a factory under `specifier`, replacing any previous one.
    #[must_use]
    pub fn with_plugin<F>(mut self, specifier: impl Into<String>, factory: F) -> Self
    where
        F: Fn() -> Option<Plugin> + Send + Sync + 'static,
    {
        self.factories.insert(specifier.into(), Box::new(factory));
        self
    }

    /// Number of registered plugins.
    #[must_use]
    pub fn len(&self) -> usize {
        self.factories.len()
    }

    /// Returns `true` when no plugins are registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.factories.is_empty()
    }
}

impl PluginSource for PluginCatalog {
    fn resolve(&self, specifier: &str) -> Result<Plugin, PluginError> {
        let factory = self
            .factories
            .get(specifier)
            .ok_or_else(|| PluginError::NotFound {
                specifier: specifier.to_owned(),
                available: self.specifiers(),
            })?;
        factory().ok_or_else(|| PluginError::MissingBundle {
            specifier: specifier.to_owned(),
        })
    }

    fn specifiers(&self) -> Vec<String> {
        self.factories.keys().cloned().collect()
    }
}

impl fmt::Debug for PluginCatalog {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PluginCatalog")
            .field("specifiers", &self.factories.keys().collect::<Vec<_>>())
            .finish()
    }
}

/// A plugin that has been resolved, indexed, and described.
#[derive(Debug, Clone)]
pub struct LoadedPlugin {
    specifier: String,
    index: Arc<CapabilityIndex>,
    manifest: Arc<CapabilityManifest>,
}

impl LoadedPlugin {
    /// Specifier the plugin was loaded from.
    #[must_use]
    pub fn specifier(&self) -> &str {
        &self.specifier
    }

    /// Shared capability index.
    #[must_use]
    pub const fn index(&self) -> &Arc<CapabilityIndex> {
        &self.index
    }

    /// Shared manifest.
    #[must_use]
    pub const fn manifest(&self) -> &Arc<CapabilityManifest> {
        &self.manifest
    }
}

/// Resolves, indexes, and describes the plugin named by `specifier`.
///
/// # Errors
///
/// Returns [`PluginError`] when the specifier cannot be resolved, the plugin
/// exports no bundle, or the bundle fails validation.
pub fn load(source: &dyn PluginSource, specifier: &str) -> Result<LoadedPlugin, PluginError> {
    debug!(target: LOADER_TARGET, specifier, "resolving plugin");
    let plugin = source.resolve(specifier)?;
    let index = CapabilityIndex::build(plugin)?;
    let manifest = CapabilityManifest::from_index(&index);
    info!(
        target: LOADER_TARGET,
        specifier,
        plugin = index.name(),
        version = index.version(),
        actions = manifest.actions.len(),
        providers = manifest.providers.len(),
        evaluators = manifest.evaluators.len(),
        services = manifest.services.len(),
        routes = manifest.routes.len(),
        "plugin loaded"
    );
    Ok(LoadedPlugin {
        specifier: specifier.to_owned(),
        index: Arc::new(index),
        manifest: Arc::new(manifest),
    })
}

#[cfg(test)]
mod tests;
