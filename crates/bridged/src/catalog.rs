//! Plugins compiled into the bridge binary.

use bridge_plugins::PluginCatalog;

/// Catalog of the plugins this binary can load, keyed by specifier.
#[must_use]
pub fn default_catalog() -> PluginCatalog {
    PluginCatalog::new().with_plugin("echo", || Some(bridge_plugin_echo::plugin()))
}
