//! Capability model for plugins served by the bridge.
//!
//! A plugin is a bundle of capabilities of five kinds: actions, context
//! providers, evaluators, services, and HTTP-like routes. The `bridged`
//! process loads one plugin at start-up, announces its capabilities in a
//! manifest, and then invokes them on behalf of a host speaking line-delimited
//! JSON over standard I/O.
//!
//! # Architecture
//!
//! Plugins are compiled into the bridge and registered in a
//! [`PluginCatalog`]. [`load`] resolves a specifier to a [`Plugin`] bundle,
//! indexes it into an immutable [`CapabilityIndex`], and projects the
//! [`CapabilityManifest`] sent during the ready handshake. Capabilities are
//! explicit async traits ([`Action`], [`Provider`], [`Evaluator`],
//! [`Service`], [`RouteHandler`]) so the index can be built without
//! introspection.
//!
//! Payloads crossing the boundary ([`Memory`], [`State`], [`HandlerOptions`])
//! are opaque records that keep every field the host sent. Capability results
//! are wrapped in [`Outcome`], which distinguishes ad-hoc JSON objects from
//! structured [`ActionResult`] and [`ProviderResult`] values.
//!
//! # Example
//!
//! ```rust
//! use bridge_plugins::{Plugin, PluginCatalog, Route, RouteMethod, load};
//!
//! let catalog = PluginCatalog::new().with_plugin("status", || {
//!     Some(
//!         Plugin::new("status", "Reports bridge status").with_route(
//!             Route::new(RouteMethod::Get, "/status").with_sync_handler(|_, response| {
//!                 response.send("ok");
//!                 Ok(())
//!             }),
//!         ),
//!     )
//! });
//!
//! let loaded = load(&catalog, "status").expect("plugin loads");
//! assert_eq!(loaded.manifest().routes.len(), 1);
//! ```

pub mod adapter;
pub mod capability;
pub mod catalog;
pub mod error;
pub mod manifest;
pub mod outcome;
mod plugin;
pub mod registry;
pub mod route;
pub mod value;

#[cfg(test)]
mod tests;

pub use self::capability::{
    Action, Evaluator, HandlerOutcome, PluginContext, PluginInit, Provider, Service,
    ServiceHandle,
};
pub use self::catalog::{LoadedPlugin, PluginCatalog, PluginSource, load};
pub use self::error::{CapabilityError, PluginError};
pub use self::manifest::{
    ActionEntry, CapabilityManifest, EvaluatorEntry, MANIFEST_LANGUAGE, ProviderEntry,
    RouteEntry, ServiceEntry,
};
pub use self::outcome::{ActionResult, Outcome, ProviderResult};
pub use self::plugin::Plugin;
pub use self::registry::CapabilityIndex;
pub use self::route::{MockResponse, Route, RouteHandler, RouteMethod, RouteRequest};
pub use self::value::{HandlerOptions, Memory, State};
