//! The capability bundle a plugin exports.

use std::fmt;
use std::sync::Arc;

use crate::capability::{Action, Evaluator, PluginInit, Provider, Service};
use crate::route::Route;

const DEFAULT_VERSION: &str = "0.0.0";

/// Everything a plugin declares, before indexing.
///
/// # Example
///
/// ```
/// use bridge_plugins::{Plugin, Route, RouteMethod};
///
/// let plugin = Plugin::new("demo", "Demonstration plugin")
///     .with_version("1.2.0")
///     .with_route(Route::new(RouteMethod::Get, "/status"));
/// assert_eq!(plugin.name(), "demo");
/// assert_eq!(plugin.routes().len(), 1);
/// ```
#[derive(Clone)]
pub struct Plugin {
    name: String,
    description: String,
    version: String,
    init: Option<Arc<dyn PluginInit>>,
    actions: Vec<Arc<dyn Action>>,
    providers: Vec<Arc<dyn Provider>>,
    evaluators: Vec<Arc<dyn Evaluator>>,
    services: Vec<Arc<dyn Service>>,
    routes: Vec<Route>,
}

impl Plugin {
    /// Starts an empty bundle.
    #[must_use]
    pub fn new(name: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            version: DEFAULT_VERSION.to_owned(),
            init: None,
            actions: Vec::new(),
            providers: Vec::new(),
            evaluators: Vec::new(),
            services: Vec::new(),
            routes: Vec::new(),
        }
    }

    /// Sets the plugin version.
    #[must_use]
    pub fn with_version(mut self, version: impl Into<String>) -> Self {
        self.version = version.into();
        self
    }

    /// Sets the initialisation hook.
    #[must_use]
    pub fn with_init(mut self, init: Arc<dyn PluginInit>) -> Self {
        self.init = Some(init);
        self
    }

    /// Adds an action.
    #[must_use]
    pub fn with_action(mut self, action: Arc<dyn Action>) -> Self {
        self.actions.push(action);
        self
    }

    /// Adds a provider.
    #[must_use]
    pub fn with_provider(mut self, provider: Arc<dyn Provider>) -> Self {
        self.providers.push(provider);
        self
    }

    /// Adds an evaluator.
    #[must_use]
    pub fn with_evaluator(mut self, evaluator: Arc<dyn Evaluator>) -> Self {
        self.evaluators.push(evaluator);
        self
    }

    /// Adds a service.
    #[must_use]
    pub fn with_service(mut self, service: Arc<dyn Service>) -> Self {
        self.services.push(service);
        self
    }

    /// Adds a route.
    #[must_use]
    pub fn with_route(mut self, route: Route) -> Self {
        self.routes.push(route);
        self
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

    /// Initialisation hook, if any.
    #[must_use]
    pub fn init(&self) -> Option<&Arc<dyn PluginInit>> {
        self.init.as_ref()
    }

    /// Declared actions in registration order.
    #[must_use]
    pub fn actions(&self) -> &[Arc<dyn Action>] {
        &self.actions
    }

    /// Declared providers in registration order.
    #[must_use]
    pub fn providers(&self) -> &[Arc<dyn Provider>] {
        &self.providers
    }

    /// Declared evaluators in registration order.
    #[must_use]
    pub fn evaluators(&self) -> &[Arc<dyn Evaluator>] {
        &self.evaluators
    }

    /// Declared services in registration order.
    #[must_use]
    pub fn services(&self) -> &[Arc<dyn Service>] {
        &self.services
    }

    /// Declared routes in registration order.
    #[must_use]
    pub fn routes(&self) -> &[Route] {
        &self.routes
    }

    pub(crate) fn into_parts(self) -> PluginParts {
        PluginParts {
            name: self.name,
            description: self.description,
            version: self.version,
            init: self.init,
            actions: self.actions,
            providers: self.providers,
            evaluators: self.evaluators,
            services: self.services,
            routes: self.routes,
        }
    }
}

impl fmt::Debug for Plugin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Plugin")
            .field("name", &self.name)
            .field("version", &self.version)
            .field("actions", &self.actions.len())
            .field("providers", &self.providers.len())
            .field("evaluators", &self.evaluators.len())
            .field("services", &self.services.len())
            .field("routes", &self.routes)
            .finish_non_exhaustive()
    }
}

/// Owned pieces of a bundle, consumed by the index builder.
pub(crate) struct PluginParts {
    pub(crate) name: String,
    pub(crate) description: String,
    pub(crate) version: String,
    pub(crate) init: Option<Arc<dyn PluginInit>>,
    pub(crate) actions: Vec<Arc<dyn Action>>,
    pub(crate) providers: Vec<Arc<dyn Provider>>,
    pub(crate) evaluators: Vec<Arc<dyn Evaluator>>,
    pub(crate) services: Vec<Arc<dyn Service>>,
    pub(crate) routes: Vec<Route>,
}
