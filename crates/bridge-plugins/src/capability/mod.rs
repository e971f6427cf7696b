//! Capability interfaces implemented by plugins.
//!
//! A plugin exposes five kinds of capability. Each kind is an explicit trait
//! with a uniform identifier accessor (`name`, `service_type`, or a route's
//! path) so the loader can index implementations without introspection.
//! Capabilities are invoked through shared references from many requests at
//! once, hence the `Send + Sync` bounds and `&self` receivers; state that
//! must change over time belongs behind interior mutability or in a running
//! [`ServiceHandle`].

mod context;

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::{Map, Value};

use crate::error::CapabilityError;
use crate::outcome::{ActionResult, Outcome, ProviderResult};
use crate::value::{HandlerOptions, Memory, State};

pub use self::context::PluginContext;

/// Result of an action or evaluator handler.
///
/// `None` means the handler produced nothing, reported as `null`.
pub type HandlerOutcome = Result<Option<Outcome<ActionResult>>, CapabilityError>;

/// A named operation the host may ask the plugin to perform.
#[async_trait]
pub trait Action: Send + Sync {
    /// Unique action name used for lookup.
    fn name(&self) -> &str;

    /// Human-readable description.
    fn description(&self) -> &str;

    /// Alternative names the host may match against.
    fn similes(&self) -> &[String] {
        &[]
    }

    /// Decides whether the action applies to `message`.
    ///
    /// # Errors
    ///
    /// Returns [`CapabilityError`] when validation cannot be performed.
    async fn validate(
        &self,
        context: &PluginContext,
        message: &Memory,
        state: &State,
    ) -> Result<bool, CapabilityError>;

    /// Runs the action.
    ///
    /// # Errors
    ///
    /// Returns [`CapabilityError`] when the handler fails outright. Expected
    /// failures should be reported as [`ActionResult::failure`] instead.
    async fn handle(
        &self,
        context: &PluginContext,
        message: &Memory,
        state: &State,
        options: &HandlerOptions,
    ) -> HandlerOutcome;
}

/// Supplies context to the host before it composes a response.
#[async_trait]
pub trait Provider: Send + Sync {
    /// Unique provider name used for lookup.
    fn name(&self) -> &str;

    /// Optional human-readable description.
    fn description(&self) -> Option<&str> {
        None
    }

    /// Whether the provider must be re-run for every message.
    fn dynamic(&self) -> bool {
        false
    }

    /// Ordering hint relative to other providers.
    fn position(&self) -> Option<i64> {
        None
    }

    /// Whether the provider is hidden from default composition.
    fn private(&self) -> bool {
        false
    }

    /// Produces the provider's contribution.
    ///
    /// # Errors
    ///
    /// Returns [`CapabilityError`] when the provider cannot produce a result.
    async fn get(
        &self,
        context: &PluginContext,
        message: &Memory,
        state: &State,
    ) -> Result<Outcome<ProviderResult>, CapabilityError>;
}

/// Post-processes a conversation turn.
#[async_trait]
pub trait Evaluator: Send + Sync {
    /// Unique evaluator name used for lookup.
    fn name(&self) -> &str;

    /// Human-readable description.
    fn description(&self) -> &str;

    /// Whether the host should run the evaluator on every turn.
    fn always_run(&self) -> bool {
        false
    }

    /// Alternative names the host may match against.
    fn similes(&self) -> &[String] {
        &[]
    }

    /// Decides whether the evaluator applies to `message`. Applies by default.
    ///
    /// # Errors
    ///
    /// Returns [`CapabilityError`] when validation cannot be performed.
    async fn validate(
        &self,
        _context: &PluginContext,
        _message: &Memory,
        _state: &State,
    ) -> Result<bool, CapabilityError> {
        Ok(true)
    }

    /// Runs the evaluator.
    ///
    /// # Errors
    ///
    /// Returns [`CapabilityError`] when evaluation fails.
    async fn handle(&self, context: &PluginContext, message: &Memory, state: &State)
    -> HandlerOutcome;
}

/// A long-running background component.
#[async_trait]
pub trait Service: Send + Sync {
    /// Service type identifier used for lookup.
    fn service_type(&self) -> &str;

    /// Optional human-readable description.
    fn description(&self) -> Option<&str> {
        None
    }

    /// Starts an instance of the service.
    ///
    /// # Errors
    ///
    /// Returns [`CapabilityError`] when the service cannot start.
    async fn start(
        &self,
        context: Arc<PluginContext>,
    ) -> Result<Box<dyn ServiceHandle>, CapabilityError>;
}

/// A running service instance.
#[async_trait]
pub trait ServiceHandle: Send {
    /// Stops the instance and releases its resources.
    ///
    /// # Errors
    ///
    /// Returns [`CapabilityError`] when shutdown fails.
    async fn stop(&mut self) -> Result<(), CapabilityError>;
}

/// One-off initialisation hook run on `plugin.init`.
#[async_trait]
pub trait PluginInit: Send + Sync {
    /// Initialises the plugin with host-provided configuration.
    ///
    /// # Errors
    ///
    /// Returns [`CapabilityError`] when the configuration is rejected.
    async fn init(
        &self,
        config: &Map<String, Value>,
        context: &PluginContext,
    ) -> Result<(), CapabilityError>;
}
