//! Crate-level test doubles and BDD tests.

use std::sync::Arc;

use async_trait::async_trait;

use crate::capability::{
    Action, Evaluator, HandlerOutcome, PluginContext, Provider, Service, ServiceHandle,
};
use crate::error::CapabilityError;
use crate::outcome::{ActionResult, Outcome, ProviderResult};
use crate::plugin::Plugin;
use crate::route::{Route, RouteMethod};
use crate::value::{HandlerOptions, Memory, State};


/// Action that replies with a fixed text and remembers its description.
pub(crate) struct StubAction {
    pub(crate) name: String,
    pub(crate) description: String,
}

impl StubAction {
    pub(crate) fn new(name: &str, description: &str) -> Arc<dyn Action> {
        Arc::new(Self {
            name: name.to_owned(),
            description: description.to_owned(),
        })
    }
}

#[async_trait]
impl Action for StubAction {
    fn name(&self) -> &str {
        &self.name
    }

    fn description(&self) -> &str {
        &self.description
    }

    async fn validate(
        &self,
        _context: &PluginContext,
        _message: &Memory,
        _state: &State,
    ) -> Result<bool, CapabilityError> {
        Ok(true)
    }

    async fn handle(
        &self,
        _context: &PluginContext,
        _message: &Memory,
        _state: &State,
        _options: &HandlerOptions,
    ) -> HandlerOutcome {
        Ok(Some(Outcome::from(
            ActionResult::success().with_text(self.description.clone()),
        )))
    }
}

pub(crate) struct StubProvider(pub(crate) &'static str);

#[async_trait]
impl Provider for StubProvider {
    fn name(&self) -> &str {
        self.0
    }

    fn dynamic(&self) -> bool {
        true
    }

    fn position(&self) -> Option<i64> {
        Some(3)
    }

    async fn get(
        &self,
        _context: &PluginContext,
        _message: &Memory,
        _state: &State,
    ) -> Result<Outcome<ProviderResult>, CapabilityError> {
        Ok(Outcome::from(ProviderResult::from_text(self.0)))
    }
}

pub(crate) struct StubEvaluator(pub(crate) &'static str);

#[async_trait]
impl Evaluator for StubEvaluator {
    fn name(&self) -> &str {
        self.0
    }

    fn description(&self) -> &str {
        "records the turn"
    }

    fn always_run(&self) -> bool {
        true
    }

    async fn handle(
        &self,
        _context: &PluginContext,
        _message: &Memory,
        _state: &State,
    ) -> HandlerOutcome {
        Ok(None)
    }
}

pub(crate) struct StubService(pub(crate) &'static str);

struct StubHandle;

#[async_trait]
impl ServiceHandle for StubHandle {
    async fn stop(&mut self) -> Result<(), CapabilityError> {
        Ok(())
    }
}

#[async_trait]
impl Service for StubService {
    fn service_type(&self) -> &str {
        self.0
    }

    async fn start(
        &self,
        _context: Arc<PluginContext>,
    ) -> Result<Box<dyn ServiceHandle>, CapabilityError> {
        Ok(Box::new(StubHandle))
    }
}

/// A plugin declaring one capability of every kind.
pub(crate) fn sample_plugin() -> Plugin {
    Plugin::new("sample", "Sample plugin")
        .with_version("1.0.0")
        .with_action(StubAction::new("GREET", "says hello"))
        .with_provider(Arc::new(StubProvider("TIME")))
        .with_evaluator(Arc::new(StubEvaluator("REFLECT")))
        .with_service(Arc::new(StubService("scheduler")))
        .with_route(
            Route::new(RouteMethod::Get, "/status")
                .with_name("status")
                .with_sync_handler(|_, response| {
                    response.send("ok");
                    Ok(())
                }),
        )
        .with_route(Route::new(RouteMethod::Post, "/upload").public(true))
}
