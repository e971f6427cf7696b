//! Fixture plugin exercising every dispatch path.

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use bridge_config::DispatchMode;
use bridge_plugins::{
    Action, ActionResult, CapabilityError, CapabilityIndex, CapabilityManifest, Evaluator,
    HandlerOptions, HandlerOutcome, Memory, Outcome, Plugin, PluginContext, PluginInit, Provider,
    ProviderResult, Route, RouteMethod, Service, ServiceHandle, State,
};
use serde_json::{Map, Value, json};

use crate::dispatch::{Dispatcher, ErrorEnvelopeBuilder};
use crate::session::Session;

/// Counts service lifecycle calls made by the fixture plugin.
#[derive(Debug, Default)]
pub struct ServiceProbe {
    starts: AtomicUsize,
    stops: AtomicUsize,
}

impl ServiceProbe {
    pub fn starts(&self) -> usize {
        self.starts.load(Ordering::SeqCst)
    }

    pub fn stops(&self) -> usize {
        self.stops.load(Ordering::SeqCst)
    }
}

/// Builds a dispatcher over the fixture plugin.
pub fn fixture_dispatcher(debug: bool) -> (Dispatcher, Arc<ServiceProbe>) {
    let probe = Arc::new(ServiceProbe::default());
    let index = fixture_index(&probe);
    let dispatcher = Dispatcher::new(index, ErrorEnvelopeBuilder::new(debug));
    (dispatcher, probe)
}

/// Builds a session over the fixture plugin.
pub fn fixture_session(mode: DispatchMode) -> (Session, Arc<ServiceProbe>) {
    let probe = Arc::new(ServiceProbe::default());
    let index = fixture_index(&probe);
    let manifest = Arc::new(CapabilityManifest::from_index(&index));
    let dispatcher = Arc::new(Dispatcher::new(index, ErrorEnvelopeBuilder::default()));
    (Session::new(dispatcher, manifest).with_mode(mode), probe)
}

fn fixture_index(probe: &Arc<ServiceProbe>) -> Arc<CapabilityIndex> {
    let index = CapabilityIndex::build(fixture_plugin(probe)).expect("fixture plugin indexes");
    Arc::new(index)
}

/// Plugin with well-behaved and misbehaving capabilities of every kind.
pub fn fixture_plugin(probe: &Arc<ServiceProbe>) -> Plugin {
    Plugin::new("fixture", "exercises the bridge")
        .with_version("0.3.0")
        .with_init(Arc::new(GuardedInit))
        .with_action(Arc::new(Reply))
        .with_action(Arc::new(Misbehaving::Fail))
        .with_action(Arc::new(Misbehaving::Panic))
        .with_action(Arc::new(Misbehaving::Raw))
        .with_action(Arc::new(Misbehaving::Silent))
        .with_action(Arc::new(Slow))
        .with_provider(Arc::new(Clock))
        .with_provider(Arc::new(BrokenProvider))
        .with_evaluator(Arc::new(RoomEvaluator))
        .with_service(Arc::new(Ticker {
            probe: Arc::clone(probe),
        }))
        .with_service(Arc::new(FaultyService::Refuses))
        .with_service(Arc::new(FaultyService::Explodes))
        .with_route(
            Route::new(RouteMethod::Get, "/hello")
                .with_name("hello")
                .with_sync_handler(|request, response| {
                    let name = request
                        .query
                        .get("name")
                        .and_then(Value::as_str)
                        .unwrap_or("world");
                    response
                        .status(200)
                        .set_header("x-bridge", "fixture")
                        .json(json!({"greeting": format!("hello {name}")}));
                    Ok(())
                }),
        )
        .with_route(
            Route::new(RouteMethod::Get, "/inspect").with_sync_handler(|request, response| {
                response.json(json!({
                    "method": request.method,
                    "path": request.path,
                    "body": request.body,
                }));
                Ok(())
            }),
        )
        .with_route(
            Route::new(RouteMethod::Post, "/fail")
                .with_sync_handler(|_, _| Err(CapabilityError::invalid_input("bad upload"))),
        )
        .with_route(
            Route::new(RouteMethod::Get, "/panic")
                .with_sync_handler(|_, _| panic!("route exploded")),
        )
        .with_route(Route::new(RouteMethod::Post, "/upload").public(true))
}

/// Rejects configuration carrying `"reject": true`.
struct GuardedInit;

#[async_trait]
impl PluginInit for GuardedInit {
    async fn init(
        &self,
        config: &Map<String, Value>,
        _context: &PluginContext,
    ) -> Result<(), CapabilityError> {
        if config.get("reject").and_then(Value::as_bool) == Some(true) {
            return Err(CapabilityError::failed("configuration rejected"));
        }
        Ok(())
    }
}

/// Replies with the message text, honouring a `prefix` option and setting.
struct Reply;

#[async_trait]
impl Action for Reply {
    fn name(&self) -> &str {
        "REPLY"
    }

    fn description(&self) -> &str {
        "replies with the message text"
    }

    async fn validate(
        &self,
        _context: &PluginContext,
        message: &Memory,
        _state: &State,
    ) -> Result<bool, CapabilityError> {
        Ok(message.text().is_some_and(|text| !text.is_empty()))
    }

    async fn handle(
        &self,
        context: &PluginContext,
        message: &Memory,
        _state: &State,
        options: &HandlerOptions,
    ) -> HandlerOutcome {
        let prefix = options
            .get("prefix")
            .and_then(Value::as_str)
            .map(str::to_owned)
            .or_else(|| {
                context
                    .setting("prefix")
                    .and_then(|value| value.as_str().map(str::to_owned))
            })
            .unwrap_or_default();
        let text = format!("{prefix}{}", message.text().unwrap_or_default());
        Ok(Some(Outcome::from(ActionResult::success().with_text(text))))
    }
}

/// Actions that fail in the ways a handler can.
enum Misbehaving {
    Fail,
    Panic,
    Raw,
    Silent,
}

#[async_trait]
impl Action for Misbehaving {
    fn name(&self) -> &str {
        match self {
            Self::Fail => "FAIL",
            Self::Panic => "PANIC",
            Self::Raw => "RAW",
            Self::Silent => "SILENT",
        }
    }

    fn description(&self) -> &str {
        "misbehaves on purpose"
    }

    async fn validate(
        &self,
        _context: &PluginContext,
        _message: &Memory,
        _state: &State,
    ) -> Result<bool, CapabilityError> {
        match self {
            Self::Fail => Err(CapabilityError::failed("validator offline")),
            Self::Panic => panic!("validator exploded"),
            Self::Raw | Self::Silent => Ok(true),
        }
    }

    async fn handle(
        &self,
        _context: &PluginContext,
        _message: &Memory,
        _state: &State,
        _options: &HandlerOptions,
    ) -> HandlerOutcome {
        match self {
            Self::Fail => Err(CapabilityError::failed("upstream unavailable")),
            Self::Panic => panic!("handler exploded"),
            Self::Raw => {
                let mut raw = Map::new();
                raw.insert(String::from("custom"), json!(1));
                Ok(Some(Outcome::Raw(raw)))
            }
            Self::Silent => Ok(None),
        }
    }
}

/// Replies after a short delay.
struct Slow;

#[async_trait]
impl Action for Slow {
    fn name(&self) -> &str {
        "SLOW"
    }

    fn description(&self) -> &str {
        "replies after a delay"
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
        tokio::time::sleep(Duration::from_millis(50)).await;
        Ok(Some(Outcome::from(ActionResult::success().with_text("slow"))))
    }
}

struct Clock;

#[async_trait]
impl Provider for Clock {
    fn name(&self) -> &str {
        "TIME"
    }

    async fn get(
        &self,
        _context: &PluginContext,
        _message: &Memory,
        _state: &State,
    ) -> Result<Outcome<ProviderResult>, CapabilityError> {
        Ok(Outcome::from(ProviderResult::from_text("noon")))
    }
}

struct BrokenProvider;

#[async_trait]
impl Provider for BrokenProvider {
    fn name(&self) -> &str {
        "BROKEN"
    }

    async fn get(
        &self,
        _context: &PluginContext,
        _message: &Memory,
        _state: &State,
    ) -> Result<Outcome<ProviderResult>, CapabilityError> {
        Err(CapabilityError::failed("clock skew"))
    }
}

/// Applies only to messages posted in a room.
struct RoomEvaluator;

#[async_trait]
impl Evaluator for RoomEvaluator {
    fn name(&self) -> &str {
        "REFLECT"
    }

    fn description(&self) -> &str {
        "reflects on room messages"
    }

    async fn validate(
        &self,
        _context: &PluginContext,
        message: &Memory,
        _state: &State,
    ) -> Result<bool, CapabilityError> {
        Ok(message.room_id().is_some())
    }

    async fn handle(
        &self,
        _context: &PluginContext,
        message: &Memory,
        _state: &State,
    ) -> HandlerOutcome {
        let room = message.room_id().unwrap_or_default();
        Ok(Some(Outcome::from(
            ActionResult::success().with_text(format!("reflected on {room}")),
        )))
    }
}

struct Ticker {
    probe: Arc<ServiceProbe>,
}

struct TickerHandle {
    probe: Arc<ServiceProbe>,
}

#[async_trait]
impl Service for Ticker {
    fn service_type(&self) -> &str {
        "ticker"
    }

    async fn start(
        &self,
        _context: Arc<PluginContext>,
    ) -> Result<Box<dyn ServiceHandle>, CapabilityError> {
        self.probe.starts.fetch_add(1, Ordering::SeqCst);
        Ok(Box::new(TickerHandle {
            probe: Arc::clone(&self.probe),
        }))
    }
}

#[async_trait]
impl ServiceHandle for TickerHandle {
    async fn stop(&mut self) -> Result<(), CapabilityError> {
        self.probe.stops.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

enum FaultyService {
    Refuses,
    Explodes,
}

#[async_trait]
impl Service for FaultyService {
    fn service_type(&self) -> &str {
        match self {
            Self::Refuses => "refuser",
            Self::Explodes => "exploder",
        }
    }

    async fn start(
        &self,
        _context: Arc<PluginContext>,
    ) -> Result<Box<dyn ServiceHandle>, CapabilityError> {
        match self {
            Self::Refuses => Err(CapabilityError::failed("port in use")),
            Self::Explodes => panic!("service exploded"),
        }
    }
}
