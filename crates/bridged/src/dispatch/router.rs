//! Request routing to capabilities.
//!
//! The [`Dispatcher`] maps each parsed request onto the capability it names
//! and converts the outcome into a response. Every request is isolated: a
//! capability error or panic becomes a response for that request alone and
//! never reaches the read loop.

use std::any::Any;
use std::future::Future;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;

use bridge_plugins::adapter::from_wire;
use bridge_plugins::{
    ActionResult, CapabilityIndex, HandlerOptions, Memory, MockResponse, Outcome, PluginContext,
    ProviderResult, RouteRequest, State,
};
use futures::FutureExt;
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::{Map, Value};
use tracing::{debug, error, warn};

use super::envelope::ErrorEnvelopeBuilder;
use super::errors::DispatchError;
use super::request::{BridgeRequest, CorrelationId, MessagePayload, RequestEnvelope, RequestKind};
use super::response::BridgeResponse;
use super::services::{ServiceTable, StartOutcome, StopOutcome};

/// Tracing target for dispatch operations.
pub(crate) const DISPATCH_TARGET: &str = concat!(env!("CARGO_PKG_NAME"), "::dispatch");

/// Routes requests to the capabilities of a loaded plugin.
pub struct Dispatcher {
    index: Arc<CapabilityIndex>,
    context: Arc<PluginContext>,
    services: ServiceTable,
    envelopes: ErrorEnvelopeBuilder,
}

impl Dispatcher {
    /// Creates a dispatcher over `index`.
    #[must_use]
    pub fn new(index: Arc<CapabilityIndex>, envelopes: ErrorEnvelopeBuilder) -> Self {
        let context = Arc::new(PluginContext::new(index.name()));
        Self {
            index,
            context,
            services: ServiceTable::default(),
            envelopes,
        }
    }

    /// Shared plugin context.
    #[must_use]
    pub const fn context(&self) -> &Arc<PluginContext> {
        &self.context
    }

    /// Parses and dispatches a single request line.
    pub async fn dispatch_line(&self, line: &str) -> BridgeResponse {
        match RequestEnvelope::parse(line) {
            Ok(envelope) => self.dispatch(envelope).await,
            Err(rejected) => self.reject(rejected.id, &rejected.error),
        }
    }

    /// Wraps a failure that happened before a request could be routed.
    #[must_use]
    pub fn reject(&self, id: CorrelationId, error: &DispatchError) -> BridgeResponse {
        warn!(target: DISPATCH_TARGET, %id, %error, "rejected request");
        self.envelopes.build(id, error)
    }

    /// Dispatches a parsed request.
    pub async fn dispatch(&self, envelope: RequestEnvelope) -> BridgeResponse {
        let RequestEnvelope { id, request } = envelope;
        let kind = request.kind();
        let target = request.target().to_owned();
        debug!(target: DISPATCH_TARGET, %id, request_type = %kind, capability = %target, "dispatching request");

        match guarded(self.route(id.clone(), request)).await {
            Ok(Ok(response)) => response,
            Ok(Err(failure)) => {
                warn!(target: DISPATCH_TARGET, %id, request_type = %kind, capability = %target, error = %failure, "request failed");
                self.envelopes.build(id, &failure)
            }
            Err(message) => {
                let failure = DispatchError::panicked(kind, target, message);
                error!(target: DISPATCH_TARGET, %id, request_type = %kind, error = %failure, "capability panicked");
                self.envelopes.build(id, &failure)
            }
        }
    }

    /// Stops every running service. Returns how many were running.
    pub async fn shutdown(&self) -> usize {
        self.services.stop_all().await
    }

    async fn route(
        &self,
        id: CorrelationId,
        request: BridgeRequest,
    ) -> Result<BridgeResponse, DispatchError> {
        match request {
            BridgeRequest::PluginInit { config } => self.init_plugin(id, config).await,
            BridgeRequest::ActionValidate { action, payload } => {
                self.validate_action(id, &action, payload).await
            }
            BridgeRequest::ActionInvoke {
                action,
                payload,
                options,
            } => self.invoke_action(id, &action, payload, options).await,
            BridgeRequest::ProviderGet { provider, payload } => {
                self.get_provider(id, &provider, payload).await
            }
            BridgeRequest::EvaluatorValidate { evaluator, payload } => {
                self.validate_evaluator(id, &evaluator, payload).await
            }
            BridgeRequest::EvaluatorInvoke { evaluator, payload } => {
                self.invoke_evaluator(id, &evaluator, payload).await
            }
            BridgeRequest::ServiceStart { service_type } => {
                Ok(self.start_service(id, &service_type).await)
            }
            BridgeRequest::ServiceStop { service_type } => {
                Ok(self.stop_service(id, &service_type).await)
            }
            BridgeRequest::RouteHandle { path, request } => {
                self.handle_route(id, &path, request).await
            }
        }
    }

    async fn init_plugin(
        &self,
        id: CorrelationId,
        config: Option<Value>,
    ) -> Result<BridgeResponse, DispatchError> {
        let kind = RequestKind::PluginInit;
        let settings: Map<String, Value> = decode(kind, config)?;
        self.context.apply_settings(&settings);
        if let Some(init) = self.index.init() {
            init.init(&settings, &self.context)
                .await
                .map_err(|source| DispatchError::capability(kind, self.index.name(), source))?;
        }
        Ok(BridgeResponse::PluginInit { id, success: true })
    }

    async fn validate_action(
        &self,
        id: CorrelationId,
        name: &str,
        payload: MessagePayload,
    ) -> Result<BridgeResponse, DispatchError> {
        let kind = RequestKind::ActionValidate;
        let Some(action) = self.index.action(name) else {
            return Ok(BridgeResponse::Validate { id, valid: false });
        };
        let (message, state) = decode_payload(kind, payload)?;
        let valid = action
            .validate(&self.context, &message, &state)
            .await
            .map_err(|source| DispatchError::capability(kind, name, source))?;
        Ok(BridgeResponse::Validate { id, valid })
    }

    async fn invoke_action(
        &self,
        id: CorrelationId,
        name: &str,
        payload: MessagePayload,
        options: Option<Value>,
    ) -> Result<BridgeResponse, DispatchError> {
        let kind = RequestKind::ActionInvoke;
        let Some(action) = self.index.action(name) else {
            let missing = ActionResult::failure(format!("Action not found: {name}"));
            let result = encode(kind, Some(&Outcome::from(missing)))?;
            return Ok(BridgeResponse::Action { id, result });
        };
        let (message, state) = decode_payload(kind, payload)?;
        let handler_options: HandlerOptions = decode(kind, options)?;
        let outcome = action
            .handle(&self.context, &message, &state, &handler_options)
            .await
            .map_err(|source| DispatchError::capability(kind, name, source))?;
        let result = encode(kind, outcome.as_ref())?;
        Ok(BridgeResponse::Action { id, result })
    }

    async fn get_provider(
        &self,
        id: CorrelationId,
        name: &str,
        payload: MessagePayload,
    ) -> Result<BridgeResponse, DispatchError> {
        let kind = RequestKind::ProviderGet;
        let Some(provider) = self.index.provider(name) else {
            let result = encode(kind, Some(&Outcome::from(ProviderResult::empty())))?;
            return Ok(BridgeResponse::Provider { id, result });
        };
        let (message, state) = decode_payload(kind, payload)?;
        let outcome = provider
            .get(&self.context, &message, &state)
            .await
            .map_err(|source| DispatchError::capability(kind, name, source))?;
        let result = encode(kind, Some(&outcome))?;
        Ok(BridgeResponse::Provider { id, result })
    }

    async fn validate_evaluator(
        &self,
        id: CorrelationId,
        name: &str,
        payload: MessagePayload,
    ) -> Result<BridgeResponse, DispatchError> {
        let kind = RequestKind::EvaluatorValidate;
        let Some(evaluator) = self.index.evaluator(name) else {
            return Ok(BridgeResponse::Validate { id, valid: false });
        };
        let (message, state) = decode_payload(kind, payload)?;
        let valid = evaluator
            .validate(&self.context, &message, &state)
            .await
            .map_err(|source| DispatchError::capability(kind, name, source))?;
        Ok(BridgeResponse::Validate { id, valid })
    }

    async fn invoke_evaluator(
        &self,
        id: CorrelationId,
        name: &str,
        payload: MessagePayload,
    ) -> Result<BridgeResponse, DispatchError> {
        let kind = RequestKind::EvaluatorInvoke;
        let Some(evaluator) = self.index.evaluator(name) else {
            return Ok(BridgeResponse::Evaluator {
                id,
                result: Value::Null,
            });
        };
        let (message, state) = decode_payload(kind, payload)?;
        let outcome = evaluator
            .handle(&self.context, &message, &state)
            .await
            .map_err(|source| DispatchError::capability(kind, name, source))?;
        let result = encode(kind, outcome.as_ref())?;
        Ok(BridgeResponse::Evaluator { id, result })
    }

    async fn start_service(&self, id: CorrelationId, service_type: &str) -> BridgeResponse {
        let Some(service) = self.index.service(service_type) else {
            return BridgeResponse::service(id, Err(service_not_found(service_type)));
        };
        let started = guarded(self.services.start(service, Arc::clone(&self.context))).await;
        let outcome = match started {
            Ok(Ok(StartOutcome::Started)) => {
                debug!(target: DISPATCH_TARGET, service_type, "service started");
                Ok(())
            }
            Ok(Ok(StartOutcome::AlreadyRunning)) => Ok(()),
            Ok(Err(error)) => Err(error.to_string()),
            Err(message) => Err(format!("service '{service_type}' panicked: {message}")),
        };
        if let Err(error) = &outcome {
            warn!(target: DISPATCH_TARGET, service_type, %error, "service failed to start");
        }
        BridgeResponse::service(id, outcome)
    }

    /// Stop acknowledges any service type; only a tracked instance is stopped.
    async fn stop_service(&self, id: CorrelationId, service_type: &str) -> BridgeResponse {
        let stopped = guarded(self.services.stop(service_type)).await;
        let outcome = match stopped {
            Ok(Ok(StopOutcome::Stopped)) => {
                debug!(target: DISPATCH_TARGET, service_type, "service stopped");
                Ok(())
            }
            Ok(Ok(StopOutcome::NotRunning)) => Ok(()),
            Ok(Err(error)) => Err(error.to_string()),
            Err(message) => Err(format!("service '{service_type}' panicked: {message}")),
        };
        BridgeResponse::service(id, outcome)
    }

    async fn handle_route(
        &self,
        id: CorrelationId,
        path: &str,
        request: Option<Value>,
    ) -> Result<BridgeResponse, DispatchError> {
        let kind = RequestKind::RouteHandle;
        let Some(route) = self.index.route(path) else {
            return Ok(BridgeResponse::route_error(
                id,
                404,
                format!("Route not found: {path}"),
            ));
        };
        let Some(handler) = route.handler() else {
            return Ok(BridgeResponse::route_error(
                id,
                501,
                format!("Route handler not implemented: {path}"),
            ));
        };
        let route_request =
            decode::<RouteRequest>(kind, request)?.fill_defaults(route.method(), path);
        let mut response = MockResponse::new();
        let handled = guarded(handler.handle(&self.context, &route_request, &mut response)).await;
        match handled {
            Ok(Ok(())) => Ok(BridgeResponse::Route {
                id,
                status: response.status_code(),
                body: response.body().clone(),
                headers: Some(response.headers().clone()),
            }),
            Ok(Err(error)) => {
                warn!(target: DISPATCH_TARGET, path, %error, "route handler failed");
                Ok(BridgeResponse::route_error(id, 500, error.to_string()))
            }
            Err(message) => {
                error!(target: DISPATCH_TARGET, path, panic = %message, "route handler panicked");
                Ok(BridgeResponse::route_error(id, 500, message))
            }
        }
    }
}

fn service_not_found(service_type: &str) -> String {
    format!("Service not found: {service_type}")
}

fn decode<T>(kind: RequestKind, value: Option<Value>) -> Result<T, DispatchError>
where
    T: DeserializeOwned + Default,
{
    from_wire(value).map_err(|source| DispatchError::invalid_request(kind, source))
}

fn decode_payload(
    kind: RequestKind,
    payload: MessagePayload,
) -> Result<(Memory, State), DispatchError> {
    let message = decode(kind, payload.message)?;
    let state = decode(kind, payload.state)?;
    Ok((message, state))
}

fn encode<T>(kind: RequestKind, outcome: Option<&Outcome<T>>) -> Result<Value, DispatchError>
where
    T: Serialize,
{
    outcome
        .map_or(Ok(Value::Null), Outcome::to_wire)
        .map_err(|source| DispatchError::serialize_result(kind, source))
}

/// Runs `future`, converting a panic into its message.
async fn guarded<F>(future: F) -> Result<F::Output, String>
where
    F: Future,
{
    AssertUnwindSafe(future)
        .catch_unwind()
        .await
        .map_err(|payload| panic_message(&*payload))
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        (*message).to_owned()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        String::from("unknown panic payload")
    }
}
