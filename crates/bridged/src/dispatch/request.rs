//! Request parsing for the dispatch loop.
//!
//! A request line is a JSON object carrying a `type` tag, an optional `id`,
//! and per-type fields. Parsing proceeds in stages so that every failure can
//! still be answered with the caller's correlation id whenever one could be
//! read: JSON syntax, then object shape, then `id`, then `type`, then the
//! per-type fields.

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::errors::DispatchError;

/// Opaque correlation token echoed from request to response.
///
/// Any JSON value is accepted. A missing or `null` id is echoed as `""`.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(transparent)]
pub struct CorrelationId(Value);

impl CorrelationId {
    /// The id used when a request carries none or cannot be parsed.
    #[must_use]
    pub fn empty() -> Self {
        Self(Value::String(String::new()))
    }

    /// Builds an id from the request's `id` field.
    #[must_use]
    pub fn from_wire(value: Option<&Value>) -> Self {
        match value {
            None | Some(Value::Null) => Self::empty(),
            Some(other) => Self(other.clone()),
        }
    }

    /// Returns the raw JSON value.
    #[must_use]
    pub const fn as_value(&self) -> &Value {
        &self.0
    }
}

impl Default for CorrelationId {
    fn default() -> Self {
        Self::empty()
    }
}

impl From<&str> for CorrelationId {
    fn from(value: &str) -> Self {
        Self(Value::String(value.to_owned()))
    }
}

impl fmt::Display for CorrelationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.0 {
            Value::String(text) => f.write_str(text),
            other => write!(f, "{other}"),
        }
    }
}

/// Request types understood by the dispatcher.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RequestKind {
    /// `plugin.init`
    PluginInit,
    /// `action.validate`
    ActionValidate,
    /// `action.invoke`
    ActionInvoke,
    /// `provider.get`
    ProviderGet,
    /// `evaluator.validate`
    EvaluatorValidate,
    /// `evaluator.invoke`
    EvaluatorInvoke,
    /// `service.start`
    ServiceStart,
    /// `service.stop`
    ServiceStop,
    /// `route.handle`
    RouteHandle,
}

impl RequestKind {
    /// Parses a wire type tag. Matching is exact.
    ///
    /// # Errors
    ///
    /// Returns [`DispatchError::UnknownType`] for an unrecognised tag.
    pub fn parse(value: &str) -> Result<Self, DispatchError> {
        match value {
            "plugin.init" => Ok(Self::PluginInit),
            "action.validate" => Ok(Self::ActionValidate),
            "action.invoke" => Ok(Self::ActionInvoke),
            "provider.get" => Ok(Self::ProviderGet),
            "evaluator.validate" => Ok(Self::EvaluatorValidate),
            "evaluator.invoke" => Ok(Self::EvaluatorInvoke),
            "service.start" => Ok(Self::ServiceStart),
            "service.stop" => Ok(Self::ServiceStop),
            "route.handle" => Ok(Self::RouteHandle),
            _ => Err(DispatchError::unknown_type(value)),
        }
    }

    /// Returns the wire type tag.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::PluginInit => "plugin.init",
            Self::ActionValidate => "action.validate",
            Self::ActionInvoke => "action.invoke",
            Self::ProviderGet => "provider.get",
            Self::EvaluatorValidate => "evaluator.validate",
            Self::EvaluatorInvoke => "evaluator.invoke",
            Self::ServiceStart => "service.start",
            Self::ServiceStop => "service.stop",
            Self::RouteHandle => "route.handle",
        }
    }
}

impl fmt::Display for RequestKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Payload fields shared by capability requests that receive a message.
///
/// `memory` is accepted in place of `message`. When both are present,
/// `message` wins.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(from = "WireMessagePayload")]
pub struct MessagePayload {
    /// Message record; missing or `null` becomes an empty record.
    pub message: Option<Value>,
    /// Context state; missing or `null` becomes an empty state.
    pub state: Option<Value>,
}

#[derive(Deserialize)]
struct WireMessagePayload {
    #[serde(default)]
    message: Option<Value>,
    #[serde(default)]
    memory: Option<Value>,
    #[serde(default)]
    state: Option<Value>,
}

impl From<WireMessagePayload> for MessagePayload {
    fn from(wire: WireMessagePayload) -> Self {
        Self {
            message: wire.message.or(wire.memory),
            state: wire.state,
        }
    }
}

/// A fully parsed request body.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "type")]
pub enum BridgeRequest {
    /// Initialise the plugin with host configuration.
    #[serde(rename = "plugin.init")]
    PluginInit {
        /// Free-form configuration map.
        #[serde(default)]
        config: Option<Value>,
    },
    /// Ask whether an action applies.
    #[serde(rename = "action.validate")]
    ActionValidate {
        /// Action name.
        action: String,
        /// Message and state.
        #[serde(flatten)]
        payload: MessagePayload,
    },
    /// Run an action.
    #[serde(rename = "action.invoke")]
    ActionInvoke {
        /// Action name.
        action: String,
        /// Message and state.
        #[serde(flatten)]
        payload: MessagePayload,
        /// Handler options.
        #[serde(default)]
        options: Option<Value>,
    },
    /// Fetch a provider's contribution.
    #[serde(rename = "provider.get")]
    ProviderGet {
        /// Provider name.
        provider: String,
        /// Message and state.
        #[serde(flatten)]
        payload: MessagePayload,
    },
    /// Ask whether an evaluator applies.
    #[serde(rename = "evaluator.validate")]
    EvaluatorValidate {
        /// Evaluator name.
        evaluator: String,
        /// Message and state.
        #[serde(flatten)]
        payload: MessagePayload,
    },
    /// Run an evaluator.
    #[serde(rename = "evaluator.invoke")]
    EvaluatorInvoke {
        /// Evaluator name.
        evaluator: String,
        /// Message and state.
        #[serde(flatten)]
        payload: MessagePayload,
    },
    /// Start a service.
    #[serde(rename = "service.start")]
    ServiceStart {
        /// Service type identifier.
        #[serde(rename = "serviceType")]
        service_type: String,
    },
    /// Stop a service.
    #[serde(rename = "service.stop")]
    ServiceStop {
        /// Service type identifier.
        #[serde(rename = "serviceType")]
        service_type: String,
    },
    /// Handle a route request.
    #[serde(rename = "route.handle")]
    RouteHandle {
        /// Route path.
        path: String,
        /// Mock request fields.
        #[serde(default)]
        request: Option<Value>,
    },
}

impl BridgeRequest {
    /// Returns the request's type.
    #[must_use]
    pub const fn kind(&self) -> RequestKind {
        match self {
            Self::PluginInit { .. } => RequestKind::PluginInit,
            Self::ActionValidate { .. } => RequestKind::ActionValidate,
            Self::ActionInvoke { .. } => RequestKind::ActionInvoke,
            Self::ProviderGet { .. } => RequestKind::ProviderGet,
            Self::EvaluatorValidate { .. } => RequestKind::EvaluatorValidate,
            Self::EvaluatorInvoke { .. } => RequestKind::EvaluatorInvoke,
            Self::ServiceStart { .. } => RequestKind::ServiceStart,
            Self::ServiceStop { .. } => RequestKind::ServiceStop,
            Self::RouteHandle { .. } => RequestKind::RouteHandle,
        }
    }

    /// Returns the capability the request addresses, for logging.
    #[must_use]
    pub fn target(&self) -> &str {
        match self {
            Self::PluginInit { .. } => "",
            Self::ActionValidate { action, .. } | Self::ActionInvoke { action, .. } => action,
            Self::ProviderGet { provider, .. } => provider,
            Self::EvaluatorValidate { evaluator, .. } | Self::EvaluatorInvoke { evaluator, .. } => {
                evaluator
            }
            Self::ServiceStart { service_type } | Self::ServiceStop { service_type } => {
                service_type
            }
            Self::RouteHandle { path, .. } => path,
        }
    }
}

/// A parsed request with its correlation id.
#[derive(Debug, Clone, PartialEq)]
pub struct RequestEnvelope {
    /// Correlation id echoed in the response.
    pub id: CorrelationId,
    /// Parsed request body.
    pub request: BridgeRequest,
}

/// A request that could not be parsed, with whatever id could be recovered.
#[derive(Debug)]
pub struct RejectedRequest {
    /// Correlation id, empty when the line was not a JSON object.
    pub id: CorrelationId,
    /// Reason the request was rejected.
    pub error: DispatchError,
}

impl RejectedRequest {
    fn new(id: CorrelationId, error: DispatchError) -> Self {
        Self { id, error }
    }
}

impl RequestEnvelope {
    /// Parses a request line.
    ///
    /// # Errors
    ///
    /// Returns a [`RejectedRequest`] when the line is not JSON, not an
    /// object, lacks a string `type`, names an unknown type, or carries
    /// fields of the wrong shape.
    pub fn parse(line: &str) -> Result<Self, RejectedRequest> {
        let value: Value = serde_json::from_str(line).map_err(|source| {
            RejectedRequest::new(CorrelationId::empty(), DispatchError::malformed(source))
        })?;
        let Value::Object(fields) = value else {
            return Err(RejectedRequest::new(
                CorrelationId::empty(),
                DispatchError::invalid_structure("request must be a JSON object"),
            ));
        };

        let id = CorrelationId::from_wire(fields.get("id"));
        let kind = match fields.get("type") {
            Some(Value::String(tag)) => RequestKind::parse(tag),
            Some(_) => Err(DispatchError::invalid_structure("type field must be a string")),
            None => Err(DispatchError::invalid_structure("missing type field")),
        }
        .map_err(|error| RejectedRequest::new(id.clone(), error))?;

        let request =
            parse_body(kind, fields).map_err(|error| RejectedRequest::new(id.clone(), error))?;
        Ok(Self { id, request })
    }
}

fn parse_body(kind: RequestKind, fields: Map<String, Value>) -> Result<BridgeRequest, DispatchError> {
    serde_json::from_value(Value::Object(fields))
        .map_err(|source| DispatchError::invalid_request(kind, source))
}
