//! Response envelopes written to the host.
//!
//! Each variant serialises to a single JSON object whose `type` mirrors the
//! request verb as `<verb>.result`, except the handshake (`ready`) and
//! protocol failures (`error`).

use std::collections::BTreeMap;

use bridge_plugins::CapabilityManifest;
use serde::Serialize;
use serde_json::Value;

use super::request::CorrelationId;

/// Messages sent from the bridge to the host.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type")]
pub enum BridgeResponse {
    /// Capability handshake, sent once before any input is read.
    #[serde(rename = "ready")]
    Ready {
        /// Capabilities offered by the loaded plugin.
        manifest: CapabilityManifest,
    },
    /// Answer to `plugin.init`.
    #[serde(rename = "plugin.init.result")]
    PluginInit {
        /// Correlation id.
        id: CorrelationId,
        /// Always `true`; failures are reported as `error`.
        success: bool,
    },
    /// Answer to `action.validate` and `evaluator.validate`.
    #[serde(rename = "validate.result")]
    Validate {
        /// Correlation id.
        id: CorrelationId,
        /// Whether the capability applies.
        valid: bool,
    },
    /// Answer to `action.invoke`.
    #[serde(rename = "action.result")]
    Action {
        /// Correlation id.
        id: CorrelationId,
        /// Serialised action result, or `null`.
        result: Value,
    },
    /// Answer to `provider.get`.
    #[serde(rename = "provider.result")]
    Provider {
        /// Correlation id.
        id: CorrelationId,
        /// Serialised provider result.
        result: Value,
    },
    /// Answer to `evaluator.invoke`.
    #[serde(rename = "evaluator.result")]
    Evaluator {
        /// Correlation id.
        id: CorrelationId,
        /// Serialised evaluator result, or `null`.
        result: Value,
    },
    /// Answer to `service.start` and `service.stop`.
    #[serde(rename = "service.result")]
    Service {
        /// Correlation id.
        id: CorrelationId,
        /// Whether the operation succeeded.
        success: bool,
        /// Failure description.
        #[serde(skip_serializing_if = "Option::is_none")]
        error: Option<String>,
    },
    /// Answer to `route.handle`.
    #[serde(rename = "route.result")]
    Route {
        /// Correlation id.
        id: CorrelationId,
        /// HTTP status code.
        status: u16,
        /// Response body.
        body: Value,
        /// Response headers, present when a handler ran.
        #[serde(skip_serializing_if = "Option::is_none")]
        headers: Option<BTreeMap<String, String>>,
    },
    /// Protocol-level failure.
    #[serde(rename = "error")]
    Error {
        /// Correlation id, empty when the request could not be read.
        id: CorrelationId,
        /// Failure message.
        error: String,
        /// Diagnostic detail, present only in debug mode.
        #[serde(skip_serializing_if = "Option::is_none")]
        details: Option<String>,
    },
}

impl BridgeResponse {
    /// Creates a service outcome.
    pub fn service(id: CorrelationId, outcome: Result<(), String>) -> Self {
        match outcome {
            Ok(()) => Self::Service {
                id,
                success: true,
                error: None,
            },
            Err(error) => Self::Service {
                id,
                success: false,
                error: Some(error),
            },
        }
    }

    /// Creates a route response carrying `{"error": message}`.
    pub fn route_error(id: CorrelationId, status: u16, message: impl Into<String>) -> Self {
        let mut body = serde_json::Map::new();
        body.insert(String::from("error"), Value::String(message.into()));
        Self::Route {
            id,
            status,
            body: Value::Object(body),
            headers: None,
        }
    }

    /// Returns the correlation id, if the message answers a request.
    #[must_use]
    pub const fn id(&self) -> Option<&CorrelationId> {
        match self {
            Self::Ready { .. } => None,
            Self::PluginInit { id, .. }
            | Self::Validate { id, .. }
            | Self::Action { id, .. }
            | Self::Provider { id, .. }
            | Self::Evaluator { id, .. }
            | Self::Service { id, .. }
            | Self::Route { id, .. }
            | Self::Error { id, .. } => Some(id),
        }
    }

    /// Returns `true` for protocol-level failures.
    #[must_use]
    pub const fn is_error(&self) -> bool {
        matches!(self, Self::Error { .. })
    }
}
