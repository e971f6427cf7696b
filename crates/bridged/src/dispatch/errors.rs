//! Error types for request dispatch failures.
//!
//! Every variant is a protocol-level failure: it is reported to the host as
//! an `error` response for the offending request and never ends the session.
//! Failures a capability reports through its own result shape (an action
//! that is not found, a service that fails to start) are not errors here.

use bridge_plugins::CapabilityError;
use thiserror::Error;

use super::request::RequestKind;

/// Errors surfaced during request parsing and dispatch.
#[derive(Debug, Error)]
pub enum DispatchError {
    /// Request line is not valid JSON.
    #[error("malformed JSON: {source}")]
    MalformedJson {
        /// Parser error.
        #[source]
        source: serde_json::Error,
    },

    /// Request line is not valid UTF-8.
    #[error("request is not valid UTF-8: {message}")]
    InvalidUtf8 {
        /// Decoder error message.
        message: String,
    },

    /// Request is JSON but not a request object.
    #[error("invalid request structure: {message}")]
    InvalidStructure {
        /// Description of the structural problem.
        message: String,
    },

    /// Request names a type the bridge does not handle.
    #[error("Unknown request type: {request_type}")]
    UnknownType {
        /// Type tag supplied by the host.
        request_type: String,
    },

    /// Request fields do not match the shape required by its type.
    #[error("invalid {kind} request: {source}")]
    InvalidRequest {
        /// Request type.
        kind: RequestKind,
        /// Deserialisation error naming the offending field.
        #[source]
        source: serde_json::Error,
    },

    /// Request line exceeds the maximum size.
    #[error("request too large: {size} bytes exceeds {max_size} byte limit")]
    RequestTooLarge {
        /// Size of the rejected line.
        size: usize,
        /// Configured limit.
        max_size: usize,
    },

    /// A capability raised an error.
    #[error("{source}")]
    Capability {
        /// Request type being served.
        kind: RequestKind,
        /// Capability name or path.
        target: String,
        /// Error raised by the capability.
        #[source]
        source: CapabilityError,
    },

    /// A capability panicked.
    #[error("{kind} '{target}' panicked: {message}")]
    Panicked {
        /// Request type being served.
        kind: RequestKind,
        /// Capability name or path.
        target: String,
        /// Panic payload rendered as text.
        message: String,
    },

    /// A capability result could not be serialised.
    #[error("failed to serialise {kind} result: {source}")]
    SerializeResult {
        /// Request type being served.
        kind: RequestKind,
        /// Serialisation error.
        #[source]
        source: serde_json::Error,
    },
}

impl DispatchError {
    /// Creates a malformed JSON error.
    pub const fn malformed(source: serde_json::Error) -> Self {
        Self::MalformedJson { source }
    }

    /// Creates an invalid UTF-8 error.
    pub fn invalid_utf8(message: impl Into<String>) -> Self {
        Self::InvalidUtf8 {
            message: message.into(),
        }
    }

    /// Creates an invalid structure error.
    pub fn invalid_structure(message: impl Into<String>) -> Self {
        Self::InvalidStructure {
            message: message.into(),
        }
    }

    /// Creates an unknown type error.
    pub fn unknown_type(request_type: impl Into<String>) -> Self {
        Self::UnknownType {
            request_type: request_type.into(),
        }
    }

    /// Creates an invalid request error.
    pub const fn invalid_request(kind: RequestKind, source: serde_json::Error) -> Self {
        Self::InvalidRequest { kind, source }
    }

    /// Creates a request too large error.
    pub const fn request_too_large(size: usize, max_size: usize) -> Self {
        Self::RequestTooLarge { size, max_size }
    }

    /// Wraps an error raised by a capability.
    pub fn capability(kind: RequestKind, target: impl Into<String>, source: CapabilityError) -> Self {
        Self::Capability {
            kind,
            target: target.into(),
            source,
        }
    }

    /// Records a capability panic.
    pub fn panicked(kind: RequestKind, target: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Panicked {
            kind,
            target: target.into(),
            message: message.into(),
        }
    }

    /// Creates a result serialisation error.
    pub const fn serialize_result(kind: RequestKind, source: serde_json::Error) -> Self {
        Self::SerializeResult { kind, source }
    }
}
