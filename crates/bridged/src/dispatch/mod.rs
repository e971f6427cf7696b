//! Request parsing, routing, and response construction.
//!
//! Each request line is parsed into a [`RequestEnvelope`], routed by the
//! [`Dispatcher`] to the capability it names, and answered with exactly one
//! [`BridgeResponse`] carrying the same correlation id. Failures at any stage
//! become `error` responses; nothing a single request does can end the
//! session.

mod envelope;
mod errors;
mod request;
mod response;
mod router;
mod services;

pub use envelope::ErrorEnvelopeBuilder;
pub use errors::DispatchError;
pub use request::{
    BridgeRequest, CorrelationId, MessagePayload, RejectedRequest, RequestEnvelope, RequestKind,
};
pub use response::BridgeResponse;
pub use router::Dispatcher;
