//! Uniform wrapping of dispatch failures into `error` responses.

use std::error::Error as StdError;

use super::errors::DispatchError;
use super::request::CorrelationId;
use super::response::BridgeResponse;

/// Builds `error` responses, attaching diagnostics only in debug mode.
///
/// Request contents can contain secrets, so the default response carries the
/// failure message alone.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ErrorEnvelopeBuilder {
    debug: bool,
}

impl ErrorEnvelopeBuilder {
    /// Creates a builder; `debug` enables the `details` field.
    #[must_use]
    pub const fn new(debug: bool) -> Self {
        Self { debug }
    }

    /// Whether responses carry diagnostic detail.
    #[must_use]
    pub const fn debug(self) -> bool {
        self.debug
    }

    /// Wraps `error` into an `error` response for `id`.
    #[must_use]
    pub fn build(self, id: CorrelationId, error: &DispatchError) -> BridgeResponse {
        BridgeResponse::Error {
            id,
            error: error.to_string(),
            details: self.debug.then(|| diagnostic_text(error)),
        }
    }
}

/// Renders the debug representation followed by the source chain.
fn diagnostic_text(error: &(dyn StdError + 'static)) -> String {
    let mut lines = vec![format!("{error:?}")];
    let mut source = error.source();
    while let Some(cause) = source {
        lines.push(format!("caused by: {cause}"));
        source = cause.source();
    }
    lines.join("\n")
}
