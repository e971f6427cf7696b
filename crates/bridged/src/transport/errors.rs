//! Error types for line transport operations.

use std::io;

use thiserror::Error;

/// Errors surfaced while reading requests or writing responses.
///
/// Transport errors end the session: once a stream fails there is no way to
/// report the failure to the host over the same stream.
#[derive(Debug, Error)]
pub enum TransportError {
    /// Reading from the input stream failed.
    #[error("failed to read request line: {source}")]
    Read {
        /// Underlying I/O error.
        #[source]
        source: io::Error,
    },
    /// Writing or flushing the output stream failed.
    #[error("failed to write response line: {source}")]
    Write {
        /// Underlying I/O error.
        #[source]
        source: io::Error,
    },
    /// A response could not be serialised.
    #[error("failed to serialise response: {source}")]
    Serialize {
        /// Underlying serialisation error.
        #[source]
        source: serde_json::Error,
    },
    /// The response writer task stopped before the session finished.
    #[error("response writer stopped unexpectedly")]
    WriterClosed,
}

impl TransportError {
    pub(crate) const fn read(source: io::Error) -> Self {
        Self::Read { source }
    }

    pub(crate) const fn write(source: io::Error) -> Self {
        Self::Write { source }
    }
}
