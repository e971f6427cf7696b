//! Line writer for the response stream.

use serde::Serialize;
use tokio::io::{AsyncWrite, AsyncWriteExt};

use super::TransportError;

/// Serialises messages as single JSON lines and flushes each one.
#[derive(Debug)]
pub struct LineWriter<W> {
    writer: W,
}

impl<W> LineWriter<W>
where
    W: AsyncWrite + Unpin,
{
    /// Wraps `writer`.
    pub const fn new(writer: W) -> Self {
        Self { writer }
    }

    /// Writes `message` followed by a newline, then flushes.
    ///
    /// JSON serialisation escapes embedded newlines, so each message occupies
    /// exactly one line.
    ///
    /// # Errors
    ///
    /// Returns [`TransportError`] when serialisation, writing, or flushing
    /// fails.
    pub async fn send<T>(&mut self, message: &T) -> Result<(), TransportError>
    where
        T: Serialize + ?Sized,
    {
        let mut line = serde_json::to_vec(message)
            .map_err(|source| TransportError::Serialize { source })?;
        line.push(b'\n');
        self.writer
            .write_all(&line)
            .await
            .map_err(TransportError::write)?;
        self.writer.flush().await.map_err(TransportError::write)
    }

    /// Returns the wrapped writer.
    pub fn into_inner(self) -> W {
        self.writer
    }
}
