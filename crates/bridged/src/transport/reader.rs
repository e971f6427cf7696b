//! Bounded line reader for the request stream.

use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncReadExt};
use tracing::trace;

use super::{TRANSPORT_TARGET, TransportError};

/// One unit of input handed to the dispatcher.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Frame {
    /// A complete, non-blank line without its terminator.
    Line(String),
    /// A line longer than the configured limit; its bytes were discarded.
    Oversized {
        /// Number of bytes in the discarded line.
        size: usize,
        /// Configured limit.
        max_size: usize,
    },
    /// A line that is not valid UTF-8.
    InvalidUtf8 {
        /// Decoder error message.
        message: String,
    },
}

/// Reads newline-delimited frames, skipping blank lines.
#[derive(Debug)]
pub struct LineReader<R> {
    reader: R,
    max_line_bytes: usize,
    buffer: Vec<u8>,
}

impl<R> LineReader<R>
where
    R: AsyncBufRead + Unpin,
{
    /// Wraps `reader`, rejecting lines longer than `max_line_bytes`.
    pub fn new(reader: R, max_line_bytes: usize) -> Self {
        Self {
            reader,
            max_line_bytes,
            buffer: Vec::new(),
        }
    }

    /// Returns the next frame, or `None` at end of input.
    ///
    /// A final line without a trailing newline is still returned.
    ///
    /// # Errors
    ///
    /// Returns [`TransportError::Read`] when the underlying stream fails.
    pub async fn next_frame(&mut self) -> Result<Option<Frame>, TransportError> {
        loop {
            self.buffer.clear();
            let limit = u64::try_from(self.max_line_bytes.saturating_add(1)).unwrap_or(u64::MAX);
            let read = (&mut self.reader)
                .take(limit)
                .read_until(b'\n', &mut self.buffer)
                .await
                .map_err(TransportError::read)?;
            if read == 0 {
                return Ok(None);
            }

            let terminated = self.buffer.last() == Some(&b'\n');
            if !terminated && self.buffer.len() > self.max_line_bytes {
                let discarded = self.discard_rest_of_line().await?;
                return Ok(Some(Frame::Oversized {
                    size: self.buffer.len() + discarded,
                    max_size: self.max_line_bytes,
                }));
            }

            let content = strip_terminator(&self.buffer);
            if content.iter().all(u8::is_ascii_whitespace) {
                trace!(target: TRANSPORT_TARGET, "skipping blank line");
                continue;
            }

            return Ok(Some(match std::str::from_utf8(content) {
                Ok(text) => Frame::Line(text.to_owned()),
                Err(error) => Frame::InvalidUtf8 {
                    message: error.to_string(),
                },
            }));
        }
    }

    async fn discard_rest_of_line(&mut self) -> Result<usize, TransportError> {
        let mut discarded = 0;
        loop {
            let available = self.reader.fill_buf().await.map_err(TransportError::read)?;
            if available.is_empty() {
                return Ok(discarded);
            }
            let (consumed, finished) = match available.iter().position(|byte| *byte == b'\n') {
                Some(index) => (index + 1, true),
                None => (available.len(), false),
            };
            self.reader.consume(consumed);
            discarded += consumed;
            if finished {
                return Ok(discarded);
            }
        }
    }
}

fn strip_terminator(line: &[u8]) -> &[u8] {
    let without_newline = line.strip_suffix(b"\n").unwrap_or(line);
    without_newline
        .strip_suffix(b"\r")
        .unwrap_or(without_newline)
}
