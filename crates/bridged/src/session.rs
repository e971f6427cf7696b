//! The request loop.
//!
//! A session announces the plugin's capabilities with a single `ready`
//! message, then answers every request line until the input closes. Running
//! services are stopped before the session returns.

use std::sync::Arc;

use bridge_config::DispatchMode;
use bridge_plugins::CapabilityManifest;
use tokio::io::{AsyncBufRead, AsyncWrite};
use tokio::sync::mpsc;
use tokio::task::{JoinError, JoinSet};
use tracing::{debug, info, warn};

use crate::dispatch::{BridgeResponse, CorrelationId, DispatchError, Dispatcher};
use crate::transport::{Frame, LineReader, LineWriter, MAX_LINE_BYTES, TransportError};

const SESSION_TARGET: &str = concat!(env!("CARGO_PKG_NAME"), "::session");

/// Responses buffered between concurrent dispatch tasks and the writer.
const RESPONSE_QUEUE_DEPTH: usize = 64;

/// Counters describing a finished session.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct SessionSummary {
    /// Responses written, excluding the handshake.
    pub responses: usize,
    /// Responses of type `error`.
    pub errors: usize,
    /// Services still running at end of input.
    pub services_stopped: usize,
}

impl SessionSummary {
    fn record(&mut self, response: &BridgeResponse) {
        self.responses += 1;
        if response.is_error() {
            self.errors += 1;
        }
    }
}

/// Drives a dispatcher over a request stream.
pub struct Session {
    dispatcher: Arc<Dispatcher>,
    manifest: Arc<CapabilityManifest>,
    mode: DispatchMode,
    max_line_bytes: usize,
}

impl Session {
    /// Creates a sequential session with the default line limit.
    #[must_use]
    pub fn new(dispatcher: Arc<Dispatcher>, manifest: Arc<CapabilityManifest>) -> Self {
        Self {
            dispatcher,
            manifest,
            mode: DispatchMode::Sequential,
            max_line_bytes: MAX_LINE_BYTES,
        }
    }

    /// Selects how requests are scheduled.
    #[must_use]
    pub const fn with_mode(mut self, mode: DispatchMode) -> Self {
        self.mode = mode;
        self
    }

    /// Overrides the maximum request line size.
    #[must_use]
    pub const fn with_max_line_bytes(mut self, max_line_bytes: usize) -> Self {
        self.max_line_bytes = max_line_bytes;
        self
    }

    /// Runs the session to end of input and returns the output stream.
    ///
    /// # Errors
    ///
    /// Returns [`TransportError`] when either stream fails. Running services
    /// are stopped in that case too.
    pub async fn run<R, W>(
        self,
        reader: R,
        writer: W,
    ) -> Result<(SessionSummary, W), TransportError>
    where
        R: AsyncBufRead + Unpin,
        W: AsyncWrite + Unpin + Send + 'static,
    {
        let mut line_writer = LineWriter::new(writer);
        let handshake = BridgeResponse::Ready {
            manifest: CapabilityManifest::clone(&self.manifest),
        };
        let served = match line_writer.send(&handshake).await {
            Ok(()) => {
                info!(
                    target: SESSION_TARGET,
                    plugin = %self.manifest.name,
                    mode = %self.mode,
                    "ready"
                );
                let line_reader = LineReader::new(reader, self.max_line_bytes);
                match self.mode {
                    DispatchMode::Sequential => {
                        self.serve_sequential(line_reader, line_writer).await
                    }
                    DispatchMode::Concurrent => {
                        self.serve_concurrent(line_reader, line_writer).await
                    }
                }
            }
            Err(error) => Err(error),
        };

        let services_stopped = self.dispatcher.shutdown().await;
        let (mut summary, finished_writer) = served?;
        summary.services_stopped = services_stopped;
        info!(
            target: SESSION_TARGET,
            responses = summary.responses,
            errors = summary.errors,
            services_stopped,
            "session finished"
        );
        Ok((summary, finished_writer.into_inner()))
    }

    async fn serve_sequential<R, W>(
        &self,
        mut reader: LineReader<R>,
        mut writer: LineWriter<W>,
    ) -> Result<(SessionSummary, LineWriter<W>), TransportError>
    where
        R: AsyncBufRead + Unpin,
        W: AsyncWrite + Unpin,
    {
        let mut summary = SessionSummary::default();
        while let Some(frame) = reader.next_frame().await? {
            let response = answer(&self.dispatcher, frame).await;
            writer.send(&response).await?;
            summary.record(&response);
        }
        debug!(target: SESSION_TARGET, "input closed");
        Ok((summary, writer))
    }

    async fn serve_concurrent<R, W>(
        &self,
        mut reader: LineReader<R>,
        writer: LineWriter<W>,
    ) -> Result<(SessionSummary, LineWriter<W>), TransportError>
    where
        R: AsyncBufRead + Unpin,
        W: AsyncWrite + Unpin + Send + 'static,
    {
        let (sender, receiver) = mpsc::channel(RESPONSE_QUEUE_DEPTH);
        let writer_task = tokio::spawn(write_responses(writer, receiver));
        let mut in_flight = JoinSet::new();

        let read_result = loop {
            if sender.is_closed() {
                break Ok(());
            }
            reap_finished(&mut in_flight);
            match reader.next_frame().await {
                Ok(Some(frame)) => {
                    let dispatcher = Arc::clone(&self.dispatcher);
                    let task_sender = sender.clone();
                    in_flight.spawn(async move {
                        let response = answer(&dispatcher, frame).await;
                        if task_sender.send(response).await.is_err() {
                            debug!(target: SESSION_TARGET, "writer gone; response dropped");
                        }
                    });
                }
                Ok(None) => break Ok(()),
                Err(error) => break Err(error),
            }
        };

        debug!(
            target: SESSION_TARGET,
            pending = in_flight.len(),
            "input closed; draining in-flight requests"
        );
        while let Some(joined) = in_flight.join_next().await {
            log_join(joined);
        }
        drop(sender);

        let written = writer_task
            .await
            .map_err(|_| TransportError::WriterClosed)?;
        read_result?;
        written
    }
}

/// Removes finished dispatch tasks without waiting and returns how many.
fn reap_finished(in_flight: &mut JoinSet<()>) -> usize {
    let mut reaped = 0;
    while let Some(joined) = in_flight.try_join_next() {
        log_join(joined);
        reaped += 1;
    }
    reaped
}

fn log_join(joined: Result<(), JoinError>) {
    if let Err(error) = joined {
        warn!(target: SESSION_TARGET, %error, "dispatch task failed");
    }
}

async fn write_responses<W>(
    mut writer: LineWriter<W>,
    mut receiver: mpsc::Receiver<BridgeResponse>,
) -> Result<(SessionSummary, LineWriter<W>), TransportError>
where
    W: AsyncWrite + Unpin,
{
    let mut summary = SessionSummary::default();
    while let Some(response) = receiver.recv().await {
        writer.send(&response).await?;
        summary.record(&response);
    }
    Ok((summary, writer))
}

async fn answer(dispatcher: &Dispatcher, frame: Frame) -> BridgeResponse {
    match frame {
        Frame::Line(line) => dispatcher.dispatch_line(&line).await,
        Frame::Oversized { size, max_size } => dispatcher.reject(
            CorrelationId::empty(),
            &DispatchError::request_too_large(size, max_size),
        ),
        Frame::InvalidUtf8 { message } => {
            dispatcher.reject(CorrelationId::empty(), &DispatchError::invalid_utf8(message))
        }
    }
}
