//! Structured logging for the bridge.
//!
//! The host reads protocol messages from the bridge's standard output, one
//! JSON object per line, and treats anything it cannot parse there as a
//! broken peer. Diagnostics therefore never touch stdout: every event is
//! written to standard error, where hosts usually forward it to their own
//! log collector. JSON output flattens event fields into one object per line
//! so a collector can merge it with the host's logs without re-parsing.

use std::io::{self, IsTerminal};

use bridge_config::{Config, LogFormat};
use once_cell::sync::OnceCell;
use tracing::{Subscriber, subscriber::SetGlobalDefaultError};
use tracing_subscriber::EnvFilter;
use tracing_subscriber::fmt::{self, MakeWriter};

static TELEMETRY_GUARD: OnceCell<()> = OnceCell::new();

/// Handle returned when telemetry has been initialised.
#[derive(Debug, Default, Clone, Copy)]
pub struct TelemetryHandle;

/// Errors encountered while configuring telemetry.
#[derive(Debug, thiserror::Error)]
pub enum TelemetryError {
    /// The configured filter expression did not parse.
    #[error("invalid log filter: {0}")]
    Filter(String),
    /// Another subscriber was already installed.
    #[error("failed to install telemetry subscriber: {0}")]
    Subscriber(SetGlobalDefaultError),
}

/// Installs the stderr subscriber on first use.
///
/// Bootstrap calls this before the plugin is resolved, so load failures are
/// logged too. Later calls return a fresh handle without touching global
/// state.
///
/// # Errors
///
/// Returns [`TelemetryError`] when the filter is invalid or a foreign
/// subscriber is already installed.
pub fn initialise(config: &Config) -> Result<TelemetryHandle, TelemetryError> {
    TELEMETRY_GUARD
        .get_or_try_init(|| install_subscriber(config))
        .map(|_| TelemetryHandle)
}

fn install_subscriber(config: &Config) -> Result<(), TelemetryError> {
    let subscriber = build_subscriber(config, io::stderr, io::stderr().is_terminal())?;
    tracing::subscriber::set_global_default(subscriber).map_err(TelemetryError::Subscriber)
}

/// Builds a subscriber writing to `writer`, which must never be stdout.
fn build_subscriber<W>(
    config: &Config,
    writer: W,
    ansi: bool,
) -> Result<Box<dyn Subscriber + Send + Sync>, TelemetryError>
where
    W: for<'writer> MakeWriter<'writer> + Send + Sync + 'static,
{
    let filter = EnvFilter::try_new(config.log_filter())
        .map_err(|error| TelemetryError::Filter(error.to_string()))?;

    let builder = fmt::Subscriber::builder()
        .with_env_filter(filter)
        .with_target(true)
        .with_level(true)
        .with_writer(writer)
        .with_ansi(ansi)
        .with_timer(fmt::time::UtcTime::rfc_3339());

    Ok(match config.log_format() {
        LogFormat::Json => Box::new(builder.json().flatten_event(true).finish()),
        LogFormat::Compact => Box::new(builder.compact().finish()),
    })
}

#[cfg(test)]
mod tests {
    use std::io::Write;
    use std::sync::{Arc, Mutex};

    use rstest::rstest;
    use serde_json::Value;

    use super::*;

    /// In-memory log sink.
    #[derive(Clone, Default)]
    struct Sink(Arc<Mutex<Vec<u8>>>);

    impl Write for Sink {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.0.lock().expect("sink lock").extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    impl Sink {
        fn lines(&self) -> Vec<String> {
            let bytes = self.0.lock().expect("sink lock").clone();
            String::from_utf8(bytes)
                .expect("logs are UTF-8")
                .lines()
                .map(str::to_owned)
                .collect()
        }
    }

    fn log_with(config: &Config) -> Vec<String> {
        let sink = Sink::default();
        let writer = sink.clone();
        let subscriber =
            build_subscriber(config, move || writer.clone(), false).expect("subscriber builds");
        tracing::subscriber::with_default(subscriber, || {
            tracing::info!(target: "bridged::session", plugin = "echo", "ready");
            tracing::debug!(target: "bridged::session", "filtered out");
        });
        sink.lines()
    }

    #[test]
    fn invalid_filter_is_reported() {
        let config = Config::for_plugin("echo").with_log_filter("bridged=loud");
        let error = install_subscriber(&config).expect_err("filter rejected");
        assert!(matches!(error, TelemetryError::Filter(_)), "error: {error}");
    }

    #[test]
    fn json_events_are_flat_single_lines() {
        let lines = log_with(&Config::for_plugin("echo").with_log_filter("info"));
        assert_eq!(lines.len(), 1, "lines: {lines:?}");
        let event: Value = serde_json::from_str(&lines[0]).expect("log line is JSON");
        assert_eq!(event["target"], "bridged::session");
        assert_eq!(event["message"], "ready");
        assert_eq!(event["plugin"], "echo");
        assert_eq!(event["level"], "INFO");
    }

    #[rstest]
    #[case::json(LogFormat::Json)]
    #[case::compact(LogFormat::Compact)]
    fn filter_level_applies_to_every_format(#[case] format: LogFormat) {
        let format_name = format.to_string();
        let config = Config::load_from_iter([
            "bridged",
            "echo",
            "--log-filter",
            "bridged=debug",
            "--log-format",
            format_name.as_str(),
        ])
        .expect("arguments parse");
        let lines = log_with(&config);
        assert_eq!(lines.len(), 2, "lines: {lines:?}");
        assert!(lines[1].contains("filtered out"), "lines: {lines:?}");
    }
}
