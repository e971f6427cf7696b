//! Bridge bootstrap orchestration.

use std::sync::Arc;

use bridge_config::Config;
use bridge_plugins::{LoadedPlugin, PluginError, PluginSource, load};
use thiserror::Error;
use tokio::io::{AsyncBufRead, AsyncWrite};

use crate::dispatch::{Dispatcher, ErrorEnvelopeBuilder};
use crate::health::HealthReporter;
use crate::session::{Session, SessionSummary};
use crate::telemetry::{self, TelemetryError, TelemetryHandle};
use crate::transport::TransportError;

/// Errors surfaced during bootstrap.
///
/// Every variant is reported before the `ready` message, so the host sees a
/// non-zero exit and no handshake.
#[derive(Debug, Error)]
pub enum BootstrapError {
    /// No plugin was named on the command line.
    #[error("no plugin specified")]
    MissingPlugin,
    /// Telemetry initialisation failed.
    #[error("failed to initialise telemetry: {source}")]
    Telemetry {
        /// Underlying telemetry error.
        #[source]
        source: TelemetryError,
    },
    /// The plugin could not be loaded.
    #[error("failed to load plugin: {source}")]
    Plugin {
        /// Underlying loader error.
        #[source]
        source: PluginError,
    },
}

/// A loaded plugin ready to serve requests.
pub struct Bridge {
    config: Config,
    plugin: LoadedPlugin,
    telemetry: TelemetryHandle,
    reporter: Arc<dyn HealthReporter>,
}

impl Bridge {
    /// Accessor for the resolved configuration.
    #[must_use]
    pub const fn config(&self) -> &Config {
        &self.config
    }

    /// Accessor for the loaded plugin.
    #[must_use]
    pub const fn plugin(&self) -> &LoadedPlugin {
        &self.plugin
    }

    /// Accessor for the telemetry handle, primarily useful for testing.
    #[must_use]
    pub const fn telemetry(&self) -> TelemetryHandle {
        self.telemetry
    }

    /// Builds the request loop for the loaded plugin.
    #[must_use]
    pub fn session(&self) -> Session {
        let envelopes = ErrorEnvelopeBuilder::new(self.config.debug());
        let dispatcher = Dispatcher::new(Arc::clone(self.plugin.index()), envelopes);
        Session::new(Arc::new(dispatcher), Arc::clone(self.plugin.manifest()))
            .with_mode(self.config.dispatch_mode())
    }

    /// Serves requests from `reader` until end of input.
    ///
    /// # Errors
    ///
    /// Returns [`TransportError`] when either stream fails.
    pub async fn serve<R, W>(
        &self,
        reader: R,
        writer: W,
    ) -> Result<(SessionSummary, W), TransportError>
    where
        R: AsyncBufRead + Unpin,
        W: AsyncWrite + Unpin + Send + 'static,
    {
        let (summary, output) = self.session().run(reader, writer).await?;
        self.reporter.session_finished(&summary);
        Ok((summary, output))
    }
}

/// Bootstraps the bridge using the supplied collaborators.
///
/// # Errors
///
/// Returns [`BootstrapError`] when telemetry cannot be installed, no plugin
/// was named, or the named plugin fails to load.
pub fn bootstrap_with(
    config: Config,
    source: &dyn PluginSource,
    reporter: Arc<dyn HealthReporter>,
) -> Result<Bridge, BootstrapError> {
    reporter.bootstrap_starting(&config);

    let telemetry = match telemetry::initialise(&config) {
        Ok(handle) => handle,
        Err(source) => {
            let error = BootstrapError::Telemetry { source };
            reporter.bootstrap_failed(&error);
            return Err(error);
        }
    };

    let Some(specifier) = config.plugin() else {
        let error = BootstrapError::MissingPlugin;
        reporter.bootstrap_failed(&error);
        return Err(error);
    };

    let plugin = match load(source, specifier) {
        Ok(plugin) => plugin,
        Err(source) => {
            let error = BootstrapError::Plugin { source };
            reporter.bootstrap_failed(&error);
            return Err(error);
        }
    };
    reporter.plugin_loaded(&plugin);
    reporter.bootstrap_succeeded(&config);

    Ok(Bridge {
        config,
        plugin,
        telemetry,
        reporter,
    })
}
