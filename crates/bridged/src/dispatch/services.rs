//! Tracking of running service instances.

use std::collections::HashMap;
use std::sync::Arc;

use bridge_plugins::{CapabilityError, PluginContext, Service, ServiceHandle};
use tokio::sync::Mutex;
use tracing::{debug, warn};

use super::router::DISPATCH_TARGET;

/// Result of a start request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum StartOutcome {
    Started,
    AlreadyRunning,
}

/// Result of a stop request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum StopOutcome {
    Stopped,
    NotRunning,
}

/// Running service handles keyed by service type.
///
/// At most one instance per service type runs at a time. The lock is held
/// across `start` so concurrent start requests cannot race.
#[derive(Default)]
pub(crate) struct ServiceTable {
    running: Mutex<HashMap<String, Box<dyn ServiceHandle>>>,
}

impl ServiceTable {
    pub(crate) async fn start(
        &self,
        service: &Arc<dyn Service>,
        context: Arc<PluginContext>,
    ) -> Result<StartOutcome, CapabilityError> {
        let service_type = service.service_type();
        let mut running = self.running.lock().await;
        if running.contains_key(service_type) {
            debug!(target: DISPATCH_TARGET, service_type, "service already running");
            return Ok(StartOutcome::AlreadyRunning);
        }
        let handle = service.start(context).await?;
        running.insert(service_type.to_owned(), handle);
        Ok(StartOutcome::Started)
    }

    pub(crate) async fn stop(&self, service_type: &str) -> Result<StopOutcome, CapabilityError> {
        let handle = self.running.lock().await.remove(service_type);
        match handle {
            Some(mut handle) => {
                handle.stop().await?;
                Ok(StopOutcome::Stopped)
            }
            None => Ok(StopOutcome::NotRunning),
        }
    }

    /// Stops every running instance, logging failures.
    pub(crate) async fn stop_all(&self) -> usize {
        let handles: Vec<(String, Box<dyn ServiceHandle>)> =
            self.running.lock().await.drain().collect();
        let count = handles.len();
        for (service_type, mut handle) in handles {
            if let Err(error) = handle.stop().await {
                warn!(
                    target: DISPATCH_TARGET,
                    service_type = %service_type,
                    %error,
                    "service failed to stop during shutdown"
                );
            }
        }
        count
    }

    #[cfg(test)]
    pub(crate) async fn running_count(&self) -> usize {
        self.running.lock().await.len()
    }
}
