//! Domain errors raised while loading plugins and invoking capabilities.
//!
//! All errors use `thiserror`-derived enums with structured context so callers
//! can inspect the failure programmatically. [`PluginError`] covers the load
//! phase, where every failure is fatal to the bridge. [`CapabilityError`] is
//! what capability implementations return at invocation time; the dispatcher
//! turns it into a per-request response and never lets it escape further.

use std::error::Error as StdError;
use std::sync::Arc;

use thiserror::Error;

/// Errors arising while resolving and indexing a plugin.
#[derive(Debug, Error)]
pub enum PluginError {
    /// The requested plugin is not compiled into the catalog.
    #[error("plugin '{specifier}' not found in catalog (available: {})", available.join(", "))]
    NotFound {
        /// Specifier that was looked up.
        specifier: String,
        /// Specifiers the catalog does know about.
        available: Vec<String>,
    },

    /// The plugin resolved but did not export a capability bundle.
    #[error("plugin '{specifier}' does not export a capability bundle")]
    MissingBundle {
        /// Specifier that was resolved.
        specifier: String,
    },

    /// The exported bundle failed validation.
    #[error("manifest error: {message}")]
    Manifest {
        /// Description of the validation failure.
        message: String,
    },
}

impl PluginError {
    /// Creates a manifest validation error.
    pub fn manifest(message: impl Into<String>) -> Self {
        Self::Manifest {
            message: message.into(),
        }
    }
}

/// Errors returned by capability implementations.
///
/// The error is cloneable so that test doubles can hand out the same failure
/// repeatedly; foreign sources are therefore held behind an [`Arc`].
#[derive(Debug, Clone, Error)]
pub enum CapabilityError {
    /// The capability ran and failed.
    #[error("{message}")]
    Failed {
        /// Human-readable failure description.
        message: String,
    },

    /// The capability rejected its input.
    #[error("invalid input: {message}")]
    InvalidInput {
        /// Description of the rejected input.
        message: String,
    },

    /// A dependency of the capability failed.
    #[error("{source}")]
    Source {
        /// Underlying error.
        #[source]
        source: Arc<dyn StdError + Send + Sync>,
    },
}

impl CapabilityError {
    /// Creates a generic failure.
    pub fn failed(message: impl Into<String>) -> Self {
        Self::Failed {
            message: message.into(),
        }
    }

    /// Creates an invalid input error.
    pub fn invalid_input(message: impl Into<String>) -> Self {
        Self::InvalidInput {
            message: message.into(),
        }
    }

    /// Wraps an arbitrary error raised by a capability dependency.
    pub fn from_source(source: impl StdError + Send + Sync + 'static) -> Self {
        Self::Source {
            source: Arc::new(source),
        }
    }
}

impl From<serde_json::Error> for CapabilityError {
    fn from(source: serde_json::Error) -> Self {
        Self::from_source(source)
    }
}
