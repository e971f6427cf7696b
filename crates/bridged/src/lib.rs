//! Process bridge between a host runtime and a compiled plugin.
//!
//! The bridge loads one plugin from its compiled-in catalog and speaks
//! line-delimited JSON over standard I/O. Its first output line is a `ready`
//! message carrying the plugin's capability manifest; after that it answers
//! each request line with exactly one response line, echoing the request's
//! `id` so the host can correlate answers with questions.
//!
//! Standard output carries protocol messages only. Logs go to standard error
//! through `tracing`, and lifecycle milestones are reported through a
//! [`HealthReporter`].
//!
//! A failing request never ends the session. Malformed input, unknown request
//! types, capability errors, and capability panics all become `error`
//! responses for the request that caused them. Only a failure of the streams
//! themselves, or the end of input, stops the loop; running services are
//! stopped on the way out.

mod bootstrap;
mod catalog;
pub mod dispatch;
mod health;
mod session;
pub mod telemetry;
pub mod transport;

pub use bootstrap::{Bridge, BootstrapError, bootstrap_with};
pub use catalog::default_catalog;
pub use health::{HealthReporter, StructuredHealthReporter};
pub use session::{Session, SessionSummary};
pub use telemetry::{TelemetryError, TelemetryHandle};

#[cfg(test)]
mod tests;
