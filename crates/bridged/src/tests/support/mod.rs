//! Test harness utilities shared by the bridge test suites.

mod fixtures;
mod reporter;
mod world;

pub use fixtures::{ServiceProbe, fixture_dispatcher, fixture_plugin, fixture_session};
pub use reporter::{HealthEvent, RecordingHealthReporter};
pub use world::{BootstrapWorld, world};
