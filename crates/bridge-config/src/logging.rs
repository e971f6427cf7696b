//! Output format for the bridge's stderr log stream.

use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

/// How log events are rendered on standard error.
///
/// Hosts that collect the bridge's stderr usually want `json`; `compact` is
/// for a person running the bridge by hand.
#[derive(
    Debug, Clone, Copy, Default, Deserialize, Serialize, PartialEq, Eq, EnumString, Display,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case", ascii_case_insensitive)]
pub enum LogFormat {
    /// One flattened JSON object per event.
    #[default]
    Json,
    /// One human-readable line per event.
    Compact,
}
