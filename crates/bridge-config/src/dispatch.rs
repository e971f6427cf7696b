use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

/// Strategy used to schedule request handling.
///
/// Sequential dispatch awaits every request before reading the next line, so
/// responses always arrive in request order. Concurrent dispatch runs each
/// request on its own task and relies on the correlation id alone.
#[derive(
    Debug, Clone, Copy, Default, Deserialize, Serialize, PartialEq, Eq, EnumString, Display,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case", ascii_case_insensitive)]
pub enum DispatchMode {
    /// One request at a time, responses in request order.
    #[default]
    Sequential,
    /// Each request on an independent task, responses in completion order.
    Concurrent,
}
