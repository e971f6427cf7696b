//! Conversions between wire payloads and domain values.
//!
//! Requests carry their message, state, and options as loose JSON. A missing
//! or `null` field is not an error: it yields the type's default. Anything
//! else must deserialize into the target type. The opposite direction is
//! [`Outcome::to_wire`](crate::Outcome::to_wire).

use serde::de::DeserializeOwned;
use serde_json::Value;

/// Converts an optional wire value into a domain value.
///
/// # Errors
///
/// Returns an error when the value is present, not `null`, and does not match
/// the shape of `T`.
///
/// # Example
///
/// ```
/// use bridge_plugins::{State, adapter::from_wire};
///
/// let state: State = from_wire(None).expect("absent state defaults");
/// assert_eq!(state, State::default());
/// ```
pub fn from_wire<T>(value: Option<Value>) -> Result<T, serde_json::Error>
where
    T: DeserializeOwned + Default,
{
    match value {
        None | Some(Value::Null) => Ok(T::default()),
        Some(other) => serde_json::from_value(other),
    }
}
