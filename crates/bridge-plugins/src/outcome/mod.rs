//! Result shapes produced by capabilities.
//!
//! Capabilities may answer with a typed result or with an ad-hoc JSON object.
//! [`Outcome`] makes that choice explicit so serialisation is a single
//! exhaustive match: raw objects pass through untouched, structured results
//! are projected into their known fields.

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Either a bare JSON object or a structured result.
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome<T> {
    /// An ad-hoc object forwarded verbatim.
    Raw(Map<String, Value>),
    /// A typed result projected into its known fields.
    Structured(T),
}

impl<T: Serialize> Outcome<T> {
    /// Projects the outcome into its wire representation.
    ///
    /// # Errors
    ///
    /// Returns an error if a structured result cannot be serialised.
    pub fn to_wire(&self) -> Result<Value, serde_json::Error> {
        match self {
            Self::Raw(map) => Ok(Value::Object(map.clone())),
            Self::Structured(result) => serde_json::to_value(result),
        }
    }
}

impl From<ActionResult> for Outcome<ActionResult> {
    fn from(result: ActionResult) -> Self {
        Self::Structured(result)
    }
}

impl From<ProviderResult> for Outcome<ProviderResult> {
    fn from(result: ProviderResult) -> Self {
        Self::Structured(result)
    }
}

/// Result of running an action or evaluator handler.
///
/// # Example
///
/// ```
/// use bridge_plugins::ActionResult;
///
/// let result = ActionResult::success().with_text("done");
/// assert!(result.is_success());
///
/// let failed = ActionResult::failure(std::io::Error::other("disk full"));
/// assert_eq!(failed.error(), Some("disk full"));
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActionResult {
    success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    text: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    values: Option<Map<String, Value>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    data: Option<Map<String, Value>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    error: Option<String>,
}

impl ActionResult {
    /// Creates a successful result with no payload.
    #[must_use]
    pub const fn success() -> Self {
        Self {
            success: true,
            text: None,
            values: None,
            data: None,
            error: None,
        }
    }

    /// Creates a failed result, rendering `error` to its display form.
    #[must_use]
    pub fn failure(error: impl fmt::Display) -> Self {
        Self {
            success: false,
            text: None,
            values: None,
            data: None,
            error: Some(error.to_string()),
        }
    }

    /// Attaches response text.
    #[must_use]
    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.text = Some(text.into());
        self
    }

    /// Attaches template values.
    #[must_use]
    pub fn with_values(mut self, values: Map<String, Value>) -> Self {
        self.values = Some(values);
        self
    }

    /// Attaches structured data.
    #[must_use]
    pub fn with_data(mut self, data: Map<String, Value>) -> Self {
        self.data = Some(data);
        self
    }

    /// Returns whether the handler succeeded.
    #[must_use]
    pub const fn is_success(&self) -> bool {
        self.success
    }

    /// Returns the response text.
    #[must_use]
    pub fn text(&self) -> Option<&str> {
        self.text.as_deref()
    }

    /// Returns the error message of a failed result.
    #[must_use]
    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    /// Returns the template values.
    #[must_use]
    pub const fn values(&self) -> Option<&Map<String, Value>> {
        self.values.as_ref()
    }

    /// Returns the structured data.
    #[must_use]
    pub const fn data(&self) -> Option<&Map<String, Value>> {
        self.data.as_ref()
    }
}

/// Result of a context provider.
///
/// Absent fields serialise as `null`, which is also the shape reported for a
/// provider that does not exist.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProviderResult {
    #[serde(default)]
    text: Option<String>,
    #[serde(default)]
    values: Option<Map<String, Value>>,
    #[serde(default)]
    data: Option<Map<String, Value>>,
}

impl ProviderResult {
    /// Creates a result with every field absent.
    #[must_use]
    pub const fn empty() -> Self {
        Self {
            text: None,
            values: None,
            data: None,
        }
    }

    /// Creates a result carrying `text`.
    #[must_use]
    pub fn from_text(text: impl Into<String>) -> Self {
        Self::empty().with_text(text)
    }

    /// Sets the provider text.
    #[must_use]
    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.text = Some(text.into());
        self
    }

    /// Sets the template values.
    #[must_use]
    pub fn with_values(mut self, values: Map<String, Value>) -> Self {
        self.values = Some(values);
        self
    }

    /// Sets the structured data.
    #[must_use]
    pub fn with_data(mut self, data: Map<String, Value>) -> Self {
        self.data = Some(data);
        self
    }

    /// Returns the provider text.
    #[must_use]
    pub fn text(&self) -> Option<&str> {
        self.text.as_deref()
    }

    /// Returns the template values.
    #[must_use]
    pub const fn values(&self) -> Option<&Map<String, Value>> {
        self.values.as_ref()
    }

    /// Returns the structured data.
    #[must_use]
    pub const fn data(&self) -> Option<&Map<String, Value>> {
        self.data.as_ref()
    }
}
