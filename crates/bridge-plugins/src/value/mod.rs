//! Payload shapes exchanged with capabilities.
//!
//! The bridge treats messages, state, and handler options as opaque records:
//! it reads the handful of fields it needs for routing and logging and carries
//! everything else verbatim. Each type therefore wraps the raw JSON object and
//! exposes typed accessors over it, so nothing the host sends is dropped or
//! renamed on the way through.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// A message record (the host's "memory") passed to capabilities.
///
/// # Example
///
/// ```
/// use bridge_plugins::Memory;
///
/// let memory = Memory::from_text("hello").with_field("roomId", "room-1");
/// assert_eq!(memory.text(), Some("hello"));
/// assert_eq!(memory.room_id(), Some("room-1"));
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Memory(Map<String, Value>);

impl Memory {
    /// Creates an empty message record.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a message record whose content carries `text`.
    #[must_use]
    pub fn from_text(text: impl Into<String>) -> Self {
        let mut content = Map::new();
        content.insert(String::from("text"), Value::String(text.into()));
        Self::new().with_field("content", Value::Object(content))
    }

    /// Sets a top-level field.
    #[must_use]
    pub fn with_field(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.0.insert(key.into(), value.into());
        self
    }

    /// Returns the record identifier.
    #[must_use]
    pub fn id(&self) -> Option<&str> {
        self.str_field("id")
    }

    /// Returns the identifier of the entity that authored the message.
    #[must_use]
    pub fn entity_id(&self) -> Option<&str> {
        self.str_field("entityId")
    }

    /// Returns the identifier of the agent the message belongs to.
    #[must_use]
    pub fn agent_id(&self) -> Option<&str> {
        self.str_field("agentId")
    }

    /// Returns the identifier of the conversation room.
    #[must_use]
    pub fn room_id(&self) -> Option<&str> {
        self.str_field("roomId")
    }

    /// Returns the content object, if present.
    #[must_use]
    pub fn content(&self) -> Option<&Map<String, Value>> {
        self.0.get("content").and_then(Value::as_object)
    }

    /// Returns the content text, if present.
    #[must_use]
    pub fn text(&self) -> Option<&str> {
        self.content()
            .and_then(|content| content.get("text"))
            .and_then(Value::as_str)
    }

    /// Returns an arbitrary top-level field.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    /// Borrows the underlying record.
    #[must_use]
    pub const fn as_map(&self) -> &Map<String, Value> {
        &self.0
    }

    /// Consumes the wrapper and returns the underlying record.
    #[must_use]
    pub fn into_map(self) -> Map<String, Value> {
        self.0
    }

    fn str_field(&self, key: &str) -> Option<&str> {
        self.0.get(key).and_then(Value::as_str)
    }
}

impl From<Map<String, Value>> for Memory {
    fn from(map: Map<String, Value>) -> Self {
        Self(map)
    }
}

/// Composed context state accompanying a message.
///
/// State conventionally carries `values` (flat key/value pairs for templating),
/// `data` (structured provider output), and `text` (a rendered summary).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct State(Map<String, Value>);

impl State {
    /// Creates an empty state.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the rendered state text.
    #[must_use]
    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.0.insert(String::from("text"), Value::String(text.into()));
        self
    }

    /// Inserts an entry into the `values` map, creating it when absent.
    #[must_use]
    pub fn with_value(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        let entry = self
            .0
            .entry(String::from("values"))
            .or_insert_with(|| Value::Object(Map::new()));
        if !entry.is_object() {
            *entry = Value::Object(Map::new());
        }
        if let Value::Object(values) = entry {
            values.insert(key.into(), value.into());
        }
        self
    }

    /// Returns the rendered state text.
    #[must_use]
    pub fn text(&self) -> Option<&str> {
        self.0.get("text").and_then(Value::as_str)
    }

    /// Returns the `values` map.
    #[must_use]
    pub fn values(&self) -> Option<&Map<String, Value>> {
        self.0.get("values").and_then(Value::as_object)
    }

    /// Returns a single entry from the `values` map.
    #[must_use]
    pub fn value(&self, key: &str) -> Option<&Value> {
        self.values().and_then(|values| values.get(key))
    }

    /// Returns the `data` map.
    #[must_use]
    pub fn data(&self) -> Option<&Map<String, Value>> {
        self.0.get("data").and_then(Value::as_object)
    }

    /// Borrows the underlying record.
    #[must_use]
    pub const fn as_map(&self) -> &Map<String, Value> {
        &self.0
    }
}

impl From<Map<String, Value>> for State {
    fn from(map: Map<String, Value>) -> Self {
        Self(map)
    }
}

/// Free-form options forwarded to an action handler.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct HandlerOptions(Map<String, Value>);

impl HandlerOptions {
    /// Creates empty options.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets an option.
    #[must_use]
    pub fn with(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.0.insert(key.into(), value.into());
        self
    }

    /// Returns an option value.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    /// Returns `true` when no options were supplied.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl From<Map<String, Value>> for HandlerOptions {
    fn from(map: Map<String, Value>) -> Self {
        Self(map)
    }
}
