//! Echo plugin shipped with the bridge.
//!
//! The plugin repeats message text back to the host, optionally restyled,
//! and keeps a running count of how many messages it has echoed. It exercises
//! every capability kind the bridge supports and doubles as a smoke test for
//! hosts integrating the bridge for the first time.
//!
//! Text styling sits behind [`EchoTransform`] so tests can substitute a
//! deterministic double.

#[cfg(test)]
mod tests;

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use bridge_plugins::{
    Action, ActionResult, CapabilityError, Evaluator, HandlerOptions, HandlerOutcome, Memory,
    Outcome, Plugin, PluginContext, PluginInit, Provider, ProviderResult, Route, RouteMethod,
    Service, ServiceHandle, State,
};
use serde_json::{Map, Value, json};
use thiserror::Error;
use tracing::{debug, info};

const ECHO_TARGET: &str = concat!(env!("CARGO_PKG_NAME"), "::echo");

/// Setting and option key selecting the text style.
pub const STYLE_KEY: &str = "style";

/// Style applied when neither the request nor the settings name one.
pub const DEFAULT_STYLE: &str = "plain";

/// Errors raised while restyling text.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TransformError {
    /// The requested style is not supported.
    #[error("unknown echo style '{style}'")]
    UnknownStyle {
        /// Style name supplied by the host.
        style: String,
    },
}

/// Text restyling abstraction used to keep behaviour deterministic in tests.
pub trait EchoTransform: Send + Sync {
    /// Restyles `text` according to `style`.
    ///
    /// # Errors
    ///
    /// Returns [`TransformError::UnknownStyle`] when `style` is unsupported.
    fn apply(&self, text: &str, style: &str) -> Result<String, TransformError>;
}

/// Transform supporting `plain`, `upper`, `lower`, and `reverse`.
#[derive(Debug, Default, Clone, Copy)]
pub struct StyleTransform;

impl EchoTransform for StyleTransform {
    fn apply(&self, text: &str, style: &str) -> Result<String, TransformError> {
        match style {
            "plain" => Ok(text.to_owned()),
            "upper" => Ok(text.to_uppercase()),
            "lower" => Ok(text.to_lowercase()),
            "reverse" => Ok(text.chars().rev().collect()),
            other => Err(TransformError::UnknownStyle {
                style: other.to_owned(),
            }),
        }
    }
}

/// Builds the echo plugin with the default transform.
#[must_use]
pub fn plugin() -> Plugin {
    plugin_with_transform(Arc::new(StyleTransform))
}

/// Builds the echo plugin around `transform`.
#[must_use]
pub fn plugin_with_transform(transform: Arc<dyn EchoTransform>) -> Plugin {
    let echoes = Arc::new(AtomicUsize::new(0));
    let status_echoes = Arc::clone(&echoes);

    Plugin::new("echo", "Repeats messages back to the host")
        .with_version(env!("CARGO_PKG_VERSION"))
        .with_init(Arc::new(StyleCheck {
            transform: Arc::clone(&transform),
        }))
        .with_action(Arc::new(EchoAction {
            transform,
            echoes: Arc::clone(&echoes),
            similes: vec![String::from("REPEAT"), String::from("PARROT")],
        }))
        .with_provider(Arc::new(EchoCount {
            echoes: Arc::clone(&echoes),
        }))
        .with_evaluator(Arc::new(EchoAudit))
        .with_service(Arc::new(Heartbeat { echoes }))
        .with_route(
            Route::new(RouteMethod::Get, "/echo")
                .with_name("echo")
                .with_sync_handler(|request, response| {
                    response
                        .set_header("content-type", "application/json")
                        .json(json!({
                            "body": request.body,
                            "query": request.query,
                        }));
                    Ok(())
                }),
        )
        .with_route(
            Route::new(RouteMethod::Get, "/echo/status")
                .with_name("echo-status")
                .public(true)
                .with_sync_handler(move |_, response| {
                    response.json(json!({"echoes": status_echoes.load(Ordering::SeqCst)}));
                    Ok(())
                }),
        )
}

/// Rejects a configured style the transform does not support.
struct StyleCheck {
    transform: Arc<dyn EchoTransform>,
}

#[async_trait]
impl PluginInit for StyleCheck {
    async fn init(
        &self,
        config: &Map<String, Value>,
        _context: &PluginContext,
    ) -> Result<(), CapabilityError> {
        let Some(style) = config.get(STYLE_KEY) else {
            return Ok(());
        };
        let name = style
            .as_str()
            .ok_or_else(|| CapabilityError::invalid_input("style must be a string"))?;
        self.transform
            .apply("", name)
            .map_err(|error| CapabilityError::invalid_input(error.to_string()))?;
        info!(target: ECHO_TARGET, style = name, "echo style configured");
        Ok(())
    }
}

struct EchoAction {
    transform: Arc<dyn EchoTransform>,
    echoes: Arc<AtomicUsize>,
    similes: Vec<String>,
}

#[async_trait]
impl Action for EchoAction {
    fn name(&self) -> &str {
        "ECHO"
    }

    fn description(&self) -> &str {
        "Repeats the message text, optionally restyled"
    }

    fn similes(&self) -> &[String] {
        &self.similes
    }

    async fn validate(
        &self,
        _context: &PluginContext,
        message: &Memory,
        _state: &State,
    ) -> Result<bool, CapabilityError> {
        Ok(message.text().is_some_and(|text| !text.trim().is_empty()))
    }

    async fn handle(
        &self,
        context: &PluginContext,
        message: &Memory,
        _state: &State,
        options: &HandlerOptions,
    ) -> HandlerOutcome {
        let style = resolve_style(context, options);
        let text = message.text().unwrap_or_default();
        let echoed = match self.transform.apply(text, &style) {
            Ok(echoed) => echoed,
            Err(error) => return Ok(Some(Outcome::from(ActionResult::failure(error)))),
        };
        let count = self.echoes.fetch_add(1, Ordering::SeqCst) + 1;
        debug!(target: ECHO_TARGET, style = %style, count, "echoed message");

        let mut values = Map::new();
        values.insert(String::from("echoes"), json!(count));
        let mut data = Map::new();
        data.insert(String::from(STYLE_KEY), Value::String(style));
        Ok(Some(Outcome::from(
            ActionResult::success()
                .with_text(echoed)
                .with_values(values)
                .with_data(data),
        )))
    }
}

/// Picks the style from the request options, then the plugin settings.
fn resolve_style(context: &PluginContext, options: &HandlerOptions) -> String {
    options
        .get(STYLE_KEY)
        .and_then(Value::as_str)
        .map(str::to_owned)
        .or_else(|| {
            context
                .setting(STYLE_KEY)
                .and_then(|value| value.as_str().map(str::to_owned))
        })
        .unwrap_or_else(|| DEFAULT_STYLE.to_owned())
}

struct EchoCount {
    echoes: Arc<AtomicUsize>,
}

#[async_trait]
impl Provider for EchoCount {
    fn name(&self) -> &str {
        "ECHO_COUNT"
    }

    fn description(&self) -> Option<&str> {
        Some("Number of messages echoed so far")
    }

    fn dynamic(&self) -> bool {
        true
    }

    async fn get(
        &self,
        _context: &PluginContext,
        _message: &Memory,
        _state: &State,
    ) -> Result<Outcome<ProviderResult>, CapabilityError> {
        let count = self.echoes.load(Ordering::SeqCst);
        let mut values = Map::new();
        values.insert(String::from("echoes"), json!(count));
        Ok(Outcome::from(
            ProviderResult::from_text(format!("Echoed {count} messages")).with_values(values),
        ))
    }
}

/// Notes the length of each message.
struct EchoAudit;

#[async_trait]
impl Evaluator for EchoAudit {
    fn name(&self) -> &str {
        "ECHO_AUDIT"
    }

    fn description(&self) -> &str {
        "Records the length of each echoed message"
    }

    async fn handle(
        &self,
        _context: &PluginContext,
        message: &Memory,
        _state: &State,
    ) -> HandlerOutcome {
        let Some(text) = message.text() else {
            return Ok(None);
        };
        let length = text.chars().count();
        Ok(Some(Outcome::from(
            ActionResult::success().with_text(format!("audited {length} characters")),
        )))
    }
}

/// Logs the echo count when stopped.
struct Heartbeat {
    echoes: Arc<AtomicUsize>,
}

struct HeartbeatHandle {
    echoes: Arc<AtomicUsize>,
    plugin: String,
}

#[async_trait]
impl Service for Heartbeat {
    fn service_type(&self) -> &str {
        "echo-heartbeat"
    }

    fn description(&self) -> Option<&str> {
        Some("Reports echo activity on shutdown")
    }

    async fn start(
        &self,
        context: Arc<PluginContext>,
    ) -> Result<Box<dyn ServiceHandle>, CapabilityError> {
        info!(target: ECHO_TARGET, plugin = context.plugin_name(), "heartbeat started");
        Ok(Box::new(HeartbeatHandle {
            echoes: Arc::clone(&self.echoes),
            plugin: context.plugin_name().to_owned(),
        }))
    }
}

#[async_trait]
impl ServiceHandle for HeartbeatHandle {
    async fn stop(&mut self) -> Result<(), CapabilityError> {
        info!(
            target: ECHO_TARGET,
            plugin = %self.plugin,
            echoes = self.echoes.load(Ordering::SeqCst),
            "heartbeat stopped"
        );
        Ok(())
    }
}
