//! Unit tests for the echo plugin.


use std::sync::Arc;

use bridge_plugins::{
    CapabilityIndex, CapabilityManifest, HandlerOptions, Memory, MockResponse, PluginContext,
    RouteRequest, State,
};
use mockall::mock;
use mockall::predicate::eq;
use rstest::{fixture, rstest};
use serde_json::{Map, Value, json};

use super::*;

mock! {
    pub Transform {}
    impl EchoTransform for Transform {
        fn apply(&self, text: &str, style: &str) -> Result<String, TransformError>;
    }
}

#[fixture]
fn index() -> CapabilityIndex {
    CapabilityIndex::build(plugin()).expect("echo plugin indexes")
}

fn context() -> PluginContext {
    PluginContext::new("echo")
}

pub(crate) fn invoke_echo(
    index: &CapabilityIndex,
    context: &PluginContext,
    text: &str,
    options: &HandlerOptions,
) -> Value {
    let action = index.action("ECHO").expect("ECHO registered");
    let runtime = tokio::runtime::Builder::new_current_thread()
        .build()
        .expect("runtime builds");
    let outcome = runtime
        .block_on(action.handle(context, &Memory::from_text(text), &State::new(), options))
        .expect("echo handler succeeds")
        .expect("echo returns a result");
    outcome.to_wire().expect("result serialises")
}

#[rstest]
#[case::plain("plain", "Hello", "Hello")]
#[case::upper("upper", "Hello", "HELLO")]
#[case::lower("lower", "Hello", "hello")]
#[case::reverse("reverse", "abc", "cba")]
fn style_transform_restyles_text(#[case] style: &str, #[case] text: &str, #[case] expected: &str) {
    assert_eq!(
        StyleTransform.apply(text, style).expect("known style"),
        expected
    );
}

#[test]
fn unknown_style_is_rejected() {
    let error = StyleTransform
        .apply("x", "shouty")
        .expect_err("unknown style");
    assert_eq!(error.to_string(), "unknown echo style 'shouty'");
}

#[rstest]
fn manifest_lists_every_capability(index: CapabilityIndex) {
    let manifest = CapabilityManifest::from_index(&index);
    assert_eq!(manifest.name, "echo");
    assert_eq!(manifest.action_names().collect::<Vec<_>>(), vec!["ECHO"]);
    assert_eq!(manifest.actions[0].similes, vec!["REPEAT", "PARROT"]);
    assert_eq!(manifest.providers[0].name, "ECHO_COUNT");
    assert!(manifest.providers[0].dynamic);
    assert_eq!(manifest.evaluators[0].name, "ECHO_AUDIT");
    assert_eq!(manifest.services[0].service_type, "echo-heartbeat");
    assert_eq!(manifest.routes.len(), 2);
}

#[rstest]
fn option_style_overrides_setting(index: CapabilityIndex) {
    let context = context();
    let mut settings = Map::new();
    settings.insert(String::from(STYLE_KEY), json!("upper"));
    context.apply_settings(&settings);

    let from_setting = invoke_echo(&index, &context, "Hi", &HandlerOptions::new());
    assert_eq!(from_setting["text"], json!("HI"));

    let options = HandlerOptions::new().with(STYLE_KEY, "reverse");
    let from_option = invoke_echo(&index, &context, "Hi", &options);
    assert_eq!(from_option["text"], json!("iH"));
    assert_eq!(from_option["data"], json!({"style": "reverse"}));
    assert_eq!(from_option["values"], json!({"echoes": 2}));
}

#[test]
fn transform_failure_is_a_failed_result() {
    let mut transform = MockTransform::new();
    transform
        .expect_apply()
        .with(eq("Hi"), eq("plain"))
        .times(1)
        .returning(|_, style| {
            Err(TransformError::UnknownStyle {
                style: style.to_owned(),
            })
        });
    let index =
        CapabilityIndex::build(plugin_with_transform(Arc::new(transform))).expect("index builds");

    let result = invoke_echo(&index, &context(), "Hi", &HandlerOptions::new());
    assert_eq!(
        result,
        json!({"success": false, "error": "unknown echo style 'plain'"})
    );
}

#[test]
fn init_checks_style_with_transform() {
    let mut transform = MockTransform::new();
    transform
        .expect_apply()
        .with(eq(""), eq("upper"))
        .times(1)
        .returning(|_, _| Ok(String::new()));
    let index =
        CapabilityIndex::build(plugin_with_transform(Arc::new(transform))).expect("index builds");
    let init = index.init().expect("init hook registered");

    let mut config = Map::new();
    config.insert(String::from(STYLE_KEY), json!("upper"));
    let runtime = tokio::runtime::Builder::new_current_thread()
        .build()
        .expect("runtime builds");
    runtime
        .block_on(init.init(&config, &context()))
        .expect("style accepted");
}

#[rstest]
fn status_route_reports_echo_count(index: CapabilityIndex) {
    invoke_echo(&index, &context(), "one", &HandlerOptions::new());
    let route = index.route("/echo/status").expect("status route");
    assert!(route.is_public());

    let handler = route.handler().expect("status handler");
    let mut response = MockResponse::new();
    let runtime = tokio::runtime::Builder::new_current_thread()
        .build()
        .expect("runtime builds");
    runtime
        .block_on(handler.handle(&context(), &RouteRequest::default(), &mut response))
        .expect("status handler succeeds");
    assert_eq!(response.body(), &json!({"echoes": 1}));
}
