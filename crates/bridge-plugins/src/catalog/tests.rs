//! Unit tests for plugin resolution and loading.

use mockall::mock;
use mockall::predicate::eq;
use rstest::{fixture, rstest};

use super::*;
use crate::tests::sample_plugin;

mock! {
    Source {}
    impl PluginSource for Source {
        fn resolve(&self, specifier: &str) -> Result<Plugin, PluginError>;
        fn specifiers(&self) -> Vec<String>;
    }
}

#[fixture]
fn catalog() -> PluginCatalog {
    PluginCatalog::new()
        .with_plugin("sample", || Some(sample_plugin()))
        .with_plugin("hollow", || None)
}

#[rstest]
fn specifiers_are_sorted(catalog: PluginCatalog) {
    assert_eq!(
        catalog.specifiers(),
        vec![String::from("hollow"), String::from("sample")]
    );
    assert_eq!(catalog.len(), 2);
}

#[rstest]
fn unknown_specifier_lists_available_plugins(catalog: PluginCatalog) {
    let error = catalog.resolve("ghost").expect_err("unknown plugin");
    assert!(matches!(error, PluginError::NotFound { .. }));
    let message = error.to_string();
    assert!(message.contains("ghost"));
    assert!(message.contains("hollow, sample"));
}

#[rstest]
fn factory_without_bundle_is_missing_bundle(catalog: PluginCatalog) {
    let error = load(&catalog, "hollow").expect_err("no bundle");
    assert!(matches!(error, PluginError::MissingBundle { ref specifier } if specifier == "hollow"));
}

#[rstest]
fn load_builds_index_and_manifest(catalog: PluginCatalog) {
    let loaded = load(&catalog, "sample").expect("sample loads");
    assert_eq!(loaded.specifier(), "sample");
    assert_eq!(loaded.manifest().name, "sample");
    assert!(loaded.index().action("GREET").is_some());
}

#[test]
fn load_delegates_resolution_to_source() {
    let mut source = MockSource::new();
    source
        .expect_resolve()
        .with(eq("custom"))
        .once()
        .returning(|_| Ok(Plugin::new("custom", "from a mock")));
    let loaded = load(&source, "custom").expect("mock source loads");
    assert_eq!(loaded.manifest().description, "from a mock");
}

#[test]
fn load_propagates_index_validation_errors() {
    let mut source = MockSource::new();
    source
        .expect_resolve()
        .returning(|_| Ok(Plugin::new("", "nameless")));
    let error = load(&source, "nameless").expect_err("empty name must fail");
    assert!(matches!(error, PluginError::Manifest { .. }));
}
