//! Capability manifest announced during the ready handshake.
//!
//! The manifest is a pure projection of a [`CapabilityIndex`]: display and
//! lookup metadata only, never executable references. It is built once,
//! after the plugin has been indexed and before any request is read, and is
//! immutable afterwards.

use serde::{Deserialize, Serialize};

use crate::registry::CapabilityIndex;
use crate::route::RouteMethod;

/// Language tag advertised by this bridge.
pub const MANIFEST_LANGUAGE: &str = "rust";

/// Metadata describing every capability a loaded plugin offers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CapabilityManifest {
    /// Plugin name.
    pub name: String,
    /// Plugin description.
    pub description: String,
    /// Plugin version.
    pub version: String,
    /// Implementation language, always [`MANIFEST_LANGUAGE`].
    pub language: String,
    /// Declared actions.
    pub actions: Vec<ActionEntry>,
    /// Declared context providers.
    pub providers: Vec<ProviderEntry>,
    /// Declared evaluators.
    pub evaluators: Vec<EvaluatorEntry>,
    /// Declared services.
    pub services: Vec<ServiceEntry>,
    /// Declared routes.
    pub routes: Vec<RouteEntry>,
}

/// Manifest entry for an action.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActionEntry {
    /// Action name.
    pub name: String,
    /// Action description.
    pub description: String,
    /// Alternative names.
    pub similes: Vec<String>,
}

/// Manifest entry for a context provider.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProviderEntry {
    /// Provider name.
    pub name: String,
    /// Optional description.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Whether the provider re-runs for every message.
    pub dynamic: bool,
    /// Ordering hint.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub position: Option<i64>,
    /// Whether the provider is hidden from default composition.
    pub private: bool,
}

/// Manifest entry for an evaluator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EvaluatorEntry {
    /// Evaluator name.
    pub name: String,
    /// Evaluator description.
    pub description: String,
    /// Whether the evaluator runs on every turn.
    pub always_run: bool,
    /// Alternative names.
    pub similes: Vec<String>,
}

/// Manifest entry for a service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ServiceEntry {
    /// Service type identifier.
    pub service_type: String,
    /// Optional description.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

/// Manifest entry for a route.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RouteEntry {
    /// Route path.
    pub path: String,
    /// HTTP method.
    #[serde(rename = "type")]
    pub method: RouteMethod,
    /// Optional display name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Whether the route is publicly reachable.
    pub public: bool,
}

impl CapabilityManifest {
    /// Projects `index` into its manifest.
    #[must_use]
    pub fn from_index(index: &CapabilityIndex) -> Self {
        Self {
            name: index.name().to_owned(),
            description: index.description().to_owned(),
            version: index.version().to_owned(),
            language: MANIFEST_LANGUAGE.to_owned(),
            actions: index
                .actions()
                .map(|action| ActionEntry {
                    name: action.name().to_owned(),
                    description: action.description().to_owned(),
                    similes: action.similes().to_vec(),
                })
                .collect(),
            providers: index
                .providers()
                .map(|provider| ProviderEntry {
                    name: provider.name().to_owned(),
                    description: provider.description().map(str::to_owned),
                    dynamic: provider.dynamic(),
                    position: provider.position(),
                    private: provider.private(),
                })
                .collect(),
            evaluators: index
                .evaluators()
                .map(|evaluator| EvaluatorEntry {
                    name: evaluator.name().to_owned(),
                    description: evaluator.description().to_owned(),
                    always_run: evaluator.always_run(),
                    similes: evaluator.similes().to_vec(),
                })
                .collect(),
            services: index
                .services()
                .map(|service| ServiceEntry {
                    service_type: service.service_type().to_owned(),
                    description: service.description().map(str::to_owned),
                })
                .collect(),
            routes: index
                .routes()
                .map(|route| RouteEntry {
                    path: route.path().to_owned(),
                    method: route.method(),
                    name: route.name().map(str::to_owned),
                    public: route.is_public(),
                })
                .collect(),
        }
    }

    /// Names of every declared action.
    pub fn action_names(&self) -> impl Iterator<Item = &str> {
        self.actions.iter().map(|entry| entry.name.as_str())
    }
}
