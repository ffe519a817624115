use std::collections::BTreeMap;

use serde::Deserialize;
use serde_json::Value;

use crate::pagination::PaginationState;

/// Console settings as served by the platform. Unknown keys are ignored and
/// missing keys fall back to the local defaults below.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub enabled: bool,
    /// `None` when the server does not dictate a display mode; the locally
    /// persisted flag then stays in effect.
    pub dark_mode: Option<bool>,
    pub custom_page_title: String,
    pub custom_page_description: String,
    pub enable_search: bool,
    pub enable_pagination: bool,
    pub items_per_page: usize,
    pub maintain_user_history: bool,
    pub show_formatted_response: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            enabled: true,
            dark_mode: None,
            custom_page_title: String::new(),
            custom_page_description: String::new(),
            enable_search: true,
            enable_pagination: true,
            items_per_page: 20,
            maintain_user_history: false,
            show_formatted_response: false,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Deserialize)]
#[serde(default)]
pub struct Permissions {
    pub api_access: bool,
    pub can_test: bool,
    /// Server-supplied explanation when access is denied.
    pub reason: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Deserialize)]
#[serde(default)]
pub struct UserContext {
    pub authenticated: bool,
    pub user: Option<String>,
    pub roles: Vec<String>,
    pub permissions: Permissions,
}

/// One invocable endpoint as reported by the catalog scan.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct EndpointDescriptor {
    pub path: String,
    pub name: String,
    /// Parameter names from the endpoint's signature.
    #[serde(default)]
    pub parameters: Vec<String>,
}

/// Nested mapping from application to category to endpoint list. Replaced
/// wholesale on each scan; never mutated in place.
#[derive(Debug, Clone, PartialEq, Eq, Default, Deserialize)]
#[serde(transparent)]
pub struct EndpointCatalog {
    apps: BTreeMap<String, BTreeMap<String, Vec<EndpointDescriptor>>>,
}

impl EndpointCatalog {
    pub fn new(apps: BTreeMap<String, BTreeMap<String, Vec<EndpointDescriptor>>>) -> Self {
        Self { apps }
    }

    pub fn is_empty(&self) -> bool {
        self.apps.is_empty()
    }

    pub fn apps(&self) -> impl Iterator<Item = (&String, &BTreeMap<String, Vec<EndpointDescriptor>>)> {
        self.apps.iter()
    }

    /// The resident dataset for one (app, category) pair, if scanned.
    pub fn category(&self, app: &str, category: &str) -> Option<&[EndpointDescriptor]> {
        self.apps
            .get(app)
            .and_then(|categories| categories.get(category))
            .map(Vec::as_slice)
    }

    /// Linear lookup across all apps and categories, used to enrich a bare
    /// favorite entry with its full descriptor.
    pub fn find_by_path(&self, path: &str) -> Option<&EndpointDescriptor> {
        self.apps
            .values()
            .flat_map(|categories| categories.values())
            .flat_map(|endpoints| endpoints.iter())
            .find(|endpoint| endpoint.path == path)
    }
}

/// One saved favorite. The favorites set holds at most one entry per `path`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct FavoriteEntry {
    pub name: String,
    pub path: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(default)]
pub struct PageSettings {
    pub enable_pagination: bool,
}

/// One accepted page of a paginated catalog query.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct PageResponse {
    pub items: Vec<EndpointDescriptor>,
    pub pagination: PaginationState,
    #[serde(default)]
    pub settings: PageSettings,
}

/// Successful endpoint invocation as reported by the executor.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ExecutionReport {
    pub status_code: u16,
    pub response: Value,
    #[serde(default)]
    pub success: bool,
    #[serde(default)]
    pub response_time_ms: f64,
    #[serde(default)]
    pub formatted_on_copy: bool,
}

/// What one invocation left behind: a report, or a structured failure shown
/// in place of a response. Faults never unwind past this record.
#[derive(Debug, Clone, PartialEq)]
pub enum ExecutionRecord {
    Completed(ExecutionReport),
    Failed { kind: String, message: String },
}
