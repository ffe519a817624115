use std::collections::{BTreeMap, BTreeSet};

use serde_json::Value;

use crate::model::{
    EndpointCatalog, EndpointDescriptor, ExecutionRecord, FavoriteEntry, Settings, UserContext,
};
use crate::pagination::PaginationState;
use crate::view_model::ConsoleViewModel;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ActiveTab {
    #[default]
    Apps,
    Favorites,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StageStatus {
    Pending,
    Processing,
    Completed,
    Failed,
}

/// One bootstrap stage as shown to the user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StageView {
    pub label: String,
    pub status: StageStatus,
}

/// Composite identity of one dispatched paginated query. Two dispatches with
/// equal keys are the same logical request and must not run concurrently.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestKey {
    pub app: String,
    pub category: String,
    pub page: usize,
    pub query: String,
}

/// The one in-flight paginated query, if any. The generation token is
/// captured at dispatch and compared at commit; key-string formatting plays
/// no part in staleness detection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActiveRequest {
    pub key: RequestKey,
    pub generation: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ParamRow {
    pub key: String,
    pub value: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FileMode {
    /// Attach to the platform request as an uploaded file.
    #[default]
    PlatformRequest,
    Base64,
    Bytes,
    RawText,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct FileRow {
    pub key: String,
    pub file_name: String,
    pub mode: FileMode,
}

/// A favorite chosen from the favorites tab, enriched with its catalog
/// descriptor when the scan knows the path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectedFavorite {
    pub entry: FavoriteEntry,
    pub descriptor: Option<EndpointDescriptor>,
}

/// Slice-owned application state. Every slice has exactly one writer: the
/// named entry points below, invoked from `update`. Reads go through
/// `view()`.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ViewState {
    // Session slice.
    loading: bool,
    access_denied: bool,
    access_denied_reason: String,
    stages: Vec<StageView>,
    user: UserContext,

    // Settings slice plus the locally persisted display flag.
    settings: Settings,
    dark_mode: bool,

    // Catalog slice; replaced wholesale per scan.
    catalog: EndpointCatalog,

    // Favorites slice; at most one entry per path.
    favorites: Vec<FavoriteEntry>,

    // Selection slice.
    active_tab: ActiveTab,
    selected_app: Option<String>,
    selected_category: Option<String>,
    selected_favorite: Option<SelectedFavorite>,
    expanded_apps: BTreeSet<String>,
    expanded_endpoints: BTreeSet<String>,

    // Search slice.
    search_text: String,
    search_query: String,
    current_page: usize,

    // Request slice: the in-flight paginated query and its committed result.
    content_loading: bool,
    next_generation: u64,
    active_request: Option<ActiveRequest>,
    page_items: Vec<EndpointDescriptor>,
    page_info: Option<PaginationState>,
    remote_pagination_enabled: bool,

    // Buffer slice: per-endpoint parameter and file rows.
    params: BTreeMap<String, Vec<ParamRow>>,
    files: BTreeMap<String, Vec<FileRow>>,

    // Execution slice.
    executing: Option<String>,
    responses: BTreeMap<String, ExecutionRecord>,
    schemas: BTreeMap<String, Value>,

    dirty: bool,
}

impl ViewState {
    pub fn new() -> Self {
        Self {
            loading: true,
            current_page: 1,
            remote_pagination_enabled: true,
            ..Self::default()
        }
    }

    pub fn view(&self) -> ConsoleViewModel {
        ConsoleViewModel::project(self)
    }

    /// True once since the last call if any view-relevant slice changed.
    pub fn consume_dirty(&mut self) -> bool {
        std::mem::take(&mut self.dirty)
    }

    fn mark_dirty(&mut self) {
        self.dirty = true;
    }

    // --- session slice -----------------------------------------------------

    pub(crate) fn set_stages(&mut self, stages: Vec<StageView>) {
        self.stages = stages;
        self.mark_dirty();
    }

    pub(crate) fn apply_bootstrap(
        &mut self,
        user: UserContext,
        settings: Settings,
        catalog: EndpointCatalog,
        favorites: Vec<FavoriteEntry>,
    ) {
        if let Some(dark) = settings.dark_mode {
            self.dark_mode = dark;
        }
        self.user = user;
        self.settings = settings;
        self.catalog = catalog;
        self.favorites = favorites;
        self.dedupe_favorites();
        self.loading = false;
        self.mark_dirty();
    }

    pub(crate) fn deny_access(&mut self, reason: String) {
        self.loading = false;
        self.access_denied = true;
        self.access_denied_reason = reason;
        self.mark_dirty();
    }

    // --- display slice -----------------------------------------------------

    pub(crate) fn restore_display_mode(&mut self, dark: bool) {
        self.dark_mode = dark;
        self.mark_dirty();
    }

    /// Flips the display flag and returns the new value for persistence.
    pub(crate) fn toggle_display_mode(&mut self) -> bool {
        self.dark_mode = !self.dark_mode;
        self.mark_dirty();
        self.dark_mode
    }

    // --- catalog slice -----------------------------------------------------

    pub(crate) fn replace_catalog(&mut self, catalog: EndpointCatalog) {
        self.catalog = catalog;
        self.clear_selection();
        self.page_items.clear();
        self.page_info = None;
        self.active_request = None;
        self.content_loading = false;
        self.mark_dirty();
    }

    // --- selection slice ---------------------------------------------------

    pub(crate) fn select_tab(&mut self, tab: ActiveTab) {
        self.active_tab = tab;
        self.clear_selection();
        self.mark_dirty();
    }

    fn clear_selection(&mut self) {
        self.selected_app = None;
        self.selected_category = None;
        self.selected_favorite = None;
    }

    /// Returns false when the pair is already selected.
    pub(crate) fn select_category(&mut self, app: &str, category: &str) -> bool {
        if self.selected_app.as_deref() == Some(app)
            && self.selected_category.as_deref() == Some(category)
        {
            return false;
        }
        self.selected_app = Some(app.to_string());
        self.selected_category = Some(category.to_string());
        self.selected_favorite = None;
        self.current_page = 1;
        self.mark_dirty();
        true
    }

    pub(crate) fn select_favorite(&mut self, entry: FavoriteEntry) {
        let descriptor = self.catalog.find_by_path(&entry.path).cloned();
        self.expanded_endpoints.insert(entry.path.clone());
        self.selected_favorite = Some(SelectedFavorite { entry, descriptor });
        self.selected_app = None;
        self.selected_category = None;
        self.mark_dirty();
    }

    pub(crate) fn toggle_app_expanded(&mut self, app: &str) {
        if !self.expanded_apps.remove(app) {
            self.expanded_apps.insert(app.to_string());
        }
        self.mark_dirty();
    }

    /// Expands or collapses one endpoint card; on first expand the parameter
    /// buffer is seeded from the descriptor's parameter schema.
    pub(crate) fn toggle_endpoint_expanded(&mut self, descriptor: &EndpointDescriptor) {
        if self.expanded_endpoints.remove(&descriptor.path) {
            self.mark_dirty();
            return;
        }
        self.expanded_endpoints.insert(descriptor.path.clone());
        if !self.params.contains_key(&descriptor.path) && !descriptor.parameters.is_empty() {
            let rows = descriptor
                .parameters
                .iter()
                .map(|name| ParamRow {
                    key: name.clone(),
                    value: String::new(),
                })
                .collect();
            self.params.insert(descriptor.path.clone(), rows);
        }
        self.mark_dirty();
    }

    // --- search slice ------------------------------------------------------

    pub(crate) fn set_search_text(&mut self, text: String) {
        self.search_text = text;
    }

    /// Commits the draft text as the active query and rewinds the cursor.
    /// Returns false when the draft equals the committed query already.
    pub(crate) fn commit_search(&mut self) -> bool {
        if self.search_text == self.search_query {
            return false;
        }
        self.search_query = self.search_text.clone();
        self.current_page = 1;
        self.mark_dirty();
        true
    }

    pub(crate) fn set_current_page(&mut self, page: usize) {
        self.current_page = page;
        self.mark_dirty();
    }

    // --- request slice -----------------------------------------------------

    pub(crate) fn selection(&self) -> Option<(&str, &str)> {
        Some((
            self.selected_app.as_deref()?,
            self.selected_category.as_deref()?,
        ))
    }

    pub(crate) fn request_key(&self) -> Option<RequestKey> {
        let (app, category) = self.selection()?;
        Some(RequestKey {
            app: app.to_string(),
            category: category.to_string(),
            page: self.current_page,
            query: self.search_query.clone(),
        })
    }

    /// Marks a query as the active dispatch. Returns the captured generation
    /// token, or `None` when an identical key is already in flight; the
    /// in-flight call owns the eventual commit.
    pub(crate) fn begin_request(&mut self, key: RequestKey) -> Option<u64> {
        if let Some(active) = &self.active_request {
            if active.key == key {
                return None;
            }
        }
        self.next_generation += 1;
        let generation = self.next_generation;
        self.active_request = Some(ActiveRequest { key, generation });
        self.content_loading = true;
        self.mark_dirty();
        Some(generation)
    }

    fn generation_is_active(&self, generation: u64) -> bool {
        self.active_request
            .as_ref()
            .is_some_and(|active| active.generation == generation)
    }

    /// Commits one page atomically, but only while its generation is still
    /// the active one; a superseded result is discarded without any state
    /// change. Returns whether the commit happened.
    pub(crate) fn commit_page(
        &mut self,
        generation: u64,
        items: Vec<EndpointDescriptor>,
        info: PaginationState,
        pagination_enabled: bool,
    ) -> bool {
        if !self.generation_is_active(generation) {
            return false;
        }
        self.page_items = items;
        self.page_info = Some(info);
        self.remote_pagination_enabled = pagination_enabled;
        self.active_request = None;
        self.content_loading = false;
        self.mark_dirty();
        true
    }

    /// Transport fault: the result list is cleared and the loading indicator
    /// dropped regardless of which generation failed. The active claim is
    /// only released when it belongs to the failed generation.
    pub(crate) fn commit_page_failure(&mut self, generation: u64) {
        self.page_items.clear();
        self.content_loading = false;
        if self.generation_is_active(generation) {
            self.active_request = None;
        }
        self.mark_dirty();
    }

    /// Local instant-filter commit: same shape as a remote commit, no
    /// dispatch involved.
    pub(crate) fn commit_local_page(
        &mut self,
        items: Vec<EndpointDescriptor>,
        info: PaginationState,
    ) {
        self.page_items = items;
        self.page_info = Some(info);
        self.remote_pagination_enabled = self.settings.enable_pagination;
        self.content_loading = false;
        self.mark_dirty();
    }

    // --- favorites slice ---------------------------------------------------

    pub(crate) fn is_favorite(&self, path: &str) -> bool {
        self.favorites.iter().any(|entry| entry.path == path)
    }

    /// Appends unless the path is already present, keeping the uniqueness
    /// invariant.
    pub(crate) fn apply_favorite_add(&mut self, entry: FavoriteEntry) {
        if !self.is_favorite(&entry.path) {
            self.favorites.push(entry);
            self.mark_dirty();
        }
    }

    pub(crate) fn apply_favorite_remove(&mut self, path: &str) {
        self.favorites.retain(|entry| entry.path != path);
        self.mark_dirty();
    }

    /// Compensating action after a failed remote mutation: membership is
    /// restored to the value captured before the optimistic toggle, not
    /// re-derived from (possibly since-mutated) current state.
    pub(crate) fn restore_favorite_membership(&mut self, entry: FavoriteEntry, was_member: bool) {
        if was_member {
            self.apply_favorite_add(entry);
        } else {
            self.apply_favorite_remove(&entry.path);
        }
    }

    fn dedupe_favorites(&mut self) {
        let mut seen = BTreeSet::new();
        self.favorites.retain(|entry| seen.insert(entry.path.clone()));
    }

    // --- buffer slice ------------------------------------------------------

    pub(crate) fn params_mut(&mut self, path: &str) -> &mut Vec<ParamRow> {
        self.mark_dirty();
        self.params.entry(path.to_string()).or_default()
    }

    pub(crate) fn files_mut(&mut self, path: &str) -> &mut Vec<FileRow> {
        self.mark_dirty();
        self.files.entry(path.to_string()).or_default()
    }

    pub(crate) fn clear_buffers(&mut self, path: &str) {
        self.params.insert(path.to_string(), Vec::new());
        self.files.insert(path.to_string(), Vec::new());
        self.mark_dirty();
    }

    pub fn params_for(&self, path: &str) -> &[ParamRow] {
        self.params.get(path).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn files_for(&self, path: &str) -> &[FileRow] {
        self.files.get(path).map(Vec::as_slice).unwrap_or(&[])
    }

    // --- execution slice ---------------------------------------------------

    pub(crate) fn begin_execution(&mut self, path: &str) {
        self.executing = Some(path.to_string());
        self.mark_dirty();
    }

    pub(crate) fn finish_execution(&mut self, path: &str, record: ExecutionRecord) {
        self.responses.insert(path.to_string(), record);
        self.executing = None;
        self.mark_dirty();
    }

    pub(crate) fn store_schema(&mut self, path: &str, schema: Value) {
        self.schemas.insert(path.to_string(), schema);
        self.mark_dirty();
    }

    pub fn response_for(&self, path: &str) -> Option<&ExecutionRecord> {
        self.responses.get(path)
    }

    pub fn schema_for(&self, path: &str) -> Option<&Value> {
        self.schemas.get(path)
    }

    // --- reads used by update and the view projection ----------------------

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn user(&self) -> &UserContext {
        &self.user
    }

    pub fn catalog(&self) -> &EndpointCatalog {
        &self.catalog
    }

    pub fn favorites(&self) -> &[FavoriteEntry] {
        &self.favorites
    }

    pub fn active_request(&self) -> Option<&ActiveRequest> {
        self.active_request.as_ref()
    }

    pub fn page_items(&self) -> &[EndpointDescriptor] {
        &self.page_items
    }

    pub fn page_info(&self) -> Option<&PaginationState> {
        self.page_info.as_ref()
    }

    pub(crate) fn remote_pagination_enabled(&self) -> bool {
        self.remote_pagination_enabled
    }

    pub(crate) fn loading(&self) -> bool {
        self.loading
    }

    pub(crate) fn content_loading(&self) -> bool {
        self.content_loading
    }

    pub(crate) fn access_denied(&self) -> (bool, &str) {
        (self.access_denied, &self.access_denied_reason)
    }

    pub(crate) fn stages(&self) -> &[StageView] {
        &self.stages
    }

    pub(crate) fn active_tab(&self) -> ActiveTab {
        self.active_tab
    }

    pub(crate) fn selected_favorite(&self) -> Option<&SelectedFavorite> {
        self.selected_favorite.as_ref()
    }

    pub(crate) fn expanded_apps(&self) -> &BTreeSet<String> {
        &self.expanded_apps
    }

    pub(crate) fn expanded_endpoints(&self) -> &BTreeSet<String> {
        &self.expanded_endpoints
    }

    pub(crate) fn search_text(&self) -> &str {
        &self.search_text
    }

    pub(crate) fn search_query(&self) -> &str {
        &self.search_query
    }

    pub(crate) fn current_page(&self) -> usize {
        self.current_page
    }

    pub(crate) fn executing(&self) -> Option<&str> {
        self.executing.as_deref()
    }

    pub(crate) fn dark_mode(&self) -> bool {
        self.dark_mode
    }

    pub(crate) fn is_dirty(&self) -> bool {
        self.dirty
    }
}
