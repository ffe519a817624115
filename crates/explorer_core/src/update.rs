use crate::model::FavoriteEntry;
use crate::pagination;
use crate::state::{FileRow, ParamRow, ViewState};
use crate::{Effect, FileEdit, Msg, ParamEdit};

/// Pure update function: applies a message to state and returns any effects.
pub fn update(mut state: ViewState, msg: Msg) -> (ViewState, Vec<Effect>) {
    let effects = match msg {
        Msg::StageReport { hide_steps, stages } => {
            if !hide_steps {
                state.set_stages(stages);
            }
            Vec::new()
        }
        Msg::BootstrapLoaded {
            user,
            settings,
            catalog,
            favorites,
        } => {
            state.apply_bootstrap(user, settings, catalog, favorites);
            Vec::new()
        }
        Msg::BootstrapDenied { reason } => {
            state.deny_access(reason);
            Vec::new()
        }
        Msg::DisplayModeRestored(dark) => {
            state.restore_display_mode(dark);
            Vec::new()
        }
        Msg::DisplayModeToggled => {
            let dark = state.toggle_display_mode();
            vec![Effect::PersistDisplayMode(dark)]
        }
        Msg::TabSelected(tab) => {
            state.select_tab(tab);
            Vec::new()
        }
        Msg::AppToggled(app) => {
            state.toggle_app_expanded(&app);
            Vec::new()
        }
        Msg::CategorySelected { app, category } => {
            if state.select_category(&app, &category) {
                dispatch_current_page(&mut state)
            } else {
                Vec::new()
            }
        }
        Msg::FavoriteSelected(entry) => {
            state.select_favorite(entry);
            Vec::new()
        }
        Msg::EndpointToggled(descriptor) => {
            state.toggle_endpoint_expanded(&descriptor);
            Vec::new()
        }
        Msg::SearchTextChanged(text) => {
            state.set_search_text(text);
            Vec::new()
        }
        Msg::SearchSubmitted => {
            if !state.commit_search() {
                return (state, Vec::new());
            }
            let selection = state
                .selection()
                .map(|(app, category)| (app.to_string(), category.to_string()));
            match selection {
                Some((app, category)) => {
                    // Instant local filter when the scanned dataset for the
                    // selection is resident; otherwise go remote.
                    let resident = state
                        .catalog()
                        .category(&app, &category)
                        .map(|items| pagination::filter_by_query(items, state.search_query()));
                    match resident {
                        Some(filtered) => {
                            let page_size = state.settings().items_per_page;
                            let paginate = state.settings().enable_pagination;
                            let (items, info) =
                                pagination::first_page(filtered, page_size, paginate);
                            state.commit_local_page(items, info);
                            Vec::new()
                        }
                        None => dispatch_current_page(&mut state),
                    }
                }
                None => Vec::new(),
            }
        }
        Msg::PageRequested(page) => {
            let in_bounds = state
                .page_info()
                .is_some_and(|info| page >= 1 && page <= info.total_pages);
            if in_bounds && page != state.current_page() {
                state.set_current_page(page);
                dispatch_current_page(&mut state)
            } else {
                Vec::new()
            }
        }
        Msg::PageLoaded { generation, page } => {
            state.commit_page(
                generation,
                page.items,
                page.pagination,
                page.settings.enable_pagination,
            );
            Vec::new()
        }
        Msg::PageFailed { generation, .. } => {
            state.commit_page_failure(generation);
            Vec::new()
        }
        Msg::FavoriteToggled { name, path } => {
            let was_member = state.is_favorite(&path);
            if was_member {
                state.apply_favorite_remove(&path);
                vec![Effect::RemoveFavorite {
                    name,
                    path,
                    was_member,
                }]
            } else {
                state.apply_favorite_add(FavoriteEntry {
                    name: name.clone(),
                    path: path.clone(),
                });
                vec![Effect::AddFavorite {
                    name,
                    path,
                    was_member,
                }]
            }
        }
        Msg::FavoriteSyncFailed {
            name,
            path,
            was_member,
        } => {
            state.restore_favorite_membership(FavoriteEntry { name, path }, was_member);
            Vec::new()
        }
        Msg::ParamAdded(path) => {
            state.params_mut(&path).push(ParamRow::default());
            Vec::new()
        }
        Msg::ParamRemoved { path, index } => {
            let rows = state.params_mut(&path);
            if index < rows.len() {
                rows.remove(index);
            }
            Vec::new()
        }
        Msg::ParamEdited { path, index, edit } => {
            if let Some(row) = state.params_mut(&path).get_mut(index) {
                match edit {
                    ParamEdit::Key(key) => row.key = key,
                    ParamEdit::Value(value) => row.value = value,
                }
            }
            Vec::new()
        }
        Msg::FileAdded(path) => {
            state.files_mut(&path).push(FileRow::default());
            Vec::new()
        }
        Msg::FileRemoved { path, index } => {
            let rows = state.files_mut(&path);
            if index < rows.len() {
                rows.remove(index);
            }
            Vec::new()
        }
        Msg::FileEdited { path, index, edit } => {
            if let Some(row) = state.files_mut(&path).get_mut(index) {
                match edit {
                    FileEdit::Key(key) => row.key = key,
                    FileEdit::FileName(file_name) => row.file_name = file_name,
                    FileEdit::Mode(mode) => row.mode = mode,
                }
            }
            Vec::new()
        }
        Msg::BuffersCleared(path) => {
            state.clear_buffers(&path);
            Vec::new()
        }
        Msg::ExecuteRequested(path) => {
            let parameters: Vec<(String, String)> = state
                .params_for(&path)
                .iter()
                .filter(|row| !row.key.is_empty() && !row.value.is_empty())
                .map(|row| (row.key.clone(), row.value.clone()))
                .collect();
            let files: Vec<FileRow> = state
                .files_for(&path)
                .iter()
                .filter(|row| !row.key.is_empty() && !row.file_name.is_empty())
                .cloned()
                .collect();
            state.begin_execution(&path);
            vec![Effect::ExecuteEndpoint {
                path,
                parameters,
                files,
            }]
        }
        Msg::ExecutionFinished { path, record } => {
            state.finish_execution(&path, record);
            Vec::new()
        }
        Msg::SchemaRequested(path) => {
            vec![Effect::FetchSchema { path }]
        }
        Msg::SchemaLoaded { path, schema } => {
            state.store_schema(&path, schema);
            Vec::new()
        }
        Msg::CatalogReloaded(catalog) => {
            state.replace_catalog(catalog);
            Vec::new()
        }
        Msg::ReloadRequested => {
            vec![Effect::RescanCatalog]
        }
        Msg::LogoutRequested => {
            vec![Effect::Logout {
                track_history: state.settings().maintain_user_history,
            }]
        }
        Msg::NoOp => Vec::new(),
    };

    (state, effects)
}

/// Dispatch the paginated query for the current selection, page and query.
/// A dispatch with an identical key already in flight owns the eventual
/// commit, so nothing is issued for it.
fn dispatch_current_page(state: &mut ViewState) -> Vec<Effect> {
    let Some(key) = state.request_key() else {
        return Vec::new();
    };
    match state.begin_request(key.clone()) {
        Some(generation) => vec![Effect::FetchPage {
            generation,
            app: key.app,
            category: key.category,
            page: key.page,
            query: key.query,
        }],
        None => Vec::new(),
    }
}
