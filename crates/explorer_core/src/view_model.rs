use crate::model::{EndpointDescriptor, FavoriteEntry};
use crate::pagination::PaginationState;
use crate::state::{ActiveTab, SelectedFavorite, StageView, ViewState};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CategoryRowView {
    pub name: String,
    pub count: usize,
    pub selected: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppRowView {
    pub name: String,
    pub expanded: bool,
    pub total: usize,
    pub categories: Vec<CategoryRowView>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EndpointRowView {
    pub descriptor: EndpointDescriptor,
    pub expanded: bool,
    pub is_favorite: bool,
}

/// Flat projection of the state for rendering.
#[derive(Debug, Clone, PartialEq)]
pub struct ConsoleViewModel {
    pub loading: bool,
    pub content_loading: bool,
    pub access_denied: bool,
    pub access_denied_reason: String,
    pub stages: Vec<StageView>,
    pub page_title: String,
    pub page_description: String,
    pub search_enabled: bool,
    pub search_text: String,
    pub dark_mode: bool,
    pub active_tab: ActiveTab,
    pub apps: Vec<AppRowView>,
    /// Favorites shown in the sidebar: filtered by the committed query on
    /// the favorites tab, empty otherwise.
    pub favorites: Vec<FavoriteEntry>,
    pub selected_favorite: Option<SelectedFavorite>,
    pub endpoints: Vec<EndpointRowView>,
    pub pagination: Option<PaginationState>,
    pub pagination_enabled: bool,
    pub current_page: usize,
    pub executing: Option<String>,
    pub dirty: bool,
}

impl ConsoleViewModel {
    pub(crate) fn project(state: &ViewState) -> Self {
        let settings = state.settings();
        let (access_denied, reason) = state.access_denied();

        let apps = state
            .catalog()
            .apps()
            .map(|(app, categories)| AppRowView {
                name: app.clone(),
                expanded: state.expanded_apps().contains(app),
                total: categories.values().map(Vec::len).sum(),
                categories: categories
                    .iter()
                    .map(|(category, endpoints)| CategoryRowView {
                        name: category.clone(),
                        count: endpoints.len(),
                        selected: state.selection()
                            == Some((app.as_str(), category.as_str())),
                    })
                    .collect(),
            })
            .collect();

        let favorites = match state.active_tab() {
            ActiveTab::Favorites => filter_favorites(state.favorites(), state.search_query()),
            ActiveTab::Apps => Vec::new(),
        };

        let endpoints = state
            .page_items()
            .iter()
            .map(|descriptor| EndpointRowView {
                descriptor: descriptor.clone(),
                expanded: state.expanded_endpoints().contains(&descriptor.path),
                is_favorite: state.is_favorite(&descriptor.path),
            })
            .collect();

        Self {
            loading: state.loading(),
            content_loading: state.content_loading(),
            access_denied,
            access_denied_reason: reason.to_string(),
            stages: state.stages().to_vec(),
            page_title: or_default(&settings.custom_page_title, "Endpoint Explorer"),
            page_description: or_default(
                &settings.custom_page_description,
                "Explore and invoke platform endpoints",
            ),
            search_enabled: settings.enable_search,
            search_text: state.search_text().to_string(),
            dark_mode: state.dark_mode(),
            active_tab: state.active_tab(),
            apps,
            favorites,
            selected_favorite: state.selected_favorite().cloned(),
            endpoints,
            pagination: state.page_info().copied(),
            pagination_enabled: state.remote_pagination_enabled(),
            current_page: state.current_page(),
            executing: state.executing().map(ToOwned::to_owned),
            dirty: state.is_dirty(),
        }
    }
}

fn filter_favorites(favorites: &[FavoriteEntry], query: &str) -> Vec<FavoriteEntry> {
    if query.is_empty() {
        return favorites.to_vec();
    }
    let needle = query.to_lowercase();
    favorites
        .iter()
        .filter(|entry| {
            entry.name.to_lowercase().contains(&needle)
                || entry.path.to_lowercase().contains(&needle)
        })
        .cloned()
        .collect()
}

fn or_default(value: &str, fallback: &str) -> String {
    if value.is_empty() {
        fallback.to_string()
    } else {
        value.to_string()
    }
}
