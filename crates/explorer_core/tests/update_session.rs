use std::collections::BTreeMap;
use std::sync::Once;

use explorer_core::{
    update, ActiveTab, Effect, EndpointCatalog, EndpointDescriptor, ExecutionRecord,
    ExecutionReport, FavoriteEntry, Msg, ParamEdit, Permissions, Settings, StageStatus, StageView,
    UserContext, ViewState,
};
use serde_json::json;

fn init_logging() {
    static INIT: Once = Once::new();
    INIT.call_once(gateway_logging::initialize_for_tests);
}

fn descriptor(path: &str, parameters: &[&str]) -> EndpointDescriptor {
    EndpointDescriptor {
        path: path.to_string(),
        name: path.rsplit('.').next().unwrap_or(path).to_string(),
        parameters: parameters.iter().map(ToString::to_string).collect(),
    }
}

fn small_catalog() -> EndpointCatalog {
    let mut categories = BTreeMap::new();
    categories.insert(
        "doctype".to_string(),
        vec![descriptor("core.user.get", &["user"])],
    );
    let mut apps = BTreeMap::new();
    apps.insert("core".to_string(), categories);
    EndpointCatalog::new(apps)
}

fn loaded_settings() -> Settings {
    Settings {
        dark_mode: Some(true),
        custom_page_title: "Console".to_string(),
        maintain_user_history: true,
        ..Settings::default()
    }
}

fn bootstrap_msg() -> Msg {
    Msg::BootstrapLoaded {
        user: UserContext {
            authenticated: true,
            user: Some("tester@example.com".to_string()),
            roles: vec!["System Manager".to_string()],
            permissions: Permissions {
                api_access: true,
                can_test: true,
                reason: None,
            },
        },
        settings: loaded_settings(),
        catalog: small_catalog(),
        favorites: vec![FavoriteEntry {
            name: "Get User".to_string(),
            path: "core.user.get".to_string(),
        }],
    }
}

#[test]
fn stage_reports_update_the_view_unless_hidden() {
    init_logging();
    let stages = vec![
        StageView {
            label: "Starting".to_string(),
            status: StageStatus::Completed,
        },
        StageView {
            label: "Settings".to_string(),
            status: StageStatus::Processing,
        },
    ];
    let (state, _) = update(
        ViewState::new(),
        Msg::StageReport {
            hide_steps: false,
            stages: stages.clone(),
        },
    );
    assert_eq!(state.view().stages, stages);

    let (state, _) = update(
        state,
        Msg::StageReport {
            hide_steps: true,
            stages: Vec::new(),
        },
    );
    assert_eq!(state.view().stages, stages);
}

#[test]
fn bootstrap_loaded_populates_the_console() {
    init_logging();
    let (state, effects) = update(ViewState::new(), bootstrap_msg());
    assert!(effects.is_empty());

    let view = state.view();
    assert!(!view.loading);
    assert!(view.dark_mode);
    assert_eq!(view.page_title, "Console");
    assert_eq!(view.apps.len(), 1);
    assert_eq!(view.apps[0].total, 1);
    assert_eq!(state.favorites().len(), 1);
}

#[test]
fn access_denied_carries_the_server_reason() {
    init_logging();
    let (state, _) = update(
        ViewState::new(),
        Msg::BootstrapDenied {
            reason: "Required roles: System Manager".to_string(),
        },
    );
    let view = state.view();
    assert!(!view.loading);
    assert!(view.access_denied);
    assert_eq!(view.access_denied_reason, "Required roles: System Manager");
}

#[test]
fn display_toggle_persists_but_restore_does_not() {
    init_logging();
    let (state, effects) = update(ViewState::new(), Msg::DisplayModeRestored(true));
    assert!(effects.is_empty());
    assert!(state.view().dark_mode);

    let (state, effects) = update(state, Msg::DisplayModeToggled);
    assert_eq!(effects, vec![Effect::PersistDisplayMode(false)]);
    assert!(!state.view().dark_mode);
}

#[test]
fn tab_switch_resets_the_selection() {
    init_logging();
    let (state, _) = update(ViewState::new(), bootstrap_msg());
    let (state, _) = update(
        state,
        Msg::CategorySelected {
            app: "core".to_string(),
            category: "doctype".to_string(),
        },
    );
    let (state, _) = update(state, Msg::TabSelected(ActiveTab::Favorites));

    // With the selection gone, a new search cannot dispatch a query.
    let (state, _) = update(state, Msg::SearchTextChanged("x".to_string()));
    let (state, effects) = update(state, Msg::SearchSubmitted);
    assert!(effects.is_empty());
    assert!(state
        .view()
        .apps
        .iter()
        .all(|app| app.categories.iter().all(|category| !category.selected)));
}

#[test]
fn selecting_a_favorite_merges_the_catalog_descriptor() {
    init_logging();
    let (state, _) = update(ViewState::new(), bootstrap_msg());
    let (state, _) = update(
        state,
        Msg::FavoriteSelected(FavoriteEntry {
            name: "Get User".to_string(),
            path: "core.user.get".to_string(),
        }),
    );
    let selected = state.view().selected_favorite.expect("selection");
    let descriptor = selected.descriptor.expect("resident descriptor");
    assert_eq!(descriptor.parameters, vec!["user".to_string()]);
}

#[test]
fn expanding_an_endpoint_seeds_the_parameter_buffer_once() {
    init_logging();
    let (state, _) = update(ViewState::new(), bootstrap_msg());
    let target = descriptor("core.user.get", &["user", "limit"]);

    let (state, _) = update(state, Msg::EndpointToggled(target.clone()));
    assert_eq!(state.params_for("core.user.get").len(), 2);
    assert_eq!(state.params_for("core.user.get")[0].key, "user");

    // Collapse, edit, re-expand: the buffer is kept, not re-seeded.
    let (state, _) = update(state, Msg::EndpointToggled(target.clone()));
    let (state, _) = update(
        state,
        Msg::ParamEdited {
            path: "core.user.get".to_string(),
            index: 0,
            edit: ParamEdit::Value("tester".to_string()),
        },
    );
    let (state, _) = update(state, Msg::EndpointToggled(target));
    assert_eq!(state.params_for("core.user.get")[0].value, "tester");
}

#[test]
fn execution_collects_only_filled_rows_and_stores_the_record() {
    init_logging();
    let (state, _) = update(ViewState::new(), bootstrap_msg());
    let path = "core.user.get".to_string();

    let (state, _) = update(state, Msg::ParamAdded(path.clone()));
    let (state, _) = update(state, Msg::ParamAdded(path.clone()));
    let (state, _) = update(
        state,
        Msg::ParamEdited {
            path: path.clone(),
            index: 0,
            edit: ParamEdit::Key("user".to_string()),
        },
    );
    let (state, _) = update(
        state,
        Msg::ParamEdited {
            path: path.clone(),
            index: 0,
            edit: ParamEdit::Value("tester".to_string()),
        },
    );

    let (state, effects) = update(state, Msg::ExecuteRequested(path.clone()));
    assert_eq!(
        effects,
        vec![Effect::ExecuteEndpoint {
            path: path.clone(),
            parameters: vec![("user".to_string(), "tester".to_string())],
            files: Vec::new(),
        }]
    );
    assert_eq!(state.view().executing.as_deref(), Some(path.as_str()));

    let record = ExecutionRecord::Completed(ExecutionReport {
        status_code: 200,
        response: json!({"full_name": "Tester"}),
        success: true,
        response_time_ms: 12.5,
        formatted_on_copy: false,
    });
    let (state, _) = update(
        state,
        Msg::ExecutionFinished {
            path: path.clone(),
            record: record.clone(),
        },
    );
    assert!(state.view().executing.is_none());
    assert_eq!(state.response_for(&path), Some(&record));
}

#[test]
fn failed_execution_is_captured_as_a_record() {
    init_logging();
    let (state, _) = update(ViewState::new(), bootstrap_msg());
    let record = ExecutionRecord::Failed {
        kind: "NetworkError".to_string(),
        message: "connection refused".to_string(),
    };
    let (state, _) = update(
        state,
        Msg::ExecutionFinished {
            path: "core.user.get".to_string(),
            record: record.clone(),
        },
    );
    assert_eq!(state.response_for("core.user.get"), Some(&record));
}

#[test]
fn schema_request_round_trips_into_state() {
    init_logging();
    let (state, _) = update(ViewState::new(), bootstrap_msg());
    let (state, effects) = update(state, Msg::SchemaRequested("core.user.get".to_string()));
    assert_eq!(
        effects,
        vec![Effect::FetchSchema {
            path: "core.user.get".to_string()
        }]
    );

    let schema = json!({"parameters": [{"name": "user", "required": true}]});
    let (state, _) = update(
        state,
        Msg::SchemaLoaded {
            path: "core.user.get".to_string(),
            schema: schema.clone(),
        },
    );
    assert_eq!(state.schema_for("core.user.get"), Some(&schema));
}

#[test]
fn logout_carries_the_history_setting() {
    init_logging();
    let (state, _) = update(ViewState::new(), bootstrap_msg());
    let (_, effects) = update(state, Msg::LogoutRequested);
    assert_eq!(effects, vec![Effect::Logout { track_history: true }]);
}

#[test]
fn reload_rescans_and_the_fresh_catalog_resets_selection() {
    init_logging();
    let (state, _) = update(ViewState::new(), bootstrap_msg());
    let (state, _) = update(
        state,
        Msg::CategorySelected {
            app: "core".to_string(),
            category: "doctype".to_string(),
        },
    );

    let (state, effects) = update(state, Msg::ReloadRequested);
    assert_eq!(effects, vec![Effect::RescanCatalog]);

    let (state, _) = update(state, Msg::CatalogReloaded(EndpointCatalog::default()));
    assert!(state.view().apps.is_empty());
    assert!(!state.view().content_loading);
    assert!(state.active_request().is_none());
}

#[test]
fn noop_changes_nothing() {
    init_logging();
    let state = ViewState::new();
    let (next, effects) = update(state.clone(), Msg::NoOp);
    assert_eq!(state, next);
    assert!(effects.is_empty());
}
