use serde_json::Value;

use crate::model::{
    EndpointCatalog, EndpointDescriptor, ExecutionRecord, FavoriteEntry, PageResponse, Settings,
    UserContext,
};
use crate::state::{ActiveTab, FileMode, StageView};

/// Edit applied to one parameter row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParamEdit {
    Key(String),
    Value(String),
}

/// Edit applied to one file row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FileEdit {
    Key(String),
    FileName(String),
    Mode(FileMode),
}

#[derive(Debug, Clone, PartialEq)]
pub enum Msg {
    /// Bootstrap stage snapshot forwarded from the pipeline observer.
    StageReport {
        hide_steps: bool,
        stages: Vec<StageView>,
    },
    /// Bootstrap finished successfully with its aggregated payload.
    BootstrapLoaded {
        user: UserContext,
        settings: Settings,
        catalog: EndpointCatalog,
        favorites: Vec<FavoriteEntry>,
    },
    /// Bootstrap aborted: authenticated but lacking console access.
    BootstrapDenied { reason: String },
    /// Persisted display flag read back at startup.
    DisplayModeRestored(bool),
    /// User flipped the display mode.
    DisplayModeToggled,
    /// User switched the sidebar tab; selection resets.
    TabSelected(ActiveTab),
    /// User expanded or collapsed one application group.
    AppToggled(String),
    /// User picked an (app, category) pair from the sidebar.
    CategorySelected { app: String, category: String },
    /// User picked a favorite from the favorites tab.
    FavoriteSelected(FavoriteEntry),
    /// User expanded or collapsed one endpoint card.
    EndpointToggled(EndpointDescriptor),
    /// User edited the search box (uncommitted draft).
    SearchTextChanged(String),
    /// User submitted the current search draft.
    SearchSubmitted,
    /// User navigated to another page of the current result.
    PageRequested(usize),
    /// A dispatched paginated query resolved.
    PageLoaded { generation: u64, page: PageResponse },
    /// A dispatched paginated query failed in transport.
    PageFailed { generation: u64, message: String },
    /// User toggled the favorite star of one endpoint.
    FavoriteToggled { name: String, path: String },
    /// A favorite mutation was rejected remotely; membership reverts to the
    /// captured pre-toggle value.
    FavoriteSyncFailed {
        name: String,
        path: String,
        was_member: bool,
    },
    ParamAdded(String),
    ParamRemoved { path: String, index: usize },
    ParamEdited {
        path: String,
        index: usize,
        edit: ParamEdit,
    },
    FileAdded(String),
    FileRemoved { path: String, index: usize },
    FileEdited {
        path: String,
        index: usize,
        edit: FileEdit,
    },
    /// Clear both buffers of one endpoint.
    BuffersCleared(String),
    /// User invoked an endpoint with the current buffers.
    ExecuteRequested(String),
    /// An invocation settled, successfully or not.
    ExecutionFinished {
        path: String,
        record: ExecutionRecord,
    },
    /// User asked for the schema of one endpoint.
    SchemaRequested(String),
    SchemaLoaded { path: String, schema: Value },
    /// Fresh catalog after an explicit rescan.
    CatalogReloaded(EndpointCatalog),
    /// User asked to rescan the endpoint catalog.
    ReloadRequested,
    /// User asked to end the session.
    LogoutRequested,
    /// Fallback for placeholder wiring.
    NoOp,
}
