//! Explorer core: pure state machine and view-model helpers.
mod effect;
mod model;
mod msg;
mod pagination;
mod state;
mod update;
mod view_model;

pub use effect::Effect;
pub use model::{
    EndpointCatalog, EndpointDescriptor, ExecutionRecord, ExecutionReport, FavoriteEntry,
    PageResponse, PageSettings, Permissions, Settings, UserContext,
};
pub use msg::{FileEdit, Msg, ParamEdit};
pub use pagination::{filter_by_query, first_page, PaginationState};
pub use state::{
    ActiveRequest, ActiveTab, FileMode, FileRow, ParamRow, RequestKey, SelectedFavorite,
    StageStatus, StageView, ViewState,
};
pub use update::update;
pub use view_model::{AppRowView, CategoryRowView, ConsoleViewModel, EndpointRowView};
