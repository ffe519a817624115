use crate::state::FileRow;

/// Side effects requested by `update`, executed by the shell against the
/// gateway. Completions come back as Msgs.
#[derive(Debug, Clone, PartialEq)]
pub enum Effect {
    /// Dispatch one paginated catalog query. The generation token is echoed
    /// back in the completion for staleness detection.
    FetchPage {
        generation: u64,
        app: String,
        category: String,
        page: usize,
        query: String,
    },
    /// Persist a new favorite remotely; the local set was already updated.
    AddFavorite {
        name: String,
        path: String,
        was_member: bool,
    },
    /// Remove a favorite remotely; the local set was already updated.
    RemoveFavorite {
        name: String,
        path: String,
        was_member: bool,
    },
    /// Invoke one endpoint with the collected parameter and file buffers.
    ExecuteEndpoint {
        path: String,
        parameters: Vec<(String, String)>,
        files: Vec<FileRow>,
    },
    FetchSchema { path: String },
    /// Write the display flag to durable client storage.
    PersistDisplayMode(bool),
    /// Drop the server-side scan cache and fetch a fresh catalog.
    RescanCatalog,
    /// End the session; login tracking is fired first when history is on.
    Logout { track_history: bool },
}
