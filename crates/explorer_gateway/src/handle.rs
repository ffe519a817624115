use std::sync::{mpsc, Arc};
use std::thread;

use gateway_logging::{gateway_debug, gateway_info, gateway_warn};
use serde_json::Value;

use explorer_core::{EndpointCatalog, ExecutionReport, FileRow, PageResponse};

use crate::bootstrap::{BootstrapObserver, BootstrapOptions, BootstrapPipeline, PipelineResult, StageReport};
use crate::client::PlatformClient;
use crate::fault::Fault;

/// Work submitted by the shell.
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    RunBootstrap,
    FetchPage {
        generation: u64,
        app: String,
        category: String,
        page: usize,
        query: String,
    },
    AddFavorite {
        name: String,
        path: String,
        was_member: bool,
    },
    RemoveFavorite {
        name: String,
        path: String,
        was_member: bool,
    },
    Execute {
        path: String,
        parameters: Vec<(String, String)>,
        files: Vec<FileRow>,
    },
    FetchSchema { path: String },
    Rescan,
    Logout { track_history: bool },
}

/// Completions and notifications flowing back to the shell.
#[derive(Debug, Clone, PartialEq)]
pub enum ClientEvent {
    Stage(StageReport),
    LoginRedirectScheduled,
    BootstrapFinished(Result<PipelineResult, Fault>),
    PageLoaded {
        generation: u64,
        result: Result<PageResponse, Fault>,
    },
    FavoriteSyncFailed {
        name: String,
        path: String,
        was_member: bool,
        fault: Fault,
    },
    ExecutionFinished {
        path: String,
        result: Result<ExecutionReport, Fault>,
    },
    SchemaLoaded {
        path: String,
        result: Result<Value, Fault>,
    },
    CatalogScanned(Result<EndpointCatalog, Fault>),
    LoggedOut,
}

/// Channel pair over a dedicated thread running a tokio runtime. Commands
/// run concurrently on the runtime; completions drain through `try_recv`.
pub struct ClientHandle {
    cmd_tx: mpsc::Sender<Command>,
    event_rx: mpsc::Receiver<ClientEvent>,
}

impl ClientHandle {
    pub fn new(client: Arc<dyn PlatformClient>, options: BootstrapOptions) -> Self {
        let (cmd_tx, cmd_rx) = mpsc::channel();
        let (event_tx, event_rx) = mpsc::channel::<ClientEvent>();

        thread::spawn(move || {
            let runtime = tokio::runtime::Runtime::new().expect("tokio runtime");
            while let Ok(command) = cmd_rx.recv() {
                let client = client.clone();
                let options = options.clone();
                let event_tx = event_tx.clone();
                runtime.spawn(async move {
                    handle_command(client, options, command, event_tx).await;
                });
            }
        });

        Self { cmd_tx, event_rx }
    }

    pub fn submit(&self, command: Command) {
        let _ = self.cmd_tx.send(command);
    }

    /// A detached submission channel, for when the handle itself moves into
    /// the event-draining thread.
    pub fn sender(&self) -> mpsc::Sender<Command> {
        self.cmd_tx.clone()
    }

    pub fn try_recv(&self) -> Option<ClientEvent> {
        self.event_rx.try_recv().ok()
    }
}

/// Forwards pipeline snapshots to the event channel.
struct ChannelObserver {
    tx: mpsc::Sender<ClientEvent>,
}

impl BootstrapObserver for ChannelObserver {
    fn stage_report(&self, report: StageReport) {
        let _ = self.tx.send(ClientEvent::Stage(report));
    }

    fn schedule_login_redirect(&self) {
        let _ = self.tx.send(ClientEvent::LoginRedirectScheduled);
    }
}

async fn handle_command(
    client: Arc<dyn PlatformClient>,
    options: BootstrapOptions,
    command: Command,
    event_tx: mpsc::Sender<ClientEvent>,
) {
    match command {
        Command::RunBootstrap => {
            let observer = ChannelObserver {
                tx: event_tx.clone(),
            };
            let pipeline = BootstrapPipeline::with_options(client, options);
            let result = pipeline.run(&observer).await;
            let _ = event_tx.send(ClientEvent::BootstrapFinished(result));
        }
        Command::FetchPage {
            generation,
            app,
            category,
            page,
            query,
        } => {
            let result = client
                .get_paginated_endpoints(&app, &category, page, &query)
                .await;
            let _ = event_tx.send(ClientEvent::PageLoaded { generation, result });
        }
        Command::AddFavorite {
            name,
            path,
            was_member,
        } => {
            if let Err(fault) = client.add_favorite(&name, &path).await {
                gateway_warn!("add favorite {} rejected: {}", path, fault);
                let _ = event_tx.send(ClientEvent::FavoriteSyncFailed {
                    name,
                    path,
                    was_member,
                    fault,
                });
            }
        }
        Command::RemoveFavorite {
            name,
            path,
            was_member,
        } => {
            if let Err(fault) = client.remove_favorite(&path).await {
                gateway_warn!("remove favorite {} rejected: {}", path, fault);
                let _ = event_tx.send(ClientEvent::FavoriteSyncFailed {
                    name,
                    path,
                    was_member,
                    fault,
                });
            }
        }
        Command::Execute {
            path,
            parameters,
            files,
        } => {
            let result = client.execute_endpoint(&path, &parameters, &files).await;
            let _ = event_tx.send(ClientEvent::ExecutionFinished { path, result });
        }
        Command::FetchSchema { path } => {
            let result = client.get_endpoint_schema(&path).await;
            let _ = event_tx.send(ClientEvent::SchemaLoaded { path, result });
        }
        Command::Rescan => {
            if let Err(fault) = client.clear_scan_cache().await {
                gateway_debug!("scan cache clear ignored: {}", fault);
            }
            let result = client.scan_endpoints().await;
            let _ = event_tx.send(ClientEvent::CatalogScanned(result));
        }
        Command::Logout { track_history } => {
            if track_history {
                if let Err(fault) = client.track_logout().await {
                    gateway_debug!("logout tracking ignored: {}", fault);
                }
            }
            if let Err(fault) = client.logout().await {
                gateway_warn!("platform logout failed: {}", fault);
            }
            gateway_info!("session ended");
            let _ = event_tx.send(ClientEvent::LoggedOut);
        }
    }
}
