use std::path::PathBuf;
use std::sync::mpsc;
use std::thread;
use std::time::Duration;

use gateway_logging::{gateway_error, gateway_info, gateway_warn};

use explorer_core::{Effect, ExecutionRecord, Msg, StageStatus, StageView};
use explorer_gateway::{
    BootstrapErrorType, ClientEvent, ClientHandle, Command, PipelineResult, StageReport,
};

use super::persistence;

/// Delay before acting on a scheduled login redirect.
const REDIRECT_DELAY: Duration = Duration::from_secs(1);

/// Shell-level notifications with no counterpart in core state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum ShellSignal {
    RedirectToLogin,
    SessionEnded,
}

/// Executes core effects against the gateway and feeds completions back as
/// messages.
pub(crate) struct EffectRunner {
    cmd_tx: mpsc::Sender<Command>,
    prefs_dir: PathBuf,
}

impl EffectRunner {
    pub fn new(
        handle: ClientHandle,
        prefs_dir: PathBuf,
        msg_tx: mpsc::Sender<Msg>,
        signal_tx: mpsc::Sender<ShellSignal>,
    ) -> Self {
        let cmd_tx = handle.sender();
        spawn_event_loop(handle, msg_tx, signal_tx);
        Self { cmd_tx, prefs_dir }
    }

    pub fn submit_bootstrap(&self) {
        let _ = self.cmd_tx.send(Command::RunBootstrap);
    }

    pub fn run(&self, effects: Vec<Effect>) {
        for effect in effects {
            match effect {
                Effect::FetchPage {
                    generation,
                    app,
                    category,
                    page,
                    query,
                } => {
                    let _ = self.cmd_tx.send(Command::FetchPage {
                        generation,
                        app,
                        category,
                        page,
                        query,
                    });
                }
                Effect::AddFavorite {
                    name,
                    path,
                    was_member,
                } => {
                    let _ = self.cmd_tx.send(Command::AddFavorite {
                        name,
                        path,
                        was_member,
                    });
                }
                Effect::RemoveFavorite {
                    name,
                    path,
                    was_member,
                } => {
                    let _ = self.cmd_tx.send(Command::RemoveFavorite {
                        name,
                        path,
                        was_member,
                    });
                }
                Effect::ExecuteEndpoint {
                    path,
                    parameters,
                    files,
                } => {
                    let _ = self.cmd_tx.send(Command::Execute {
                        path,
                        parameters,
                        files,
                    });
                }
                Effect::FetchSchema { path } => {
                    let _ = self.cmd_tx.send(Command::FetchSchema { path });
                }
                Effect::PersistDisplayMode(dark_mode) => {
                    persistence::save_display_mode(&self.prefs_dir, dark_mode);
                }
                Effect::RescanCatalog => {
                    let _ = self.cmd_tx.send(Command::Rescan);
                }
                Effect::Logout { track_history } => {
                    let _ = self.cmd_tx.send(Command::Logout { track_history });
                }
            }
        }
    }
}

fn spawn_event_loop(
    handle: ClientHandle,
    msg_tx: mpsc::Sender<Msg>,
    signal_tx: mpsc::Sender<ShellSignal>,
) {
    thread::spawn(move || loop {
        if let Some(event) = handle.try_recv() {
            forward_event(event, &msg_tx, &signal_tx);
        } else {
            thread::sleep(Duration::from_millis(20));
        }
    });
}

fn forward_event(
    event: ClientEvent,
    msg_tx: &mpsc::Sender<Msg>,
    signal_tx: &mpsc::Sender<ShellSignal>,
) {
    match event {
        ClientEvent::Stage(report) => {
            let _ = msg_tx.send(map_stage_report(report));
        }
        ClientEvent::LoginRedirectScheduled => {
            thread::sleep(REDIRECT_DELAY);
            let _ = signal_tx.send(ShellSignal::RedirectToLogin);
        }
        ClientEvent::BootstrapFinished(Ok(result)) => {
            forward_bootstrap_result(result, msg_tx);
        }
        ClientEvent::BootstrapFinished(Err(fault)) => {
            // Unclassified stage failure: the only recourse is the coarse
            // login redirect.
            gateway_error!("bootstrap failed: {}", fault);
            let _ = signal_tx.send(ShellSignal::RedirectToLogin);
        }
        ClientEvent::PageLoaded { generation, result } => match result {
            Ok(page) => {
                let _ = msg_tx.send(Msg::PageLoaded { generation, page });
            }
            Err(fault) => {
                gateway_warn!("paginated query failed: {}", fault);
                let _ = msg_tx.send(Msg::PageFailed {
                    generation,
                    message: fault.to_string(),
                });
            }
        },
        ClientEvent::FavoriteSyncFailed {
            name,
            path,
            was_member,
            ..
        } => {
            let _ = msg_tx.send(Msg::FavoriteSyncFailed {
                name,
                path,
                was_member,
            });
        }
        ClientEvent::ExecutionFinished { path, result } => {
            let record = match result {
                Ok(report) => ExecutionRecord::Completed(report),
                Err(fault) => ExecutionRecord::Failed {
                    kind: fault.kind().to_string(),
                    message: fault.to_string(),
                },
            };
            let _ = msg_tx.send(Msg::ExecutionFinished { path, record });
        }
        ClientEvent::SchemaLoaded { path, result } => match result {
            Ok(schema) => {
                let _ = msg_tx.send(Msg::SchemaLoaded { path, schema });
            }
            Err(fault) => {
                gateway_warn!("schema fetch for {} failed: {}", path, fault);
            }
        },
        ClientEvent::CatalogScanned(Ok(catalog)) => {
            let _ = msg_tx.send(Msg::CatalogReloaded(catalog));
        }
        ClientEvent::CatalogScanned(Err(fault)) => {
            gateway_warn!("catalog rescan failed, keeping the old catalog: {}", fault);
        }
        ClientEvent::LoggedOut => {
            let _ = signal_tx.send(ShellSignal::SessionEnded);
        }
    }
}

fn forward_bootstrap_result(result: PipelineResult, msg_tx: &mpsc::Sender<Msg>) {
    if result.success {
        if let Some(data) = result.data {
            let _ = msg_tx.send(Msg::BootstrapLoaded {
                user: data.user_context,
                settings: data.settings,
                catalog: data.catalog,
                favorites: data.favorites,
            });
        }
        return;
    }
    match result.error_type {
        Some(BootstrapErrorType::AccessDenied) => {
            let _ = msg_tx.send(Msg::BootstrapDenied {
                reason: result.error.unwrap_or_default(),
            });
        }
        Some(BootstrapErrorType::AuthFailed) => {
            // The redirect is already scheduled through the observer.
            gateway_info!("not authenticated; waiting for the login redirect");
        }
        None => {}
    }
}

fn map_stage_report(report: StageReport) -> Msg {
    let stages = report
        .stages
        .into_iter()
        .map(|stage| StageView {
            label: stage.label.to_string(),
            status: map_stage_status(stage.status),
        })
        .collect();
    Msg::StageReport {
        hide_steps: report.hide_steps,
        stages,
    }
}

fn map_stage_status(status: explorer_gateway::StageStatus) -> StageStatus {
    match status {
        explorer_gateway::StageStatus::Pending => StageStatus::Pending,
        explorer_gateway::StageStatus::Processing => StageStatus::Processing,
        explorer_gateway::StageStatus::Completed => StageStatus::Completed,
        explorer_gateway::StageStatus::Failed => StageStatus::Failed,
    }
}
