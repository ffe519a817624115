use std::sync::Arc;
use std::time::Duration;

use gateway_logging::{gateway_debug, gateway_warn};

use explorer_core::{EndpointCatalog, FavoriteEntry, Settings, UserContext};

use crate::client::PlatformClient;
use crate::fault::Fault;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StageId {
    Starting,
    Settings,
    Auth,
    Scan,
    Preload,
    Complete,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StageStatus {
    Pending,
    Processing,
    Completed,
    Failed,
}

/// One named bootstrap stage as emitted in a snapshot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StageState {
    pub id: StageId,
    pub label: &'static str,
    pub status: StageStatus,
}

/// One emitted snapshot of the whole stage sequence.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StageReport {
    pub hide_steps: bool,
    pub stages: Vec<StageState>,
}

/// Receives stage snapshots synchronously, once per emission, and the one
/// deferred login redirect on an unauthenticated abort.
pub trait BootstrapObserver: Send + Sync {
    fn stage_report(&self, report: StageReport);
    fn schedule_login_redirect(&self);
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BootstrapErrorType {
    AuthFailed,
    AccessDenied,
}

/// Aggregated payload of a successful run.
#[derive(Debug, Clone, PartialEq)]
pub struct BootstrapData {
    pub user_context: UserContext,
    pub settings: Settings,
    pub catalog: EndpointCatalog,
    pub favorites: Vec<FavoriteEntry>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct PipelineResult {
    pub success: bool,
    pub data: Option<BootstrapData>,
    pub error: Option<String>,
    pub error_type: Option<BootstrapErrorType>,
    pub hide_steps: bool,
}

#[derive(Debug, Clone)]
pub struct BootstrapOptions {
    /// Pacing delay between stages; skipped after the last one.
    pub stage_delay: Duration,
}

impl Default for BootstrapOptions {
    fn default() -> Self {
        Self {
            stage_delay: Duration::from_millis(300),
        }
    }
}

const STAGES: [(StageId, &str, bool); 6] = [
    (StageId::Starting, "Starting", false),
    (StageId::Settings, "Settings", true),
    (StageId::Auth, "Authenticating", true),
    (StageId::Scan, "Scanning endpoints", true),
    (StageId::Preload, "Preloading data", true),
    (StageId::Complete, "Finalising", false),
];

const ACCESS_DENIED_FALLBACK: &str = "Contact an administrator for more details";

#[derive(Default)]
struct StageResults {
    user: Option<UserContext>,
    settings: Option<Settings>,
    catalog: Option<EndpointCatalog>,
    favorites: Option<Vec<FavoriteEntry>>,
}

/// Sequential named-stage bootstrap over a [`PlatformClient`].
///
/// Stages run strictly in order, each fully awaited before the next;
/// snapshots keep the invariant that at most one stage is `Processing` and
/// it is always the lowest-index non-terminal one.
pub struct BootstrapPipeline {
    client: Arc<dyn PlatformClient>,
    options: BootstrapOptions,
}

impl BootstrapPipeline {
    pub fn new(client: Arc<dyn PlatformClient>) -> Self {
        Self::with_options(client, BootstrapOptions::default())
    }

    pub fn with_options(client: Arc<dyn PlatformClient>, options: BootstrapOptions) -> Self {
        Self { client, options }
    }

    /// Runs the whole sequence. Classified authentication failures come back
    /// as an unsuccessful [`PipelineResult`]; a fault in any other stage is
    /// fatal and propagates to the caller.
    pub async fn run(&self, observer: &dyn BootstrapObserver) -> Result<PipelineResult, Fault> {
        let mut results = StageResults::default();

        observer.stage_report(snapshot(|_| StageStatus::Pending));

        for (index, &(id, _, has_work)) in STAGES.iter().enumerate() {
            observer.stage_report(snapshot(|i| match i.cmp(&index) {
                std::cmp::Ordering::Less => StageStatus::Completed,
                std::cmp::Ordering::Equal => StageStatus::Processing,
                std::cmp::Ordering::Greater => StageStatus::Pending,
            }));

            if has_work {
                if let Err(fault) = self.run_stage(id, &mut results).await {
                    if id == StageId::Auth {
                        return Ok(self.classify_auth_failure(fault, observer));
                    }
                    gateway_warn!("bootstrap stage {:?} failed: {}", id, fault);
                    observer.stage_report(snapshot(|i| {
                        if i < index {
                            StageStatus::Completed
                        } else if i == index {
                            StageStatus::Failed
                        } else {
                            StageStatus::Pending
                        }
                    }));
                    return Err(fault);
                }
            }

            observer.stage_report(snapshot(|i| {
                if i <= index {
                    StageStatus::Completed
                } else {
                    StageStatus::Pending
                }
            }));

            if index + 1 < STAGES.len() {
                tokio::time::sleep(self.options.stage_delay).await;
            }
        }

        observer.stage_report(snapshot(|_| StageStatus::Completed));

        Ok(PipelineResult {
            success: true,
            data: Some(BootstrapData {
                user_context: results.user.unwrap_or_default(),
                settings: results.settings.unwrap_or_default(),
                catalog: results.catalog.unwrap_or_default(),
                favorites: results.favorites.unwrap_or_default(),
            }),
            error: None,
            error_type: None,
            hide_steps: false,
        })
    }

    fn classify_auth_failure(
        &self,
        fault: Fault,
        observer: &dyn BootstrapObserver,
    ) -> PipelineResult {
        observer.stage_report(StageReport {
            hide_steps: true,
            stages: Vec::new(),
        });
        match fault {
            Fault::AccessDenied { reason } => PipelineResult {
                success: false,
                data: None,
                error: Some(reason),
                error_type: Some(BootstrapErrorType::AccessDenied),
                hide_steps: true,
            },
            other => {
                gateway_warn!("authentication failed: {}", other);
                observer.schedule_login_redirect();
                PipelineResult {
                    success: false,
                    data: None,
                    error: Some("Authentication failed - redirecting to login".to_string()),
                    error_type: Some(BootstrapErrorType::AuthFailed),
                    hide_steps: true,
                }
            }
        }
    }

    async fn run_stage(&self, id: StageId, results: &mut StageResults) -> Result<(), Fault> {
        match id {
            StageId::Starting | StageId::Complete => Ok(()),
            StageId::Settings => {
                let settings = match self.client.get_settings().await {
                    Ok(settings) => settings,
                    Err(fault) => {
                        gateway_warn!("settings load failed, using defaults: {}", fault);
                        Settings::default()
                    }
                };
                results.settings = Some(settings);
                Ok(())
            }
            StageId::Auth => {
                let context = self
                    .client
                    .get_current_user_context()
                    .await
                    .map_err(|_| Fault::Unauthenticated)?;
                if !context.authenticated {
                    return Err(Fault::Unauthenticated);
                }
                if !context.permissions.api_access {
                    let reason = context
                        .permissions
                        .reason
                        .clone()
                        .unwrap_or_else(|| ACCESS_DENIED_FALLBACK.to_string());
                    return Err(Fault::AccessDenied { reason });
                }
                results.user = Some(context);
                Ok(())
            }
            StageId::Scan => {
                if !results.user.as_ref().is_some_and(|user| user.authenticated) {
                    return Err(Fault::Unauthenticated);
                }
                let catalog = match self.client.scan_endpoints().await {
                    Ok(catalog) => catalog,
                    Err(fault) => {
                        gateway_warn!("endpoint scan failed, catalog is empty: {}", fault);
                        EndpointCatalog::default()
                    }
                };
                results.catalog = Some(catalog);
                Ok(())
            }
            StageId::Preload => {
                let track = results
                    .settings
                    .as_ref()
                    .is_some_and(|settings| settings.maintain_user_history);
                if track {
                    if let Err(fault) = self.client.track_login().await {
                        gateway_debug!("login tracking ignored: {}", fault);
                    }
                }
                let favorites = match self.client.get_favorites().await {
                    Ok(favorites) => favorites,
                    Err(fault) => {
                        gateway_warn!("favorites preload failed, starting empty: {}", fault);
                        Vec::new()
                    }
                };
                results.favorites = Some(favorites);
                Ok(())
            }
        }
    }
}

/// Builds one visible snapshot from a per-index status function.
fn snapshot(status: impl Fn(usize) -> StageStatus) -> StageReport {
    let stages = STAGES
        .iter()
        .enumerate()
        .map(|(index, &(id, label, _))| StageState {
            id,
            label,
            status: status(index),
        })
        .collect();
    StageReport {
        hide_steps: false,
        stages,
    }
}
