use std::collections::BTreeMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use explorer_core::{
    EndpointCatalog, EndpointDescriptor, ExecutionReport, FavoriteEntry, FileRow, PageResponse,
    Permissions, Settings, UserContext,
};
use explorer_gateway::{
    BootstrapErrorType, BootstrapObserver, BootstrapOptions, BootstrapPipeline, Fault,
    PlatformClient, StageReport, StageStatus,
};
use serde_json::Value;

/// Canned platform with per-operation failure switches and call counters.
#[derive(Default)]
struct StubClient {
    authenticated: bool,
    api_access: bool,
    denial_reason: Option<String>,
    user_context_fault: bool,
    settings: Settings,
    settings_fault: bool,
    scan_fault: bool,
    favorites_fault: bool,
    track_login_fault: bool,
    scan_calls: AtomicUsize,
    preload_calls: AtomicUsize,
    track_login_calls: AtomicUsize,
}

impl StubClient {
    fn authorized() -> Self {
        Self {
            authenticated: true,
            api_access: true,
            ..Self::default()
        }
    }

    fn catalog() -> EndpointCatalog {
        let mut categories = BTreeMap::new();
        categories.insert(
            "doctype".to_string(),
            vec![EndpointDescriptor {
                path: "core.user.get".to_string(),
                name: "Get User".to_string(),
                parameters: vec!["user".to_string()],
            }],
        );
        let mut apps = BTreeMap::new();
        apps.insert("core".to_string(), categories);
        EndpointCatalog::new(apps)
    }
}

#[async_trait]
impl PlatformClient for StubClient {
    async fn get_current_user_context(&self) -> Result<UserContext, Fault> {
        if self.user_context_fault {
            return Err(Fault::Transport("connection reset".to_string()));
        }
        Ok(UserContext {
            authenticated: self.authenticated,
            user: Some("tester@example.com".to_string()),
            roles: Vec::new(),
            permissions: Permissions {
                api_access: self.api_access,
                can_test: self.api_access,
                reason: self.denial_reason.clone(),
            },
        })
    }

    async fn get_settings(&self) -> Result<Settings, Fault> {
        if self.settings_fault {
            return Err(Fault::Http { status: 500 });
        }
        Ok(self.settings.clone())
    }

    async fn scan_endpoints(&self) -> Result<EndpointCatalog, Fault> {
        self.scan_calls.fetch_add(1, Ordering::SeqCst);
        if self.scan_fault {
            return Err(Fault::Transport("scan failed".to_string()));
        }
        Ok(Self::catalog())
    }

    async fn get_favorites(&self) -> Result<Vec<FavoriteEntry>, Fault> {
        self.preload_calls.fetch_add(1, Ordering::SeqCst);
        if self.favorites_fault {
            return Err(Fault::Http { status: 500 });
        }
        Ok(vec![FavoriteEntry {
            name: "Get User".to_string(),
            path: "core.user.get".to_string(),
        }])
    }

    async fn add_favorite(&self, _name: &str, _path: &str) -> Result<(), Fault> {
        Ok(())
    }

    async fn remove_favorite(&self, _path: &str) -> Result<(), Fault> {
        Ok(())
    }

    async fn execute_endpoint(
        &self,
        _path: &str,
        _parameters: &[(String, String)],
        _files: &[FileRow],
    ) -> Result<ExecutionReport, Fault> {
        Err(Fault::Application("not under test".to_string()))
    }

    async fn get_paginated_endpoints(
        &self,
        _app: &str,
        _category: &str,
        _page: usize,
        _query: &str,
    ) -> Result<PageResponse, Fault> {
        Err(Fault::Application("not under test".to_string()))
    }

    async fn get_endpoint_schema(&self, _path: &str) -> Result<Value, Fault> {
        Err(Fault::Application("not under test".to_string()))
    }

    async fn track_login(&self) -> Result<(), Fault> {
        self.track_login_calls.fetch_add(1, Ordering::SeqCst);
        if self.track_login_fault {
            return Err(Fault::Http { status: 500 });
        }
        Ok(())
    }

    async fn track_logout(&self) -> Result<(), Fault> {
        Ok(())
    }

    async fn logout(&self) -> Result<(), Fault> {
        Ok(())
    }

    async fn clear_scan_cache(&self) -> Result<(), Fault> {
        Ok(())
    }
}

#[derive(Default)]
struct RecordingObserver {
    reports: Mutex<Vec<StageReport>>,
    redirects: AtomicUsize,
}

impl RecordingObserver {
    fn reports(&self) -> Vec<StageReport> {
        self.reports.lock().unwrap().clone()
    }

    fn redirects(&self) -> usize {
        self.redirects.load(Ordering::SeqCst)
    }
}

impl BootstrapObserver for RecordingObserver {
    fn stage_report(&self, report: StageReport) {
        self.reports.lock().unwrap().push(report);
    }

    fn schedule_login_redirect(&self) {
        self.redirects.fetch_add(1, Ordering::SeqCst);
    }
}

fn make_pipeline(client: StubClient) -> (BootstrapPipeline, Arc<StubClient>) {
    let client = Arc::new(client);
    let pipeline = BootstrapPipeline::with_options(
        client.clone(),
        BootstrapOptions {
            stage_delay: Duration::ZERO,
        },
    );
    (pipeline, client)
}

/// Every visible snapshot holds the invariant: at most one stage is
/// `Processing` and it is the lowest-index non-terminal stage.
fn assert_snapshot_invariant(reports: &[StageReport]) {
    for report in reports.iter().filter(|report| !report.hide_steps) {
        let processing: Vec<usize> = report
            .stages
            .iter()
            .enumerate()
            .filter(|(_, stage)| stage.status == StageStatus::Processing)
            .map(|(index, _)| index)
            .collect();
        assert!(processing.len() <= 1, "more than one processing stage");
        if let Some(&index) = processing.first() {
            for (i, stage) in report.stages.iter().enumerate() {
                if i < index {
                    assert_eq!(stage.status, StageStatus::Completed);
                } else if i > index {
                    assert_eq!(stage.status, StageStatus::Pending);
                }
            }
        }
    }
}

#[tokio::test]
async fn successful_run_aggregates_and_reports_in_order() {
    let (pipeline, _client) = make_pipeline(StubClient::authorized());
    let observer = RecordingObserver::default();

    let result = pipeline.run(&observer).await.expect("no fatal fault");
    assert!(result.success);
    let data = result.data.expect("bootstrap data");
    assert!(data.user_context.authenticated);
    assert_eq!(data.favorites.len(), 1);
    assert!(data.catalog.category("core", "doctype").is_some());

    let reports = observer.reports();
    assert_snapshot_invariant(&reports);
    assert!(reports.first().unwrap().stages.iter().all(|stage| stage.status == StageStatus::Pending));
    assert!(reports
        .last()
        .unwrap()
        .stages
        .iter()
        .all(|stage| stage.status == StageStatus::Completed));
    assert_eq!(observer.redirects(), 0);
}

#[tokio::test]
async fn unauthenticated_schedules_exactly_one_redirect() {
    let (pipeline, client) = make_pipeline(StubClient {
        authenticated: false,
        api_access: false,
        ..StubClient::default()
    });
    let observer = RecordingObserver::default();

    let result = pipeline.run(&observer).await.expect("classified, not fatal");
    assert!(!result.success);
    assert_eq!(result.error_type, Some(BootstrapErrorType::AuthFailed));
    assert!(result.hide_steps);
    assert_eq!(observer.redirects(), 1);

    // The stage UI is suppressed and nothing after auth ran.
    assert!(observer.reports().last().unwrap().hide_steps);
    assert_eq!(client.scan_calls.load(Ordering::SeqCst), 0);
    assert_eq!(client.preload_calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn transport_fault_during_auth_is_classified_as_auth_failure() {
    let (pipeline, _client) = make_pipeline(StubClient {
        user_context_fault: true,
        ..StubClient::default()
    });
    let observer = RecordingObserver::default();

    let result = pipeline.run(&observer).await.expect("classified, not fatal");
    assert_eq!(result.error_type, Some(BootstrapErrorType::AuthFailed));
    assert_eq!(observer.redirects(), 1);
}

#[tokio::test]
async fn access_denied_aborts_with_the_server_reason() {
    let (pipeline, client) = make_pipeline(StubClient {
        authenticated: true,
        api_access: false,
        denial_reason: Some("Required roles: System Manager".to_string()),
        ..StubClient::default()
    });
    let observer = RecordingObserver::default();

    let result = pipeline.run(&observer).await.expect("classified, not fatal");
    assert!(!result.success);
    assert_eq!(result.error_type, Some(BootstrapErrorType::AccessDenied));
    assert!(result.hide_steps);
    assert_eq!(
        result.error.as_deref(),
        Some("Required roles: System Manager")
    );
    assert_eq!(observer.redirects(), 0);
    assert_eq!(client.scan_calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn settings_fault_falls_back_to_defaults() {
    let (pipeline, _client) = make_pipeline(StubClient {
        settings_fault: true,
        ..StubClient::authorized()
    });
    let observer = RecordingObserver::default();

    let result = pipeline.run(&observer).await.expect("no fatal fault");
    assert!(result.success);
    assert_eq!(result.data.unwrap().settings, Settings::default());
}

#[tokio::test]
async fn scan_fault_yields_an_empty_catalog() {
    let (pipeline, _client) = make_pipeline(StubClient {
        scan_fault: true,
        ..StubClient::authorized()
    });
    let observer = RecordingObserver::default();

    let result = pipeline.run(&observer).await.expect("no fatal fault");
    assert!(result.success);
    assert!(result.data.unwrap().catalog.is_empty());
}

#[tokio::test]
async fn favorites_fault_yields_an_empty_set() {
    let (pipeline, _client) = make_pipeline(StubClient {
        favorites_fault: true,
        ..StubClient::authorized()
    });
    let observer = RecordingObserver::default();

    let result = pipeline.run(&observer).await.expect("no fatal fault");
    assert!(result.data.unwrap().favorites.is_empty());
}

#[tokio::test]
async fn login_tracking_follows_the_history_setting_and_ignores_faults() {
    let (pipeline, client) = make_pipeline(StubClient {
        settings: Settings {
            maintain_user_history: true,
            ..Settings::default()
        },
        track_login_fault: true,
        ..StubClient::authorized()
    });
    let observer = RecordingObserver::default();

    let result = pipeline.run(&observer).await.expect("no fatal fault");
    assert!(result.success);
    assert_eq!(client.track_login_calls.load(Ordering::SeqCst), 1);

    let (pipeline, client) = make_pipeline(StubClient::authorized());
    let observer = RecordingObserver::default();
    pipeline.run(&observer).await.expect("no fatal fault");
    assert_eq!(client.track_login_calls.load(Ordering::SeqCst), 0);
}
