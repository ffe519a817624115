use std::path::PathBuf;
use std::sync::{mpsc, Arc};
use std::thread;
use std::time::Duration;

use gateway_logging::{gateway_error, gateway_info, gateway_warn};

use explorer_core::{update, ConsoleViewModel, Msg, StageStatus, ViewState};
use explorer_gateway::{
    BootstrapOptions, ClientHandle, CredentialContext, GatewayConfig, RemoteApiGateway,
};

use super::effects::{EffectRunner, ShellSignal};
use super::logging::{self, LogDestination};
use super::persistence;

pub struct AppConfig {
    pub base_url: String,
    /// Directory holding the durable client preferences file.
    pub prefs_dir: PathBuf,
}

/// Headless shell: runs the bootstrap against the configured platform and
/// drives the state machine until the session settles. Rendering is a
/// collaborator this binary replaces with log lines.
pub fn run_app(config: AppConfig) -> anyhow::Result<()> {
    logging::initialize(LogDestination::Both);

    let credentials = CredentialContext {
        page_token: None,
        process_token: std::env::var("EXPLORER_CSRF_TOKEN").ok(),
        host_token: std::env::var("PLATFORM_CSRF_TOKEN").ok(),
    };
    let gateway = RemoteApiGateway::new(
        GatewayConfig {
            base_url: config.base_url.clone(),
            ..GatewayConfig::default()
        },
        credentials,
    )
    .map_err(|fault| anyhow::anyhow!("gateway setup failed: {fault}"))?;
    let handle = ClientHandle::new(Arc::new(gateway), BootstrapOptions::default());

    let (msg_tx, msg_rx) = mpsc::channel::<Msg>();
    let (signal_tx, signal_rx) = mpsc::channel::<ShellSignal>();
    let runner = EffectRunner::new(handle, config.prefs_dir.clone(), msg_tx.clone(), signal_tx);

    let dark_mode = persistence::load_display_mode(&config.prefs_dir);
    let _ = msg_tx.send(Msg::DisplayModeRestored(dark_mode));

    gateway_info!("starting bootstrap against {}", config.base_url);
    runner.submit_bootstrap();

    let mut state = ViewState::new();
    loop {
        let mut drained = false;
        while let Ok(msg) = msg_rx.try_recv() {
            drained = true;
            let (next, effects) = update(std::mem::take(&mut state), msg);
            state = next;
            runner.run(effects);
        }

        if state.consume_dirty() {
            render_log(&state.view());
        }

        match signal_rx.try_recv() {
            Ok(ShellSignal::RedirectToLogin) => {
                gateway_warn!("redirecting to {}/login", config.base_url);
                break;
            }
            Ok(ShellSignal::SessionEnded) => {
                gateway_info!("session ended");
                break;
            }
            Err(mpsc::TryRecvError::Empty) => {}
            Err(mpsc::TryRecvError::Disconnected) => break,
        }

        let view = state.view();
        if !view.loading {
            if view.access_denied {
                gateway_error!("access denied: {}", view.access_denied_reason);
            }
            break;
        }

        if !drained {
            thread::sleep(Duration::from_millis(20));
        }
    }

    Ok(())
}

fn render_log(view: &ConsoleViewModel) {
    if let Some(stage) = view
        .stages
        .iter()
        .find(|stage| stage.status == StageStatus::Processing)
    {
        gateway_info!("bootstrap: {}", stage.label);
    }
    if !view.loading && !view.access_denied {
        let endpoints: usize = view.apps.iter().map(|app| app.total).sum();
        gateway_info!(
            "{}: {} apps, {} endpoints, dark mode {}",
            view.page_title,
            view.apps.len(),
            endpoints,
            if view.dark_mode { "on" } else { "off" }
        );
    }
}
