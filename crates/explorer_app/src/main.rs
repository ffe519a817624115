mod platform;

use platform::AppConfig;

fn main() -> anyhow::Result<()> {
    let base_url = std::env::args()
        .nth(1)
        .or_else(|| std::env::var("EXPLORER_BASE_URL").ok())
        .unwrap_or_else(|| "http://localhost:8000".to_string());
    let prefs_dir = std::env::current_dir().unwrap_or_else(|_| std::path::PathBuf::from("."));

    platform::run_app(AppConfig {
        base_url,
        prefs_dir,
    })
}
