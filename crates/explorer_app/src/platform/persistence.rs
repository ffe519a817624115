use std::fs;
use std::io::Write;
use std::path::Path;

use gateway_logging::{gateway_error, gateway_warn};
use serde::{Deserialize, Serialize};
use tempfile::NamedTempFile;

const PREFS_FILENAME: &str = ".explorer_prefs.ron";

/// Durable client preferences. Currently a single display flag, read once
/// at startup and rewritten on every toggle.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
struct PersistedPrefs {
    dark_mode: bool,
}

pub(crate) fn load_display_mode(dir: &Path) -> bool {
    let path = dir.join(PREFS_FILENAME);
    let content = match fs::read_to_string(&path) {
        Ok(text) => text,
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
            return false;
        }
        Err(err) => {
            gateway_warn!("Failed to read prefs from {:?}: {}", path, err);
            return false;
        }
    };

    match ron::from_str::<PersistedPrefs>(&content) {
        Ok(prefs) => prefs.dark_mode,
        Err(err) => {
            gateway_warn!("Failed to parse prefs from {:?}: {}", path, err);
            false
        }
    }
}

pub(crate) fn save_display_mode(dir: &Path, dark_mode: bool) {
    let prefs = PersistedPrefs { dark_mode };
    let pretty = ron::ser::PrettyConfig::new();
    let content = match ron::ser::to_string_pretty(&prefs, pretty) {
        Ok(text) => text,
        Err(err) => {
            gateway_error!("Failed to serialize prefs: {}", err);
            return;
        }
    };

    if let Err(err) = write_atomic(dir, PREFS_FILENAME, &content) {
        gateway_error!("Failed to write prefs to {:?}: {}", dir, err);
    }
}

/// Write content to `{dir}/{filename}` via a temp file plus rename so a
/// crash mid-write never leaves a truncated prefs file.
fn write_atomic(dir: &Path, filename: &str, content: &str) -> std::io::Result<()> {
    fs::create_dir_all(dir)?;
    let target = dir.join(filename);
    let mut tmp = NamedTempFile::new_in(dir)?;
    tmp.write_all(content.as_bytes())?;
    tmp.flush()?;
    tmp.as_file_mut().sync_all()?;

    if target.exists() {
        fs::remove_file(&target)?;
    }
    tmp.persist(&target).map_err(|err| err.error)?;
    Ok(())
}
