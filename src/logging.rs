use std::fs::OpenOptions;
use std::path::PathBuf;
use std::sync::Mutex;

use tracing_subscriber::EnvFilter;

const LOG_LEVEL_ENV: &str = "KAPACTL_LOG";
const LOG_FILE_ENV: &str = "KAPACTL_LOG_FILE";

fn log_path() -> Option<PathBuf> {
    if let Ok(path) = std::env::var(LOG_FILE_ENV) {
        if !path.trim().is_empty() {
            return Some(PathBuf::from(path));
        }
    }
    dirs::data_local_dir().map(|dir| dir.join("kapactl").join("kapactl.log"))
}

/// Send tracing output to a log file; the terminal belongs to the UI.
///
/// Logging stays off when no file can be opened.
pub fn init() {
    let Some(path) = log_path() else {
        return;
    };
    if let Some(parent) = path.parent() {
        if std::fs::create_dir_all(parent).is_err() {
            return;
        }
    }
    let Ok(file) = OpenOptions::new().create(true).append(true).open(&path) else {
        return;
    };

    let filter = EnvFilter::try_from_env(LOG_LEVEL_ENV).unwrap_or_else(|_| EnvFilter::new("info"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .try_init();
}
