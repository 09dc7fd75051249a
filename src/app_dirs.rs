use directories::ProjectDirs;
use std::path::PathBuf;

const APP_NAME: &str = "mathdrill";

/// Centralized application directory resolution
pub struct AppDirs;

impl AppDirs {
    fn project() -> Option<ProjectDirs> {
        ProjectDirs::from("", "", APP_NAME)
    }

    pub fn preferences_path() -> PathBuf {
        Self::project()
            .map(|pd| pd.config_dir().join("preferences.json"))
            .unwrap_or_else(|| PathBuf::from("mathdrill_preferences.json"))
    }

    /// Log file under `$HOME/.local/state/mathdrill`, or the platform data dir.
    pub fn log_path() -> PathBuf {
        if let Ok(home) = std::env::var("HOME") {
            return PathBuf::from(home)
                .join(".local")
                .join("state")
                .join(APP_NAME)
                .join("mathdrill.log");
        }
        Self::project()
            .map(|pd| pd.data_local_dir().join("mathdrill.log"))
            .unwrap_or_else(|| PathBuf::from("mathdrill.log"))
    }
}
