use directories::ProjectDirs;
use std::path::PathBuf;

/// Centralized application directory resolution
pub struct AppDirs;

impl AppDirs {
    /// Durable state directory under $HOME/.local/state/vocquiz
    fn state_dir() -> Option<PathBuf> {
        if let Ok(home) = std::env::var("HOME") {
            Some(
                PathBuf::from(home)
                    .join(".local")
                    .join("state")
                    .join("vocquiz"),
            )
        } else {
            ProjectDirs::from("", "", "vocquiz")
                .map(|proj_dirs| proj_dirs.data_local_dir().to_path_buf())
        }
    }

    /// Persisted per-level answer statistics
    pub fn stats_path() -> Option<PathBuf> {
        Self::state_dir().map(|d| d.join("stats.json"))
    }

    /// Persisted mistake log
    pub fn mistakes_path() -> Option<PathBuf> {
        Self::state_dir().map(|d| d.join("mistakes.json"))
    }

    /// Append-only log of finished quiz sessions
    pub fn session_log_path() -> Option<PathBuf> {
        Self::state_dir().map(|d| d.join("sessions.csv"))
    }

    pub fn config_path() -> Option<PathBuf> {
        ProjectDirs::from("", "", "vocquiz").map(|pd| pd.config_dir().join("config.json"))
    }

    /// Stored backend auth session (token + user)
    pub fn auth_session_path() -> Option<PathBuf> {
        ProjectDirs::from("", "", "vocquiz").map(|pd| pd.config_dir().join("session.json"))
    }
}
