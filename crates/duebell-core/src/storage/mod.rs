mod config;
pub mod status_db;

pub use config::{ChatConfig, Config, EmailConfig, SheetConfig, StoreConfig};
pub use status_db::{ReminderStatus, StatusDb, StatusStore};

use std::path::PathBuf;

/// Returns `~/.config/duebell[-dev]/` based on DUEBELL_ENV.
///
/// Set DUEBELL_ENV=dev to use a development data directory.
///
/// # Errors
/// Returns an error if the home directory cannot be determined or if
/// creating the config directory fails.
pub fn data_dir() -> Result<PathBuf, std::io::Error> {
    let base_dir = dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".config");

    let env = std::env::var("DUEBELL_ENV").unwrap_or_else(|_| "production".to_string());

    let dir = if env == "dev" {
        base_dir.join("duebell-dev")
    } else {
        base_dir.join("duebell")
    };

    std::fs::create_dir_all(&dir)?;
    Ok(dir)
}
