pub mod roster_db;

pub use roster_db::RosterDb;

use std::path::PathBuf;

use crate::error::StorageError;

/// Returns `~/.config/shiftwatch[-dev]/` based on SHIFTWATCH_ENV.
///
/// SHIFTWATCH_DATA_DIR overrides the location entirely (used by tests
/// and containerized deployments).
///
/// # Errors
/// Returns an error if the directory cannot be created.
pub fn data_dir() -> Result<PathBuf, StorageError> {
    let dir = match std::env::var("SHIFTWATCH_DATA_DIR") {
        Ok(custom) => PathBuf::from(custom),
        Err(_) => {
            let base_dir = dirs::home_dir()
                .unwrap_or_else(|| PathBuf::from("."))
                .join(".config");
            let env = std::env::var("SHIFTWATCH_ENV").unwrap_or_else(|_| "production".to_string());
            if env == "dev" {
                base_dir.join("shiftwatch-dev")
            } else {
                base_dir.join("shiftwatch")
            }
        }
    };
    std::fs::create_dir_all(&dir).map_err(|e| StorageError::DataDir(e.to_string()))?;
    Ok(dir)
}
