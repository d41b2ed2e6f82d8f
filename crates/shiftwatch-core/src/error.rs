//! Core error types for shiftwatch-core.
//!
//! Rejected transitions are ordinary, recoverable outcomes and carry a
//! specific reason code; configuration gaps are surfaced immediately
//! instead of being defaulted away.

use std::path::PathBuf;
use thiserror::Error;

/// Core error type for shiftwatch-core.
#[derive(Error, Debug)]
pub enum CoreError {
    /// An action was attempted from a state that forbids it.
    #[error("Invalid transition: {0}")]
    Transition(#[from] TransitionError),

    /// Policy configuration errors
    #[error("Policy error: {0}")]
    Policy(#[from] PolicyError),

    /// Storage-related errors
    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// A rejected state transition. Never corrupts state: the machines
/// validate before mutating, so a failed action leaves the employee
/// exactly as it found them.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TransitionError {
    /// `start_shift` while a shift is already open.
    #[error("shift already started")]
    AlreadyWorking,

    /// Shift or break action outside an open shift.
    #[error("no shift in progress")]
    NotWorking,

    /// `end_shift` while a break is still open.
    #[error("break '{break_kind}' must be ended before the shift")]
    BreakInProgress { break_kind: String },

    /// `start_break` while another break is open.
    #[error("break '{break_kind}' is already in progress")]
    BreakAlreadyActive { break_kind: String },

    /// `end_break` with no break open.
    #[error("no break in progress")]
    NoActiveBreak,

    /// `start_break` refused outright in `RefuseOverLimit` mode.
    #[error("break '{break_kind}' refused: {allowed} per shift already used")]
    BreakLimitReached { break_kind: String, allowed: u32 },
}

/// Policy configuration errors.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PolicyError {
    /// A break kind with no configured duration/frequency allowance.
    #[error("break kind '{kind}' has no configured allowance")]
    UnknownBreakKind { kind: String },
}

/// Storage-specific errors.
#[derive(Error, Debug)]
pub enum StorageError {
    /// Failed to open the roster database.
    #[error("Failed to open roster database at {path}: {source}")]
    OpenFailed {
        path: PathBuf,
        #[source]
        source: rusqlite::Error,
    },

    /// Query execution failed
    #[error("Query failed: {0}")]
    QueryFailed(String),

    /// Migration failed
    #[error("Roster database migration failed: {0}")]
    MigrationFailed(String),

    /// A stored state row could not be decoded.
    #[error("Failed to decode state for '{id}': {message}")]
    DecodeFailed { id: String, message: String },

    /// Data directory could not be resolved or created.
    #[error("Failed to access data directory: {0}")]
    DataDir(String),
}

/// Configuration-specific errors.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Failed to load configuration
    #[error("Failed to load policy from {path}: {message}")]
    LoadFailed { path: PathBuf, message: String },

    /// Failed to save configuration
    #[error("Failed to save policy to {path}: {message}")]
    SaveFailed { path: PathBuf, message: String },

    /// Failed to parse configuration
    #[error("Failed to parse policy: {0}")]
    ParseFailed(String),

    /// Invalid configuration value
    #[error("Invalid policy value for '{key}': {message}")]
    InvalidValue { key: String, message: String },
}

impl From<rusqlite::Error> for StorageError {
    fn from(err: rusqlite::Error) -> Self {
        StorageError::QueryFailed(err.to_string())
    }
}

/// Result type alias for CoreError
pub type Result<T, E = CoreError> = std::result::Result<T, E>;
