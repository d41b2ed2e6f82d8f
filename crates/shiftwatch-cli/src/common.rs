//! Shared plumbing for the CLI commands: engine construction from the
//! on-disk roster and policy, best-effort persistence, JSON output.

use std::error::Error;
use std::path::PathBuf;

use serde::Serialize;
use tracing::warn;

use shiftwatch_core::{
    storage, AttendanceEngine, EmployeeStore, LogNotifier, RosterDb, WorkPolicy,
};

pub fn policy_path() -> Result<PathBuf, Box<dyn Error>> {
    Ok(storage::data_dir()?.join("policy.toml"))
}

pub fn load_policy() -> Result<WorkPolicy, Box<dyn Error>> {
    Ok(WorkPolicy::load(&policy_path()?)?)
}

/// Build the engine over the persisted roster.
pub fn open_engine() -> Result<(AttendanceEngine, RosterDb), Box<dyn Error>> {
    let policy = load_policy()?;
    let db = RosterDb::open()?;
    let store = EmployeeStore::from_states(db.load_all()?);
    let mut engine = AttendanceEngine::with_store(policy, store);
    engine.add_notifier(Box::new(LogNotifier));
    Ok((engine, db))
}

/// Save the roster snapshot. Best-effort: the transition already
/// succeeded, so a failed save is logged, not returned.
pub fn persist(engine: &AttendanceEngine, db: &RosterDb) {
    if let Err(err) = db.save_all(&engine.store().snapshot()) {
        warn!(%err, "roster save failed; state kept in memory only");
    }
}

pub fn print_json<T: Serialize>(value: &T) -> Result<(), Box<dyn Error>> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
