//! SQLite-backed roster persistence.
//!
//! One row per employee id, the state serialized as JSON. Saving is a
//! best-effort periodic operation layered outside the engine: a
//! transition succeeds before any save is attempted, and a failed save
//! never rolls a transition back.

use std::collections::HashMap;
use std::path::Path;

use rusqlite::{params, Connection};
use tracing::info;

use super::data_dir;
use crate::error::StorageError;
use crate::state::EmployeeState;

/// SQLite store for the employee roster.
pub struct RosterDb {
    conn: Connection,
}

impl RosterDb {
    /// Open the database at `<data_dir>/roster.db`.
    ///
    /// Creates the file and schema if they don't exist.
    pub fn open() -> Result<Self, StorageError> {
        let path = data_dir()?.join("roster.db");
        Self::open_at(&path)
    }

    /// Open the database at an explicit path.
    pub fn open_at(path: &Path) -> Result<Self, StorageError> {
        let conn = Connection::open(path).map_err(|source| StorageError::OpenFailed {
            path: path.to_path_buf(),
            source,
        })?;
        let db = Self { conn };
        db.migrate()?;
        Ok(db)
    }

    /// Open an in-memory database (for tests).
    pub fn open_memory() -> Result<Self, StorageError> {
        let conn = Connection::open_in_memory().map_err(|source| StorageError::OpenFailed {
            path: ":memory:".into(),
            source,
        })?;
        let db = Self { conn };
        db.migrate()?;
        Ok(db)
    }

    fn migrate(&self) -> Result<(), StorageError> {
        self.conn
            .execute_batch(
                "CREATE TABLE IF NOT EXISTS roster (
                    id         TEXT PRIMARY KEY,
                    state      TEXT NOT NULL,
                    updated_at TEXT NOT NULL
                );",
            )
            .map_err(|e| StorageError::MigrationFailed(e.to_string()))
    }

    /// Upsert one employee's state.
    pub fn save(&self, id: &str, state: &EmployeeState) -> Result<(), StorageError> {
        let json = serde_json::to_string(state).map_err(|e| StorageError::DecodeFailed {
            id: id.to_string(),
            message: e.to_string(),
        })?;
        self.conn.execute(
            "INSERT INTO roster (id, state, updated_at) VALUES (?1, ?2, ?3)
             ON CONFLICT(id) DO UPDATE SET state = ?2, updated_at = ?3",
            params![id, json, chrono::Utc::now().to_rfc3339()],
        )?;
        Ok(())
    }

    /// Upsert a whole snapshot.
    pub fn save_all(&self, snapshot: &[(String, EmployeeState)]) -> Result<(), StorageError> {
        for (id, state) in snapshot {
            self.save(id, state)?;
        }
        info!(count = snapshot.len(), "roster saved");
        Ok(())
    }

    /// Load every stored state.
    pub fn load_all(&self) -> Result<HashMap<String, EmployeeState>, StorageError> {
        let mut stmt = self.conn.prepare("SELECT id, state FROM roster")?;
        let rows = stmt.query_map([], |row| {
            let id: String = row.get(0)?;
            let json: String = row.get(1)?;
            Ok((id, json))
        })?;

        let mut states = HashMap::new();
        for row in rows {
            let (id, json) = row?;
            let state: EmployeeState =
                serde_json::from_str(&json).map_err(|e| StorageError::DecodeFailed {
                    id: id.clone(),
                    message: e.to_string(),
                })?;
            states.insert(id, state);
        }
        Ok(states)
    }

    /// Remove every stored state.
    pub fn clear(&self) -> Result<(), StorageError> {
        self.conn.execute("DELETE FROM roster", [])?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use chrono::Utc;

    fn sample_state() -> EmployeeState {
        let mut state = EmployeeState::new("Linh");
        state.is_working = true;
        state.shift_start = Some(Utc.with_ymd_and_hms(2024, 3, 4, 1, 0, 0).unwrap());
        state.active_break = Some("an_com".to_string());
        state.break_started_at = Some(Utc.with_ymd_and_hms(2024, 3, 4, 5, 0, 0).unwrap());
        state.break_secs.insert("ve_sinh".to_string(), 300);
        state.break_counts.insert("ve_sinh".to_string(), 1);
        state.break_counts.insert("an_com".to_string(), 1);
        state
    }

    #[test]
    fn save_load_round_trip() {
        let db = RosterDb::open_memory().unwrap();
        let state = sample_state();
        db.save("u1", &state).unwrap();
        let loaded = db.load_all().unwrap();
        assert_eq!(loaded.len(), 1);
        assert_eq!(loaded.get("u1"), Some(&state));
    }

    #[test]
    fn save_is_an_upsert() {
        let db = RosterDb::open_memory().unwrap();
        let mut state = sample_state();
        db.save("u1", &state).unwrap();
        state.break_secs.insert("ve_sinh".to_string(), 900);
        db.save("u1", &state).unwrap();
        let loaded = db.load_all().unwrap();
        assert_eq!(loaded.get("u1").unwrap().break_secs.get("ve_sinh"), Some(&900));
    }

    #[test]
    fn clear_empties_the_roster() {
        let db = RosterDb::open_memory().unwrap();
        db.save("u1", &sample_state()).unwrap();
        db.clear().unwrap();
        assert!(db.load_all().unwrap().is_empty());
    }

    #[test]
    fn open_at_persists_across_connections() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("roster.db");
        {
            let db = RosterDb::open_at(&path).unwrap();
            db.save("u1", &sample_state()).unwrap();
        }
        let db = RosterDb::open_at(&path).unwrap();
        assert_eq!(db.load_all().unwrap().len(), 1);
    }
}
