//! Concurrency-safe keyed roster of employee states.
//!
//! The map itself sits behind an `RwLock` that is only held long enough
//! to find or insert an entry; each employee's state has its own `Mutex`,
//! so at most one mutation is in flight per employee while different
//! employees proceed concurrently. Bulk operations lock one employee at a
//! time, never the whole roster.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, RwLock};

use crate::state::EmployeeState;

type Entry = Arc<Mutex<EmployeeState>>;

/// Shared, per-key-locked collection of [`EmployeeState`].
#[derive(Debug, Default)]
pub struct EmployeeStore {
    inner: RwLock<HashMap<String, Entry>>,
}

impl EmployeeStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a store from a loaded snapshot.
    pub fn from_states(states: HashMap<String, EmployeeState>) -> Self {
        let inner = states
            .into_iter()
            .map(|(id, state)| (id, Arc::new(Mutex::new(state))))
            .collect();
        Self {
            inner: RwLock::new(inner),
        }
    }

    /// Entry for `id`, created lazily with `display_name` on first sight.
    pub fn entry(&self, id: &str, display_name: &str) -> Entry {
        if let Some(entry) = self.inner.read().unwrap().get(id) {
            return Arc::clone(entry);
        }
        let mut map = self.inner.write().unwrap();
        Arc::clone(
            map.entry(id.to_string())
                .or_insert_with(|| Arc::new(Mutex::new(EmployeeState::new(display_name)))),
        )
    }

    /// Entry for `id`, if the employee has been seen before.
    pub fn get(&self, id: &str) -> Option<Entry> {
        self.inner.read().unwrap().get(id).map(Arc::clone)
    }

    /// Known employee ids, sorted for deterministic iteration.
    pub fn ids(&self) -> Vec<String> {
        let mut ids: Vec<String> = self.inner.read().unwrap().keys().cloned().collect();
        ids.sort_unstable();
        ids
    }

    pub fn len(&self) -> usize {
        self.inner.read().unwrap().len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.read().unwrap().len() == 0
    }

    /// Clone every state, taking each employee's lock individually.
    ///
    /// The roster lock is released before any state lock is taken, so a
    /// snapshot never blocks a concurrent self-service action for longer
    /// than one employee's clone.
    pub fn snapshot(&self) -> Vec<(String, EmployeeState)> {
        let entries: Vec<(String, Entry)> = {
            let map = self.inner.read().unwrap();
            let mut entries: Vec<_> = map
                .iter()
                .map(|(id, entry)| (id.clone(), Arc::clone(entry)))
                .collect();
            entries.sort_unstable_by(|a, b| a.0.cmp(&b.0));
            entries
        };
        entries
            .into_iter()
            .map(|(id, entry)| {
                let state = entry.lock().unwrap().clone();
                (id, state)
            })
            .collect()
    }
}
