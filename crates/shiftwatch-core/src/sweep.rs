//! Periodic scans over the roster.
//!
//! The overtime sweep catches breaks that are still open past their
//! allowance without waiting for the employee to end them; the forced
//! closure sweep closes out every open shift once a day. Triggering is
//! the scheduler collaborator's job.

use chrono::{DateTime, Utc};
use tracing::warn;

use crate::policy::WorkPolicy;
use crate::rules;
use crate::rules::Violation;
use crate::shift::{self, ClosureRecord};
use crate::store::EmployeeStore;

/// Scan for open breaks past their allowance.
///
/// Read-only and repeatable: an over-limit break that stays open is
/// reported on every call. Deduplication, if wanted, belongs to the
/// notifier.
pub fn sweep_overtime(store: &EmployeeStore, policy: &WorkPolicy, now: DateTime<Utc>) -> Vec<Violation> {
    let mut violations = Vec::new();
    for id in store.ids() {
        let Some(entry) = store.get(&id) else { continue };
        let state = entry.lock().unwrap();
        let (Some(kind), Some(started_at)) = (&state.active_break, state.break_started_at) else {
            continue;
        };
        match rules::check_break_overtime(&state.display_name, policy, kind, now - started_at, now) {
            Ok(Some(violation)) => violations.push(violation),
            Ok(None) => {}
            Err(err) => {
                // One employee's stale break kind must not abort the scan.
                warn!(employee = %state.display_name, %err, "overtime sweep skipped employee");
            }
        }
    }
    violations
}

/// Force-close every open shift.
///
/// Takes each employee's lock individually; open breaks are folded in by
/// the closure path and no arrival/departure violation is emitted.
pub fn sweep_force_close(store: &EmployeeStore, now: DateTime<Utc>) -> Vec<ClosureRecord> {
    let mut records = Vec::new();
    for id in store.ids() {
        let Some(entry) = store.get(&id) else { continue };
        let mut state = entry.lock().unwrap();
        if let Some(record) = shift::force_close(&mut state, now) {
            records.push(record);
        }
    }
    records
}
