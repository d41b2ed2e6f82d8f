//! Per-employee attendance state.
//!
//! One record per employee, keyed by a stable identifier. Created lazily
//! on the first observed action and mutated only by the shift/break
//! machines and the forced-closure sweep.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::policy::WorkPolicy;

/// Attendance state for one employee.
///
/// Invariants:
/// - `active_break` is set iff `break_started_at` is set;
/// - a break can only be open while `is_working`;
/// - `shift_end` is only set after `shift_start`.
///
/// Break durations accumulate as integer seconds per kind; sub-minute
/// precision is discarded only at reporting time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EmployeeState {
    pub display_name: String,
    #[serde(default)]
    pub is_working: bool,
    #[serde(default)]
    pub shift_start: Option<DateTime<Utc>>,
    #[serde(default)]
    pub shift_end: Option<DateTime<Utc>>,
    /// The break currently open, by kind.
    #[serde(default)]
    pub active_break: Option<String>,
    #[serde(default)]
    pub break_started_at: Option<DateTime<Utc>>,
    /// Accumulated break seconds per kind for the current shift.
    #[serde(default)]
    pub break_secs: HashMap<String, i64>,
    /// Number of times each break kind was entered during the current
    /// shift. Counts attempts, including the one that crosses the limit.
    #[serde(default)]
    pub break_counts: HashMap<String, u32>,
}

impl EmployeeState {
    /// Fresh state for a previously-unseen employee.
    pub fn new(display_name: impl Into<String>) -> Self {
        Self {
            display_name: display_name.into(),
            is_working: false,
            shift_start: None,
            shift_end: None,
            active_break: None,
            break_started_at: None,
            break_secs: HashMap::new(),
            break_counts: HashMap::new(),
        }
    }

    /// Restore the empty-state form, keeping the display name.
    pub fn reset(&mut self) {
        let name = std::mem::take(&mut self.display_name);
        *self = Self::new(name);
    }

    /// Zero-fill the per-kind accumulators for every configured break
    /// kind. Called at shift start; prior-shift accumulation is
    /// discarded.
    pub fn zero_break_accumulators(&mut self, policy: &WorkPolicy) {
        self.break_secs = policy.breaks.keys().map(|k| (k.clone(), 0)).collect();
        self.break_counts = policy.breaks.keys().map(|k| (k.clone(), 0)).collect();
    }

    /// Total accumulated break seconds across all kinds.
    pub fn total_break_secs(&self) -> i64 {
        self.break_secs.values().sum()
    }

    /// Total break entries across all kinds.
    pub fn total_break_count(&self) -> u32 {
        self.break_counts.values().sum()
    }

    /// Whether the structural invariants hold. Checked by tests after
    /// every operation.
    pub fn invariants_hold(&self) -> bool {
        if self.active_break.is_some() != self.break_started_at.is_some() {
            return false;
        }
        if self.active_break.is_some() && !self.is_working {
            return false;
        }
        if self.shift_end.is_some() && self.shift_start.is_none() {
            return false;
        }
        true
    }
}
