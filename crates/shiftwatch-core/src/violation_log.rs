//! In-memory violation log.
//!
//! The engine produces violations; this collaborator-side structure
//! keeps them queryable for the daily violation report. It sits outside
//! the engine's mutation path.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::rules::Violation;

/// Violations grouped per employee, in arrival order.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ViolationLog {
    by_employee: HashMap<String, Vec<Violation>>,
}

impl ViolationLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&mut self, violation: Violation) {
        self.by_employee
            .entry(violation.employee_name.clone())
            .or_default()
            .push(violation);
    }

    pub fn record_all(&mut self, violations: impl IntoIterator<Item = Violation>) {
        for violation in violations {
            self.record(violation);
        }
    }

    pub fn len(&self) -> usize {
        self.by_employee.values().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.by_employee.values().all(Vec::is_empty)
    }

    /// All violations, optionally filtered by employee and a `since`
    /// cutoff, sorted by occurrence time.
    pub fn filtered(&self, employee: Option<&str>, since: Option<DateTime<Utc>>) -> Vec<&Violation> {
        let mut out: Vec<&Violation> = self
            .by_employee
            .iter()
            .filter(|(name, _)| employee.is_none_or(|wanted| wanted == name.as_str()))
            .flat_map(|(_, violations)| violations.iter())
            .filter(|v| since.is_none_or(|cutoff| v.occurred_at >= cutoff))
            .collect();
        out.sort_by_key(|v| v.occurred_at);
        out
    }

    /// Per-kind counts for one employee, by kind label.
    pub fn counts_for(&self, employee: &str, since: Option<DateTime<Utc>>) -> HashMap<&'static str, usize> {
        let mut counts = HashMap::new();
        for violation in self.filtered(Some(employee), since) {
            *counts.entry(violation.kind.label()).or_insert(0) += 1;
        }
        counts
    }
}
