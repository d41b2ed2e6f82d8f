//! Aggregation and reporting.
//!
//! Pure derivations over a roster snapshot: no mutation, no I/O.
//! Calendar filters ("today", "this week") are computed against the
//! policy's local clock. Rendering is the caller's concern; everything
//! here is structured data.

use chrono::{DateTime, Datelike, Duration, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::policy::WorkPolicy;
use crate::state::EmployeeState;

/// Where an employee currently stands.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum WorkStatus {
    Working,
    OnBreak { kind: String },
    Finished,
    OffShift,
}

/// Per-employee line in the daily report.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EmployeeDayStats {
    pub employee: String,
    pub status: WorkStatus,
    pub shift_started_at: Option<DateTime<Utc>>,
    /// Net worked seconds: elapsed (to shift end, or `now` while
    /// working) minus accumulated breaks.
    pub worked_secs: i64,
    pub break_secs: i64,
    pub break_counts: HashMap<String, u32>,
    pub break_count_total: u32,
}

/// "Today" report: employees whose shift started on the current
/// calendar date at the site.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TodayReport {
    pub date: NaiveDate,
    pub employees: Vec<EmployeeDayStats>,
}

/// Per-employee line in the weekly report.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeekEntry {
    pub employee: String,
    pub worked_secs: i64,
    pub break_secs: i64,
    /// Still on shift; `worked_secs` is measured against `now`.
    pub ongoing: bool,
}

/// "This week" report: shifts started since the most recent Monday
/// 00:00 at the site.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeekReport {
    pub week_start: NaiveDate,
    pub generated_at: DateTime<Utc>,
    pub employees: Vec<WeekEntry>,
}

/// Whole-roster rollup, independent of any date filter.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct SummaryReport {
    pub employees: usize,
    pub working: usize,
    pub on_break: usize,
    pub break_counts: HashMap<String, u32>,
    pub break_secs: HashMap<String, i64>,
}

fn status_of(state: &EmployeeState) -> WorkStatus {
    if let Some(kind) = &state.active_break {
        WorkStatus::OnBreak { kind: kind.clone() }
    } else if state.is_working {
        WorkStatus::Working
    } else if state.shift_end.is_some() {
        WorkStatus::Finished
    } else {
        WorkStatus::OffShift
    }
}

/// Net worked seconds for a shift: elapsed minus accumulated breaks,
/// measured against `now` while the shift is still open.
fn worked_secs(state: &EmployeeState, now: DateTime<Utc>) -> i64 {
    let Some(start) = state.shift_start else { return 0 };
    let end = if state.is_working {
        now
    } else {
        match state.shift_end {
            Some(end) => end,
            None => return 0,
        }
    };
    ((end - start).num_seconds() - state.total_break_secs()).max(0)
}

/// Daily statistics over the snapshot.
pub fn report_today(
    snapshot: &[(String, EmployeeState)],
    policy: &WorkPolicy,
    now: DateTime<Utc>,
) -> TodayReport {
    let today = policy.local_date(now);
    let employees = snapshot
        .iter()
        .map(|(_, state)| state)
        .filter(|state| {
            state
                .shift_start
                .is_some_and(|start| policy.local_date(start) == today)
        })
        .map(|state| EmployeeDayStats {
            employee: state.display_name.clone(),
            status: status_of(state),
            shift_started_at: state.shift_start,
            worked_secs: worked_secs(state, now),
            break_secs: state.total_break_secs(),
            break_counts: state.break_counts.clone(),
            break_count_total: state.total_break_count(),
        })
        .collect();
    TodayReport {
        date: today,
        employees,
    }
}

/// Weekly statistics over the snapshot.
pub fn report_week(
    snapshot: &[(String, EmployeeState)],
    policy: &WorkPolicy,
    now: DateTime<Utc>,
) -> WeekReport {
    let today = policy.local_date(now);
    let week_start = today - Duration::days(today.weekday().num_days_from_monday() as i64);
    let employees = snapshot
        .iter()
        .map(|(_, state)| state)
        .filter(|state| {
            state
                .shift_start
                .is_some_and(|start| policy.local_date(start) >= week_start)
        })
        .map(|state| WeekEntry {
            employee: state.display_name.clone(),
            worked_secs: worked_secs(state, now),
            break_secs: state.total_break_secs(),
            ongoing: state.is_working,
        })
        .collect();
    WeekReport {
        week_start,
        generated_at: now,
        employees,
    }
}

/// Roster-wide rollup.
pub fn report_summary(snapshot: &[(String, EmployeeState)]) -> SummaryReport {
    let mut report = SummaryReport {
        employees: snapshot.len(),
        ..SummaryReport::default()
    };
    for (_, state) in snapshot {
        if state.is_working {
            report.working += 1;
        }
        if state.active_break.is_some() {
            report.on_break += 1;
        }
        for (kind, count) in &state.break_counts {
            *report.break_counts.entry(kind.clone()).or_insert(0) += count;
        }
        for (kind, secs) in &state.break_secs {
            *report.break_secs.entry(kind.clone()).or_insert(0) += secs;
        }
    }
    report
}
