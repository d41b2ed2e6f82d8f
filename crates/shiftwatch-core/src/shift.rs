//! Shift state machine.
//!
//! `OFF_SHIFT -> ON_SHIFT -> OFF_SHIFT`, with breaks as a sub-state of
//! `ON_SHIFT` (see the break machine). Legality is validated before any
//! field is touched, so a rejected transition leaves the state untouched.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::TransitionError;
use crate::policy::WorkPolicy;
use crate::rules;
use crate::rules::Violation;
use crate::state::EmployeeState;

/// Summary returned by `end_shift`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ShiftSummary {
    pub started_at: DateTime<Utc>,
    pub ended_at: DateTime<Utc>,
    /// Elapsed shift seconds, start to end.
    pub total_secs: i64,
    /// Accumulated break seconds across all kinds.
    pub break_secs: i64,
    /// Net worked seconds: elapsed minus breaks.
    pub net_secs: i64,
}

/// Informational record for a forced shift closure.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClosureRecord {
    pub employee_name: String,
    pub closed_at: DateTime<Utc>,
    pub shift_started_at: Option<DateTime<Utc>>,
    /// The break kind that was still open and got folded into the
    /// accumulators at closure time, if any.
    pub open_break_folded: Option<String>,
}

/// Open a shift.
///
/// Resets the per-kind break accumulators for every configured kind,
/// discarding prior-shift accumulation, and runs the arrival check.
pub fn start_shift(
    state: &mut EmployeeState,
    policy: &WorkPolicy,
    now: DateTime<Utc>,
) -> Result<Vec<Violation>, TransitionError> {
    if state.is_working {
        return Err(TransitionError::AlreadyWorking);
    }

    state.is_working = true;
    state.shift_start = Some(now);
    state.shift_end = None;
    state.active_break = None;
    state.break_started_at = None;
    state.zero_break_accumulators(policy);

    debug!(employee = %state.display_name, at = %now, "shift started");
    Ok(rules::check_arrival(&state.display_name, policy, now)
        .into_iter()
        .collect())
}

/// Close a shift.
///
/// Fails with `BreakInProgress` while a break is open; there is no
/// implicit close. Runs the departure check and returns the summary.
pub fn end_shift(
    state: &mut EmployeeState,
    policy: &WorkPolicy,
    now: DateTime<Utc>,
) -> Result<(ShiftSummary, Vec<Violation>), TransitionError> {
    if !state.is_working {
        return Err(TransitionError::NotWorking);
    }
    if let Some(kind) = &state.active_break {
        return Err(TransitionError::BreakInProgress {
            break_kind: kind.clone(),
        });
    }
    let started_at = state.shift_start.ok_or(TransitionError::NotWorking)?;

    state.is_working = false;
    state.shift_end = Some(now);

    let summary = summarize(state, started_at, now);
    debug!(
        employee = %state.display_name,
        net_secs = summary.net_secs,
        "shift ended"
    );
    Ok((
        summary,
        rules::check_departure(&state.display_name, policy, now)
            .into_iter()
            .collect(),
    ))
}

/// Force-close a shift, the one path allowed to bypass `BreakInProgress`.
///
/// An open break is folded into the accumulators up to the closure
/// instant before the pair is cleared, so the break invariants hold
/// afterwards. Emits no arrival/departure violation. Returns `None` when
/// the employee is not working.
pub fn force_close(state: &mut EmployeeState, now: DateTime<Utc>) -> Option<ClosureRecord> {
    if !state.is_working {
        return None;
    }

    let open_break_folded = state.active_break.take();
    if let (Some(kind), Some(started)) = (&open_break_folded, state.break_started_at.take()) {
        let elapsed = (now - started).num_seconds().max(0);
        *state.break_secs.entry(kind.clone()).or_insert(0) += elapsed;
    }
    state.is_working = false;
    state.shift_end = Some(now);

    debug!(employee = %state.display_name, "shift force-closed");
    Some(ClosureRecord {
        employee_name: state.display_name.clone(),
        closed_at: now,
        shift_started_at: state.shift_start,
        open_break_folded,
    })
}

fn summarize(state: &EmployeeState, started_at: DateTime<Utc>, ended_at: DateTime<Utc>) -> ShiftSummary {
    let total_secs = (ended_at - started_at).num_seconds().max(0);
    let break_secs = state.total_break_secs();
    ShiftSummary {
        started_at,
        ended_at,
        total_secs,
        break_secs,
        net_secs: total_secs - break_secs,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn policy_utc() -> WorkPolicy {
        WorkPolicy {
            tz_offset_minutes: 0,
            ..WorkPolicy::default()
        }
    }

    fn at(h: u32, m: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, 4, h, m, 0).unwrap()
    }

    #[test]
    fn start_twice_is_rejected() {
        let policy = policy_utc();
        let mut state = EmployeeState::new("Linh");
        start_shift(&mut state, &policy, at(8, 0)).unwrap();
        assert_eq!(
            start_shift(&mut state, &policy, at(8, 5)),
            Err(TransitionError::AlreadyWorking)
        );
        // First start is untouched.
        assert_eq!(state.shift_start, Some(at(8, 0)));
    }

    #[test]
    fn start_discards_prior_shift_accumulation() {
        let policy = policy_utc();
        let mut state = EmployeeState::new("Linh");
        state.break_secs.insert("ve_sinh".to_string(), 900);
        state.break_counts.insert("ve_sinh".to_string(), 3);
        state.shift_end = Some(at(17, 0));

        start_shift(&mut state, &policy, at(8, 0)).unwrap();
        assert_eq!(state.break_secs.get("ve_sinh"), Some(&0));
        assert_eq!(state.break_counts.get("ve_sinh"), Some(&0));
        assert!(state.shift_end.is_none());
        assert!(state.invariants_hold());
    }

    #[test]
    fn end_without_start_is_rejected() {
        let policy = policy_utc();
        let mut state = EmployeeState::new("Linh");
        assert_eq!(
            end_shift(&mut state, &policy, at(17, 0)),
            Err(TransitionError::NotWorking)
        );
    }

    #[test]
    fn end_with_open_break_is_rejected_without_mutation() {
        let policy = policy_utc();
        let mut state = EmployeeState::new("Linh");
        start_shift(&mut state, &policy, at(8, 0)).unwrap();
        state.active_break = Some("an_com".to_string());
        state.break_started_at = Some(at(12, 0));

        let err = end_shift(&mut state, &policy, at(17, 0)).unwrap_err();
        assert_eq!(
            err,
            TransitionError::BreakInProgress {
                break_kind: "an_com".to_string()
            }
        );
        assert!(state.is_working);
        assert!(state.shift_end.is_none());
    }

    #[test]
    fn summary_subtracts_breaks() {
        let policy = policy_utc();
        let mut state = EmployeeState::new("Linh");
        start_shift(&mut state, &policy, at(8, 0)).unwrap();
        state.break_secs.insert("an_com".to_string(), 30 * 60);

        let (summary, violations) = end_shift(&mut state, &policy, at(17, 0)).unwrap();
        assert_eq!(summary.total_secs, 9 * 3600);
        assert_eq!(summary.break_secs, 30 * 60);
        assert_eq!(summary.net_secs, 9 * 3600 - 30 * 60);
        assert!(violations.is_empty()); // on-time departure
    }

    #[test]
    fn force_close_folds_open_break() {
        let policy = policy_utc();
        let mut state = EmployeeState::new("Linh");
        start_shift(&mut state, &policy, at(8, 0)).unwrap();
        state.active_break = Some("hut_thuoc".to_string());
        state.break_started_at = Some(at(10, 0));

        let record = force_close(&mut state, at(10, 20)).unwrap();
        assert_eq!(record.open_break_folded.as_deref(), Some("hut_thuoc"));
        assert_eq!(state.break_secs.get("hut_thuoc"), Some(&(20 * 60)));
        assert!(!state.is_working);
        assert!(state.active_break.is_none());
        assert!(state.invariants_hold());
    }

    #[test]
    fn force_close_off_shift_is_a_noop() {
        let mut state = EmployeeState::new("Linh");
        assert!(force_close(&mut state, at(1, 0)).is_none());
        assert_eq!(state, EmployeeState::new("Linh"));
    }
}
