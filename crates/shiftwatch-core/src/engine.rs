//! Attendance engine.
//!
//! The boundary surface exposed to the front end and the scheduler:
//! per-employee actions, administrator bulk actions, the periodic
//! sweeps, reset, and the read-only reports. All transitions are
//! synchronous and in-memory; persistence and delivery are layered
//! outside.
//!
//! Each employee's state has its own lock (see [`EmployeeStore`]), and
//! notifiers run only after that lock is released, so a slow recipient
//! never extends the mutation's critical section.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::breaks::{self, BreakSummary};
use crate::error::Result;
use crate::notify::ViolationNotifier;
use crate::policy::{FrequencyMode, WorkPolicy};
use crate::report::{self, SummaryReport, TodayReport, WeekReport};
use crate::rules::Violation;
use crate::shift::{self, ClosureRecord, ShiftSummary};
use crate::state::EmployeeState;
use crate::store::EmployeeStore;
use crate::sweep;

/// An inbound employee action.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum EmployeeAction {
    StartShift,
    EndShift,
    StartBreak { kind: String },
    EndBreak,
}

/// Who a bulk operation applies to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ForceTarget {
    One(String),
    All,
}

/// The successful outcome of an applied action.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum TransitionResult {
    ShiftStarted {
        at: DateTime<Utc>,
    },
    ShiftEnded {
        summary: ShiftSummary,
    },
    BreakStarted {
        kind: String,
        count: u32,
        allowed: u32,
    },
    BreakEnded {
        summary: BreakSummary,
    },
}

/// The attendance & violation engine.
///
/// Owns the keyed store and the policy; notifiers are pluggable
/// recipients for the records it produces.
pub struct AttendanceEngine {
    store: EmployeeStore,
    policy: WorkPolicy,
    notifiers: Vec<Box<dyn ViolationNotifier>>,
}

impl AttendanceEngine {
    pub fn new(policy: WorkPolicy) -> Self {
        Self::with_store(policy, EmployeeStore::new())
    }

    /// Build over a previously loaded roster.
    pub fn with_store(policy: WorkPolicy, store: EmployeeStore) -> Self {
        Self {
            store,
            policy,
            notifiers: Vec::new(),
        }
    }

    pub fn add_notifier(&mut self, notifier: Box<dyn ViolationNotifier>) {
        self.notifiers.push(notifier);
    }

    pub fn store(&self) -> &EmployeeStore {
        &self.store
    }

    pub fn policy(&self) -> &WorkPolicy {
        &self.policy
    }

    /// Apply a self-service action to one employee.
    ///
    /// The employee state is created lazily on first sight. Self-service
    /// break starts use `AllowAndFlag`: the break always opens and the
    /// over-limit attempt is flagged. Violations are delivered to the
    /// notifiers after the mutation commits and are also returned.
    pub fn apply_action(
        &self,
        employee_id: &str,
        display_name: &str,
        action: EmployeeAction,
        now: DateTime<Utc>,
    ) -> Result<(TransitionResult, Vec<Violation>)> {
        let entry = self.store.entry(employee_id, display_name);
        let outcome = {
            let mut state = entry.lock().unwrap();
            self.dispatch(&mut state, &action, now, FrequencyMode::AllowAndFlag)
        };
        match outcome {
            Ok((result, violations)) => {
                self.deliver(&violations);
                Ok((result, violations))
            }
            Err(err) => {
                debug!(employee_id, %err, "action rejected");
                Err(err)
            }
        }
    }

    /// Apply an administrator action to one employee or the whole
    /// roster.
    ///
    /// Iteration takes each employee's lock individually; employees for
    /// whom the transition is illegal are skipped and do not count.
    /// Returns the number of affected employees and every violation
    /// produced.
    pub fn force_action(
        &self,
        target: ForceTarget,
        action: EmployeeAction,
        now: DateTime<Utc>,
        mode: FrequencyMode,
    ) -> (usize, Vec<Violation>) {
        let ids = match target {
            ForceTarget::One(id) => vec![id],
            ForceTarget::All => self.store.ids(),
        };

        let mut affected = 0;
        let mut all_violations = Vec::new();
        for id in ids {
            let Some(entry) = self.store.get(&id) else { continue };
            let outcome = {
                let mut state = entry.lock().unwrap();
                self.dispatch(&mut state, &action, now, mode)
            };
            match outcome {
                Ok((_, violations)) => {
                    affected += 1;
                    all_violations.extend(violations);
                }
                Err(err) => {
                    debug!(employee_id = %id, %err, "bulk action skipped employee");
                }
            }
        }
        self.deliver(&all_violations);
        (affected, all_violations)
    }

    /// Scan for open breaks past their allowance (repeatable).
    pub fn sweep_overtime(&self, now: DateTime<Utc>) -> Vec<Violation> {
        let violations = sweep::sweep_overtime(&self.store, &self.policy, now);
        self.deliver(&violations);
        violations
    }

    /// Daily forced closure of every open shift.
    pub fn sweep_force_close(&self, now: DateTime<Utc>) -> Vec<ClosureRecord> {
        self.force_close(ForceTarget::All, now)
    }

    /// Force-close the target's shift, bypassing `BreakInProgress`.
    ///
    /// Always succeeds for every open shift it reaches; employees who
    /// are not working are simply not counted.
    pub fn force_close(&self, target: ForceTarget, now: DateTime<Utc>) -> Vec<ClosureRecord> {
        let records = match target {
            ForceTarget::All => sweep::sweep_force_close(&self.store, now),
            ForceTarget::One(id) => {
                let mut records = Vec::new();
                if let Some(entry) = self.store.get(&id) {
                    let mut state = entry.lock().unwrap();
                    if let Some(record) = shift::force_close(&mut state, now) {
                        records.push(record);
                    }
                }
                records
            }
        };
        for record in &records {
            for notifier in &self.notifiers {
                if let Err(err) = notifier.notify_closure(record) {
                    warn!(notifier = notifier.name(), %err, "closure notification failed");
                }
            }
        }
        records
    }

    /// Reinitialize employee state to its empty form. Returns the
    /// number of states reset.
    pub fn reset(&self, target: ForceTarget) -> usize {
        let ids = match target {
            ForceTarget::One(id) => vec![id],
            ForceTarget::All => self.store.ids(),
        };
        let mut count = 0;
        for id in ids {
            if let Some(entry) = self.store.get(&id) {
                entry.lock().unwrap().reset();
                count += 1;
            }
        }
        count
    }

    pub fn report_today(&self, now: DateTime<Utc>) -> TodayReport {
        report::report_today(&self.store.snapshot(), &self.policy, now)
    }

    pub fn report_week(&self, now: DateTime<Utc>) -> WeekReport {
        report::report_week(&self.store.snapshot(), &self.policy, now)
    }

    pub fn report_summary(&self) -> SummaryReport {
        report::report_summary(&self.store.snapshot())
    }

    fn dispatch(
        &self,
        state: &mut EmployeeState,
        action: &EmployeeAction,
        now: DateTime<Utc>,
        mode: FrequencyMode,
    ) -> Result<(TransitionResult, Vec<Violation>)> {
        match action {
            EmployeeAction::StartShift => {
                let violations = shift::start_shift(state, &self.policy, now)?;
                Ok((TransitionResult::ShiftStarted { at: now }, violations))
            }
            EmployeeAction::EndShift => {
                let (summary, violations) = shift::end_shift(state, &self.policy, now)?;
                Ok((TransitionResult::ShiftEnded { summary }, violations))
            }
            EmployeeAction::StartBreak { kind } => {
                let allowed = self.policy.rule(kind)?.allowed_per_shift;
                let (count, violations) = breaks::start_break(state, &self.policy, kind, now, mode)?;
                Ok((
                    TransitionResult::BreakStarted {
                        kind: kind.clone(),
                        count,
                        allowed,
                    },
                    violations,
                ))
            }
            EmployeeAction::EndBreak => {
                let (summary, violations) = breaks::end_break(state, &self.policy, now)?;
                Ok((TransitionResult::BreakEnded { summary }, violations))
            }
        }
    }

    /// Best-effort delivery, isolated per recipient: one failing
    /// notifier neither aborts the transition nor starves the others.
    fn deliver(&self, violations: &[Violation]) {
        for violation in violations {
            for notifier in &self.notifiers {
                if let Err(err) = notifier.notify_violation(violation) {
                    warn!(notifier = notifier.name(), %err, "violation notification failed");
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{CoreError, TransitionError};
    use chrono::TimeZone;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    fn engine_utc() -> AttendanceEngine {
        AttendanceEngine::new(WorkPolicy {
            tz_offset_minutes: 0,
            ..WorkPolicy::default()
        })
    }

    fn at(h: u32, m: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, 4, h, m, 0).unwrap()
    }

    #[test]
    fn apply_action_creates_state_lazily() {
        let engine = engine_utc();
        let (result, violations) = engine
            .apply_action("u1", "Linh", EmployeeAction::StartShift, at(8, 0))
            .unwrap();
        assert_eq!(result, TransitionResult::ShiftStarted { at: at(8, 0) });
        assert!(violations.is_empty());
        assert_eq!(engine.store().len(), 1);
    }

    #[test]
    fn rejected_action_surfaces_reason_code() {
        let engine = engine_utc();
        let err = engine
            .apply_action("u1", "Linh", EmployeeAction::EndShift, at(17, 0))
            .unwrap_err();
        assert!(matches!(
            err,
            CoreError::Transition(TransitionError::NotWorking)
        ));
    }

    #[test]
    fn self_service_break_is_allow_and_flag() {
        let engine = engine_utc();
        engine
            .apply_action("u1", "Linh", EmployeeAction::StartShift, at(8, 0))
            .unwrap();
        // an_com allows 1 per shift; the second self-service attempt
        // still opens but is flagged.
        for expected in [0usize, 1usize] {
            let (_, violations) = engine
                .apply_action(
                    "u1",
                    "Linh",
                    EmployeeAction::StartBreak {
                        kind: "an_com".to_string(),
                    },
                    at(12, 0),
                )
                .unwrap();
            assert_eq!(violations.len(), expected);
            engine
                .apply_action("u1", "Linh", EmployeeAction::EndBreak, at(12, 10))
                .unwrap();
        }
    }

    #[test]
    fn force_break_refuses_over_limit_and_skips() {
        let engine = engine_utc();
        engine
            .apply_action("u1", "Linh", EmployeeAction::StartShift, at(8, 0))
            .unwrap();
        engine
            .apply_action("u2", "Trang", EmployeeAction::StartShift, at(8, 0))
            .unwrap();
        // Exhaust u1's an_com allowance.
        engine
            .apply_action(
                "u1",
                "Linh",
                EmployeeAction::StartBreak {
                    kind: "an_com".to_string(),
                },
                at(11, 0),
            )
            .unwrap();
        engine
            .apply_action("u1", "Linh", EmployeeAction::EndBreak, at(11, 20))
            .unwrap();

        let (affected, violations) = engine.force_action(
            ForceTarget::All,
            EmployeeAction::StartBreak {
                kind: "an_com".to_string(),
            },
            at(12, 0),
            FrequencyMode::RefuseOverLimit,
        );
        // Only Trang is let through; Linh is refused, not flagged.
        assert_eq!(affected, 1);
        assert!(violations.is_empty());
        let u1 = engine.store().get("u1").unwrap();
        assert!(u1.lock().unwrap().active_break.is_none());
    }

    #[test]
    fn bulk_end_skips_employees_on_break() {
        let engine = engine_utc();
        engine
            .apply_action("u1", "Linh", EmployeeAction::StartShift, at(8, 0))
            .unwrap();
        engine
            .apply_action("u2", "Trang", EmployeeAction::StartShift, at(8, 0))
            .unwrap();
        engine
            .apply_action(
                "u2",
                "Trang",
                EmployeeAction::StartBreak {
                    kind: "ve_sinh".to_string(),
                },
                at(9, 0),
            )
            .unwrap();

        let (affected, _) = engine.force_action(
            ForceTarget::All,
            EmployeeAction::EndShift,
            at(17, 0),
            FrequencyMode::RefuseOverLimit,
        );
        assert_eq!(affected, 1);
        let u2 = engine.store().get("u2").unwrap();
        assert!(u2.lock().unwrap().is_working);
    }

    #[test]
    fn targeted_force_close_bypasses_open_break() {
        let engine = engine_utc();
        engine
            .apply_action("u1", "Linh", EmployeeAction::StartShift, at(8, 0))
            .unwrap();
        engine
            .apply_action(
                "u1",
                "Linh",
                EmployeeAction::StartBreak {
                    kind: "ve_sinh".to_string(),
                },
                at(9, 0),
            )
            .unwrap();

        let records = engine.force_close(ForceTarget::One("u1".to_string()), at(9, 30));
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].open_break_folded.as_deref(), Some("ve_sinh"));
        let entry = engine.store().get("u1").unwrap();
        let state = entry.lock().unwrap();
        assert!(!state.is_working);
        assert!(state.invariants_hold());
    }

    #[test]
    fn reset_restores_empty_form() {
        let engine = engine_utc();
        engine
            .apply_action("u1", "Linh", EmployeeAction::StartShift, at(8, 0))
            .unwrap();
        assert_eq!(engine.reset(ForceTarget::All), 1);
        let entry = engine.store().get("u1").unwrap();
        let state = entry.lock().unwrap();
        assert!(!state.is_working);
        assert!(state.shift_start.is_none());
        assert!(state.break_counts.is_empty());
        assert_eq!(state.display_name, "Linh");
    }

    #[test]
    fn notifier_failure_does_not_abort_the_transition() {
        struct FailingNotifier(Arc<AtomicUsize>);
        impl ViolationNotifier for FailingNotifier {
            fn name(&self) -> &str {
                "failing"
            }
            fn notify_violation(&self, _: &Violation) -> Result<(), Box<dyn std::error::Error>> {
                self.0.fetch_add(1, Ordering::SeqCst);
                Err("recipient unreachable".into())
            }
        }
        struct CountingNotifier(Arc<AtomicUsize>);
        impl ViolationNotifier for CountingNotifier {
            fn name(&self) -> &str {
                "counting"
            }
            fn notify_violation(&self, _: &Violation) -> Result<(), Box<dyn std::error::Error>> {
                self.0.fetch_add(1, Ordering::SeqCst);
                Ok(())
            }
        }

        let failed = Arc::new(AtomicUsize::new(0));
        let delivered = Arc::new(AtomicUsize::new(0));
        let mut engine = engine_utc();
        engine.add_notifier(Box::new(FailingNotifier(Arc::clone(&failed))));
        engine.add_notifier(Box::new(CountingNotifier(Arc::clone(&delivered))));

        // 08:05 against an 08:00 start: one late_arrival.
        let (_, violations) = engine
            .apply_action("u1", "Linh", EmployeeAction::StartShift, at(8, 5))
            .unwrap();
        assert_eq!(violations.len(), 1);
        assert_eq!(failed.load(Ordering::SeqCst), 1);
        // The second recipient still got its copy.
        assert_eq!(delivered.load(Ordering::SeqCst), 1);
        // And the mutation stuck.
        let entry = engine.store().get("u1").unwrap();
        assert!(entry.lock().unwrap().is_working);
    }
}
