//! Break state machine.
//!
//! Breaks are a sub-state of an open shift: at most one break is open per
//! employee, its kind drawn from the policy's data-driven kind set.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{CoreError, TransitionError};
use crate::policy::{FrequencyMode, WorkPolicy};
use crate::rules;
use crate::rules::Violation;
use crate::state::EmployeeState;

/// Summary returned by `end_break`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BreakSummary {
    pub kind: String,
    pub started_at: DateTime<Utc>,
    pub ended_at: DateTime<Utc>,
    pub elapsed_secs: i64,
}

/// Open a break of `kind`.
///
/// The count reflects attempts, including the one that crosses the
/// limit. In `RefuseOverLimit` mode the check runs against the
/// pre-increment count and a refused start changes nothing. Returns the
/// new count alongside any frequency violation.
pub fn start_break(
    state: &mut EmployeeState,
    policy: &WorkPolicy,
    kind: &str,
    now: DateTime<Utc>,
    mode: FrequencyMode,
) -> Result<(u32, Vec<Violation>), CoreError> {
    if !state.is_working {
        return Err(TransitionError::NotWorking.into());
    }
    if let Some(active) = &state.active_break {
        return Err(TransitionError::BreakAlreadyActive {
            break_kind: active.clone(),
        }
        .into());
    }
    // Allowance lookup happens before any mutation so that a
    // misconfigured kind cannot leave a half-opened break behind.
    let rule = *policy.rule(kind)?;

    let count_before = state.break_counts.get(kind).copied().unwrap_or(0);
    if mode == FrequencyMode::RefuseOverLimit && count_before >= rule.allowed_per_shift {
        return Err(TransitionError::BreakLimitReached {
            break_kind: kind.to_string(),
            allowed: rule.allowed_per_shift,
        }
        .into());
    }

    let count_after = count_before + 1;
    state.break_counts.insert(kind.to_string(), count_after);
    state.active_break = Some(kind.to_string());
    state.break_started_at = Some(now);

    debug!(employee = %state.display_name, kind, count = count_after, "break started");
    let violations = match mode {
        FrequencyMode::AllowAndFlag => {
            rules::check_break_frequency(&state.display_name, policy, kind, count_after, now)?
                .into_iter()
                .collect()
        }
        // The refuse path never lets an over-limit break open, so there
        // is nothing to flag.
        FrequencyMode::RefuseOverLimit => Vec::new(),
    };
    Ok((count_after, violations))
}

/// Close the open break, crediting its elapsed time to the kind's
/// accumulator and running the overtime check.
pub fn end_break(
    state: &mut EmployeeState,
    policy: &WorkPolicy,
    now: DateTime<Utc>,
) -> Result<(BreakSummary, Vec<Violation>), CoreError> {
    let kind = state
        .active_break
        .clone()
        .ok_or(TransitionError::NoActiveBreak)?;
    let started_at = state.break_started_at.ok_or(TransitionError::NoActiveBreak)?;

    // Validated before mutation, same as the open path.
    policy.rule(&kind)?;

    let elapsed = now - started_at;
    let elapsed_secs = elapsed.num_seconds().max(0);
    *state.break_secs.entry(kind.clone()).or_insert(0) += elapsed_secs;
    state.active_break = None;
    state.break_started_at = None;

    debug!(employee = %state.display_name, kind = %kind, elapsed_secs, "break ended");
    let violations = rules::check_break_overtime(&state.display_name, policy, &kind, elapsed, now)?
        .into_iter()
        .collect();
    Ok((
        BreakSummary {
            kind,
            started_at,
            ended_at: now,
            elapsed_secs,
        },
        violations,
    ))
}
