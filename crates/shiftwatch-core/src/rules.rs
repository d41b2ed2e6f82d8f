//! Violation rule engine.
//!
//! Pure functions over `(policy, timestamps)`: no state mutation, no I/O.
//! The shift/break machines and the periodic sweep are the only callers.
//!
//! Every magnitude discards sub-minute precision by truncation, matching
//! the minutes-floor convention used in reports.

use chrono::{DateTime, Duration, NaiveTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::PolicyError;
use crate::policy::WorkPolicy;

/// What was violated, with the structured fields a notifier needs to
/// render the message: scheduled vs. actual values, the delta, the break
/// kind, the counts.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ViolationKind {
    LateArrival {
        scheduled: NaiveTime,
        actual: NaiveTime,
        minutes: i64,
    },
    EarlyDeparture {
        scheduled: NaiveTime,
        actual: NaiveTime,
        minutes: i64,
    },
    /// Shift opened before the scheduled window.
    EarlyStart {
        scheduled: NaiveTime,
        actual: NaiveTime,
        minutes: i64,
    },
    /// Shift closed after the scheduled window.
    LateEnd {
        scheduled: NaiveTime,
        actual: NaiveTime,
        minutes: i64,
    },
    BreakOvertime {
        break_kind: String,
        allowed_min: i64,
        actual_min: i64,
        over_min: i64,
    },
    BreakFrequencyExceeded {
        break_kind: String,
        allowed: u32,
        actual: u32,
    },
}

impl ViolationKind {
    /// Stable label for counting and filtering.
    pub fn label(&self) -> &'static str {
        match self {
            ViolationKind::LateArrival { .. } => "late_arrival",
            ViolationKind::EarlyDeparture { .. } => "early_departure",
            ViolationKind::EarlyStart { .. } => "early_start",
            ViolationKind::LateEnd { .. } => "late_end",
            ViolationKind::BreakOvertime { .. } => "break_overtime",
            ViolationKind::BreakFrequencyExceeded { .. } => "break_frequency_exceeded",
        }
    }

    /// The overage/shortfall in whole minutes, when applicable.
    pub fn magnitude_min(&self) -> Option<i64> {
        match self {
            ViolationKind::LateArrival { minutes, .. }
            | ViolationKind::EarlyDeparture { minutes, .. }
            | ViolationKind::EarlyStart { minutes, .. }
            | ViolationKind::LateEnd { minutes, .. } => Some(*minutes),
            ViolationKind::BreakOvertime { over_min, .. } => Some(*over_min),
            ViolationKind::BreakFrequencyExceeded { .. } => None,
        }
    }

    fn describe(&self) -> String {
        match self {
            ViolationKind::LateArrival {
                scheduled,
                actual,
                minutes,
            } => format!(
                "arrived {} against a scheduled {} start ({} min late)",
                actual.format("%H:%M"),
                scheduled.format("%H:%M"),
                minutes
            ),
            ViolationKind::EarlyDeparture {
                scheduled,
                actual,
                minutes,
            } => format!(
                "left {} before the scheduled {} end ({} min early)",
                actual.format("%H:%M"),
                scheduled.format("%H:%M"),
                minutes
            ),
            ViolationKind::EarlyStart {
                scheduled,
                actual,
                minutes,
            } => format!(
                "shift opened {} ahead of the scheduled {} start ({} min early)",
                actual.format("%H:%M"),
                scheduled.format("%H:%M"),
                minutes
            ),
            ViolationKind::LateEnd {
                scheduled,
                actual,
                minutes,
            } => format!(
                "shift closed {} after the scheduled {} end ({} min late)",
                actual.format("%H:%M"),
                scheduled.format("%H:%M"),
                minutes
            ),
            ViolationKind::BreakOvertime {
                break_kind,
                allowed_min,
                actual_min,
                over_min,
            } => format!(
                "break '{break_kind}' ran {actual_min} min against a {allowed_min} min allowance ({over_min} min over)"
            ),
            ViolationKind::BreakFrequencyExceeded {
                break_kind,
                allowed,
                actual,
            } => format!("break '{break_kind}' entered {actual} times ({allowed} allowed per shift)"),
        }
    }
}

/// A policy deviation, produced by the rule engine and handed to the
/// caller. The engine produces these; storing and delivering them is a
/// collaborator concern.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Violation {
    pub id: Uuid,
    pub employee_name: String,
    pub kind: ViolationKind,
    pub occurred_at: DateTime<Utc>,
    /// Human-readable explanation, rendered from the structured kind.
    pub detail: String,
    /// Whole minutes, truncated, when the rule has a magnitude.
    pub magnitude_min: Option<i64>,
}

impl Violation {
    pub fn new(employee_name: impl Into<String>, kind: ViolationKind, occurred_at: DateTime<Utc>) -> Self {
        let detail = kind.describe();
        let magnitude_min = kind.magnitude_min();
        Self {
            id: Uuid::new_v4(),
            employee_name: employee_name.into(),
            kind,
            occurred_at,
            detail,
            magnitude_min,
        }
    }
}

/// Truncate a duration to whole minutes, toward zero. Never rounds up.
pub fn whole_minutes(d: Duration) -> i64 {
    d.num_seconds() / 60
}

/// Arrival check for `start_shift`.
///
/// Strictly later than the scheduled start is late; strictly earlier is
/// an early start; exactly on time is clean.
pub fn check_arrival(name: &str, policy: &WorkPolicy, now: DateTime<Utc>) -> Option<Violation> {
    let actual = policy.local_time(now);
    let scheduled = policy.shift_start;
    if actual > scheduled {
        let minutes = whole_minutes(actual.signed_duration_since(scheduled));
        Some(Violation::new(
            name,
            ViolationKind::LateArrival {
                scheduled,
                actual,
                minutes,
            },
            now,
        ))
    } else if actual < scheduled {
        let minutes = whole_minutes(scheduled.signed_duration_since(actual));
        Some(Violation::new(
            name,
            ViolationKind::EarlyStart {
                scheduled,
                actual,
                minutes,
            },
            now,
        ))
    } else {
        None
    }
}

/// Departure check for `end_shift`.
pub fn check_departure(name: &str, policy: &WorkPolicy, now: DateTime<Utc>) -> Option<Violation> {
    let actual = policy.local_time(now);
    let scheduled = policy.shift_end;
    if actual < scheduled {
        let minutes = whole_minutes(scheduled.signed_duration_since(actual));
        Some(Violation::new(
            name,
            ViolationKind::EarlyDeparture {
                scheduled,
                actual,
                minutes,
            },
            now,
        ))
    } else if actual > scheduled {
        let minutes = whole_minutes(actual.signed_duration_since(scheduled));
        Some(Violation::new(
            name,
            ViolationKind::LateEnd {
                scheduled,
                actual,
                minutes,
            },
            now,
        ))
    } else {
        None
    }
}

/// Overtime check for a finished or still-open break.
pub fn check_break_overtime(
    name: &str,
    policy: &WorkPolicy,
    kind: &str,
    elapsed: Duration,
    at: DateTime<Utc>,
) -> Result<Option<Violation>, PolicyError> {
    let rule = policy.rule(kind)?;
    let allowed = Duration::minutes(rule.allowed_minutes);
    if elapsed <= allowed {
        return Ok(None);
    }
    Ok(Some(Violation::new(
        name,
        ViolationKind::BreakOvertime {
            break_kind: kind.to_string(),
            allowed_min: rule.allowed_minutes,
            actual_min: whole_minutes(elapsed),
            over_min: whole_minutes(elapsed - allowed),
        },
        at,
    )))
}

/// Frequency check against the count *after* the increment.
///
/// Exactly the allowed count is legal; strictly greater violates.
pub fn check_break_frequency(
    name: &str,
    policy: &WorkPolicy,
    kind: &str,
    count_after: u32,
    at: DateTime<Utc>,
) -> Result<Option<Violation>, PolicyError> {
    let rule = policy.rule(kind)?;
    if count_after <= rule.allowed_per_shift {
        return Ok(None);
    }
    Ok(Some(Violation::new(
        name,
        ViolationKind::BreakFrequencyExceeded {
            break_kind: kind.to_string(),
            allowed: rule.allowed_per_shift,
            actual: count_after,
        },
        at,
    )))
}
