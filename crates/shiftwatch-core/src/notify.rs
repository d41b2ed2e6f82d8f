//! Notifier seam.
//!
//! Every delivery channel (an admin chat, a log sink) implements this
//! trait. Delivery is best-effort and happens after the state mutation
//! has committed; a failed delivery is logged and never re-applied to
//! state.

use tracing::warn;

use crate::rules::Violation;
use crate::shift::ClosureRecord;

/// A recipient for violation and closure records.
pub trait ViolationNotifier: Send + Sync {
    /// Unique identifier (e.g. "admin-chat", "audit-log").
    fn name(&self) -> &str;

    /// Called for every violation the engine produces.
    fn notify_violation(&self, _violation: &Violation) -> Result<(), Box<dyn std::error::Error>> {
        Ok(()) // default no-op
    }

    /// Called for every forced shift closure.
    fn notify_closure(&self, _record: &ClosureRecord) -> Result<(), Box<dyn std::error::Error>> {
        Ok(()) // default no-op
    }
}

/// Notifier that writes violations to the log.
#[derive(Debug, Default)]
pub struct LogNotifier;

impl ViolationNotifier for LogNotifier {
    fn name(&self) -> &str {
        "log"
    }

    fn notify_violation(&self, violation: &Violation) -> Result<(), Box<dyn std::error::Error>> {
        warn!(
            employee = %violation.employee_name,
            kind = violation.kind.label(),
            detail = %violation.detail,
            "violation"
        );
        Ok(())
    }

    fn notify_closure(&self, record: &ClosureRecord) -> Result<(), Box<dyn std::error::Error>> {
        warn!(employee = %record.employee_name, at = %record.closed_at, "shift force-closed");
        Ok(())
    }
}
