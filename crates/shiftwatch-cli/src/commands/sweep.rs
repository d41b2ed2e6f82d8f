use std::collections::HashMap;
use std::error::Error;

use chrono::Utc;
use clap::Subcommand;
use shiftwatch_core::ViolationLog;

use crate::common;

#[derive(Subcommand)]
pub enum SweepAction {
    /// Scan for open breaks past their allowance (repeatable)
    Overtime,
    /// Force-close every open shift (run once daily, off-hours)
    Close,
}

pub fn run(action: SweepAction) -> Result<(), Box<dyn Error>> {
    let (engine, db) = common::open_engine()?;
    let now = Utc::now();

    match action {
        SweepAction::Overtime => {
            let violations = engine.sweep_overtime(now);
            // Per-employee, per-kind counts for the admin summary.
            let mut log = ViolationLog::new();
            log.record_all(violations.iter().cloned());
            let by_employee: HashMap<String, HashMap<&str, usize>> = violations
                .iter()
                .map(|v| v.employee_name.clone())
                .collect::<std::collections::HashSet<_>>()
                .into_iter()
                .map(|name| {
                    let counts = log.counts_for(&name, None);
                    (name, counts)
                })
                .collect();
            common::print_json(&serde_json::json!({
                "violations": violations,
                "by_employee": by_employee,
            }))
        }
        SweepAction::Close => {
            let records = engine.sweep_force_close(now);
            common::persist(&engine, &db);
            common::print_json(&serde_json::json!({ "closed": records }))
        }
    }
}
