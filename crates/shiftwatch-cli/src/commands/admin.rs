use std::error::Error;

use chrono::Utc;
use clap::Subcommand;
use shiftwatch_core::{EmployeeAction, ForceTarget, FrequencyMode};

use crate::common;

#[derive(Subcommand)]
pub enum AdminAction {
    /// Open a shift for every known employee not already working
    StartAll,
    /// Close the shift for every working employee not on a break
    EndAll,
    /// Start a break for every working employee; refuses over-limit
    /// unless --flag-over-limit is given
    ForceBreak {
        kind: String,
        /// Let over-limit breaks start and flag them instead of refusing
        #[arg(long)]
        flag_over_limit: bool,
        /// Apply to a single employee instead of the whole roster
        #[arg(long)]
        employee: Option<String>,
    },
    /// End the open break for every employee on one
    EndBreakAll,
    /// Force-close a shift even while a break is open
    ForceClose {
        #[arg(long)]
        employee: Option<String>,
    },
    /// Reinitialize one employee, or the whole roster
    Reset {
        #[arg(long)]
        employee: Option<String>,
    },
}

pub fn run(action: AdminAction) -> Result<(), Box<dyn Error>> {
    let (engine, db) = common::open_engine()?;
    let now = Utc::now();

    match action {
        AdminAction::StartAll => {
            let (affected, violations) = engine.force_action(
                ForceTarget::All,
                EmployeeAction::StartShift,
                now,
                FrequencyMode::RefuseOverLimit,
            );
            common::persist(&engine, &db);
            common::print_json(&serde_json::json!({
                "affected": affected,
                "violations": violations,
            }))
        }
        AdminAction::EndAll => {
            let (affected, violations) = engine.force_action(
                ForceTarget::All,
                EmployeeAction::EndShift,
                now,
                FrequencyMode::RefuseOverLimit,
            );
            common::persist(&engine, &db);
            common::print_json(&serde_json::json!({
                "affected": affected,
                "violations": violations,
            }))
        }
        AdminAction::ForceBreak {
            kind,
            flag_over_limit,
            employee,
        } => {
            let mode = if flag_over_limit {
                FrequencyMode::AllowAndFlag
            } else {
                FrequencyMode::RefuseOverLimit
            };
            let target = match employee {
                Some(id) => ForceTarget::One(id),
                None => ForceTarget::All,
            };
            let (affected, violations) =
                engine.force_action(target, EmployeeAction::StartBreak { kind }, now, mode);
            common::persist(&engine, &db);
            common::print_json(&serde_json::json!({
                "affected": affected,
                "violations": violations,
            }))
        }
        AdminAction::EndBreakAll => {
            let (affected, violations) = engine.force_action(
                ForceTarget::All,
                EmployeeAction::EndBreak,
                now,
                FrequencyMode::RefuseOverLimit,
            );
            common::persist(&engine, &db);
            common::print_json(&serde_json::json!({
                "affected": affected,
                "violations": violations,
            }))
        }
        AdminAction::ForceClose { employee } => {
            let target = match employee {
                Some(id) => ForceTarget::One(id),
                None => ForceTarget::All,
            };
            let records = engine.force_close(target, now);
            common::persist(&engine, &db);
            common::print_json(&serde_json::json!({ "closed": records }))
        }
        AdminAction::Reset { employee } => {
            let target = match employee {
                Some(id) => ForceTarget::One(id),
                None => ForceTarget::All,
            };
            let count = engine.reset(target);
            common::persist(&engine, &db);
            common::print_json(&serde_json::json!({ "reset": count }))
        }
    }
}
