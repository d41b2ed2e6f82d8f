use std::error::Error;

use chrono::Utc;
use clap::Subcommand;
use shiftwatch_core::EmployeeAction;

use crate::common;

#[derive(Subcommand)]
pub enum ShiftAction {
    /// Clock in
    Start {
        /// Stable employee identifier
        #[arg(long)]
        employee: String,
        /// Display name, defaults to the identifier
        #[arg(long)]
        name: Option<String>,
    },
    /// Clock out
    End {
        #[arg(long)]
        employee: String,
    },
}

pub fn run(action: ShiftAction) -> Result<(), Box<dyn Error>> {
    let (engine, db) = common::open_engine()?;
    let now = Utc::now();

    let (employee, name, engine_action) = match action {
        ShiftAction::Start { employee, name } => (employee, name, EmployeeAction::StartShift),
        ShiftAction::End { employee } => (employee, None, EmployeeAction::EndShift),
    };
    let display = name.unwrap_or_else(|| employee.clone());
    let (result, violations) = engine.apply_action(&employee, &display, engine_action, now)?;
    common::persist(&engine, &db);
    common::print_json(&serde_json::json!({
        "result": result,
        "violations": violations,
    }))
}
