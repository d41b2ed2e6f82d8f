use std::error::Error;

use chrono::Utc;
use clap::Subcommand;
use shiftwatch_core::EmployeeAction;

use crate::common;

#[derive(Subcommand)]
pub enum BreakAction {
    /// Start a break of the given kind (e.g. ve_sinh, hut_thuoc, an_com)
    Start {
        kind: String,
        #[arg(long)]
        employee: String,
        #[arg(long)]
        name: Option<String>,
    },
    /// End the open break
    End {
        #[arg(long)]
        employee: String,
    },
}

pub fn run(action: BreakAction) -> Result<(), Box<dyn Error>> {
    let (engine, db) = common::open_engine()?;
    let now = Utc::now();

    let (employee, name, engine_action) = match action {
        BreakAction::Start {
            kind,
            employee,
            name,
        } => (employee, name, EmployeeAction::StartBreak { kind }),
        BreakAction::End { employee } => (employee, None, EmployeeAction::EndBreak),
    };
    let display = name.unwrap_or_else(|| employee.clone());
    let (result, violations) = engine.apply_action(&employee, &display, engine_action, now)?;
    common::persist(&engine, &db);
    common::print_json(&serde_json::json!({
        "result": result,
        "violations": violations,
    }))
}
