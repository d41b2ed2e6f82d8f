use std::error::Error;

use chrono::Utc;
use clap::Subcommand;

use crate::common;

#[derive(Subcommand)]
pub enum ReportAction {
    /// Shifts started on the current calendar date
    Today,
    /// Shifts started since the most recent Monday
    Week,
    /// Whole-roster rollup
    Summary,
}

pub fn run(action: ReportAction) -> Result<(), Box<dyn Error>> {
    let (engine, _db) = common::open_engine()?;
    let now = Utc::now();

    match action {
        ReportAction::Today => common::print_json(&engine.report_today(now)),
        ReportAction::Week => common::print_json(&engine.report_week(now)),
        ReportAction::Summary => common::print_json(&engine.report_summary()),
    }
}
