use std::error::Error;

use clap::Subcommand;
use shiftwatch_core::WorkPolicy;

use crate::common;

#[derive(Subcommand)]
pub enum PolicyAction {
    /// Print the effective policy
    Show,
    /// Write the reference policy to the data directory
    Init,
}

pub fn run(action: PolicyAction) -> Result<(), Box<dyn Error>> {
    match action {
        PolicyAction::Show => {
            let policy = common::load_policy()?;
            common::print_json(&policy)
        }
        PolicyAction::Init => {
            let path = common::policy_path()?;
            WorkPolicy::default().save(&path)?;
            common::print_json(&serde_json::json!({ "written": path }))
        }
    }
}
