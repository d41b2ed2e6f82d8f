use clap::{Parser, Subcommand};

mod commands;
mod common;
mod logging;

#[derive(Parser)]
#[command(name = "shiftwatch", version, about = "Shiftwatch attendance CLI")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Shift control
    Shift {
        #[command(subcommand)]
        action: commands::shift::ShiftAction,
    },
    /// Break control
    Break {
        #[command(subcommand)]
        action: commands::breaks::BreakAction,
    },
    /// Administrator bulk operations
    Admin {
        #[command(subcommand)]
        action: commands::admin::AdminAction,
    },
    /// Periodic sweeps (run from a scheduler)
    Sweep {
        #[command(subcommand)]
        action: commands::sweep::SweepAction,
    },
    /// Attendance reports
    Report {
        #[command(subcommand)]
        action: commands::report::ReportAction,
    },
    /// Policy management
    Policy {
        #[command(subcommand)]
        action: commands::policy::PolicyAction,
    },
}

fn main() {
    logging::init();
    let cli = Cli::parse();
    let result = match cli.command {
        Commands::Shift { action } => commands::shift::run(action),
        Commands::Break { action } => commands::breaks::run(action),
        Commands::Admin { action } => commands::admin::run(action),
        Commands::Sweep { action } => commands::sweep::run(action),
        Commands::Report { action } => commands::report::run(action),
        Commands::Policy { action } => commands::policy::run(action),
    };

    if let Err(e) = result {
        eprintln!("error: {e}");
        std::process::exit(1);
    }
}
