use clap::{Args, Subcommand};

use crate::cli::subcommands::ConfigCommands;

/// Top-level command tree.
#[derive(Clone, Debug, Subcommand)]
pub enum Commands {
    /// Evaluate one entity's SLA position without alerting.
    Evaluate(EvaluateArgs),
    /// Scan every active entity of one kind and alert on breaches.
    Scan(ScanArgs),
    /// Scan every entity kind and print combined statistics.
    Report,
    /// Run reports periodically until interrupted.
    Watch(WatchArgs),
    /// SLA budget administration.
    Config {
        #[command(subcommand)]
        action: ConfigCommands,
    },
}

#[derive(Clone, Debug, Args)]
pub struct EvaluateArgs {
    /// Entity kind: report, report_phase
    pub kind: String,
    /// Entity ID
    pub id: String,
}

#[derive(Clone, Debug, Args)]
pub struct ScanArgs {
    /// Entity kind: report, report_phase
    pub kind: String,
    /// Print only entities in alert
    #[arg(long)]
    pub alerts_only: bool,
}

#[derive(Clone, Debug, Args)]
pub struct WatchArgs {
    /// Seconds between reports (defaults to scan.interval_secs)
    #[arg(long)]
    pub interval_secs: Option<u64>,
    /// Stop after this many reports
    #[arg(long)]
    pub max_runs: Option<u32>,
}
