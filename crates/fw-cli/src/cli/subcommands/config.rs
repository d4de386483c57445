use clap::Subcommand;

/// SLA budget administration.
#[derive(Clone, Debug, Subcommand)]
pub enum ConfigCommands {
    /// Show active budgets and thresholds.
    Show,
    /// Override budgets, e.g. `report.in_progress=10`.
    Set {
        /// `<kind>.<key>=<hours>` assignments.
        #[arg(required = true, value_name = "KIND.KEY=HOURS")]
        budgets: Vec<String>,
        /// Persist the overrides to the project config file.
        #[arg(long)]
        write: bool,
    },
}
