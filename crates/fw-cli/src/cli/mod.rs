use std::path::PathBuf;

use clap::Parser;

pub mod global;
pub mod root_commands;
pub mod subcommands;

pub use global::{ColorMode, GlobalFlags, OutputFormat};
pub use root_commands::Commands;

/// Top-level CLI parser for the `fwatch` binary.
#[derive(Debug, Parser)]
#[command(
    name = "fwatch",
    version,
    about = "flightwatch - SLA deadline tracking for flight reports"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Output format: json, table, raw
    #[arg(short, long, global = true, default_value = "json")]
    pub format: OutputFormat,

    /// Max evaluations to print per scan
    #[arg(short, long, global = true)]
    pub limit: Option<u32>,

    /// Quiet mode (suppress non-essential output)
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Verbose mode (debug logging)
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Table colors: auto, always, never
    #[arg(long, global = true, default_value = "auto")]
    pub color: ColorMode,

    /// Project root path (defaults to auto-detect via .flightwatch)
    #[arg(short, long, global = true)]
    pub project: Option<String>,

    /// Entity snapshot JSON (defaults to .flightwatch/entities.json)
    #[arg(long, global = true)]
    pub entities: Option<PathBuf>,

    /// Append alerts to this JSONL file instead of logging them
    #[arg(long, global = true)]
    pub alerts_out: Option<PathBuf>,
}

impl Cli {
    /// Extract ergonomic global flags struct for command handlers.
    #[must_use]
    pub fn global_flags(&self) -> GlobalFlags {
        GlobalFlags {
            format: self.format,
            limit: self.limit,
            quiet: self.quiet,
            verbose: self.verbose,
            color: self.color,
            project: self.project.clone(),
            entities: self.entities.clone(),
            alerts_out: self.alerts_out.clone(),
        }
    }
}
