use crate::cli::GlobalFlags;
use crate::cli::root_commands::Commands;
use crate::commands;
use crate::context::AppContext;

/// Dispatch a parsed command to the corresponding handler module.
pub async fn dispatch(command: Commands, ctx: &AppContext, flags: &GlobalFlags) -> anyhow::Result<()> {
    match command {
        Commands::Evaluate(args) => commands::evaluate::handle(&args, ctx, flags).await,
        Commands::Scan(args) => commands::scan::handle(&args, ctx, flags).await,
        Commands::Report => commands::report::handle(ctx, flags).await,
        Commands::Watch(args) => commands::watch::handle(&args, ctx, flags).await,
        Commands::Config { action } => commands::config::handle(&action, ctx, flags),
    }
}
