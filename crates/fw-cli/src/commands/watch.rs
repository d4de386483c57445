use std::time::Duration;

use fw_engine::{CancellationToken, EngineError};

use crate::cli::GlobalFlags;
use crate::cli::root_commands::WatchArgs;
use crate::context::AppContext;
use crate::output::output;

/// Handle `fwatch watch`: run a report every interval until Ctrl-C.
pub async fn handle(args: &WatchArgs, ctx: &AppContext, flags: &GlobalFlags) -> anyhow::Result<()> {
    let interval_secs = args
        .interval_secs
        .unwrap_or(ctx.config.scan.interval_secs)
        .max(1);

    let cancel = CancellationToken::new();
    let trigger = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::info!("interrupt received, stopping watch");
            trigger.cancel();
        }
    });

    let mut ticker = tokio::time::interval(Duration::from_secs(interval_secs));
    ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
    let mut runs = 0u32;

    loop {
        tokio::select! {
            biased;
            () = cancel.cancelled() => break,
            _ = ticker.tick() => {}
        }

        match ctx.engine.report(&cancel).await {
            Ok(report) => output(&report, flags.format)?,
            Err(EngineError::Cancelled) => break,
            Err(error) => tracing::error!(%error, "scheduled report failed"),
        }

        runs += 1;
        if args.max_runs.is_some_and(|max| runs >= max) {
            break;
        }
    }

    tracing::info!(runs, "watch stopped");
    Ok(())
}
