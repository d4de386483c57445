use fw_engine::CancellationToken;

use crate::cli::GlobalFlags;
use crate::context::AppContext;
use crate::output::output;

/// Handle `fwatch report`.
pub async fn handle(ctx: &AppContext, flags: &GlobalFlags) -> anyhow::Result<()> {
    let report = ctx.engine.report(&CancellationToken::new()).await?;
    output(&report, flags.format)
}
