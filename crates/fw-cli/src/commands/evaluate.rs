use fw_core::enums::EntityKind;

use crate::cli::GlobalFlags;
use crate::cli::root_commands::EvaluateArgs;
use crate::commands::shared::parse::parse_enum;
use crate::context::AppContext;
use crate::output::output;

/// Handle `fwatch evaluate`.
pub async fn handle(args: &EvaluateArgs, ctx: &AppContext, flags: &GlobalFlags) -> anyhow::Result<()> {
    let kind: EntityKind = parse_enum(&args.kind, "kind")?;
    let outcome = ctx.engine.evaluate(kind, &args.id).await?;
    output(&outcome, flags.format)
}
