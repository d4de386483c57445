use std::path::Path;

use anyhow::Context;
use fw_config::FwConfig;
use fw_core::sla::BudgetOverrides;

use crate::cli::GlobalFlags;
use crate::cli::subcommands::ConfigCommands;
use crate::commands::shared::parse::parse_budget_assignments;
use crate::context::AppContext;
use crate::output::output;

/// Handle `fwatch config`.
pub fn handle(action: &ConfigCommands, ctx: &AppContext, flags: &GlobalFlags) -> anyhow::Result<()> {
    match action {
        ConfigCommands::Show => output(&*ctx.engine.configuration(), flags.format),
        ConfigCommands::Set { budgets, write } => {
            let overrides = parse_budget_assignments(budgets)?;
            let snapshot = ctx.engine.set_configuration(&overrides)?;
            if *write {
                let path = FwConfig::project_config_path(&ctx.project_root);
                persist_overrides(&path, &overrides)?;
                tracing::info!(path = %path.display(), "budget overrides written");
            }
            output(&*snapshot, flags.format)
        }
    }
}

/// Merge `overrides` into `[sla.budgets.<kind>]` of the TOML file at `path`,
/// keeping every other setting in the file.
fn persist_overrides(path: &Path, overrides: &BudgetOverrides) -> anyhow::Result<()> {
    let mut document: toml::Table = if path.exists() {
        std::fs::read_to_string(path)
            .with_context(|| format!("failed to read {}", path.display()))?
            .parse()
            .with_context(|| format!("failed to parse {}", path.display()))?
    } else {
        toml::Table::new()
    };

    for (kind, key, hours) in overrides.iter() {
        let kind_table = ["sla", "budgets", kind.as_str()]
            .into_iter()
            .try_fold(&mut document, |table, name| {
                table
                    .entry(name)
                    .or_insert_with(|| toml::Value::Table(toml::Table::new()))
                    .as_table_mut()
                    .with_context(|| format!("'{name}' in {} is not a table", path.display()))
            })?;
        kind_table.insert(key.to_string(), toml::Value::Float(hours));
    }

    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("failed to create {}", parent.display()))?;
    }
    std::fs::write(path, toml::to_string_pretty(&document)?)
        .with_context(|| format!("failed to write {}", path.display()))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use fw_core::enums::EntityKind;
    use tempfile::TempDir;

    use super::*;

    #[test]
    fn written_overrides_load_back_through_config() {
        let temp = TempDir::new().expect("tempdir should create");
        let path = FwConfig::project_config_path(temp.path());

        persist_overrides(
            &path,
            &BudgetOverrides::new().with(EntityKind::Report, "in_progress", 10.0),
        )
        .expect("overrides should persist");

        let config: FwConfig = FwConfig::figment_for(temp.path())
            .extract()
            .expect("config should load");
        assert_eq!(
            config.sla.budgets.hours(EntityKind::Report, "in_progress"),
            Some(10.0)
        );
        assert_eq!(
            config.sla.budgets.hours(EntityKind::Report, "completed"),
            Some(48.0)
        );
    }

    #[test]
    fn existing_settings_are_preserved() {
        let temp = TempDir::new().expect("tempdir should create");
        let path = FwConfig::project_config_path(temp.path());
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        std::fs::write(
            &path,
            "[scan]\nmax_concurrency = 3\n\n[sla.budgets.report_phase]\npending = 4.0\n",
        )
        .unwrap();

        persist_overrides(
            &path,
            &BudgetOverrides::new().with(EntityKind::ReportPhase, "submitted", 6.0),
        )
        .expect("overrides should persist");

        let document: toml::Table = std::fs::read_to_string(&path).unwrap().parse().unwrap();
        assert_eq!(document["scan"]["max_concurrency"].as_integer(), Some(3));
        let phase = &document["sla"]["budgets"]["report_phase"];
        assert_eq!(phase["pending"].as_float(), Some(4.0));
        assert_eq!(phase["submitted"].as_float(), Some(6.0));
    }
}
