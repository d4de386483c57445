use std::path::Path;

use anyhow::Context;
use fw_config::FwConfig;

/// Load `.env` from the project root (if any), then the layered config.
pub fn load_config(project_root: &Path) -> anyhow::Result<FwConfig> {
    load_project_dotenv(project_root)?;
    FwConfig::load_from(project_root).context("failed to load flightwatch configuration")
}

fn load_project_dotenv(project_root: &Path) -> anyhow::Result<()> {
    let env_path = project_root.join(".env");
    if !env_path.exists() {
        let _ = dotenvy::dotenv();
        return Ok(());
    }

    dotenvy::from_path(&env_path)
        .with_context(|| format!("failed to load {}", env_path.display()))?;
    tracing::debug!(path = %env_path.display(), "loaded project .env");
    Ok(())
}
