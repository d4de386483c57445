use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, bail};
use fw_config::{FwConfig, PROJECT_DIR};
use fw_engine::{
    AlertDispatcher, EntityStore, JsonlDispatcher, LogDispatcher, MemoryEntityStore, SlaEngine,
};

use crate::cli::GlobalFlags;

/// Shared application resources initialized once at startup.
pub struct AppContext {
    pub engine: SlaEngine,
    pub config: FwConfig,
    pub project_root: PathBuf,
}

impl AppContext {
    /// Build the engine over the entity snapshot and the selected alert sink.
    ///
    /// When `needs_entities` is false a missing snapshot yields an empty store.
    pub fn init(
        project_root: PathBuf,
        config: FwConfig,
        flags: &GlobalFlags,
        needs_entities: bool,
    ) -> anyhow::Result<Self> {
        let entities_path = flags
            .entities
            .clone()
            .unwrap_or_else(|| project_root.join(PROJECT_DIR).join("entities.json"));
        let store = load_store(&entities_path, needs_entities)?;

        let dispatcher: Arc<dyn AlertDispatcher> = match &flags.alerts_out {
            Some(path) => Arc::new(JsonlDispatcher::new(path)),
            None => Arc::new(LogDispatcher),
        };

        let engine = SlaEngine::from_config(&config, store, dispatcher)?;

        Ok(Self {
            engine,
            config,
            project_root,
        })
    }
}

fn load_store(path: &Path, required: bool) -> anyhow::Result<Arc<dyn EntityStore>> {
    if !path.exists() {
        if required {
            bail!(
                "entity snapshot '{}' not found (pass --entities <path>)",
                path.display()
            );
        }
        return Ok(Arc::new(MemoryEntityStore::new()));
    }

    let store = MemoryEntityStore::load_json(path)
        .with_context(|| format!("failed to load entity snapshot '{}'", path.display()))?;
    Ok(Arc::new(store))
}

/// Resolve the project root from `--project` or by walking up to `.flightwatch`.
///
/// Falls back to the current directory when no `.flightwatch` exists.
pub fn resolve_project_root(project_override: Option<&str>) -> anyhow::Result<PathBuf> {
    if let Some(path) = project_override {
        let explicit = PathBuf::from(path);

        if explicit
            .file_name()
            .and_then(|name| name.to_str())
            .is_some_and(|name| name == PROJECT_DIR)
        {
            return explicit
                .parent()
                .map(Path::to_path_buf)
                .context("invalid --project path: '.flightwatch' directory has no parent");
        }

        if explicit.is_dir() {
            return Ok(explicit);
        }

        bail!(
            "invalid --project '{}': directory does not exist",
            explicit.display()
        );
    }

    let start = std::env::current_dir().context("failed to read current directory")?;
    Ok(find_project_root(&start).unwrap_or(start))
}

/// Walk upwards from `start` until a `.flightwatch` directory is found.
#[must_use]
pub fn find_project_root(start: &Path) -> Option<PathBuf> {
    let mut current = start.to_path_buf();
    loop {
        if current.join(PROJECT_DIR).is_dir() {
            return Some(current);
        }
        if !current.pop() {
            return None;
        }
    }
}
