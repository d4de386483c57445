//! # fw-config
//!
//! Layered configuration loading for flightwatch using figment.
//!
//! Configuration sources (in priority order, highest wins):
//! 1. Environment variables (`FLIGHTWATCH_*` prefix, `__` as separator)
//! 2. Project-level `.flightwatch/config.toml`
//! 3. User-level `~/.config/flightwatch/config.toml`
//! 4. Built-in defaults
//!
//! # Environment Variable Mapping
//!
//! Figment maps `FLIGHTWATCH_SCAN__MAX_CONCURRENCY` -> `scan.max_concurrency`,
//! `FLIGHTWATCH_SLA__BUDGETS__REPORT__IN_PROGRESS` -> `sla.budgets.report.in_progress`, etc.
//! The `__` (double underscore) separates nested config sections.
//!
//! Budget tables merge key by key, so a file or variable that names one
//! budget leaves every other default in place.
//!
//! # Usage
//!
//! ```no_run
//! use fw_config::FwConfig;
//!
//! let config = FwConfig::load_with_dotenv().expect("config");
//! println!("workers per kind: {}", config.scan.max_concurrency);
//! ```

mod alerts;
mod error;
mod scan;
mod sla;

pub use alerts::AlertsConfig;
pub use error::ConfigError;
pub use scan::ScanConfig;
pub use sla::SlaConfig;

use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Directory holding project-local flightwatch files.
pub const PROJECT_DIR: &str = ".flightwatch";

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct FwConfig {
    #[serde(default)]
    pub sla: SlaConfig,
    #[serde(default)]
    pub scan: ScanConfig,
    #[serde(default)]
    pub alerts: AlertsConfig,
}

impl FwConfig {
    /// Load configuration from all sources relative to the current directory.
    ///
    /// Does NOT call `dotenvy`; use [`Self::load_with_dotenv`] for `.env` loading.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if extraction fails or a value is invalid.
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_from(Path::new("."))
    }

    /// Load configuration with `project_root/.flightwatch/config.toml` as the
    /// project layer.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if extraction fails or a value is invalid.
    pub fn load_from(project_root: &Path) -> Result<Self, ConfigError> {
        let config: Self = Self::figment_for(project_root).extract()?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration with `.env` file support.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if extraction fails or a value is invalid.
    pub fn load_with_dotenv() -> Result<Self, ConfigError> {
        let _ = dotenvy::dotenv();
        Self::load()
    }

    /// Build the figment provider chain for the current directory.
    pub fn figment() -> Figment {
        Self::figment_for(Path::new("."))
    }

    /// Build the figment provider chain for a project root.
    ///
    /// Public so tests can inspect the figment directly or add providers on top.
    pub fn figment_for(project_root: &Path) -> Figment {
        let mut figment = Figment::from(Serialized::defaults(Self::default()));

        // Layer 1: User-global config
        if let Some(global_path) = Self::global_config_path()
            && global_path.exists()
        {
            figment = figment.merge(Toml::file(global_path));
        }

        // Layer 2: Project-local config
        let local_path = Self::project_config_path(project_root);
        if local_path.exists() {
            figment = figment.merge(Toml::file(local_path));
        }

        // Layer 3: Environment variables (highest priority)
        figment.merge(Env::prefixed("FLIGHTWATCH_").split("__"))
    }

    /// Path of the project-local config file under `project_root`.
    #[must_use]
    pub fn project_config_path(project_root: &Path) -> PathBuf {
        project_root.join(PROJECT_DIR).join("config.toml")
    }

    /// Validate cross-field constraints that serde cannot express.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidValue`] for the first invalid field.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.sla.validate()?;
        if self.scan.max_concurrency == 0 {
            return Err(ConfigError::InvalidValue {
                field: "scan.max_concurrency".to_string(),
                reason: "must be at least 1".to_string(),
            });
        }
        if self.scan.interval_secs == 0 {
            return Err(ConfigError::InvalidValue {
                field: "scan.interval_secs".to_string(),
                reason: "must be at least 1".to_string(),
            });
        }
        Ok(())
    }

    /// Path to the user-global config file.
    fn global_config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|p| p.join("flightwatch").join("config.toml"))
    }
}
