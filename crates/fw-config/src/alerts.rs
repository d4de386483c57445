//! Alert content configuration.

use serde::{Deserialize, Serialize};

fn default_link_base() -> String {
    String::from("/")
}

fn default_title_prefix() -> String {
    String::from("SLA")
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct AlertsConfig {
    /// Base URL prepended to entity links (e.g., `https://reports.example.com`).
    #[serde(default = "default_link_base")]
    pub link_base: String,

    /// Prefix of every alert title.
    #[serde(default = "default_title_prefix")]
    pub title_prefix: String,
}

impl Default for AlertsConfig {
    fn default() -> Self {
        Self {
            link_base: default_link_base(),
            title_prefix: default_title_prefix(),
        }
    }
}
