//! Alert dispatcher collaborator.
//!
//! Delivery is at most once per breach per scan. Failures are reported back to
//! the scan orchestrator, which logs and counts them.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use fw_core::alert::AlertPayload;

use crate::error::DispatchError;

/// Delivers alerts to their recipients.
#[async_trait]
pub trait AlertDispatcher: Send + Sync {
    async fn send_alert(&self, recipient_id: &str, alert: &AlertPayload)
    -> Result<(), DispatchError>;
}

/// Emits every alert as a structured tracing event.
#[derive(Debug, Clone, Copy, Default)]
pub struct LogDispatcher;

#[async_trait]
impl AlertDispatcher for LogDispatcher {
    async fn send_alert(
        &self,
        recipient_id: &str,
        alert: &AlertPayload,
    ) -> Result<(), DispatchError> {
        tracing::info!(
            recipient = recipient_id,
            kind = %alert.kind,
            entity = %alert.entity_id,
            severity = %alert.severity,
            priority = %alert.priority,
            ratio = alert.elapsed_ratio,
            link = %alert.link,
            "{}",
            alert.title
        );
        Ok(())
    }
}

/// One line of a JSONL alert outbox.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AlertRecord {
    pub recipient_id: String,
    #[serde(flatten)]
    pub alert: AlertPayload,
}

/// Appends alerts to a JSON Lines file for an external notifier to drain.
#[derive(Debug, Clone)]
pub struct JsonlDispatcher {
    path: PathBuf,
}

impl JsonlDispatcher {
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[async_trait]
impl AlertDispatcher for JsonlDispatcher {
    async fn send_alert(
        &self,
        recipient_id: &str,
        alert: &AlertPayload,
    ) -> Result<(), DispatchError> {
        let record = AlertRecord {
            recipient_id: recipient_id.to_string(),
            alert: alert.clone(),
        };
        let path = self.path.clone();

        tokio::task::spawn_blocking(move || serde_jsonlines::append_json_lines(&path, [record]))
            .await
            .map_err(|e| DispatchError::Transport(format!("alert writer task failed: {e}")))??;
        Ok(())
    }
}
