use std::collections::BTreeMap;

use futures::future::try_join_all;
use tokio_util::sync::CancellationToken;

use fw_core::enums::EntityKind;
use fw_core::responses::{ReportTotals, SlaReport};

use crate::engine::SlaEngine;
use crate::error::EngineError;

impl SlaEngine {
    /// Scan every entity kind concurrently and combine the statistics.
    ///
    /// # Errors
    ///
    /// Returns the first scan error; a store failure or cancellation in any
    /// kind fails the whole report.
    pub async fn report(&self, cancel: &CancellationToken) -> Result<SlaReport, EngineError> {
        let scans = try_join_all(
            EntityKind::ALL
                .into_iter()
                .map(|kind| self.scan_kind(kind, cancel)),
        )
        .await?;

        let mut totals = ReportTotals::default();
        let mut kinds = BTreeMap::new();
        for scan in scans {
            totals.add(&scan.statistics);
            kinds.insert(scan.statistics.kind, scan.statistics);
        }

        Ok(SlaReport {
            generated_at: self.inner.clock.now(),
            kinds,
            totals,
        })
    }
}
