//! One-pass sync pipeline: read file numbers, fetch each matter, write
//! every target column in a single batch.
//!
//! Per-row failures never abort the run: a file number with no matter gets
//! the not-found marker, an unreachable API or unparsable cell skips the
//! row. Only reading the source column or the final batch write is fatal,
//! so the sheet is either updated once or not at all.

use std::collections::BTreeMap;

use anyhow::Context;
use async_trait::async_trait;
use legisync_client::{ApiError, LegistarClient};
use legisync_core::config::HistoryMatch;
use legisync_core::row::RowUpdate;
use legisync_core::{BillIdentifier, BillRecord, build_row};
use legisync_sheets::SheetGateway;
use tracing::{info, warn};

/// Per-run outcome counts, reported at the end of the run.
#[derive(Debug, Default, PartialEq, Eq)]
pub struct SyncStats {
    pub synced: usize,
    pub not_found: usize,
    /// Rows left untouched because the API was unreachable for them.
    pub skipped: usize,
    /// Source cells that did not parse as a file number.
    pub malformed: usize,
}

/// Seam between the sync loop and the Legistar client, so the loop is
/// testable with an in-memory source.
#[async_trait]
pub trait BillSource {
    async fn fetch(&self, id: &BillIdentifier) -> Result<BillRecord, ApiError>;
    async fn find_related(
        &self,
        name: &str,
        own: &BillIdentifier,
        policy: HistoryMatch,
    ) -> Result<Vec<BillIdentifier>, ApiError>;
}

#[async_trait]
impl BillSource for LegistarClient {
    async fn fetch(&self, id: &BillIdentifier) -> Result<BillRecord, ApiError> {
        LegistarClient::fetch(self, id).await
    }

    async fn find_related(
        &self,
        name: &str,
        own: &BillIdentifier,
        policy: HistoryMatch,
    ) -> Result<Vec<BillIdentifier>, ApiError> {
        LegistarClient::find_related(self, name, own, policy).await
    }
}

/// Run the full sync: read → fetch per row → one batch write.
pub async fn run_sync(
    source: &impl BillSource,
    gateway: &SheetGateway,
    policy: HistoryMatch,
) -> anyhow::Result<SyncStats> {
    let entries = gateway
        .read_identifiers()
        .await
        .context("reading source column")?;
    if entries.is_empty() {
        warn!("no file numbers found in the sheet");
        return Ok(SyncStats::default());
    }

    let (rows, stats) = plan_rows(source, &entries, policy).await;

    if rows.is_empty() {
        warn!("nothing to write");
        return Ok(stats);
    }
    let cells = gateway
        .write_rows(&rows)
        .await
        .context("writing target columns")?;
    info!(cells, "sheet updated");
    Ok(stats)
}

/// Fetch and transform every entry, isolating failures to their row.
async fn plan_rows(
    source: &impl BillSource,
    entries: &[(u32, String)],
    policy: HistoryMatch,
) -> (BTreeMap<u32, RowUpdate>, SyncStats) {
    let mut rows = BTreeMap::new();
    let mut stats = SyncStats::default();

    for (row, raw) in entries {
        let row = *row;
        let id: BillIdentifier = match raw.parse() {
            Ok(id) => id,
            Err(err) => {
                warn!(row, cell = %raw, %err, "skipping row");
                stats.malformed += 1;
                continue;
            }
        };

        let mut record = match source.fetch(&id).await {
            Ok(record) => record,
            Err(ApiError::NotFound(_)) => {
                warn!(row, file = %id, "no matter found, writing marker");
                rows.insert(row, RowUpdate::NotFound);
                stats.not_found += 1;
                continue;
            }
            Err(err) => {
                warn!(row, file = %id, %err, "API failure, row skipped");
                stats.skipped += 1;
                continue;
            }
        };

        match source.find_related(&record.name, &id, policy).await {
            Ok(history) => record.history = history,
            Err(err) => {
                warn!(row, file = %id, %err, "related-bill search failed, row skipped");
                stats.skipped += 1;
                continue;
            }
        }

        rows.insert(row, RowUpdate::Row(build_row(&record)));
        stats.synced += 1;
    }

    (rows, stats)
}
