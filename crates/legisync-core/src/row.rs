//! Target-column values derived from a bill record.
//!
//! `build_row` is the whole transform: pure, no I/O, and the only place
//! derived fields are computed. Target cells are overwritten wholesale on
//! every run; stale manual edits in target columns do not survive a sync.

use crate::BillRecord;

/// Co-sponsor threshold: a veto-proof majority of the 51-member council.
pub const SPONSORS_NEEDED: usize = 26;

/// Written into every target cell of a row whose file number has no
/// matching matter.
pub const NOT_FOUND_MARKER: &str = "NOT FOUND";

/// The writable cell values for one sheet row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TargetRow {
    pub name: String,
    /// Empty cell when the matter has no prime sponsor.
    pub prime_sponsor: String,
    pub summary: String,
    pub co_sponsor_count: usize,
    pub co_sponsors_needed: usize,
    /// Newline-joined co-sponsor names.
    pub co_sponsors: String,
    /// Newline-joined file numbers of prior/later sessions, oldest first.
    pub history: String,
}

/// One planned write for a sheet row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RowUpdate {
    Row(TargetRow),
    /// The file number had no matching matter; every target cell gets
    /// [`NOT_FOUND_MARKER`].
    NotFound,
}

/// Map a fetched record to its target cells.
pub fn build_row(record: &BillRecord) -> TargetRow {
    let count = record.co_sponsors.len();
    TargetRow {
        name: record.name.clone(),
        prime_sponsor: record.prime_sponsor.clone().unwrap_or_default(),
        summary: record.summary.clone(),
        co_sponsor_count: count,
        co_sponsors_needed: SPONSORS_NEEDED.saturating_sub(count),
        co_sponsors: record.co_sponsors.join("\n"),
        history: record
            .history
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join("\n"),
    }
}
