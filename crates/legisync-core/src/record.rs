//! Fetched bill attributes for one file number.

use crate::BillIdentifier;

/// Everything the sync needs to know about one bill, gathered fresh on
/// every run (nothing is cached between runs).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BillRecord {
    /// Legistar's internal matter id, needed for the sponsors endpoint.
    pub matter_id: i64,
    pub file_no: BillIdentifier,
    pub name: String,
    /// The sponsor with sequence 0. Rare matters have none.
    pub prime_sponsor: Option<String>,
    /// Empty when the API carries no summary text for the matter.
    pub summary: String,
    /// Co-sponsor names in signing order, deduplicated.
    pub co_sponsors: Vec<String>,
    /// File numbers of same-named bills from other sessions, oldest first.
    /// Never contains `file_no`.
    pub history: Vec<BillIdentifier>,
}
