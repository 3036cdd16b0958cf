//! Wire types for the Legistar Web API.
//!
//! Field names follow the API's PascalCase JSON schema; only the fields
//! the sync consumes are deserialized.

use serde::Deserialize;

/// One legislative matter, as returned by `/{client}/matters`.
#[derive(Debug, Clone, Deserialize)]
pub struct Matter {
    #[serde(rename = "MatterId")]
    pub id: i64,
    /// File number, e.g. "Int 0107-2024".
    #[serde(rename = "MatterFile")]
    pub file: Option<String>,
    #[serde(rename = "MatterName")]
    pub name: Option<String>,
    /// Plain-language summary. The API stores it in extension text slot 5.
    #[serde(rename = "MatterEXText5")]
    pub summary: Option<String>,
}

/// One row from `/{client}/matters/{id}/sponsors`.
///
/// Sequence 0 is the prime sponsor; higher sequences are co-sponsors in
/// signing order.
#[derive(Debug, Clone, Deserialize)]
pub struct MatterSponsor {
    #[serde(rename = "MatterSponsorName")]
    pub name: Option<String>,
    #[serde(rename = "MatterSponsorSequence")]
    pub sequence: i32,
}
