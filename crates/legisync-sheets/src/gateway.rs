//! Google Sheets v4 values gateway.
//!
//! The gateway never inserts, deletes, or reorders rows: the source column
//! defines row identity, and target cells are either overwritten in place
//! or (for rows with no planned update) left untouched by writing JSON
//! nulls, which the values API skips.

use std::collections::BTreeMap;
use std::time::Duration;

use legisync_core::config::ColumnTitles;
use legisync_core::row::{NOT_FOUND_MARKER, RowUpdate, TargetRow};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;
use tracing::info;

use crate::column::{column_letter, resolve_headers};

const SHEETS_BASE_URL: &str = "https://sheets.googleapis.com/v4/spreadsheets";

#[derive(Debug, Error)]
pub enum SheetError {
    #[error("Sheets request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("Sheets API returned {status}: {body}")]
    Server { status: u16, body: String },
    #[error("column title(s) not found in header row {row}: {missing:?}")]
    MissingColumns { row: u32, missing: Vec<String> },
}

/// Scoped handle owning the HTTP client and the pre-provisioned OAuth
/// bearer token for the spreadsheet.
///
/// Passed explicitly into the gateway and dropped when the run ends;
/// nothing credential-shaped lives in module state.
pub struct SheetsSession {
    client: reqwest::Client,
    token: String,
}

impl SheetsSession {
    pub fn new(token: String, timeout: Duration) -> Result<Self, SheetError> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self { client, token })
    }

    async fn get_values(&self, spreadsheet_id: &str, range: &str) -> Result<ValueRange, SheetError> {
        let url = format!(
            "{SHEETS_BASE_URL}/{spreadsheet_id}/values/{}",
            encode_range(range)
        );
        let resp = self
            .client
            .get(&url)
            .bearer_auth(&self.token)
            .send()
            .await?;
        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(SheetError::Server {
                status: status.as_u16(),
                body,
            });
        }
        Ok(resp.json().await?)
    }

    async fn batch_update(
        &self,
        spreadsheet_id: &str,
        data: Vec<ValueRange>,
    ) -> Result<u64, SheetError> {
        let url = format!("{SHEETS_BASE_URL}/{spreadsheet_id}/values:batchUpdate");
        let body = BatchUpdateRequest {
            value_input_option: "RAW",
            data,
        };
        let resp = self
            .client
            .post(&url)
            .bearer_auth(&self.token)
            .json(&body)
            .send()
            .await?;
        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(SheetError::Server {
                status: status.as_u16(),
                body,
            });
        }
        let result: BatchUpdateResponse = resp.json().await?;
        Ok(result.total_updated_cells)
    }
}

// ── Wire types for the values API ──

#[derive(Debug, Serialize, Deserialize)]
struct ValueRange {
    range: String,
    /// Absent in responses for empty ranges.
    #[serde(default)]
    values: Vec<Vec<Value>>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct BatchUpdateRequest {
    value_input_option: &'static str,
    data: Vec<ValueRange>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct BatchUpdateResponse {
    #[serde(default)]
    total_updated_cells: u64,
}

// ── Gateway ──

/// Column letters for the source column and the seven target columns.
#[derive(Debug, Clone)]
struct ResolvedColumns {
    file_no: String,
    name: String,
    prime_sponsor: String,
    summary: String,
    co_sponsor_count: String,
    co_sponsors_needed: String,
    co_sponsors: String,
    history: String,
}

/// One spreadsheet tab, with every configured column title resolved to a
/// letter.
pub struct SheetGateway {
    session: SheetsSession,
    spreadsheet_id: String,
    sheet_name: String,
    /// 1-based row holding the column titles; data starts on the next row.
    header_row: u32,
    columns: ResolvedColumns,
}

impl SheetGateway {
    /// Open the gateway against one tab.
    ///
    /// Reads the header row once and resolves every configured title to a
    /// column letter. A missing title aborts here, before any data access.
    pub async fn open(
        session: SheetsSession,
        spreadsheet_id: String,
        sheet_name: String,
        header_row: u32,
        titles: &ColumnTitles,
    ) -> Result<Self, SheetError> {
        let range = format!("{sheet_name}!{header_row}:{header_row}");
        let header_values = session.get_values(&spreadsheet_id, &range).await?;
        let headers: Vec<String> = header_values
            .values
            .first()
            .map(|row| row.iter().map(cell_text).collect())
            .unwrap_or_default();

        let wanted = [
            titles.file_no.as_str(),
            titles.name.as_str(),
            titles.prime_sponsor.as_str(),
            titles.summary.as_str(),
            titles.co_sponsor_count.as_str(),
            titles.co_sponsors_needed.as_str(),
            titles.co_sponsors.as_str(),
            titles.history.as_str(),
        ];
        let indices = resolve_headers(&headers, &wanted)
            .map_err(|missing| SheetError::MissingColumns {
                row: header_row,
                missing,
            })?;
        let letters: Vec<String> = indices.into_iter().map(column_letter).collect();
        let columns = ResolvedColumns {
            file_no: letters[0].clone(),
            name: letters[1].clone(),
            prime_sponsor: letters[2].clone(),
            summary: letters[3].clone(),
            co_sponsor_count: letters[4].clone(),
            co_sponsors_needed: letters[5].clone(),
            co_sponsors: letters[6].clone(),
            history: letters[7].clone(),
        };
        info!(sheet = %sheet_name, source = %columns.file_no, "columns resolved");

        Ok(Self {
            session,
            spreadsheet_id,
            sheet_name,
            header_row,
            columns,
        })
    }

    /// Read the source column top-to-bottom.
    ///
    /// Blank cells are skipped; each returned entry keeps its absolute
    /// 1-based sheet row, so row alignment survives gaps in the column.
    pub async fn read_identifiers(&self) -> Result<Vec<(u32, String)>, SheetError> {
        let first_data_row = self.header_row + 1;
        let col = &self.columns.file_no;
        let range = format!("{}!{col}{first_data_row}:{col}", self.sheet_name);
        let value_range = self.session.get_values(&self.spreadsheet_id, &range).await?;

        let mut entries = Vec::new();
        for (offset, row) in value_range.values.iter().enumerate() {
            let cell = row.first().map(cell_text).unwrap_or_default();
            let trimmed = cell.trim();
            if trimmed.is_empty() {
                continue;
            }
            entries.push((first_data_row + offset as u32, trimmed.to_string()));
        }
        info!(count = entries.len(), "read file numbers from sheet");
        Ok(entries)
    }

    /// Overwrite the target columns for every planned row in one batch
    /// update.
    ///
    /// Returns the number of cells the API reports updated. Any rejection
    /// surfaces as an error; callers treat it as fatal so the sheet is
    /// never left half-updated by a retried run.
    pub async fn write_rows(&self, rows: &BTreeMap<u32, RowUpdate>) -> Result<u64, SheetError> {
        let data = build_update_data(&self.sheet_name, &self.columns, rows);
        if data.is_empty() {
            return Ok(0);
        }
        let cells = self.session.batch_update(&self.spreadsheet_id, data).await?;
        info!(cells, rows = rows.len(), "batch write complete");
        Ok(cells)
    }
}

/// Build one `ValueRange` per target column, spanning the full row range
/// of the planned updates. Rows absent from `rows` get nulls, which the
/// API skips on write.
fn build_update_data(
    sheet_name: &str,
    columns: &ResolvedColumns,
    rows: &BTreeMap<u32, RowUpdate>,
) -> Vec<ValueRange> {
    let (Some(&first), Some(&last)) = (rows.keys().next(), rows.keys().next_back()) else {
        return Vec::new();
    };

    let targets: [(&str, fn(&TargetRow) -> Value); 7] = [
        (columns.name.as_str(), |t| Value::String(t.name.clone())),
        (columns.prime_sponsor.as_str(), |t| {
            Value::String(t.prime_sponsor.clone())
        }),
        (columns.summary.as_str(), |t| {
            Value::String(t.summary.clone())
        }),
        (columns.co_sponsor_count.as_str(), |t| {
            Value::from(t.co_sponsor_count)
        }),
        (columns.co_sponsors_needed.as_str(), |t| {
            Value::from(t.co_sponsors_needed)
        }),
        (columns.co_sponsors.as_str(), |t| {
            Value::String(t.co_sponsors.clone())
        }),
        (columns.history.as_str(), |t| {
            Value::String(t.history.clone())
        }),
    ];

    targets
        .into_iter()
        .map(|(letter, cell)| ValueRange {
            range: format!("{sheet_name}!{letter}{first}:{letter}{last}"),
            values: (first..=last)
                .map(|r| {
                    vec![match rows.get(&r) {
                        Some(RowUpdate::Row(t)) => cell(t),
                        Some(RowUpdate::NotFound) => Value::String(NOT_FOUND_MARKER.to_string()),
                        None => Value::Null,
                    }]
                })
                .collect(),
        })
        .collect()
}

/// Render a cell value the way it displays: strings as-is, numbers and
/// booleans via their JSON text.
fn cell_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Null => String::new(),
        other => other.to_string(),
    }
}

/// Percent-encode an A1 range for use as a URL path segment. Tab names
/// may contain spaces and other reserved characters.
fn encode_range(range: &str) -> String {
    let mut out = String::with_capacity(range.len());
    for b in range.bytes() {
        match b {
            b'A'..=b'Z' | b'a'..=b'z' | b'0'..=b'9' => out.push(b as char),
            b'-' | b'_' | b'.' | b'~' | b'!' | b':' | b'\'' => out.push(b as char),
            _ => out.push_str(&format!("%{b:02X}")),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn columns() -> ResolvedColumns {
        ResolvedColumns {
            file_no: "A".into(),
            name: "B".into(),
            prime_sponsor: "C".into(),
            summary: "D".into(),
            co_sponsor_count: "E".into(),
            co_sponsors_needed: "F".into(),
            co_sponsors: "G".into(),
            history: "H".into(),
        }
    }

    fn target_row() -> TargetRow {
        TargetRow {
            name: "Clean Air Act".into(),
            prime_sponsor: "A. Councilmember".into(),
            summary: "Air quality reporting".into(),
            co_sponsor_count: 2,
            co_sponsors_needed: 24,
            co_sponsors: "B. Councilmember\nC. Councilmember".into(),
            history: "Int 0005-2023".into(),
        }
    }

    #[test]
    fn one_range_per_target_column() {
        let mut rows = BTreeMap::new();
        rows.insert(3, RowUpdate::Row(target_row()));
        let data = build_update_data("Introductions 2024", &columns(), &rows);
        assert_eq!(data.len(), 7);
        assert_eq!(data[0].range, "Introductions 2024!B3:B3");
        assert_eq!(data[6].range, "Introductions 2024!H3:H3");
        assert_eq!(data[0].values, vec![vec![Value::String("Clean Air Act".into())]]);
    }

    #[test]
    fn counts_written_as_numbers() {
        let mut rows = BTreeMap::new();
        rows.insert(3, RowUpdate::Row(target_row()));
        let data = build_update_data("S", &columns(), &rows);
        assert_eq!(data[3].values[0][0], Value::from(2u64));
        assert_eq!(data[4].values[0][0], Value::from(24u64));
    }

    #[test]
    fn gaps_become_nulls() {
        let mut rows = BTreeMap::new();
        rows.insert(3, RowUpdate::Row(target_row()));
        rows.insert(5, RowUpdate::Row(target_row()));
        let data = build_update_data("S", &columns(), &rows);
        for range in &data {
            assert_eq!(range.values.len(), 3);
            assert_eq!(range.values[1], vec![Value::Null]);
        }
        assert_eq!(data[0].range, "S!B3:B5");
    }

    #[test]
    fn not_found_rows_get_marker_in_every_column() {
        let mut rows = BTreeMap::new();
        rows.insert(4, RowUpdate::NotFound);
        let data = build_update_data("S", &columns(), &rows);
        for range in &data {
            assert_eq!(
                range.values,
                vec![vec![Value::String(NOT_FOUND_MARKER.into())]]
            );
        }
    }

    #[test]
    fn no_rows_no_ranges() {
        let rows = BTreeMap::new();
        assert!(build_update_data("S", &columns(), &rows).is_empty());
    }

    #[test]
    fn identical_plans_build_identical_writes() {
        let mut rows = BTreeMap::new();
        rows.insert(3, RowUpdate::Row(target_row()));
        let a = build_update_data("S", &columns(), &rows);
        let b = build_update_data("S", &columns(), &rows);
        let text_a = serde_json::to_string(&a).unwrap();
        let text_b = serde_json::to_string(&b).unwrap();
        assert_eq!(text_a, text_b);
    }

    #[test]
    fn encode_range_escapes_spaces() {
        assert_eq!(
            encode_range("Introductions 2024!A3:A"),
            "Introductions%202024!A3:A"
        );
    }

    #[test]
    fn value_range_with_values() {
        let json = r#"{
            "range": "Introductions 2024!A3:A",
            "majorDimension": "ROWS",
            "values": [["Int 0107-2024"], [""], ["Int 0005-2024"]]
        }"#;
        let vr: ValueRange = serde_json::from_str(json).unwrap();
        assert_eq!(vr.values.len(), 3);
        assert_eq!(vr.values[0][0], Value::String("Int 0107-2024".into()));
    }

    #[test]
    fn value_range_without_values_key() {
        // The API omits `values` entirely for an empty range.
        let json = r#"{ "range": "S!A3:A", "majorDimension": "ROWS" }"#;
        let vr: ValueRange = serde_json::from_str(json).unwrap();
        assert!(vr.values.is_empty());
    }

    #[test]
    fn batch_request_serializes_camel_case() {
        let req = BatchUpdateRequest {
            value_input_option: "RAW",
            data: vec![],
        };
        let json = serde_json::to_string(&req).unwrap();
        assert!(json.contains("\"valueInputOption\":\"RAW\""));
        assert!(json.contains("\"data\":[]"));
    }

    #[test]
    fn cell_text_renders_common_shapes() {
        assert_eq!(cell_text(&Value::String("x".into())), "x");
        assert_eq!(cell_text(&Value::from(42u64)), "42");
        assert_eq!(cell_text(&Value::Null), "");
    }
}
