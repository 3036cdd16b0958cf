//! Run configuration: spreadsheet addressing, column titles, API endpoints.
//!
//! Loaded from a JSON file so the same binary can serve different sheets
//! and jurisdictions. Secrets (API token, OAuth access token) are NOT part
//! of this file; they arrive via CLI flags or environment variables.

use std::path::{Path, PathBuf};

use serde::Deserialize;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("cannot read config {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("invalid config {}: {source}", .path.display())]
    Parse {
        path: PathBuf,
        source: serde_json::Error,
    },
}

#[derive(Debug, Clone, Deserialize)]
pub struct SyncConfig {
    /// Document id from the spreadsheet URL.
    pub spreadsheet_id: String,
    /// Explicit tab name. When absent the tab is derived from the session
    /// year as `Introductions {year}`.
    #[serde(default)]
    pub sheet_name: Option<String>,
    /// 1-based sheet row holding the column titles; data starts on the
    /// next row.
    #[serde(default = "default_header_row")]
    pub header_row: u32,
    #[serde(default)]
    pub columns: ColumnTitles,
    #[serde(default)]
    pub history_match: HistoryMatch,
    #[serde(default)]
    pub legistar: LegistarConfig,
    /// Per-request timeout for both APIs, in seconds.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl SyncConfig {
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        serde_json::from_str(&text).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Tab to sync: the explicit `sheet_name`, or the introductions tab
    /// for the given session year.
    pub fn sheet_name(&self, year: i32) -> String {
        self.sheet_name
            .clone()
            .unwrap_or_else(|| format!("Introductions {year}"))
    }
}

fn default_header_row() -> u32 {
    2
}

fn default_timeout_secs() -> u64 {
    10
}

/// Column titles as they appear in the sheet's header row.
///
/// The gateway resolves each title to a column letter at run time, so
/// columns may be reordered in the sheet without touching the config.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ColumnTitles {
    /// Source column: the file number maintained by hand.
    pub file_no: String,
    pub name: String,
    pub prime_sponsor: String,
    pub summary: String,
    pub co_sponsor_count: String,
    pub co_sponsors_needed: String,
    pub co_sponsors: String,
    pub history: String,
}

impl Default for ColumnTitles {
    fn default() -> Self {
        Self {
            file_no: "File #".into(),
            name: "Name".into(),
            prime_sponsor: "Prime Sponsor".into(),
            summary: "Original Summary".into(),
            co_sponsor_count: "# Current Co-Sponsors".into(),
            co_sponsors_needed: "# Co-Sponsors Needed".into(),
            co_sponsors: "Current Co-Sponsors".into(),
            history: "Bill History".into(),
        }
    }
}

/// Name-equality rule for cross-session history links.
///
/// The source data has no explicit cross-session linking id, so history is
/// matched by name. Names that differ under the selected rule are omitted,
/// never guessed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum HistoryMatch {
    /// Byte-for-byte equality.
    Exact,
    /// ASCII case-insensitive equality, whitespace-trimmed.
    #[default]
    CaseInsensitive,
}

impl HistoryMatch {
    pub fn matches(&self, a: &str, b: &str) -> bool {
        match self {
            Self::Exact => a == b,
            Self::CaseInsensitive => a.trim().eq_ignore_ascii_case(b.trim()),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LegistarConfig {
    /// API root, without the per-jurisdiction segment.
    pub base_url: String,
    /// Legistar client name, e.g. "nyc".
    pub client: String,
}

impl Default for LegistarConfig {
    fn default() -> Self {
        Self {
            base_url: "https://webapi.legistar.com/v1".into(),
            client: "nyc".into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn minimal_config_uses_defaults() {
        let config: SyncConfig =
            serde_json::from_str(r#"{ "spreadsheet_id": "abc123" }"#).unwrap();
        assert_eq!(config.spreadsheet_id, "abc123");
        assert_eq!(config.header_row, 2);
        assert_eq!(config.timeout_secs, 10);
        assert_eq!(config.columns.file_no, "File #");
        assert_eq!(config.columns.history, "Bill History");
        assert_eq!(config.history_match, HistoryMatch::CaseInsensitive);
        assert_eq!(config.legistar.client, "nyc");
    }

    #[test]
    fn full_config_parses() {
        let config: SyncConfig = serde_json::from_str(
            r#"{
                "spreadsheet_id": "abc123",
                "sheet_name": "Bills",
                "header_row": 1,
                "columns": { "file_no": "File Number" },
                "history_match": "exact",
                "legistar": { "base_url": "https://webapi.legistar.com/v1/", "client": "seattle" },
                "timeout_secs": 5
            }"#,
        )
        .unwrap();
        assert_eq!(config.sheet_name(2024), "Bills");
        assert_eq!(config.header_row, 1);
        assert_eq!(config.columns.file_no, "File Number");
        // Titles absent from the config keep their defaults.
        assert_eq!(config.columns.name, "Name");
        assert_eq!(config.history_match, HistoryMatch::Exact);
        assert_eq!(config.legistar.client, "seattle");
        assert_eq!(config.timeout_secs, 5);
    }

    #[test]
    fn sheet_name_derived_from_year() {
        let config: SyncConfig =
            serde_json::from_str(r#"{ "spreadsheet_id": "abc123" }"#).unwrap();
        assert_eq!(config.sheet_name(2024), "Introductions 2024");
    }

    #[test]
    fn case_insensitive_match_trims_and_folds() {
        let m = HistoryMatch::CaseInsensitive;
        assert!(m.matches("Clean Air Act", "clean air act"));
        assert!(m.matches(" Clean Air Act ", "Clean Air Act"));
        assert!(!m.matches("Clean Air Act", "Clean Air Act of 2024"));
    }

    #[test]
    fn exact_match_is_strict() {
        let m = HistoryMatch::Exact;
        assert!(m.matches("Clean Air Act", "Clean Air Act"));
        assert!(!m.matches("Clean Air Act", "clean air act"));
    }
}
