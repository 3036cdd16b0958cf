//! HTTP client for the Legistar Web API.
//!
//! All lookups are OData GETs authenticated by a `token` query parameter.
//! Responses are JSON. Result pages are capped server-side, so anything
//! unbounded (the name search) pages with `$top`/`$skip`.

use std::collections::HashSet;
use std::time::Duration;

use legisync_core::config::{HistoryMatch, LegistarConfig};
use legisync_core::{BillIdentifier, BillRecord};
use serde::de::DeserializeOwned;
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::matter::{Matter, MatterSponsor};

/// Legistar caps OData pages at 1000 rows.
const PAGE_SIZE: usize = 1000;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("no matter found for {0}")]
    NotFound(BillIdentifier),
    #[error("API request failed: {0}")]
    Unavailable(#[from] reqwest::Error),
    #[error("API returned {status}: {body}")]
    Server { status: u16, body: String },
}

/// Client for one Legistar jurisdiction.
pub struct LegistarClient {
    http: reqwest::Client,
    base_url: String,
    /// Per-jurisdiction path segment, e.g. "nyc".
    client: String,
    token: String,
}

impl LegistarClient {
    /// Build a client with a bounded per-request timeout.
    pub fn new(
        config: &LegistarConfig,
        token: String,
        timeout: Duration,
    ) -> Result<Self, ApiError> {
        let http = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            http,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            client: config.client.clone(),
            token,
        })
    }

    /// Look up one bill by file number and assemble its record.
    ///
    /// The returned record has an empty `history`; cross-session links are
    /// a separate [`find_related`](Self::find_related) call.
    pub async fn fetch(&self, id: &BillIdentifier) -> Result<BillRecord, ApiError> {
        let file = id.to_string();
        let filter = format!("MatterFile eq '{}'", odata_quote(&file));
        let matters: Vec<Matter> = self.get_json("matters", &[("$filter", &filter)]).await?;

        let matter = matters
            .into_iter()
            .find(|m| m.file.as_deref() == Some(file.as_str()))
            .ok_or_else(|| ApiError::NotFound(id.clone()))?;

        let sponsors = self.sponsors(matter.id).await?;
        Ok(record_from(id, matter, sponsors))
    }

    /// Find file numbers of same-named bills from other sessions.
    ///
    /// The API is queried with an exact-name filter; the configured
    /// `policy` then re-checks each hit client-side, `own` is excluded,
    /// and matters whose file number does not parse are dropped (they
    /// cannot be linked). Results come back oldest session first.
    pub async fn find_related(
        &self,
        name: &str,
        own: &BillIdentifier,
        policy: HistoryMatch,
    ) -> Result<Vec<BillIdentifier>, ApiError> {
        if name.trim().is_empty() {
            return Ok(Vec::new());
        }

        let filter = format!("MatterName eq '{}'", odata_quote(name));
        let mut related = Vec::new();
        let mut skip = 0usize;
        loop {
            let top = PAGE_SIZE.to_string();
            let skip_param = skip.to_string();
            let page: Vec<Matter> = self
                .get_json(
                    "matters",
                    &[("$filter", &filter), ("$top", &top), ("$skip", &skip_param)],
                )
                .await?;
            let page_len = page.len();
            related.extend(collect_related(page, name, own, policy));
            if page_len < PAGE_SIZE {
                break;
            }
            skip += page_len;
        }

        related.sort();
        related.dedup();
        debug!(name, count = related.len(), "related bills resolved");
        Ok(related)
    }

    /// Sponsor list for a matter, in signing order.
    async fn sponsors(&self, matter_id: i64) -> Result<Vec<MatterSponsor>, ApiError> {
        let path = format!("matters/{matter_id}/sponsors");
        let mut sponsors: Vec<MatterSponsor> = self.get_json(&path, &[]).await?;
        sponsors.sort_by_key(|s| s.sequence);
        Ok(sponsors)
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, &str)],
    ) -> Result<T, ApiError> {
        let url = format!("{}/{}/{}", self.base_url, self.client, path);
        info!(url = %url, "GET");
        let resp = self
            .http
            .get(&url)
            .query(&[("token", self.token.as_str())])
            .query(query)
            .send()
            .await?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(ApiError::Server {
                status: status.as_u16(),
                body,
            });
        }
        Ok(resp.json().await?)
    }
}

/// Escape a string literal for an OData filter: single quotes double.
fn odata_quote(s: &str) -> String {
    s.replace('\'', "''")
}

/// Assemble a record from a matter and its sorted sponsor rows.
fn record_from(id: &BillIdentifier, matter: Matter, sponsors: Vec<MatterSponsor>) -> BillRecord {
    let prime_sponsor = sponsors
        .iter()
        .find(|s| s.sequence == 0)
        .and_then(|s| s.name.clone());
    if prime_sponsor.is_none() {
        warn!(file = %id, "no prime sponsor on matter");
    }

    // Signing order, deduplicated by name.
    let mut seen = HashSet::new();
    let co_sponsors: Vec<String> = sponsors
        .into_iter()
        .filter(|s| s.sequence != 0)
        .filter_map(|s| s.name)
        .filter(|name| seen.insert(name.clone()))
        .collect();

    BillRecord {
        matter_id: matter.id,
        file_no: id.clone(),
        name: matter.name.unwrap_or_default(),
        prime_sponsor,
        summary: matter.summary.unwrap_or_default(),
        co_sponsors,
        history: Vec::new(),
    }
}

/// Client-side matching step for one result page: keep matters whose name
/// matches under `policy`, excluding `own` and unparsable file numbers.
fn collect_related(
    page: Vec<Matter>,
    name: &str,
    own: &BillIdentifier,
    policy: HistoryMatch,
) -> Vec<BillIdentifier> {
    page.into_iter()
        .filter_map(|m| {
            let matter_name = m.name?;
            if !policy.matches(&matter_name, name) {
                return None;
            }
            let file = m.file?;
            let id: BillIdentifier = match file.parse() {
                Ok(id) => id,
                Err(_) => {
                    debug!(file = %file, "unparsable file number in search results");
                    return None;
                }
            };
            (&id != own).then_some(id)
        })
        .collect()
}
