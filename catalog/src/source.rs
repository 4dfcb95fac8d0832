//! Scrip master acquisition over HTTP.

use crate::record::{InstrumentRecord, RawScripRow};
use common::{Exchange, MarketError};
use reqwest::Client;
use std::time::Duration;
use tracing::{debug, info};

/// Public scrip master document covering the full tradable universe
pub const DEFAULT_SCRIP_MASTER_URL: &str =
    "https://margincalculator.angelbroking.com/OpenAPI_File/files/OpenAPIScripMaster.json";

/// Segments the pipeline trades in
const KEPT_SEGMENTS: [Exchange; 3] = [Exchange::Nse, Exchange::Nfo, Exchange::Mcx];

/// Fetches and normalizes the scrip master document.
pub struct ScripMasterSource {
    client: Client,
    url: String,
}

impl ScripMasterSource {
    /// Source bound to the default public URL
    pub fn new() -> Self {
        Self::with_url(DEFAULT_SCRIP_MASTER_URL)
    }

    /// Source bound to an explicit URL (tests, mirrors)
    pub fn with_url(url: impl Into<String>) -> Self {
        let client = Client::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .unwrap_or_default();
        Self {
            client,
            url: url.into(),
        }
    }

    /// Fetch one atomic snapshot of the instrument universe.
    ///
    /// Rows outside the NSE/NFO/MCX segments are dropped, matching the
    /// universe the rest of the pipeline trades in. Individual rows that
    /// fail normalization are skipped; a failed request, non-2xx status
    /// or undecodable document is a `CatalogUnavailable` error and leaves
    /// any caller-held snapshot untouched.
    pub async fn fetch(&self) -> Result<Vec<InstrumentRecord>, MarketError> {
        info!("fetching scrip master from {}", self.url);

        let response = self
            .client
            .get(&self.url)
            .send()
            .await
            .map_err(|e| MarketError::CatalogUnavailable(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(MarketError::CatalogUnavailable(format!(
                "scrip master returned HTTP {status}"
            )));
        }

        let rows: Vec<RawScripRow> = response
            .json()
            .await
            .map_err(|e| MarketError::CatalogUnavailable(format!("undecodable document: {e}")))?;

        let total = rows.len();
        let records: Vec<InstrumentRecord> = rows
            .into_iter()
            .filter_map(InstrumentRecord::from_raw)
            .filter(|r| KEPT_SEGMENTS.contains(&r.exchange_segment))
            .collect();

        debug!(
            "scrip master normalized: {} of {total} rows kept",
            records.len()
        );
        Ok(records)
    }
}

impl Default for ScripMasterSource {
    fn default() -> Self {
        Self::new()
    }
}
