//! Instrument master catalog: acquisition, normalization and filtering.
//!
//! The broker publishes its entire tradable universe as one JSON document
//! (tens of thousands of rows). This crate fetches that document, reduces
//! each row to an [`InstrumentRecord`], and exposes read-only filtered
//! views over an atomically replaced snapshot.

pub mod filter;
pub mod record;
pub mod source;

pub use filter::{InstrumentFilter, filter};
pub use record::{InstrumentRecord, display_strike, parse_expiry};
pub use source::{DEFAULT_SCRIP_MASTER_URL, ScripMasterSource};

use common::MarketError;
use tracing::info;

/// Snapshot holder for the instrument master list.
///
/// `refresh` replaces the snapshot atomically: on a failed fetch the
/// previously loaded snapshot (if any) remains authoritative. There is no
/// automatic refresh; callers decide when to re-fetch.
pub struct InstrumentCatalog {
    source: ScripMasterSource,
    snapshot: Option<Vec<InstrumentRecord>>,
}

impl InstrumentCatalog {
    /// Create an empty catalog bound to a scrip master source
    pub fn new(source: ScripMasterSource) -> Self {
        Self {
            source,
            snapshot: None,
        }
    }

    /// Fetch a fresh snapshot, returning the number of records loaded.
    ///
    /// The stored snapshot is only swapped after the fetch fully
    /// succeeds, so concurrent-reader-style callers never observe a
    /// partially updated sequence.
    pub async fn refresh(&mut self) -> Result<usize, MarketError> {
        let records = self.source.fetch().await?;
        let count = records.len();
        self.snapshot = Some(records);
        info!("instrument catalog refreshed: {count} records");
        Ok(count)
    }

    /// The current snapshot, if one has been loaded
    pub fn snapshot(&self) -> Option<&[InstrumentRecord]> {
        self.snapshot.as_deref()
    }

    /// Whether a snapshot has been loaded
    pub fn is_loaded(&self) -> bool {
        self.snapshot.is_some()
    }

    /// Filtered read-only view over the current snapshot.
    ///
    /// Returns an empty sequence when no snapshot is loaded.
    pub fn select(&self, spec: &InstrumentFilter) -> Vec<InstrumentRecord> {
        match &self.snapshot {
            Some(records) => filter(records, spec),
            None => Vec::new(),
        }
    }
}
