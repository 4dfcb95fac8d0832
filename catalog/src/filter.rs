//! Predicate filtering over catalog snapshots.

use crate::record::InstrumentRecord;
use chrono::NaiveDate;
use common::Exchange;

/// Strike comparisons tolerate float noise from the paise conversion
const STRIKE_TOLERANCE: f64 = 1e-6;

/// Predicate specification over a catalog snapshot.
///
/// Every field is optional; unset fields do not constrain. An empty
/// filter is the identity operation. Filtering never narrows beyond what
/// the predicates say: duplicate (symbol, segment, expiry) rows in the
/// raw feed are all preserved.
#[derive(Debug, Clone, Default)]
pub struct InstrumentFilter {
    segments: Vec<Exchange>,
    name: Option<String>,
    expiry: Option<NaiveDate>,
    strikes: Vec<f64>,
    token: Option<String>,
}

impl InstrumentFilter {
    /// Empty filter (matches every record)
    pub fn new() -> Self {
        Self::default()
    }

    /// Restrict to a set of exchange segments
    pub fn segments(mut self, segments: impl IntoIterator<Item = Exchange>) -> Self {
        self.segments = segments.into_iter().collect();
        self
    }

    /// Restrict to an underlying name (exact match)
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Restrict to one expiry date
    pub fn expiry(mut self, expiry: NaiveDate) -> Self {
        self.expiry = Some(expiry);
        self
    }

    /// Restrict to a set of strike prices (rupees)
    pub fn strikes(mut self, strikes: impl IntoIterator<Item = f64>) -> Self {
        self.strikes = strikes.into_iter().collect();
        self
    }

    /// Restrict to one instrument token (verbatim match)
    pub fn token(mut self, token: impl Into<String>) -> Self {
        self.token = Some(token.into());
        self
    }

    /// Whether no predicate is set
    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
            && self.name.is_none()
            && self.expiry.is_none()
            && self.strikes.is_empty()
            && self.token.is_none()
    }

    /// Whether a record satisfies every set predicate
    pub fn matches(&self, record: &InstrumentRecord) -> bool {
        if !self.segments.is_empty() && !self.segments.contains(&record.exchange_segment) {
            return false;
        }
        if let Some(name) = &self.name {
            if record.name != *name {
                return false;
            }
        }
        if let Some(expiry) = self.expiry {
            if record.expiry != Some(expiry) {
                return false;
            }
        }
        if !self.strikes.is_empty()
            && !self
                .strikes
                .iter()
                .any(|s| (record.strike - s).abs() < STRIKE_TOLERANCE)
        {
            return false;
        }
        if let Some(token) = &self.token {
            if record.token != *token {
                return false;
            }
        }
        true
    }
}

/// Apply a filter to a snapshot, returning matching records in order.
///
/// The input is never mutated; callers get an owned, possibly empty copy.
pub fn filter(records: &[InstrumentRecord], spec: &InstrumentFilter) -> Vec<InstrumentRecord> {
    records
        .iter()
        .filter(|r| spec.matches(r))
        .cloned()
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(
        symbol: &str,
        token: &str,
        segment: Exchange,
        name: &str,
        strike: f64,
        expiry: Option<NaiveDate>,
    ) -> InstrumentRecord {
        InstrumentRecord {
            symbol: symbol.to_string(),
            token: token.to_string(),
            exchange_segment: segment,
            name: name.to_string(),
            strike,
            expiry,
        }
    }

    fn sample_snapshot() -> Vec<InstrumentRecord> {
        let march = NaiveDate::from_ymd_opt(2025, 3, 27);
        let april = NaiveDate::from_ymd_opt(2025, 4, 3);
        vec![
            record("NIFTY27MAR2523400CE", "51120", Exchange::Nfo, "NIFTY", 23400.0, march),
            record("NIFTY27MAR2523400PE", "51121", Exchange::Nfo, "NIFTY", 23400.0, march),
            record("NIFTY03APR2523400CE", "60231", Exchange::Nfo, "NIFTY", 23400.0, april),
            record("BANKNIFTY27MAR2550000CE", "71001", Exchange::Nfo, "BANKNIFTY", 50000.0, march),
            record("SBIN-EQ", "3045", Exchange::Nse, "SBIN", 0.0, None),
            record("GOLD-CONTRACT", "00531", Exchange::Mcx, "GOLD", 0.0, None),
        ]
    }

    #[test]
    fn empty_filter_is_identity() {
        let snapshot = sample_snapshot();
        let spec = InstrumentFilter::new();
        assert!(spec.is_empty());
        assert_eq!(filter(&snapshot, &spec), snapshot);
    }

    #[test]
    fn segment_filter_keeps_all_matches_in_order() {
        let snapshot = sample_snapshot();
        let spec = InstrumentFilter::new().segments([Exchange::Nfo]);
        let out = filter(&snapshot, &spec);
        assert_eq!(out.len(), 4);
        assert!(out.iter().all(|r| r.exchange_segment == Exchange::Nfo));
        // order preserved
        assert_eq!(out[0].token, "51120");
        assert_eq!(out[3].token, "71001");
    }

    #[test]
    fn combined_predicates_narrow_without_deduping() {
        let snapshot = sample_snapshot();
        let spec = InstrumentFilter::new()
            .name("NIFTY")
            .expiry(NaiveDate::from_ymd_opt(2025, 3, 27).unwrap())
            .strikes([23400.0]);
        let out = filter(&snapshot, &spec);
        // CE and PE at the same strike/expiry both survive
        assert_eq!(out.len(), 2);
    }

    #[test]
    fn token_filter_matches_verbatim_including_leading_zeros() {
        let snapshot = sample_snapshot();
        let out = filter(&snapshot, &InstrumentFilter::new().token("00531"));
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].token, "00531");
        // a numerically equal token string does not match
        assert!(filter(&snapshot, &InstrumentFilter::new().token("531")).is_empty());
    }

    #[test]
    fn no_match_returns_empty_not_error() {
        let snapshot = sample_snapshot();
        let spec = InstrumentFilter::new().name("FINNIFTY");
        assert!(filter(&snapshot, &spec).is_empty());
    }

    #[test]
    fn filtering_does_not_mutate_the_snapshot() {
        let snapshot = sample_snapshot();
        let before = snapshot.clone();
        let _ = filter(&snapshot, &InstrumentFilter::new().segments([Exchange::Nse]));
        assert_eq!(snapshot, before);
    }
}
