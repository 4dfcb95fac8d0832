//! Scrip master row normalization.

use chrono::NaiveDate;
use common::Exchange;
use serde::{Deserialize, Serialize};

/// One normalized instrument from the scrip master feed.
///
/// `token` is an opaque broker-assigned id kept as a string: the raw feed
/// contains tokens with leading zeros and non-numeric characters that
/// must round-trip verbatim.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InstrumentRecord {
    /// Trading symbol (e.g. `NIFTY27MAR2523400CE`)
    pub symbol: String,
    /// Broker instrument token, verbatim
    pub token: String,
    /// Exchange segment
    pub exchange_segment: Exchange,
    /// Underlying name (e.g. `NIFTY`)
    pub name: String,
    /// Strike price in rupees; 0.0 for non-option rows
    pub strike: f64,
    /// Contract expiry, calendar-date granularity; `None` for perpetual rows
    pub expiry: Option<NaiveDate>,
}

/// Raw scrip master row as published by the broker (everything a string)
#[derive(Debug, Deserialize)]
pub(crate) struct RawScripRow {
    #[serde(default)]
    pub symbol: String,
    #[serde(default)]
    pub token: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub expiry: String,
    #[serde(default)]
    pub strike: String,
    #[serde(default)]
    pub exch_seg: String,
}

impl InstrumentRecord {
    /// Normalize a raw row; `None` when the segment is not one we carry.
    ///
    /// Strike convention: the feed publishes strikes pre-scaled by 100
    /// (paise). Everything inside the pipeline is rupee-denominated, so
    /// the conversion happens here and nowhere else. The feed's `-1`
    /// no-strike sentinel (and any non-positive value) normalizes to 0.0.
    pub(crate) fn from_raw(raw: RawScripRow) -> Option<Self> {
        let exchange_segment = Exchange::from_code(raw.exch_seg.trim())?;

        let paise = raw.strike.trim().parse::<f64>().unwrap_or(0.0);
        let strike = if paise > 0.0 { paise / 100.0 } else { 0.0 };

        Some(Self {
            symbol: raw.symbol,
            token: raw.token,
            exchange_segment,
            name: raw.name,
            strike,
            expiry: parse_expiry(&raw.expiry),
        })
    }
}

/// Expiry date formats observed across the feed
const EXPIRY_FORMATS: &[&str] = &["%d%b%Y", "%Y-%m-%d", "%d-%m-%Y", "%d-%b-%Y"];

/// Parse a scrip master expiry string.
///
/// The feed mixes formats across rows (`27MAR2025`, `2025-03-27`, ...);
/// every known format is tried and the result is reduced to calendar-date
/// granularity. Empty or unparsable strings yield `None`.
pub fn parse_expiry(raw: &str) -> Option<NaiveDate> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }
    EXPIRY_FORMATS
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(raw, fmt).ok())
}

/// Render a strike for presentation: whole values drop the fraction.
pub fn display_strike(strike: f64) -> String {
    if strike.fract() == 0.0 {
        format!("{}", strike as i64)
    } else {
        format!("{strike}")
    }
}
