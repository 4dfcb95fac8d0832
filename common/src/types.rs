//! Core market-data types shared across the pipeline.

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Exchange segment an instrument trades on
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Exchange {
    /// NSE cash equities
    Nse,
    /// NSE futures & options
    Nfo,
    /// BSE cash equities
    Bse,
    /// Multi Commodity Exchange
    Mcx,
    /// Currency derivatives
    Cds,
}

impl Exchange {
    /// Wire code used by the broker API and the scrip master feed
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Nse => "NSE",
            Self::Nfo => "NFO",
            Self::Bse => "BSE",
            Self::Mcx => "MCX",
            Self::Cds => "CDS",
        }
    }

    /// Parse a wire code, `None` for segments this pipeline does not carry
    pub fn from_code(code: &str) -> Option<Self> {
        match code {
            "NSE" => Some(Self::Nse),
            "NFO" => Some(Self::Nfo),
            "BSE" => Some(Self::Bse),
            "MCX" => Some(Self::Mcx),
            "CDS" => Some(Self::Cds),
            _ => None,
        }
    }
}

impl fmt::Display for Exchange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Exchange {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_code(&s.to_uppercase()).ok_or_else(|| format!("unknown exchange segment: {s}"))
    }
}

/// Candle aggregation interval
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Interval {
    /// 1-minute bars
    OneMinute,
    /// 3-minute bars
    ThreeMinute,
    /// 5-minute bars
    FiveMinute,
    /// 10-minute bars
    TenMinute,
    /// 15-minute bars
    FifteenMinute,
    /// 30-minute bars
    ThirtyMinute,
    /// 1-hour bars
    OneHour,
    /// Daily bars
    OneDay,
}

impl Interval {
    /// Wire code expected by the candle endpoint
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::OneMinute => "ONE_MINUTE",
            Self::ThreeMinute => "THREE_MINUTE",
            Self::FiveMinute => "FIVE_MINUTE",
            Self::TenMinute => "TEN_MINUTE",
            Self::FifteenMinute => "FIFTEEN_MINUTE",
            Self::ThirtyMinute => "THIRTY_MINUTE",
            Self::OneHour => "ONE_HOUR",
            Self::OneDay => "ONE_DAY",
        }
    }
}

impl fmt::Display for Interval {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One OHLCV price bar
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Candle {
    /// Bar open time, exchange-local
    pub timestamp: NaiveDateTime,
    /// Open price
    pub open: f64,
    /// High price
    pub high: f64,
    /// Low price
    pub low: f64,
    /// Close price
    pub close: f64,
    /// Traded volume in the bar
    pub volume: f64,
}

/// One point-in-time full-mode quote snapshot
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Quote {
    /// Exchange segment the quote came from
    pub exchange: Exchange,
    /// Broker-assigned instrument token, verbatim
    pub token: String,
    /// Last traded price
    pub ltp: f64,
    /// Session open
    pub open: f64,
    /// Session high
    pub high: f64,
    /// Session low
    pub low: f64,
    /// Previous close
    pub close: f64,
    /// Cumulative traded volume
    pub volume: f64,
}

/// Normalized option greeks row.
///
/// Every field is coerced independently; a source field that is absent or
/// fails numeric parsing becomes 0.0 without affecting its siblings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OptionGreeks {
    /// Strike price in rupees
    pub strike: f64,
    /// Delta
    pub delta: f64,
    /// Gamma
    pub gamma: f64,
    /// Theta
    pub theta: f64,
    /// Vega
    pub vega: f64,
    /// Implied volatility (percent)
    pub implied_volatility: f64,
    /// Traded volume
    pub trade_volume: f64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn exchange_codes_round_trip() {
        for ex in [
            Exchange::Nse,
            Exchange::Nfo,
            Exchange::Bse,
            Exchange::Mcx,
            Exchange::Cds,
        ] {
            assert_eq!(Exchange::from_code(ex.as_str()), Some(ex));
        }
        assert_eq!(Exchange::from_code("XNYS"), None);
    }

    #[test]
    fn exchange_parses_case_insensitively() {
        assert_eq!("nfo".parse::<Exchange>().unwrap(), Exchange::Nfo);
        assert!("nasdaq".parse::<Exchange>().is_err());
    }

    #[test]
    fn interval_wire_codes() {
        assert_eq!(Interval::OneMinute.as_str(), "ONE_MINUTE");
        assert_eq!(Interval::OneDay.as_str(), "ONE_DAY");
        assert_eq!(
            serde_json::to_string(&Interval::FifteenMinute).unwrap(),
            "\"FIFTEEN_MINUTE\""
        );
    }
}
