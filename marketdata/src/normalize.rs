//! Payload normalization for candle, quote and greeks replies.

use chrono::NaiveDateTime;
use common::{Candle, Exchange, OptionGreeks, Quote};
use serde_json::Value;
use tracing::warn;

/// Timestamp spellings the candle endpoint has been observed to use
const CANDLE_TIME_FORMATS: &[&str] = &["%Y-%m-%dT%H:%M:%S%z", "%Y-%m-%d %H:%M", "%Y-%m-%d %H:%M:%S"];

/// Map a candle reply into an ordered series.
///
/// Rows are positional `[timestamp, open, high, low, close, volume]`.
/// A missing `data` field, an empty array or a wholly malformed payload
/// yields an empty series; individual misshapen rows are skipped. The
/// feed is documented to return chronological order, but that is verified
/// here: an out-of-order series is re-sorted by timestamp with a warning
/// rather than propagated silently.
pub fn candles_from_reply(reply: &Value) -> Vec<Candle> {
    let Some(rows) = reply.get("data").and_then(Value::as_array) else {
        return Vec::new();
    };

    let mut candles: Vec<Candle> = Vec::with_capacity(rows.len());
    let mut skipped = 0usize;
    for row in rows {
        match candle_from_row(row) {
            Some(candle) => candles.push(candle),
            None => skipped += 1,
        }
    }
    if skipped > 0 {
        warn!("skipped {skipped} malformed candle rows");
    }

    if !candles.windows(2).all(|w| w[0].timestamp <= w[1].timestamp) {
        warn!("candle series arrived out of chronological order; re-sorting");
        candles.sort_by_key(|c| c.timestamp);
    }

    candles
}

fn candle_from_row(row: &Value) -> Option<Candle> {
    let fields = row.as_array()?;
    if fields.len() < 6 {
        return None;
    }
    let timestamp = parse_candle_timestamp(fields[0].as_str()?)?;
    Some(Candle {
        timestamp,
        open: fields[1].as_f64()?,
        high: fields[2].as_f64()?,
        low: fields[3].as_f64()?,
        close: fields[4].as_f64()?,
        volume: fields[5].as_f64()?,
    })
}

fn parse_candle_timestamp(raw: &str) -> Option<NaiveDateTime> {
    for fmt in CANDLE_TIME_FORMATS {
        if let Ok(dt) = chrono::DateTime::parse_from_str(raw, fmt) {
            return Some(dt.naive_local());
        }
        if let Ok(dt) = NaiveDateTime::parse_from_str(raw, fmt) {
            return Some(dt);
        }
    }
    None
}

/// Pick the first fetched quote out of a FULL-mode market data reply.
///
/// Returns `None` when the reply carries no usable quote.
pub fn quote_from_reply(reply: &Value, exchange: Exchange, token: &str) -> Option<Quote> {
    let fetched = reply.get("data")?.get("fetched")?.as_array()?;
    let row = fetched.first()?;

    Some(Quote {
        exchange,
        token: row
            .get("symbolToken")
            .and_then(Value::as_str)
            .unwrap_or(token)
            .to_string(),
        ltp: num_or_zero(row.get("ltp")),
        open: num_or_zero(row.get("open")),
        high: num_or_zero(row.get("high")),
        low: num_or_zero(row.get("low")),
        close: num_or_zero(row.get("close")),
        volume: num_or_zero(row.get("tradeVolume")),
    })
}

/// Normalize a greeks reply.
///
/// Every field is coerced independently with a 0.0 default; one
/// unparsable field never drops the row or zeroes its siblings. Strikes
/// arrive rupee-denominated from this endpoint and are kept as-is.
pub fn greeks_from_reply(reply: &Value) -> Vec<OptionGreeks> {
    let Some(rows) = reply.get("data").and_then(Value::as_array) else {
        return Vec::new();
    };

    rows.iter()
        .map(|row| OptionGreeks {
            strike: num_or_zero(row.get("strikePrice")),
            delta: num_or_zero(row.get("delta")),
            gamma: num_or_zero(row.get("gamma")),
            theta: num_or_zero(row.get("theta")),
            vega: num_or_zero(row.get("vega")),
            implied_volatility: num_or_zero(row.get("impliedVolatility")),
            trade_volume: num_or_zero(row.get("tradeVolume")),
        })
        .collect()
}

/// Coerce a JSON value to f64; absent, null or unparsable becomes 0.0
fn num_or_zero(value: Option<&Value>) -> f64 {
    match value {
        Some(Value::Number(n)) => n.as_f64().unwrap_or(0.0),
        Some(Value::String(s)) => s.trim().parse().unwrap_or(0.0),
        _ => 0.0,
    }
}
