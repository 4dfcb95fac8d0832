//! The broker capability surface the pipeline is built against.
//!
//! The concrete wire protocol belongs to the implementing crate; consumers
//! only see loosely-typed JSON replies and normalize them into the shapes
//! in [`crate::types`].

use crate::types::{Exchange, Interval};
use async_trait::async_trait;
use serde::Serialize;
use serde_json::Value;
use std::collections::HashMap;
use thiserror::Error;

/// Transport-level broker failures
#[derive(Debug, Error)]
pub enum BrokerError {
    /// Request never completed (DNS, connect, timeout)
    #[error("broker transport error: {0}")]
    Http(String),
    /// Broker answered with a non-success HTTP status
    #[error("broker returned HTTP {0}: {1}")]
    Status(u16, String),
    /// Reply body was not the expected JSON shape
    #[error("malformed broker payload: {0}")]
    Decode(String),
    /// A session-scoped call was made without an active session
    #[error("no active broker session")]
    NotAuthenticated,
}

/// Historical candle request, serialized with the broker's field names
#[derive(Debug, Clone, Serialize)]
pub struct CandleRequest {
    /// Exchange segment
    pub exchange: Exchange,
    /// Instrument token, verbatim
    #[serde(rename = "symboltoken")]
    pub symbol_token: String,
    /// Bar interval
    pub interval: Interval,
    /// Inclusive range start, `YYYY-MM-DD HH:MM`
    #[serde(rename = "fromdate")]
    pub from: String,
    /// Inclusive range end, `YYYY-MM-DD HH:MM`
    #[serde(rename = "todate")]
    pub to: String,
}

/// Session-scoped broker operations.
///
/// `generate_session` must succeed before any of the other calls are
/// usable; implementations are expected to reject session-scoped calls
/// with [`BrokerError::NotAuthenticated`] until then.
#[async_trait]
pub trait BrokerSession: Send + Sync {
    /// Exchange credentials plus a fresh TOTP code for session tokens
    async fn generate_session(
        &self,
        api_key: &str,
        user_id: &str,
        pin: &str,
        totp_code: &str,
    ) -> Result<Value, BrokerError>;

    /// Fetch historical candles
    async fn get_candle_data(&self, params: &CandleRequest) -> Result<Value, BrokerError>;

    /// Fetch live market data for a set of tokens grouped by exchange
    async fn get_market_data(
        &self,
        mode: &str,
        tokens_by_exchange: &HashMap<Exchange, Vec<String>>,
    ) -> Result<Value, BrokerError>;

    /// Fetch option greeks for an underlying and expiry code
    async fn get_option_greek(&self, name: &str, expiry_code: &str) -> Result<Value, BrokerError>;

    /// Place an order. Pure passthrough, no pipeline logic.
    async fn place_order(&self, params: Value) -> Result<Value, BrokerError>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Exchange, Interval};

    #[test]
    fn candle_request_uses_broker_field_names() {
        let req = CandleRequest {
            exchange: Exchange::Nfo,
            symbol_token: "51120".to_string(),
            interval: Interval::OneMinute,
            from: "2025-03-21 09:15".to_string(),
            to: "2025-03-21 15:30".to_string(),
        };
        let v = serde_json::to_value(&req).unwrap();
        assert_eq!(v["exchange"], "NFO");
        assert_eq!(v["symboltoken"], "51120");
        assert_eq!(v["interval"], "ONE_MINUTE");
        assert_eq!(v["fromdate"], "2025-03-21 09:15");
        assert_eq!(v["todate"], "2025-03-21 15:30");
    }
}
