//! Session-bound market data retrieval.

use crate::normalize::{candles_from_reply, greeks_from_reply, quote_from_reply};
use chrono::NaiveDateTime;
use common::broker::{BrokerSession, CandleRequest};
use common::{Candle, Exchange, Interval, MarketError, OptionGreeks, Quote};
use serde_json::Value;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::warn;

/// Wire format for candle range timestamps
const WIRE_TIME_FORMAT: &str = "%Y-%m-%d %H:%M";

/// Retrieves historical series, live quotes and option greeks through an
/// authenticated broker session.
///
/// Holds no state beyond the session handle; there is no caching and no
/// built-in polling. Repeated quote sampling belongs to the caller.
pub struct MarketDataClient {
    broker: Arc<dyn BrokerSession>,
}

impl MarketDataClient {
    /// Bind the client to a broker session
    pub fn new(broker: Arc<dyn BrokerSession>) -> Self {
        Self { broker }
    }

    /// Fetch a historical candle series over an inclusive local-time range.
    ///
    /// The range is passed through unvalidated; an inverted range is the
    /// broker's to answer (typically with an empty series). Any failure
    /// or unusable payload is an empty series, not an error.
    pub async fn get_historical(
        &self,
        exchange: Exchange,
        token: &str,
        interval: Interval,
        from: NaiveDateTime,
        to: NaiveDateTime,
    ) -> Vec<Candle> {
        let request = CandleRequest {
            exchange,
            symbol_token: token.to_string(),
            interval,
            from: from.format(WIRE_TIME_FORMAT).to_string(),
            to: to.format(WIRE_TIME_FORMAT).to_string(),
        };

        match self.broker.get_candle_data(&request).await {
            Ok(reply) => candles_from_reply(&reply),
            Err(e) => {
                warn!(token, "candle fetch failed: {e}");
                Vec::new()
            }
        }
    }

    /// One point-in-time FULL-mode quote.
    ///
    /// Exactly one fetch per call; `None` on any failure with the reason
    /// logged. Polling is the caller's loop, not this client's.
    pub async fn get_live_quote(&self, exchange: Exchange, token: &str) -> Option<Quote> {
        let mut tokens_by_exchange: HashMap<Exchange, Vec<String>> = HashMap::new();
        tokens_by_exchange.insert(exchange, vec![token.to_string()]);

        match self.broker.get_market_data("FULL", &tokens_by_exchange).await {
            Ok(reply) => {
                let quote = quote_from_reply(&reply, exchange, token);
                if quote.is_none() {
                    warn!(token, "market data reply carried no quote");
                }
                quote
            }
            Err(e) => {
                warn!(token, "live quote fetch failed: {e}");
                None
            }
        }
    }

    /// Normalized option greeks for an underlying and expiry code.
    ///
    /// Absent or empty data is an empty sequence.
    pub async fn get_option_greeks(&self, name: &str, expiry_code: &str) -> Vec<OptionGreeks> {
        match self.broker.get_option_greek(name, expiry_code).await {
            Ok(reply) => greeks_from_reply(&reply),
            Err(e) => {
                warn!(name, expiry_code, "option greeks fetch failed: {e}");
                Vec::new()
            }
        }
    }

    /// Order placement passthrough. No pipeline logic; the reply is the
    /// broker's, verbatim.
    pub async fn place_order(&self, params: Value) -> Result<Value, MarketError> {
        Ok(self.broker.place_order(params).await?)
    }
}
