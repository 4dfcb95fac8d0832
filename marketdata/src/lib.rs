//! Historical and live data retrieval through an authenticated session.
//!
//! Normalizes the broker's loosely-typed payloads into the uniform
//! candle/quote/greeks shapes. Data absence is a normal outcome here:
//! an empty window, a non-trading day or a transport hiccup all come back
//! as empty results, never as errors.

pub mod client;
pub mod normalize;

pub use client::MarketDataClient;
pub use normalize::{candles_from_reply, greeks_from_reply, quote_from_reply};
