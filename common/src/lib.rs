//! Shared types for the market-data access pipeline.
//!
//! Holds the domain vocabulary (exchanges, bar intervals, candles, quotes,
//! greeks), the `BrokerSession` capability every networked component is
//! built against, and the error taxonomy.

pub mod broker;
pub mod errors;
pub mod types;

pub use broker::{BrokerError, BrokerSession, CandleRequest};
pub use errors::MarketError;
pub use types::{Candle, Exchange, Interval, OptionGreeks, Quote};
