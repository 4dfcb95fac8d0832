//! Error taxonomy for the pipeline.
//!
//! Expected outcomes are modeled as values, not errors: a failed login is
//! a `Session` in the failed state, an empty data window is an empty
//! `Vec`, an unmatched strike level keeps its slot with no matches. The
//! variants here cover the cases where the caller genuinely cannot
//! proceed.

use crate::broker::BrokerError;
use thiserror::Error;

/// Pipeline-level failures
#[derive(Debug, Error)]
pub enum MarketError {
    /// Login rejected or the session exchange never completed
    #[error("authentication failed: {0}")]
    AuthenticationFailed(String),

    /// Scrip master fetch failed; a previously loaded snapshot stays valid
    #[error("instrument catalog unavailable: {0}")]
    CatalogUnavailable(String),

    /// Transport-level broker failure
    #[error(transparent)]
    Broker(#[from] BrokerError),
}
