//! Post-authentication pipeline context.

use anyhow::Result;
use auth::{Credentials, Session, SessionAuthenticator};
use broker::HttpBroker;
use catalog::{InstrumentCatalog, ScripMasterSource};
use common::broker::BrokerSession;
use marketdata::MarketDataClient;
use std::sync::Arc;
use tracing::info;

/// Everything the pipeline needs after a successful login.
///
/// Owns the session, the market data client bound to it, and the
/// instrument catalog. Created once per run by [`PipelineContext::connect`]
/// and dropped at the end of the caller's scope; there is no explicit
/// logout.
pub struct PipelineContext {
    /// The authenticated session
    pub session: Session,
    /// Market data access bound to the session
    pub market: MarketDataClient,
    /// Instrument master catalog (fetch is explicit via `refresh`)
    pub catalog: InstrumentCatalog,
}

impl PipelineContext {
    /// Authenticate from environment credentials and assemble the context.
    ///
    /// A failed login is an error here: nothing downstream is usable
    /// without an active session.
    pub async fn connect() -> Result<Self> {
        let credentials = Credentials::from_env()?;
        let broker: Arc<dyn BrokerSession> = Arc::new(HttpBroker::new(credentials.api_key.clone()));

        let session = SessionAuthenticator::new(Arc::clone(&broker))
            .authenticate(&credentials)
            .await;

        if let Some(message) = session.failure() {
            anyhow::bail!("authentication failed: {message}");
        }
        info!(user_id = %session.user_id, "pipeline context ready");

        let source = match std::env::var("SCRIP_MASTER_URL") {
            Ok(url) => ScripMasterSource::with_url(url),
            Err(_) => ScripMasterSource::new(),
        };

        Ok(Self {
            session,
            market: MarketDataClient::new(broker),
            catalog: InstrumentCatalog::new(source),
        })
    }
}
