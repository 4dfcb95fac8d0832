//! HTTP implementation of the `BrokerSession` capability.
//!
//! Speaks the SmartAPI-style REST protocol: one login endpoint issuing
//! JWT/refresh/feed tokens, and session-scoped endpoints for candles,
//! quotes, greeks and orders. The access token captured at login is
//! attached to every subsequent call; session-scoped calls before a
//! successful login fail with `NotAuthenticated`.

use async_trait::async_trait;
use common::broker::{BrokerError, BrokerSession, CandleRequest};
use common::types::Exchange;
use reqwest::Client;
use serde_json::{Value, json};
use std::collections::HashMap;
use std::time::Duration;
use tokio::sync::RwLock;
use tracing::{debug, info};

/// Production REST endpoint
pub const DEFAULT_BASE_URL: &str = "https://apiconnect.angelbroking.com";

const LOGIN_PATH: &str = "/rest/auth/angelbroking/user/v1/loginByPassword";
const CANDLE_PATH: &str = "/rest/secure/angelbroking/historical/v1/getCandleData";
const QUOTE_PATH: &str = "/rest/secure/angelbroking/market/v1/quote/";
const GREEK_PATH: &str = "/rest/secure/angelbroking/marketData/v1/optionGreek";
const ORDER_PATH: &str = "/rest/secure/angelbroking/order/v1/placeOrder";

/// REST-backed broker session.
pub struct HttpBroker {
    client: Client,
    base_url: String,
    api_key: String,
    access_token: RwLock<Option<String>>,
}

impl HttpBroker {
    /// Broker client against the production endpoint
    pub fn new(api_key: impl Into<String>) -> Self {
        Self::with_base_url(api_key, DEFAULT_BASE_URL)
    }

    /// Broker client against an explicit endpoint (tests, sandboxes)
    pub fn with_base_url(api_key: impl Into<String>, base_url: impl Into<String>) -> Self {
        let client = Client::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .unwrap_or_default();
        Self {
            client,
            base_url: base_url.into(),
            api_key: api_key.into(),
            access_token: RwLock::new(None),
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// Headers the API requires on every request
    fn base_request(&self, path: &str, api_key: &str) -> reqwest::RequestBuilder {
        self.client
            .post(self.url(path))
            .header("Content-Type", "application/json")
            .header("Accept", "application/json")
            .header("X-UserType", "USER")
            .header("X-SourceID", "WEB")
            .header("X-ClientLocalIP", "127.0.0.1")
            .header("X-ClientPublicIP", "127.0.0.1")
            .header("X-MACAddress", "00:00:00:00:00:00")
            .header("X-PrivateKey", api_key)
    }

    async fn secure_post(&self, path: &str, body: Value) -> Result<Value, BrokerError> {
        let token = {
            let guard = self.access_token.read().await;
            guard.clone().ok_or(BrokerError::NotAuthenticated)?
        };

        let response = self
            .base_request(path, &self.api_key)
            .header("Authorization", format!("Bearer {token}"))
            .json(&body)
            .send()
            .await
            .map_err(|e| BrokerError::Http(e.to_string()))?;

        decode_reply(response).await
    }
}

async fn decode_reply(response: reqwest::Response) -> Result<Value, BrokerError> {
    let status = response.status();
    if !status.is_success() {
        let body = response.text().await.unwrap_or_default();
        return Err(BrokerError::Status(status.as_u16(), body));
    }
    response
        .json()
        .await
        .map_err(|e| BrokerError::Decode(e.to_string()))
}

#[async_trait]
impl BrokerSession for HttpBroker {
    async fn generate_session(
        &self,
        api_key: &str,
        user_id: &str,
        pin: &str,
        totp_code: &str,
    ) -> Result<Value, BrokerError> {
        debug!(user_id, "posting session exchange");

        let response = self
            .base_request(LOGIN_PATH, api_key)
            .json(&json!({
                "clientcode": user_id,
                "password": pin,
                "totp": totp_code,
            }))
            .send()
            .await
            .map_err(|e| BrokerError::Http(e.to_string()))?;

        let reply = decode_reply(response).await?;

        // Capture the access token so session-scoped calls can use it.
        // Token extraction policy (non-empty etc.) belongs to the caller;
        // here any present jwtToken is kept.
        if let Some(jwt) = reply
            .get("data")
            .and_then(|d| d.get("jwtToken"))
            .and_then(Value::as_str)
            .filter(|t| !t.is_empty())
        {
            *self.access_token.write().await = Some(jwt.to_string());
            info!(user_id, "access token captured");
        }

        Ok(reply)
    }

    async fn get_candle_data(&self, params: &CandleRequest) -> Result<Value, BrokerError> {
        let body = serde_json::to_value(params).map_err(|e| BrokerError::Decode(e.to_string()))?;
        self.secure_post(CANDLE_PATH, body).await
    }

    async fn get_market_data(
        &self,
        mode: &str,
        tokens_by_exchange: &HashMap<Exchange, Vec<String>>,
    ) -> Result<Value, BrokerError> {
        let exchange_tokens: HashMap<&str, &Vec<String>> = tokens_by_exchange
            .iter()
            .map(|(ex, tokens)| (ex.as_str(), tokens))
            .collect();
        let body = json!({
            "mode": mode,
            "exchangeTokens": exchange_tokens,
        });
        self.secure_post(QUOTE_PATH, body).await
    }

    async fn get_option_greek(&self, name: &str, expiry_code: &str) -> Result<Value, BrokerError> {
        let body = json!({
            "name": name,
            "expirydate": expiry_code,
        });
        self.secure_post(GREEK_PATH, body).await
    }

    async fn place_order(&self, params: Value) -> Result<Value, BrokerError> {
        self.secure_post(ORDER_PATH, params).await
    }
}
