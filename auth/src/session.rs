//! Credential-to-session exchange.

use crate::credentials::Credentials;
use crate::totp::generate_totp;
use chrono::{DateTime, Utc};
use common::broker::BrokerSession;
use serde_json::Value;
use std::sync::Arc;
use tracing::{info, warn};

/// The three tokens a successful session exchange returns.
///
/// All fields are non-empty by construction; see [`SessionTokens::parse`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionTokens {
    /// JWT access token for REST calls
    pub access: String,
    /// Refresh token
    pub refresh: String,
    /// Feed token for streaming endpoints
    pub feed: String,
}

impl SessionTokens {
    /// Extract tokens from the broker's session reply.
    ///
    /// Success requires a `data` object carrying non-empty `jwtToken`,
    /// `refreshToken` and `feedToken` fields; anything else is reported
    /// as a message describing what was missing.
    pub fn parse(reply: &Value) -> Result<Self, String> {
        let data = reply
            .get("data")
            .filter(|d| d.is_object())
            .ok_or_else(|| reply_failure_message(reply))?;

        let access = non_empty_str(data, "jwtToken")?;
        let refresh = non_empty_str(data, "refreshToken")?;
        let feed = non_empty_str(data, "feedToken")?;

        Ok(Self {
            access,
            refresh,
            feed,
        })
    }
}

fn non_empty_str(data: &Value, field: &str) -> Result<String, String> {
    match data.get(field).and_then(Value::as_str) {
        Some(s) if !s.is_empty() => Ok(s.to_string()),
        _ => Err(format!("session reply is missing {field}")),
    }
}

/// Prefer the broker's own message when the reply carries one
fn reply_failure_message(reply: &Value) -> String {
    reply
        .get("message")
        .and_then(Value::as_str)
        .filter(|m| !m.is_empty())
        .map(|m| format!("broker rejected login: {m}"))
        .unwrap_or_else(|| "session reply has no data block".to_string())
}

/// Outcome of one authentication attempt
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionState {
    /// Session is usable; tokens are valid until broker-side expiry
    Active(SessionTokens),
    /// Login failed; the message is the diagnostic for the caller
    Failed(String),
}

/// An authenticated (or failed) broker session.
///
/// Created by one `authenticate` call and immutable afterwards. Downstream
/// components must check [`Session::is_active`] before using the handle.
#[derive(Debug, Clone)]
pub struct Session {
    /// Authentication outcome
    pub state: SessionState,
    /// The user id the session belongs to
    pub user_id: String,
    /// When the exchange completed
    pub issued_at: DateTime<Utc>,
}

impl Session {
    fn active(user_id: &str, tokens: SessionTokens) -> Self {
        Self {
            state: SessionState::Active(tokens),
            user_id: user_id.to_string(),
            issued_at: Utc::now(),
        }
    }

    fn failed(user_id: &str, message: String) -> Self {
        Self {
            state: SessionState::Failed(message),
            user_id: user_id.to_string(),
            issued_at: Utc::now(),
        }
    }

    /// Whether the session can be used for downstream calls
    pub fn is_active(&self) -> bool {
        matches!(self.state, SessionState::Active(_))
    }

    /// Session tokens, if authenticated
    pub fn tokens(&self) -> Option<&SessionTokens> {
        match &self.state {
            SessionState::Active(tokens) => Some(tokens),
            SessionState::Failed(_) => None,
        }
    }

    /// Failure diagnostic, if the login was rejected
    pub fn failure(&self) -> Option<&str> {
        match &self.state {
            SessionState::Active(_) => None,
            SessionState::Failed(msg) => Some(msg),
        }
    }
}

/// Exchanges credentials for a [`Session`].
pub struct SessionAuthenticator {
    broker: Arc<dyn BrokerSession>,
}

impl SessionAuthenticator {
    /// Bind the authenticator to a broker implementation
    pub fn new(broker: Arc<dyn BrokerSession>) -> Self {
        Self { broker }
    }

    /// Perform exactly one login attempt.
    ///
    /// The TOTP code is computed at call time. Every failure mode (bad
    /// credentials, stale code, transport fault, malformed reply) comes
    /// back as a `Failed` session rather than an error, and is never
    /// retried here: automated retries against a rejected login risk an
    /// account lockout.
    pub async fn authenticate(&self, credentials: &Credentials) -> Session {
        let code = match generate_totp(&credentials.totp_seed) {
            Ok(code) => code,
            Err(e) => {
                warn!("TOTP generation failed: {e:#}");
                return Session::failed(&credentials.user_id, format!("TOTP generation failed: {e}"));
            }
        };

        let reply = match self
            .broker
            .generate_session(
                &credentials.api_key,
                &credentials.user_id,
                &credentials.pin,
                &code,
            )
            .await
        {
            Ok(reply) => reply,
            Err(e) => {
                warn!(user_id = %credentials.user_id, "session exchange failed: {e}");
                return Session::failed(&credentials.user_id, format!("session exchange failed: {e}"));
            }
        };

        match SessionTokens::parse(&reply) {
            Ok(tokens) => {
                info!(user_id = %credentials.user_id, "session established");
                Session::active(&credentials.user_id, tokens)
            }
            Err(message) => {
                warn!(user_id = %credentials.user_id, "login rejected: {message}");
                Session::failed(&credentials.user_id, message)
            }
        }
    }
}
