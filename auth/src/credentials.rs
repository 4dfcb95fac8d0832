//! Broker credentials, loaded from the environment.

use anyhow::{Context, Result};
use std::fmt;

/// The four secrets needed to open a broker session.
///
/// Immutable once loaded. The `Debug` impl redacts everything except a
/// short API-key prefix so the struct can appear in logs without leaking
/// secrets.
#[derive(Clone)]
pub struct Credentials {
    /// Broker application API key
    pub api_key: String,
    /// Trading account user id
    pub user_id: String,
    /// Login PIN
    pub pin: String,
    /// Base32 TOTP seed for two-factor login
    pub totp_seed: String,
}

impl Credentials {
    /// Load credentials from the environment (a `.env` file is honored).
    ///
    /// Expects `BROKER_API_KEY`, `BROKER_USER_ID`, `BROKER_PIN` and
    /// `BROKER_TOTP_SEED`.
    pub fn from_env() -> Result<Self> {
        dotenv::dotenv().ok();

        Ok(Self {
            api_key: require_var("BROKER_API_KEY")?,
            user_id: require_var("BROKER_USER_ID")?,
            pin: require_var("BROKER_PIN")?,
            totp_seed: require_var("BROKER_TOTP_SEED")?,
        })
    }
}

fn require_var(name: &str) -> Result<String> {
    let value = std::env::var(name).with_context(|| format!("{name} is not set"))?;
    let value = value.trim().to_string();
    if value.is_empty() {
        anyhow::bail!("{name} is empty");
    }
    Ok(value)
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let prefix_len = self.api_key.len().min(4);
        f.debug_struct("Credentials")
            .field("api_key", &format!("{}...", &self.api_key[..prefix_len]))
            .field("user_id", &self.user_id)
            .field("pin", &"<redacted>")
            .field("totp_seed", &"<redacted>")
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn debug_redacts_secrets() {
        let creds = Credentials {
            api_key: "abcd1234".to_string(),
            user_id: "A123456".to_string(),
            pin: "9999".to_string(),
            totp_seed: "JBSWY3DPEHPK3PXP".to_string(),
        };
        let rendered = format!("{creds:?}");
        assert!(rendered.contains("abcd..."));
        assert!(!rendered.contains("9999"));
        assert!(!rendered.contains("JBSWY3DPEHPK3PXP"));
    }
}
