//! Time-based one-time password generation for two-factor login.

use anyhow::{Context, Result};
use std::time::{SystemTime, UNIX_EPOCH};
use totp_rs::{Algorithm, Secret, TOTP};

/// Generate the current 6-digit TOTP code for a base32 seed.
///
/// Standard 30-second window, SHA-1. The code is computed fresh on every
/// call; it is never cached because it expires with the window.
pub fn generate_totp(seed: &str) -> Result<String> {
    let now = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .context("system clock is before the UNIX epoch")?
        .as_secs();
    totp_at(seed, now)
}

/// Generate the code for an explicit UNIX timestamp.
pub fn totp_at(seed: &str, unix_secs: u64) -> Result<String> {
    let normalized = seed.trim().replace(' ', "").to_uppercase();
    let secret = Secret::Encoded(normalized)
        .to_bytes()
        .context("TOTP seed is not valid base32")?;

    let totp = TOTP::new(Algorithm::SHA1, 6, 1, 30, secret).context("invalid TOTP parameters")?;

    Ok(totp.generate(unix_secs))
}

#[cfg(test)]
mod tests {
    use super::*;

    // Base32 of the RFC 6238 reference secret "12345678901234567890".
    const RFC_SEED: &str = "GEZDGNBVGY3TQOJQGEZDGNBVGY3TQOJQ";

    #[test]
    fn matches_rfc6238_vectors() {
        assert_eq!(totp_at(RFC_SEED, 59).unwrap(), "287082");
        assert_eq!(totp_at(RFC_SEED, 1_111_111_111).unwrap(), "050471");
    }

    #[test]
    fn deterministic_within_a_window() {
        let a = totp_at(RFC_SEED, 1_111_111_100).unwrap();
        let b = totp_at(RFC_SEED, 1_111_111_105).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn seed_whitespace_and_case_are_tolerated() {
        let canonical = totp_at(RFC_SEED, 59).unwrap();
        let sloppy = totp_at(" gezd gnbv gy3t qojq gezd gnbv gy3t qojq ", 59).unwrap();
        assert_eq!(canonical, sloppy);
    }

    #[test]
    fn rejects_non_base32_seed() {
        assert!(totp_at("not-base32!!", 59).is_err());
    }
}
