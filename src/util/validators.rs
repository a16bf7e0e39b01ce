//! Validation for user-supplied credential material.

use crate::constants;
use anyhow::{bail, Result};

/// Check the shape of a user-supplied API key.
///
/// Error messages never include the provided value; a malformed secret is
/// still a secret.
pub fn validate_api_key(key: &str) -> Result<()> {
    if key.is_empty() {
        bail!("API key is empty");
    }
    if !key.chars().all(|c| c.is_ascii_alphanumeric() || c == '_') {
        bail!("API key contains unexpected characters");
    }
    if key.len() < constants::MIN_API_KEY_LENGTH {
        bail!("API key is too short");
    }
    if !(key.starts_with("sk_") || key.starts_with("rk_")) {
        bail!("API key must start with 'sk_' or 'rk_'");
    }
    let rest = &key[3..];
    if !(rest.starts_with("test_") || rest.starts_with("live_")) {
        bail!("API key must carry a 'test_' or 'live_' mode segment");
    }
    Ok(())
}

/// Whether a key belongs to the production (live-mode) tier.
pub fn is_live_key(key: &str) -> bool {
    key.starts_with("sk_live_") || key.starts_with("rk_live_")
}
