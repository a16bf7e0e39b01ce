//! Per-mode credential resolution.

use crate::constants;
use crate::core::secure_store::SecureStore;
use crate::models::profile::Profile;
use std::env;
use zeroize::Zeroizing;

/// The two credential tiers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyMode {
    Sandbox,
    Production,
}

impl KeyMode {
    /// Environment variable that overrides stored credentials for this mode.
    pub fn env_override(self) -> &'static str {
        match self {
            KeyMode::Sandbox => constants::ENV_API_KEY,
            KeyMode::Production => constants::ENV_LIVE_API_KEY,
        }
    }
}

impl std::fmt::Display for KeyMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            KeyMode::Sandbox => "sandbox",
            KeyMode::Production => "production",
        })
    }
}

/// Resolve the active key for `mode`. Highest precedence first: the mode's
/// environment override (set and non-empty), then the secure store for
/// production or the profile's plaintext field for sandbox.
///
/// `None` means "no active credential configured", which is not an error;
/// callers decide how to surface it. Modes never substitute for each other.
pub fn resolve(
    profile: &Profile,
    mode: KeyMode,
    store: &dyn SecureStore,
) -> Option<Zeroizing<String>> {
    if let Ok(value) = env::var(mode.env_override()) {
        if !value.is_empty() {
            return Some(Zeroizing::new(value));
        }
    }
    match mode {
        KeyMode::Production => store.get(&profile.live_key_name()),
        KeyMode::Sandbox => profile.sandbox_key.clone(),
    }
}
