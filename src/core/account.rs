//! Seam for the remote account-metadata fetch.
//!
//! The HTTP call that turns an API key into account metadata lives outside
//! this crate. Commands depend on this trait so a real client can be wired
//! in (or a fake in tests) without touching credential handling.

use anyhow::Result;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AccountInfo {
    pub account_id: String,
    pub display_name: String,
}

pub trait AccountLookup {
    /// Fetch metadata for the account that owns `api_key`. `Ok(None)` means
    /// no lookup backend is available, not that the key is invalid.
    fn lookup(&self, api_key: &str) -> Result<Option<AccountInfo>>;
}

/// Default wiring when no remote client is configured.
pub struct OfflineLookup;

impl AccountLookup for OfflineLookup {
    fn lookup(&self, _api_key: &str) -> Result<Option<AccountInfo>> {
        Ok(None)
    }
}
