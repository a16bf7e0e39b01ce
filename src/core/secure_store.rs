//! Secure-store adapter: platform keyring in production, in-memory in tests.

use crate::constants;
use anyhow::{anyhow, Context, Result};
use std::collections::HashMap;
use std::sync::Mutex;
use zeroize::Zeroizing;

/// Storage for production-tier keys.
///
/// Lookups degrade to `None` on any backend failure (no platform backend, no
/// entry, access denied), so credential resolution falls through to "no
/// production key" instead of aborting the command.
pub trait SecureStore {
    fn get(&self, key: &str) -> Option<Zeroizing<String>>;
    fn set(&self, key: &str, value: &str) -> Result<()>;
}

/// Platform secret store (Keychain, Secret Service, Windows Credential
/// Manager) under a fixed service name.
pub struct KeyringStore {
    service: String,
}

impl KeyringStore {
    pub fn new() -> Self {
        Self {
            service: constants::SECURE_STORE_SERVICE.to_string(),
        }
    }
}

impl Default for KeyringStore {
    fn default() -> Self {
        Self::new()
    }
}

impl SecureStore for KeyringStore {
    fn get(&self, key: &str) -> Option<Zeroizing<String>> {
        let entry = keyring::Entry::new(&self.service, key).ok()?;
        let value = entry.get_password().ok()?;
        if value.is_empty() {
            None
        } else {
            Some(Zeroizing::new(value))
        }
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        let entry = keyring::Entry::new(&self.service, key)
            .with_context(|| format!("open secure store entry '{}'", key))?;
        entry
            .set_password(value)
            .with_context(|| format!("write secure store entry '{}'", key))?;
        Ok(())
    }
}

/// In-memory item list, substitutable for the platform store in tests.
#[derive(Default)]
pub struct MemoryStore {
    items: Mutex<HashMap<String, String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_items(items: &[(&str, &str)]) -> Self {
        let map = items
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Self {
            items: Mutex::new(map),
        }
    }
}

impl SecureStore for MemoryStore {
    fn get(&self, key: &str) -> Option<Zeroizing<String>> {
        let items = self.items.lock().ok()?;
        items.get(key).cloned().map(Zeroizing::new)
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        let mut items = self
            .items
            .lock()
            .map_err(|_| anyhow!("memory store lock poisoned"))?;
        items.insert(key.to_string(), value.to_string());
        Ok(())
    }
}
