//! Profile data model: one named credential bundle and its on-disk form.

use crate::constants;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use zeroize::Zeroizing;

/// Output color preference recorded per profile.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ColorPreference {
    #[default]
    Auto,
    Always,
    Never,
}

impl std::fmt::Display for ColorPreference {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            ColorPreference::Auto => "auto",
            ColorPreference::Always => "always",
            ColorPreference::Never => "never",
        })
    }
}

/// One named credential bundle as held in memory.
///
/// Both key tiers are `Zeroizing<String>`: wiped on drop and, since the type
/// carries no serde impls, unreachable from the plaintext serialization path.
/// `production_key` is only ever populated from the secure store or an
/// environment override, never from the profiles file.
#[derive(Debug, Clone, Default)]
pub struct Profile {
    pub project_name: String,
    pub account_id: Option<String>,
    pub display_name: Option<String>,
    pub device_name: Option<String>,
    pub color: Option<ColorPreference>,
    pub sandbox_key: Option<Zeroizing<String>>,
    pub production_key: Option<Zeroizing<String>>,
    pub sandbox_key_expires_at: Option<NaiveDate>,
    pub production_key_expires_at: Option<NaiveDate>,
}

impl Profile {
    pub fn new(project_name: impl Into<String>) -> Self {
        Self {
            project_name: project_name.into(),
            ..Self::default()
        }
    }

    /// Secure-store key for this profile's production credential.
    pub fn live_key_name(&self) -> String {
        format!("{}.{}", self.project_name, constants::LIVE_KEY_SUFFIX)
    }
}

/// The serializable form of one `[project]` block in the profiles file.
///
/// Holds the sandbox tier and descriptive metadata only. There is no
/// production-key field on this type, so a live credential cannot reach the
/// plaintext file.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StoredProfile {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub account_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub device_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<ColorPreference>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub test_mode_api_key: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub test_mode_key_expires_at: Option<NaiveDate>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub live_mode_key_expires_at: Option<NaiveDate>,
}

impl From<&Profile> for StoredProfile {
    fn from(profile: &Profile) -> Self {
        Self {
            account_id: profile.account_id.clone(),
            display_name: profile.display_name.clone(),
            device_name: profile.device_name.clone(),
            color: profile.color,
            test_mode_api_key: profile.sandbox_key.as_ref().map(|k| k.as_str().to_owned()),
            test_mode_key_expires_at: profile.sandbox_key_expires_at,
            live_mode_key_expires_at: profile.production_key_expires_at,
        }
    }
}

impl StoredProfile {
    /// Rehydrate the in-memory form. The production key is left unset; it is
    /// resolved separately through the secure store or an env override.
    pub fn into_profile(self, project_name: &str) -> Profile {
        Profile {
            project_name: project_name.to_string(),
            account_id: self.account_id,
            display_name: self.display_name,
            device_name: self.device_name,
            color: self.color,
            sandbox_key: self.test_mode_api_key.map(Zeroizing::new),
            production_key: None,
            sandbox_key_expires_at: self.test_mode_key_expires_at,
            production_key_expires_at: self.live_mode_key_expires_at,
        }
    }
}
