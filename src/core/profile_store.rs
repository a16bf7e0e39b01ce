//! Plaintext profiles file: load, list, and idempotent per-block writes.
//!
//! The file holds one `[project]` table per profile. Only the sandbox tier
//! and descriptive metadata are ever written; the write path goes through
//! `StoredProfile`, which has no production-key field.

use crate::constants;
use crate::models::profile::{Profile, StoredProfile};
use crate::util::fs as config_fs;
use anyhow::{Context, Result};
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

type ProfilesDoc = BTreeMap<String, StoredProfile>;

fn read_document(path: &Path) -> Result<ProfilesDoc> {
    if !path.exists() {
        return Ok(ProfilesDoc::new());
    }
    let content = fs::read_to_string(path)
        .with_context(|| format!("read profiles file {}", path.display()))?;
    toml::from_str(&content)
        .with_context(|| format!("parse profiles file {}", path.display()))
}

/// Load one named profile. An absent file or absent block is `Ok(None)`.
pub fn load(path: &Path, project_name: &str) -> Result<Option<Profile>> {
    let mut doc = read_document(path)?;
    Ok(doc
        .remove(project_name)
        .map(|stored| stored.into_profile(project_name)))
}

/// List every block in the file, sorted by project name.
pub fn list(path: &Path) -> Result<Vec<(String, StoredProfile)>> {
    Ok(read_document(path)?.into_iter().collect())
}

/// Replace or insert the named block for `profile`, leaving sibling blocks
/// untouched. The write is atomic: the file is fully rewritten through a
/// temp file, created 0600 in a 0700 config directory. Callers serialize
/// concurrent invocations with the profiles lock.
pub fn create_profile(path: &Path, profile: &Profile) -> Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            config_fs::ensure_dir(parent, constants::CONFIG_DIR_MODE)?;
        }
    }

    let mut doc = read_document(path)?;
    doc.insert(
        profile.project_name.clone(),
        StoredProfile::from(profile),
    );

    let content = toml::to_string_pretty(&doc).context("serialize profiles file")?;
    config_fs::atomic_write(path, content.as_bytes(), constants::PROFILES_FILE_MODE)
}
