//! Append-only audit trail for credential events.
//!
//! One JSON object per line, hash-chained: each entry records the previous
//! entry's hash plus a hash of itself, so edits anywhere in the file are
//! detectable. Entries carry metadata only; the secret material involved in
//! an action never appears here.

use crate::constants;
use crate::core::file_lock::FileLock;
use crate::core::paths::ConfigPaths;
use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::fs::{self, OpenOptions};
use std::io::Write;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuditEntry {
    pub timestamp: DateTime<Utc>,
    pub action: String,
    pub profile: String,
    pub actor: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub prev_hash: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub entry_hash: Option<String>,
}

fn detect_actor() -> String {
    std::env::var("USER").unwrap_or_else(|_| "unknown".to_string())
}

/// Append an entry for `action` on `profile`.
pub fn log(paths: &ConfigPaths, action: &str, profile: &str) -> Result<()> {
    let _lock = FileLock::exclusive(&paths.audit_lock)?;
    let prev_hash = last_entry_hash(paths)?;

    let mut entry = AuditEntry {
        timestamp: Utc::now(),
        action: action.to_string(),
        profile: profile.to_string(),
        actor: detect_actor(),
        prev_hash,
        entry_hash: None,
    };
    entry.entry_hash = Some(entry_hash(&entry)?);

    let line = serde_json::to_string(&entry).context("serialize audit entry")?;
    append_line(paths, &line)
}

/// Hash of the entry serialized with its own hash field cleared. Struct
/// field order is fixed, so the serialization is already canonical.
fn entry_hash(entry: &AuditEntry) -> Result<String> {
    let unhashed = AuditEntry {
        entry_hash: None,
        ..entry.clone()
    };
    let json = serde_json::to_string(&unhashed).context("serialize audit entry for hash")?;
    Ok(format!("{:064x}", Sha256::digest(json.as_bytes())))
}

fn last_entry_hash(paths: &ConfigPaths) -> Result<Option<String>> {
    let path = &paths.audit_log;
    if !path.exists() {
        return Ok(None);
    }
    let content = fs::read_to_string(path)
        .with_context(|| format!("read audit log {}", path.display()))?;
    for line in content.lines().rev() {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        if let Ok(entry) = serde_json::from_str::<AuditEntry>(line) {
            if let Some(hash) = entry.entry_hash {
                return Ok(Some(hash));
            }
        }
        // Unparseable or hashless tail line: chain onto its raw bytes so the
        // damage shows up in verify rather than silently restarting the chain.
        return Ok(Some(format!("{:064x}", Sha256::digest(line.as_bytes()))));
    }
    Ok(None)
}

fn append_line(paths: &ConfigPaths, line: &str) -> Result<()> {
    let path = &paths.audit_log;
    let mut file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .with_context(|| format!("open audit log {}", path.display()))?;
    writeln!(file, "{}", line).context("write audit entry")?;

    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        let perm = fs::Permissions::from_mode(constants::AUDIT_LOG_MODE);
        fs::set_permissions(path, perm).context("set audit log permissions")?;
    }

    Ok(())
}

/// Read audit entries, optionally only the last `limit`.
pub fn read_log(paths: &ConfigPaths, limit: Option<usize>) -> Result<Vec<AuditEntry>> {
    let path = &paths.audit_log;
    if !path.exists() {
        return Ok(Vec::new());
    }
    let content = fs::read_to_string(path)
        .with_context(|| format!("read audit log {}", path.display()))?;

    let mut entries = Vec::new();
    let mut malformed = 0usize;
    for line in content.lines() {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        match serde_json::from_str::<AuditEntry>(line) {
            Ok(entry) => entries.push(entry),
            Err(_) => malformed += 1,
        }
    }
    if malformed > 0 {
        eprintln!("warning: {} malformed audit entries skipped", malformed);
    }

    if let Some(limit) = limit {
        if entries.len() > limit {
            entries = entries.split_off(entries.len() - limit);
        }
    }
    Ok(entries)
}

/// Verify the integrity of the audit chain. Returns (total, errors).
pub fn verify_chain(paths: &ConfigPaths) -> Result<(usize, Vec<String>)> {
    let entries = read_log(paths, None)?;
    let mut errors = Vec::new();
    let mut prev: Option<String> = None;

    for (i, entry) in entries.iter().enumerate() {
        if entry.prev_hash != prev {
            errors.push(format!(
                "entry {}: prev_hash mismatch (expected {:?}, got {:?})",
                i + 1,
                prev,
                entry.prev_hash
            ));
        }
        match &entry.entry_hash {
            Some(stored) => match entry_hash(entry) {
                Ok(computed) if &computed == stored => {}
                Ok(_) => errors.push(format!("entry {}: entry_hash mismatch (tampered?)", i + 1)),
                Err(e) => errors.push(format!("entry {}: cannot compute hash: {}", i + 1, e)),
            },
            None => errors.push(format!("entry {}: missing entry_hash", i + 1)),
        }
        prev = entry.entry_hash.clone();
    }

    Ok((entries.len(), errors))
}
