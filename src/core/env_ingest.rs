//! Gated ingestion of environment variables from a dotenv-style file.
//!
//! Runs once at process start. Missing files and insecure permission bits
//! are fatal only when the user explicitly asked for the file; when the
//! loader acts on its own initiative they degrade to soft skips.

use crate::constants;
use anyhow::{bail, Context, Result};
use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use zeroize::Zeroizing;

/// What the caller asked for. `env_file` is an explicit `--env-file PATH`;
/// `dotenv` is the `--dotenv` flag requesting `./.env`. With neither set the
/// loader still tries `./.env` silently.
#[derive(Debug, Clone, Default)]
pub struct IngestRequest {
    pub env_file: Option<PathBuf>,
    pub dotenv: bool,
}

impl IngestRequest {
    fn target(&self) -> (PathBuf, bool) {
        match &self.env_file {
            Some(path) => (path.clone(), true),
            None => (PathBuf::from(constants::DEFAULT_ENV_FILE), self.dotenv),
        }
    }
}

/// Outcome of an ingestion attempt that did not fail hard.
#[derive(Debug, PartialEq, Eq)]
pub enum IngestOutcome {
    /// Allow-listed variables applied to the process environment. Names that
    /// were already set are not listed; they were left untouched.
    Loaded {
        path: PathBuf,
        applied: Vec<String>,
    },
    /// No file at the auto-load location.
    SkippedMissing,
    /// Auto-load found the file world-readable and refused it.
    SkippedInsecure {
        path: PathBuf,
        mode: u32,
    },
}

#[derive(Debug, PartialEq, Eq)]
enum Decision {
    Load,
    SkipMissing,
    SkipInsecure { mode: u32 },
}

/// Run the full ingestion gate.
pub fn ingest(request: &IngestRequest) -> Result<IngestOutcome> {
    let (path, explicit) = request.target();
    run(&path, explicit)
}

fn run(path: &Path, explicit: bool) -> Result<IngestOutcome> {
    match decide(path, explicit)? {
        Decision::SkipMissing => Ok(IngestOutcome::SkippedMissing),
        Decision::SkipInsecure { mode } => Ok(IngestOutcome::SkippedInsecure {
            path: path.to_path_buf(),
            mode,
        }),
        Decision::Load => {
            let entries = allowlisted(parse_env_file(path)?);
            let applied = apply(&entries);
            Ok(IngestOutcome::Loaded {
                path: path.to_path_buf(),
                applied,
            })
        }
    }
}

/// The security gate, evaluated before any file content is read.
fn decide(path: &Path, explicit: bool) -> Result<Decision> {
    let metadata = match fs::metadata(path) {
        Ok(m) => m,
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
            if explicit {
                bail!("env file not found: {}", path.display());
            }
            return Ok(Decision::SkipMissing);
        }
        Err(err) => {
            if explicit {
                return Err(err)
                    .with_context(|| format!("stat env file {}", path.display()));
            }
            return Ok(Decision::SkipMissing);
        }
    };

    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        let mode = metadata.permissions().mode() & 0o777;
        // "others" read bit
        if mode & 0o004 != 0 {
            if explicit {
                bail!(
                    "{} has insecure permissions ({:04o}): world-readable. Run 'chmod 600 {}' to fix this",
                    path.display(),
                    mode,
                    path.display()
                );
            }
            return Ok(Decision::SkipInsecure { mode });
        }
    }
    #[cfg(not(unix))]
    let _ = metadata;

    Ok(Decision::Load)
}

fn parse_env_file(path: &Path) -> Result<Vec<(String, Zeroizing<String>)>> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("read env file {}", path.display()))?;

    let mut entries = Vec::new();
    for line in content.lines() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        if let Some((key, value)) = line.split_once('=') {
            let key = key.trim().to_string();
            let value = value.trim().trim_matches('"').trim_matches('\'').to_string();
            entries.push((key, Zeroizing::new(value)));
        }
    }
    Ok(entries)
}

/// Restrict entries to recognized variable names.
fn allowlisted(entries: Vec<(String, Zeroizing<String>)>) -> Vec<(String, Zeroizing<String>)> {
    entries
        .into_iter()
        .filter(|(key, _)| constants::ENV_FILE_ALLOWLIST.contains(&key.as_str()))
        .collect()
}

/// Set each variable only when the environment does not already provide it.
/// Returns the names actually applied.
fn apply(entries: &[(String, Zeroizing<String>)]) -> Vec<String> {
    let mut applied = Vec::new();
    for (key, value) in entries {
        if env::var_os(key).is_none() {
            env::set_var(key, value.as_str());
            applied.push(key.clone());
        }
    }
    applied
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testenv;
    use std::io::Write;
    use tempfile::TempDir;

    #[cfg(unix)]
    use std::os::unix::fs::PermissionsExt;

    fn write_env_file(dir: &TempDir, name: &str, content: &str, mode: u32) -> PathBuf {
        let path = dir.path().join(name);
        let mut file = fs::File::create(&path).unwrap();
        file.write_all(content.as_bytes()).unwrap();
        #[cfg(unix)]
        fs::set_permissions(&path, fs::Permissions::from_mode(mode)).unwrap();
        #[cfg(not(unix))]
        let _ = mode;
        path
    }

    fn clear_allowlisted() {
        for key in constants::ENV_FILE_ALLOWLIST {
            env::remove_var(key);
        }
    }

    #[test]
    fn test_decide_missing_auto_skips() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join(".env");
        assert_eq!(decide(&path, false).unwrap(), Decision::SkipMissing);
    }

    #[test]
    fn test_decide_missing_explicit_is_fatal() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join(".env");
        let err = decide(&path, true).unwrap_err();
        assert!(err.to_string().contains("not found"));
    }

    #[cfg(unix)]
    #[test]
    fn test_decide_world_readable_auto_skips() {
        let dir = TempDir::new().unwrap();
        let path = write_env_file(&dir, ".env", "CENTAVO_API_KEY=sk_test_123\n", 0o644);
        assert_eq!(
            decide(&path, false).unwrap(),
            Decision::SkipInsecure { mode: 0o644 }
        );
    }

    #[cfg(unix)]
    #[test]
    fn test_decide_world_readable_explicit_is_fatal() {
        let dir = TempDir::new().unwrap();
        let path = write_env_file(&dir, "insecure.env", "CENTAVO_API_KEY=sk_test_123\n", 0o644);
        let err = decide(&path, true).unwrap_err();
        let message = err.to_string();
        assert!(message.contains("world-readable"));
        assert!(message.contains("chmod 600"));
    }

    #[cfg(unix)]
    #[test]
    fn test_decide_group_readable_loads() {
        // 0640 keeps the "others" bit clear; only 0o004 blocks.
        let dir = TempDir::new().unwrap();
        let path = write_env_file(&dir, ".env", "CENTAVO_API_KEY=sk_test_123\n", 0o640);
        assert_eq!(decide(&path, false).unwrap(), Decision::Load);
    }

    #[test]
    fn test_parse_env_file_skips_comments_and_quotes() {
        let dir = TempDir::new().unwrap();
        let path = write_env_file(
            &dir,
            ".env",
            "# comment\n\nCENTAVO_API_KEY=\"sk_test_123\"\nCENTAVO_DEVICE_NAME='box'\nnoequals\n",
            0o600,
        );
        let entries = parse_env_file(&path).unwrap();
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].0, "CENTAVO_API_KEY");
        assert_eq!(entries[0].1.as_str(), "sk_test_123");
        assert_eq!(entries[1].1.as_str(), "box");
    }

    #[test]
    fn test_allowlist_filters_unknown_names() {
        let entries = vec![
            ("CENTAVO_API_KEY".to_string(), Zeroizing::new("sk_test_123".to_string())),
            ("CENTAVO_LIVE_API_KEY".to_string(), Zeroizing::new("rk_live_1".to_string())),
            ("PATH".to_string(), Zeroizing::new("/tmp".to_string())),
        ];
        let kept = allowlisted(entries);
        assert_eq!(kept.len(), 1);
        assert_eq!(kept[0].0, "CENTAVO_API_KEY");
    }

    #[cfg(unix)]
    #[test]
    fn test_ingest_secure_auto_load_sets_variable() {
        let _env = testenv::lock();
        clear_allowlisted();
        let dir = TempDir::new().unwrap();
        let path = write_env_file(
            &dir,
            ".env",
            "CENTAVO_API_KEY=sk_test_123\nCENTAVO_DEVICE_NAME=test_device\n",
            0o600,
        );

        let outcome = run(&path, false).unwrap();
        match outcome {
            IngestOutcome::Loaded { applied, .. } => assert_eq!(applied.len(), 2),
            other => panic!("expected Loaded, got {:?}", other),
        }
        assert_eq!(env::var("CENTAVO_API_KEY").unwrap(), "sk_test_123");
        assert_eq!(env::var("CENTAVO_DEVICE_NAME").unwrap(), "test_device");
        clear_allowlisted();
    }

    #[cfg(unix)]
    #[test]
    fn test_ingest_insecure_auto_load_leaves_variable_unset() {
        let _env = testenv::lock();
        clear_allowlisted();
        let dir = TempDir::new().unwrap();
        let path = write_env_file(&dir, ".env", "CENTAVO_API_KEY=sk_test_123\n", 0o644);

        let outcome = run(&path, false).unwrap();
        assert!(matches!(outcome, IngestOutcome::SkippedInsecure { .. }));
        assert!(env::var_os("CENTAVO_API_KEY").is_none());
    }

    #[cfg(unix)]
    #[test]
    fn test_ingest_insecure_explicit_is_fatal() {
        let _env = testenv::lock();
        clear_allowlisted();
        let dir = TempDir::new().unwrap();
        let path = write_env_file(&dir, "custom.env", "CENTAVO_API_KEY=sk_test_123\n", 0o644);

        let request = IngestRequest {
            env_file: Some(path),
            dotenv: false,
        };
        assert!(ingest(&request).is_err());
        assert!(env::var_os("CENTAVO_API_KEY").is_none());
    }

    #[cfg(unix)]
    #[test]
    fn test_ingest_never_overrides_existing_variable() {
        let _env = testenv::lock();
        clear_allowlisted();
        env::set_var("CENTAVO_API_KEY", "sk_test_existing");
        let dir = TempDir::new().unwrap();
        let path = write_env_file(&dir, "test.env", "CENTAVO_API_KEY=sk_test_from_file\n", 0o600);

        let request = IngestRequest {
            env_file: Some(path),
            dotenv: false,
        };
        let outcome = ingest(&request).unwrap();
        match outcome {
            IngestOutcome::Loaded { applied, .. } => assert!(applied.is_empty()),
            other => panic!("expected Loaded, got {:?}", other),
        }
        assert_eq!(env::var("CENTAVO_API_KEY").unwrap(), "sk_test_existing");
        clear_allowlisted();
    }

    #[test]
    fn test_ingest_missing_explicit_file_is_fatal() {
        let request = IngestRequest {
            env_file: Some(PathBuf::from("/nonexistent/file.env")),
            dotenv: false,
        };
        assert!(ingest(&request).is_err());
    }
}
