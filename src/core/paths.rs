//! Config directory resolution and derived file paths.

use anyhow::{bail, Result};
use std::env;
use std::path::PathBuf;

#[derive(Debug, Clone)]
pub struct ConfigPaths {
    pub config_dir: PathBuf,
    pub profiles_file: PathBuf,
    pub profiles_lock: PathBuf,
    pub audit_log: PathBuf,
    pub audit_lock: PathBuf,
}

impl ConfigPaths {
    /// Resolve the config directory from CLI arg, env var, or the platform
    /// default (`$XDG_CONFIG_HOME/centavo`, falling back to
    /// `$HOME/.config/centavo`).
    pub fn resolve(dir_arg: Option<PathBuf>) -> Result<Self> {
        if let Some(dir) = dir_arg {
            return Ok(Self::from_dir(dir));
        }
        if let Ok(dir) = env::var("CENTAVO_CONFIG_DIR") {
            if !dir.is_empty() {
                return Ok(Self::from_dir(PathBuf::from(dir)));
            }
        }
        if let Ok(xdg) = env::var("XDG_CONFIG_HOME") {
            if !xdg.is_empty() {
                return Ok(Self::from_dir(PathBuf::from(xdg).join("centavo")));
            }
        }
        match env::var("HOME") {
            Ok(home) if !home.is_empty() => {
                Ok(Self::from_dir(PathBuf::from(home).join(".config").join("centavo")))
            }
            _ => bail!("cannot resolve config directory: HOME is not set (use --config-dir)"),
        }
    }

    /// Create config paths from an explicit directory.
    pub fn from_dir(config_dir: PathBuf) -> Self {
        let profiles_file = config_dir.join("config.toml");
        let profiles_lock = config_dir.join("config.lock");
        let audit_log = config_dir.join("audit.log");
        let audit_lock = config_dir.join("audit.lock");
        Self {
            config_dir,
            profiles_file,
            profiles_lock,
            audit_log,
            audit_lock,
        }
    }
}

impl std::fmt::Display for ConfigPaths {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.config_dir.display())
    }
}
