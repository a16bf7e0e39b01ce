//! Centralized constants for environment names, permissions, and formats.

/// Environment override for the sandbox-mode API key.
pub const ENV_API_KEY: &str = "CENTAVO_API_KEY";

/// Environment override for the production-mode API key.
pub const ENV_LIVE_API_KEY: &str = "CENTAVO_LIVE_API_KEY";

/// Environment override for the device name.
pub const ENV_DEVICE_NAME: &str = "CENTAVO_DEVICE_NAME";

/// Variables importable from an env file. A production key is never
/// allow-listed; live credentials do not belong in dotenv files.
pub const ENV_FILE_ALLOWLIST: &[&str] = &[ENV_API_KEY, ENV_DEVICE_NAME];

/// Default env file consulted in the working directory.
pub const DEFAULT_ENV_FILE: &str = ".env";

/// Service name under which secure-store entries are registered.
pub const SECURE_STORE_SERVICE: &str = "centavo-cli";

/// Per-profile secure-store key suffix for the production key.
pub const LIVE_KEY_SUFFIX: &str = "live_mode_api_key";

/// Permission mode for the config directory.
pub const CONFIG_DIR_MODE: u32 = 0o700;

/// Permission mode for the profiles file.
pub const PROFILES_FILE_MODE: u32 = 0o600;

/// Permission mode for the audit log.
pub const AUDIT_LOG_MODE: u32 = 0o600;

/// Date format for key expiry values in the profiles file.
pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// Grace window past an expiry date before a key is flagged stale.
pub const EXPIRY_GRACE_HOURS: i64 = 24;

/// Minimum accepted API key length.
pub const MIN_API_KEY_LENGTH: usize = 12;
