use crate::cli::CliContext;
use crate::constants;
use crate::core::account::{AccountLookup, OfflineLookup};
use crate::core::file_lock::FileLock;
use crate::core::profile_store;
use crate::core::resolver::KeyMode;
use crate::core::secure_store::SecureStore;
use crate::models::profile::Profile;
use crate::util::{fs as config_fs, validators};
use anyhow::{Context, Result};
use clap::Args;
use dialoguer::Password;
use zeroize::Zeroizing;

#[derive(Args, Debug)]
pub struct LoginArgs {
    /// API key to store (prompted without echo when omitted)
    #[arg(long, value_name = "KEY")]
    pub api_key: Option<String>,

    /// Display name to record when no account lookup is available
    #[arg(long)]
    pub display_name: Option<String>,

    /// Account id to record when no account lookup is available
    #[arg(long)]
    pub account_id: Option<String>,
}

pub fn run(ctx: &CliContext, args: LoginArgs) -> Result<()> {
    let key = match args.api_key {
        Some(key) => Zeroizing::new(key),
        None => Zeroizing::new(
            Password::new()
                .with_prompt("API key")
                .interact()
                .context("read API key")?,
        ),
    };

    let mode = login_with_api_key(
        ctx,
        key.trim(),
        args.display_name,
        args.account_id,
        &OfflineLookup,
    )?;

    println!(
        "> Done! Profile '{}' is configured with a {} key.",
        ctx.project_name, mode
    );
    Ok(())
}

/// Configure the profile from a raw API key. Sandbox keys are written to the
/// profiles file; production keys go to the secure store and never touch the
/// file. Metadata already stored for the profile (other tier's key, expiry
/// dates) is preserved.
pub fn login_with_api_key(
    ctx: &CliContext,
    api_key: &str,
    display_name: Option<String>,
    account_id: Option<String>,
    lookup: &dyn AccountLookup,
) -> Result<KeyMode> {
    validators::validate_api_key(api_key)?;
    let mode = if validators::is_live_key(api_key) {
        KeyMode::Production
    } else {
        KeyMode::Sandbox
    };

    config_fs::ensure_dir(&ctx.paths.config_dir, constants::CONFIG_DIR_MODE)?;
    let _lock = FileLock::exclusive(&ctx.paths.profiles_lock)?;

    let mut profile = profile_store::load(&ctx.paths.profiles_file, &ctx.project_name)?
        .unwrap_or_else(|| Profile::new(ctx.project_name.clone()));

    if profile.device_name.is_none() {
        profile.device_name = Some(default_device_name());
    }

    let fetched = match lookup.lookup(api_key) {
        Ok(info) => info,
        Err(e) => {
            eprintln!("warning: could not fetch account metadata: {}", e);
            None
        }
    };
    if let Some(info) = fetched {
        profile.account_id = Some(info.account_id);
        profile.display_name = Some(info.display_name);
    }
    // Explicit flags win over anything the lookup returned.
    if account_id.is_some() {
        profile.account_id = account_id;
    }
    if display_name.is_some() {
        profile.display_name = display_name;
    }

    match mode {
        KeyMode::Production => {
            ctx.secure_store
                .set(&profile.live_key_name(), api_key)
                .context("store production key in the secure store")?;
        }
        KeyMode::Sandbox => {
            profile.sandbox_key = Some(Zeroizing::new(api_key.to_string()));
        }
    }

    profile_store::create_profile(&ctx.paths.profiles_file, &profile)?;
    ctx.audit("login");
    Ok(mode)
}

fn default_device_name() -> String {
    if let Ok(name) = std::env::var(constants::ENV_DEVICE_NAME) {
        if !name.is_empty() {
            return name;
        }
    }
    nix::unistd::gethostname()
        .ok()
        .and_then(|name| name.into_string().ok())
        .unwrap_or_else(|| "unknown".to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::account::AccountInfo;
    use crate::core::paths::ConfigPaths;
    use crate::core::secure_store::MemoryStore;
    use crate::testenv;
    use chrono::NaiveDate;
    use std::env;
    use std::fs;
    use tempfile::TempDir;

    struct FakeLookup;

    impl AccountLookup for FakeLookup {
        fn lookup(&self, _api_key: &str) -> Result<Option<AccountInfo>> {
            Ok(Some(AccountInfo {
                account_id: "acct_123".into(),
                display_name: "test-display".into(),
            }))
        }
    }

    fn test_ctx() -> (TempDir, CliContext) {
        let dir = TempDir::new().unwrap();
        let ctx = CliContext {
            paths: ConfigPaths::from_dir(dir.path().join("centavo")),
            project_name: "test".into(),
            secure_store: Box::new(MemoryStore::new()),
        };
        (dir, ctx)
    }

    #[test]
    fn test_sandbox_login_writes_profile_file() {
        let _env = testenv::lock();
        env::set_var(constants::ENV_DEVICE_NAME, "test-device");
        let (_dir, ctx) = test_ctx();

        let mode =
            login_with_api_key(&ctx, "sk_test_1234abcd", None, None, &FakeLookup).unwrap();
        assert_eq!(mode, KeyMode::Sandbox);

        let profile = profile_store::load(&ctx.paths.profiles_file, "test")
            .unwrap()
            .unwrap();
        assert_eq!(
            profile.sandbox_key.as_deref().map(String::as_str),
            Some("sk_test_1234abcd")
        );
        assert_eq!(profile.account_id.as_deref(), Some("acct_123"));
        assert_eq!(profile.display_name.as_deref(), Some("test-display"));
        assert_eq!(profile.device_name.as_deref(), Some("test-device"));
        assert!(ctx.secure_store.get("test.live_mode_api_key").is_none());
        env::remove_var(constants::ENV_DEVICE_NAME);
    }

    #[test]
    fn test_production_login_goes_to_secure_store_only() {
        let _env = testenv::lock();
        env::remove_var(constants::ENV_DEVICE_NAME);
        let (_dir, ctx) = test_ctx();

        let mode =
            login_with_api_key(&ctx, "rk_live_0000000001", None, None, &FakeLookup).unwrap();
        assert_eq!(mode, KeyMode::Production);

        let stored = ctx.secure_store.get("test.live_mode_api_key").unwrap();
        assert_eq!(stored.as_str(), "rk_live_0000000001");

        let content = fs::read_to_string(&ctx.paths.profiles_file).unwrap();
        assert!(!content.contains("rk_live_0000000001"));
        assert!(!content.contains("live_mode_api_key"));
    }

    #[test]
    fn test_invalid_key_writes_nothing() {
        let _env = testenv::lock();
        let (_dir, ctx) = test_ctx();

        assert!(login_with_api_key(&ctx, "not-a-key", None, None, &FakeLookup).is_err());
        assert!(!ctx.paths.profiles_file.exists());
        assert!(ctx.secure_store.get("test.live_mode_api_key").is_none());
    }

    #[test]
    fn test_relogin_preserves_other_tier_and_expiries() {
        let _env = testenv::lock();
        env::remove_var(constants::ENV_DEVICE_NAME);
        let (_dir, ctx) = test_ctx();

        let mut existing = Profile::new("test");
        existing.sandbox_key = Some(Zeroizing::new("sk_test_olderkey".into()));
        existing.sandbox_key_expires_at = NaiveDate::from_ymd_opt(2099, 1, 2);
        existing.production_key_expires_at = NaiveDate::from_ymd_opt(2099, 2, 3);
        profile_store::create_profile(&ctx.paths.profiles_file, &existing).unwrap();

        login_with_api_key(&ctx, "rk_live_0000000001", None, None, &FakeLookup).unwrap();

        let profile = profile_store::load(&ctx.paths.profiles_file, "test")
            .unwrap()
            .unwrap();
        assert_eq!(
            profile.sandbox_key.as_deref().map(String::as_str),
            Some("sk_test_olderkey")
        );
        assert_eq!(profile.sandbox_key_expires_at, NaiveDate::from_ymd_opt(2099, 1, 2));
        assert_eq!(
            profile.production_key_expires_at,
            NaiveDate::from_ymd_opt(2099, 2, 3)
        );
    }

    #[test]
    fn test_explicit_flags_win_over_lookup() {
        let _env = testenv::lock();
        let (_dir, ctx) = test_ctx();

        login_with_api_key(
            &ctx,
            "sk_test_1234abcd",
            Some("Override Name".into()),
            Some("acct_999".into()),
            &FakeLookup,
        )
        .unwrap();

        let profile = profile_store::load(&ctx.paths.profiles_file, "test")
            .unwrap()
            .unwrap();
        assert_eq!(profile.display_name.as_deref(), Some("Override Name"));
        assert_eq!(profile.account_id.as_deref(), Some("acct_999"));
    }

    #[test]
    fn test_login_appends_audit_entry() {
        let _env = testenv::lock();
        let (_dir, ctx) = test_ctx();

        login_with_api_key(&ctx, "sk_test_1234abcd", None, None, &FakeLookup).unwrap();

        let entries = crate::core::audit_log::read_log(&ctx.paths, None).unwrap();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].action, "login");
        assert_eq!(entries[0].profile, "test");
    }
}
