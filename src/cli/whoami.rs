use crate::cli::CliContext;
use crate::constants;
use crate::core::resolver::{self, KeyMode};
use crate::core::secure_store::SecureStore;
use crate::core::{expiry, profile_store, redact};
use crate::models::profile::Profile;
use anyhow::{bail, Context, Result};
use chrono::{DateTime, Utc};
use clap::Args;
use serde::Serialize;
use std::env;
use std::path::Path;

#[derive(Args, Debug)]
pub struct WhoamiArgs {
    /// Output as JSON
    #[arg(long)]
    pub json: bool,

    /// Include redacted API keys in the output
    #[arg(long)]
    pub show_keys: bool,
}

/// The introspection record. Raw key fields are populated only on request,
/// and then only with redacted values.
#[derive(Debug, Serialize)]
pub struct WhoamiOutput {
    pub project_name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub account_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub device_name: Option<String>,
    pub color: String,
    pub has_test_mode_api_key: bool,
    pub has_live_mode_api_key: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub test_mode_key_expires_at: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub live_mode_key_expires_at: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub test_mode_api_key: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub live_mode_api_key: Option<String>,
    pub profiles_file: String,
}

pub fn run(ctx: &CliContext, args: WhoamiArgs) -> Result<()> {
    let profile = profile_store::load(&ctx.paths.profiles_file, &ctx.project_name)?;
    let Some(profile) = profile else {
        bail!(
            "no profile named '{}' found (run 'centavo-cli login' first)",
            ctx.project_name
        );
    };

    let output = build_output(
        &profile,
        &ctx.paths.profiles_file,
        ctx.secure_store.as_ref(),
        args.show_keys,
    );
    if args.show_keys {
        ctx.audit("reveal-keys");
    }

    if args.json {
        let doc = serde_json::to_string_pretty(&output).context("serialize whoami output")?;
        println!("{}", doc);
    } else {
        print!("{}", render_text(&output));
    }

    for warning in stale_warnings(&profile, &output, Utc::now()) {
        println!("{}", warning);
    }
    Ok(())
}

fn build_output(
    profile: &Profile,
    profiles_file: &Path,
    store: &dyn SecureStore,
    show_keys: bool,
) -> WhoamiOutput {
    let test_key = resolver::resolve(profile, KeyMode::Sandbox, store);
    let live_key = resolver::resolve(profile, KeyMode::Production, store);

    let format_date = |d: chrono::NaiveDate| d.format(constants::DATE_FORMAT).to_string();

    WhoamiOutput {
        project_name: profile.project_name.clone(),
        display_name: profile.display_name.clone(),
        account_id: profile.account_id.clone(),
        device_name: device_name_override().or_else(|| profile.device_name.clone()),
        color: profile.color.unwrap_or_default().to_string(),
        has_test_mode_api_key: test_key.is_some(),
        has_live_mode_api_key: live_key.is_some(),
        test_mode_key_expires_at: profile.sandbox_key_expires_at.map(format_date),
        live_mode_key_expires_at: profile.production_key_expires_at.map(format_date),
        test_mode_api_key: match (&test_key, show_keys) {
            (Some(key), true) => Some(redact::redact(key)),
            _ => None,
        },
        live_mode_api_key: match (&live_key, show_keys) {
            (Some(key), true) => Some(redact::redact(key)),
            _ => None,
        },
        profiles_file: profiles_file.display().to_string(),
    }
}

fn device_name_override() -> Option<String> {
    env::var(constants::ENV_DEVICE_NAME)
        .ok()
        .filter(|v| !v.is_empty())
}

fn render_text(output: &WhoamiOutput) -> String {
    let mut text = String::new();
    let mut line = |key: &str, value: &str| {
        text.push_str(key);
        text.push_str(": ");
        text.push_str(value);
        text.push('\n');
    };

    line("project_name", &output.project_name);
    if let Some(v) = &output.display_name {
        line("display_name", v);
    }
    if let Some(v) = &output.account_id {
        line("account_id", v);
    }
    if let Some(v) = &output.device_name {
        line("device_name", v);
    }
    line("color", &output.color);
    line(
        "has_test_mode_api_key",
        if output.has_test_mode_api_key { "true" } else { "false" },
    );
    if let Some(v) = &output.test_mode_key_expires_at {
        line("test_mode_key_expires_at", v);
    }
    line(
        "has_live_mode_api_key",
        if output.has_live_mode_api_key { "true" } else { "false" },
    );
    if let Some(v) = &output.live_mode_key_expires_at {
        line("live_mode_key_expires_at", v);
    }
    if let Some(v) = &output.test_mode_api_key {
        line("test_mode_api_key", v);
    }
    if let Some(v) = &output.live_mode_api_key {
        line("live_mode_api_key", v);
    }
    line("profiles_file", &output.profiles_file);
    text
}

fn stale_warnings(
    profile: &Profile,
    output: &WhoamiOutput,
    now: DateTime<Utc>,
) -> Vec<String> {
    let mut warnings = Vec::new();
    if output.has_test_mode_api_key {
        if let Some(date) = profile.sandbox_key_expires_at {
            if expiry::is_stale(date, now) {
                warnings.push(
                    "warning: test_mode_api_key appears expired (re-login may be required)"
                        .to_string(),
                );
            }
        }
    }
    if output.has_live_mode_api_key {
        if let Some(date) = profile.production_key_expires_at {
            if expiry::is_stale(date, now) {
                warnings.push(
                    "warning: live_mode_api_key appears expired (re-login may be required)"
                        .to_string(),
                );
            }
        }
    }
    warnings
}
