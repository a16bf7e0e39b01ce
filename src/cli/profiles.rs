use crate::cli::CliContext;
use crate::constants;
use crate::core::profile_store;
use crate::core::secure_store::SecureStore;
use anyhow::{Context, Result};
use clap::{Args, Subcommand};
use comfy_table::{presets::UTF8_FULL, Attribute, Cell, Table};
use serde::Serialize;

#[derive(Subcommand, Debug)]
pub enum ProfilesCommand {
    /// List profiles in the config file
    List(ProfilesListArgs),
}

#[derive(Args, Debug)]
pub struct ProfilesListArgs {
    /// Output format: table|json
    #[arg(long, default_value = "table")]
    pub format: String,
}

#[derive(Serialize)]
struct ProfileListItem {
    project_name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    display_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    account_id: Option<String>,
    has_test_mode_api_key: bool,
    has_live_mode_api_key: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    test_mode_key_expires_at: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    live_mode_key_expires_at: Option<String>,
}

pub fn run(ctx: &CliContext, cmd: ProfilesCommand) -> Result<()> {
    match cmd {
        ProfilesCommand::List(args) => run_list(ctx, args),
    }
}

fn run_list(ctx: &CliContext, args: ProfilesListArgs) -> Result<()> {
    let blocks = profile_store::list(&ctx.paths.profiles_file)?;

    if blocks.is_empty() {
        println!("No profiles found in {}", ctx.paths.profiles_file.display());
        return Ok(());
    }

    let items: Vec<ProfileListItem> = blocks
        .into_iter()
        .map(|(project_name, stored)| {
            // Key presence only; the secure store is probed, never printed.
            let live_key_name = format!("{}.{}", project_name, constants::LIVE_KEY_SUFFIX);
            let has_live = ctx.secure_store.get(&live_key_name).is_some();
            ProfileListItem {
                has_test_mode_api_key: stored.test_mode_api_key.is_some(),
                has_live_mode_api_key: has_live,
                display_name: stored.display_name,
                account_id: stored.account_id,
                test_mode_key_expires_at: stored
                    .test_mode_key_expires_at
                    .map(|d| d.format(constants::DATE_FORMAT).to_string()),
                live_mode_key_expires_at: stored
                    .live_mode_key_expires_at
                    .map(|d| d.format(constants::DATE_FORMAT).to_string()),
                project_name,
            }
        })
        .collect();

    if args.format == "json" {
        let doc = serde_json::to_string_pretty(&items).context("serialize profile list")?;
        println!("{}", doc);
        return Ok(());
    }

    let mut table = Table::new();
    table.load_preset(UTF8_FULL);
    table.set_header(vec![
        Cell::new("Project").add_attribute(Attribute::Bold),
        Cell::new("Display Name").add_attribute(Attribute::Bold),
        Cell::new("Account").add_attribute(Attribute::Bold),
        Cell::new("Test Key").add_attribute(Attribute::Bold),
        Cell::new("Live Key").add_attribute(Attribute::Bold),
        Cell::new("Test Expires").add_attribute(Attribute::Bold),
        Cell::new("Live Expires").add_attribute(Attribute::Bold),
    ]);

    for item in &items {
        table.add_row(vec![
            item.project_name.clone(),
            item.display_name.clone().unwrap_or_else(|| "-".into()),
            item.account_id.clone().unwrap_or_else(|| "-".into()),
            if item.has_test_mode_api_key { "yes" } else { "-" }.to_string(),
            if item.has_live_mode_api_key { "yes" } else { "-" }.to_string(),
            item.test_mode_key_expires_at
                .clone()
                .unwrap_or_else(|| "-".into()),
            item.live_mode_key_expires_at
                .clone()
                .unwrap_or_else(|| "-".into()),
        ]);
    }

    println!("{}", table);
    println!("\n{} profiles in {}", items.len(), ctx.paths.profiles_file.display());
    Ok(())
}
