//! CLI routing and command dispatch.

use crate::core::env_ingest::{self, IngestOutcome, IngestRequest};
use crate::core::paths::ConfigPaths;
use crate::core::secure_store::{KeyringStore, SecureStore};
use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

pub mod audit;
pub mod login;
pub mod profiles;
pub mod whoami;

/// Shared context passed to all command handlers.
pub struct CliContext {
    pub paths: ConfigPaths,
    pub project_name: String,
    pub secure_store: Box<dyn SecureStore>,
}

impl CliContext {
    /// Append an audit entry for the active profile. Audit failures are
    /// reported to the operator, never fatal to the command.
    pub fn audit(&self, action: &str) {
        if let Err(e) = crate::core::audit_log::log(&self.paths, action, &self.project_name) {
            eprintln!("warning: audit log failed: {}", e);
        }
    }
}

#[derive(Parser, Debug)]
#[command(
    name = "centavo-cli",
    version,
    about = "Profile and credential management for the Centavo payments platform"
)]
pub struct Cli {
    /// Profile block in the config file to operate on
    #[arg(
        long,
        global = true,
        env = "CENTAVO_PROJECT_NAME",
        default_value = "default"
    )]
    pub project_name: String,

    /// Config directory (default: ~/.config/centavo)
    #[arg(long, global = true, value_name = "PATH")]
    pub config_dir: Option<PathBuf>,

    /// Load environment variables from this file before running
    #[arg(long, global = true, value_name = "PATH")]
    pub env_file: Option<PathBuf>,

    /// Load ./.env before running (missing or insecure file becomes an error)
    #[arg(long, global = true)]
    pub dotenv: bool,

    #[command(subcommand)]
    pub command: Commands,
}

impl Cli {
    pub fn run(self) -> Result<()> {
        // Environment ingestion runs before anything touches profiles, so
        // resolver overrides see the loaded values. Fatal only when a file
        // was explicitly requested.
        let request = IngestRequest {
            env_file: self.env_file.clone(),
            dotenv: self.dotenv,
        };
        match env_ingest::ingest(&request)? {
            IngestOutcome::Loaded { path, .. } => {
                if self.dotenv {
                    println!("Loaded environment variables from {}", path.display());
                }
            }
            IngestOutcome::SkippedMissing => {}
            IngestOutcome::SkippedInsecure { path, mode } => {
                eprintln!(
                    "warning: skipping {}: permissions too permissive ({:04o}, world-readable). Run 'chmod 600 {}' to fix this.",
                    path.display(),
                    mode,
                    path.display()
                );
            }
        }

        let paths = ConfigPaths::resolve(self.config_dir)?;
        let ctx = CliContext {
            paths,
            project_name: self.project_name,
            secure_store: Box::new(KeyringStore::new()),
        };

        match self.command {
            Commands::Login(args) => login::run(&ctx, args),
            Commands::Whoami(args) => whoami::run(&ctx, args),
            Commands::Profiles { command } => profiles::run(&ctx, command),
            Commands::Audit { command } => audit::run(&ctx, command),
        }
    }
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Configure a profile from an API key
    Login(login::LoginArgs),
    /// Show the active profile and its credential state
    Whoami(whoami::WhoamiArgs),
    /// Inspect configured profiles
    Profiles {
        #[command(subcommand)]
        command: profiles::ProfilesCommand,
    },
    /// View the audit trail
    Audit {
        #[command(subcommand)]
        command: audit::AuditCommand,
    },
}
