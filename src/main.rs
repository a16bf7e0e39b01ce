use anyhow::Result;
use clap::Parser;

fn main() -> Result<()> {
    let cli = centavo_cli::cli::Cli::parse();
    cli.run()
}
