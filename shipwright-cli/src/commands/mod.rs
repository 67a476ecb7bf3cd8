//! Commands module
//!
//! Defines all CLI commands and their handlers.

mod package;
mod sweep;

pub use package::PackageArgs;
pub use sweep::SweepArgs;

use anyhow::Result;
use clap::Subcommand;

use crate::config::Config;

/// Top-level CLI commands
#[derive(Subcommand)]
pub enum Commands {
    /// Build an HTML bundle into a native binary and print its download URL
    Package(PackageArgs),
    /// Delete transient repositories left behind by interrupted runs
    Sweep(SweepArgs),
}

/// Handle a CLI command
///
/// Routes the command to the appropriate handler module.
pub async fn handle_command(command: Commands, config: &Config) -> Result<()> {
    match command {
        Commands::Package(args) => package::handle_package_command(args, config).await,
        Commands::Sweep(args) => sweep::handle_sweep_command(args, config).await,
    }
}
