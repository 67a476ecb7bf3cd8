//! Shipwright CLI
//!
//! Command-line interface for packaging HTML bundles into native builds
//! through a transient GitHub repository.

mod commands;
mod config;

use anyhow::{Context, Result};
use clap::Parser;
use commands::{Commands, handle_command};
use config::Config;
use shipwright_core::domain::request::Credential;
use shipwright_packager::PackagerConfig;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "shipwright")]
#[command(about = "Package HTML bundles into native builds via GitHub Actions", long_about = None)]
struct Cli {
    /// GitHub token with `repo`, `workflow` and `delete_repo` scopes
    #[arg(long, env = "GITHUB_TOKEN", hide_env_values = true)]
    token: String,

    /// GitHub REST API URL (overrides SHIPWRIGHT_API_URL)
    #[arg(long)]
    api_url: Option<String>,

    /// Prefix of transient repository names (overrides SHIPWRIGHT_REPO_PREFIX)
    #[arg(long)]
    repo_prefix: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Logs go to stderr so stdout carries only the result
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                "shipwright_cli=info,shipwright_packager=info,shipwright_client=info".into()
            }),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();

    let mut packager = PackagerConfig::from_env().context("Failed to load configuration")?;
    if let Some(api_url) = cli.api_url {
        packager.api_url = api_url;
    }
    if let Some(prefix) = cli.repo_prefix {
        packager.repo_prefix = prefix;
    }

    let config = Config {
        credential: Credential::new(cli.token),
        packager,
    };

    handle_command(cli.command, &config).await
}
