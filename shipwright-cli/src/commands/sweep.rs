//! Sweep command handler

use anyhow::{Context, Result};
use clap::Args;
use colored::Colorize;
use shipwright_client::GitHubClient;
use shipwright_packager::sweep;
use std::time::Duration;

use crate::config::Config;

/// Arguments of `shipwright sweep`
#[derive(Args, Debug)]
pub struct SweepArgs {
    /// Name prefix to match (defaults to the configured repository prefix)
    #[arg(long)]
    pub prefix: Option<String>,

    /// Only touch repositories created at least this many seconds ago
    /// (defaults to the poll deadline plus a safety margin)
    #[arg(long, value_name = "SECS")]
    pub older_than: Option<u64>,

    /// Only list the repositories that would be deleted
    #[arg(long)]
    pub dry_run: bool,
}

pub async fn handle_sweep_command(args: SweepArgs, config: &Config) -> Result<()> {
    let prefix = args
        .prefix
        .unwrap_or_else(|| config.packager.repo_prefix.clone());
    let min_age = args
        .older_than
        .map(Duration::from_secs)
        .unwrap_or_else(|| sweep::min_age_for(&config.packager.poll));
    let client = GitHubClient::with_base_url(config.packager.api_url.clone(), &config.credential)
        .context("Failed to create GitHub client")?;

    let leftovers = sweep::find_leftovers(&client, &prefix, min_age)
        .await
        .context("Failed to list repositories")?;

    if leftovers.is_empty() {
        println!(
            "{}",
            format!(
                "No leftover repositories older than {}s found.",
                min_age.as_secs()
            )
            .yellow()
        );
        return Ok(());
    }

    if args.dry_run {
        println!("{}", "Would delete:".bold());
        for repository in &leftovers {
            println!("  {}", repository.full_name);
        }
        return Ok(());
    }

    let entries = sweep::delete_all(&client, &leftovers).await;
    let mut failed = 0;
    for entry in &entries {
        match &entry.result {
            Ok(()) => println!("{} {}", "✓".green(), entry.repo),
            Err(e) => {
                failed += 1;
                println!("{} {}: {}", "✗".red(), entry.repo, e);
            }
        }
    }

    if failed > 0 {
        anyhow::bail!("{} of {} repositories could not be deleted", failed, entries.len());
    }

    println!(
        "{}",
        format!("Deleted {} repositories", entries.len()).green().bold()
    );
    Ok(())
}
