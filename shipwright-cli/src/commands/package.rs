//! Package command handler

use std::future::Future;
use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Args;
use colored::Colorize;
use shipwright_core::domain::request::PipelineRequest;
use shipwright_packager::{CancellationToken, PackagerConfig, PollPolicy, package};
use tracing::warn;

use crate::config::Config;

/// Arguments of `shipwright package`
#[derive(Args, Debug)]
pub struct PackageArgs {
    /// Path to the HTML file to build
    pub input: PathBuf,

    /// Workflow definition to commit before dispatching
    #[arg(long)]
    pub workflow_file: Option<PathBuf>,

    /// Branch or tag to publish to and dispatch on
    #[arg(long = "ref")]
    pub git_ref: Option<String>,

    /// Workflow file name to dispatch (e.g. build-android.yml)
    #[arg(long)]
    pub workflow: Option<String>,

    /// Seconds between release polls
    #[arg(long, value_name = "SECS")]
    pub poll_interval: Option<u64>,

    /// Give up waiting for the release after this many seconds
    #[arg(long, value_name = "SECS")]
    pub deadline: Option<u64>,

    /// Give up waiting for the release after this many polls
    #[arg(long)]
    pub max_attempts: Option<u32>,

    /// Print the outcome as JSON
    #[arg(long)]
    pub json: bool,
}

impl PackageArgs {
    /// Layers the command flags over the loaded packager settings
    pub fn apply(&self, mut packager: PackagerConfig) -> PackagerConfig {
        if let Some(git_ref) = &self.git_ref {
            packager = packager.with_git_ref(git_ref.clone());
        }
        if let Some(workflow) = &self.workflow {
            packager.workflow_id = workflow.clone();
        }

        let mut poll = packager.poll.clone();
        if let Some(secs) = self.poll_interval {
            poll.interval = Duration::from_secs(secs);
        }
        if let Some(secs) = self.deadline {
            poll = poll.with_deadline(Duration::from_secs(secs));
        }
        if let Some(max) = self.max_attempts {
            poll = poll.with_max_attempts(max);
        }
        packager.with_poll(poll)
    }
}

fn describe_poll(poll: &PollPolicy) -> String {
    let mut parts = vec![format!("every {}s", poll.interval.as_secs())];
    if let Some(deadline) = poll.deadline {
        parts.push(format!("for up to {}s", deadline.as_secs()));
    }
    if let Some(max) = poll.max_attempts {
        parts.push(format!("at most {} times", max));
    }
    parts.join(", ")
}

/// Cancels `cancel` on the first interrupt
///
/// Returns true on a second interrupt, when the caller should exit without
/// waiting for cleanup. Returns false if the signal listener fails.
async fn watch_interrupts<F, Fut>(mut next_interrupt: F, cancel: CancellationToken) -> bool
where
    F: FnMut() -> Fut,
    Fut: Future<Output = std::io::Result<()>>,
{
    if next_interrupt().await.is_err() {
        return false;
    }
    warn!("Interrupted, cancelling and cleaning up (press Ctrl-C again to quit now)");
    cancel.cancel();

    if next_interrupt().await.is_err() {
        return false;
    }
    warn!("Interrupted again, exiting without waiting for cleanup");
    true
}

pub async fn handle_package_command(args: PackageArgs, config: &Config) -> Result<()> {
    let input = tokio::fs::read(&args.input)
        .await
        .with_context(|| format!("Failed to read {}", args.input.display()))?;

    let mut packager = args.apply(config.packager.clone());
    if let Some(path) = &args.workflow_file {
        let definition = tokio::fs::read(path)
            .await
            .with_context(|| format!("Failed to read workflow file {}", path.display()))?;
        packager = packager.with_workflow_definition(definition);
    }

    if !args.json {
        println!(
            "{} {} ({} bytes) with workflow {}",
            "Packaging".bold(),
            args.input.display(),
            input.len(),
            packager.workflow_id.cyan()
        );
        println!("  Polling releases {}", describe_poll(&packager.poll));
    }

    let cancel = CancellationToken::new();
    let on_signal = cancel.clone();
    tokio::spawn(async move {
        if watch_interrupts(tokio::signal::ctrl_c, on_signal).await {
            std::process::exit(130);
        }
    });

    let request = PipelineRequest::new(input, config.credential.clone());
    let outcome = package(packager, request, cancel)
        .await
        .context("Packaging failed")?;

    if args.json {
        let value = serde_json::json!({
            "download_url": outcome.download_url,
            "repository": outcome.repository.to_string(),
            "release": outcome.release_tag,
            "cleanup_error": outcome.cleanup_error.as_ref().map(|e| e.to_string()),
        });
        println!("{}", serde_json::to_string_pretty(&value)?);
        return Ok(());
    }

    println!("{}", "✓ Build finished".green().bold());
    println!("  Release: {}", outcome.release_tag);
    println!("  Download: {}", outcome.download_url.bold());

    if let Some(cleanup) = &outcome.cleanup_error {
        println!(
            "{} {} was not deleted: {}",
            "Warning:".yellow().bold(),
            outcome.repository,
            cleanup
        );
        println!("  Run `shipwright sweep` to remove it later.");
    }

    Ok(())
}
