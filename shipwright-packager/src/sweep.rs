//! Leftover repository sweep
//!
//! A process killed mid-run cannot delete its transient repository. The
//! sweep finds repositories whose names were allocated with the configured
//! prefix and deletes them. Repositories younger than a minimum age may
//! still belong to a running pipeline and are left alone.

use chrono::Utc;
use shipwright_client::RemoteRepositoryClient;
use shipwright_core::domain::repository::{RepoRef, Repository};
use std::time::Duration;
use tracing::{debug, info, warn};

use crate::config::{DEFAULT_POLL_DEADLINE, PollPolicy};
use crate::error::{PipelineError, Result};
use crate::naming;

/// Slack added on top of the poll bound for create, publish and trigger
pub const SWEEP_MARGIN: Duration = Duration::from_secs(15 * 60);

/// Minimum age before a transient repository counts as abandoned
///
/// A run polling under `policy` cannot outlive its poll bound plus
/// [`SWEEP_MARGIN`].
pub fn min_age_for(policy: &PollPolicy) -> Duration {
    let wait = match (policy.deadline, policy.max_attempts) {
        (Some(deadline), _) => deadline,
        (None, Some(attempts)) => policy.interval.saturating_mul(attempts),
        (None, None) => DEFAULT_POLL_DEADLINE,
    };
    wait.saturating_add(SWEEP_MARGIN)
}

/// Outcome of deleting one leftover repository
#[derive(Debug)]
pub struct SweepEntry {
    pub repo: RepoRef,
    pub result: Result<()>,
}

/// Lists transient repositories for `prefix` allocated at least `min_age` ago
pub async fn find_leftovers(
    client: &dyn RemoteRepositoryClient,
    prefix: &str,
    min_age: Duration,
) -> Result<Vec<Repository>> {
    let repositories = client
        .list_repositories()
        .await
        .map_err(PipelineError::RemoteTransport)?;

    let now = Utc::now();
    let leftovers: Vec<Repository> = repositories
        .into_iter()
        .filter(|repo| {
            let Some(allocated) = naming::allocated_at(prefix, &repo.name) else {
                return false;
            };
            // Future timestamps (clock skew) count as age zero
            let age = (now - allocated).to_std().unwrap_or(Duration::ZERO);
            if age < min_age {
                debug!("Skipping {}: only {:?} old", repo.full_name, age);
                return false;
            }
            true
        })
        .collect();

    info!(
        "Found {} leftover repository(ies) with prefix {} older than {:?}",
        leftovers.len(),
        prefix,
        min_age
    );
    Ok(leftovers)
}

/// Deletes the given repositories one by one, continuing past failures
pub async fn delete_all(
    client: &dyn RemoteRepositoryClient,
    repositories: &[Repository],
) -> Vec<SweepEntry> {
    let mut entries = Vec::with_capacity(repositories.len());

    for repository in repositories {
        let repo = repository.repo_ref();
        let result = match client.delete_repository(&repo).await {
            Ok(()) => {
                info!("Deleted leftover repository {}", repo);
                Ok(())
            }
            Err(e) if e.is_not_found() => Ok(()),
            Err(source) => {
                warn!("Failed to delete leftover repository {}: {}", repo, source);
                Err(PipelineError::RepoDelete {
                    repo: repo.clone(),
                    source,
                })
            }
        };
        entries.push(SweepEntry { repo, result });
    }

    entries
}
