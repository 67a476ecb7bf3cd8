//! Pipeline orchestrator
//!
//! Sequences one packaging run:
//! create → publish → trigger → poll → extract → cleanup.
//!
//! The transient repository is held in a [`RepositoryLease`] from the moment
//! it exists, so it is deleted on success, on failure and on cancellation.
//! A cleanup failure never hides a successful build; it is returned next to
//! the download URL.

pub mod lease;

pub use lease::RepositoryLease;

use shipwright_client::RemoteRepositoryClient;
use shipwright_core::domain::release::Release;
use shipwright_core::domain::repository::RepoRef;
use shipwright_core::dto::repository::CreateRepository;
use std::future::Future;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};

use crate::config::PackagerConfig;
use crate::error::{PipelineError, Result, Stage};
use crate::naming;
use crate::poller::ReleasePoller;
use crate::service::{ArtifactPublisher, BuildTrigger, raw_content_url};

const REPO_DESCRIPTION: &str = "Temporary build repository, deleted automatically";

/// Result of a successful run
#[derive(Debug)]
pub struct PackageOutcome {
    /// Absolute URL of the first asset of the produced release
    pub download_url: String,

    /// Transient repository the build ran in
    pub repository: RepoRef,

    /// Tag of the release the URL was taken from
    pub release_tag: String,

    /// Set when the build succeeded but the repository could not be deleted
    pub cleanup_error: Option<PipelineError>,
}

/// Drives packaging runs against one remote repository host
pub struct Packager {
    client: Arc<dyn RemoteRepositoryClient>,
    config: PackagerConfig,
    publisher: ArtifactPublisher,
    trigger: BuildTrigger,
    poller: ReleasePoller,
}

impl Packager {
    /// Creates a new packager
    ///
    /// Fails with `Config` when the configuration is invalid, including a
    /// poll policy without a deadline or attempt cap.
    pub fn new(client: Arc<dyn RemoteRepositoryClient>, config: PackagerConfig) -> Result<Self> {
        config
            .validate()
            .map_err(|e| PipelineError::Config(format!("{:#}", e)))?;

        let publisher = ArtifactPublisher::new(
            Arc::clone(&client),
            config.content_path.clone(),
            config.commit_message.clone(),
        );
        let trigger = BuildTrigger::new(Arc::clone(&client), config.workflow_id.clone());
        let poller = ReleasePoller::new(Arc::clone(&client), config.poll.clone())?;

        Ok(Self {
            client,
            config,
            publisher,
            trigger,
            poller,
        })
    }

    pub fn config(&self) -> &PackagerConfig {
        &self.config
    }

    /// Runs the whole pipeline for one build input
    ///
    /// Cancelling the token stops the run at the next suspension point; the
    /// transient repository is still deleted before this returns.
    pub async fn run(
        &self,
        build_input: &[u8],
        cancel: &CancellationToken,
    ) -> Result<PackageOutcome> {
        if cancel.is_cancelled() {
            return Err(PipelineError::Cancelled {
                stage: Stage::Create,
            });
        }

        let name = naming::allocate(&self.config.repo_prefix);
        info!("Creating transient repository {}", name);

        let request = CreateRepository::new(&name, self.config.private, self.config.auto_init)
            .with_description(REPO_DESCRIPTION);

        // Not raced against cancellation: an abandoned create could still
        // succeed remotely and leave a repository nobody knows about.
        let repository = self
            .client
            .create_repository(&request)
            .await
            .map_err(|source| PipelineError::RepoCreate { name, source })?;

        let lease = RepositoryLease::new(Arc::clone(&self.client), repository);
        info!("Created transient repository {}", lease.repo_ref());

        let built = self.build(&lease, build_input, cancel).await;
        let repository = lease.repo_ref().clone();
        let cleanup = lease.release().await;

        match (built, cleanup) {
            (Ok(release), cleanup) => {
                let cleanup_error = cleanup.err();
                if let Some(e) = &cleanup_error {
                    warn!("Build succeeded but cleanup failed: {}", e);
                }

                info!("Packaging finished: {}", release.download_url);
                Ok(PackageOutcome {
                    download_url: release.download_url,
                    repository,
                    release_tag: release.tag,
                    cleanup_error,
                })
            }
            (Err(e), Ok(())) => {
                error!("Packaging failed during {}: {}", e.stage(), e);
                Err(e)
            }
            (Err(e), Err(cleanup_error)) => {
                error!("Packaging failed during {}: {}", e.stage(), e);
                warn!("Cleanup after failure also failed: {}", cleanup_error);
                Err(e)
            }
        }
    }

    /// Publish, trigger, poll and extract inside an acquired lease
    async fn build(
        &self,
        lease: &RepositoryLease,
        build_input: &[u8],
        cancel: &CancellationToken,
    ) -> Result<BuiltRelease> {
        let repo = lease.repo_ref();
        let git_ref = self
            .config
            .git_ref
            .clone()
            .unwrap_or_else(|| lease.repository().branch().to_string());

        if let Some(definition) = &self.config.workflow_definition {
            until_cancelled(
                cancel,
                Stage::Publish,
                self.publisher.publish_workflow(
                    repo,
                    &git_ref,
                    self.trigger.workflow_id(),
                    definition,
                ),
            )
            .await?;
        }

        until_cancelled(
            cancel,
            Stage::Publish,
            self.publisher.publish(repo, &git_ref, build_input),
        )
        .await?;

        let input_url = raw_content_url(
            &self.config.raw_content_url,
            repo,
            &git_ref,
            self.publisher.content_path(),
        );

        until_cancelled(
            cancel,
            Stage::Trigger,
            self.trigger.trigger(repo, &git_ref, &input_url),
        )
        .await?;

        let release = self.poller.await_release(repo, cancel).await?;

        Ok(BuiltRelease {
            download_url: extract_download_url(repo, &release)?,
            tag: release.tag_name,
        })
    }
}

struct BuiltRelease {
    download_url: String,
    tag: String,
}

/// Validates and returns the first asset's download URL
fn extract_download_url(repo: &RepoRef, release: &Release) -> Result<String> {
    let extract_error = |reason: String| PipelineError::Extract {
        repo: repo.clone(),
        release: release.label().to_string(),
        reason,
    };

    let raw = release
        .first_asset_url()
        .ok_or_else(|| extract_error("release has no assets".to_string()))?;

    let url = reqwest::Url::parse(raw)
        .map_err(|e| extract_error(format!("invalid asset URL {:?}: {}", raw, e)))?;

    if !matches!(url.scheme(), "http" | "https") || !url.has_host() {
        return Err(extract_error(format!(
            "asset URL {:?} is not an absolute http(s) URL",
            raw
        )));
    }

    Ok(raw.to_string())
}

/// Races a pipeline step against cancellation
async fn until_cancelled<T>(
    cancel: &CancellationToken,
    stage: Stage,
    step: impl Future<Output = Result<T>>,
) -> Result<T> {
    tokio::select! {
        biased;
        _ = cancel.cancelled() => Err(PipelineError::Cancelled { stage }),
        result = step => result,
    }
}
