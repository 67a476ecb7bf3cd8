//! Release poller
//!
//! Waits for the remote build workflow to publish a release. The wait is
//! bounded by the poll policy and interruptible through a cancellation
//! token; nothing is locked while sleeping, so concurrent pipelines poll
//! independently.

use shipwright_client::RemoteRepositoryClient;
use shipwright_core::domain::release::{Release, latest_release};
use shipwright_core::domain::repository::RepoRef;
use std::sync::Arc;
use tokio::time::{self, Instant};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::config::PollPolicy;
use crate::error::{PipelineError, Result, Stage};

/// Polls a repository's releases until a usable one appears
pub struct ReleasePoller {
    client: Arc<dyn RemoteRepositoryClient>,
    policy: PollPolicy,
}

impl ReleasePoller {
    /// Creates a poller
    ///
    /// Fails with `Config` when the policy does not bound the wait.
    pub fn new(client: Arc<dyn RemoteRepositoryClient>, policy: PollPolicy) -> Result<Self> {
        policy
            .validate()
            .map_err(|e| PipelineError::Config(format!("{:#}", e)))?;
        Ok(Self { client, policy })
    }

    pub fn policy(&self) -> &PollPolicy {
        &self.policy
    }

    /// Waits for the newest published release that carries at least one asset
    ///
    /// Transient listing errors are logged and polling continues. Permanent
    /// errors (bad credentials, repository gone) abort immediately. The wait
    /// ends with `PollTimeout` once the attempt cap or deadline is reached.
    pub async fn await_release(
        &self,
        repo: &RepoRef,
        cancel: &CancellationToken,
    ) -> Result<Release> {
        info!(
            "Waiting for a release on {} (interval: {:?}, deadline: {:?}, max attempts: {:?})",
            repo, self.policy.interval, self.policy.deadline, self.policy.max_attempts
        );

        let started = Instant::now();
        let mut attempts: u32 = 0;

        loop {
            if cancel.is_cancelled() {
                return Err(PipelineError::Cancelled { stage: Stage::Poll });
            }

            attempts = attempts.saturating_add(1);

            let listing = tokio::select! {
                biased;
                _ = cancel.cancelled() => {
                    return Err(PipelineError::Cancelled { stage: Stage::Poll });
                }
                listing = self.client.list_releases(repo) => listing,
            };

            match listing {
                Ok(releases) => match latest_release(&releases) {
                    Some(release) if release.is_ready() => {
                        info!(
                            "Release {} found on {} after {} attempt(s)",
                            release.label(),
                            repo,
                            attempts
                        );
                        return Ok(release.clone());
                    }
                    Some(release) => {
                        debug!(
                            "Release {} on {} has no assets yet (attempt {})",
                            release.label(),
                            repo,
                            attempts
                        );
                    }
                    None => {
                        debug!("No release on {} yet (attempt {})", repo, attempts);
                    }
                },
                Err(e) if e.is_transient() => {
                    warn!(
                        "Transient error listing releases on {} (attempt {}): {}",
                        repo, attempts, e
                    );
                }
                Err(source) => {
                    return Err(PipelineError::PollRejected {
                        repo: repo.clone(),
                        source,
                    });
                }
            }

            let waited = started.elapsed();

            let attempts_exhausted = self.policy.max_attempts.is_some_and(|max| attempts >= max);
            let deadline_passed = self.policy.deadline.is_some_and(|d| waited >= d);
            if attempts_exhausted || deadline_passed {
                warn!(
                    "Giving up on {} after {} attempt(s) over {:?}",
                    repo, attempts, waited
                );
                return Err(PipelineError::PollTimeout {
                    repo: repo.clone(),
                    attempts,
                    waited,
                });
            }

            let pause = match self.policy.deadline {
                Some(deadline) => self.policy.interval.min(deadline - waited),
                None => self.policy.interval,
            };

            tokio::select! {
                biased;
                _ = cancel.cancelled() => {
                    return Err(PipelineError::Cancelled { stage: Stage::Poll });
                }
                _ = time::sleep(pause) => {}
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{Call, FakeRemote, release};
    use shipwright_client::ClientError;
    use std::time::Duration;

    fn poller(fake: &Arc<FakeRemote>, policy: PollPolicy) -> ReleasePoller {
        ReleasePoller::new(fake.clone(), policy).unwrap()
    }

    fn fast() -> PollPolicy {
        PollPolicy::new(Duration::from_millis(1)).with_max_attempts(50)
    }

    fn list_calls(fake: &FakeRemote) -> usize {
        fake.count(|c| matches!(c, Call::ListReleases(_)))
    }

    #[tokio::test]
    async fn test_issues_exactly_n_plus_one_listings() {
        let fake = Arc::new(FakeRemote::new());
        fake.push_empty(4);
        fake.push_releases(Ok(vec![release(1, 0, &["https://example/asset.apk"])]));

        let release = poller(&fake, fast())
            .await_release(&RepoRef::new("o", "r"), &CancellationToken::new())
            .await
            .unwrap();

        assert_eq!(release.first_asset_url(), Some("https://example/asset.apk"));
        assert_eq!(list_calls(&fake), 5);
    }

    #[tokio::test]
    async fn test_selects_newest_release_not_first_listed() {
        let fake = Arc::new(FakeRemote::new());
        fake.push_releases(Ok(vec![
            release(1, 5, &["https://example/old.apk"]),
            release(2, 40, &["https://example/new.apk"]),
        ]));

        let release = poller(&fake, fast())
            .await_release(&RepoRef::new("o", "r"), &CancellationToken::new())
            .await
            .unwrap();

        assert_eq!(release.id, 2);
    }

    #[tokio::test]
    async fn test_waits_for_assets_to_be_uploaded() {
        let fake = Arc::new(FakeRemote::new());
        fake.push_releases(Ok(vec![release(1, 0, &[])]));
        fake.push_releases(Ok(vec![release(1, 0, &["https://example/a.apk"])]));

        let release = poller(&fake, fast())
            .await_release(&RepoRef::new("o", "r"), &CancellationToken::new())
            .await
            .unwrap();

        assert_eq!(release.first_asset_url(), Some("https://example/a.apk"));
        assert_eq!(list_calls(&fake), 2);
    }

    #[tokio::test]
    async fn test_transient_errors_are_swallowed() {
        let fake = Arc::new(FakeRemote::new());
        fake.push_releases(Err(ClientError::api_error(502, "Bad Gateway")));
        fake.push_releases(Err(ClientError::api_error(429, "slow down")));
        fake.push_releases(Ok(vec![release(1, 0, &["https://example/a.apk"])]));

        let result = poller(&fake, fast())
            .await_release(&RepoRef::new("o", "r"), &CancellationToken::new())
            .await;

        assert!(result.is_ok());
        assert_eq!(list_calls(&fake), 3);
    }

    #[tokio::test]
    async fn test_permanent_error_aborts_immediately() {
        let fake = Arc::new(FakeRemote::new());
        fake.push_releases(Err(ClientError::api_error(401, "Bad credentials")));
        fake.push_releases(Ok(vec![release(1, 0, &["https://example/a.apk"])]));

        let err = poller(&fake, fast())
            .await_release(&RepoRef::new("o", "r"), &CancellationToken::new())
            .await
            .unwrap_err();

        assert!(matches!(err, PipelineError::PollRejected { .. }));
        assert_eq!(list_calls(&fake), 1);
    }

    #[tokio::test]
    async fn test_attempt_cap_times_out() {
        let fake = Arc::new(FakeRemote::new());
        let policy = PollPolicy::new(Duration::from_millis(1)).with_max_attempts(3);

        let err = poller(&fake, policy)
            .await_release(&RepoRef::new("o", "r"), &CancellationToken::new())
            .await
            .unwrap_err();

        assert!(matches!(err, PipelineError::PollTimeout { attempts: 3, .. }));
        assert_eq!(list_calls(&fake), 3);
    }

    #[tokio::test]
    async fn test_deadline_times_out() {
        let fake = Arc::new(FakeRemote::new());
        let mut policy = PollPolicy::new(Duration::from_millis(10))
            .with_deadline(Duration::from_millis(35));
        policy.max_attempts = None;

        let err = poller(&fake, policy)
            .await_release(&RepoRef::new("o", "r"), &CancellationToken::new())
            .await
            .unwrap_err();

        let (attempts, waited) = match err {
            PipelineError::PollTimeout {
                attempts, waited, ..
            } => (attempts, waited),
            other => panic!("expected PollTimeout, got {:?}", other),
        };
        assert!(attempts >= 2);
        assert!(waited >= Duration::from_millis(35));
        assert_eq!(list_calls(&fake), attempts as usize);
    }

    #[tokio::test]
    async fn test_cancellation_interrupts_sleep() {
        let fake = Arc::new(FakeRemote::new());
        let policy = PollPolicy::new(Duration::from_secs(3600)).with_max_attempts(10);
        let cancel = CancellationToken::new();

        let canceller = cancel.clone();
        tokio::spawn(async move {
            time::sleep(Duration::from_millis(20)).await;
            canceller.cancel();
        });

        let started = std::time::Instant::now();
        let err = poller(&fake, policy)
            .await_release(&RepoRef::new("o", "r"), &cancel)
            .await
            .unwrap_err();

        assert!(matches!(err, PipelineError::Cancelled { stage: Stage::Poll }));
        assert!(started.elapsed() < Duration::from_secs(60));
        assert_eq!(list_calls(&fake), 1);
    }

    #[tokio::test]
    async fn test_already_cancelled_makes_no_calls() {
        let fake = Arc::new(FakeRemote::new());
        let cancel = CancellationToken::new();
        cancel.cancel();

        let err = poller(&fake, fast())
            .await_release(&RepoRef::new("o", "r"), &cancel)
            .await
            .unwrap_err();

        assert!(err.is_cancelled());
        assert_eq!(list_calls(&fake), 0);
    }

    #[test]
    fn test_unbounded_policy_is_rejected_at_construction() {
        let fake = Arc::new(FakeRemote::new());
        let unbounded = PollPolicy {
            interval: Duration::from_millis(1),
            deadline: None,
            max_attempts: None,
        };

        let Err(err) = ReleasePoller::new(fake.clone(), unbounded) else {
            panic!("unbounded poll policy was accepted");
        };

        assert!(matches!(err, PipelineError::Config(_)));
        assert!(fake.calls().is_empty());
    }
}
