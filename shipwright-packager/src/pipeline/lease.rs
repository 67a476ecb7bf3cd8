//! Transient repository lease
//!
//! A lease owns one transient repository from creation until deletion.
//! `release` deletes it and reports the outcome. A lease dropped without
//! being released (for instance because the caller dropped the pipeline
//! future) schedules the deletion on the current tokio runtime instead.

use shipwright_client::RemoteRepositoryClient;
use shipwright_core::domain::repository::{RepoRef, Repository};
use std::sync::Arc;
use tracing::{error, info, warn};

use crate::error::{PipelineError, Result};

/// Exclusive ownership of a transient repository
pub struct RepositoryLease {
    client: Arc<dyn RemoteRepositoryClient>,
    repository: Repository,
    repo_ref: RepoRef,
    released: bool,
}

impl RepositoryLease {
    /// Takes ownership of a freshly created repository
    pub fn new(client: Arc<dyn RemoteRepositoryClient>, repository: Repository) -> Self {
        let repo_ref = repository.repo_ref();
        Self {
            client,
            repository,
            repo_ref,
            released: false,
        }
    }

    pub fn repository(&self) -> &Repository {
        &self.repository
    }

    pub fn repo_ref(&self) -> &RepoRef {
        &self.repo_ref
    }

    /// Deletes the repository
    ///
    /// A repository that is already gone counts as deleted.
    /// If the returned future is dropped before the deletion finishes, the
    /// lease is still unreleased and Drop schedules the deletion again.
    pub async fn release(mut self) -> Result<()> {
        let result = delete(self.client.as_ref(), &self.repo_ref).await;
        self.released = true;
        result
    }
}

impl Drop for RepositoryLease {
    fn drop(&mut self) {
        if self.released {
            return;
        }

        let repo = self.repo_ref.clone();
        match tokio::runtime::Handle::try_current() {
            Ok(handle) => {
                warn!(
                    "Lease on {} dropped before release, scheduling deletion",
                    repo
                );
                let client = Arc::clone(&self.client);
                handle.spawn(async move {
                    if let Err(e) = delete(client.as_ref(), &repo).await {
                        error!("Deferred cleanup failed: {}", e);
                    }
                });
            }
            Err(_) => {
                error!(
                    "Lease on {} dropped outside a runtime, repository leaked",
                    repo
                );
            }
        }
    }
}

async fn delete(client: &dyn RemoteRepositoryClient, repo: &RepoRef) -> Result<()> {
    match client.delete_repository(repo).await {
        Ok(()) => {
            info!("Deleted transient repository {}", repo);
            Ok(())
        }
        Err(e) if e.is_not_found() => {
            warn!("Transient repository {} was already gone", repo);
            Ok(())
        }
        Err(source) => Err(PipelineError::RepoDelete {
            repo: repo.clone(),
            source,
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{FakeRemote, OWNER};
    use shipwright_client::ClientError;
    use shipwright_core::dto::repository::CreateRepository;
    use std::time::Duration;

    async fn lease(fake: &Arc<FakeRemote>, name: &str) -> RepositoryLease {
        let repository = fake
            .create_repository(&CreateRepository::new(name, true, true))
            .await
            .unwrap();
        RepositoryLease::new(fake.clone(), repository)
    }

    #[tokio::test]
    async fn test_release_deletes_once() {
        let fake = Arc::new(FakeRemote::new());
        let lease = lease(&fake, "tmp").await;

        lease.release().await.unwrap();

        assert_eq!(fake.deleted(), vec![RepoRef::new(OWNER, "tmp")]);
    }

    #[tokio::test]
    async fn test_release_tolerates_missing_repository() {
        let fake = Arc::new(FakeRemote::new());
        fake.fail_delete(ClientError::NotFound("Not Found".to_string()));
        let lease = lease(&fake, "tmp").await;

        assert!(lease.release().await.is_ok());
    }

    #[tokio::test]
    async fn test_release_reports_delete_failure() {
        let fake = Arc::new(FakeRemote::new());
        fake.fail_delete(ClientError::api_error(403, "Must have admin rights"));
        let lease = lease(&fake, "tmp").await;

        let err = lease.release().await.unwrap_err();
        assert!(matches!(err, PipelineError::RepoDelete { .. }));
    }

    #[tokio::test]
    async fn test_drop_without_release_schedules_deletion() {
        let fake = Arc::new(FakeRemote::new());
        drop(lease(&fake, "orphan").await);

        for _ in 0..50 {
            if !fake.deleted().is_empty() {
                break;
            }
            tokio::time::sleep(Duration::from_millis(5)).await;
        }

        assert_eq!(fake.deleted(), vec![RepoRef::new(OWNER, "orphan")]);
    }

    #[tokio::test]
    async fn test_release_dropped_mid_delete_still_deletes() {
        let fake = Arc::new(FakeRemote::new());
        fake.stall_delete(Duration::from_secs(60));
        let lease = lease(&fake, "interrupted").await;

        let interrupted = tokio::time::timeout(Duration::from_millis(20), lease.release()).await;
        assert!(interrupted.is_err());

        for _ in 0..50 {
            if fake.deleted().len() >= 2 {
                break;
            }
            tokio::time::sleep(Duration::from_millis(5)).await;
        }

        let repo = RepoRef::new(OWNER, "interrupted");
        assert_eq!(fake.deleted(), vec![repo.clone(), repo]);
    }
}
