//! Remote repository abstraction
//!
//! The packaging pipeline consumes the repository host only through this
//! trait. [`GitHubClient`] is the production implementation; tests provide
//! in-memory fakes.

use async_trait::async_trait;
use shipwright_core::domain::release::Release;
use shipwright_core::domain::repository::{RepoRef, Repository};
use shipwright_core::dto::content::PutFileContents;
use shipwright_core::dto::repository::CreateRepository;
use shipwright_core::dto::workflow::WorkflowDispatch;

use crate::GitHubClient;
use crate::error::Result;

/// Operations the pipeline needs from a repository host
///
/// Every call has a remote side effect or reads remote state; none of them
/// is retried by the implementation.
#[async_trait]
pub trait RemoteRepositoryClient: Send + Sync {
    /// Creates a repository owned by the authenticated account
    async fn create_repository(&self, req: &CreateRepository) -> Result<Repository>;

    /// Writes one file (base64 content) into a repository
    async fn create_or_update_file(
        &self,
        repo: &RepoRef,
        path: &str,
        req: &PutFileContents,
    ) -> Result<()>;

    /// Dispatches a workflow run
    async fn create_workflow_dispatch(
        &self,
        repo: &RepoRef,
        workflow_id: &str,
        dispatch: &WorkflowDispatch,
    ) -> Result<()>;

    /// Lists releases of a repository, in no guaranteed order
    async fn list_releases(&self, repo: &RepoRef) -> Result<Vec<Release>>;

    /// Deletes a repository
    async fn delete_repository(&self, repo: &RepoRef) -> Result<()>;

    /// Lists repositories owned by the authenticated account
    async fn list_repositories(&self) -> Result<Vec<Repository>>;
}

#[async_trait]
impl RemoteRepositoryClient for GitHubClient {
    async fn create_repository(&self, req: &CreateRepository) -> Result<Repository> {
        GitHubClient::create_repository(self, req).await
    }

    async fn create_or_update_file(
        &self,
        repo: &RepoRef,
        path: &str,
        req: &PutFileContents,
    ) -> Result<()> {
        GitHubClient::create_or_update_file(self, repo, path, req).await
    }

    async fn create_workflow_dispatch(
        &self,
        repo: &RepoRef,
        workflow_id: &str,
        dispatch: &WorkflowDispatch,
    ) -> Result<()> {
        GitHubClient::create_workflow_dispatch(self, repo, workflow_id, dispatch).await
    }

    async fn list_releases(&self, repo: &RepoRef) -> Result<Vec<Release>> {
        GitHubClient::list_releases(self, repo).await
    }

    async fn delete_repository(&self, repo: &RepoRef) -> Result<()> {
        GitHubClient::delete_repository(self, repo).await
    }

    async fn list_repositories(&self) -> Result<Vec<Repository>> {
        GitHubClient::list_repositories(self).await
    }
}
