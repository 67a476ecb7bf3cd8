//! Repository-related API endpoints

use crate::GitHubClient;
use crate::error::Result;
use shipwright_core::domain::repository::{RepoRef, Repository};
use shipwright_core::dto::repository::CreateRepository;
use tracing::debug;

/// Page size used when listing repositories
const PAGE_SIZE: usize = 100;

impl GitHubClient {
    // =============================================================================
    // Repository Lifecycle
    // =============================================================================

    /// Create a repository owned by the authenticated account
    ///
    /// # Arguments
    /// * `req` - The repository creation request
    ///
    /// # Returns
    /// The created repository, including its owner login and default branch
    pub async fn create_repository(&self, req: &CreateRepository) -> Result<Repository> {
        let url = format!("{}/user/repos", self.base_url);
        let response = self.client.post(&url).json(req).send().await?;

        self.handle_response(response).await
    }

    /// Delete a repository
    ///
    /// Requires the `delete_repo` scope on the credential.
    ///
    /// # Arguments
    /// * `repo` - The repository to delete
    pub async fn delete_repository(&self, repo: &RepoRef) -> Result<()> {
        let url = format!("{}/repos/{}/{}", self.base_url, repo.owner, repo.name);
        let response = self.client.delete(&url).send().await?;

        self.handle_empty_response(response).await
    }

    // =============================================================================
    // Repository Query
    // =============================================================================

    /// List every repository owned by the authenticated account
    ///
    /// Follows pagination until a short page is returned.
    pub async fn list_repositories(&self) -> Result<Vec<Repository>> {
        let url = format!("{}/user/repos", self.base_url);
        let mut repositories = Vec::new();
        let mut page = 1usize;

        loop {
            let response = self
                .client
                .get(&url)
                .query(&[
                    ("affiliation", "owner".to_string()),
                    ("per_page", PAGE_SIZE.to_string()),
                    ("page", page.to_string()),
                ])
                .send()
                .await?;

            let batch: Vec<Repository> = self.handle_response(response).await?;
            let fetched = batch.len();
            repositories.extend(batch);

            debug!("Fetched repository page {} ({} entries)", page, fetched);

            if fetched < PAGE_SIZE {
                return Ok(repositories);
            }
            page += 1;
        }
    }
}
