//! Release API endpoints

use crate::GitHubClient;
use crate::error::Result;
use shipwright_core::domain::release::Release;
use shipwright_core::domain::repository::RepoRef;

impl GitHubClient {
    /// List releases of a repository
    ///
    /// The host documents no ordering guarantee for this listing; callers
    /// pick a release by `created_at` instead of position.
    pub async fn list_releases(&self, repo: &RepoRef) -> Result<Vec<Release>> {
        let url = format!(
            "{}/repos/{}/{}/releases",
            self.base_url, repo.owner, repo.name
        );
        let response = self
            .client
            .get(&url)
            .query(&[("per_page", "100")])
            .send()
            .await?;

        self.handle_response(response).await
    }
}
