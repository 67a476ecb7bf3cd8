//! File content API endpoints

use crate::GitHubClient;
use crate::error::{ClientError, Result};
use shipwright_core::domain::repository::RepoRef;
use shipwright_core::dto::content::PutFileContents;

impl GitHubClient {
    /// Create or replace a single file
    ///
    /// # Arguments
    /// * `repo` - The target repository
    /// * `path` - Repository-relative path (e.g., "www/index.html")
    /// * `req` - Commit message and base64-encoded content
    pub async fn create_or_update_file(
        &self,
        repo: &RepoRef,
        path: &str,
        req: &PutFileContents,
    ) -> Result<()> {
        let url = contents_url(&self.base_url, repo, path)?;
        let response = self.client.put(&url).json(req).send().await?;

        self.handle_empty_response(response).await
    }
}

fn contents_url(base_url: &str, repo: &RepoRef, path: &str) -> Result<String> {
    let path = path.trim_start_matches('/');
    if path.is_empty() {
        return Err(ClientError::InvalidRequest(
            "file path must not be empty".to_string(),
        ));
    }

    Ok(format!(
        "{}/repos/{}/{}/contents/{}",
        base_url, repo.owner, repo.name, path
    ))
}
