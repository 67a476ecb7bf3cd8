//! Artifact publisher
//!
//! Writes the build input (and optionally the workflow definition) into the
//! transient repository.

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use shipwright_client::RemoteRepositoryClient;
use shipwright_core::domain::repository::RepoRef;
use shipwright_core::dto::content::PutFileContents;
use std::sync::Arc;
use tracing::{debug, info};

use crate::error::{PipelineError, Result};

const WORKFLOW_DIR: &str = ".github/workflows";
const WORKFLOW_COMMIT_MESSAGE: &str = "Add build workflow";

/// Publishes files into a transient repository
pub struct ArtifactPublisher {
    client: Arc<dyn RemoteRepositoryClient>,
    content_path: String,
    commit_message: String,
}

impl ArtifactPublisher {
    /// Creates a new publisher
    ///
    /// # Arguments
    /// * `client` - Remote repository client
    /// * `content_path` - Path the build input is written to (e.g., "www/index.html")
    /// * `commit_message` - Commit message for the build input
    pub fn new(
        client: Arc<dyn RemoteRepositoryClient>,
        content_path: impl Into<String>,
        commit_message: impl Into<String>,
    ) -> Self {
        Self {
            client,
            content_path: content_path.into().trim_start_matches('/').to_string(),
            commit_message: commit_message.into(),
        }
    }

    /// Repository path the build input is written to
    pub fn content_path(&self) -> &str {
        &self.content_path
    }

    /// Writes the build input to the content path on `branch`
    pub async fn publish(&self, repo: &RepoRef, branch: &str, content: &[u8]) -> Result<()> {
        info!(
            "Publishing {} byte(s) to {}:{}",
            content.len(),
            repo,
            self.content_path
        );

        self.write(repo, branch, &self.content_path, &self.commit_message, content)
            .await
    }

    /// Writes a workflow definition to `.github/workflows/{workflow_id}` on `branch`
    pub async fn publish_workflow(
        &self,
        repo: &RepoRef,
        branch: &str,
        workflow_id: &str,
        definition: &[u8],
    ) -> Result<()> {
        let path = format!("{}/{}", WORKFLOW_DIR, workflow_id);
        info!("Seeding workflow definition {}:{}", repo, path);

        self.write(repo, branch, &path, WORKFLOW_COMMIT_MESSAGE, definition)
            .await
    }

    async fn write(
        &self,
        repo: &RepoRef,
        branch: &str,
        path: &str,
        message: &str,
        content: &[u8],
    ) -> Result<()> {
        let request = PutFileContents::new(message, STANDARD.encode(content)).on_branch(branch);

        self.client
            .create_or_update_file(repo, path, &request)
            .await
            .map_err(|source| PipelineError::RemoteWrite {
                repo: repo.clone(),
                path: path.to_string(),
                source,
            })?;

        debug!("Wrote {} to {}", path, repo);
        Ok(())
    }
}
