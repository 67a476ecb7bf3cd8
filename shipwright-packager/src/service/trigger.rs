//! Build trigger
//!
//! Dispatches the remote build workflow, pointing it at the published input.

use shipwright_client::RemoteRepositoryClient;
use shipwright_core::domain::repository::RepoRef;
use shipwright_core::dto::workflow::WorkflowDispatch;
use std::sync::Arc;
use tracing::info;

use crate::error::{PipelineError, Result};

/// Workflow input carrying the URL of the published build input
pub const INPUT_URL_KEY: &str = "html_url";

/// Dispatches one workflow in transient repositories
pub struct BuildTrigger {
    client: Arc<dyn RemoteRepositoryClient>,
    workflow_id: String,
}

impl BuildTrigger {
    pub fn new(client: Arc<dyn RemoteRepositoryClient>, workflow_id: impl Into<String>) -> Self {
        Self {
            client,
            workflow_id: workflow_id.into(),
        }
    }

    pub fn workflow_id(&self) -> &str {
        &self.workflow_id
    }

    /// Dispatches the workflow on `git_ref` with `input_url` as its only input
    pub async fn trigger(&self, repo: &RepoRef, git_ref: &str, input_url: &str) -> Result<()> {
        info!(
            "Dispatching workflow {} on {}@{}",
            self.workflow_id, repo, git_ref
        );

        let dispatch = WorkflowDispatch::new(git_ref).with_input(INPUT_URL_KEY, input_url);

        self.client
            .create_workflow_dispatch(repo, &self.workflow_id, &dispatch)
            .await
            .map_err(|source| PipelineError::Dispatch {
                repo: repo.clone(),
                workflow: self.workflow_id.clone(),
                source,
            })
    }
}

/// Absolute URL serving the raw content of `path` on `git_ref`
pub fn raw_content_url(raw_base: &str, repo: &RepoRef, git_ref: &str, path: &str) -> String {
    format!(
        "{}/{}/{}/{}/{}",
        raw_base.trim_end_matches('/'),
        repo.owner,
        repo.name,
        git_ref,
        path.trim_start_matches('/')
    )
}
