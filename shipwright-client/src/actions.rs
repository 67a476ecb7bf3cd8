//! Actions (workflow) API endpoints

use crate::GitHubClient;
use crate::error::{ClientError, Result};
use shipwright_core::domain::repository::RepoRef;
use shipwright_core::dto::workflow::WorkflowDispatch;

impl GitHubClient {
    /// Start a workflow run through a `workflow_dispatch` event
    ///
    /// The host answers 204 with no body; the run itself is not returned.
    ///
    /// # Arguments
    /// * `repo` - The repository holding the workflow definition
    /// * `workflow_id` - Workflow file name (e.g., "build-android.yml") or numeric id
    /// * `dispatch` - Ref to run on and the workflow inputs
    pub async fn create_workflow_dispatch(
        &self,
        repo: &RepoRef,
        workflow_id: &str,
        dispatch: &WorkflowDispatch,
    ) -> Result<()> {
        if workflow_id.trim().is_empty() {
            return Err(ClientError::InvalidRequest(
                "workflow id must not be empty".to_string(),
            ));
        }

        let url = format!(
            "{}/repos/{}/{}/actions/workflows/{}/dispatches",
            self.base_url, repo.owner, repo.name, workflow_id
        );
        let response = self.client.post(&url).json(dispatch).send().await?;

        self.handle_empty_response(response).await
    }
}
