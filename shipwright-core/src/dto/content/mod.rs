//! File content DTOs

use serde::{Deserialize, Serialize};

/// Request to create or update a single file in a repository
///
/// `content` must already be base64 encoded.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PutFileContents {
    pub message: String,
    pub content: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub branch: Option<String>,
    /// Blob SHA of the file being replaced; required by the host for updates
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sha: Option<String>,
}

impl PutFileContents {
    pub fn new(message: impl Into<String>, encoded_content: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            content: encoded_content.into(),
            branch: None,
            sha: None,
        }
    }

    pub fn on_branch(mut self, branch: impl Into<String>) -> Self {
        self.branch = Some(branch.into());
        self
    }
}
