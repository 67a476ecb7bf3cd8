//! Repository DTOs

use serde::{Deserialize, Serialize};

/// Request to create a repository for the authenticated account
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateRepository {
    pub name: String,
    pub private: bool,
    /// Create an initial commit so the default branch exists
    pub auto_init: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl CreateRepository {
    pub fn new(name: impl Into<String>, private: bool, auto_init: bool) -> Self {
        Self {
            name: name.into(),
            private,
            auto_init,
            description: None,
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }
}
