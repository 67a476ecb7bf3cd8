//! Workflow DTOs

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// One-shot command starting a workflow run on a given ref
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorkflowDispatch {
    #[serde(rename = "ref")]
    pub git_ref: String,
    pub inputs: BTreeMap<String, String>,
}

impl WorkflowDispatch {
    pub fn new(git_ref: impl Into<String>) -> Self {
        Self {
            git_ref: git_ref.into(),
            inputs: BTreeMap::new(),
        }
    }

    pub fn with_input(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.inputs.insert(key.into(), value.into());
        self
    }
}
