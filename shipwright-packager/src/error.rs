//! Pipeline error types
//!
//! Every failure carries the stage it happened in, so callers can tell a
//! repository that was never created apart from a build that never finished.

use shipwright_client::ClientError;
use shipwright_core::domain::repository::RepoRef;
use std::time::Duration;
use thiserror::Error;

/// Result type alias for pipeline operations
pub type Result<T> = std::result::Result<T, PipelineError>;

/// Pipeline stage, in execution order
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    /// Configuration and client construction, before any remote call
    Setup,
    Create,
    Publish,
    Trigger,
    Poll,
    Extract,
    Cleanup,
}

impl std::fmt::Display for Stage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Stage::Setup => write!(f, "setup"),
            Stage::Create => write!(f, "create"),
            Stage::Publish => write!(f, "publish"),
            Stage::Trigger => write!(f, "trigger"),
            Stage::Poll => write!(f, "poll"),
            Stage::Extract => write!(f, "extract"),
            Stage::Cleanup => write!(f, "cleanup"),
        }
    }
}

/// Errors that terminate (or, for cleanup, accompany) a pipeline run
#[derive(Debug, Error)]
pub enum PipelineError {
    /// The transient repository could not be created
    #[error("failed to create transient repository '{name}': {source}")]
    RepoCreate {
        name: String,
        #[source]
        source: ClientError,
    },

    /// A file could not be written into the transient repository
    #[error("failed to write '{path}' to {repo}: {source}")]
    RemoteWrite {
        repo: RepoRef,
        path: String,
        #[source]
        source: ClientError,
    },

    /// The remote host rejected the workflow dispatch
    #[error("failed to dispatch workflow '{workflow}' on {repo}: {source}")]
    Dispatch {
        repo: RepoRef,
        workflow: String,
        #[source]
        source: ClientError,
    },

    /// No release appeared before the poll bound was reached
    #[error("no release appeared on {repo} after {attempts} attempt(s) over {waited:?}")]
    PollTimeout {
        repo: RepoRef,
        attempts: u32,
        waited: Duration,
    },

    /// Listing releases failed with an error that retrying cannot fix
    #[error("release polling on {repo} rejected by the remote host: {source}")]
    PollRejected {
        repo: RepoRef,
        #[source]
        source: ClientError,
    },

    /// The release exists but does not expose a usable download URL
    #[error("release '{release}' on {repo} has no usable download URL: {reason}")]
    Extract {
        repo: RepoRef,
        release: String,
        reason: String,
    },

    /// The transient repository could not be deleted
    #[error("failed to delete transient repository {repo}: {source}")]
    RepoDelete {
        repo: RepoRef,
        #[source]
        source: ClientError,
    },

    /// The caller cancelled the run
    #[error("pipeline cancelled during {stage}")]
    Cancelled { stage: Stage },

    /// Unclassified transport failure, e.g. while building the HTTP client
    #[error("remote transport error: {0}")]
    RemoteTransport(#[from] ClientError),

    /// Invalid configuration
    #[error("invalid configuration: {0}")]
    Config(String),
}

impl PipelineError {
    /// Stage the error originated from
    pub fn stage(&self) -> Stage {
        match self {
            Self::RepoCreate { .. } => Stage::Create,
            Self::RemoteWrite { .. } => Stage::Publish,
            Self::Dispatch { .. } => Stage::Trigger,
            Self::PollTimeout { .. } | Self::PollRejected { .. } => Stage::Poll,
            Self::Extract { .. } => Stage::Extract,
            Self::RepoDelete { .. } => Stage::Cleanup,
            Self::Cancelled { stage } => *stage,
            Self::RemoteTransport(_) | Self::Config(_) => Stage::Setup,
        }
    }

    /// Check if this error was caused by cancellation
    pub fn is_cancelled(&self) -> bool {
        matches!(self, Self::Cancelled { .. })
    }
}
