//! Shipwright Packager
//!
//! Turns an HTML application bundle into a native mobile build by handing
//! it to a remote CI workflow through a disposable repository.
//!
//! Architecture:
//! - Configuration: Naming, workflow and polling settings ([`config`])
//! - Services: Artifact publisher and build trigger ([`service`])
//! - Poller: Bounded, cancellable wait for the release ([`poller`])
//! - Pipeline: Orchestrator and transient repository lease ([`pipeline`])
//!
//! The remote host is consumed through
//! [`shipwright_client::RemoteRepositoryClient`]; [`package`] wires the
//! production GitHub client for callers that only have a credential.

pub mod config;
pub mod error;
pub mod naming;
pub mod pipeline;
pub mod poller;
pub mod service;
pub mod sweep;

#[cfg(test)]
mod testing;

pub use config::{PackagerConfig, PollPolicy};
pub use error::{PipelineError, Result, Stage};
pub use pipeline::{PackageOutcome, Packager};
pub use tokio_util::sync::CancellationToken;

use shipwright_client::GitHubClient;
use shipwright_core::domain::request::PipelineRequest;
use std::sync::Arc;

/// Packages one build input with the production GitHub client
///
/// Validates `config`, builds a client authenticated with the request's
/// credential and runs the pipeline. Returns the download URL of the built
/// artifact, or the error of the stage that failed.
pub async fn package(
    config: PackagerConfig,
    request: PipelineRequest,
    cancel: CancellationToken,
) -> Result<PackageOutcome> {
    config
        .validate()
        .map_err(|e| PipelineError::Config(format!("{:#}", e)))?;

    if request.credential.is_empty() {
        return Err(PipelineError::Config("credential cannot be empty".to_string()));
    }

    let client = GitHubClient::with_base_url(config.api_url.clone(), &request.credential)?;
    let packager = Packager::new(Arc::new(client), config)?;

    packager.run(&request.build_input, &cancel).await
}
