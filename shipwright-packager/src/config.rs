//! Packager configuration
//!
//! Defines every tunable of a pipeline run: where the remote host lives,
//! how transient repositories are named, which workflow is dispatched and
//! how long to wait for its release.

use std::time::Duration;

use crate::naming;

/// Public GitHub REST endpoint
pub const DEFAULT_API_URL: &str = shipwright_client::DEFAULT_API_URL;

/// Host serving raw file contents of public and private repositories
pub const DEFAULT_RAW_CONTENT_URL: &str = "https://raw.githubusercontent.com";

pub const DEFAULT_REPO_PREFIX: &str = "scratch-android-app";
pub const DEFAULT_WORKFLOW_ID: &str = "build-android.yml";
pub const DEFAULT_CONTENT_PATH: &str = "www/index.html";
pub const DEFAULT_COMMIT_MESSAGE: &str = "Add Scratch HTML file";

pub const DEFAULT_POLL_DEADLINE: Duration = Duration::from_secs(30 * 60);

/// Bounds on the wait for the release
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PollPolicy {
    /// Pause between two release listings
    pub interval: Duration,

    /// Total time allowed for the release to appear
    pub deadline: Option<Duration>,

    /// Maximum number of release listings
    pub max_attempts: Option<u32>,
}

impl PollPolicy {
    pub fn new(interval: Duration) -> Self {
        Self {
            interval,
            deadline: Some(DEFAULT_POLL_DEADLINE),
            max_attempts: None,
        }
    }

    pub fn with_deadline(mut self, deadline: Duration) -> Self {
        self.deadline = Some(deadline);
        self
    }

    pub fn with_max_attempts(mut self, max_attempts: u32) -> Self {
        self.max_attempts = Some(max_attempts);
        self
    }

    /// Validates the policy
    ///
    /// At least one bound must be set; an unbounded wait is rejected.
    pub fn validate(&self) -> anyhow::Result<()> {
        if self.interval.is_zero() {
            anyhow::bail!("poll interval must be greater than 0");
        }

        if self.deadline.is_some_and(|d| d.is_zero()) {
            anyhow::bail!("poll deadline must be greater than 0");
        }

        if self.max_attempts == Some(0) {
            anyhow::bail!("poll max_attempts must be greater than 0");
        }

        if self.deadline.is_none() && self.max_attempts.is_none() {
            anyhow::bail!("polling must be bounded by a deadline or a maximum attempt count");
        }

        Ok(())
    }
}

impl Default for PollPolicy {
    fn default() -> Self {
        Self::new(Duration::from_secs(10))
    }
}

/// Packager configuration
#[derive(Debug, Clone)]
pub struct PackagerConfig {
    /// REST API base URL (e.g., "https://api.github.com")
    pub api_url: String,

    /// Base URL the build workflow downloads the published input from
    pub raw_content_url: String,

    /// Prefix of transient repository names
    pub repo_prefix: String,

    /// Create transient repositories as private
    pub private: bool,

    /// Create transient repositories with an initial commit
    pub auto_init: bool,

    /// Workflow file dispatched in the transient repository
    pub workflow_id: String,

    /// Ref to publish to and dispatch on; the repository default branch when unset
    pub git_ref: Option<String>,

    /// Repository path the build input is written to
    pub content_path: String,

    /// Commit message used when writing the build input
    pub commit_message: String,

    /// Workflow definition seeded into `.github/workflows/` before dispatching
    pub workflow_definition: Option<Vec<u8>>,

    /// Bounds on the release wait
    pub poll: PollPolicy,
}

impl PackagerConfig {
    /// Creates a new configuration with defaults
    pub fn new() -> Self {
        Self {
            api_url: DEFAULT_API_URL.to_string(),
            raw_content_url: DEFAULT_RAW_CONTENT_URL.to_string(),
            repo_prefix: DEFAULT_REPO_PREFIX.to_string(),
            private: true,
            auto_init: true,
            workflow_id: DEFAULT_WORKFLOW_ID.to_string(),
            git_ref: None,
            content_path: DEFAULT_CONTENT_PATH.to_string(),
            commit_message: DEFAULT_COMMIT_MESSAGE.to_string(),
            workflow_definition: None,
            poll: PollPolicy::default(),
        }
    }

    /// Creates configuration from environment variables
    ///
    /// Expected environment variables (all optional):
    /// - SHIPWRIGHT_API_URL (default: https://api.github.com)
    /// - SHIPWRIGHT_RAW_URL (default: https://raw.githubusercontent.com)
    /// - SHIPWRIGHT_REPO_PREFIX (default: scratch-android-app)
    /// - SHIPWRIGHT_WORKFLOW (default: build-android.yml)
    /// - SHIPWRIGHT_REF (default: repository default branch)
    /// - SHIPWRIGHT_CONTENT_PATH (default: www/index.html)
    /// - SHIPWRIGHT_POLL_INTERVAL (seconds, default: 10)
    /// - SHIPWRIGHT_POLL_DEADLINE (seconds, default: 1800)
    /// - SHIPWRIGHT_POLL_MAX_ATTEMPTS (default: unset)
    /// - SHIPWRIGHT_PRIVATE (true/false, default: true)
    pub fn from_env() -> anyhow::Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Creates configuration from an arbitrary key lookup
    pub fn from_lookup<F>(lookup: F) -> anyhow::Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::new();

        if let Some(url) = lookup("SHIPWRIGHT_API_URL") {
            config.api_url = url;
        }

        if let Some(url) = lookup("SHIPWRIGHT_RAW_URL") {
            config.raw_content_url = url;
        }

        if let Some(prefix) = lookup("SHIPWRIGHT_REPO_PREFIX") {
            config.repo_prefix = prefix;
        }

        if let Some(workflow) = lookup("SHIPWRIGHT_WORKFLOW") {
            config.workflow_id = workflow;
        }

        config.git_ref = lookup("SHIPWRIGHT_REF").filter(|r| !r.is_empty());

        if let Some(path) = lookup("SHIPWRIGHT_CONTENT_PATH") {
            config.content_path = path;
        }

        if let Some(secs) = parse_var::<u64>(&lookup, "SHIPWRIGHT_POLL_INTERVAL")? {
            config.poll.interval = Duration::from_secs(secs);
        }

        if let Some(secs) = parse_var::<u64>(&lookup, "SHIPWRIGHT_POLL_DEADLINE")? {
            config.poll.deadline = Some(Duration::from_secs(secs));
        }

        if let Some(attempts) = parse_var::<u32>(&lookup, "SHIPWRIGHT_POLL_MAX_ATTEMPTS")? {
            config.poll.max_attempts = Some(attempts);
        }

        if let Some(private) = parse_var::<bool>(&lookup, "SHIPWRIGHT_PRIVATE")? {
            config.private = private;
        }

        Ok(config)
    }

    pub fn with_api_url(mut self, api_url: impl Into<String>) -> Self {
        self.api_url = api_url.into();
        self
    }

    pub fn with_git_ref(mut self, git_ref: impl Into<String>) -> Self {
        self.git_ref = Some(git_ref.into());
        self
    }

    pub fn with_workflow_definition(mut self, definition: Vec<u8>) -> Self {
        self.workflow_definition = Some(definition);
        self
    }

    pub fn with_poll(mut self, poll: PollPolicy) -> Self {
        self.poll = poll;
        self
    }

    /// Validates the configuration
    pub fn validate(&self) -> anyhow::Result<()> {
        validate_http_url("api_url", &self.api_url)?;
        validate_http_url("raw_content_url", &self.raw_content_url)?;

        naming::validate_prefix(&self.repo_prefix)?;

        if self.workflow_id.trim().is_empty() {
            anyhow::bail!("workflow_id cannot be empty");
        }

        if self.workflow_id.contains('/') {
            anyhow::bail!("workflow_id must be a file name, not a path");
        }

        if self.content_path.trim_matches('/').is_empty() {
            anyhow::bail!("content_path cannot be empty");
        }

        if self.commit_message.trim().is_empty() {
            anyhow::bail!("commit_message cannot be empty");
        }

        if self.git_ref.as_deref().is_some_and(|r| r.trim().is_empty()) {
            anyhow::bail!("git_ref cannot be blank");
        }

        if self.workflow_definition.as_ref().is_some_and(|d| d.is_empty()) {
            anyhow::bail!("workflow_definition cannot be empty");
        }

        self.poll.validate()
    }
}

impl Default for PackagerConfig {
    fn default() -> Self {
        Self::new()
    }
}

fn validate_http_url(field: &str, url: &str) -> anyhow::Result<()> {
    if url.is_empty() {
        anyhow::bail!("{} cannot be empty", field);
    }

    if !url.starts_with("http://") && !url.starts_with("https://") {
        anyhow::bail!("{} must start with http:// or https://", field);
    }

    Ok(())
}

fn parse_var<T>(lookup: &impl Fn(&str) -> Option<String>, key: &str) -> anyhow::Result<Option<T>>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    match lookup(key) {
        None => Ok(None),
        Some(raw) => raw
            .trim()
            .parse::<T>()
            .map(Some)
            .map_err(|e| anyhow::anyhow!("{} has invalid value {:?}: {}", key, raw, e)),
    }
}
