//! Shipwright Repository Host Client
//!
//! A small, type-safe client for the parts of the GitHub REST API the
//! packaging pipeline needs: repositories, file contents, workflow dispatches
//! and releases.
//!
//! The pipeline never talks to [`GitHubClient`] directly. It consumes the
//! [`RemoteRepositoryClient`] trait, so tests and alternative hosts can plug
//! in their own implementation.
//!
//! # Example
//!
//! ```no_run
//! use shipwright_client::GitHubClient;
//! use shipwright_core::domain::request::Credential;
//! use shipwright_core::dto::repository::CreateRepository;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let client = GitHubClient::new(&Credential::new("ghp_example"))?;
//!
//!     let repo = client
//!         .create_repository(&CreateRepository::new("scratch-android-app-1", true, true))
//!         .await?;
//!
//!     println!("Created repository: {}", repo.full_name);
//!     Ok(())
//! }
//! ```

mod actions;
mod contents;
pub mod error;
mod releases;
mod remote;
mod repos;

// Re-export commonly used types
pub use error::{ClientError, Result};
pub use remote::RemoteRepositoryClient;

use reqwest::Client;
use reqwest::header::{ACCEPT, AUTHORIZATION, HeaderMap, HeaderValue, USER_AGENT};
use serde::de::DeserializeOwned;
use shipwright_core::domain::request::Credential;
use std::time::Duration;

/// Public GitHub REST endpoint
pub const DEFAULT_API_URL: &str = "https://api.github.com";

/// REST API version pinned for every request
pub const API_VERSION: &str = "2022-11-28";

const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// HTTP client for the GitHub REST API
///
/// The bearer credential is installed once, as a default header, when the
/// client is constructed.
#[derive(Debug, Clone)]
pub struct GitHubClient {
    /// Base URL of the API (e.g., "https://api.github.com")
    base_url: String,
    /// HTTP client instance
    client: Client,
}

impl GitHubClient {
    /// Create a client for the public GitHub API
    pub fn new(credential: &Credential) -> Result<Self> {
        Self::with_base_url(DEFAULT_API_URL, credential)
    }

    /// Create a client for a specific API endpoint (e.g., GitHub Enterprise)
    ///
    /// # Arguments
    /// * `base_url` - The base URL of the REST API
    /// * `credential` - Bearer token sent with every request
    pub fn with_base_url(base_url: impl Into<String>, credential: &Credential) -> Result<Self> {
        if credential.is_empty() {
            return Err(ClientError::InvalidRequest(
                "credential must not be empty".to_string(),
            ));
        }

        let client = Client::builder()
            .default_headers(default_headers(credential)?)
            .timeout(REQUEST_TIMEOUT)
            .build()?;

        Ok(Self::with_client(base_url, client))
    }

    /// Create a client with a custom HTTP client
    ///
    /// The provided client must already carry the authorization headers.
    ///
    /// # Example
    /// ```
    /// use shipwright_client::GitHubClient;
    /// use reqwest::Client;
    ///
    /// let client = GitHubClient::with_client("https://github.example.com/api/v3/", Client::new());
    /// assert_eq!(client.base_url(), "https://github.example.com/api/v3");
    /// ```
    pub fn with_client(base_url: impl Into<String>, client: Client) -> Self {
        let base_url = base_url.into();
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            client,
        }
    }

    /// Get the base URL of the API
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    // =============================================================================
    // Response Handlers
    // =============================================================================

    /// Handle an API response and deserialize JSON
    ///
    /// This method checks the status code and returns an appropriate error if
    /// the request failed, or deserializes the response body if successful.
    async fn handle_response<T: DeserializeOwned>(&self, response: reqwest::Response) -> Result<T> {
        let response = self.check_status(response).await?;

        response
            .json()
            .await
            .map_err(|e| ClientError::ParseError(format!("Failed to parse JSON response: {}", e)))
    }

    /// Handle an API response whose body is not needed (e.g., DELETE operations)
    async fn handle_empty_response(&self, response: reqwest::Response) -> Result<()> {
        self.check_status(response).await.map(|_| ())
    }

    async fn check_status(&self, response: reqwest::Response) -> Result<reqwest::Response> {
        let status = response.status();

        if status.is_success() {
            return Ok(response);
        }

        let error_text = response
            .text()
            .await
            .unwrap_or_else(|_| "Unknown error".to_string());
        let message = extract_message(&error_text);

        if status == reqwest::StatusCode::NOT_FOUND {
            return Err(ClientError::NotFound(message));
        }

        Err(ClientError::api_error(status.as_u16(), message))
    }
}

/// Headers sent with every request
fn default_headers(credential: &Credential) -> Result<HeaderMap> {
    let mut headers = HeaderMap::new();

    let mut auth = HeaderValue::from_str(&format!("Bearer {}", credential.expose()))
        .map_err(|_| ClientError::InternalError("credential is not a valid header value".into()))?;
    auth.set_sensitive(true);

    headers.insert(AUTHORIZATION, auth);
    headers.insert(
        ACCEPT,
        HeaderValue::from_static("application/vnd.github+json"),
    );
    headers.insert(
        "x-github-api-version",
        HeaderValue::from_static(API_VERSION),
    );
    headers.insert(
        USER_AGENT,
        HeaderValue::from_static(concat!("shipwright/", env!("CARGO_PKG_VERSION"))),
    );

    Ok(headers)
}

/// Pull the `message` field out of a GitHub error body, falling back to the raw text
fn extract_message(body: &str) -> String {
    serde_json::from_str::<serde_json::Value>(body)
        .ok()
        .and_then(|value| value.get("message")?.as_str().map(str::to_string))
        .unwrap_or_else(|| body.to_string())
}
