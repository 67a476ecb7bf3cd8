//! Pipeline input types

/// Bearer credential for the remote repository host
///
/// The token is never printed: `Debug` and `Display` are redacted.
#[derive(Clone, PartialEq, Eq)]
pub struct Credential(String);

impl Credential {
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    /// Raw token, for building the authorization header only
    pub fn expose(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.trim().is_empty()
    }
}

impl std::fmt::Debug for Credential {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("Credential(***)")
    }
}

impl std::fmt::Display for Credential {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("***")
    }
}

/// One packaging request: the application bundle plus the credential used
/// to drive the remote build
#[derive(Debug, Clone)]
pub struct PipelineRequest {
    pub build_input: Vec<u8>,
    pub credential: Credential,
}

impl PipelineRequest {
    pub fn new(build_input: impl Into<Vec<u8>>, credential: Credential) -> Self {
        Self {
            build_input: build_input.into(),
            credential,
        }
    }
}
