//! Configuration module
//!
//! Handles CLI configuration: the credential and the packager settings
//! loaded from the environment and global flags.

use shipwright_core::domain::request::Credential;
use shipwright_packager::PackagerConfig;

/// CLI configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// Token used for every remote call
    pub credential: Credential,

    /// Packager settings shared by all commands
    pub packager: PackagerConfig,
}
