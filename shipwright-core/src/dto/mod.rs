//! Data Transfer Objects for the remote repository host
//!
//! This module contains the request bodies the client sends to the remote
//! host. They serialize to the exact JSON shape the REST API expects.

pub mod content;
pub mod repository;
pub mod workflow;
