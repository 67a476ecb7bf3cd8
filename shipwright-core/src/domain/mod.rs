//! Core domain types
//!
//! This module contains the structures shared between the repository client
//! (which deserializes them from the remote API) and the packager (which
//! drives the pipeline with them).

pub mod release;
pub mod repository;
pub mod request;
