//! Shipwright Core
//!
//! Core types for the Shipwright packaging pipeline.
//!
//! This crate contains:
//! - Domain types: Entities returned by the remote repository host
//!   (Repository, Release, ReleaseAsset) and the pipeline input
//!   (PipelineRequest, Credential)
//! - DTOs: Request bodies sent to the remote repository host

pub mod domain;
pub mod dto;
