//! Service layer
//!
//! Services wrap single remote calls with the packaging semantics around
//! them: what is written where, which workflow is dispatched with which
//! inputs, and which pipeline error a failure maps to.
//!
//! Services never retry. The orchestrator decides what a failure means for
//! the run.

mod publisher;
mod trigger;

pub use publisher::ArtifactPublisher;
pub use trigger::{BuildTrigger, INPUT_URL_KEY, raw_content_url};
