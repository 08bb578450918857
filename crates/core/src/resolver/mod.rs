//! Call-site resolution
//!
//! A [`ContextTracker`] holds one workflow's variable bindings; the
//! [`ResolutionEngine`] runs the tier strategies for each call-site and
//! folds every match back into the tracker.

pub mod engine;
pub mod result;
pub mod strategy;
pub mod tracker;
pub mod workflow;

pub use engine::ResolutionEngine;
pub use result::{Footprint, MethodMatch, ResolutionResult};
pub use strategy::{TierCandidate, TierRequest, TierStrategy};
pub use tracker::{ChainResolution, ContextEntry, ContextTracker};
pub use workflow::{WorkflowResolution, resolve_workflow, resolve_workflows};
