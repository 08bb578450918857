pub mod catalog;
pub mod config;
pub mod error;
pub mod export;
pub mod filter;
pub mod logging;
pub mod naming;

pub mod engine;
pub mod model;
pub mod resolver;

pub use config::EngineConfig;
pub use engine::{BuildOutcome, BuildReport, GraphPipeline, KnowledgeGraph, build_graph};
pub use error::{BuildWarning, MethodscopeError, Result};
pub use filter::RelevanceFilter;
pub use resolver::{
    ContextTracker, ResolutionEngine, ResolutionResult, WorkflowResolution, resolve_workflow,
    resolve_workflows,
};
