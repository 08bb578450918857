//! Knowledge graph engine
//!
//! - **Arc-wrapped immutable data**: the built graph is shared by reference
//!   across trackers, resolvers and threads
//! - **One-shot build**: a catalog is merged, linked and clustered in a
//!   single batch pass by [`GraphPipeline`]

pub mod builder;
pub mod cluster;
pub mod graph;
pub mod inheritance;
pub mod pipeline;

pub use builder::KnowledgeGraphBuilder;
pub use graph::{Ancestry, ClusterGroup, KnowledgeGraph};
pub use pipeline::{BuildOutcome, BuildReport, GraphPipeline, build_graph};
