pub mod callsite;
pub mod catalog;
pub mod graph;
pub mod priority;
pub mod resolution;

pub use callsite::*;
pub use catalog::*;
pub use graph::*;
pub use priority::*;
pub use resolution::*;
