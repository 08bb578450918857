//! Interface models shared by the methodscope engine and its callers.
//!
//! Everything here is plain serde data: what flows into the engine
//! (catalog records, call-site records, priority tables) and what flows
//! out of it (resolution output, reduced catalogs, graph documents).

pub mod error;
pub mod models;

pub use error::{ApiError, ApiResult};
pub use models::*;
