//! JSON file loading for catalogs, call-site workflows and priority tables.

use crate::error::Result;
use methodscope_api::models::{Catalog, PriorityTable, Workflow, workflows_from_json_str};
use serde::Serialize;
use std::path::Path;

pub fn load_catalog(path: &Path) -> Result<Catalog> {
    let content = std::fs::read_to_string(path)?;
    let catalog = Catalog::from_json_str(&content)?;
    tracing::info!(
        "Loaded {} class record(s), {} method(s) from {}",
        catalog.len(),
        catalog.method_count(),
        path.display()
    );
    Ok(catalog)
}

/// Either `[{name, call_sites}]` or one bare call-site array.
pub fn load_workflows(path: &Path) -> Result<Vec<Workflow>> {
    let content = std::fs::read_to_string(path)?;
    let workflows = workflows_from_json_str(&content)?;
    tracing::info!("Loaded {} workflow(s) from {}", workflows.len(), path.display());
    Ok(workflows)
}

/// A missing path means an empty table.
pub fn load_priorities(path: Option<&Path>) -> Result<PriorityTable> {
    let Some(path) = path else {
        return Ok(PriorityTable::new());
    };
    let content = std::fs::read_to_string(path)?;
    Ok(serde_json::from_str(&content)?)
}

pub fn write_json<T: Serialize>(path: &Path, value: &T) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }
    let json = serde_json::to_string_pretty(value)?;
    std::fs::write(path, json)?;
    Ok(())
}
