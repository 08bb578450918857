use crate::view::graph_stat_rows;
use std::path::Path;
use tabled::Table;
use tracing::info;

pub fn run(catalog: &Path, config: Option<&Path>) -> Result<(), Box<dyn std::error::Error>> {
    let config = crate::load_config(config)?;
    info!("Building knowledge graph from: {}...", catalog.display());
    let outcome = crate::load_graph(catalog, &config)?;

    println!("{}", Table::new(graph_stat_rows(&outcome.graph.stats())));

    let report = &outcome.report;
    if report.is_clean() {
        println!("No warnings.");
    } else {
        println!(
            "{} warning(s), {} record(s) skipped:",
            report.warnings.len(),
            report.skipped_records
        );
        for warning in &report.warnings {
            println!(" - {}", warning);
        }
    }
    Ok(())
}
