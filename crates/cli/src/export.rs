use methodscope_core::catalog::write_json;
use methodscope_core::export::to_graph_document;
use std::path::Path;
use tracing::info;

pub fn run(
    catalog: &Path,
    output: &Path,
    config: Option<&Path>,
) -> Result<(), Box<dyn std::error::Error>> {
    let config = crate::load_config(config)?;
    let graph = crate::load_graph(catalog, &config)?.graph;

    let document = to_graph_document(&graph);
    write_json(output, &document)?;
    info!(
        "Exported {} node(s) and {} link(s) to: {}",
        document.nodes.len(),
        document.links.len(),
        output.display()
    );
    Ok(())
}
