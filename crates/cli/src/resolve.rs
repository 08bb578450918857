use crate::ResolveArgs;
use crate::view::{ResultRow, WorkflowRow};
use methodscope_api::models::WorkflowReport;
use methodscope_core::catalog::{load_priorities, load_workflows, write_json};
use methodscope_core::{KnowledgeGraph, RelevanceFilter, WorkflowResolution, resolve_workflows};
use std::path::Path;
use tabled::Table;
use tracing::info;

fn resolve_all(
    args: &ResolveArgs,
) -> Result<(KnowledgeGraph, Vec<WorkflowResolution>), Box<dyn std::error::Error>> {
    let config = crate::load_config(args.config.as_deref())?;
    let graph = crate::load_graph(&args.catalog, &config)?.graph;
    let priorities = load_priorities(args.priorities.as_deref())?;
    let workflows = load_workflows(&args.calls)?;

    let resolutions = resolve_workflows(&graph, &priorities, &config.resolver, &workflows);
    Ok((graph, resolutions))
}

pub fn run(args: &ResolveArgs, output: Option<&Path>) -> Result<(), Box<dyn std::error::Error>> {
    let (graph, resolutions) = resolve_all(args)?;
    let reports: Vec<WorkflowReport> = resolutions.iter().map(|r| r.report(&graph)).collect();

    match output {
        Some(path) => {
            write_json(path, &reports)?;
            for report in &reports {
                let rows: Vec<ResultRow> = report.results.iter().map(ResultRow::from).collect();
                println!("{}\n{}", report.workflow, Table::new(rows));
            }
            let summary: Vec<WorkflowRow> = reports
                .iter()
                .map(|r| WorkflowRow::new(&r.workflow, &r.stats))
                .collect();
            println!("{}", Table::new(summary));
            info!("Resolution reports written to: {}", path.display());
        }
        None => println!("{}", serde_json::to_string_pretty(&reports)?),
    }
    Ok(())
}

pub fn filter(args: &ResolveArgs, output: &Path) -> Result<(), Box<dyn std::error::Error>> {
    let (graph, resolutions) = resolve_all(args)?;

    let reduced = RelevanceFilter::new(&graph)
        .reduce(resolutions.iter().flat_map(|r| r.results.iter()));
    write_json(output, &reduced)?;

    println!(
        "Kept {} of {} classes and {} of {} methods.",
        reduced.len(),
        graph.class_count(),
        reduced.method_count(),
        graph.method_count()
    );
    info!("Reduced catalog written to: {}", output.display());
    Ok(())
}
