use super::engine::ResolutionEngine;
use super::result::{Footprint, ResolutionResult};
use crate::config::ResolverConfig;
use crate::engine::KnowledgeGraph;
use methodscope_api::models::{
    PriorityTable, ResolutionOutput, Workflow, WorkflowReport, WorkflowStats,
};
use rayon::prelude::*;
use tracing::{info, warn};

/// Results of one workflow, in call-site input order.
#[derive(Debug, Clone)]
pub struct WorkflowResolution {
    pub workflow: String,
    pub results: Vec<ResolutionResult>,
    pub stats: WorkflowStats,
}

impl WorkflowResolution {
    pub fn outputs(&self, graph: &KnowledgeGraph) -> Vec<ResolutionOutput> {
        self.results.iter().map(|r| r.to_output(graph)).collect()
    }

    pub fn report(&self, graph: &KnowledgeGraph) -> WorkflowReport {
        WorkflowReport {
            workflow: self.workflow.clone(),
            results: self.outputs(graph),
            stats: self.stats.clone(),
        }
    }

    /// Union of every result's footprint.
    pub fn footprint(&self) -> Footprint {
        let mut footprint = Footprint::default();
        for result in &self.results {
            footprint.extend(&result.footprint);
        }
        footprint
    }
}

/// Resolves one workflow's call-sites in order through a fresh tracker.
pub fn resolve_workflow(
    graph: &KnowledgeGraph,
    priorities: &PriorityTable,
    config: &ResolverConfig,
    workflow: &Workflow,
) -> WorkflowResolution {
    let engine = ResolutionEngine::new(graph, priorities, config.clone());
    run(&engine, workflow)
}

/// Resolves independent workflows in parallel. Output order follows input
/// order; each workflow owns its own tracker.
pub fn resolve_workflows(
    graph: &KnowledgeGraph,
    priorities: &PriorityTable,
    config: &ResolverConfig,
    workflows: &[Workflow],
) -> Vec<WorkflowResolution> {
    let engine = ResolutionEngine::new(graph, priorities, config.clone());
    workflows.par_iter().map(|w| run(&engine, w)).collect()
}

fn run(engine: &ResolutionEngine<'_>, workflow: &Workflow) -> WorkflowResolution {
    let mut tracker = engine.tracker();
    let mut previous: Option<u32> = None;
    let mut results = Vec::with_capacity(workflow.call_sites.len());

    for call in &workflow.call_sites {
        if previous.is_some_and(|p| call.ordinal < p) {
            warn!(
                workflow = %workflow.name,
                ordinal = call.ordinal,
                "Call-site ordinal out of order; resolving in input order"
            );
        }
        previous = Some(call.ordinal);
        results.push(engine.resolve(&mut tracker, call));
    }

    let outputs: Vec<ResolutionOutput> = results.iter().map(|r| r.to_output(engine.graph())).collect();
    let stats = WorkflowStats::from_outputs(&outputs);
    info!(
        workflow = %workflow.name,
        total = stats.total,
        matched = stats.matched,
        success_rate = stats.success_rate,
        "Resolved workflow"
    );
    WorkflowResolution {
        workflow: workflow.name.clone(),
        results,
        stats,
    }
}
