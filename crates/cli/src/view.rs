use methodscope_api::models::{GraphStats, MatchTier, ResolutionOutput, WorkflowStats};
use tabled::Tabled;

#[derive(Tabled)]
pub struct StatRow {
    pub metric: &'static str,
    pub value: usize,
}

pub fn graph_stat_rows(stats: &GraphStats) -> Vec<StatRow> {
    vec![
        StatRow { metric: "classes", value: stats.classes },
        StatRow { metric: "methods", value: stats.methods },
        StatRow { metric: "distinct method names", value: stats.distinct_method_names },
        StatRow { metric: "INHERITS edges", value: stats.inherits_edges },
        StatRow { metric: "  of which inferred", value: stats.inferred_inherits_edges },
        StatRow { metric: "RETURNS edges", value: stats.returns_edges },
        StatRow { metric: "CLUSTER edges", value: stats.cluster_edges },
        StatRow { metric: "clusters", value: stats.clusters },
    ]
}

/// One line per workflow.
#[derive(Tabled)]
pub struct WorkflowRow {
    pub workflow: String,
    pub total: usize,
    pub matched: usize,
    pub success: String,
    pub mean_confidence: String,
    pub exact: usize,
    pub priority: usize,
    pub semantic: usize,
    pub fallback: usize,
    pub none: usize,
}

impl WorkflowRow {
    pub fn new(workflow: &str, stats: &WorkflowStats) -> Self {
        let tier = |t: MatchTier| stats.by_tier.get(&t).copied().unwrap_or(0);
        Self {
            workflow: workflow.to_string(),
            total: stats.total,
            matched: stats.matched,
            success: format!("{:.1}%", stats.success_rate * 100.0),
            mean_confidence: format!("{:.3}", stats.mean_confidence),
            exact: tier(MatchTier::Exact),
            priority: tier(MatchTier::Priority),
            semantic: tier(MatchTier::Semantic),
            fallback: tier(MatchTier::Fallback),
            none: tier(MatchTier::None),
        }
    }
}

/// One line per call-site.
#[derive(Tabled)]
pub struct ResultRow {
    pub ordinal: u32,
    pub call: String,
    pub tier: MatchTier,
    pub confidence: String,
    pub matched: String,
}

impl From<&ResolutionOutput> for ResultRow {
    fn from(output: &ResolutionOutput) -> Self {
        Self {
            ordinal: output.ordinal,
            call: output.call.clone(),
            tier: output.tier,
            confidence: format!("{:.2}", output.confidence),
            matched: output.full_signature().unwrap_or_else(|| "-".to_string()),
        }
    }
}
