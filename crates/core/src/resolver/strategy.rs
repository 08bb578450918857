//! Resolution tiers.
//!
//! Each tier implements [`TierStrategy`]. The engine runs them in
//! [`MatchTier::ORDERED`] order and stops at the first one that yields a
//! candidate.

use super::result::MethodMatch;
use super::tracker::{ChainResolution, ContextTracker};
use crate::engine::KnowledgeGraph;
use methodscope_api::models::{CallSiteRecord, MatchTier, PriorityTable};
use petgraph::stable_graph::NodeIndex;
use std::cmp::Reverse;

/// Everything a tier may consult for one call-site.
pub struct TierRequest<'a> {
    pub graph: &'a KnowledgeGraph,
    pub call: &'a CallSiteRecord,
    pub receiver: Option<&'a ChainResolution>,
    pub tracker: &'a ContextTracker<'a>,
    pub priorities: &'a PriorityTable,
}

/// A ranked candidate. `path` holds the INHERITS path from the receiver to
/// the declaring class when the tier walked one.
#[derive(Debug, Clone, PartialEq)]
pub struct TierCandidate {
    pub found: MethodMatch,
    pub path: Vec<NodeIndex>,
}

impl TierCandidate {
    fn direct(class: NodeIndex, method: NodeIndex) -> Self {
        Self {
            found: MethodMatch { class, method },
            path: Vec::new(),
        }
    }
}

pub trait TierStrategy: Send + Sync {
    fn tier(&self) -> MatchTier;

    /// Candidates of this tier, best first. Empty means the tier does not apply.
    fn candidates(&self, request: &TierRequest<'_>) -> Vec<TierCandidate>;
}

/// The four tiers in the order they are attempted.
pub fn default_strategies() -> Vec<Box<dyn TierStrategy>> {
    vec![
        Box::new(ExactContext),
        Box::new(PriorityMatch),
        Box::new(SemanticCluster),
        Box::new(Fallback),
    ]
}

/// Declarers in the receiver's own ancestry, nearest first.
pub struct ExactContext;

impl TierStrategy for ExactContext {
    fn tier(&self) -> MatchTier {
        MatchTier::Exact
    }

    fn candidates(&self, request: &TierRequest<'_>) -> Vec<TierCandidate> {
        let Some(receiver) = request.receiver else {
            return Vec::new();
        };
        let graph = request.graph;
        let name = request.call.method_name.as_str();
        let ancestry = graph.ancestors(receiver.class, request.tracker.max_depth());

        let mut hits: Vec<(usize, NodeIndex, NodeIndex)> = ancestry
            .iter()
            .filter_map(|(class, depth)| {
                graph
                    .declared_method(class, name)
                    .map(|method| (depth, class, method))
            })
            .collect();
        hits.sort_by_cached_key(|(depth, class, _)| (*depth, graph.name_of(*class)));
        hits.into_iter()
            .map(|(_, class, method)| TierCandidate {
                found: MethodMatch { class, method },
                path: ancestry.path_to(class),
            })
            .collect()
    }
}

/// First class of the externally supplied preference list that directly
/// declares the method.
pub struct PriorityMatch;

impl TierStrategy for PriorityMatch {
    fn tier(&self) -> MatchTier {
        MatchTier::Priority
    }

    fn candidates(&self, request: &TierRequest<'_>) -> Vec<TierCandidate> {
        let graph = request.graph;
        let name = request.call.method_name.as_str();
        let mut out: Vec<TierCandidate> = Vec::new();
        for preferred in request.priorities.preferred(name) {
            for class in graph.classes_named(preferred.trim()) {
                let Some(method) = graph.declared_method(class, name) else {
                    continue;
                };
                if out.iter().all(|c| c.found.class != class) {
                    out.push(TierCandidate::direct(class, method));
                }
            }
        }
        out
    }
}

/// Declarers in the workflow's resolved context or sharing a cluster with
/// it. Context members rank first, then declarers whose cluster holds more
/// context classes, then by name.
pub struct SemanticCluster;

impl TierStrategy for SemanticCluster {
    fn tier(&self) -> MatchTier {
        MatchTier::Semantic
    }

    fn candidates(&self, request: &TierRequest<'_>) -> Vec<TierCandidate> {
        let graph = request.graph;
        let context = request.tracker.context_classes();
        if context.is_empty() {
            return Vec::new();
        }

        let mut ranked: Vec<(bool, usize, TierCandidate)> = Vec::new();
        for &method in graph.methods_named(&request.call.method_name) {
            let Some(class) = graph.owner_of(method) else {
                continue;
            };
            let in_context = context.contains(&class);
            let shared = graph
                .cluster_id(class)
                .map(|id| {
                    context
                        .iter()
                        .filter(|&&c| graph.cluster_id(c) == Some(id))
                        .count()
                })
                .unwrap_or(0);
            if in_context || shared > 0 {
                ranked.push((in_context, shared, TierCandidate::direct(class, method)));
            }
        }
        // Stable: declarers arrive in owner-name order.
        ranked.sort_by_key(|(in_context, shared, _)| (!*in_context, Reverse(*shared)));
        ranked.into_iter().map(|(_, _, c)| c).collect()
    }
}

/// Every declarer, lowest qualified name first.
pub struct Fallback;

impl TierStrategy for Fallback {
    fn tier(&self) -> MatchTier {
        MatchTier::Fallback
    }

    fn candidates(&self, request: &TierRequest<'_>) -> Vec<TierCandidate> {
        let graph = request.graph;
        graph
            .methods_named(&request.call.method_name)
            .iter()
            .filter_map(|&method| {
                graph
                    .owner_of(method)
                    .map(|class| TierCandidate::direct(class, method))
            })
            .collect()
    }
}
