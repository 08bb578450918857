use super::result::{Footprint, ResolutionResult};
use super::strategy::{TierCandidate, TierRequest, TierStrategy, default_strategies};
use super::tracker::ContextTracker;
use crate::config::ResolverConfig;
use crate::engine::KnowledgeGraph;
use methodscope_api::models::{CallSiteRecord, MatchTier, PriorityTable, ResolutionIssue};
use tracing::debug;

/// Runs the tier state machine for single call-sites.
///
/// The engine never mutates the graph; the only side effect of
/// [`resolve`](Self::resolve) is on the tracker it is handed.
pub struct ResolutionEngine<'g> {
    graph: &'g KnowledgeGraph,
    priorities: &'g PriorityTable,
    config: ResolverConfig,
    strategies: Vec<Box<dyn TierStrategy>>,
}

impl<'g> ResolutionEngine<'g> {
    pub fn new(
        graph: &'g KnowledgeGraph,
        priorities: &'g PriorityTable,
        config: ResolverConfig,
    ) -> Self {
        Self {
            graph,
            priorities,
            config,
            strategies: default_strategies(),
        }
    }

    /// A fresh tracker bound to this engine's graph and depth bound.
    pub fn tracker(&self) -> ContextTracker<'g> {
        ContextTracker::new(self.graph, self.config.max_ancestor_depth)
    }

    pub fn resolve(&self, tracker: &mut ContextTracker<'_>, call: &CallSiteRecord) -> ResolutionResult {
        let mut result = ResolutionResult {
            ordinal: call.ordinal,
            call_path: call.display_path(),
            tier: MatchTier::None,
            confidence: MatchTier::None.confidence(),
            matched: None,
            candidates: Vec::new(),
            receiver: None,
            issue: None,
            footprint: Footprint::default(),
        };
        if let Err(err) = call.validate() {
            debug!(ordinal = call.ordinal, "{}", err);
            result.issue = Some(ResolutionIssue::UnknownMethodName {
                method_name: call.method_name.clone(),
            });
            return result;
        }

        let receiver = tracker.resolve_chain(&call.object_chain);
        if let Some(chain) = &receiver {
            result.receiver = Some(chain.class);
            result.footprint.extend(&chain.footprint);
        } else if !call.object_chain.is_empty() {
            result.issue = Some(ResolutionIssue::AmbiguousChain {
                chain: call.object_chain.clone(),
            });
        }

        let mut winner: Option<(MatchTier, Vec<TierCandidate>)> = None;
        {
            let request = TierRequest {
                graph: self.graph,
                call,
                receiver: receiver.as_ref(),
                tracker: &*tracker,
                priorities: self.priorities,
            };
            for strategy in &self.strategies {
                let candidates = strategy.candidates(&request);
                if !candidates.is_empty() {
                    winner = Some((strategy.tier(), candidates));
                    break;
                }
                if let (MatchTier::Exact, Some(chain)) = (strategy.tier(), &receiver) {
                    result.issue = Some(ResolutionIssue::NoDeclaringAncestor {
                        receiver_class: self.graph.name_of(chain.class).to_string(),
                    });
                }
            }
        }

        let Some((tier, mut candidates)) = winner else {
            debug!(call = %result.call_path, "No class declares the method");
            result.issue = Some(ResolutionIssue::UnknownMethodName {
                method_name: call.method_name.clone(),
            });
            return result;
        };

        let best = candidates[0].clone();
        // The match is always listed, even with a zero cap.
        candidates.truncate(self.config.max_candidates.max(1));
        result.tier = tier;
        result.confidence = tier.confidence();
        result.matched = Some(best.found);
        result.candidates = candidates.into_iter().map(|c| c.found).collect();
        result.footprint.add_classes(best.path);
        result.footprint.add_class(best.found.class);
        result.footprint.add_method(best.found.method);

        tracker.note_resolved(best.found.class);
        let returned = self.graph.return_class(best.found.method);
        if let (Some(variable), Some(class)) = (&call.receiving_variable, returned) {
            tracker.observe(variable, class, result.confidence);
            result.footprint.add_class(class);
        }

        debug!(
            call = %result.call_path,
            tier = %tier,
            matched = %best.found.describe(self.graph),
            "Resolved call-site"
        );
        result
    }

    pub fn graph(&self) -> &'g KnowledgeGraph {
        self.graph
    }
}
