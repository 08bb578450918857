//! CLUSTER neighborhoods.
//!
//! Classes are grouped either by explicit catalog labels or, when no record
//! carries one, by greedy leader clustering over the Jaccard similarity of
//! their method-name sets. Classes are visited largest first (ties by
//! name); each joins the most similar existing leader at or above
//! `similarity_threshold`, otherwise starts a new cluster while fewer than
//! `max_clusters` exist, otherwise joins its most similar leader at all.
//! Classes with no methods stay unclustered.

use super::builder::KnowledgeGraphBuilder;
use super::graph::ClusterGroup;
use crate::config::ClusterConfig;
use petgraph::stable_graph::NodeIndex;
use smol_str::SmolStr;
use std::collections::{BTreeMap, BTreeSet};

/// Groups classes by the label already stored on each node.
/// `classes` must be in qualified-name order; the first member leads.
pub fn cluster_by_labels(builder: &KnowledgeGraphBuilder, classes: &[NodeIndex]) -> Vec<ClusterGroup> {
    let mut by_label: BTreeMap<SmolStr, Vec<NodeIndex>> = BTreeMap::new();
    for &idx in classes {
        if let Some(label) = builder.class(idx).and_then(|c| c.cluster.clone()) {
            by_label.entry(label).or_default().push(idx);
        }
    }
    by_label
        .into_iter()
        .map(|(label, members)| ClusterGroup {
            label,
            leader: members[0],
            members,
        })
        .collect()
}

/// Computes clusters from method-name similarity.
/// `classes` must be in qualified-name order.
pub fn cluster_by_similarity(
    builder: &KnowledgeGraphBuilder,
    config: &ClusterConfig,
    classes: &[NodeIndex],
) -> Vec<ClusterGroup> {
    let mut features: Vec<(NodeIndex, BTreeSet<SmolStr>)> = classes
        .iter()
        .filter_map(|&idx| {
            let class = builder.class(idx)?;
            if class.method_names.is_empty() {
                return None;
            }
            let mut tokens = class.method_names.clone();
            if config.include_domain {
                tokens.insert(SmolStr::from(format!("@domain:{}", class.domain)));
            }
            Some((idx, tokens))
        })
        .collect();
    // Stable sort keeps qualified-name order among equal sizes.
    features.sort_by(|a, b| b.1.len().cmp(&a.1.len()));

    struct Draft<'a> {
        leader: NodeIndex,
        leader_tokens: &'a BTreeSet<SmolStr>,
        members: Vec<NodeIndex>,
    }
    let mut drafts: Vec<Draft<'_>> = Vec::new();

    for (idx, tokens) in &features {
        let best = drafts
            .iter()
            .enumerate()
            .map(|(i, d)| (i, jaccard(tokens, d.leader_tokens)))
            .fold(None::<(usize, f64)>, |acc, (i, sim)| match acc {
                Some((_, best_sim)) if best_sim >= sim => acc,
                _ => Some((i, sim)),
            });

        match best {
            Some((i, sim)) if sim >= config.similarity_threshold => drafts[i].members.push(*idx),
            _ if drafts.len() < config.max_clusters => drafts.push(Draft {
                leader: *idx,
                leader_tokens: tokens,
                members: vec![*idx],
            }),
            Some((i, sim)) if sim > 0.0 => drafts[i].members.push(*idx),
            _ => {}
        }
    }

    let position: BTreeMap<NodeIndex, usize> =
        classes.iter().enumerate().map(|(pos, &idx)| (idx, pos)).collect();
    drafts
        .into_iter()
        .enumerate()
        .map(|(i, mut draft)| {
            draft.members.sort_by_key(|m| position.get(m).copied());
            ClusterGroup {
                label: SmolStr::from(format!("cluster-{}", i)),
                leader: draft.leader,
                members: draft.members,
            }
        })
        .collect()
}

pub fn jaccard(a: &BTreeSet<SmolStr>, b: &BTreeSet<SmolStr>) -> f64 {
    let union = a.union(b).count();
    if union == 0 {
        return 0.0;
    }
    a.intersection(b).count() as f64 / union as f64
}
