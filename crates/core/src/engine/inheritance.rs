//! Heuristic INHERITS inference for classes without declared supertypes.
//!
//! A class `C` gets at most one inferred parent `P`. `P` must share at least
//! `min_shared_methods` method names with `C`, and the shared fraction of
//! `P`'s own methods (plus `prefix_bonus` when `P`'s short name is a proper
//! prefix of `C`'s) must reach `min_overlap`. `P` must also be strictly
//! smaller than `C`: fewer methods, or as many with a shorter, prefixing
//! name. That ordering keeps inferred edges acyclic.

use super::builder::KnowledgeGraphBuilder;
use crate::config::InheritanceConfig;
use crate::model::{EdgeKind, GraphEdge};
use petgraph::stable_graph::NodeIndex;
use smol_str::SmolStr;
use std::collections::HashMap;
use tracing::debug;

struct Scored {
    parent: NodeIndex,
    score: f64,
    parent_methods: usize,
    parent_name: SmolStr,
}

/// Adds inferred INHERITS edges for every class in `unknown`.
///
/// `classes` is the full candidate-parent set. Both slices must be in
/// qualified-name order. Returns the number of edges added.
pub fn infer_supertypes(
    builder: &mut KnowledgeGraphBuilder,
    config: &InheritanceConfig,
    classes: &[NodeIndex],
    unknown: &[NodeIndex],
) -> usize {
    if !config.enabled || unknown.is_empty() {
        return 0;
    }

    let mut by_method: HashMap<SmolStr, Vec<NodeIndex>> = HashMap::new();
    for &idx in classes {
        if let Some(class) = builder.class(idx) {
            for name in &class.method_names {
                by_method.entry(name.clone()).or_default().push(idx);
            }
        }
    }

    let mut added = 0;
    for &child in unknown {
        let Some(best) = best_parent(builder, config, &by_method, child) else {
            continue;
        };
        // Explicit edges may already lead back to the child.
        if builder.inherits_path(best.parent, child) {
            continue;
        }
        debug!(
            child = %builder.class(child).map(|c| c.qualified_name.as_str()).unwrap_or(""),
            parent = %best.parent_name,
            score = best.score,
            "Inferred supertype"
        );
        builder.add_edge(child, best.parent, GraphEdge::inferred(EdgeKind::Inherits));
        added += 1;
    }
    added
}

fn best_parent(
    builder: &KnowledgeGraphBuilder,
    config: &InheritanceConfig,
    by_method: &HashMap<SmolStr, Vec<NodeIndex>>,
    child: NodeIndex,
) -> Option<Scored> {
    let class = builder.class(child)?;

    let mut shared: HashMap<NodeIndex, usize> = HashMap::new();
    for name in &class.method_names {
        for &other in by_method.get(name).into_iter().flatten() {
            if other != child {
                *shared.entry(other).or_default() += 1;
            }
        }
    }

    let child_methods = class.method_names.len();
    let mut best: Option<Scored> = None;
    for (parent, count) in shared {
        if count < config.min_shared_methods {
            continue;
        }
        let Some(candidate) = builder.class(parent) else {
            continue;
        };
        let parent_methods = candidate.method_names.len();
        let prefix = class.short_name.len() > candidate.short_name.len()
            && class.short_name.starts_with(candidate.short_name.as_str());

        let smaller = parent_methods < child_methods || (parent_methods == child_methods && prefix);
        if !smaller {
            continue;
        }

        let mut score = count as f64 / parent_methods as f64;
        if prefix {
            score += config.prefix_bonus;
        }
        if score < config.min_overlap {
            continue;
        }

        let scored = Scored {
            parent,
            score,
            parent_methods,
            parent_name: candidate.qualified_name.clone(),
        };
        if best.as_ref().is_none_or(|b| outranks(&scored, b)) {
            best = Some(scored);
        }
    }
    best
}

/// Higher score, then the larger parent, then the lexically smaller name.
fn outranks(a: &Scored, b: &Scored) -> bool {
    a.score
        .total_cmp(&b.score)
        .then(a.parent_methods.cmp(&b.parent_methods))
        .then(b.parent_name.cmp(&a.parent_name))
        .is_gt()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::ClassNode;
    use std::collections::{BTreeMap, BTreeSet};

    fn add(builder: &mut KnowledgeGraphBuilder, name: &str, methods: &[&str]) -> NodeIndex {
        builder.add_class(ClassNode {
            qualified_name: SmolStr::new(name),
            short_name: SmolStr::new(methodscope_api::models::short_name_of(name)),
            module_path: SmolStr::new("m"),
            domain: SmolStr::new("m"),
            method_names: methods.iter().map(|m| SmolStr::new(*m)).collect::<BTreeSet<_>>(),
            supertypes: Vec::new(),
            supertypes_declared: false,
            attributes: BTreeMap::new(),
            cluster: None,
            is_factory: false,
            is_collection: false,
        })
    }

    #[test]
    fn test_specialization_family_inferred() {
        let mut builder = KnowledgeGraphBuilder::new();
        let base = add(&mut builder, "m.HybridShape", &["compute", "name", "update"]);
        let spline = add(
            &mut builder,
            "m.HybridShapeSpline",
            &["compute", "name", "update", "add_point"],
        );
        let classes = [base, spline];

        let added =
            infer_supertypes(&mut builder, &InheritanceConfig::default(), &classes, &classes);
        assert_eq!(added, 1);
        assert!(builder.inherits_path(spline, base));
        assert!(!builder.inherits_path(base, spline));
    }

    #[test]
    fn test_low_overlap_not_inferred() {
        let mut builder = KnowledgeGraphBuilder::new();
        let a = add(&mut builder, "m.Reader", &["open", "close", "read", "seek", "tell"]);
        let b = add(&mut builder, "m.Sheet", &["open", "close", "fill", "print", "sum", "sort"]);
        let classes = [a, b];

        let added =
            infer_supertypes(&mut builder, &InheritanceConfig::default(), &classes, &classes);
        assert_eq!(added, 0);
    }

    #[test]
    fn test_disabled_inference() {
        let mut builder = KnowledgeGraphBuilder::new();
        let base = add(&mut builder, "m.Shape", &["a", "b"]);
        let child = add(&mut builder, "m.ShapeLine", &["a", "b", "c"]);
        let config = InheritanceConfig {
            enabled: false,
            ..Default::default()
        };
        assert_eq!(infer_supertypes(&mut builder, &config, &[base, child], &[child]), 0);
    }
}
