//! Per-workflow variable bindings and object-chain resolution.

use super::result::Footprint;
use crate::engine::KnowledgeGraph;
use crate::naming::{singularize, to_camel_case};
use petgraph::stable_graph::NodeIndex;
use smol_str::SmolStr;
use std::collections::{BTreeSet, HashMap};
use tracing::trace;

/// Best-known class of one variable.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ContextEntry {
    pub class: NodeIndex,
    pub confidence: f64,
}

/// Class an object-chain resolved to, and what was consulted on the way.
#[derive(Debug, Clone, PartialEq)]
pub struct ChainResolution {
    pub class: NodeIndex,
    /// Confidence of the leftmost binding; 1.0 when it named a class.
    pub confidence: f64,
    pub footprint: Footprint,
}

/// Bookkeeping for one workflow. Bindings only ever move to a strictly
/// higher confidence and are never rolled back.
pub struct ContextTracker<'g> {
    graph: &'g KnowledgeGraph,
    max_depth: usize,
    bindings: HashMap<SmolStr, ContextEntry>,
    context: BTreeSet<NodeIndex>,
}

impl<'g> ContextTracker<'g> {
    pub fn new(graph: &'g KnowledgeGraph, max_depth: usize) -> Self {
        Self {
            graph,
            max_depth,
            bindings: HashMap::new(),
            context: BTreeSet::new(),
        }
    }

    pub fn graph(&self) -> &'g KnowledgeGraph {
        self.graph
    }

    pub fn max_depth(&self) -> usize {
        self.max_depth
    }

    /// Records `variable: class`. Returns whether the binding changed.
    pub fn observe(&mut self, variable: &str, class: NodeIndex, confidence: f64) -> bool {
        if let Some(existing) = self.bindings.get(variable) {
            if confidence <= existing.confidence {
                return false;
            }
        }
        trace!(variable, class = %self.graph.name_of(class), confidence, "Binding observed");
        self.bindings
            .insert(SmolStr::new(variable), ContextEntry { class, confidence });
        self.context.insert(class);
        true
    }

    /// [`observe`](Self::observe) by class name. Unknown names are ignored.
    pub fn observe_named(&mut self, variable: &str, class_name: &str, confidence: f64) -> bool {
        match self.graph.find_class(class_name) {
            Some(class) => self.observe(variable, class, confidence),
            None => false,
        }
    }

    pub fn lookup(&self, variable: &str) -> Option<ContextEntry> {
        self.bindings.get(variable).copied()
    }

    /// Marks the owner of a matched method as part of this workflow's
    /// resolved context.
    pub fn note_resolved(&mut self, class: NodeIndex) {
        self.context.insert(class);
    }

    /// Owners of every match so far plus every class ever bound.
    pub fn context_classes(&self) -> &BTreeSet<NodeIndex> {
        &self.context
    }

    /// Walks `chain` left to right.
    ///
    /// The leftmost segment is a bound variable or, failing that, a class
    /// named by convention. Each later segment must be a typed attribute or
    /// a method with a known return class on the current class or its
    /// nearest ancestor, or else name a class by convention. The first
    /// segment that matches none of these ends the walk with `None`.
    pub fn resolve_chain(&self, chain: &[String]) -> Option<ChainResolution> {
        let (first, rest) = chain.split_first()?;
        let mut footprint = Footprint::default();

        let (mut current, confidence) = match self.lookup(first) {
            Some(entry) => (entry.class, entry.confidence),
            None => (self.class_by_convention(first)?, 1.0),
        };
        footprint.add_class(current);

        for segment in rest {
            current = self.step(current, segment, &mut footprint)?;
        }
        Some(ChainResolution {
            class: current,
            confidence,
            footprint,
        })
    }

    fn step(&self, current: NodeIndex, segment: &str, footprint: &mut Footprint) -> Option<NodeIndex> {
        let graph = self.graph;

        let attribute = self.nearest(current, |class| {
            graph
                .class(class)
                .and_then(|node| node.attributes.get(segment).cloned().flatten())
                .and_then(|target| graph.find_node(&target))
        });
        if let Some((owner, target, path)) = attribute {
            footprint.add_classes(path);
            footprint.add_attribute(owner, segment);
            footprint.add_class(target);
            return Some(target);
        }

        let method = self.nearest(current, |class| {
            let method = graph.declared_method(class, segment)?;
            graph.return_class(method).map(|_| method)
        });
        if let Some((_, method, path)) = method {
            let target = graph.return_class(method)?;
            footprint.add_classes(path);
            footprint.add_method(method);
            footprint.add_class(target);
            return Some(target);
        }

        let class = self.class_by_convention(segment)?;
        footprint.add_class(class);
        Some(class)
    }

    /// The closest class in `start`'s ancestry (ties by name) for which
    /// `hit` yields a value, with the INHERITS path leading to it.
    fn nearest<T>(
        &self,
        start: NodeIndex,
        hit: impl Fn(NodeIndex) -> Option<T>,
    ) -> Option<(NodeIndex, T, Vec<NodeIndex>)> {
        let ancestry = self.graph.ancestors(start, self.max_depth);
        let mut hits: Vec<(usize, SmolStr, NodeIndex, T)> = ancestry
            .iter()
            .filter_map(|(class, depth)| {
                hit(class).map(|value| (depth, self.graph.name_of(class), class, value))
            })
            .collect();
        hits.sort_by(|a, b| a.0.cmp(&b.0).then_with(|| a.1.cmp(&b.1)));
        let (_, _, class, value) = hits.into_iter().next()?;
        Some((class, value, ancestry.path_to(class)))
    }

    /// A segment names a class as written, in CamelCase, or as the
    /// singular of a plural collection name.
    fn class_by_convention(&self, segment: &str) -> Option<NodeIndex> {
        let camel = to_camel_case(segment);
        let singular = singularize(&camel);
        std::iter::once(segment.to_string())
            .chain(std::iter::once(camel))
            .chain(singular)
            .find_map(|name| self.graph.find_class(&name))
    }
}
