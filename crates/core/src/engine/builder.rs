//! Graph builder for creating the knowledge graph
//!
//! The `KnowledgeGraphBuilder` allows mutable operations on the graph
//! structure. It is only used while a catalog is being ingested, then
//! converted to an immutable `KnowledgeGraph` via the `build()` method.

use super::graph::{ClusterGroup, KnowledgeGraph, KnowledgeGraphInner};
use crate::model::{ClassNode, EdgeKind, GraphEdge, GraphNode, MethodNode};
use petgraph::algo::has_path_connecting;
use petgraph::stable_graph::NodeIndex;
use petgraph::visit::{EdgeFiltered, EdgeRef};
use smol_str::SmolStr;

/// Mutable graph builder
pub struct KnowledgeGraphBuilder {
    inner: KnowledgeGraphInner,
}

impl KnowledgeGraphBuilder {
    /// Create a new empty builder
    pub fn new() -> Self {
        Self {
            inner: KnowledgeGraphInner::default(),
        }
    }

    // ---- Mutation methods ----

    /// Add a class node. A class already present is returned unchanged.
    pub fn add_class(&mut self, class: ClassNode) -> NodeIndex {
        if let Some(&idx) = self.inner.fqn_index.get(&class.qualified_name) {
            return idx;
        }
        let fqn = class.qualified_name.clone();
        let short = class.short_name.clone();

        let idx = self.inner.topology.add_node(GraphNode::Class(class));
        self.inner.fqn_index.insert(fqn, idx);
        self.inner.short_name_index.entry(short).or_default().push(idx);
        self.inner.classes.push(idx);
        idx
    }

    /// Add a method owned by `owner`, together with its DECLARES edge.
    pub fn add_method(&mut self, owner: NodeIndex, method: MethodNode) -> NodeIndex {
        let fqn = method.fqn();
        if let Some(&idx) = self.inner.fqn_index.get(&fqn) {
            return idx;
        }
        let name = method.name.clone();

        let idx = self.inner.topology.add_node(GraphNode::Method(method));
        self.inner.fqn_index.insert(fqn, idx);
        self.inner.method_index.entry(name).or_default().push(idx);
        self.add_edge(owner, idx, GraphEdge::new(EdgeKind::Declares));
        idx
    }

    /// Add an edge between two nodes
    pub fn add_edge(&mut self, from: NodeIndex, to: NodeIndex, edge: GraphEdge) {
        // Check for duplicate edges
        let already_exists = self
            .inner
            .topology
            .edges_connecting(from, to)
            .any(|e| e.weight().kind == edge.kind);

        if !already_exists {
            self.inner.topology.add_edge(from, to, edge);
        }
    }

    pub fn find_node(&self, fqn: &str) -> Option<NodeIndex> {
        self.inner.fqn_index.get(fqn).copied()
    }

    pub fn class(&self, idx: NodeIndex) -> Option<&ClassNode> {
        self.inner
            .topology
            .node_weight(idx)
            .and_then(GraphNode::as_class)
    }

    pub fn class_mut(&mut self, idx: NodeIndex) -> Option<&mut ClassNode> {
        match self.inner.topology.node_weight_mut(idx) {
            Some(GraphNode::Class(class)) => Some(class),
            _ => None,
        }
    }

    pub fn method_mut(&mut self, idx: NodeIndex) -> Option<&mut MethodNode> {
        match self.inner.topology.node_weight_mut(idx) {
            Some(GraphNode::Method(method)) => Some(method),
            _ => None,
        }
    }

    /// Whether `from` already reaches `to` through INHERITS edges.
    pub fn inherits_path(&self, from: NodeIndex, to: NodeIndex) -> bool {
        let inherits = EdgeFiltered::from_fn(&self.inner.topology, |e| {
            e.weight().kind == EdgeKind::Inherits
        });
        has_path_connecting(&inherits, from, to, None)
    }

    /// Parents currently recorded for `class`, by qualified name.
    pub fn supertype_names(&self, class: NodeIndex) -> Vec<SmolStr> {
        let mut names: Vec<SmolStr> = self
            .inner
            .topology
            .edges(class)
            .filter(|e| e.weight().kind == EdgeKind::Inherits)
            .filter_map(|e| self.class(e.target()))
            .map(|parent| parent.qualified_name.clone())
            .collect();
        names.sort();
        names.dedup();
        names
    }

    /// Register cluster groups: one CLUSTER edge from each member to its
    /// leader, and the group label on every member.
    pub fn add_clusters(&mut self, groups: Vec<ClusterGroup>) {
        for group in groups {
            let id = self.inner.clusters.len();
            for &member in &group.members {
                self.inner.cluster_index.insert(member, id);
                if let Some(class) = self.class_mut(member) {
                    class.cluster = Some(group.label.clone());
                }
                if member != group.leader {
                    self.add_edge(member, group.leader, GraphEdge::new(EdgeKind::Cluster));
                }
            }
            self.inner.clusters.push(group);
        }
    }

    /// Build the immutable graph
    pub fn build(mut self) -> KnowledgeGraph {
        let topology = &self.inner.topology;
        let name_of = |idx: &NodeIndex| -> SmolStr {
            topology
                .node_weight(*idx)
                .map(GraphNode::fqn)
                .unwrap_or_default()
        };

        self.inner.classes.sort_by_cached_key(name_of);
        for ids in self.inner.short_name_index.values_mut() {
            ids.sort_by_cached_key(name_of);
        }
        for ids in self.inner.method_index.values_mut() {
            ids.sort_by_cached_key(name_of);
        }
        KnowledgeGraph::from_inner(self.inner)
    }
}

impl Default for KnowledgeGraphBuilder {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::{BTreeMap, BTreeSet};

    fn class(name: &str) -> ClassNode {
        ClassNode {
            qualified_name: SmolStr::new(name),
            short_name: SmolStr::new(methodscope_api::models::short_name_of(name)),
            module_path: SmolStr::new("m"),
            domain: SmolStr::new("m"),
            method_names: BTreeSet::new(),
            supertypes: Vec::new(),
            supertypes_declared: false,
            attributes: BTreeMap::new(),
            cluster: None,
            is_factory: false,
            is_collection: false,
        }
    }

    fn method(owner: &str, name: &str) -> MethodNode {
        MethodNode {
            owner: SmolStr::new(owner),
            name: SmolStr::new(name),
            params: Vec::new(),
            declared_return: None,
            return_class: None,
        }
    }

    #[test]
    fn test_build_from_scratch() {
        let mut builder = KnowledgeGraphBuilder::new();
        let part = builder.add_class(class("m.Part"));
        builder.add_method(part, method("m.Part", "update"));
        let graph = builder.build();

        assert_eq!(graph.node_count(), 2);
        assert_eq!(graph.edge_count(), 1);
        assert!(graph.find_node("m.Part#update").is_some());
        assert_eq!(graph.classes_by_short_name("Part").len(), 1);
    }

    #[test]
    fn test_duplicate_nodes_and_edges_are_ignored() {
        let mut builder = KnowledgeGraphBuilder::new();
        let a = builder.add_class(class("m.A"));
        let again = builder.add_class(class("m.A"));
        assert_eq!(a, again);

        let b = builder.add_class(class("m.B"));
        builder.add_edge(a, b, GraphEdge::new(EdgeKind::Inherits));
        builder.add_edge(a, b, GraphEdge::inferred(EdgeKind::Inherits));
        assert!(builder.inherits_path(a, b));
        assert!(!builder.inherits_path(b, a));

        let graph = builder.build();
        assert_eq!(graph.edge_count(), 1);
    }

    #[test]
    fn test_indices_sorted_on_build() {
        let mut builder = KnowledgeGraphBuilder::new();
        let z = builder.add_class(class("z.Item"));
        let a = builder.add_class(class("a.Item"));
        builder.add_method(z, method("z.Item", "add"));
        builder.add_method(a, method("a.Item", "add"));
        let graph = builder.build();

        assert_eq!(graph.classes(), &[a, z]);
        assert_eq!(graph.classes_by_short_name("Item"), &[a, z]);
        let owners: Vec<_> = graph
            .methods_named("add")
            .iter()
            .filter_map(|&m| graph.method(m))
            .map(|m| m.owner.to_string())
            .collect();
        assert_eq!(owners, vec!["a.Item", "z.Item"]);
    }
}
