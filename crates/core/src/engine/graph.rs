//! Arc-wrapped immutable knowledge graph
//!
//! The `KnowledgeGraph` is built once from a catalog and then only read.
//! Cloning increments a reference counter, so one graph can be handed to
//! any number of trackers, engines and worker threads.

use crate::model::{ClassNode, EdgeKind, GraphEdge, GraphNode, MethodNode, method_fqn};
use methodscope_api::models::{ClassInfo, GraphStats, MethodInfo};
use petgraph::Direction;
use petgraph::stable_graph::{NodeIndex, StableDiGraph};
use petgraph::visit::EdgeRef;
use smol_str::SmolStr;
use std::collections::{BTreeSet, HashMap, HashSet, VecDeque};
use std::sync::Arc;

/// Immutable knowledge graph (cheap to clone via Arc)
#[derive(Clone)]
pub struct KnowledgeGraph {
    inner: Arc<KnowledgeGraphInner>,
}

/// Internal data structure (shared via Arc)
#[derive(Clone, Default)]
pub struct KnowledgeGraphInner {
    pub topology: StableDiGraph<GraphNode, GraphEdge>,

    /// FQN -> NodeIndex: qualified class names and `Class#method` keys
    pub fqn_index: HashMap<SmolStr, NodeIndex>,

    /// Short class name -> classes, sorted by qualified name
    pub short_name_index: HashMap<SmolStr, Vec<NodeIndex>>,

    /// Bare method name -> method nodes, sorted by owner qualified name
    pub method_index: HashMap<SmolStr, Vec<NodeIndex>>,

    /// All classes, sorted by qualified name
    pub classes: Vec<NodeIndex>,

    pub clusters: Vec<ClusterGroup>,
    pub cluster_index: HashMap<NodeIndex, usize>,
}

/// One CLUSTER neighborhood. Edges run from each member to the leader.
#[derive(Clone, Debug)]
pub struct ClusterGroup {
    pub label: SmolStr,
    pub leader: NodeIndex,
    /// Sorted by qualified name, leader included.
    pub members: Vec<NodeIndex>,
}

/// Breadth-first INHERITS walk from one class.
#[derive(Clone, Debug)]
pub struct Ancestry {
    order: Vec<(NodeIndex, usize)>,
    parents: HashMap<NodeIndex, NodeIndex>,
}

impl Ancestry {
    /// `(class, distance)` pairs, nearest first, the origin at distance 0.
    pub fn iter(&self) -> impl Iterator<Item = (NodeIndex, usize)> + '_ {
        self.order.iter().copied()
    }

    pub fn depth_of(&self, idx: NodeIndex) -> Option<usize> {
        self.order.iter().find(|(n, _)| *n == idx).map(|(_, d)| *d)
    }

    /// Classes traversed from the origin to `target`, both included.
    pub fn path_to(&self, target: NodeIndex) -> Vec<NodeIndex> {
        if self.depth_of(target).is_none() {
            return Vec::new();
        }
        let mut path = vec![target];
        let mut current = target;
        while let Some(&parent) = self.parents.get(&current) {
            path.push(parent);
            current = parent;
        }
        path.reverse();
        path
    }
}

impl KnowledgeGraph {
    /// Create an empty graph
    pub fn empty() -> Self {
        Self::from_inner(KnowledgeGraphInner::default())
    }

    pub(crate) fn from_inner(inner: KnowledgeGraphInner) -> Self {
        Self {
            inner: Arc::new(inner),
        }
    }

    // ---- Read-only accessors ----

    pub fn topology(&self) -> &StableDiGraph<GraphNode, GraphEdge> {
        &self.inner.topology
    }

    pub fn node_count(&self) -> usize {
        self.inner.topology.node_count()
    }

    pub fn edge_count(&self) -> usize {
        self.inner.topology.edge_count()
    }

    pub fn class_count(&self) -> usize {
        self.inner.classes.len()
    }

    pub fn method_count(&self) -> usize {
        self.inner.method_index.values().map(Vec::len).sum()
    }

    pub fn node(&self, idx: NodeIndex) -> Option<&GraphNode> {
        self.inner.topology.node_weight(idx)
    }

    pub fn class(&self, idx: NodeIndex) -> Option<&ClassNode> {
        self.node(idx).and_then(GraphNode::as_class)
    }

    pub fn method(&self, idx: NodeIndex) -> Option<&MethodNode> {
        self.node(idx).and_then(GraphNode::as_method)
    }

    /// Qualified name of a class, `Class#method` for a method.
    pub fn name_of(&self, idx: NodeIndex) -> SmolStr {
        self.node(idx).map(GraphNode::fqn).unwrap_or_default()
    }

    /// All classes, sorted by qualified name.
    pub fn classes(&self) -> &[NodeIndex] {
        &self.inner.classes
    }

    pub fn find_node(&self, fqn: &str) -> Option<NodeIndex> {
        self.inner.fqn_index.get(fqn).copied()
    }

    /// Classes a name may refer to. A dotted name only matches its exact
    /// qualified class; a bare name matches every class with that short
    /// name (sorted).
    pub fn classes_named(&self, name: &str) -> Vec<NodeIndex> {
        if name.contains('.') {
            return self
                .find_node(name)
                .filter(|&idx| self.class(idx).is_some())
                .into_iter()
                .collect();
        }
        self.classes_by_short_name(name).to_vec()
    }

    /// Classes whose last dotted segment is `short`, sorted.
    pub fn classes_by_short_name(&self, short: &str) -> &[NodeIndex] {
        self.inner
            .short_name_index
            .get(short)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// First class `name` refers to (see [`classes_named`](Self::classes_named)).
    pub fn find_class(&self, name: &str) -> Option<NodeIndex> {
        self.classes_named(name).into_iter().next()
    }

    /// Every method node with this bare name, sorted by owner.
    pub fn methods_named(&self, name: &str) -> &[NodeIndex] {
        self.inner
            .method_index
            .get(name)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// The method `class` itself DECLARES under `name`.
    pub fn declared_method(&self, class: NodeIndex, name: &str) -> Option<NodeIndex> {
        let owner = self.class(class)?;
        if !owner.declares(name) {
            return None;
        }
        self.find_node(&method_fqn(&owner.qualified_name, name))
    }

    pub fn owner_of(&self, method: NodeIndex) -> Option<NodeIndex> {
        self.inner
            .topology
            .edges_directed(method, Direction::Incoming)
            .find(|e| e.weight().kind == EdgeKind::Declares)
            .map(|e| e.source())
    }

    pub fn return_class(&self, method: NodeIndex) -> Option<NodeIndex> {
        self.inner
            .topology
            .edges_directed(method, Direction::Outgoing)
            .find(|e| e.weight().kind == EdgeKind::Returns)
            .map(|e| e.target())
    }

    /// Direct parents, sorted by qualified name.
    pub fn supertypes(&self, class: NodeIndex) -> Vec<NodeIndex> {
        self.sorted_neighbors(class, EdgeKind::Inherits, Direction::Outgoing)
    }

    /// Direct children, sorted by qualified name.
    pub fn subtypes(&self, class: NodeIndex) -> Vec<NodeIndex> {
        self.sorted_neighbors(class, EdgeKind::Inherits, Direction::Incoming)
    }

    /// Whether an INHERITS edge between the two classes came from inference.
    pub fn is_inferred_parent(&self, child: NodeIndex, parent: NodeIndex) -> bool {
        self.inner
            .topology
            .edges_connecting(child, parent)
            .any(|e| e.weight().kind == EdgeKind::Inherits && e.weight().inferred)
    }

    /// BFS over INHERITS from `class` (distance 0) up to `max_depth`.
    ///
    /// Within one distance, classes come in qualified-name order, so the
    /// walk is deterministic.
    pub fn ancestors(&self, class: NodeIndex, max_depth: usize) -> Ancestry {
        let (order, parents) = self.walk(class, max_depth, Direction::Outgoing);
        Ancestry {
            order,
            parents,
        }
    }

    /// Every transitive subtype of `class` with its distance, nearest first.
    pub fn descendants(&self, class: NodeIndex, max_depth: usize) -> Vec<(NodeIndex, usize)> {
        let (order, _) = self.walk(class, max_depth, Direction::Incoming);
        order.into_iter().skip(1).collect()
    }

    pub fn clusters(&self) -> &[ClusterGroup] {
        &self.inner.clusters
    }

    pub fn cluster_id(&self, class: NodeIndex) -> Option<usize> {
        self.inner.cluster_index.get(&class).copied()
    }

    pub fn cluster_of(&self, class: NodeIndex) -> Option<&ClusterGroup> {
        self.cluster_id(class).and_then(|id| self.inner.clusters.get(id))
    }

    /// Every member of the cluster `class` belongs to, itself included.
    pub fn cluster_members(&self, class: NodeIndex) -> &[NodeIndex] {
        self.cluster_of(class)
            .map(|group| group.members.as_slice())
            .unwrap_or(&[])
    }

    /// Classes connected to `class` through CLUSTER edges in either direction.
    pub fn cluster_neighbors(&self, class: NodeIndex) -> Vec<NodeIndex> {
        let mut seen = HashSet::from([class]);
        let mut queue = VecDeque::from([class]);
        let mut out = Vec::new();
        while let Some(current) = queue.pop_front() {
            for next in self.inner.topology.neighbors_undirected(current) {
                let is_cluster_edge = self
                    .inner
                    .topology
                    .edges_connecting(current, next)
                    .chain(self.inner.topology.edges_connecting(next, current))
                    .any(|e| e.weight().kind == EdgeKind::Cluster);
                if is_cluster_edge && seen.insert(next) {
                    out.push(next);
                    queue.push_back(next);
                }
            }
        }
        self.sort_by_name(&mut out);
        out
    }

    /// Declarers of `name` first, then methods whose name contains it
    /// (case-insensitive), each group in owner order.
    pub fn similar_methods(&self, name: &str, limit: usize) -> Vec<NodeIndex> {
        let mut out: Vec<NodeIndex> = self.methods_named(name).to_vec();
        if out.len() >= limit {
            out.truncate(limit);
            return out;
        }

        let needle = name.to_lowercase();
        let mut names: Vec<&SmolStr> = self
            .inner
            .method_index
            .keys()
            .filter(|k| k.as_str() != name && k.to_lowercase().contains(&needle))
            .collect();
        names.sort();
        for other in names {
            for &idx in self.methods_named(other) {
                if out.len() >= limit {
                    return out;
                }
                out.push(idx);
            }
        }
        out
    }

    pub fn class_info(&self, class: NodeIndex) -> Option<ClassInfo> {
        let node = self.class(class)?;
        let names = |ids: Vec<NodeIndex>| -> Vec<String> {
            ids.into_iter().map(|i| self.name_of(i).to_string()).collect()
        };
        Some(ClassInfo {
            qualified_name: node.qualified_name.to_string(),
            module_path: node.module_path.to_string(),
            domain: node.domain.to_string(),
            methods: node.method_names.iter().map(|m| m.to_string()).collect(),
            supertypes: names(self.supertypes(class)),
            subtypes: names(self.subtypes(class)),
            ancestors: self
                .ancestors(class, usize::MAX)
                .iter()
                .skip(1)
                .map(|(idx, _)| self.name_of(idx).to_string())
                .collect(),
            cluster: node.cluster.as_ref().map(|c| c.to_string()),
            is_factory: node.is_factory,
            is_collection: node.is_collection,
        })
    }

    pub fn method_info(&self, method: NodeIndex) -> Option<MethodInfo> {
        let node = self.method(method)?;
        Some(MethodInfo {
            class_name: node.owner.to_string(),
            method_name: node.name.to_string(),
            full_signature: node.full_signature(),
            params: node.params.iter().map(|p| p.to_string()).collect(),
            return_class: node.return_class.as_ref().map(|r| r.to_string()),
        })
    }

    pub fn stats(&self) -> GraphStats {
        let mut stats = GraphStats {
            classes: self.class_count(),
            methods: self.method_count(),
            distinct_method_names: self.inner.method_index.len(),
            clusters: self.inner.clusters.len(),
            ..Default::default()
        };
        for edge in self.inner.topology.edge_weights() {
            match edge.kind {
                EdgeKind::Inherits => {
                    stats.inherits_edges += 1;
                    if edge.inferred {
                        stats.inferred_inherits_edges += 1;
                    }
                }
                EdgeKind::Returns => stats.returns_edges += 1,
                EdgeKind::Cluster => stats.cluster_edges += 1,
                EdgeKind::Declares => {}
            }
        }
        stats
    }

    fn sorted_neighbors(
        &self,
        idx: NodeIndex,
        kind: EdgeKind,
        direction: Direction,
    ) -> Vec<NodeIndex> {
        let mut out: Vec<NodeIndex> = self
            .inner
            .topology
            .edges_directed(idx, direction)
            .filter(|e| e.weight().kind == kind)
            .map(|e| match direction {
                Direction::Outgoing => e.target(),
                Direction::Incoming => e.source(),
            })
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect();
        self.sort_by_name(&mut out);
        out
    }

    fn walk(
        &self,
        start: NodeIndex,
        max_depth: usize,
        direction: Direction,
    ) -> (Vec<(NodeIndex, usize)>, HashMap<NodeIndex, NodeIndex>) {
        let mut order = Vec::new();
        let mut parents = HashMap::new();
        if self.class(start).is_none() {
            return (order, parents);
        }

        let mut seen = HashSet::from([start]);
        let mut queue = VecDeque::from([(start, 0usize)]);
        while let Some((current, depth)) = queue.pop_front() {
            order.push((current, depth));
            if depth >= max_depth {
                continue;
            }
            for next in self.sorted_neighbors(current, EdgeKind::Inherits, direction) {
                if seen.insert(next) {
                    parents.insert(next, current);
                    queue.push_back((next, depth + 1));
                }
            }
        }
        (order, parents)
    }

    fn sort_by_name(&self, ids: &mut [NodeIndex]) {
        ids.sort_by_cached_key(|&idx| self.name_of(idx));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_arc_clone_is_cheap() {
        let graph = KnowledgeGraph::empty();

        let start = std::time::Instant::now();
        for _ in 0..100000 {
            let _clone = graph.clone();
        }
        let elapsed = start.elapsed();

        assert!(
            elapsed.as_millis() < 50,
            "Arc clone should be cheap, took {:?}",
            elapsed
        );
    }

    #[test]
    fn test_empty_graph() {
        let graph = KnowledgeGraph::empty();
        assert_eq!(graph.node_count(), 0);
        assert_eq!(graph.edge_count(), 0);
        assert!(graph.find_class("Anything").is_none());
        assert!(graph.methods_named("add").is_empty());
        assert_eq!(graph.stats(), GraphStats::default());
    }
}
