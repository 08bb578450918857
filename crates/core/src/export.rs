//! Node/link export of the knowledge graph for visualization tools.

use crate::engine::KnowledgeGraph;
use crate::model::GraphNode;
use methodscope_api::models::{DocumentLink, DocumentNode, GraphDocument};
use petgraph::visit::{EdgeRef, IntoEdgeReferences};

pub fn to_graph_document(graph: &KnowledgeGraph) -> GraphDocument {
    let topology = graph.topology();

    let mut nodes: Vec<DocumentNode> = topology
        .node_indices()
        .filter_map(|idx| topology.node_weight(idx))
        .map(|node| match node {
            GraphNode::Class(class) => DocumentNode {
                id: class.qualified_name.to_string(),
                label: class.short_name.to_string(),
                kind: node.kind(),
                domain: Some(class.domain.to_string()),
                method_count: Some(class.method_names.len()),
                cluster: class.cluster.as_ref().map(|c| c.to_string()),
            },
            GraphNode::Method(method) => DocumentNode {
                id: method.fqn().to_string(),
                label: method.name.to_string(),
                kind: node.kind(),
                domain: None,
                method_count: None,
                cluster: None,
            },
        })
        .collect();
    nodes.sort_by(|a, b| a.id.cmp(&b.id));

    let mut links: Vec<DocumentLink> = topology
        .edge_references()
        .map(|edge| DocumentLink {
            source: graph.name_of(edge.source()).to_string(),
            target: graph.name_of(edge.target()).to_string(),
            kind: edge.weight().kind,
            inferred: edge.weight().inferred,
        })
        .collect();
    links.sort_by(|a, b| {
        (a.kind.to_string(), &a.source, &a.target).cmp(&(b.kind.to_string(), &b.source, &b.target))
    });

    GraphDocument {
        nodes,
        links,
        stats: graph.stats(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::BuildConfig;
    use crate::engine::build_graph;
    use methodscope_api::models::{Catalog, ClassRecord, EdgeKind, MethodRecord, NodeKind};

    #[test]
    fn test_document_lists_every_node_and_edge() {
        let catalog = Catalog::new(vec![
            ClassRecord::new("a.Base", "a").with_supertypes(Vec::<String>::new()),
            ClassRecord::new("a.Child", "a")
                .with_supertypes(["a.Base"])
                .with_method(MethodRecord::new("make").returning("a.Base")),
        ]);
        let graph = build_graph(&catalog, &BuildConfig::default()).unwrap().graph;
        let doc = to_graph_document(&graph);

        assert_eq!(doc.nodes.len(), graph.node_count());
        assert_eq!(doc.links.len(), graph.edge_count());
        assert!(doc.nodes.iter().any(|n| n.id == "a.Child#make" && n.kind == NodeKind::Method));
        assert!(doc
            .links
            .iter()
            .any(|l| l.kind == EdgeKind::Inherits && l.source == "a.Child" && l.target == "a.Base"));
        assert_eq!(doc.stats.returns_edges, 1);

        let json = serde_json::to_value(&doc).unwrap();
        assert_eq!(json["links"][0]["kind"], "DECLARES");
    }
}
