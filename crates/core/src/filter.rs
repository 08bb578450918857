//! Relevance filter: prune the graph to what a set of resolutions touched.
//!
//! The reduced catalog keeps every footprint element plus the RETURNS and
//! attribute-type targets of kept members. Supertypes are written out
//! explicitly (restricted to kept classes). Every kept class carries a
//! cluster label, unclustered ones a marker from [`unclustered_label`], so
//! rebuilding from it performs no inference or reclustering and reproduces
//! the same tier decisions.

use crate::engine::KnowledgeGraph;
use crate::resolver::{Footprint, ResolutionResult};
use methodscope_api::models::{
    AttributeRecord, Catalog, ClassRecord, MethodRecord, unclustered_label,
};
use petgraph::stable_graph::NodeIndex;
use smol_str::SmolStr;
use std::collections::{BTreeMap, BTreeSet};
use tracing::info;

/// Classes, methods and attributes of the induced subgraph.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InducedSubgraph {
    pub classes: BTreeSet<NodeIndex>,
    pub methods: BTreeSet<NodeIndex>,
    pub attributes: BTreeSet<(NodeIndex, SmolStr)>,
}

pub struct RelevanceFilter<'g> {
    graph: &'g KnowledgeGraph,
}

impl<'g> RelevanceFilter<'g> {
    pub fn new(graph: &'g KnowledgeGraph) -> Self {
        Self { graph }
    }

    pub fn induced<'r>(&self, results: impl IntoIterator<Item = &'r ResolutionResult>) -> InducedSubgraph {
        let mut footprint = Footprint::default();
        for result in results {
            footprint.extend(&result.footprint);
        }

        let mut classes = footprint.classes;
        for &method in &footprint.methods {
            classes.extend(self.graph.owner_of(method));
            classes.extend(self.graph.return_class(method));
        }
        for (owner, name) in &footprint.attributes {
            classes.insert(*owner);
            let target = self
                .graph
                .class(*owner)
                .and_then(|c| c.attributes.get(name).cloned().flatten())
                .and_then(|t| self.graph.find_node(&t));
            classes.extend(target);
        }

        InducedSubgraph {
            classes,
            methods: footprint.methods,
            attributes: footprint.attributes,
        }
    }

    /// The induced subgraph in catalog form, classes in qualified-name order.
    pub fn reduce<'r>(&self, results: impl IntoIterator<Item = &'r ResolutionResult>) -> Catalog {
        let induced = self.induced(results);

        let mut methods_by_owner: BTreeMap<NodeIndex, Vec<MethodRecord>> = BTreeMap::new();
        for &method in &induced.methods {
            let (Some(owner), Some(node)) = (self.graph.owner_of(method), self.graph.method(method)) else {
                continue;
            };
            methods_by_owner.entry(owner).or_default().push(MethodRecord {
                name: node.name.to_string(),
                params: node.params.iter().map(|p| p.to_string()).collect(),
                return_type: node.return_class.as_ref().map(|r| r.to_string()),
            });
        }

        let mut classes: Vec<ClassRecord> = Vec::with_capacity(induced.classes.len());
        for &idx in &induced.classes {
            let Some(class) = self.graph.class(idx) else {
                continue;
            };
            let mut methods = methods_by_owner.remove(&idx).unwrap_or_default();
            methods.sort_by(|a, b| a.name.cmp(&b.name));

            let attributes = induced
                .attributes
                .iter()
                .filter(|(owner, _)| *owner == idx)
                .map(|(_, name)| AttributeRecord {
                    name: name.to_string(),
                    type_name: class
                        .attributes
                        .get(name)
                        .cloned()
                        .flatten()
                        .map(|t| t.to_string()),
                })
                .collect();

            let supertypes = self
                .graph
                .supertypes(idx)
                .into_iter()
                .filter(|parent| induced.classes.contains(parent))
                .map(|parent| self.graph.name_of(parent).to_string())
                .collect();

            classes.push(ClassRecord {
                qualified_name: class.qualified_name.to_string(),
                module_path: class.module_path.to_string(),
                methods,
                supertypes: Some(supertypes),
                attributes,
                cluster: Some(match &class.cluster {
                    Some(label) => label.to_string(),
                    None => unclustered_label(&class.qualified_name),
                }),
            });
        }
        classes.sort_by(|a, b| a.qualified_name.cmp(&b.qualified_name));

        let catalog = Catalog::new(classes);
        info!(
            classes = catalog.len(),
            methods = catalog.method_count(),
            of_classes = self.graph.class_count(),
            of_methods = self.graph.method_count(),
            "Reduced catalog"
        );
        catalog
    }
}
