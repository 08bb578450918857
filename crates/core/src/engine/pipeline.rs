//! Catalog → knowledge graph.
//!
//! Records are validated and merged by qualified name first, so everything
//! after that point works on a sorted view and the resulting graph does not
//! depend on catalog enumeration order.

use super::builder::KnowledgeGraphBuilder;
use super::cluster::{cluster_by_labels, cluster_by_similarity};
use super::graph::KnowledgeGraph;
use super::inheritance::infer_supertypes;
use crate::config::BuildConfig;
use crate::error::{BuildWarning, MethodscopeError, Result};
use crate::model::{ClassNode, EdgeKind, GraphEdge, MethodNode};
use crate::naming::{domain_of, looks_like_collection, looks_like_factory, normalize_annotation};
use methodscope_api::models::{Catalog, ClassRecord, MethodRecord, is_unclustered_label, short_name_of};
use petgraph::stable_graph::NodeIndex;
use smol_str::SmolStr;
use std::cmp::Reverse;
use std::collections::{BTreeMap, BTreeSet, HashMap};
use tracing::{info, warn};

/// Non-fatal findings of one build.
#[derive(Debug, Clone, Default)]
pub struct BuildReport {
    pub warnings: Vec<BuildWarning>,
    /// Class records dropped as malformed.
    pub skipped_records: usize,
    pub inferred_supertypes: usize,
}

impl BuildReport {
    pub fn is_clean(&self) -> bool {
        self.warnings.is_empty()
    }

    fn push(&mut self, warning: BuildWarning) {
        warn!("{}", warning);
        self.warnings.push(warning);
    }
}

pub struct BuildOutcome {
    pub graph: KnowledgeGraph,
    pub report: BuildReport,
}

/// One-shot batch build over a full catalog.
pub struct GraphPipeline {
    config: BuildConfig,
}

impl GraphPipeline {
    pub fn new(config: BuildConfig) -> Self {
        Self { config }
    }

    pub fn build(&self, catalog: &Catalog) -> Result<BuildOutcome> {
        let mut report = BuildReport::default();
        let merged = merge_records(&catalog.classes, &mut report);
        if merged.is_empty() {
            return Err(MethodscopeError::EmptyCatalog {
                skipped: report.skipped_records,
            });
        }

        let types = TypeIndex::new(&merged);
        let mut builder = KnowledgeGraphBuilder::new();

        // Phase 1: nodes and DECLARES edges
        let mut classes: Vec<(NodeIndex, &str, &MergedClass)> = Vec::with_capacity(merged.len());
        let mut methods: Vec<(NodeIndex, &str, &str, &MethodRecord)> = Vec::new();
        for (name, class) in &merged {
            let short = short_name_of(name);
            let idx = builder.add_class(ClassNode {
                qualified_name: SmolStr::new(name),
                short_name: SmolStr::new(short),
                module_path: SmolStr::new(&class.module_path),
                domain: SmolStr::new(domain_of(&class.module_path)),
                method_names: class.methods.keys().map(SmolStr::new).collect(),
                supertypes: Vec::new(),
                supertypes_declared: class.supertypes.is_some(),
                attributes: BTreeMap::new(),
                cluster: class
                    .cluster
                    .as_deref()
                    .filter(|label| !is_unclustered_label(label))
                    .map(SmolStr::new),
                is_factory: looks_like_factory(short),
                is_collection: looks_like_collection(short),
            });
            for (method_name, record) in &class.methods {
                let method = builder.add_method(
                    idx,
                    MethodNode {
                        owner: SmolStr::new(name),
                        name: SmolStr::new(method_name),
                        params: record.params.iter().map(SmolStr::new).collect(),
                        declared_return: record.return_type.as_deref().map(SmolStr::new),
                        return_class: None,
                    },
                );
                methods.push((method, name.as_str(), class.module_path.as_str(), record));
            }
            classes.push((idx, name.as_str(), class));
        }

        // Phase 2: RETURNS edges
        for (method, owner, module, record) in methods {
            let Some(declared) = record.return_type.as_deref() else {
                continue;
            };
            match types.resolve(declared, module) {
                Some(target) => {
                    let Some(target_idx) = builder.find_node(target) else {
                        continue;
                    };
                    if let Some(node) = builder.method_mut(method) {
                        node.return_class = Some(SmolStr::new(target));
                    }
                    builder.add_edge(method, target_idx, GraphEdge::new(EdgeKind::Returns));
                }
                None if normalize_annotation(declared).is_some() => {
                    report.push(BuildWarning::DanglingReturnType {
                        class_name: owner.to_string(),
                        method_name: record.name.clone(),
                        return_type: declared.to_string(),
                    });
                }
                None => {}
            }
        }

        // Phase 3: attribute types and declared INHERITS edges
        for &(idx, name, class) in &classes {
            let mut attributes = BTreeMap::new();
            for (attribute, declared) in &class.attributes {
                let resolved = declared.as_deref().and_then(|declared| {
                    let target = types.resolve(declared, &class.module_path);
                    if target.is_none() && normalize_annotation(declared).is_some() {
                        report.push(BuildWarning::DanglingAttributeType {
                            class_name: name.to_string(),
                            attribute: attribute.clone(),
                            type_name: declared.to_string(),
                        });
                    }
                    target
                });
                attributes.insert(SmolStr::new(attribute), resolved.map(SmolStr::new));
            }
            if let Some(node) = builder.class_mut(idx) {
                node.attributes = attributes;
            }

            for supertype in class.supertypes.iter().flatten() {
                let parent = types
                    .resolve(supertype, &class.module_path)
                    .and_then(|target| builder.find_node(target));
                match parent {
                    Some(parent) if parent != idx => {
                        builder.add_edge(idx, parent, GraphEdge::new(EdgeKind::Inherits));
                    }
                    Some(_) => {}
                    None => report.push(BuildWarning::DanglingSupertype {
                        class_name: name.to_string(),
                        supertype: supertype.clone(),
                    }),
                }
            }
        }

        // Phase 4: inferred INHERITS edges
        let all: Vec<NodeIndex> = classes.iter().map(|(idx, _, _)| *idx).collect();
        let unknown: Vec<NodeIndex> = classes
            .iter()
            .filter(|(_, _, class)| class.supertypes.is_none())
            .map(|(idx, _, _)| *idx)
            .collect();
        report.inferred_supertypes =
            infer_supertypes(&mut builder, &self.config.inheritance, &all, &unknown);

        for &idx in &all {
            let names = builder.supertype_names(idx);
            if let Some(node) = builder.class_mut(idx) {
                node.supertypes = names;
            }
        }

        // Phase 5: CLUSTER edges. Unclustered markers count as labels.
        let labelled = classes.iter().any(|(_, _, class)| class.cluster.is_some());
        let groups = if labelled {
            cluster_by_labels(&builder, &all)
        } else {
            cluster_by_similarity(&builder, &self.config.clustering, &all)
        };
        builder.add_clusters(groups);

        let graph = builder.build();
        let stats = graph.stats();
        info!(
            classes = stats.classes,
            methods = stats.methods,
            inherits = stats.inherits_edges,
            inferred = stats.inferred_inherits_edges,
            returns = stats.returns_edges,
            clusters = stats.clusters,
            warnings = report.warnings.len(),
            "Built knowledge graph"
        );
        Ok(BuildOutcome { graph, report })
    }
}

/// Build with the given configuration.
pub fn build_graph(catalog: &Catalog, config: &BuildConfig) -> Result<BuildOutcome> {
    GraphPipeline::new(config.clone()).build(catalog)
}

/// A class after all of its records have been merged.
#[derive(Debug, Default)]
struct MergedClass {
    module_path: String,
    methods: BTreeMap<String, MethodRecord>,
    supertypes: Option<BTreeSet<String>>,
    attributes: BTreeMap<String, Option<String>>,
    cluster: Option<String>,
}

fn merge_records(records: &[ClassRecord], report: &mut BuildReport) -> BTreeMap<String, MergedClass> {
    let mut merged: BTreeMap<String, MergedClass> = BTreeMap::new();

    for (index, record) in records.iter().enumerate() {
        if let Err(err) = record.validate() {
            report.skipped_records += 1;
            report.push(BuildWarning::MalformedRecord {
                index,
                reason: err.to_string(),
            });
            continue;
        }
        let name = record.qualified_name.trim().to_string();
        if merged.contains_key(&name) {
            report.push(BuildWarning::DuplicateClass {
                class_name: name.clone(),
            });
        }
        let class = merged.entry(name.clone()).or_default();

        let module = record.module_path.trim();
        if !module.is_empty() && (class.module_path.is_empty() || module < class.module_path.as_str()) {
            class.module_path = module.to_string();
        }

        for method in &record.methods {
            if !method.is_valid() {
                report.push(BuildWarning::MalformedRecord {
                    index,
                    reason: format!("'{}' has an invalid method name '{}'", name, method.name),
                });
                continue;
            }
            let method = normalize_method(method);
            match class.methods.get(&method.name) {
                Some(existing) => {
                    report.push(BuildWarning::DuplicateMethod {
                        class_name: name.clone(),
                        method_name: method.name.clone(),
                    });
                    if method_rank(&method) < method_rank(existing) {
                        class.methods.insert(method.name.clone(), method);
                    }
                }
                None => {
                    class.methods.insert(method.name.clone(), method);
                }
            }
        }

        if let Some(supertypes) = &record.supertypes {
            let declared = class.supertypes.get_or_insert_with(BTreeSet::new);
            declared.extend(
                supertypes
                    .iter()
                    .map(|s| s.trim())
                    .filter(|s| !s.is_empty())
                    .map(str::to_string),
            );
        }

        for attribute in &record.attributes {
            let attr_name = attribute.name.trim();
            if attr_name.is_empty() {
                report.push(BuildWarning::MalformedRecord {
                    index,
                    reason: format!("'{}' has an attribute without a name", name),
                });
                continue;
            }
            let type_name = attribute
                .type_name
                .as_deref()
                .map(str::trim)
                .filter(|t| !t.is_empty())
                .map(str::to_string);
            let slot = class.attributes.entry(attr_name.to_string()).or_insert(None);
            *slot = match (slot.take(), type_name) {
                (Some(a), Some(b)) => Some(a.min(b)),
                (a, b) => a.or(b),
            };
        }

        if let Some(label) = record.cluster.as_deref().map(str::trim).filter(|l| !l.is_empty()) {
            class.cluster = match class.cluster.take() {
                Some(existing) if is_unclustered_label(label) => Some(existing),
                Some(existing) if is_unclustered_label(&existing) => Some(label.to_string()),
                Some(existing) => Some(existing.min(label.to_string())),
                None => Some(label.to_string()),
            };
        }
    }
    merged
}

fn normalize_method(method: &MethodRecord) -> MethodRecord {
    MethodRecord {
        name: method.name.trim().to_string(),
        params: method.params.iter().map(|p| p.trim().to_string()).collect(),
        return_type: method
            .return_type
            .as_deref()
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .map(str::to_string),
    }
}

/// Duplicate declarations keep the lowest rank: a declared return type
/// first, then the longer parameter list, then lexical order.
fn method_rank(method: &MethodRecord) -> (bool, Option<&String>, Reverse<usize>, &[String]) {
    (
        method.return_type.is_none(),
        method.return_type.as_ref(),
        Reverse(method.params.len()),
        &method.params,
    )
}

/// Resolves declared type names to qualified class names.
struct TypeIndex<'a> {
    modules: HashMap<&'a str, &'a str>,
    by_short: HashMap<&'a str, Vec<&'a str>>,
}

impl<'a> TypeIndex<'a> {
    fn new(merged: &'a BTreeMap<String, MergedClass>) -> Self {
        let mut modules = HashMap::new();
        let mut by_short: HashMap<&str, Vec<&str>> = HashMap::new();
        for (name, class) in merged {
            modules.insert(name.as_str(), class.module_path.as_str());
            by_short.entry(short_name_of(name)).or_default().push(name.as_str());
        }
        Self { modules, by_short }
    }

    /// Exact qualified name first, then short-name matches: a dotted
    /// reference prefers classes it is a suffix of, then the referring
    /// module, then lexical order.
    fn resolve(&self, declared: &str, module: &str) -> Option<&'a str> {
        let name = normalize_annotation(declared)?;
        if let Some((&qualified, _)) = self.modules.get_key_value(name.as_str()) {
            return Some(qualified);
        }

        let candidates = self.by_short.get(short_name_of(&name))?;
        let mut pool: Vec<&'a str> = candidates.clone();
        if name.contains('.') {
            let suffix = format!(".{}", name);
            let narrowed: Vec<&'a str> = pool.iter().copied().filter(|c| c.ends_with(&suffix)).collect();
            if !narrowed.is_empty() {
                pool = narrowed;
            }
        }
        if pool.len() > 1 {
            let local: Vec<&'a str> = pool
                .iter()
                .copied()
                .filter(|c| self.modules.get(c).is_some_and(|m| *m == module))
                .collect();
            if !local.is_empty() {
                pool = local;
            }
        }
        pool.first().copied()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use methodscope_api::models::{AttributeRecord, unclustered_label};

    fn catalog(classes: Vec<ClassRecord>) -> Catalog {
        Catalog::new(classes)
    }

    #[test]
    fn test_empty_catalog_is_fatal() {
        let result = build_graph(&catalog(vec![ClassRecord::default()]), &BuildConfig::default());
        assert!(matches!(
            result,
            Err(MethodscopeError::EmptyCatalog { skipped: 1 })
        ));
    }

    #[test]
    fn test_duplicate_records_merge() {
        let outcome = build_graph(
            &catalog(vec![
                ClassRecord::new("m.Part", "m").with_method(MethodRecord::new("update")),
                ClassRecord::new("m.Part", "m")
                    .with_method(MethodRecord::new("update").returning("m.Part"))
                    .with_method(MethodRecord::new("name")),
            ]),
            &BuildConfig::default(),
        )
        .unwrap();

        let graph = outcome.graph;
        assert_eq!(graph.class_count(), 1);
        assert_eq!(graph.method_count(), 2);
        let update = graph.find_node("m.Part#update").unwrap();
        assert_eq!(graph.return_class(update), graph.find_node("m.Part"));
        assert!(outcome
            .report
            .warnings
            .iter()
            .any(|w| matches!(w, BuildWarning::DuplicateMethod { .. })));
    }

    #[test]
    fn test_short_name_type_prefers_same_module() {
        let outcome = build_graph(
            &catalog(vec![
                ClassRecord::new("a.Body", "a"),
                ClassRecord::new("b.Body", "b"),
                ClassRecord::new("b.Part", "b")
                    .with_method(MethodRecord::new("main_body").returning("<class 'Body'>"))
                    .with_attribute(AttributeRecord::new("bodies", "'Body'")),
            ]),
            &BuildConfig::default(),
        )
        .unwrap();

        let graph = outcome.graph;
        let method = graph.find_node("b.Part#main_body").unwrap();
        assert_eq!(graph.return_class(method), graph.find_node("b.Body"));
        let part = graph.class(graph.find_node("b.Part").unwrap()).unwrap();
        assert_eq!(part.attributes.get("bodies").cloned().flatten().as_deref(), Some("b.Body"));
    }

    #[test]
    fn test_declared_supertypes_skip_inference() {
        let outcome = build_graph(
            &catalog(vec![
                ClassRecord::new("m.Shape", "m")
                    .with_method(MethodRecord::new("a"))
                    .with_method(MethodRecord::new("b")),
                ClassRecord::new("m.ShapeLine", "m")
                    .with_method(MethodRecord::new("a"))
                    .with_method(MethodRecord::new("b"))
                    .with_method(MethodRecord::new("c"))
                    .with_supertypes(Vec::<String>::new()),
                ClassRecord::new("m.ShapeArc", "m")
                    .with_method(MethodRecord::new("a"))
                    .with_method(MethodRecord::new("b"))
                    .with_method(MethodRecord::new("d")),
            ]),
            &BuildConfig::default(),
        )
        .unwrap();

        let graph = outcome.graph;
        let shape = graph.find_node("m.Shape").unwrap();
        let line = graph.find_node("m.ShapeLine").unwrap();
        let arc = graph.find_node("m.ShapeArc").unwrap();
        assert!(graph.supertypes(line).is_empty());
        assert_eq!(graph.supertypes(arc), vec![shape]);
        assert!(graph.is_inferred_parent(arc, shape));
        assert_eq!(outcome.report.inferred_supertypes, 1);
    }

    #[test]
    fn test_unclustered_marker_suppresses_similarity_clusters() {
        let marked = |name: &str, method: &str, label: Option<&str>| ClassRecord {
            cluster: Some(label.map_or_else(|| unclustered_label(name), str::to_string)),
            ..ClassRecord::new(name, "m")
                .with_supertypes(Vec::<String>::new())
                .with_method(MethodRecord::new(method))
        };
        let graph = build_graph(
            &catalog(vec![
                marked("m.Line", "length", None),
                marked("m.Arc", "length", None),
                marked("m.Point", "move", None),
                marked("m.Point", "move", Some("geometry")),
            ]),
            &BuildConfig::default(),
        )
        .unwrap()
        .graph;

        let line = graph.find_class("m.Line").unwrap();
        let point = graph.find_class("m.Point").unwrap();
        assert!(graph.cluster_of(line).is_none());
        assert!(graph.class(line).unwrap().cluster.is_none());
        assert_eq!(graph.class(point).unwrap().cluster.as_deref(), Some("geometry"));
        assert_eq!(graph.clusters().len(), 1);
        assert_eq!(graph.stats().cluster_edges, 0);
    }

    #[test]
    fn test_dangling_supertype_reported() {
        let outcome = build_graph(
            &catalog(vec![
                ClassRecord::new("m.Part", "m").with_supertypes(["m.Missing", "Part"]),
            ]),
            &BuildConfig::default(),
        )
        .unwrap();

        assert_eq!(outcome.graph.stats().inherits_edges, 0);
        assert_eq!(
            outcome.report.warnings,
            vec![BuildWarning::DanglingSupertype {
                class_name: "m.Part".to_string(),
                supertype: "m.Missing".to_string(),
            }]
        );
    }
}
