mod common;

use common::{CatalogFixture, cad_catalog};
use methodscope_api::models::{Catalog, ClassRecord, MethodRecord};
use methodscope_core::config::BuildConfig;
use methodscope_core::export::to_graph_document;
use methodscope_core::{BuildWarning, MethodscopeError, build_graph};

#[test]
fn test_graph_independent_of_catalog_order() {
    let catalog = cad_catalog().catalog();
    let mut reversed = catalog.clone();
    reversed.classes.reverse();

    let a = build_graph(&catalog, &BuildConfig::default()).unwrap().graph;
    let b = build_graph(&reversed, &BuildConfig::default()).unwrap().graph;

    assert_eq!(a.stats(), b.stats());
    assert_eq!(to_graph_document(&a), to_graph_document(&b));
}

#[test]
fn test_malformed_records_are_skipped_not_fatal() {
    let catalog = Catalog::new(vec![
        ClassRecord::new("", "m").with_method(MethodRecord::new("lost")),
        ClassRecord::new("m.Good", "m")
            .with_method(MethodRecord::new("ok"))
            .with_method(MethodRecord::new("bad name")),
    ]);
    let outcome = build_graph(&catalog, &BuildConfig::default()).unwrap();

    assert_eq!(outcome.graph.class_count(), 1);
    assert_eq!(outcome.graph.method_count(), 1);
    assert_eq!(outcome.report.skipped_records, 1);
    let malformed = outcome
        .report
        .warnings
        .iter()
        .filter(|w| matches!(w, BuildWarning::MalformedRecord { .. }))
        .count();
    assert_eq!(malformed, 2);
    assert!(outcome.graph.methods_named("lost").is_empty());
}

#[test]
fn test_only_malformed_records_is_empty_catalog() {
    let catalog = Catalog::new(vec![ClassRecord::new(" ", "m")]);
    let result = build_graph(&catalog, &BuildConfig::default());
    assert!(matches!(result, Err(MethodscopeError::EmptyCatalog { skipped: 1 })));

    let result = build_graph(&Catalog::default(), &BuildConfig::default());
    assert!(matches!(result, Err(MethodscopeError::EmptyCatalog { skipped: 0 })));
}

#[test]
fn test_dangling_return_type_left_unknown() {
    let outcome = build_graph(
        &CatalogFixture::new()
            .class("m.Part", |c| c.root().returns("body", "Missing").returns("nothing", "None"))
            .catalog(),
        &BuildConfig::default(),
    )
    .unwrap();

    let graph = outcome.graph;
    let body = graph.find_node("m.Part#body").unwrap();
    assert!(graph.return_class(body).is_none());
    assert!(graph.method(body).unwrap().return_class.is_none());
    assert_eq!(graph.stats().returns_edges, 0);
    assert_eq!(
        outcome.report.warnings,
        vec![BuildWarning::DanglingReturnType {
            class_name: "m.Part".to_string(),
            method_name: "body".to_string(),
            return_type: "Missing".to_string(),
        }]
    );
}

#[test]
fn test_zero_method_class_is_isolated_node() {
    let graph = cad_catalog().graph();
    let shapes = graph.find_class("pycatia.mec_mod_interfaces.Shapes").unwrap();

    assert!(graph.supertypes(shapes).is_empty());
    assert!(graph.subtypes(shapes).is_empty());
    assert!(graph.cluster_of(shapes).is_none());
    assert_eq!(graph.topology().neighbors_undirected(shapes).count(), 0);
}

#[test]
fn test_every_method_has_exactly_one_owner() {
    let graph = cad_catalog().graph();
    for &class in graph.classes() {
        let node = graph.class(class).unwrap();
        for name in &node.method_names {
            let method = graph.declared_method(class, name).unwrap();
            assert_eq!(graph.owner_of(method), Some(class));
        }
    }
    assert_eq!(graph.methods_named("add").len(), 3);
}

#[test]
fn test_inferred_hierarchy_for_unknown_supertypes() {
    let outcome = build_graph(&cad_catalog().catalog(), &BuildConfig::default()).unwrap();
    let graph = outcome.graph;

    let base = graph.find_class("HybridShape").unwrap();
    let spline = graph.find_class("HybridShapeSpline").unwrap();
    let point = graph.find_class("HybridShapePointCoord").unwrap();

    assert_eq!(graph.supertypes(spline), vec![base]);
    assert_eq!(graph.supertypes(point), vec![base]);
    assert!(graph.is_inferred_parent(spline, base));
    assert!(graph.supertypes(base).is_empty());
    assert_eq!(outcome.report.inferred_supertypes, 2);

    let info = graph.class_info(spline).unwrap();
    assert_eq!(info.ancestors, vec!["pycatia.hybrid_shape_interfaces.HybridShape"]);
}

#[test]
fn test_inference_threshold_is_configurable() {
    let mut config = BuildConfig::default();
    config.inheritance.min_overlap = 1.0;
    config.inheritance.prefix_bonus = 0.0;
    let graph = build_graph(
        &CatalogFixture::new()
            .class("m.Shape", |c| c.method("a").method("b").method("c"))
            .class("m.Line", |c| c.method("a").method("b").method("d").method("e"))
            .catalog(),
        &config,
    )
    .unwrap()
    .graph;
    assert_eq!(graph.stats().inherits_edges, 0);

    config.inheritance.min_overlap = 0.6;
    let graph = build_graph(
        &CatalogFixture::new()
            .class("m.Shape", |c| c.method("a").method("b").method("c"))
            .class("m.Line", |c| c.method("a").method("b").method("d").method("e"))
            .catalog(),
        &config,
    )
    .unwrap()
    .graph;
    assert_eq!(graph.stats().inferred_inherits_edges, 1);
}

#[test]
fn test_cluster_labels_replace_computed_clusters() {
    let graph = CatalogFixture::new()
        .class("geo.Point", |c| c.root().method("compute").cluster("geometry"))
        .class("geo.Line", |c| c.root().method("length").cluster("geometry"))
        .class("xl.Sheet", |c| c.root().method("compute"))
        .graph();

    let point = graph.find_class("geo.Point").unwrap();
    let line = graph.find_class("geo.Line").unwrap();
    let sheet = graph.find_class("xl.Sheet").unwrap();

    assert_eq!(graph.clusters().len(), 1);
    assert_eq!(graph.cluster_members(point), &[line, point]);
    assert_eq!(graph.cluster_neighbors(point), vec![line]);
    assert!(graph.cluster_of(sheet).is_none());
    assert_eq!(graph.stats().cluster_edges, 1);
}

#[test]
fn test_similar_methods_lists_exact_declarers_first() {
    let graph = cad_catalog().graph();
    let similar: Vec<String> = graph
        .similar_methods("add", 5)
        .into_iter()
        .map(|m| graph.name_of(m).to_string())
        .collect();

    assert_eq!(
        &similar[..3],
        &[
            "pycatia.in_interfaces.Documents#add",
            "pycatia.mec_mod_interfaces.HybridBodies#add",
            "pycatia.sketcher_interfaces.Sketches#add",
        ]
    );
    assert!(similar[3..].iter().all(|m| m.contains("add")));
}

#[test]
fn test_descendants_and_ancestor_paths() {
    let graph = CatalogFixture::new()
        .class("m.Base", |c| c.root().method("run"))
        .class("m.Mid", |c| c.extends(&["m.Base"]).method("run"))
        .class("m.Child", |c| c.extends(&["m.Mid"]).method("stop"))
        .class("m.Side", |c| c.extends(&["m.Base"]).method("walk"))
        .graph();
    let base = graph.find_class("m.Base").unwrap();
    let mid = graph.find_class("m.Mid").unwrap();
    let child = graph.find_class("m.Child").unwrap();
    let side = graph.find_class("m.Side").unwrap();

    assert_eq!(graph.descendants(base, 8), vec![(mid, 1), (side, 1), (child, 2)]);
    assert_eq!(graph.descendants(base, 1), vec![(mid, 1), (side, 1)]);

    let ancestry = graph.ancestors(child, 8);
    assert_eq!(ancestry.depth_of(base), Some(2));
    assert_eq!(ancestry.path_to(base), vec![child, mid, base]);
    assert!(ancestry.path_to(side).is_empty());
}
