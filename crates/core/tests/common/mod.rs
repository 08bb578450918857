use methodscope_api::models::{
    AttributeRecord, CallSiteRecord, Catalog, ClassRecord, MethodRecord, PriorityTable,
    ResolutionOutput, Workflow,
};
use methodscope_core::config::{BuildConfig, ResolverConfig};
use methodscope_core::{KnowledgeGraph, build_graph, resolve_workflow};

/// Fluent catalog builder for integration tests.
#[allow(dead_code)]
pub struct CatalogFixture {
    classes: Vec<ClassRecord>,
}

#[allow(dead_code)]
impl CatalogFixture {
    pub fn new() -> Self {
        Self {
            classes: Vec::new(),
        }
    }

    /// Adds a class; the module path is everything before the last dot.
    pub fn class(mut self, name: &str, configure: impl FnOnce(ClassFixture) -> ClassFixture) -> Self {
        let module = name.rsplit_once('.').map(|(m, _)| m).unwrap_or(name);
        let fixture = configure(ClassFixture {
            record: ClassRecord::new(name, module),
        });
        self.classes.push(fixture.record);
        self
    }

    pub fn record(mut self, record: ClassRecord) -> Self {
        self.classes.push(record);
        self
    }

    pub fn catalog(&self) -> Catalog {
        Catalog::new(self.classes.clone())
    }

    pub fn graph(&self) -> KnowledgeGraph {
        build_graph(&self.catalog(), &BuildConfig::default())
            .expect("fixture catalog should build")
            .graph
    }
}

pub struct ClassFixture {
    record: ClassRecord,
}

#[allow(dead_code)]
impl ClassFixture {
    pub fn method(mut self, name: &str) -> Self {
        self.record.methods.push(MethodRecord::new(name));
        self
    }

    pub fn returns(mut self, name: &str, return_type: &str) -> Self {
        self.record
            .methods
            .push(MethodRecord::new(name).returning(return_type));
        self
    }

    pub fn extends(mut self, supertypes: &[&str]) -> Self {
        self.record.supertypes = Some(supertypes.iter().map(|s| s.to_string()).collect());
        self
    }

    /// Declared root: no supertypes, and none inferred.
    pub fn root(mut self) -> Self {
        self.record.supertypes = Some(Vec::new());
        self
    }

    pub fn attribute(mut self, name: &str, type_name: &str) -> Self {
        self.record
            .attributes
            .push(AttributeRecord::new(name, type_name));
        self
    }

    pub fn cluster(mut self, label: &str) -> Self {
        self.record.cluster = Some(label.to_string());
        self
    }
}

/// `"a.b.method"` → chain `[a, b]`, method `method`.
#[allow(dead_code)]
pub fn call(path: &str) -> CallSiteRecord {
    let mut segments: Vec<&str> = path.split('.').collect();
    let method = segments.pop().unwrap_or_default();
    CallSiteRecord::new(segments, method, 0)
}

/// Numbers call-sites in the order given.
#[allow(dead_code)]
pub fn workflow(calls: Vec<CallSiteRecord>) -> Workflow {
    let call_sites = calls
        .into_iter()
        .enumerate()
        .map(|(i, mut c)| {
            c.ordinal = i as u32;
            c
        })
        .collect();
    Workflow::new("test", call_sites)
}

#[allow(dead_code)]
pub fn resolve(
    graph: &KnowledgeGraph,
    priorities: &PriorityTable,
    calls: Vec<CallSiteRecord>,
) -> Vec<ResolutionOutput> {
    resolve_workflow(graph, priorities, &ResolverConfig::default(), &workflow(calls)).outputs(graph)
}

/// A small CAD-flavored catalog: documents, parts, bodies, a shape
/// factory and hybrid shapes whose hierarchy is left to inference.
#[allow(dead_code)]
pub fn cad_catalog() -> CatalogFixture {
    CatalogFixture::new()
        .class("pycatia.system_interfaces.AnyObject", |c| {
            c.root().method("name").returns("parent", "AnyObject")
        })
        .class("pycatia.system_interfaces.Collection", |c| {
            c.root().method("item").method("count")
        })
        .class("pycatia.in_interfaces.Documents", |c| {
            c.extends(&["Collection"])
                .returns("add", "<class 'pycatia.in_interfaces.Document'>")
                .returns("open", "Document")
        })
        .class("pycatia.in_interfaces.Document", |c| {
            c.extends(&["AnyObject"])
                .method("save")
                .method("close")
                .attribute("part", "pycatia.mec_mod_interfaces.Part")
        })
        .class("pycatia.mec_mod_interfaces.Part", |c| {
            c.extends(&["AnyObject"])
                .method("update")
                .method("in_work_object")
                .attribute("hybrid_bodies", "HybridBodies")
                .attribute("hybrid_shape_factory", "'HybridShapeFactory'")
        })
        .class("pycatia.mec_mod_interfaces.HybridBodies", |c| {
            c.extends(&["Collection"])
                .returns("add", "HybridBody")
                .returns("item", "HybridBody")
        })
        .class("pycatia.mec_mod_interfaces.HybridBody", |c| {
            c.extends(&["AnyObject"])
                .method("append_hybrid_shape")
                .method("insert_hybrid_shape")
        })
        .class("pycatia.hybrid_shape_interfaces.HybridShapeFactory", |c| {
            c.extends(&["AnyObject"])
                .returns("add_new_spline", "HybridShapeSpline")
                .returns("add_new_point_coord", "Optional[HybridShapePointCoord]")
                .method("delete_object_for_datum")
        })
        .class("pycatia.hybrid_shape_interfaces.HybridShape", |c| {
            c.method("compute").method("append_hybrid_shape").method("reframe")
        })
        .class("pycatia.hybrid_shape_interfaces.HybridShapeSpline", |c| {
            c.method("compute")
                .method("append_hybrid_shape")
                .method("add_point")
                .method("set_closing")
        })
        .class("pycatia.hybrid_shape_interfaces.HybridShapePointCoord", |c| {
            c.method("compute")
                .method("append_hybrid_shape")
                .method("set_coordinates")
        })
        .class("pycatia.sketcher_interfaces.Sketches", |c| {
            c.extends(&["Collection"]).returns("add", "Sketch")
        })
        .class("pycatia.sketcher_interfaces.Sketch", |c| {
            c.extends(&["AnyObject"])
                .method("open_edition")
                .method("close_edition")
        })
        .class("pycatia.mec_mod_interfaces.Shapes", |c| c.root())
}

/// A session over [`cad_catalog`] touching every tier.
#[allow(dead_code)]
pub fn cad_session() -> Vec<CallSiteRecord> {
    vec![
        call("documents.add").assigned_to("doc"),
        call("doc.part.update"),
        call("doc.part.hybrid_bodies.add").assigned_to("body"),
        call("body.append_hybrid_shape"),
        call("doc.part.hybrid_shape_factory.add_new_spline").assigned_to("spline"),
        call("spline.add_point"),
        call("spline.compute"),
        call("spline.reframe"),
        call("pt.set_coordinates"),
        call("hybrid_bodies.item"),
        call("sketches.add").assigned_to("sketch"),
        call("sketch.open_edition"),
        call("count"),
        call("thing.close"),
        call("thing.teleport"),
    ]
}

#[allow(dead_code)]
pub fn cad_priorities() -> PriorityTable {
    PriorityTable::new().with_entry("set_coordinates", ["HybridShapePointCoord"])
}
