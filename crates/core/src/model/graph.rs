use smol_str::SmolStr;
use std::collections::{BTreeMap, BTreeSet};

pub use methodscope_api::models::{EdgeKind, NodeKind};

/// Node weight of the knowledge graph.
#[derive(Debug, Clone)]
pub enum GraphNode {
    Class(ClassNode),
    Method(MethodNode),
}

impl GraphNode {
    pub fn kind(&self) -> NodeKind {
        match self {
            GraphNode::Class(_) => NodeKind::Class,
            GraphNode::Method(_) => NodeKind::Method,
        }
    }

    /// Graph-wide identity: the qualified class name, or `Class#method`.
    pub fn fqn(&self) -> SmolStr {
        match self {
            GraphNode::Class(c) => c.qualified_name.clone(),
            GraphNode::Method(m) => m.fqn(),
        }
    }

    pub fn as_class(&self) -> Option<&ClassNode> {
        match self {
            GraphNode::Class(c) => Some(c),
            GraphNode::Method(_) => None,
        }
    }

    pub fn as_method(&self) -> Option<&MethodNode> {
        match self {
            GraphNode::Method(m) => Some(m),
            GraphNode::Class(_) => None,
        }
    }
}

#[derive(Debug, Clone)]
pub struct ClassNode {
    pub qualified_name: SmolStr,
    pub short_name: SmolStr,
    pub module_path: SmolStr,
    pub domain: SmolStr,
    pub method_names: BTreeSet<SmolStr>,
    /// Resolved supertypes (declared or inferred), sorted.
    pub supertypes: Vec<SmolStr>,
    /// `true` when `supertypes` came from the catalog rather than inference.
    pub supertypes_declared: bool,
    /// Attribute name → resolved qualified type name (`None` = unknown).
    pub attributes: BTreeMap<SmolStr, Option<SmolStr>>,
    pub cluster: Option<SmolStr>,
    pub is_factory: bool,
    pub is_collection: bool,
}

impl ClassNode {
    pub fn declares(&self, method_name: &str) -> bool {
        self.method_names.contains(method_name)
    }
}

#[derive(Debug, Clone)]
pub struct MethodNode {
    /// Qualified name of the owning class.
    pub owner: SmolStr,
    pub name: SmolStr,
    pub params: Vec<SmolStr>,
    /// Annotation as written in the catalog.
    pub declared_return: Option<SmolStr>,
    /// Qualified name of the RETURNS target, when it resolved.
    pub return_class: Option<SmolStr>,
}

impl MethodNode {
    pub fn fqn(&self) -> SmolStr {
        method_fqn(&self.owner, &self.name)
    }

    /// `owner.method` rendering used in reports.
    pub fn full_signature(&self) -> String {
        format!("{}.{}", self.owner, self.name)
    }
}

pub fn method_fqn(owner: &str, method: &str) -> SmolStr {
    SmolStr::from(format!("{}#{}", owner, method))
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct GraphEdge {
    pub kind: EdgeKind,
    /// Set on INHERITS edges derived by the builder's heuristics.
    pub inferred: bool,
}

impl GraphEdge {
    pub fn new(kind: EdgeKind) -> Self {
        Self {
            kind,
            inferred: false,
        }
    }

    pub fn inferred(kind: EdgeKind) -> Self {
        Self {
            kind,
            inferred: true,
        }
    }
}
