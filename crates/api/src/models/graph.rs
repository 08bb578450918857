use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Hash, JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum NodeKind {
    Class,
    Method,
}

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Hash, JsonSchema)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum EdgeKind {
    /// Child → Parent structural hierarchy.
    Inherits,
    /// Class → Method ownership.
    Declares,
    /// Method → Class inferred return type.
    Returns,
    /// Class ↔ Class semantic similarity, stored once and read undirected.
    Cluster,
}

impl fmt::Display for EdgeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            EdgeKind::Inherits => "INHERITS",
            EdgeKind::Declares => "DECLARES",
            EdgeKind::Returns => "RETURNS",
            EdgeKind::Cluster => "CLUSTER",
        };
        f.write_str(s)
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq, Eq, JsonSchema)]
pub struct GraphStats {
    pub classes: usize,
    pub methods: usize,
    pub distinct_method_names: usize,
    pub inherits_edges: usize,
    pub inferred_inherits_edges: usize,
    pub returns_edges: usize,
    pub cluster_edges: usize,
    pub clusters: usize,
}

/// Node/link document for visualization tools.
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq, JsonSchema)]
pub struct GraphDocument {
    pub nodes: Vec<DocumentNode>,
    pub links: Vec<DocumentLink>,
    pub stats: GraphStats,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, JsonSchema)]
pub struct DocumentNode {
    pub id: String,
    pub label: String,
    pub kind: NodeKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub domain: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub method_count: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cluster: Option<String>,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, JsonSchema)]
pub struct DocumentLink {
    pub source: String,
    pub target: String,
    pub kind: EdgeKind,
    /// Set on INHERITS links derived heuristically rather than declared.
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub inferred: bool,
}

/// Read-only view of one class, as reported by `inspect`.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, JsonSchema)]
pub struct ClassInfo {
    pub qualified_name: String,
    pub module_path: String,
    pub domain: String,
    pub methods: Vec<String>,
    pub supertypes: Vec<String>,
    pub subtypes: Vec<String>,
    pub ancestors: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cluster: Option<String>,
    pub is_factory: bool,
    pub is_collection: bool,
}

/// Read-only view of one method, as reported by `inspect`.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, JsonSchema)]
pub struct MethodInfo {
    pub class_name: String,
    pub method_name: String,
    pub full_signature: String,
    pub params: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub return_class: Option<String>,
}
