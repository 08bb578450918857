use crate::engine::KnowledgeGraph;
use methodscope_api::models::{CandidateOutput, MatchTier, ResolutionIssue, ResolutionOutput};
use petgraph::stable_graph::NodeIndex;
use smol_str::SmolStr;
use std::collections::BTreeSet;

/// Graph elements a resolution consulted successfully.
///
/// The relevance filter keeps the union of all footprints, which is what
/// makes re-resolution against the reduced catalog reproduce the result.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Footprint {
    pub classes: BTreeSet<NodeIndex>,
    pub methods: BTreeSet<NodeIndex>,
    /// `(owning class, attribute name)`
    pub attributes: BTreeSet<(NodeIndex, SmolStr)>,
}

impl Footprint {
    pub fn add_class(&mut self, class: NodeIndex) {
        self.classes.insert(class);
    }

    pub fn add_classes(&mut self, classes: impl IntoIterator<Item = NodeIndex>) {
        self.classes.extend(classes);
    }

    pub fn add_method(&mut self, method: NodeIndex) {
        self.methods.insert(method);
    }

    pub fn add_attribute(&mut self, owner: NodeIndex, name: impl Into<SmolStr>) {
        self.attributes.insert((owner, name.into()));
    }

    pub fn extend(&mut self, other: &Footprint) {
        self.classes.extend(other.classes.iter().copied());
        self.methods.extend(other.methods.iter().copied());
        self.attributes.extend(other.attributes.iter().cloned());
    }

    pub fn is_empty(&self) -> bool {
        self.classes.is_empty() && self.methods.is_empty() && self.attributes.is_empty()
    }
}

/// A `(class, method)` pair produced by a tier.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MethodMatch {
    pub class: NodeIndex,
    pub method: NodeIndex,
}

impl MethodMatch {
    /// `Class.method` rendering for logs.
    pub fn describe(&self, graph: &KnowledgeGraph) -> String {
        graph
            .method(self.method)
            .map(|m| m.full_signature())
            .unwrap_or_default()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ResolutionResult {
    pub ordinal: u32,
    /// `chain.method` as written at the call-site.
    pub call_path: String,
    pub tier: MatchTier,
    pub confidence: f64,
    pub matched: Option<MethodMatch>,
    /// Candidates of the winning tier, best first, the match included.
    pub candidates: Vec<MethodMatch>,
    /// Class the object-chain resolved to.
    pub receiver: Option<NodeIndex>,
    pub issue: Option<ResolutionIssue>,
    pub footprint: Footprint,
}

impl ResolutionResult {
    pub fn is_match(&self) -> bool {
        self.matched.is_some()
    }

    pub fn to_output(&self, graph: &KnowledgeGraph) -> ResolutionOutput {
        let name = |m: &MethodMatch| -> (String, String) {
            let method = graph
                .method(m.method)
                .map(|node| node.name.to_string())
                .unwrap_or_default();
            (graph.name_of(m.class).to_string(), method)
        };
        let (matched_class, matched_method) = match self.matched.as_ref().map(name) {
            Some((class, method)) => (Some(class), Some(method)),
            None => (None, None),
        };
        ResolutionOutput {
            ordinal: self.ordinal,
            call: self.call_path.clone(),
            matched_class,
            matched_method,
            confidence: self.confidence,
            tier: self.tier,
            receiver_class: self.receiver.map(|r| graph.name_of(r).to_string()),
            issue: self.issue.clone(),
            candidates: self
                .candidates
                .iter()
                .map(|c| {
                    let (class_name, method_name) = name(c);
                    CandidateOutput {
                        class_name,
                        method_name,
                    }
                })
                .collect(),
        }
    }
}
