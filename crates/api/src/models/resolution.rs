use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Matching strategy that produced a resolution, in priority order.
#[derive(
    Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, JsonSchema,
)]
#[serde(rename_all = "lowercase")]
pub enum MatchTier {
    Exact,
    Priority,
    Semantic,
    Fallback,
    None,
}

impl MatchTier {
    /// Tiers that can yield a candidate, in the order they are attempted.
    pub const ORDERED: [MatchTier; 4] = [
        MatchTier::Exact,
        MatchTier::Priority,
        MatchTier::Semantic,
        MatchTier::Fallback,
    ];

    pub fn confidence(self) -> f64 {
        match self {
            MatchTier::Exact => 0.95,
            MatchTier::Priority => 0.85,
            MatchTier::Semantic => 0.65,
            MatchTier::Fallback => 0.25,
            MatchTier::None => 0.0,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            MatchTier::Exact => "exact",
            MatchTier::Priority => "priority",
            MatchTier::Semantic => "semantic",
            MatchTier::Fallback => "fallback",
            MatchTier::None => "none",
        }
    }
}

impl fmt::Display for MatchTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Why a call-site did not get (or only weakly got) a match.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq, JsonSchema)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ResolutionIssue {
    /// No class in the graph declares the bare method name.
    UnknownMethodName { method_name: String },
    /// The object-chain could not be resolved to a class.
    AmbiguousChain { chain: Vec<String> },
    /// The chain resolved, but neither the class nor its ancestors declare the method.
    NoDeclaringAncestor { receiver_class: String },
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, JsonSchema)]
pub struct CandidateOutput {
    pub class_name: String,
    pub method_name: String,
}

/// Per call-site output record, emitted in input order.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, JsonSchema)]
pub struct ResolutionOutput {
    pub ordinal: u32,
    pub call: String,
    pub matched_class: Option<String>,
    pub matched_method: Option<String>,
    pub confidence: f64,
    pub tier: MatchTier,
    /// Class the object-chain resolved to, when it did.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub receiver_class: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub issue: Option<ResolutionIssue>,
    /// Every candidate of the winning tier, best first.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub candidates: Vec<CandidateOutput>,
}

impl ResolutionOutput {
    pub fn is_match(&self) -> bool {
        self.tier != MatchTier::None
    }

    /// `class.method` identity of the match.
    pub fn full_signature(&self) -> Option<String> {
        match (&self.matched_class, &self.matched_method) {
            (Some(class), Some(method)) => Some(format!("{}.{}", class, method)),
            _ => None,
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq, JsonSchema)]
pub struct WorkflowStats {
    pub total: usize,
    pub matched: usize,
    pub unmatched: usize,
    pub success_rate: f64,
    pub mean_confidence: f64,
    pub by_tier: BTreeMap<MatchTier, usize>,
}

impl WorkflowStats {
    pub fn from_outputs(outputs: &[ResolutionOutput]) -> Self {
        let total = outputs.len();
        let matched = outputs.iter().filter(|o| o.is_match()).count();
        let mut by_tier = BTreeMap::new();
        for output in outputs {
            *by_tier.entry(output.tier).or_insert(0) += 1;
        }
        let (success_rate, mean_confidence) = if total == 0 {
            (0.0, 0.0)
        } else {
            let sum: f64 = outputs.iter().map(|o| o.confidence).sum();
            (matched as f64 / total as f64, sum / total as f64)
        };
        Self {
            total,
            matched,
            unmatched: total - matched,
            success_rate,
            mean_confidence,
            by_tier,
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, JsonSchema)]
pub struct WorkflowReport {
    pub workflow: String,
    pub results: Vec<ResolutionOutput>,
    pub stats: WorkflowStats,
}
