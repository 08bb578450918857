use crate::error::{ApiError, ApiResult};
use schemars::JsonSchema;
use serde::{Deserialize, Deserializer, Serialize};

/// One `<object-chain>.<method-name>` reference inside a workflow.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq, JsonSchema)]
pub struct CallSiteRecord {
    /// Variable receiving the call's result, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub receiving_variable: Option<String>,
    /// Segments preceding the method name. Accepts either a JSON array
    /// or a dotted string (`"part.hybrid_bodies"`).
    #[serde(default, deserialize_with = "deserialize_chain")]
    pub object_chain: Vec<String>,
    pub method_name: String,
    #[serde(default)]
    pub ordinal: u32,
}

impl CallSiteRecord {
    pub fn new<I, S>(object_chain: I, method_name: impl Into<String>, ordinal: u32) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            receiving_variable: None,
            object_chain: object_chain.into_iter().map(Into::into).collect(),
            method_name: method_name.into(),
            ordinal,
        }
    }

    pub fn assigned_to(mut self, variable: impl Into<String>) -> Self {
        self.receiving_variable = Some(variable.into());
        self
    }

    pub fn validate(&self) -> ApiResult<()> {
        if self.method_name.trim().is_empty() {
            return Err(ApiError::InvalidCallSite(format!(
                "call-site #{} has no method name",
                self.ordinal
            )));
        }
        Ok(())
    }

    /// `chain.method` rendering used in logs and reports.
    pub fn display_path(&self) -> String {
        if self.object_chain.is_empty() {
            self.method_name.clone()
        } else {
            format!("{}.{}", self.object_chain.join("."), self.method_name)
        }
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum ChainRepr {
    Dotted(String),
    Segments(Vec<String>),
}

fn deserialize_chain<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match ChainRepr::deserialize(deserializer)? {
        ChainRepr::Dotted(s) => s
            .split('.')
            .map(str::trim)
            .filter(|seg| !seg.is_empty())
            .map(str::to_string)
            .collect(),
        ChainRepr::Segments(segments) => segments,
    })
}

/// An ordered call-site sequence resolved against one Context Tracker.
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq, Eq, JsonSchema)]
pub struct Workflow {
    #[serde(default)]
    pub name: String,
    pub call_sites: Vec<CallSiteRecord>,
}

impl Workflow {
    pub fn new(name: impl Into<String>, call_sites: Vec<CallSiteRecord>) -> Self {
        Self {
            name: name.into(),
            call_sites,
        }
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum WorkflowDocument {
    Many(Vec<Workflow>),
    Single(Vec<CallSiteRecord>),
}

/// Parses either `[{name, call_sites}, ...]` or a bare call-site array,
/// the latter becoming one workflow named `default`.
pub fn workflows_from_json_str(input: &str) -> Result<Vec<Workflow>, serde_json::Error> {
    Ok(match serde_json::from_str(input)? {
        WorkflowDocument::Many(workflows) => workflows,
        WorkflowDocument::Single(call_sites) => vec![Workflow::new("default", call_sites)],
    })
}
