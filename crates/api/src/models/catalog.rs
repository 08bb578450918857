use crate::error::{ApiError, ApiResult};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// The full corpus of known classes, in no particular order.
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq, JsonSchema)]
pub struct Catalog {
    pub classes: Vec<ClassRecord>,
}

/// Accepted on-disk shapes: `{"classes": [...]}` or a bare record array.
#[derive(Deserialize)]
#[serde(untagged)]
enum CatalogDocument {
    Wrapped { classes: Vec<ClassRecord> },
    Bare(Vec<ClassRecord>),
}

impl Catalog {
    pub fn new(classes: Vec<ClassRecord>) -> Self {
        Self { classes }
    }

    pub fn from_json_str(input: &str) -> Result<Self, serde_json::Error> {
        let doc: CatalogDocument = serde_json::from_str(input)?;
        Ok(match doc {
            CatalogDocument::Wrapped { classes } | CatalogDocument::Bare(classes) => {
                Self { classes }
            }
        })
    }

    pub fn len(&self) -> usize {
        self.classes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.classes.is_empty()
    }

    pub fn method_count(&self) -> usize {
        self.classes.iter().map(|c| c.methods.len()).sum()
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq, JsonSchema)]
pub struct ClassRecord {
    /// Identity. An empty value marks the record as malformed.
    #[serde(default)]
    pub qualified_name: String,
    #[serde(default)]
    pub module_path: String,
    #[serde(default)]
    pub methods: Vec<MethodRecord>,
    /// `None` means unknown (inheritance may be inferred),
    /// `Some(vec![])` declares a root class.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub supertypes: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub attributes: Vec<AttributeRecord>,
    /// Explicit semantic group label. When any record carries one,
    /// labels replace computed clustering. A label built by
    /// [`unclustered_label`] pins the class outside every cluster.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cluster: Option<String>,
}

impl ClassRecord {
    pub fn new(qualified_name: impl Into<String>, module_path: impl Into<String>) -> Self {
        Self {
            qualified_name: qualified_name.into(),
            module_path: module_path.into(),
            ..Default::default()
        }
    }

    pub fn with_method(mut self, method: MethodRecord) -> Self {
        self.methods.push(method);
        self
    }

    pub fn with_supertypes<I, S>(mut self, supertypes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.supertypes = Some(supertypes.into_iter().map(Into::into).collect());
        self
    }

    pub fn with_attribute(mut self, attribute: AttributeRecord) -> Self {
        self.attributes.push(attribute);
        self
    }

    /// Last dotted segment of the qualified name.
    pub fn short_name(&self) -> &str {
        short_name_of(&self.qualified_name)
    }

    /// Checks the identity fields. Method-level problems are reported
    /// separately so one bad method does not discard its class.
    pub fn validate(&self) -> ApiResult<()> {
        let name = self.qualified_name.trim();
        if name.is_empty() {
            return Err(ApiError::MalformedRecord(
                "class record without qualified_name".to_string(),
            ));
        }
        if name.chars().any(char::is_whitespace) {
            return Err(ApiError::MalformedRecord(format!(
                "qualified_name '{}' contains whitespace",
                self.qualified_name
            )));
        }
        if name.starts_with('.') || name.ends_with('.') {
            return Err(ApiError::MalformedRecord(format!(
                "qualified_name '{}' has an empty segment",
                self.qualified_name
            )));
        }
        Ok(())
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq, JsonSchema)]
pub struct MethodRecord {
    #[serde(default)]
    pub name: String,
    /// Best-effort parameter names.
    #[serde(default)]
    pub params: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub return_type: Option<String>,
}

impl MethodRecord {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    pub fn returning(mut self, return_type: impl Into<String>) -> Self {
        self.return_type = Some(return_type.into());
        self
    }

    pub fn with_params<I, S>(mut self, params: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.params = params.into_iter().map(Into::into).collect();
        self
    }

    pub fn is_valid(&self) -> bool {
        let name = self.name.trim();
        !name.is_empty() && !name.contains('.') && !name.chars().any(char::is_whitespace)
    }
}

/// A declared property and its annotated type.
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq, JsonSchema)]
pub struct AttributeRecord {
    #[serde(default)]
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub type_name: Option<String>,
}

impl AttributeRecord {
    pub fn new(name: impl Into<String>, type_name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            type_name: Some(type_name.into()),
        }
    }
}

/// Prefix of labels that mark a class as belonging to no cluster.
pub const UNCLUSTERED_PREFIX: &str = "unclustered:";

pub fn unclustered_label(qualified_name: &str) -> String {
    format!("{}{}", UNCLUSTERED_PREFIX, qualified_name)
}

pub fn is_unclustered_label(label: &str) -> bool {
    label.starts_with(UNCLUSTERED_PREFIX)
}

pub fn short_name_of(qualified_name: &str) -> &str {
    qualified_name
        .rsplit('.')
        .next()
        .unwrap_or(qualified_name)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unclustered_label_marker() {
        let label = unclustered_label("a.B");
        assert_eq!(label, "unclustered:a.B");
        assert!(is_unclustered_label(&label));
        assert!(!is_unclustered_label("geometry"));
    }

    #[test]
    fn test_parse_wrapped_and_bare_catalogs() {
        let wrapped = r#"{"classes": [{"qualified_name": "a.B", "module_path": "a"}]}"#;
        let bare = r#"[{"qualified_name": "a.B", "module_path": "a"}]"#;

        let c1 = Catalog::from_json_str(wrapped).unwrap();
        let c2 = Catalog::from_json_str(bare).unwrap();
        assert_eq!(c1, c2);
        assert_eq!(c1.classes[0].short_name(), "B");
        assert!(c1.classes[0].supertypes.is_none());
    }

    #[test]
    fn test_missing_identity_is_malformed() {
        let catalog = Catalog::from_json_str(r#"[{"module_path": "a"}]"#).unwrap();
        assert!(catalog.classes[0].validate().is_err());

        let spaced = ClassRecord::new("a.Bad Name", "a");
        assert!(spaced.validate().is_err());
    }

    #[test]
    fn test_empty_supertypes_survive_roundtrip() {
        let record = ClassRecord::new("a.Root", "a").with_supertypes(Vec::<String>::new());
        let json = serde_json::to_string(&record).unwrap();
        let back: ClassRecord = serde_json::from_str(&json).unwrap();
        assert_eq!(back.supertypes, Some(vec![]));
    }

    #[test]
    fn test_method_validity() {
        assert!(MethodRecord::new("add_new_point").is_valid());
        assert!(!MethodRecord::new("").is_valid());
        assert!(!MethodRecord::new("a.b").is_valid());
    }
}
