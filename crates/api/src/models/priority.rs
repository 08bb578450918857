use indexmap::IndexMap;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Externally supplied domain knowledge: bare method name to an ordered
/// list of preferred class names (qualified or short).
///
/// The engine only applies whatever table it is handed; it never
/// embeds preferences of its own.
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq, Eq, JsonSchema)]
#[serde(transparent)]
pub struct PriorityTable {
    #[schemars(with = "std::collections::BTreeMap<String, Vec<String>>")]
    entries: IndexMap<String, Vec<String>>,
}

impl PriorityTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_entry<I, S>(mut self, method_name: impl Into<String>, classes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.insert(method_name, classes);
        self
    }

    pub fn insert<I, S>(&mut self, method_name: impl Into<String>, classes: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.entries.insert(
            method_name.into(),
            classes.into_iter().map(Into::into).collect(),
        );
    }

    /// Preferred classes for `method_name`, most preferred first.
    pub fn preferred(&self, method_name: &str) -> &[String] {
        self.entries
            .get(method_name)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &Vec<String>)> {
        self.entries.iter()
    }
}

impl FromIterator<(String, Vec<String>)> for PriorityTable {
    fn from_iter<T: IntoIterator<Item = (String, Vec<String>)>>(iter: T) -> Self {
        Self {
            entries: iter.into_iter().collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_preferred_keeps_declared_order() {
        let table: PriorityTable =
            serde_json::from_str(r#"{"add": ["HybridBodies", "Bodies"], "update": ["Part"]}"#)
                .unwrap();
        assert_eq!(table.preferred("add"), ["HybridBodies", "Bodies"]);
        assert!(table.preferred("missing").is_empty());
        assert_eq!(table.len(), 2);
    }
}
