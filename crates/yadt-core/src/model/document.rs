//! Semi-structured document tree.
//!
//! Snapshots arrive as JSON and are normalized into [`Document`], an explicit
//! tagged tree the differ can match on exhaustively. [`Mapping`] keeps its
//! entries in a `HashMap`: iteration order is undefined, and every ordered
//! walk goes through [`Mapping::sorted_keys`].

use serde_json::{Number, Value};
use std::collections::HashMap;
use std::fmt;

/// Leaf value of a document tree
#[derive(Debug, Clone, PartialEq)]
pub enum Scalar {
    Null,
    Bool(bool),
    Number(Number),
    String(String),
}

impl fmt::Display for Scalar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Scalar::Null => f.write_str("null"),
            Scalar::Bool(b) => write!(f, "{}", b),
            Scalar::Number(n) => write!(f, "{}", n),
            Scalar::String(s) => f.write_str(s),
        }
    }
}

/// Shape of a document node, used for kind comparisons and log fields
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentKind {
    Null,
    Bool,
    Number,
    String,
    Sequence,
    Mapping,
}

impl DocumentKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            DocumentKind::Null => "null",
            DocumentKind::Bool => "bool",
            DocumentKind::Number => "number",
            DocumentKind::String => "string",
            DocumentKind::Sequence => "sequence",
            DocumentKind::Mapping => "mapping",
        }
    }
}

/// Unordered string-keyed mapping of documents
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Mapping {
    entries: HashMap<String, Document>,
}

impl Mapping {
    /// Create an empty mapping
    pub fn new() -> Self {
        Self {
            entries: HashMap::new(),
        }
    }

    /// Get a value by key
    pub fn get(&self, key: &str) -> Option<&Document> {
        self.entries.get(key)
    }

    /// Get a mutable value by key
    pub fn get_mut(&mut self, key: &str) -> Option<&mut Document> {
        self.entries.get_mut(key)
    }

    /// Insert a value, returning the previous one
    pub fn insert(&mut self, key: impl Into<String>, value: Document) -> Option<Document> {
        self.entries.insert(key.into(), value)
    }

    /// Remove a value by key
    pub fn remove(&mut self, key: &str) -> Option<Document> {
        self.entries.remove(key)
    }

    /// Check if a key exists
    pub fn contains_key(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    /// Number of entries
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Check if the mapping is empty
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Keep only entries whose key satisfies the predicate
    pub fn retain_keys<F>(&mut self, mut keep: F)
    where
        F: FnMut(&str) -> bool,
    {
        self.entries.retain(|k, _| keep(k));
    }

    /// Keys in lexicographic order
    pub fn sorted_keys(&self) -> Vec<&str> {
        let mut keys: Vec<&str> = self.entries.keys().map(String::as_str).collect();
        keys.sort_unstable();
        keys
    }

    /// Unordered iteration over entries
    pub fn iter(&self) -> impl Iterator<Item = (&String, &Document)> {
        self.entries.iter()
    }
}

impl FromIterator<(String, Document)> for Mapping {
    fn from_iter<I: IntoIterator<Item = (String, Document)>>(iter: I) -> Self {
        Self {
            entries: iter.into_iter().collect(),
        }
    }
}

/// A semi-structured value tree
#[derive(Debug, Clone, PartialEq)]
pub enum Document {
    Scalar(Scalar),
    Sequence(Vec<Document>),
    Mapping(Mapping),
}

impl Document {
    /// Shorthand for a null scalar
    pub fn null() -> Self {
        Document::Scalar(Scalar::Null)
    }

    /// Shape of this node
    pub fn kind(&self) -> DocumentKind {
        match self {
            Document::Scalar(Scalar::Null) => DocumentKind::Null,
            Document::Scalar(Scalar::Bool(_)) => DocumentKind::Bool,
            Document::Scalar(Scalar::Number(_)) => DocumentKind::Number,
            Document::Scalar(Scalar::String(_)) => DocumentKind::String,
            Document::Sequence(_) => DocumentKind::Sequence,
            Document::Mapping(_) => DocumentKind::Mapping,
        }
    }

    /// True for mappings and sequences
    pub fn is_container(&self) -> bool {
        matches!(self, Document::Sequence(_) | Document::Mapping(_))
    }

    pub fn as_mapping(&self) -> Option<&Mapping> {
        match self {
            Document::Mapping(m) => Some(m),
            _ => None,
        }
    }

    pub fn as_mapping_mut(&mut self) -> Option<&mut Mapping> {
        match self {
            Document::Mapping(m) => Some(m),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Document::Scalar(Scalar::String(s)) => Some(s),
            _ => None,
        }
    }

    /// Look up a key when this node is a mapping
    pub fn get(&self, key: &str) -> Option<&Document> {
        self.as_mapping().and_then(|m| m.get(key))
    }

    /// Look up a string-valued key when this node is a mapping
    pub fn get_str(&self, key: &str) -> Option<&str> {
        self.get(key).and_then(Document::as_str)
    }

    /// Convert back into a JSON value
    pub fn to_json(&self) -> Value {
        match self {
            Document::Scalar(Scalar::Null) => Value::Null,
            Document::Scalar(Scalar::Bool(b)) => Value::Bool(*b),
            Document::Scalar(Scalar::Number(n)) => Value::Number(n.clone()),
            Document::Scalar(Scalar::String(s)) => Value::String(s.clone()),
            Document::Sequence(items) => {
                Value::Array(items.iter().map(Document::to_json).collect())
            }
            Document::Mapping(m) => {
                let mut obj = serde_json::Map::new();
                for key in m.sorted_keys() {
                    if let Some(value) = m.get(key) {
                        obj.insert(key.to_string(), value.to_json());
                    }
                }
                Value::Object(obj)
            }
        }
    }
}

impl From<Value> for Document {
    fn from(value: Value) -> Self {
        match value {
            Value::Null => Document::Scalar(Scalar::Null),
            Value::Bool(b) => Document::Scalar(Scalar::Bool(b)),
            Value::Number(n) => Document::Scalar(Scalar::Number(n)),
            Value::String(s) => Document::Scalar(Scalar::String(s)),
            Value::Array(items) => {
                Document::Sequence(items.into_iter().map(Document::from).collect())
            }
            Value::Object(obj) => Document::Mapping(
                obj.into_iter()
                    .map(|(k, v)| (k, Document::from(v)))
                    .collect(),
            ),
        }
    }
}

impl From<Mapping> for Document {
    fn from(mapping: Mapping) -> Self {
        Document::Mapping(mapping)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_from_json_builds_tagged_tree() {
        let doc = Document::from(json!({"a": [1, "x", null, true], "b": {}}));
        let m = doc.as_mapping().unwrap();
        assert_eq!(m.sorted_keys(), vec!["a", "b"]);
        match m.get("a").unwrap() {
            Document::Sequence(items) => {
                assert_eq!(items[0].kind(), DocumentKind::Number);
                assert_eq!(items[1].kind(), DocumentKind::String);
                assert_eq!(items[2].kind(), DocumentKind::Null);
                assert_eq!(items[3].kind(), DocumentKind::Bool);
            }
            other => panic!("expected sequence, got {:?}", other),
        }
    }

    #[test]
    fn test_json_round_trip_preserves_value() {
        let value = json!({"spec": {"replicas": 3, "ports": [{"port": 80}]}});
        assert_eq!(Document::from(value.clone()).to_json(), value);
    }

    #[test]
    fn test_integer_and_float_are_not_equal() {
        assert_ne!(Document::from(json!(1)), Document::from(json!(1.0)));
    }

    #[test]
    fn test_scalar_display_leaves_strings_unquoted() {
        assert_eq!(Scalar::String("nginx".into()).to_string(), "nginx");
        assert_eq!(Scalar::Null.to_string(), "null");
        assert_eq!(Scalar::Number(3.into()).to_string(), "3");
    }

    #[test]
    fn test_get_str_only_matches_strings() {
        let doc = Document::from(json!({"kind": "Pod", "n": 1}));
        assert_eq!(doc.get_str("kind"), Some("Pod"));
        assert_eq!(doc.get_str("n"), None);
        assert_eq!(doc.get_str("missing"), None);
    }
}
