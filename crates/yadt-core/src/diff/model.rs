//! Diff output types.

use std::fmt;

use crate::model::Document;

/// One step of a path into a document
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum PathSegment {
    /// Mapping key
    Key(String),
    /// Sequence index
    Index(usize),
}

/// Location of a node inside a document, rendered as `spec.ports[0].port`
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct Path {
    segments: Vec<PathSegment>,
}

impl Path {
    /// The empty path addressing the document root
    pub fn root() -> Self {
        Self::default()
    }

    pub fn is_root(&self) -> bool {
        self.segments.is_empty()
    }

    pub fn segments(&self) -> &[PathSegment] {
        &self.segments
    }

    /// Extend with a mapping key
    pub fn key(&self, key: &str) -> Self {
        let mut segments = self.segments.clone();
        segments.push(PathSegment::Key(key.to_string()));
        Self { segments }
    }

    /// Extend with a sequence index
    pub fn index(&self, index: usize) -> Self {
        let mut segments = self.segments.clone();
        segments.push(PathSegment::Index(index));
        Self { segments }
    }
}

impl fmt::Display for Path {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, segment) in self.segments.iter().enumerate() {
            match segment {
                PathSegment::Key(key) if i == 0 => f.write_str(key)?,
                PathSegment::Key(key) => write!(f, ".{}", key)?,
                PathSegment::Index(index) => write!(f, "[{}]", index)?,
            }
        }
        Ok(())
    }
}

impl<S: Into<String>> FromIterator<S> for Path {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        Self {
            segments: iter
                .into_iter()
                .map(|s| PathSegment::Key(s.into()))
                .collect(),
        }
    }
}

/// What happened at a path
#[derive(Debug, Clone, PartialEq)]
pub enum Change {
    /// Present only in the new tree
    Added(Document),
    /// Present only in the old tree
    Removed(Document),
    /// Present in both with a different value or shape. Equivalent to
    /// `Removed(old)` followed by `Added(new)` at the same path.
    Replaced { old: Document, new: Document },
}

/// A single structural difference
#[derive(Debug, Clone, PartialEq)]
pub struct DiffNode {
    pub path: Path,
    pub change: Change,
}

impl DiffNode {
    pub fn added(path: Path, value: Document) -> Self {
        Self {
            path,
            change: Change::Added(value),
        }
    }

    pub fn removed(path: Path, value: Document) -> Self {
        Self {
            path,
            change: Change::Removed(value),
        }
    }

    pub fn replaced(path: Path, old: Document, new: Document) -> Self {
        Self {
            path,
            change: Change::Replaced { old, new },
        }
    }

    /// Split into removal/addition steps: a replacement becomes its removal
    /// followed by its addition, anything else is returned as is.
    pub fn decompose(&self) -> Vec<DiffNode> {
        match &self.change {
            Change::Replaced { old, new } => vec![
                DiffNode::removed(self.path.clone(), old.clone()),
                DiffNode::added(self.path.clone(), new.clone()),
            ],
            _ => vec![self.clone()],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_path_display() {
        let path = Path::root().key("spec").key("ports").index(0).key("port");
        assert_eq!(path.to_string(), "spec.ports[0].port");
    }

    #[test]
    fn test_root_path_displays_empty() {
        assert_eq!(Path::root().to_string(), "");
        assert!(Path::root().is_root());
    }

    #[test]
    fn test_index_at_root_has_no_leading_dot() {
        assert_eq!(Path::root().index(2).key("a").to_string(), "[2].a");
    }

    #[test]
    fn test_decompose_replacement_is_removal_then_addition() {
        let node = DiffNode::replaced(
            Path::from_iter(["spec", "replicas"]),
            Document::from(json!(1)),
            Document::from(json!(3)),
        );
        let parts = node.decompose();

        assert_eq!(parts.len(), 2);
        assert_eq!(parts[0].change, Change::Removed(Document::from(json!(1))));
        assert_eq!(parts[1].change, Change::Added(Document::from(json!(3))));
        assert!(parts.iter().all(|p| p.path == node.path));
    }
}
