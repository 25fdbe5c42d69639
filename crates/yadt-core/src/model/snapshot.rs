use crate::errors::{Result, YadtError};
use crate::model::document::{Document, Mapping};
use crate::model::identity::ResourceIdentity;

/// Default recognized top-level sections
pub const DEFAULT_SECTIONS: &[&str] = &["spec", "status"];

/// One resource's full state at one observation instant
///
/// The identity is derived when the snapshot is built and never changes
/// afterwards; the document is the unfiltered observed state.
#[derive(Debug, Clone, PartialEq)]
pub struct Snapshot {
    identity: ResourceIdentity,
    document: Mapping,
}

impl Snapshot {
    /// Normalize a document into a snapshot
    ///
    /// # Errors
    ///
    /// `MalformedSnapshot` if the root is not a mapping, `MissingField` if an
    /// identity-bearing field is unusable.
    pub fn from_document(document: Document) -> Result<Self> {
        let identity = ResourceIdentity::from_document(&document)?;
        match document {
            Document::Mapping(document) => Ok(Self { identity, document }),
            other => Err(YadtError::MalformedSnapshot {
                reason: format!("snapshot root must be a mapping, got {}", other.kind().as_str()),
            }),
        }
    }

    /// Normalize a JSON value into a snapshot
    ///
    /// # Errors
    ///
    /// See [`Snapshot::from_document`].
    pub fn from_json(value: serde_json::Value) -> Result<Self> {
        Self::from_document(Document::from(value))
    }

    /// Parse and normalize raw JSON bytes
    ///
    /// # Errors
    ///
    /// `InvalidJson` if the bytes are not valid JSON, otherwise as
    /// [`Snapshot::from_document`].
    pub fn from_slice(bytes: &[u8]) -> Result<Self> {
        let value: serde_json::Value = serde_json::from_slice(bytes)?;
        Self::from_json(value)
    }

    pub fn identity(&self) -> &ResourceIdentity {
        &self.identity
    }

    pub fn document(&self) -> &Mapping {
        &self.document
    }

    /// A top-level section such as `spec`
    pub fn section(&self, name: &str) -> Option<&Document> {
        self.document.get(name)
    }

    /// Working copy holding only the recognized sections present in this
    /// snapshot. The snapshot itself is left untouched.
    pub fn restrict<S: AsRef<str>>(&self, sections: &[S]) -> Mapping {
        sections
            .iter()
            .filter_map(|name| {
                let name = name.as_ref();
                self.document
                    .get(name)
                    .map(|value| (name.to_string(), value.clone()))
            })
            .collect()
    }
}
