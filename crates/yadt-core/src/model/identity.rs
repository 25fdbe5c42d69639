use std::fmt;

use crate::errors::{Result, YadtError};
use crate::model::document::Document;

/// Stable identity of one logical resource
///
/// Derived once from a snapshot and used as the cache key. Two snapshots of
/// the same object at different points in time yield equal identities.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ResourceIdentity {
    pub group: String,
    pub version: String,
    pub kind: String,
    /// Empty for cluster-scoped resources
    pub namespace: String,
    pub name: String,
}

impl ResourceIdentity {
    pub fn new(
        group: impl Into<String>,
        version: impl Into<String>,
        kind: impl Into<String>,
        namespace: impl Into<String>,
        name: impl Into<String>,
    ) -> Self {
        Self {
            group: group.into(),
            version: version.into(),
            kind: kind.into(),
            namespace: namespace.into(),
            name: name.into(),
        }
    }

    /// Derive the identity from a snapshot's `apiVersion`, `kind` and
    /// `metadata.{name,namespace}`.
    ///
    /// # Errors
    ///
    /// Returns `MissingField` if `apiVersion`, `kind` or `metadata.name` is
    /// absent or not a string, and `MalformedSnapshot` if the document is
    /// not a mapping.
    pub fn from_document(doc: &Document) -> Result<Self> {
        if doc.as_mapping().is_none() {
            return Err(YadtError::MalformedSnapshot {
                reason: format!("snapshot root must be a mapping, got {}", doc.kind().as_str()),
            });
        }

        let api_version = required_str(doc, "apiVersion")?;
        let kind = required_str(doc, "kind")?;
        let metadata = doc.get("metadata").ok_or_else(|| YadtError::MissingField {
            field: "metadata".to_string(),
        })?;
        let name = metadata
            .get_str("name")
            .ok_or_else(|| YadtError::MissingField {
                field: "metadata.name".to_string(),
            })?;
        let namespace = metadata.get_str("namespace").unwrap_or_default();

        let (group, version) = split_api_version(api_version);
        Ok(Self::new(group, version, kind, namespace, name))
    }

    /// Resource label used in diff headers: `deployment.apps`, `pod`
    pub fn header_resource(&self) -> String {
        let kind = self.kind.to_lowercase();
        if self.group.is_empty() {
            kind
        } else {
            format!("{}.{}", kind, self.group)
        }
    }

    /// `namespace/name`, or just `name` for cluster-scoped resources
    pub fn qualified_name(&self) -> String {
        if self.namespace.is_empty() {
            self.name.clone()
        } else {
            format!("{}/{}", self.namespace, self.name)
        }
    }
}

impl fmt::Display for ResourceIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}/{}/{}/{}/{}",
            self.group, self.version, self.kind, self.namespace, self.name
        )
    }
}

fn required_str<'a>(doc: &'a Document, field: &str) -> Result<&'a str> {
    doc.get_str(field)
        .filter(|s| !s.is_empty())
        .ok_or_else(|| YadtError::MissingField {
            field: field.to_string(),
        })
}

/// `apps/v1` → (`apps`, `v1`); `v1` → (``, `v1`)
fn split_api_version(api_version: &str) -> (&str, &str) {
    match api_version.split_once('/') {
        Some((group, version)) => (group, version),
        None => ("", api_version),
    }
}
