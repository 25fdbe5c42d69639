//! Field normalization applied to working copies before comparison.

use serde::{Deserialize, Serialize};

use crate::model::{Document, Mapping};

/// Metadata fields kept when `ignore_meta` is set
pub const IDENTITY_META_FIELDS: &[&str] = &["name", "namespace"];

/// Optional removal/truncation of top-level subtrees
///
/// Operates on working copies only; cached snapshots are never filtered.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FieldFilter {
    /// Drop the `status` section
    pub ignore_status: bool,
    /// Reduce `metadata` to its identity-bearing fields
    pub ignore_meta: bool,
}

impl FieldFilter {
    pub fn new(ignore_status: bool, ignore_meta: bool) -> Self {
        Self {
            ignore_status,
            ignore_meta,
        }
    }

    /// True when applying the filter cannot change anything
    pub fn is_noop(&self) -> bool {
        !self.ignore_status && !self.ignore_meta
    }

    /// Filter one working copy in place
    pub fn apply(&self, working: &mut Mapping) {
        if self.ignore_status {
            working.remove("status");
        }

        if self.ignore_meta {
            // Non-mapping metadata carries nothing to truncate.
            if let Some(Document::Mapping(meta)) = working.get_mut("metadata") {
                meta.retain_keys(|key| IDENTITY_META_FIELDS.contains(&key));
            }
        }
    }

    /// Filter the old/new pair of working copies
    pub fn apply_pair(&self, old: &mut Mapping, new: &mut Mapping) {
        self.apply(old);
        self.apply(new);
    }
}
