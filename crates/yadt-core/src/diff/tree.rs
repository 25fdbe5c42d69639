//! Recursive tree diff.

use crate::diff::model::{DiffNode, Path};
use crate::model::{Document, Mapping};

/// Diff two optional documents rooted at `path`.
///
/// | old     | new     | output                                   |
/// |---------|---------|------------------------------------------|
/// | absent  | absent  | nothing                                  |
/// | absent  | present | one `Added(new)`, no recursion           |
/// | present | absent  | one `Removed(old)`, no recursion         |
/// | mapping | mapping | recurse per key, keys sorted             |
/// | seq     | seq     | recurse per index `0..max(len)`          |
/// | equal scalars     || nothing                                  |
/// | anything else     || one `Replaced { old, new }`              |
pub fn diff(old: Option<&Document>, new: Option<&Document>, path: &Path) -> Vec<DiffNode> {
    let mut out = Vec::new();
    diff_into(old, new, path, &mut out);
    out
}

/// Diff two mappings from the root path
pub fn diff_mappings(old: &Mapping, new: &Mapping) -> Vec<DiffNode> {
    let mut out = Vec::new();
    diff_mapping_into(old, new, &Path::root(), &mut out);
    out
}

fn diff_into(old: Option<&Document>, new: Option<&Document>, path: &Path, out: &mut Vec<DiffNode>) {
    match (old, new) {
        (None, None) => {}
        (None, Some(new)) => out.push(DiffNode::added(path.clone(), new.clone())),
        (Some(old), None) => out.push(DiffNode::removed(path.clone(), old.clone())),
        (Some(Document::Mapping(old)), Some(Document::Mapping(new))) => {
            diff_mapping_into(old, new, path, out)
        }
        (Some(Document::Sequence(old)), Some(Document::Sequence(new))) => {
            diff_sequence_into(old, new, path, out)
        }
        (Some(Document::Scalar(a)), Some(Document::Scalar(b))) if a == b => {}
        (Some(old), Some(new)) => {
            out.push(DiffNode::replaced(path.clone(), old.clone(), new.clone()))
        }
    }
}

fn diff_mapping_into(old: &Mapping, new: &Mapping, path: &Path, out: &mut Vec<DiffNode>) {
    // Union of keys, sorted: mapping iteration order is undefined.
    let mut keys: Vec<&str> = old.sorted_keys();
    keys.extend(new.sorted_keys());
    keys.sort_unstable();
    keys.dedup();

    for key in keys {
        diff_into(old.get(key), new.get(key), &path.key(key), out);
    }
}

fn diff_sequence_into(old: &[Document], new: &[Document], path: &Path, out: &mut Vec<DiffNode>) {
    let len = old.len().max(new.len());
    for i in 0..len {
        diff_into(old.get(i), new.get(i), &path.index(i), out);
    }
}

/// Deep structural equality of two working copies
pub fn mappings_equal(old: &Mapping, new: &Mapping) -> bool {
    old == new
}
