//! Structural tree diff.
//!
//! Compares two document trees and produces an ordered list of
//! [`DiffNode`]s: additions, removals and replacements at every path where
//! the trees disagree.
//!
//! ## Entry point
//!
//! ```ignore
//! use yadt_core::diff::{diff, Path};
//!
//! let nodes = diff(Some(&old), Some(&new), &Path::root());
//! ```
//!
//! ## Guarantees
//!
//! - **Determinism**: mapping keys are visited in lexicographic order, so
//!   output never depends on how the input mappings were built.
//! - **Positional sequences**: sequence elements are aligned by index only.
//!   Inserting at the front of a list reports every later index as
//!   replaced. There is no edit-distance alignment.
//! - **No partial shape diffs**: a value whose kind changed is reported as
//!   one replacement, never diffed field by field.

pub mod model;
pub mod tree;

pub use model::{Change, DiffNode, Path, PathSegment};
pub use tree::{diff, diff_mappings, mappings_equal};
