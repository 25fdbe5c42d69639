//! Stateful structural diffing of resource snapshots.
//!
//! Feed full-state snapshots of resources to a [`DiffEngine`]; it keeps the
//! last snapshot per identity and writes a human-readable diff for each
//! observation that changed the recognized sections.

pub mod cache;
pub mod diff;
pub mod engine;
pub mod errors;
pub mod filter;
pub mod logging_facility;
pub mod model;
pub mod render;

pub use yadt_core_types as core_types;

pub use cache::SnapshotCache;
pub use engine::{ChangeEvent, ChangeKind, DiffEngine, DiffOptions, Outcome};
pub use errors::{ExError, ExErrorKind, YadtError};
pub use filter::FieldFilter;
pub use model::{Document, Mapping, ResourceIdentity, Snapshot};
pub use render::{ChangeStyle, DiffRenderer, RenderOptions};
