pub mod document;
pub mod identity;
pub mod snapshot;

pub use document::{Document, DocumentKind, Mapping, Scalar};
pub use identity::ResourceIdentity;
pub use snapshot::{Snapshot, DEFAULT_SECTIONS};
