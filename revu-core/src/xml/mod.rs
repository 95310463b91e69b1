//! XML layer: deterministic serialization and two-pass deserialization
//!
//! The wire format is the revu 1.0 schema: a `<review>` root with `name`,
//! `status`, `shared`, and optional `extends` attributes, followed by
//! `history`, `goal`, `referential`, `filescope`, and `issues` children in
//! that order.

pub mod batch;
pub mod deserialize;
pub mod serialize;

pub use batch::{load_batch, BatchFailure, BatchOutcome};
pub use deserialize::{deserialize, prepare, resolve, Pass};
pub use serialize::{file_path_order, serialize};

/// Namespace of the review schema
pub const REVU_SCHEMA_ID: &str = "http://plugins.intellij.net/revu";
/// Schema location advertised on serialized documents
pub const REVU_SCHEMA_LOCATION: &str = "http://plugins.intellij.net/revu/ns/revu_1_0.xsd";
/// XML Schema instance namespace (for `xsi:schemaLocation`)
pub const XSI_NAMESPACE: &str = "http://www.w3.org/2001/XMLSchema-instance";

/// The child elements a `<review>` may carry
///
/// The deserializer dispatches on this enum instead of chaining name
/// comparisons, keeping the supported set explicit. Names that map to no
/// variant are skipped whole for forward compatibility.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReviewChild {
    History,
    Goal,
    Referential,
    FileScope,
    Issues,
}

impl ReviewChild {
    /// Map an element name to its handler variant
    pub fn from_name(name: &[u8]) -> Option<Self> {
        match name {
            b"history" => Some(ReviewChild::History),
            b"goal" => Some(ReviewChild::Goal),
            b"referential" => Some(ReviewChild::Referential),
            b"filescope" => Some(ReviewChild::FileScope),
            b"issues" => Some(ReviewChild::Issues),
            _ => None,
        }
    }
}
