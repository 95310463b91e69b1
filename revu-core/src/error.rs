//! Error types for the revu core

use thiserror::Error;

/// Result type alias for revu operations
pub type Result<T> = std::result::Result<T, Error>;

/// Error type for revu operations
#[derive(Error, Debug)]
pub enum Error {
    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Malformed XML
    #[error("XML error: {0}")]
    Xml(#[from] quick_xml::Error),

    /// Malformed XML attribute syntax
    #[error("XML attribute error: {0}")]
    XmlAttr(#[from] quick_xml::events::attributes::AttrError),

    /// Document has no root element
    #[error("document has no root element")]
    MissingRoot,

    /// Root element is not `review`
    #[error("unexpected root element `{0}`, expected `review`")]
    UnexpectedRoot(String),

    /// A required attribute is absent
    #[error("element `{element}` is missing required attribute `{attribute}`")]
    MissingAttribute {
        element: &'static str,
        attribute: &'static str,
    },

    /// A status value outside the allowed set
    #[error("invalid review status `{0}`")]
    InvalidStatus(String),

    /// An attribute value that failed to parse (numbers, timestamps)
    #[error("malformed value `{value}` for attribute `{attribute}`")]
    MalformedAttribute {
        attribute: &'static str,
        value: String,
    },

    /// An `extends` name that is not registered at resolve time
    #[error("extended review `{0}` not found; prepare all reviews before resolving")]
    UnresolvedReference(String),

    /// A cycle in the extends chain
    #[error("cycle in extends chain: {0}")]
    ExtendsCycle(String),

    /// Configuration error
    #[error("configuration error: {0}")]
    Config(String),
}
