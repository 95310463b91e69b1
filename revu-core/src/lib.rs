//! Revu Core - Review document model and deterministic XML serialization
//!
//! This crate holds the in-memory model for code reviews (metadata, history,
//! referential data, file scope, issues), a repository acting as an identity
//! map over reviews, and the XML layer: a deterministic serializer and a
//! two-pass (prepare/resolve) deserializer that handles forward `extends`
//! references between reviews.

pub mod config;
pub mod error;
pub mod model;
pub mod repository;
pub mod xml;

pub use config::Config;
pub use error::{Error, Result};
pub use model::{
    parse_shared_flag, FileScope, HistoryRecord, Issue, IssueType, Priority, Referential, Review,
    ReviewState, ReviewStatus, SharedReview, User,
};
pub use repository::ReviewRepository;
pub use xml::{deserialize, load_batch, prepare, resolve, serialize, BatchOutcome, Pass};
