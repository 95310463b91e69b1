//! In-memory review document model
//!
//! Plain data holders for reviews and their nested structures. Behavior is
//! limited to status/shared parsing; everything else lives in the XML layer.

pub mod history;
pub mod issue;
pub mod referential;
pub mod review;
pub mod scope;

pub use history::HistoryRecord;
pub use issue::Issue;
pub use referential::{IssueType, Priority, Referential, User};
pub use review::{parse_shared_flag, Review, ReviewState, ReviewStatus, SharedReview};
pub use scope::FileScope;
