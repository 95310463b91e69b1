//! Review change history

use chrono::{DateTime, Utc};
use serde::Serialize;

/// One change record in a review's history
///
/// Records keep their document order; the sequence is attached 1:1 to a
/// review.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HistoryRecord {
    /// Login of the user who made the change
    pub author: String,
    /// When the change happened (serialized as RFC 3339, UTC)
    pub timestamp: DateTime<Utc>,
    /// Optional free-form note
    pub summary: Option<String>,
}

impl HistoryRecord {
    pub fn new(author: impl Into<String>, timestamp: DateTime<Utc>) -> Self {
        Self {
            author: author.into(),
            timestamp,
            summary: None,
        }
    }

    pub fn with_summary(mut self, summary: impl Into<String>) -> Self {
        self.summary = Some(summary.into());
        self
    }
}
