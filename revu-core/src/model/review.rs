//! The review itself: identity, metadata, and nested collections

use std::cell::RefCell;
use std::rc::Rc;

use serde::Serialize;

use crate::error::{Error, Result};
use crate::model::{FileScope, HistoryRecord, Issue, Referential};

/// Shared handle to a review.
///
/// Reviews are held behind `Rc<RefCell<_>>` so that the repository acts as an
/// identity map: a stub registered during the prepare pass and the resolved
/// review after the resolve pass are the same allocation, which is what makes
/// `extends` links point at the real review rather than a copy. The core is
/// single-threaded by contract, so no locking is involved.
pub type SharedReview = Rc<RefCell<Review>>;

/// Workflow status of a review
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ReviewStatus {
    Draft,
    Fixing,
    Reviewing,
    Fixed,
    Closed,
}

impl ReviewStatus {
    /// Parse a status value, case-insensitively.
    ///
    /// Values outside the allowed set are a fatal parse error for the
    /// containing review.
    pub fn parse(value: &str) -> Result<Self> {
        match value.to_ascii_lowercase().as_str() {
            "draft" => Ok(ReviewStatus::Draft),
            "fixing" => Ok(ReviewStatus::Fixing),
            "reviewing" => Ok(ReviewStatus::Reviewing),
            "fixed" => Ok(ReviewStatus::Fixed),
            "closed" => Ok(ReviewStatus::Closed),
            _ => Err(Error::InvalidStatus(value.to_string())),
        }
    }

    /// Lower-case wire form of the status
    pub fn as_str(&self) -> &'static str {
        match self {
            ReviewStatus::Draft => "draft",
            ReviewStatus::Fixing => "fixing",
            ReviewStatus::Reviewing => "reviewing",
            ReviewStatus::Fixed => "fixed",
            ReviewStatus::Closed => "closed",
        }
    }
}

impl std::fmt::Display for ReviewStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Parse the `shared` flag.
///
/// Only the literal string `"true"` counts as true; any other value,
/// including `"maybe"` or an empty string, is false. Existing documents rely
/// on this leniency, so it must not become stricter.
pub fn parse_shared_flag(value: &str) -> bool {
    value == "true"
}

/// Lifecycle state of a review during loading
///
/// A review moves `Stub` → `Resolved` across the two deserialization passes.
/// Stubs must not escape the loading subsystem except as extends
/// placeholders.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReviewState {
    /// Skeleton created by the prepare pass; only the name is meaningful
    Stub,
    /// Fully populated review
    Resolved,
}

/// A named code review: metadata, history, referential data, file scope,
/// and issues.
///
/// Names are case-sensitive and unique within a repository. Issues carry
/// their owning file path; grouping by file happens at serialization time.
#[derive(Debug, Clone)]
pub struct Review {
    pub name: String,
    pub status: ReviewStatus,
    pub shared: bool,
    pub goal: Option<String>,
    /// Single-parent inheritance link; the chain must stay acyclic
    pub extended_review: Option<SharedReview>,
    pub history: Vec<HistoryRecord>,
    pub referential: Referential,
    pub file_scope: FileScope,
    pub issues: Vec<Issue>,
    state: ReviewState,
}

impl Review {
    /// Create a fresh, user-authored review
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            status: ReviewStatus::Draft,
            shared: false,
            goal: None,
            extended_review: None,
            history: Vec::new(),
            referential: Referential::default(),
            file_scope: FileScope::default(),
            issues: Vec::new(),
            state: ReviewState::Resolved,
        }
    }

    /// Create a skeletal review for the prepare pass
    pub fn stub(name: impl Into<String>) -> Self {
        let mut review = Self::new(name);
        review.state = ReviewState::Stub;
        review
    }

    /// Wrap a review into a shared handle
    pub fn into_shared(self) -> SharedReview {
        Rc::new(RefCell::new(self))
    }

    pub fn state(&self) -> ReviewState {
        self.state
    }

    pub fn is_stub(&self) -> bool {
        self.state == ReviewState::Stub
    }

    /// Mark the review as fully populated
    pub fn mark_resolved(&mut self) {
        self.state = ReviewState::Resolved;
    }

    /// Name of the extended review, if any
    pub fn extends_name(&self) -> Option<String> {
        self.extended_review
            .as_ref()
            .map(|r| r.borrow().name.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_parse_case_insensitive() {
        assert_eq!(ReviewStatus::parse("DRAFT").unwrap(), ReviewStatus::Draft);
        assert_eq!(
            ReviewStatus::parse("Reviewing").unwrap(),
            ReviewStatus::Reviewing
        );
        assert_eq!(ReviewStatus::parse("closed").unwrap(), ReviewStatus::Closed);
    }

    #[test]
    fn test_status_parse_rejects_unknown() {
        let err = ReviewStatus::parse("archived").unwrap_err();
        assert!(matches!(err, Error::InvalidStatus(v) if v == "archived"));
    }

    #[test]
    fn test_status_wire_form_is_lowercase() {
        assert_eq!(ReviewStatus::Fixing.as_str(), "fixing");
        assert_eq!(ReviewStatus::Fixed.to_string(), "fixed");
    }

    #[test]
    fn test_shared_flag_leniency() {
        assert!(parse_shared_flag("true"));
        assert!(!parse_shared_flag("false"));
        assert!(!parse_shared_flag("maybe"));
        assert!(!parse_shared_flag("TRUE"));
        assert!(!parse_shared_flag(""));
    }

    #[test]
    fn test_new_review_is_resolved() {
        let review = Review::new("Sprint 12");
        assert_eq!(review.state(), ReviewState::Resolved);
        assert!(!review.is_stub());
        assert_eq!(review.status, ReviewStatus::Draft);
        assert!(!review.shared);
    }

    #[test]
    fn test_stub_lifecycle() {
        let mut review = Review::stub("Template");
        assert!(review.is_stub());
        review.mark_resolved();
        assert_eq!(review.state(), ReviewState::Resolved);
    }

    #[test]
    fn test_extends_name() {
        let parent = Review::new("Parent").into_shared();
        let mut child = Review::new("Child");
        assert_eq!(child.extends_name(), None);
        child.extended_review = Some(parent);
        assert_eq!(child.extends_name(), Some("Parent".to_string()));
    }
}
