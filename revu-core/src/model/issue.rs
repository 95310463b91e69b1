//! Issues recorded against files in a review

use serde::Serialize;

/// A single finding attached to a file within a review
///
/// `file_path` is optional: review-wide issues carry no file and sort before
/// all file-bound issues when serialized.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Issue {
    pub file_path: Option<String>,
    pub line_start: Option<u32>,
    pub line_end: Option<u32>,
    /// Login of the reporting user
    pub author: Option<String>,
    /// Name of a priority from the review's referential
    pub priority: Option<String>,
    /// Name of an issue type from the review's referential
    pub issue_type: Option<String>,
    pub summary: String,
    /// Longer description, stored as the issue element's text content
    pub desc: Option<String>,
}

impl Issue {
    pub fn new(summary: impl Into<String>) -> Self {
        Self {
            file_path: None,
            line_start: None,
            line_end: None,
            author: None,
            priority: None,
            issue_type: None,
            summary: summary.into(),
            desc: None,
        }
    }

    pub fn with_file(mut self, path: impl Into<String>) -> Self {
        self.file_path = Some(path.into());
        self
    }

    pub fn with_lines(mut self, start: u32, end: u32) -> Self {
        self.line_start = Some(start);
        self.line_end = Some(end);
        self
    }

    pub fn with_author(mut self, login: impl Into<String>) -> Self {
        self.author = Some(login.into());
        self
    }

    pub fn with_priority(mut self, name: impl Into<String>) -> Self {
        self.priority = Some(name.into());
        self
    }

    pub fn with_type(mut self, name: impl Into<String>) -> Self {
        self.issue_type = Some(name.into());
        self
    }

    pub fn with_desc(mut self, desc: impl Into<String>) -> Self {
        self.desc = Some(desc.into());
        self
    }
}
