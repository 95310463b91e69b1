//! File scope: which files a review applies to

use serde::Serialize;

/// Scope expression restricting a review to a subset of files
///
/// All fields are optional; an empty scope means the review covers
/// everything.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct FileScope {
    /// Ant-style path pattern, e.g. `src/**/*.rs`
    pub path_pattern: Option<String>,
    /// Only files changed after this VCS revision
    pub vcs_after_rev: Option<String>,
    /// Only files changed before this VCS revision
    pub vcs_before_rev: Option<String>,
}
