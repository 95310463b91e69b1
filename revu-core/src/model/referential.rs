//! Referential data: the users, priorities, and issue types a review's
//! issues may reference

use serde::Serialize;

/// A participant in the review
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct User {
    pub login: String,
    pub display_name: Option<String>,
}

impl User {
    pub fn new(login: impl Into<String>) -> Self {
        Self {
            login: login.into(),
            display_name: None,
        }
    }

    pub fn with_display_name(mut self, name: impl Into<String>) -> Self {
        self.display_name = Some(name.into());
        self
    }
}

/// An issue priority with its ordering rank (lower rank sorts first)
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Priority {
    pub name: String,
    pub order: u32,
}

impl Priority {
    pub fn new(name: impl Into<String>, order: u32) -> Self {
        Self {
            name: name.into(),
            order,
        }
    }
}

/// A named issue type (defect, improvement, question, ...)
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct IssueType {
    pub name: String,
}

impl IssueType {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }
}

/// Reference data attached to a review
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Referential {
    pub users: Vec<User>,
    pub priorities: Vec<Priority>,
    pub types: Vec<IssueType>,
}

impl Referential {
    pub fn is_empty(&self) -> bool {
        self.users.is_empty() && self.priorities.is_empty() && self.types.is_empty()
    }
}
