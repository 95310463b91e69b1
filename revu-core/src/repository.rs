//! Review repository: an identity map over reviews keyed by name
//!
//! The repository is explicit process-scoped state (created empty, cleared on
//! teardown) and is passed into the XML layer rather than living behind a
//! singleton. During loading it hands out the same handle for a given name to
//! everyone, which is what turns stub registration plus in-place resolution
//! into real object identity for `extends` links.

use std::collections::HashMap;

use crate::model::{Review, SharedReview};

/// All known reviews, keyed by their unique case-sensitive name
#[derive(Debug, Default)]
pub struct ReviewRepository {
    reviews: HashMap<String, SharedReview>,
}

impl ReviewRepository {
    /// Create an empty repository
    pub fn new() -> Self {
        Self::default()
    }

    /// Look up a review by name
    pub fn lookup_by_name(&self, name: &str) -> Option<SharedReview> {
        self.reviews.get(name).cloned()
    }

    /// Register a stub for the prepare pass, reusing any existing entry
    ///
    /// Reuse is what makes this an identity map: if the name was already
    /// registered (stub or resolved), the existing handle is returned
    /// untouched.
    pub fn register_stub(&mut self, name: &str) -> SharedReview {
        self.reviews
            .entry(name.to_string())
            .or_insert_with(|| Review::stub(name).into_shared())
            .clone()
    }

    /// Register a fully resolved review, overwriting any entry for its name
    pub fn register_resolved(&mut self, review: &SharedReview) {
        let name = review.borrow().name.clone();
        self.reviews.insert(name, review.clone());
    }

    /// Remove a review, returning its handle if it was present
    pub fn remove(&mut self, name: &str) -> Option<SharedReview> {
        self.reviews.remove(name)
    }

    /// Drop every review
    pub fn clear(&mut self) {
        self.reviews.clear();
    }

    /// All registered names, sorted
    pub fn names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.reviews.keys().cloned().collect();
        names.sort();
        names
    }

    pub fn len(&self) -> usize {
        self.reviews.len()
    }

    pub fn is_empty(&self) -> bool {
        self.reviews.is_empty()
    }
}
