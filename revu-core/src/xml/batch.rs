//! Batch loading of review documents
//!
//! Codifies the caller-ordering contract of the two-pass protocol: every
//! document is prepared before any document is resolved, so resolve-time
//! `extends` lookups always see a fully stub-populated repository. One bad
//! review never aborts its siblings.

use crate::error::Error;
use crate::model::SharedReview;
use crate::repository::ReviewRepository;
use crate::xml::deserialize::{prepare, resolve};

/// A review that failed to load, with the source it came from
#[derive(Debug)]
pub struct BatchFailure {
    /// Caller-supplied identifier for the document, e.g. a file path
    pub source: String,
    pub error: Error,
}

/// Result of loading a batch of review documents
#[derive(Debug, Default)]
pub struct BatchOutcome {
    pub loaded: Vec<SharedReview>,
    pub failures: Vec<BatchFailure>,
}

impl BatchOutcome {
    pub fn is_success(&self) -> bool {
        self.failures.is_empty()
    }
}

/// Load a batch of `(source, xml)` documents into the repository
///
/// A review that fails either pass is reported in `failures` and removed
/// from the repository, so later lookups cannot hand out a half-resolved
/// object. Reviews whose extends chains form a cycle all fail, along with
/// any review whose chain leads into one.
pub fn load_batch(documents: &[(String, String)], repo: &mut ReviewRepository) -> BatchOutcome {
    let mut failures = Vec::new();

    let mut prepared: Vec<Option<String>> = Vec::with_capacity(documents.len());
    for (source, xml) in documents {
        match prepare(xml, repo) {
            Ok(review) => prepared.push(Some(review.borrow().name.clone())),
            Err(error) => {
                failures.push(BatchFailure {
                    source: source.clone(),
                    error,
                });
                prepared.push(None);
            }
        }
    }

    // Between the passes, fail every review whose extends chain revisits a
    // name. Resolve-time checks only catch whichever member of a cycle
    // resolves last; walking the intact stub graph here catches them all.
    let mut cyclic = Vec::new();
    for (index, name) in prepared.iter().enumerate() {
        let Some(name) = name else { continue };
        if let Some(chain) = find_extends_cycle(repo, name) {
            cyclic.push((index, chain));
        }
    }
    for (index, chain) in cyclic {
        if let Some(name) = prepared[index].take() {
            repo.remove(&name);
            failures.push(BatchFailure {
                source: documents[index].0.clone(),
                error: Error::ExtendsCycle(chain),
            });
        }
    }

    let mut loaded = Vec::new();
    for ((source, xml), name) in documents.iter().zip(prepared) {
        let Some(name) = name else { continue };
        match resolve(xml, repo) {
            Ok(review) => loaded.push(review),
            Err(error) => {
                repo.remove(&name);
                failures.push(BatchFailure {
                    source: source.clone(),
                    error,
                });
            }
        }
    }

    tracing::info!(
        loaded = loaded.len(),
        failed = failures.len(),
        "review batch loaded"
    );
    BatchOutcome { loaded, failures }
}

/// Walk the extends chain from `start` by name, reporting a repeat
///
/// Stubs already carry their target's name after the prepare pass, so the
/// walk needs no resolved reviews. The visited set bounds it to one lap.
fn find_extends_cycle(repo: &ReviewRepository, start: &str) -> Option<String> {
    let mut seen = vec![start.to_string()];
    let mut current = extends_of(repo, start);
    while let Some(name) = current {
        if seen.contains(&name) {
            seen.push(name);
            return Some(seen.join(" -> "));
        }
        current = extends_of(repo, &name);
        seen.push(name);
    }
    None
}

fn extends_of(repo: &ReviewRepository, name: &str) -> Option<String> {
    repo.lookup_by_name(name)
        .and_then(|review| review.borrow().extends_name())
}
