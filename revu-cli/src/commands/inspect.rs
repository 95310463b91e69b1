//! Inspect command - summarize a review file

use std::path::PathBuf;

use clap::Args;
use revu_core::{Review, ReviewStatus};
use serde::Serialize;

use crate::commands::fmt::load_single;

/// Summarize a review file
#[derive(Args, Debug)]
pub struct InspectArgs {
    /// Review XML file to inspect
    file: PathBuf,

    /// Emit the summary as JSON
    #[arg(long)]
    json: bool,
}

/// Flat summary of a review for human or JSON output
#[derive(Debug, Serialize)]
struct ReviewSummary {
    name: String,
    status: ReviewStatus,
    shared: bool,
    goal: Option<String>,
    extends: Option<String>,
    history_entries: usize,
    users: usize,
    priorities: usize,
    types: usize,
    issues: usize,
}

impl From<&Review> for ReviewSummary {
    fn from(review: &Review) -> Self {
        Self {
            name: review.name.clone(),
            status: review.status,
            shared: review.shared,
            goal: review.goal.clone(),
            extends: review.extends_name(),
            history_entries: review.history.len(),
            users: review.referential.users.len(),
            priorities: review.referential.priorities.len(),
            types: review.referential.types.len(),
            issues: review.issues.len(),
        }
    }
}

impl InspectArgs {
    /// Execute the inspect command
    pub fn execute(&self) -> anyhow::Result<()> {
        let review = load_single(&self.file)?;
        let summary = ReviewSummary::from(&*review.borrow());

        if self.json {
            println!("{}", serde_json::to_string_pretty(&summary)?);
            return Ok(());
        }

        println!("Review: {}", summary.name);
        println!("  Status: {}", summary.status);
        println!("  Shared: {}", summary.shared);
        if let Some(extends) = &summary.extends {
            println!("  Extends: {}", extends);
        }
        if let Some(goal) = &summary.goal {
            println!("  Goal: {}", goal);
        }
        println!("  History entries: {}", summary.history_entries);
        println!(
            "  Referential: {} users, {} priorities, {} types",
            summary.users, summary.priorities, summary.types
        );
        println!("  Issues: {}", summary.issues);
        Ok(())
    }
}
