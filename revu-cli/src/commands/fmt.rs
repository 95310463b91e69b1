//! Fmt command - rewrite a review file in its canonical byte form

use std::fs;
use std::path::{Path, PathBuf};

use clap::Args;
use revu_core::{prepare, resolve, serialize, ReviewRepository, SharedReview};

/// Rewrite a review file in canonical form
#[derive(Args, Debug)]
pub struct FmtArgs {
    /// Review XML file to canonicalize
    file: PathBuf,

    /// Rewrite the file in place instead of printing to stdout
    #[arg(long)]
    write: bool,
}

impl FmtArgs {
    /// Execute the fmt command
    pub fn execute(&self) -> anyhow::Result<()> {
        let review = load_single(&self.file)?;
        let canonical = serialize(&review.borrow())?;

        if self.write {
            fs::write(&self.file, format!("{canonical}\n"))?;
            tracing::info!(file = %self.file.display(), "rewrote in canonical form");
        } else {
            println!("{canonical}");
        }
        Ok(())
    }
}

/// Load one review file outside a batch
///
/// Serializing only needs the extended review's name, so a standalone file
/// with `extends` is satisfied by registering a stub for the target.
pub fn load_single(path: &Path) -> anyhow::Result<SharedReview> {
    let xml = fs::read_to_string(path)
        .map_err(|e| anyhow::anyhow!("failed to read {}: {}", path.display(), e))?;

    let mut repo = ReviewRepository::new();
    let stub = prepare(&xml, &mut repo)?;
    let extends = stub.borrow().extends_name();
    if let Some(name) = extends {
        repo.register_stub(&name);
    }
    Ok(resolve(&xml, &mut repo)?)
}
