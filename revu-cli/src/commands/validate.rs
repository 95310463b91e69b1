//! Validate command - batch-load review files and report per-file results

use std::fs;
use std::path::PathBuf;

use clap::Args;
use revu_core::{load_batch, Config, ReviewRepository};

/// Validate review XML files
#[derive(Args, Debug)]
pub struct ValidateArgs {
    /// Review XML files to validate; defaults to *.xml in the reviews
    /// directory
    files: Vec<PathBuf>,
}

impl ValidateArgs {
    /// Execute the validate command
    pub fn execute(&self, config: &Config) -> anyhow::Result<()> {
        let files = if self.files.is_empty() {
            discover_review_files(config)?
        } else {
            self.files.clone()
        };

        if files.is_empty() {
            println!("No review files to validate.");
            return Ok(());
        }

        let mut documents = Vec::new();
        for path in &files {
            let xml = fs::read_to_string(path)
                .map_err(|e| anyhow::anyhow!("failed to read {}: {}", path.display(), e))?;
            documents.push((path.display().to_string(), xml));
        }

        let mut repo = ReviewRepository::new();
        let outcome = load_batch(&documents, &mut repo);

        for review in &outcome.loaded {
            let review = review.borrow();
            println!("ok: {} ({} issues)", review.name, review.issues.len());
        }
        for failure in &outcome.failures {
            eprintln!("error: {}: {}", failure.source, failure.error);
        }

        if !outcome.is_success() {
            anyhow::bail!(
                "{} of {} review files failed validation",
                outcome.failures.len(),
                documents.len()
            );
        }

        println!("{} review files valid.", outcome.loaded.len());
        Ok(())
    }
}

/// List *.xml files in the configured reviews directory, sorted by path
fn discover_review_files(config: &Config) -> anyhow::Result<Vec<PathBuf>> {
    let Some(dir) = &config.reviews_dir else {
        anyhow::bail!("no files given and no reviews directory configured");
    };

    let mut files: Vec<PathBuf> = fs::read_dir(dir)
        .map_err(|e| anyhow::anyhow!("failed to read {}: {}", dir.display(), e))?
        .filter_map(|entry| entry.ok())
        .map(|entry| entry.path())
        .filter(|path| path.extension().is_some_and(|ext| ext == "xml"))
        .collect();
    files.sort();
    Ok(files)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn write_review(dir: &std::path::Path, file: &str, name: &str, extends: Option<&str>) {
        let extends = extends
            .map(|e| format!(r#" extends="{e}""#))
            .unwrap_or_default();
        let mut f = fs::File::create(dir.join(file)).unwrap();
        write!(
            f,
            r#"<review name="{name}" status="draft" shared="false"{extends}/>"#
        )
        .unwrap();
    }

    #[test]
    fn test_validate_explicit_files() {
        let dir = tempfile::tempdir().unwrap();
        write_review(dir.path(), "a.xml", "A", None);
        write_review(dir.path(), "b.xml", "B", Some("A"));

        let args = ValidateArgs {
            files: vec![dir.path().join("b.xml"), dir.path().join("a.xml")],
        };
        assert!(args.execute(&Config::default()).is_ok());
    }

    #[test]
    fn test_validate_fails_on_bad_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bad.xml");
        fs::write(&path, r#"<review name="Bad" status="bogus" shared="false"/>"#).unwrap();

        let args = ValidateArgs { files: vec![path] };
        assert!(args.execute(&Config::default()).is_err());
    }

    #[test]
    fn test_discover_uses_configured_directory() {
        let dir = tempfile::tempdir().unwrap();
        write_review(dir.path(), "one.xml", "One", None);
        write_review(dir.path(), "two.xml", "Two", None);
        fs::write(dir.path().join("notes.txt"), "not xml").unwrap();

        let config = Config {
            reviews_dir: Some(dir.path().to_path_buf()),
        };
        let files = discover_review_files(&config).unwrap();
        assert_eq!(files.len(), 2);
        assert!(files[0] < files[1]);
    }

    #[test]
    fn test_discover_without_directory_is_an_error() {
        assert!(discover_review_files(&Config::default()).is_err());
    }
}
