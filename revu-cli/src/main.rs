//! Revu CLI - Command line interface for review XML files
//!
//! Validates, canonicalizes, and summarizes review documents stored on disk.

mod commands;

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use revu_core::Config;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use commands::{FmtArgs, InspectArgs, ValidateArgs};

/// Revu: review document tooling
#[derive(Parser, Debug)]
#[command(name = "revu")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Directory holding review XML files (overrides config file)
    #[arg(long, global = true, env = "REVU_REVIEWS_DIR")]
    reviews_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Validate review XML files
    #[command(visible_alias = "check")]
    Validate(ValidateArgs),

    /// Rewrite a review file in canonical form
    Fmt(FmtArgs),

    /// Summarize a review file
    Inspect(InspectArgs),

    /// Show current configuration
    Config,
}

fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();

    if cli.verbose {
        tracing::info!("Verbose mode enabled");
    }

    let config = Config::load_with_overrides(cli.reviews_dir.clone())?;

    match cli.command {
        Commands::Validate(args) => args.execute(&config),
        Commands::Fmt(args) => args.execute(),
        Commands::Inspect(args) => args.execute(),
        Commands::Config => {
            match &config.reviews_dir {
                Some(dir) => println!("reviews_dir = {}", dir.display()),
                None => println!("reviews_dir = (unset)"),
            }
            if let Some(path) = Config::default_config_path() {
                println!("config file = {}", path.display());
            }
            Ok(())
        }
    }
}
