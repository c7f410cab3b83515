//! Ferry command-line inspector.
//!
//! Inspects local migration state: recorded jobs, identifier mappings, and
//! archived describe metadata. This binary never talks to a remote system;
//! remote operations run through the migrator library.

mod commands;

use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// Ferry migration state inspector
#[derive(Parser, Debug)]
#[command(name = "ferry")]
#[command(version, about = "Inspect ferry migration jobs, mappings, and classifications")]
pub struct Args {
    /// Path to the mapping store database
    #[arg(long, default_value = "ferry.db")]
    pub db: PathBuf,

    /// Base directory for staging artifacts
    #[arg(long, default_value = "data")]
    pub data_dir: PathBuf,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// List recorded migration jobs
    Jobs,

    /// Resolve one identifier mapping
    Resolve {
        /// Job identifier
        job: String,
        /// Object type name
        object: String,
        /// Source-system identifier
        source_id: String,
    },

    /// Classify one archived describe payload
    Classify {
        /// Path to a describe JSON archive
        describe: PathBuf,
    },

    /// Print the dependency-ordered migration plan from archived metadata
    Plan {
        /// Directory of describe archives (defaults to <data-dir>/describe)
        dir: Option<PathBuf>,
    },
}

fn main() {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("ferry_cli=info".parse().unwrap()),
        )
        .init();

    let args = Args::parse();

    if let Err(e) = run(args) {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

fn run(args: Args) -> Result<(), Box<dyn std::error::Error>> {
    match args.command {
        Command::Jobs => commands::jobs(&args.db),
        Command::Resolve {
            job,
            object,
            source_id,
        } => commands::resolve(&args.db, &job, &object, &source_id),
        Command::Classify { describe } => commands::classify_archive(&describe),
        Command::Plan { dir } => {
            let dir = dir.unwrap_or_else(|| {
                ferry_core::DataLayout::new(&args.data_dir).describe_dir()
            });
            commands::plan(&dir)
        }
    }
}
