use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// Enable verbose logging
    #[arg(short, long)]
    pub verbose: bool,

    /// Configuration file path
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Convert every subtitle in the movie and series libraries
    Convert {
        /// Movies root directory (overrides config)
        #[arg(long)]
        movies: Option<PathBuf>,

        /// Series root directory (overrides config)
        #[arg(long)]
        series: Option<PathBuf>,

        /// Target convention: plain or media-server
        #[arg(short, long, conflicts_with = "legacy_code")]
        to: Option<String>,

        /// Numeric convention selector from older settings (0 = media-server, 1 = plain)
        #[arg(long)]
        legacy_code: Option<i64>,

        /// Only print the renames that would happen
        #[arg(long)]
        dry_run: bool,

        /// Print the result as JSON
        #[arg(long)]
        json: bool,
    },

    /// Convert the given subtitle files
    Rename {
        /// Target convention: plain or media-server
        #[arg(short, long)]
        to: String,

        /// Only print the renames that would happen
        #[arg(long)]
        dry_run: bool,

        /// Subtitle files
        #[arg(required = true)]
        files: Vec<PathBuf>,
    },

    /// Show how subtitle filenames are decomposed
    Detect {
        /// Subtitle files or filenames
        #[arg(required = true)]
        files: Vec<PathBuf>,
    },

    /// List supported naming conventions
    Conventions,

    /// Write a default configuration file
    InitConfig {
        /// Output path
        #[arg(default_value = "subfmt.toml")]
        output: PathBuf,
    },
}
