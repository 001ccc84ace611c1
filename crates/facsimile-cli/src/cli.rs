//! CLI argument definitions using clap.

use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

use facsimile::{Format, NullMode};

/// Facsimile: structural data synthesizer for JSON, XML, and CSV
#[derive(Parser)]
#[command(name = "facsimile")]
#[command(version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Generate a synthetic replica of a data file
    Synthesize {
        /// Path to the data file (JSON/XML/CSV)
        #[arg(value_name = "FILE")]
        file: PathBuf,

        /// Output path (default: stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Input format (default: detect from extension)
        #[arg(short, long)]
        format: Option<FormatChoice>,

        /// Instances to generate (default: one per input sample)
        #[arg(short, long)]
        count: Option<usize>,

        /// Rng seed for reproducible output
        #[arg(short, long)]
        seed: Option<u64>,

        /// How absent optional fields are rendered
        #[arg(long, default_value = "omit")]
        null_mode: NullModeChoice,

        /// Relative widening applied to numeric bounds
        #[arg(long, default_value_t = 0.1)]
        numeric_margin: f64,

        /// Maximum distinct values treated as an enumeration
        #[arg(long, default_value_t = 5)]
        enum_threshold: usize,
    },

    /// Infer a data file's schema and print it as JSON
    Schema {
        /// Path to the data file (JSON/XML/CSV)
        #[arg(value_name = "FILE")]
        file: PathBuf,

        /// Input format (default: detect from extension)
        #[arg(short, long)]
        format: Option<FormatChoice>,

        /// Output path for the schema (default: stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

/// Input format choice.
#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum FormatChoice {
    Json,
    Xml,
    Csv,
}

impl From<FormatChoice> for Format {
    fn from(choice: FormatChoice) -> Format {
        match choice {
            FormatChoice::Json => Format::Json,
            FormatChoice::Xml => Format::Xml,
            FormatChoice::Csv => Format::Csv,
        }
    }
}

/// Null rendering choice.
#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum NullModeChoice {
    /// Leave absent fields out entirely
    Omit,
    /// Keep absent fields with an explicit null
    ExplicitNull,
}

impl From<NullModeChoice> for NullMode {
    fn from(choice: NullModeChoice) -> NullMode {
        match choice {
            NullModeChoice::Omit => NullMode::Omit,
            NullModeChoice::ExplicitNull => NullMode::ExplicitNull,
        }
    }
}
