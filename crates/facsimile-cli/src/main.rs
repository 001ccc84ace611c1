//! Facsimile CLI - structural data synthesizer.

mod cli;
mod commands;

use clap::Parser;
use cli::{Cli, Commands};
use tracing_subscriber::EnvFilter;

fn main() {
    let cli = Cli::parse();

    let default_filter = if cli.verbose {
        "facsimile=debug"
    } else {
        "facsimile=warn"
    };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter)),
        )
        .with_writer(std::io::stderr)
        .init();

    let result = match cli.command {
        Commands::Synthesize {
            file,
            output,
            format,
            count,
            seed,
            null_mode,
            numeric_margin,
            enum_threshold,
        } => commands::synthesize::run(
            file,
            output,
            format,
            count,
            seed,
            null_mode,
            numeric_margin,
            enum_threshold,
            cli.verbose,
        ),

        Commands::Schema {
            file,
            format,
            output,
        } => commands::schema::run(file, format, output, cli.verbose),
    };

    if let Err(e) = result {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}
