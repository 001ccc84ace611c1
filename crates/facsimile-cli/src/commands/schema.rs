//! Schema command - infer and print a data file's schema.

use std::path::PathBuf;

use colored::Colorize;
use facsimile::Facsimile;

use crate::cli::FormatChoice;

pub fn run(
    file: PathBuf,
    format: Option<FormatChoice>,
    output: Option<PathBuf>,
    verbose: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    if !file.exists() {
        return Err(format!("File not found: {}", file.display()).into());
    }

    let (schema, source) = Facsimile::new().infer_file(&file, format.map(Into::into))?;

    if verbose {
        eprintln!(
            "{} {} ({} samples, {})",
            "Analyzed".cyan().bold(),
            source.file.white(),
            source.sample_count,
            source.format
        );
    }

    let json = serde_json::to_string_pretty(&schema)?;
    match output {
        Some(path) => {
            std::fs::write(&path, json)?;
            println!(
                "{} {}",
                "Schema written to".green().bold(),
                path.display().to_string().white()
            );
        }
        None => println!("{json}"),
    }

    Ok(())
}
