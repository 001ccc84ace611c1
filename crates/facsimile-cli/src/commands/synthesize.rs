//! Synthesize command - generate a synthetic replica of a data file.

use std::io::Write;
use std::path::PathBuf;

use colored::Colorize;
use facsimile::{Facsimile, SynthesisConfig};

use crate::cli::{FormatChoice, NullModeChoice};

#[allow(clippy::too_many_arguments)]
pub fn run(
    file: PathBuf,
    output: Option<PathBuf>,
    format: Option<FormatChoice>,
    count: Option<usize>,
    seed: Option<u64>,
    null_mode: NullModeChoice,
    numeric_margin: f64,
    enum_threshold: usize,
    verbose: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    if !file.exists() {
        return Err(format!("File not found: {}", file.display()).into());
    }

    let config = SynthesisConfig {
        count,
        seed,
        null_mode: null_mode.into(),
        numeric_margin,
        enum_threshold,
    };
    let result = Facsimile::with_config(config).synthesize_file(&file, format.map(Into::into))?;

    match output {
        Some(path) => {
            std::fs::write(&path, &result.data)?;
            println!(
                "{} {} {} {}",
                "Synthesized".green().bold(),
                path.display().to_string().white(),
                "from".dimmed(),
                file.display().to_string().white()
            );
            println!(
                "  {} samples in, {} instances out, seed {}",
                result.report.sample_count, result.report.generated_count, result.report.seed
            );
        }
        None => {
            // Data goes to stdout; keep the summary off it.
            let mut stdout = std::io::stdout().lock();
            stdout.write_all(&result.data)?;
            if !result.data.ends_with(b"\n") {
                stdout.write_all(b"\n")?;
            }
            if verbose {
                eprintln!(
                    "{} {} samples in, {} instances out, seed {}",
                    "Synthesized:".green().bold(),
                    result.report.sample_count,
                    result.report.generated_count,
                    result.report.seed
                );
            }
        }
    }

    Ok(())
}
