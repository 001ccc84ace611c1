//! Main Facsimile struct and public API.

use std::fs;
use std::path::Path;

use serde::Serialize;
use tracing::{debug, info};

use crate::error::{FacsimileError, Result};
use crate::format::{adapter_for, Format, SourceMetadata};
use crate::generate::{Generator, GeneratorConfig, NullMode};
use crate::inference::{ConstraintEstimator, EstimatorConfig, InferenceConfig, Inferencer};
use crate::schema::Schema;

/// Configuration for a synthesis run. Mirrors the recognized generation
/// options: count, seed, null mode, numeric margin, enumeration threshold.
#[derive(Debug, Clone)]
pub struct SynthesisConfig {
    /// Instances to generate (None = one per input sample).
    pub count: Option<usize>,
    /// Rng seed for reproducible output (None = fresh entropy).
    pub seed: Option<u64>,
    /// How absent optional fields are rendered.
    pub null_mode: NullMode,
    /// Relative widening applied to numeric bounds.
    pub numeric_margin: f64,
    /// Maximum distinct literal count treated as an enumeration.
    pub enum_threshold: usize,
}

impl Default for SynthesisConfig {
    fn default() -> Self {
        let estimator = EstimatorConfig::default();
        Self {
            count: None,
            seed: None,
            null_mode: NullMode::default(),
            numeric_margin: estimator.numeric_margin,
            enum_threshold: estimator.enum_threshold,
        }
    }
}

/// Report of a synthesis run.
#[derive(Debug, Clone, Serialize)]
pub struct SynthesisReport {
    /// Metadata about the source document.
    pub source: SourceMetadata,
    /// The annotated schema the output was generated from.
    pub schema: Schema,
    /// Samples contributed to inference.
    pub sample_count: usize,
    /// Instances generated.
    pub generated_count: usize,
    /// Seed actually used, explicit or drawn.
    pub seed: u64,
}

/// Output of a synthesis run: serialized document plus report.
#[derive(Debug, Clone)]
pub struct SynthesisOutput {
    pub data: Vec<u8>,
    pub report: SynthesisReport,
}

/// The synthesis pipeline: parse, infer, estimate, generate, serialize.
pub struct Facsimile {
    config: SynthesisConfig,
}

impl Facsimile {
    /// Create a pipeline with default configuration.
    pub fn new() -> Self {
        Self::with_config(SynthesisConfig::default())
    }

    /// Create a pipeline with custom configuration.
    pub fn with_config(config: SynthesisConfig) -> Self {
        Self { config }
    }

    /// Synthesize a structural replica of a data file. The format is taken
    /// from the file extension unless overridden.
    pub fn synthesize_file(
        &self,
        input: impl AsRef<Path>,
        format_override: Option<Format>,
    ) -> Result<SynthesisOutput> {
        let path = input.as_ref();
        let format = format_override
            .or_else(|| Format::from_path(path))
            .ok_or_else(|| {
                FacsimileError::UnsupportedFormat(format!(
                    "cannot detect format of '{}'",
                    path.display()
                ))
            })?;
        let bytes = fs::read(path).map_err(|e| FacsimileError::Io {
            path: path.to_path_buf(),
            source: e,
        })?;
        self.run(&bytes, format, path)
    }

    /// Synthesize from in-memory document bytes.
    pub fn synthesize_bytes(&self, bytes: &[u8], format: Format) -> Result<SynthesisOutput> {
        self.run(bytes, format, Path::new("<memory>"))
    }

    /// Infer and annotate the schema of a data file without generating.
    pub fn infer_file(
        &self,
        input: impl AsRef<Path>,
        format_override: Option<Format>,
    ) -> Result<(Schema, SourceMetadata)> {
        let path = input.as_ref();
        let format = format_override
            .or_else(|| Format::from_path(path))
            .ok_or_else(|| {
                FacsimileError::UnsupportedFormat(format!(
                    "cannot detect format of '{}'",
                    path.display()
                ))
            })?;
        let bytes = fs::read(path).map_err(|e| FacsimileError::Io {
            path: path.to_path_buf(),
            source: e,
        })?;

        let samples = adapter_for(format).parse(&bytes)?;
        let schema = self.infer_and_estimate(&samples, format)?;
        let source = SourceMetadata::new(path.to_path_buf(), &bytes, format, samples.len());
        Ok((schema, source))
    }

    fn run(&self, bytes: &[u8], format: Format, origin: &Path) -> Result<SynthesisOutput> {
        let adapter = adapter_for(format);
        let samples = adapter.parse(bytes)?;
        debug!(samples = samples.len(), %format, "parsed input document");

        let schema = self.infer_and_estimate(&samples, format)?;

        let generator = Generator::new(
            schema.clone(),
            GeneratorConfig {
                null_mode: self.config.null_mode,
            },
        )?;

        let seed = self
            .config
            .seed
            .unwrap_or_else(|| fastrand::Rng::new().u64(..));
        let mut rng = fastrand::Rng::with_seed(seed);
        let count = self.config.count.unwrap_or(samples.len());
        let generated = generator.generate_many(count, &mut rng);
        let data = adapter.serialize(&generated)?;

        info!(
            samples = samples.len(),
            generated = count,
            seed,
            "synthesis complete"
        );

        let source = SourceMetadata::new(origin.to_path_buf(), bytes, format, samples.len());
        Ok(SynthesisOutput {
            data,
            report: SynthesisReport {
                source,
                schema,
                sample_count: samples.len(),
                generated_count: count,
                seed,
            },
        })
    }

    fn infer_and_estimate(
        &self,
        samples: &[crate::value::Value],
        format: Format,
    ) -> Result<Schema> {
        let inferencer = Inferencer::with_config(InferenceConfig {
            coerce_strings: format.coerces_strings(),
        });
        let raw = inferencer.infer(samples)?;

        let estimator = ConstraintEstimator::with_config(EstimatorConfig {
            numeric_margin: self.config.numeric_margin,
            enum_threshold: self.config.enum_threshold,
            ..EstimatorConfig::default()
        });
        Ok(estimator.estimate(&raw))
    }
}

impl Default for Facsimile {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_synthesize_json_bytes() {
        let input = br#"[{"id": 1, "name": "alice"}, {"id": 2, "name": "bob"}]"#;
        let facsimile = Facsimile::with_config(SynthesisConfig {
            seed: Some(1),
            ..SynthesisConfig::default()
        });
        let output = facsimile.synthesize_bytes(input, Format::Json).unwrap();
        assert_eq!(output.report.sample_count, 2);
        assert_eq!(output.report.generated_count, 2);
        assert_eq!(output.report.seed, 1);

        let parsed: serde_json::Value = serde_json::from_slice(&output.data).unwrap();
        let rows = parsed.as_array().unwrap();
        assert_eq!(rows.len(), 2);
        for row in rows {
            assert!(row.get("id").unwrap().is_i64());
            assert!(row.get("name").unwrap().is_string());
        }
    }

    #[test]
    fn test_seeded_runs_are_identical() {
        let input = br#"[{"x": 1.5}, {"x": 9.25}]"#;
        let config = SynthesisConfig {
            seed: Some(99),
            ..SynthesisConfig::default()
        };
        let a = Facsimile::with_config(config.clone())
            .synthesize_bytes(input, Format::Json)
            .unwrap();
        let b = Facsimile::with_config(config)
            .synthesize_bytes(input, Format::Json)
            .unwrap();
        assert_eq!(a.data, b.data);
    }

    #[test]
    fn test_csv_coercion_end_to_end() {
        let input = b"id,score,active\n1,0.5,true\n2,0.75,false\n3,0.25,true\n";
        let facsimile = Facsimile::with_config(SynthesisConfig {
            seed: Some(5),
            count: Some(10),
            ..SynthesisConfig::default()
        });
        let output = facsimile.synthesize_bytes(input, Format::Csv).unwrap();
        let text = String::from_utf8(output.data).unwrap();
        let mut lines = text.lines();
        assert_eq!(lines.next().unwrap(), "id,score,active");
        let mut rows = 0;
        for line in lines {
            let cells: Vec<&str> = line.split(',').collect();
            assert!(cells[0].parse::<i64>().is_ok(), "id not integer: {line}");
            assert!(cells[1].parse::<f64>().is_ok(), "score not float: {line}");
            assert!(cells[2] == "true" || cells[2] == "false");
            rows += 1;
        }
        assert_eq!(rows, 10);
    }

    #[test]
    fn test_unknown_extension_fails() {
        let facsimile = Facsimile::new();
        let err = facsimile.synthesize_file("data.parquet", None);
        assert!(matches!(err, Err(FacsimileError::UnsupportedFormat(_))));
    }
}
