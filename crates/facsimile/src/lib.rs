//! Facsimile: structural data synthesis for JSON, XML, and CSV datasets.
//!
//! Facsimile infers a schema from real example data and generates synthetic
//! instances that are structurally indistinguishable from the original
//! (same field names, nesting shape, cardinality patterns, and value
//! constraints) while the concrete values are freshly randomized.
//!
//! # Core Principles
//!
//! - **Format-agnostic**: one intermediate value model covers every format
//! - **Constraint-faithful**: generated values satisfy every inferred bound
//! - **Deterministic**: a seeded run reproduces its output byte for byte
//!
//! # Example
//!
//! ```no_run
//! use facsimile::Facsimile;
//!
//! let facsimile = Facsimile::new();
//! let output = facsimile.synthesize_file("users.json", None).unwrap();
//!
//! println!("samples: {}", output.report.sample_count);
//! println!("seed: {}", output.report.seed);
//! ```

pub mod error;
pub mod format;
pub mod generate;
pub mod inference;
pub mod schema;
pub mod value;

mod facsimile;

pub use crate::facsimile::{Facsimile, SynthesisConfig, SynthesisOutput, SynthesisReport};
pub use error::{FacsimileError, Result};
pub use format::{CsvAdapter, Format, FormatAdapter, JsonAdapter, SourceMetadata, XmlAdapter};
pub use generate::{Generator, GeneratorConfig, NullMode};
pub use inference::{infer, ConstraintEstimator, EstimatorConfig, InferenceConfig, Inferencer};
pub use schema::{CharClass, PrimitiveKind, Schema, StringPattern};
pub use value::{Number, Value};
