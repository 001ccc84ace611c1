//! Schema inference: unify one or more sample values into a single schema.

mod estimator;
mod merge;
mod observe;

pub use estimator::{ConstraintEstimator, EstimatorConfig};
pub use merge::merge;

pub(crate) use observe::schema_of_value;

use tracing::debug;

use crate::error::{FacsimileError, Result};
use crate::schema::Schema;
use crate::value::Value;

/// Configuration for schema inference.
#[derive(Debug, Clone, Default)]
pub struct InferenceConfig {
    /// Lexically classify text scalars (int/float/bool/null spellings)
    /// before observing them. Enabled for formats that deliver everything
    /// as text (CSV, XML); off for JSON, which is already typed.
    pub coerce_strings: bool,
}

/// Folds sample values into a unified schema.
pub struct Inferencer {
    config: InferenceConfig,
}

impl Inferencer {
    /// Create an inferencer with default configuration.
    pub fn new() -> Self {
        Self::with_config(InferenceConfig::default())
    }

    /// Create an inferencer with custom configuration.
    pub fn with_config(config: InferenceConfig) -> Self {
        Self { config }
    }

    /// Infer a schema covering every sample. Fails with `EmptyInput` when
    /// called with zero samples; no partial schema is ever returned.
    pub fn infer(&self, samples: &[Value]) -> Result<Schema> {
        let Some((first, rest)) = samples.split_first() else {
            return Err(FacsimileError::EmptyInput(
                "schema inference needs at least one sample".to_string(),
            ));
        };

        let mut schema = schema_of_value(first, self.config.coerce_strings);
        for sample in rest {
            schema = merge(schema, schema_of_value(sample, self.config.coerce_strings));
        }

        debug!(
            samples = samples.len(),
            root = schema.kind_name(),
            "inference complete"
        );
        Ok(schema)
    }
}

impl Default for Inferencer {
    fn default() -> Self {
        Self::new()
    }
}

/// Infer a schema with default configuration.
pub fn infer(samples: &[Value]) -> Result<Schema> {
    Inferencer::new().infer(samples)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::PrimitiveKind;

    #[test]
    fn test_empty_input_fails() {
        let result = infer(&[]);
        assert!(matches!(result, Err(FacsimileError::EmptyInput(_))));
    }

    #[test]
    fn test_single_sample() {
        let schema = infer(&[Value::from(42)]).unwrap();
        let Schema::Primitive(p) = schema else {
            panic!("expected primitive");
        };
        assert_eq!(p.kind, PrimitiveKind::Integer);
        assert_eq!(p.count, 1);
    }

    #[test]
    fn test_mixed_numeric_samples_widen_to_float() {
        let schema = infer(&[Value::from(1), Value::from(1.5)]).unwrap();
        let Schema::Primitive(p) = schema else {
            panic!("expected primitive");
        };
        assert_eq!(p.kind, PrimitiveKind::Float);
        let n = p.numeric.unwrap();
        assert_eq!((n.min, n.max), (1.0, 1.5));
    }

    #[test]
    fn test_merge_is_idempotent_up_to_tallies() {
        let samples = [
            Value::Mapping(
                [
                    ("id".to_string(), Value::from(1)),
                    ("name".to_string(), Value::from("alice")),
                ]
                .into_iter()
                .collect(),
            ),
            Value::Mapping([("id".to_string(), Value::from(2))].into_iter().collect()),
        ];
        let schema = infer(&samples).unwrap();
        let doubled = merge(schema.clone(), schema.clone());
        assert!(doubled.same_shape(&schema));
    }
}
