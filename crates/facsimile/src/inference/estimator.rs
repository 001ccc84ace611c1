//! Constraint estimation: turns raw observations into generation-ready
//! constraints.
//!
//! The estimator is a pure pass over an inferred schema. It widens numeric
//! bounds by a relative margin (so generated values echo the magnitude of
//! the source without leaking its exact extremes) and decides which string
//! nodes are enumerations.

use crate::schema::{
    NumericConstraint, OptionalSchema, PrimitiveKind, PrimitiveSchema, RecordSchema, Schema,
    SequenceSchema, StringConstraint, UnionSchema,
};

/// Configuration for constraint estimation.
#[derive(Debug, Clone)]
pub struct EstimatorConfig {
    /// Relative widening applied to numeric bounds.
    pub numeric_margin: f64,
    /// Maximum distinct literal count treated as an enumeration.
    pub enum_threshold: usize,
    /// On larger samples, distinct literals must stay below this fraction
    /// of the occurrence count to qualify as an enumeration.
    pub enum_ratio: f64,
}

impl Default for EstimatorConfig {
    fn default() -> Self {
        Self {
            numeric_margin: 0.1,
            enum_threshold: 5,
            enum_ratio: 0.5,
        }
    }
}

/// Derives generation-time constraints for every primitive schema node.
pub struct ConstraintEstimator {
    config: EstimatorConfig,
}

impl ConstraintEstimator {
    /// Create an estimator with default settings.
    pub fn new() -> Self {
        Self::with_config(EstimatorConfig::default())
    }

    /// Create an estimator with custom configuration.
    pub fn with_config(config: EstimatorConfig) -> Self {
        Self { config }
    }

    /// Produce an annotated copy of the schema. Pure: the input is not
    /// modified and no other state is touched.
    pub fn estimate(&self, schema: &Schema) -> Schema {
        match schema {
            Schema::Unknown => Schema::Unknown,
            Schema::Primitive(p) => Schema::Primitive(self.estimate_primitive(p)),
            Schema::Optional(o) => Schema::Optional(OptionalSchema {
                inner: Box::new(self.estimate(&o.inner)),
                present: o.present,
                absent: o.absent,
            }),
            Schema::Sequence(s) => Schema::Sequence(SequenceSchema {
                element: s.element.as_ref().map(|e| Box::new(self.estimate(e))),
                length: s.length,
                seen: s.seen,
            }),
            Schema::Record(r) => Schema::Record(RecordSchema {
                fields: r
                    .fields
                    .iter()
                    .map(|(name, field)| (name.clone(), self.estimate(field)))
                    .collect(),
                seen: r.seen,
            }),
            Schema::Union(u) => Schema::Union(UnionSchema {
                variants: u.variants.iter().map(|v| self.estimate(v)).collect(),
            }),
        }
    }

    fn estimate_primitive(&self, p: &PrimitiveSchema) -> PrimitiveSchema {
        let mut out = p.clone();
        match p.kind {
            PrimitiveKind::Bool => {}
            PrimitiveKind::Integer | PrimitiveKind::Float => {
                if let Some(n) = &p.numeric {
                    out.numeric =
                        Some(self.widen_numeric(n, p.kind == PrimitiveKind::Integer));
                }
            }
            PrimitiveKind::String => {
                if let Some(s) = &p.string {
                    out.string = Some(self.finalize_string(s, p.count));
                }
            }
        }
        out
    }

    /// Expand observed bounds by the configured relative margin. Degenerate
    /// spans fall back to a magnitude-relative pad so single-valued nodes
    /// still drift away from their exact source value.
    fn widen_numeric(&self, c: &NumericConstraint, integral: bool) -> NumericConstraint {
        let margin = self.config.numeric_margin;
        if margin <= 0.0 {
            return c.clone();
        }

        let span = c.max - c.min;
        let pad = if span > 0.0 {
            span * margin
        } else {
            c.max.abs() * margin
        };
        let (mut min, mut max) = (c.min - pad, c.max + pad);
        if integral {
            min = min.floor();
            max = max.ceil();
        }
        NumericConstraint { min, max }
    }

    /// Decide whether the distinct literals at a node form a closed set.
    ///
    /// The ratio test only applies once the sample is large enough to be
    /// informative; on small samples (at most twice the threshold) a low
    /// distinct count is already enough. Two samples with two names is a
    /// categorical-looking field, not an open vocabulary.
    fn finalize_string(&self, c: &StringConstraint, occurrences: usize) -> StringConstraint {
        let mut out = c.clone();
        let distinct = c.value_counts.len();

        let qualifies = !c.distinct_overflow
            && distinct > 0
            && distinct <= self.config.enum_threshold
            && (occurrences <= self.config.enum_threshold * 2
                || (distinct as f64) < self.config.enum_ratio * occurrences as f64);

        if qualifies {
            out.enumeration = Some(c.value_counts.keys().cloned().collect());
        }
        out
    }
}

impl Default for ConstraintEstimator {
    fn default() -> Self {
        Self::new()
    }
}
