//! Constraints attached to primitive and sequence schema nodes.
//!
//! During inference these accumulate raw observations; the constraint
//! estimator finalizes them (margin widening, enumeration detection) into
//! the form the generator consumes.

use chrono::NaiveDateTime;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use super::types::{CharClass, StringPattern};

/// Distinct string literals tracked per node before tracking is abandoned.
/// Enumeration detection never needs more than the enumeration threshold,
/// so the cap only has to comfortably exceed any sensible threshold.
const MAX_TRACKED_VALUES: usize = 64;

/// Inclusive numeric bounds observed at a node.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NumericConstraint {
    pub min: f64,
    pub max: f64,
}

impl NumericConstraint {
    /// Constraint covering a single observation.
    pub fn of(value: f64) -> Self {
        Self {
            min: value,
            max: value,
        }
    }

    /// Union with another constraint.
    pub fn merge(&self, other: &NumericConstraint) -> NumericConstraint {
        NumericConstraint {
            min: self.min.min(other.min),
            max: self.max.max(other.max),
        }
    }

    /// Whether a value falls within the bounds.
    pub fn contains(&self, value: f64) -> bool {
        value >= self.min && value <= self.max
    }
}

/// Constraints observed for a string node: length bounds, character class,
/// distinct literals (for enumeration detection), and an optional detected
/// temporal pattern.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StringConstraint {
    /// Minimum observed length, in characters.
    pub min_length: usize,
    /// Maximum observed length, in characters.
    pub max_length: usize,
    /// Widened character class across all observations.
    pub char_class: CharClass,
    /// Pattern every observation matched, if any.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pattern: Option<StringPattern>,
    /// Observed timestamp range when a pattern is present.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub temporal: Option<(NaiveDateTime, NaiveDateTime)>,
    /// Frequency of each distinct literal, in first-observation order.
    /// Cleared once tracking overflows.
    #[serde(skip_serializing_if = "IndexMap::is_empty", default)]
    pub value_counts: IndexMap<String, usize>,
    /// True once more distinct literals were seen than we track.
    #[serde(default)]
    pub distinct_overflow: bool,
    /// Finalized enumeration, set by the estimator when the distinct
    /// literals are few enough to treat as a closed set.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub enumeration: Option<Vec<String>>,
}

impl StringConstraint {
    /// Constraint covering a single literal.
    pub fn of(literal: &str) -> Self {
        let length = literal.chars().count();
        let (pattern, temporal) = match StringPattern::detect(literal) {
            Some((p, ts)) => (Some(p), Some((ts, ts))),
            None => (None, None),
        };
        let mut value_counts = IndexMap::new();
        value_counts.insert(literal.to_string(), 1);

        Self {
            min_length: length,
            max_length: length,
            char_class: CharClass::of(literal),
            pattern,
            temporal,
            value_counts,
            distinct_overflow: false,
            enumeration: None,
        }
    }

    /// Union with another constraint.
    pub fn merge(&self, other: &StringConstraint) -> StringConstraint {
        // The pattern survives only if both sides agree on it.
        let (pattern, temporal) = match (self.pattern, other.pattern) {
            (Some(a), Some(b)) if a == b => {
                let temporal = match (self.temporal, other.temporal) {
                    (Some((lo1, hi1)), Some((lo2, hi2))) => {
                        Some((lo1.min(lo2), hi1.max(hi2)))
                    }
                    (t, None) | (None, t) => t,
                };
                (Some(a), temporal)
            }
            _ => (None, None),
        };

        let mut value_counts = self.value_counts.clone();
        let mut distinct_overflow = self.distinct_overflow || other.distinct_overflow;
        if !distinct_overflow {
            for (literal, count) in &other.value_counts {
                *value_counts.entry(literal.clone()).or_insert(0) += count;
            }
            if value_counts.len() > MAX_TRACKED_VALUES {
                distinct_overflow = true;
            }
        }
        if distinct_overflow {
            value_counts.clear();
        }

        StringConstraint {
            min_length: self.min_length.min(other.min_length),
            max_length: self.max_length.max(other.max_length),
            char_class: self.char_class.widen(other.char_class),
            pattern,
            temporal,
            value_counts,
            distinct_overflow,
            enumeration: None,
        }
    }
}

/// Inclusive length bounds for a sequence node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LengthBounds {
    pub min: usize,
    pub max: usize,
}

impl LengthBounds {
    /// Bounds covering a single observed length.
    pub fn of(len: usize) -> Self {
        Self { min: len, max: len }
    }

    /// Union with another set of bounds.
    pub fn merge(&self, other: &LengthBounds) -> LengthBounds {
        LengthBounds {
            min: self.min.min(other.min),
            max: self.max.max(other.max),
        }
    }

    /// Whether a length falls within the bounds.
    pub fn contains(&self, len: usize) -> bool {
        len >= self.min && len <= self.max
    }
}
