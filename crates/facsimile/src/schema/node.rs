//! The inferred schema tree.
//!
//! A `Schema` describes the shape of one or more observed values: primitive
//! kinds with constraints, optional wrappers, homogeneous sequences, ordered
//! records, and union markers for positions where incompatible shapes were
//! observed. Inference builds it, the estimator annotates it, the generator
//! only reads it.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::error::{FacsimileError, Result};
use crate::value::Value;

use super::constraints::{LengthBounds, NumericConstraint, StringConstraint};
use super::types::{CharClass, PrimitiveKind};

/// A scalar schema node: kind plus kind-specific constraints.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PrimitiveSchema {
    pub kind: PrimitiveKind,
    /// Number of values observed at this node.
    pub count: usize,
    /// Bounds for Integer/Float kinds.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub numeric: Option<NumericConstraint>,
    /// Constraints for the String kind.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub string: Option<StringConstraint>,
}

impl PrimitiveSchema {
    pub fn bool() -> Self {
        Self {
            kind: PrimitiveKind::Bool,
            count: 1,
            numeric: None,
            string: None,
        }
    }

    pub fn integer(value: i64) -> Self {
        Self {
            kind: PrimitiveKind::Integer,
            count: 1,
            numeric: Some(NumericConstraint::of(value as f64)),
            string: None,
        }
    }

    pub fn float(value: f64) -> Self {
        Self {
            kind: PrimitiveKind::Float,
            count: 1,
            numeric: Some(NumericConstraint::of(value)),
            string: None,
        }
    }

    pub fn string(literal: &str) -> Self {
        Self {
            kind: PrimitiveKind::String,
            count: 1,
            numeric: None,
            string: Some(StringConstraint::of(literal)),
        }
    }
}

/// Marks a position whose value may be absent or null.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OptionalSchema {
    pub inner: Box<Schema>,
    /// Samples where a value was present.
    pub present: usize,
    /// Samples where the value was absent or null.
    pub absent: usize,
}

impl OptionalSchema {
    /// Observed presence probability; 0.5 when nothing was tallied.
    pub fn presence_ratio(&self) -> f64 {
        let total = self.present + self.absent;
        if total == 0 {
            0.5
        } else {
            self.present as f64 / total as f64
        }
    }
}

/// A homogeneous sequence. `element` is None only when every observed
/// sequence was empty.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SequenceSchema {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub element: Option<Box<Schema>>,
    pub length: LengthBounds,
    /// Number of sequences observed at this node.
    pub seen: usize,
}

/// An ordered record: field order is the order of first appearance, the
/// field set is the union of all observed field names.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecordSchema {
    pub fields: IndexMap<String, Schema>,
    /// Number of mappings observed at this node.
    pub seen: usize,
}

/// Incompatible shapes observed at one position. The generator picks one
/// variant uniformly per generated value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UnionSchema {
    pub variants: Vec<Schema>,
}

/// An inferred type description covering one or more values.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Schema {
    /// Zero-observation placeholder. Produced beneath Optional for null-only
    /// positions; absorbed by merge; generates Null.
    Unknown,
    Primitive(PrimitiveSchema),
    Optional(OptionalSchema),
    Sequence(SequenceSchema),
    Record(RecordSchema),
    Union(UnionSchema),
}

impl Schema {
    /// Short name of the variant, for diagnostics.
    pub fn kind_name(&self) -> &'static str {
        match self {
            Schema::Unknown => "unknown",
            Schema::Primitive(p) => match p.kind {
                PrimitiveKind::Bool => "bool",
                PrimitiveKind::Integer => "integer",
                PrimitiveKind::Float => "float",
                PrimitiveKind::String => "string",
            },
            Schema::Optional(_) => "optional",
            Schema::Sequence(_) => "sequence",
            Schema::Record(_) => "record",
            Schema::Union(_) => "union",
        }
    }

    /// Total samples that contributed to this node, counting absences for
    /// optional nodes.
    pub fn observations(&self) -> usize {
        match self {
            Schema::Unknown => 0,
            Schema::Primitive(p) => p.count,
            Schema::Optional(o) => o.present + o.absent,
            Schema::Sequence(s) => s.seen,
            Schema::Record(r) => r.seen,
            Schema::Union(u) => u.variants.iter().map(Schema::observations).sum(),
        }
    }

    /// Wrap in an Optional layer, recording `absent` additional absences.
    /// Wrapping is idempotent: an existing Optional absorbs the count
    /// instead of nesting.
    pub fn into_optional(self, absent: usize) -> Schema {
        match self {
            Schema::Optional(mut o) => {
                o.absent += absent;
                Schema::Optional(o)
            }
            other => {
                let present = other.observations();
                Schema::Optional(OptionalSchema {
                    inner: Box::new(other),
                    present,
                    absent,
                })
            }
        }
    }

    /// Whether this node is an Optional wrapper.
    pub fn is_optional(&self) -> bool {
        matches!(self, Schema::Optional(_))
    }

    /// Check that the schema is fit for generation. Returns
    /// `InvalidSchema` for unresolved or empty constraints; such a schema
    /// indicates a logic bug in estimation, not bad input.
    pub fn validate(&self) -> Result<()> {
        self.validate_node("$")
    }

    fn validate_node(&self, path: &str) -> Result<()> {
        let fail = |msg: String| Err(FacsimileError::InvalidSchema(msg));
        match self {
            Schema::Unknown => Ok(()),
            Schema::Primitive(p) => {
                match p.kind {
                    PrimitiveKind::Bool => {}
                    PrimitiveKind::Integer | PrimitiveKind::Float => {
                        let Some(n) = &p.numeric else {
                            return fail(format!("{path}: numeric node without bounds"));
                        };
                        if n.min > n.max {
                            return fail(format!(
                                "{path}: inverted bounds [{}, {}]",
                                n.min, n.max
                            ));
                        }
                        if p.kind == PrimitiveKind::Integer
                            && n.min.ceil() > n.max.floor()
                        {
                            return fail(format!(
                                "{path}: no whole number in [{}, {}]",
                                n.min, n.max
                            ));
                        }
                    }
                    PrimitiveKind::String => {
                        let Some(s) = &p.string else {
                            return fail(format!("{path}: string node without constraints"));
                        };
                        if s.min_length > s.max_length {
                            return fail(format!(
                                "{path}: inverted length bounds [{}, {}]",
                                s.min_length, s.max_length
                            ));
                        }
                        if let Some(e) = &s.enumeration {
                            if e.is_empty() {
                                return fail(format!("{path}: empty enumeration"));
                            }
                        }
                        if s.pattern.is_some() && s.temporal.is_none() {
                            return fail(format!("{path}: pattern without temporal range"));
                        }
                        if let Some((lo, hi)) = s.temporal {
                            if lo > hi {
                                return fail(format!("{path}: inverted temporal range"));
                            }
                        }
                    }
                }
                Ok(())
            }
            Schema::Optional(o) => o.inner.validate_node(path),
            Schema::Sequence(s) => {
                if s.length.min > s.length.max {
                    return fail(format!(
                        "{path}: inverted length bounds [{}, {}]",
                        s.length.min, s.length.max
                    ));
                }
                match &s.element {
                    Some(e) => e.validate_node(&format!("{path}[]")),
                    None if s.length.max > 0 => {
                        fail(format!("{path}: non-empty bounds with no element schema"))
                    }
                    None => Ok(()),
                }
            }
            Schema::Record(r) => {
                for (name, field) in &r.fields {
                    field.validate_node(&format!("{path}.{name}"))?;
                }
                Ok(())
            }
            Schema::Union(u) => {
                if u.variants.is_empty() {
                    return fail(format!("{path}: empty union"));
                }
                for (i, v) in u.variants.iter().enumerate() {
                    v.validate_node(&format!("{path}|{i}"))?;
                }
                Ok(())
            }
        }
    }

    /// Whether a value satisfies every constraint of this schema.
    pub fn admits(&self, value: &Value) -> bool {
        match self {
            Schema::Unknown => value.is_null(),
            Schema::Primitive(p) => Self::primitive_admits(p, value),
            Schema::Optional(o) => value.is_null() || o.inner.admits(value),
            Schema::Sequence(s) => {
                let Value::Sequence(items) = value else {
                    return false;
                };
                if !s.length.contains(items.len()) {
                    return false;
                }
                match &s.element {
                    Some(e) => items.iter().all(|item| e.admits(item)),
                    None => items.is_empty(),
                }
            }
            Schema::Record(r) => {
                let Value::Mapping(entries) = value else {
                    return false;
                };
                // No unexpected fields.
                if entries.keys().any(|k| !r.fields.contains_key(k)) {
                    return false;
                }
                r.fields.iter().all(|(name, field)| match entries.get(name) {
                    Some(v) => field.admits(v),
                    None => field.is_optional(),
                })
            }
            Schema::Union(u) => u.variants.iter().any(|v| v.admits(value)),
        }
    }

    fn primitive_admits(p: &PrimitiveSchema, value: &Value) -> bool {
        match (p.kind, value) {
            (PrimitiveKind::Bool, Value::Bool(_)) => true,
            (PrimitiveKind::Integer, Value::Number(n)) => {
                n.is_integral()
                    && p.numeric.as_ref().is_some_and(|c| c.contains(n.as_f64()))
            }
            (PrimitiveKind::Float, Value::Number(n)) => {
                p.numeric.as_ref().is_some_and(|c| c.contains(n.as_f64()))
            }
            (PrimitiveKind::String, Value::String(s)) => {
                let Some(c) = &p.string else { return false };
                if let Some(e) = &c.enumeration {
                    return e.iter().any(|lit| lit == s);
                }
                if let Some(pattern) = c.pattern {
                    return pattern.matches(s);
                }
                let len = s.chars().count();
                len >= c.min_length
                    && len <= c.max_length
                    && c.char_class.widen(CharClass::of(s)) == c.char_class
            }
            _ => false,
        }
    }

    /// Structural equivalence ignoring observation tallies.
    ///
    /// Tallies are additive (merging a schema with itself doubles them),
    /// so the merge laws of inference, idempotence and commutativity, hold
    /// up to this relation: same shapes, bounds, classes, patterns and
    /// literal sets. Record fields compare as a set (order-insensitive).
    pub fn same_shape(&self, other: &Schema) -> bool {
        match (self, other) {
            (Schema::Unknown, Schema::Unknown) => true,
            (Schema::Primitive(a), Schema::Primitive(b)) => {
                a.kind == b.kind
                    && a.numeric == b.numeric
                    && match (&a.string, &b.string) {
                        (None, None) => true,
                        (Some(x), Some(y)) => {
                            x.min_length == y.min_length
                                && x.max_length == y.max_length
                                && x.char_class == y.char_class
                                && x.pattern == y.pattern
                                && x.temporal == y.temporal
                                && x.distinct_overflow == y.distinct_overflow
                                && x.enumeration == y.enumeration
                                && x.value_counts.len() == y.value_counts.len()
                                && x.value_counts
                                    .keys()
                                    .all(|k| y.value_counts.contains_key(k))
                        }
                        _ => false,
                    }
            }
            (Schema::Optional(a), Schema::Optional(b)) => a.inner.same_shape(&b.inner),
            (Schema::Sequence(a), Schema::Sequence(b)) => {
                a.length == b.length
                    && match (&a.element, &b.element) {
                        (None, None) => true,
                        (Some(x), Some(y)) => x.same_shape(y),
                        _ => false,
                    }
            }
            (Schema::Record(a), Schema::Record(b)) => {
                a.fields.len() == b.fields.len()
                    && a.fields.iter().all(|(name, field)| {
                        b.fields.get(name).is_some_and(|f| field.same_shape(f))
                    })
            }
            (Schema::Union(a), Schema::Union(b)) => {
                if a.variants.len() != b.variants.len() {
                    return false;
                }
                // Multiset match: each variant pairs with a distinct one.
                let mut used = vec![false; b.variants.len()];
                a.variants.iter().all(|va| {
                    b.variants.iter().enumerate().any(|(i, vb)| {
                        if !used[i] && va.same_shape(vb) {
                            used[i] = true;
                            true
                        } else {
                            false
                        }
                    })
                })
            }
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_into_optional_is_idempotent() {
        let s = Schema::Primitive(PrimitiveSchema::integer(1));
        let once = s.into_optional(1);
        let twice = once.clone().into_optional(2);
        let Schema::Optional(o) = &twice else {
            panic!("expected optional");
        };
        assert!(!o.inner.is_optional());
        assert_eq!(o.present, 1);
        assert_eq!(o.absent, 3);
        assert!(once.same_shape(&twice));
    }

    #[test]
    fn test_presence_ratio_fallback() {
        let o = OptionalSchema {
            inner: Box::new(Schema::Unknown),
            present: 0,
            absent: 0,
        };
        assert_eq!(o.presence_ratio(), 0.5);
    }

    #[test]
    fn test_validate_rejects_empty_enumeration() {
        let mut p = PrimitiveSchema::string("x");
        p.string.as_mut().unwrap().enumeration = Some(Vec::new());
        assert!(Schema::Primitive(p).validate().is_err());
    }

    #[test]
    fn test_validate_rejects_unbounded_sequence_without_element() {
        let s = Schema::Sequence(SequenceSchema {
            element: None,
            length: LengthBounds { min: 0, max: 3 },
            seen: 1,
        });
        assert!(s.validate().is_err());
    }

    #[test]
    fn test_record_admits_respects_optionality() {
        let mut fields = IndexMap::new();
        fields.insert(
            "id".to_string(),
            Schema::Primitive(PrimitiveSchema::integer(1)),
        );
        fields.insert(
            "tag".to_string(),
            Schema::Primitive(PrimitiveSchema::string("vip")).into_optional(1),
        );
        let schema = Schema::Record(RecordSchema { fields, seen: 2 });

        let with_tag = Value::Mapping(
            [
                ("id".to_string(), Value::from(1)),
                ("tag".to_string(), Value::from("vip")),
            ]
            .into_iter()
            .collect(),
        );
        let without_tag =
            Value::Mapping([("id".to_string(), Value::from(1))].into_iter().collect());
        let missing_id =
            Value::Mapping([("tag".to_string(), Value::from("vip"))].into_iter().collect());

        assert!(schema.admits(&with_tag));
        assert!(schema.admits(&without_tag));
        assert!(!schema.admits(&missing_id));
    }

    #[test]
    fn test_admits_rejects_out_of_bounds() {
        let schema = Schema::Primitive(PrimitiveSchema {
            kind: PrimitiveKind::Integer,
            count: 2,
            numeric: Some(NumericConstraint { min: 1.0, max: 5.0 }),
            string: None,
        });
        assert!(schema.admits(&Value::from(3)));
        assert!(!schema.admits(&Value::from(9)));
        assert!(!schema.admits(&Value::from(2.5)));
    }
}
