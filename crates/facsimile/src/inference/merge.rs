//! Pairwise schema merging.
//!
//! Merging unifies two observations of the same position. Compatible shapes
//! deepen their constraints; numeric kinds widen Integer → Float; anything
//! structurally incompatible becomes a union marker so one malformed sample
//! never aborts inference.

use indexmap::IndexMap;

use crate::schema::{
    OptionalSchema, PrimitiveKind, PrimitiveSchema, RecordSchema, Schema, SequenceSchema,
    UnionSchema,
};

/// Merge two schemas describing the same position.
pub fn merge(a: Schema, b: Schema) -> Schema {
    match (a, b) {
        (Schema::Unknown, x) | (x, Schema::Unknown) => x,

        (Schema::Optional(a), Schema::Optional(b)) => Schema::Optional(OptionalSchema {
            inner: Box::new(merge(*a.inner, *b.inner)),
            present: a.present + b.present,
            absent: a.absent + b.absent,
        }),
        // Optionality hoists above everything else, including unions.
        (Schema::Optional(o), x) | (x, Schema::Optional(o)) => {
            let present = o.present + x.observations();
            Schema::Optional(OptionalSchema {
                inner: Box::new(merge(*o.inner, x)),
                present,
                absent: o.absent,
            })
        }

        (Schema::Union(a), Schema::Union(b)) => {
            let variants = b.variants.into_iter().fold(a.variants, absorb);
            Schema::Union(UnionSchema { variants })
        }
        (Schema::Union(u), x) | (x, Schema::Union(u)) => Schema::Union(UnionSchema {
            variants: absorb(u.variants, x),
        }),

        (Schema::Primitive(a), Schema::Primitive(b)) => merge_primitives(a, b),
        (Schema::Record(a), Schema::Record(b)) => merge_records(a, b),
        (Schema::Sequence(a), Schema::Sequence(b)) => merge_sequences(a, b),

        // Shape clash: record vs scalar, sequence vs record, and so on.
        (a, b) => Schema::Union(UnionSchema {
            variants: vec![a, b],
        }),
    }
}

fn merge_primitives(a: PrimitiveSchema, b: PrimitiveSchema) -> Schema {
    let count = a.count + b.count;

    if a.kind == b.kind {
        let numeric = match (&a.numeric, &b.numeric) {
            (Some(x), Some(y)) => Some(x.merge(y)),
            (x, None) | (None, x) => x.clone(),
        };
        let string = match (&a.string, &b.string) {
            (Some(x), Some(y)) => Some(x.merge(y)),
            (x, None) | (None, x) => x.clone(),
        };
        return Schema::Primitive(PrimitiveSchema {
            kind: a.kind,
            count,
            numeric,
            string,
        });
    }

    if a.kind.is_numeric() && b.kind.is_numeric() {
        let numeric = match (&a.numeric, &b.numeric) {
            (Some(x), Some(y)) => Some(x.merge(y)),
            (x, None) | (None, x) => x.clone(),
        };
        return Schema::Primitive(PrimitiveSchema {
            kind: PrimitiveKind::Float,
            count,
            numeric,
            string: None,
        });
    }

    Schema::Union(UnionSchema {
        variants: vec![Schema::Primitive(a), Schema::Primitive(b)],
    })
}

fn merge_records(a: RecordSchema, b: RecordSchema) -> Schema {
    let seen = a.seen + b.seen;
    let mut remaining = b.fields;
    let mut fields = IndexMap::with_capacity(a.fields.len() + remaining.len());

    for (name, field_a) in a.fields {
        // shift_remove keeps the relative order of the fields left behind.
        match remaining.shift_remove(&name) {
            Some(field_b) => {
                fields.insert(name, merge(field_a, field_b));
            }
            None => {
                // Present on the a-side only: absent in every b-side sample.
                fields.insert(name, field_a.into_optional(b.seen));
            }
        }
    }
    for (name, field_b) in remaining {
        // First appearance on the b-side: absent in every a-side sample.
        fields.insert(name, field_b.into_optional(a.seen));
    }

    Schema::Record(RecordSchema { fields, seen })
}

fn merge_sequences(a: SequenceSchema, b: SequenceSchema) -> Schema {
    let element = match (a.element, b.element) {
        (Some(x), Some(y)) => Some(Box::new(merge(*x, *y))),
        (e, None) | (None, e) => e,
    };
    Schema::Sequence(SequenceSchema {
        element,
        length: a.length.merge(&b.length),
        seen: a.seen + b.seen,
    })
}

/// Fold one non-union, non-optional schema into a union's variant list:
/// merge into the first compatible variant, otherwise grow a new one.
fn absorb(mut variants: Vec<Schema>, s: Schema) -> Vec<Schema> {
    if let Some(i) = variants.iter().position(|v| compatible(v, &s)) {
        let prev = std::mem::replace(&mut variants[i], Schema::Unknown);
        variants[i] = merge(prev, s);
    } else {
        variants.push(s);
    }
    variants
}

/// Whether two schemas merge into a single non-union schema.
fn compatible(a: &Schema, b: &Schema) -> bool {
    match (a, b) {
        (Schema::Primitive(x), Schema::Primitive(y)) => {
            x.kind == y.kind || (x.kind.is_numeric() && y.kind.is_numeric())
        }
        (Schema::Record(_), Schema::Record(_)) => true,
        (Schema::Sequence(_), Schema::Sequence(_)) => true,
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::value::Value;

    fn observe(v: &Value) -> Schema {
        super::super::observe::schema_of_value(v, false)
    }

    fn mapping(entries: &[(&str, Value)]) -> Value {
        Value::Mapping(
            entries
                .iter()
                .map(|(k, v)| (k.to_string(), v.clone()))
                .collect(),
        )
    }

    #[test]
    fn test_integer_float_widens() {
        let merged = merge(observe(&Value::from(1)), observe(&Value::from(1.5)));
        let Schema::Primitive(p) = merged else {
            panic!("expected primitive");
        };
        assert_eq!(p.kind, PrimitiveKind::Float);
        let n = p.numeric.unwrap();
        assert_eq!(n.min, 1.0);
        assert_eq!(n.max, 1.5);
    }

    #[test]
    fn test_incompatible_kinds_become_union() {
        let merged = merge(observe(&Value::from("x")), observe(&Value::from(true)));
        let Schema::Union(u) = merged else {
            panic!("expected union");
        };
        assert_eq!(u.variants.len(), 2);
    }

    #[test]
    fn test_union_absorbs_compatible_observation() {
        let merged = merge(observe(&Value::from("x")), observe(&Value::from(true)));
        let merged = merge(merged, observe(&Value::from("y")));
        let Schema::Union(u) = merged else {
            panic!("expected union");
        };
        assert_eq!(u.variants.len(), 2);
        let string_variant = u
            .variants
            .iter()
            .find_map(|v| match v {
                Schema::Primitive(p) if p.kind == PrimitiveKind::String => Some(p),
                _ => None,
            })
            .unwrap();
        assert_eq!(string_variant.count, 2);
    }

    #[test]
    fn test_missing_field_becomes_optional() {
        let a = mapping(&[("id", Value::from(1)), ("name", Value::from("alice"))]);
        let b = mapping(&[("id", Value::from(2))]);
        let merged = merge(observe(&a), observe(&b));
        let Schema::Record(r) = merged else {
            panic!("expected record");
        };
        assert!(!r.fields["id"].is_optional());
        let Schema::Optional(o) = &r.fields["name"] else {
            panic!("expected optional name");
        };
        assert_eq!(o.present, 1);
        assert_eq!(o.absent, 1);
    }

    #[test]
    fn test_field_order_is_first_appearance() {
        let a = mapping(&[("x", Value::from(1))]);
        let b = mapping(&[("y", Value::from(2)), ("x", Value::from(3))]);
        let Schema::Record(r) = merge(observe(&a), observe(&b)) else {
            panic!("expected record");
        };
        let names: Vec<&str> = r.fields.keys().map(String::as_str).collect();
        assert_eq!(names, vec!["x", "y"]);
    }

    #[test]
    fn test_null_merges_into_optional() {
        let merged = merge(observe(&Value::from(7)), observe(&Value::Null));
        let Schema::Optional(o) = merged else {
            panic!("expected optional");
        };
        assert_eq!(o.present, 1);
        assert_eq!(o.absent, 1);
        assert!(matches!(*o.inner, Schema::Primitive(_)));
    }

    #[test]
    fn test_optional_never_nests() {
        let merged = merge(observe(&Value::Null), observe(&Value::Null));
        let merged = merge(merged, observe(&Value::from(1)));
        let Schema::Optional(o) = merged else {
            panic!("expected optional");
        };
        assert!(!o.inner.is_optional());
        assert_eq!(o.absent, 2);
        assert_eq!(o.present, 1);
    }

    #[test]
    fn test_record_vs_scalar_is_union() {
        let merged = merge(
            observe(&mapping(&[("a", Value::from(1))])),
            observe(&Value::from(2)),
        );
        assert!(matches!(merged, Schema::Union(_)));
    }

    #[test]
    fn test_sequence_bounds_union() {
        let a = Value::Sequence(vec![Value::from(1), Value::from(2)]);
        let b = Value::Sequence(vec![Value::from(5)]);
        let Schema::Sequence(s) = merge(observe(&a), observe(&b)) else {
            panic!("expected sequence");
        };
        assert_eq!(s.length.min, 1);
        assert_eq!(s.length.max, 2);
        assert_eq!(s.seen, 2);
    }

    #[test]
    fn test_merge_commutes_structurally() {
        let a = mapping(&[("id", Value::from(1)), ("name", Value::from("alice"))]);
        let b = mapping(&[("id", Value::from(2.5)), ("tag", Value::from("vip"))]);
        let ab = merge(observe(&a), observe(&b));
        let ba = merge(observe(&b), observe(&a));
        assert!(ab.same_shape(&ba));
    }
}
