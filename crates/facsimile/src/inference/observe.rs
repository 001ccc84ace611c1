//! Building a schema observation from a single value.

use crate::schema::{LengthBounds, PrimitiveSchema, RecordSchema, Schema, SequenceSchema};
use crate::value::Value;

use super::merge::merge;

/// Literals treated as missing values when lexical coercion is active.
/// CSV and XML deliver every scalar as text, so null-ness is a spelling
/// convention rather than a type.
pub(crate) fn is_null_like(value: &str) -> bool {
    let trimmed = value.trim();
    trimmed.is_empty()
        || trimmed.eq_ignore_ascii_case("na")
        || trimmed.eq_ignore_ascii_case("n/a")
        || trimmed.eq_ignore_ascii_case("null")
        || trimmed.eq_ignore_ascii_case("none")
        || trimmed.eq_ignore_ascii_case("nil")
        || trimmed == "."
        || trimmed == "-"
}

/// Schema describing exactly one observed value.
pub(crate) fn schema_of_value(value: &Value, coerce_strings: bool) -> Schema {
    match value {
        Value::Null => Schema::Unknown.into_optional(1),
        Value::Bool(_) => Schema::Primitive(PrimitiveSchema::bool()),
        Value::Number(n) => match n.as_i64() {
            Some(i) => Schema::Primitive(PrimitiveSchema::integer(i)),
            None => Schema::Primitive(PrimitiveSchema::float(n.as_f64())),
        },
        Value::String(s) if coerce_strings => coerced_schema(s),
        Value::String(s) => Schema::Primitive(PrimitiveSchema::string(s)),
        Value::Sequence(items) => {
            let element = items
                .iter()
                .map(|item| schema_of_value(item, coerce_strings))
                .reduce(merge)
                .map(Box::new);
            Schema::Sequence(SequenceSchema {
                element,
                length: LengthBounds::of(items.len()),
                seen: 1,
            })
        }
        Value::Mapping(entries) => {
            let fields = entries
                .iter()
                .map(|(name, v)| (name.clone(), schema_of_value(v, coerce_strings)))
                .collect();
            Schema::Record(RecordSchema { fields, seen: 1 })
        }
    }
}

/// Lexically classify a text scalar before observing it. Conflicting
/// classifications across samples resolve through ordinary merge widening,
/// so a column that mixes "3" and "3.5" ends up Float, and one that mixes
/// "3" and "abc" ends up a union.
fn coerced_schema(literal: &str) -> Schema {
    let trimmed = literal.trim();
    if is_null_like(trimmed) {
        return Schema::Unknown.into_optional(1);
    }
    if trimmed.eq_ignore_ascii_case("true") {
        return Schema::Primitive(PrimitiveSchema::bool());
    }
    if trimmed.eq_ignore_ascii_case("false") {
        return Schema::Primitive(PrimitiveSchema::bool());
    }
    if let Ok(i) = trimmed.parse::<i64>() {
        return Schema::Primitive(PrimitiveSchema::integer(i));
    }
    if let Ok(f) = trimmed.parse::<f64>() {
        if f.is_finite() && looks_numeric(trimmed) {
            return Schema::Primitive(PrimitiveSchema::float(f));
        }
    }
    Schema::Primitive(PrimitiveSchema::string(literal))
}

/// Guard against f64's permissive grammar ("inf", "NaN", "1e999").
fn looks_numeric(s: &str) -> bool {
    s.chars()
        .all(|c| c.is_ascii_digit() || matches!(c, '.' | '-' | '+' | 'e' | 'E'))
}
