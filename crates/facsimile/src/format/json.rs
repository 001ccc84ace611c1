//! JSON adapter built on serde_json.
//!
//! A top-level array is treated as a set of samples; any other root is a
//! single sample. serde_json is configured with `preserve_order` so mapping
//! keys keep their document order end-to-end.

use indexmap::IndexMap;
use tracing::debug;

use crate::error::Result;
use crate::value::{Number, Value};

use super::FormatAdapter;

/// Parses and renders JSON documents.
pub struct JsonAdapter {
    /// Pretty-print serialized output.
    pub pretty: bool,
}

impl Default for JsonAdapter {
    fn default() -> Self {
        Self { pretty: true }
    }
}

impl FormatAdapter for JsonAdapter {
    fn parse(&self, bytes: &[u8]) -> Result<Vec<Value>> {
        let root: serde_json::Value = serde_json::from_slice(bytes)?;
        let samples = match root {
            serde_json::Value::Array(items) => items.iter().map(from_json).collect(),
            other => vec![from_json(&other)],
        };
        debug!(samples = samples.len(), "parsed JSON document");
        Ok(samples)
    }

    fn serialize(&self, values: &[Value]) -> Result<Vec<u8>> {
        let doc = match values {
            [single] => to_json(single),
            many => serde_json::Value::Array(many.iter().map(to_json).collect()),
        };
        let bytes = if self.pretty {
            serde_json::to_vec_pretty(&doc)?
        } else {
            serde_json::to_vec(&doc)?
        };
        Ok(bytes)
    }
}

fn from_json(v: &serde_json::Value) -> Value {
    match v {
        serde_json::Value::Null => Value::Null,
        serde_json::Value::Bool(b) => Value::Bool(*b),
        serde_json::Value::Number(n) => match n.as_i64() {
            Some(i) => Value::Number(Number::from_i64(i)),
            None => Value::Number(Number::from_f64(n.as_f64().unwrap_or(0.0))),
        },
        serde_json::Value::String(s) => Value::String(s.clone()),
        serde_json::Value::Array(items) => {
            Value::Sequence(items.iter().map(from_json).collect())
        }
        serde_json::Value::Object(entries) => Value::Mapping(
            entries
                .iter()
                .map(|(k, v)| (k.clone(), from_json(v)))
                .collect::<IndexMap<String, Value>>(),
        ),
    }
}

fn to_json(v: &Value) -> serde_json::Value {
    match v {
        Value::Null => serde_json::Value::Null,
        Value::Bool(b) => serde_json::Value::Bool(*b),
        Value::Number(n) => match n.as_i64() {
            Some(i) => serde_json::Value::Number(i.into()),
            None => serde_json::Number::from_f64(n.as_f64())
                .map(serde_json::Value::Number)
                .unwrap_or(serde_json::Value::Null),
        },
        Value::String(s) => serde_json::Value::String(s.clone()),
        Value::Sequence(items) => {
            serde_json::Value::Array(items.iter().map(to_json).collect())
        }
        Value::Mapping(entries) => serde_json::Value::Object(
            entries
                .iter()
                .map(|(k, v)| (k.clone(), to_json(v)))
                .collect(),
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_array_as_samples() {
        let adapter = JsonAdapter::default();
        let samples = adapter.parse(br#"[{"a": 1}, {"a": 2}]"#).unwrap();
        assert_eq!(samples.len(), 2);
        assert!(matches!(samples[0], Value::Mapping(_)));
    }

    #[test]
    fn test_parse_object_as_single_sample() {
        let adapter = JsonAdapter::default();
        let samples = adapter.parse(br#"{"a": 1}"#).unwrap();
        assert_eq!(samples.len(), 1);
    }

    #[test]
    fn test_number_origin_preserved() {
        let adapter = JsonAdapter::default();
        let samples = adapter.parse(br#"[1, 1.5]"#).unwrap();
        let Value::Number(a) = &samples[0] else {
            panic!("expected number");
        };
        let Value::Number(b) = &samples[1] else {
            panic!("expected number");
        };
        assert!(a.is_integral());
        assert!(!b.is_integral());
    }

    #[test]
    fn test_key_order_round_trips() {
        let adapter = JsonAdapter { pretty: false };
        let samples = adapter.parse(br#"{"zebra": 1, "apple": 2}"#).unwrap();
        let out = adapter.serialize(&samples).unwrap();
        let text = String::from_utf8(out).unwrap();
        assert!(text.find("zebra").unwrap() < text.find("apple").unwrap());
    }

    #[test]
    fn test_serialize_many_as_array() {
        let adapter = JsonAdapter { pretty: false };
        let out = adapter
            .serialize(&[Value::from(1), Value::from(2)])
            .unwrap();
        assert_eq!(out, b"[1,2]");
    }

    #[test]
    fn test_malformed_input_fails() {
        let adapter = JsonAdapter::default();
        assert!(adapter.parse(b"{not json").is_err());
    }
}
