//! Format-agnostic value tree.
//!
//! Every supported input format parses into this representation and every
//! generated instance is built from it. Values are tree-shaped by
//! construction: no sharing, no cycles.

use indexmap::IndexMap;

/// A numeric value with float64 semantics that remembers whether it
/// originated from a whole number. The distinction drives Integer vs Float
/// schema inference.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Number {
    value: f64,
    integral: bool,
}

impl Number {
    /// Create a number from a whole-number source.
    pub fn from_i64(value: i64) -> Self {
        Self {
            value: value as f64,
            integral: true,
        }
    }

    /// Create a number from a fractional source.
    pub fn from_f64(value: f64) -> Self {
        Self {
            value,
            integral: false,
        }
    }

    /// The numeric value.
    pub fn as_f64(&self) -> f64 {
        self.value
    }

    /// Whether the source literal was a whole number.
    pub fn is_integral(&self) -> bool {
        self.integral
    }

    /// The value as an integer, when it originated from one.
    pub fn as_i64(&self) -> Option<i64> {
        self.integral.then_some(self.value as i64)
    }
}

/// A single structured value in the common intermediate form.
///
/// Mapping keys are unique and ordered; insertion order is the order the
/// source format presented them in.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Null,
    Bool(bool),
    Number(Number),
    String(String),
    Sequence(Vec<Value>),
    Mapping(IndexMap<String, Value>),
}

impl Value {
    /// Short name of the variant, for diagnostics.
    pub fn kind_name(&self) -> &'static str {
        match self {
            Value::Null => "null",
            Value::Bool(_) => "bool",
            Value::Number(_) => "number",
            Value::String(_) => "string",
            Value::Sequence(_) => "sequence",
            Value::Mapping(_) => "mapping",
        }
    }

    /// Whether this is the null value.
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// Borrow the string content, if any.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s.as_str()),
            _ => None,
        }
    }

    /// Borrow the mapping content, if any.
    pub fn as_mapping(&self) -> Option<&IndexMap<String, Value>> {
        match self {
            Value::Mapping(m) => Some(m),
            _ => None,
        }
    }

    /// Maximum nesting depth of the tree. A scalar has depth 1.
    pub fn depth(&self) -> usize {
        match self {
            Value::Sequence(items) => {
                1 + items.iter().map(Value::depth).max().unwrap_or(0)
            }
            Value::Mapping(fields) => {
                1 + fields.values().map(Value::depth).max().unwrap_or(0)
            }
            _ => 1,
        }
    }
}

impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Value::Number(Number::from_i64(v))
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Value::Number(Number::from_f64(v))
    }
}

impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Value::Bool(v)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Value::String(v.to_string())
    }
}
