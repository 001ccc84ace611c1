//! Core type definitions for schema representation.

use chrono::NaiveDateTime;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

/// Primitive kind of a scalar schema node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PrimitiveKind {
    /// Boolean values (true/false).
    Bool,
    /// Whole numbers.
    Integer,
    /// Floating-point numbers.
    Float,
    /// Text values.
    String,
}

impl PrimitiveKind {
    /// Returns true if this kind is numeric.
    pub fn is_numeric(&self) -> bool {
        matches!(self, PrimitiveKind::Integer | PrimitiveKind::Float)
    }
}

/// Character class observed across the literals of a string node.
///
/// Used by the generator to synthesize replacement text of the same
/// coarse shape as the source.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CharClass {
    /// Letters only.
    Alpha,
    /// Decimal digits only.
    Digit,
    /// Letters and digits.
    Alphanumeric,
    /// Anything else (punctuation, whitespace, unicode).
    Mixed,
}

impl CharClass {
    /// Classify a single literal. The empty string classifies as Alpha;
    /// its length bounds make the choice irrelevant at generation time.
    pub fn of(s: &str) -> Self {
        if s.chars().all(|c| c.is_ascii_alphabetic()) {
            CharClass::Alpha
        } else if !s.is_empty() && s.chars().all(|c| c.is_ascii_digit()) {
            CharClass::Digit
        } else if s.chars().all(|c| c.is_ascii_alphanumeric()) {
            CharClass::Alphanumeric
        } else {
            CharClass::Mixed
        }
    }

    /// Widen this class to also cover another observation.
    pub fn widen(self, other: CharClass) -> CharClass {
        use CharClass::*;
        match (self, other) {
            (a, b) if a == b => a,
            (Mixed, _) | (_, Mixed) => Mixed,
            // Any combination of alpha/digit/alphanumeric stays alphanumeric.
            _ => Alphanumeric,
        }
    }
}

impl Default for CharClass {
    fn default() -> Self {
        CharClass::Mixed
    }
}

static DATE_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\d{4}-\d{2}-\d{2}$").unwrap());
static DATETIME_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\d{4}-\d{2}-\d{2}[T ]\d{2}:\d{2}:\d{2}$").unwrap());

/// Recognized string pattern at a node. When every observed literal matches
/// one of these, the generator synthesizes fresh timestamps instead of
/// random characters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StringPattern {
    /// ISO date: `YYYY-MM-DD`.
    Date,
    /// ISO datetime: `YYYY-MM-DDTHH:MM:SS` ('T' or space separator).
    DateTime,
}

impl StringPattern {
    /// Detect a pattern in a literal and parse its timestamp.
    /// Returns None for literals that match no pattern or fail to parse
    /// as a real calendar date.
    pub fn detect(s: &str) -> Option<(StringPattern, NaiveDateTime)> {
        if DATE_PATTERN.is_match(s) {
            let date = chrono::NaiveDate::parse_from_str(s, "%Y-%m-%d").ok()?;
            let ts = date.and_hms_opt(0, 0, 0)?;
            return Some((StringPattern::Date, ts));
        }
        if DATETIME_PATTERN.is_match(s) {
            let normalized = s.replacen(' ', "T", 1);
            let ts =
                NaiveDateTime::parse_from_str(&normalized, "%Y-%m-%dT%H:%M:%S").ok()?;
            return Some((StringPattern::DateTime, ts));
        }
        None
    }

    /// Format a timestamp in this pattern's textual shape.
    pub fn format(&self, ts: NaiveDateTime) -> String {
        match self {
            StringPattern::Date => ts.format("%Y-%m-%d").to_string(),
            StringPattern::DateTime => ts.format("%Y-%m-%dT%H:%M:%S").to_string(),
        }
    }

    /// Whether a literal conforms to this pattern.
    pub fn matches(&self, s: &str) -> bool {
        match self {
            StringPattern::Date => DATE_PATTERN.is_match(s),
            StringPattern::DateTime => DATETIME_PATTERN.is_match(s),
        }
    }
}
