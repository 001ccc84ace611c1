//! Format adapters: raw bytes to Value trees and back.
//!
//! Adapters sit at the I/O boundary of the pipeline. Parsing produces the
//! sample set handed to inference; serialization renders generated values
//! in the same format. `parse`/`serialize` work on whole documents because
//! CSV headers and JSON arrays are document-level framing.

mod csv;
mod json;
mod xml;

pub use self::csv::CsvAdapter;
pub use self::json::JsonAdapter;
pub use self::xml::XmlAdapter;

use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::error::{FacsimileError, Result};
use crate::value::Value;

/// Supported serialization formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Format {
    Json,
    Xml,
    Csv,
}

impl Format {
    /// Detect the format from a file extension.
    pub fn from_path(path: &Path) -> Option<Format> {
        let ext = path.extension()?.to_str()?;
        match ext.to_ascii_lowercase().as_str() {
            "json" => Some(Format::Json),
            "xml" => Some(Format::Xml),
            "csv" | "tsv" => Some(Format::Csv),
            _ => None,
        }
    }

    /// Whether this format delivers scalars as untyped text, requiring
    /// lexical coercion during inference.
    pub fn coerces_strings(&self) -> bool {
        matches!(self, Format::Csv | Format::Xml)
    }
}

impl fmt::Display for Format {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Format::Json => "json",
            Format::Xml => "xml",
            Format::Csv => "csv",
        };
        f.write_str(name)
    }
}

impl FromStr for Format {
    type Err = FacsimileError;

    fn from_str(s: &str) -> Result<Format> {
        match s.to_ascii_lowercase().as_str() {
            "json" => Ok(Format::Json),
            "xml" => Ok(Format::Xml),
            "csv" | "tsv" => Ok(Format::Csv),
            other => Err(FacsimileError::UnsupportedFormat(other.to_string())),
        }
    }
}

/// Converts raw document bytes to sample values and generated values back
/// to document bytes.
pub trait FormatAdapter {
    /// Parse a document into its sample values.
    fn parse(&self, bytes: &[u8]) -> Result<Vec<Value>>;

    /// Render generated values as a document.
    fn serialize(&self, values: &[Value]) -> Result<Vec<u8>>;
}

/// Adapter with default settings for a format.
pub fn adapter_for(format: Format) -> Box<dyn FormatAdapter> {
    match format {
        Format::Json => Box::new(JsonAdapter::default()),
        Format::Xml => Box::new(XmlAdapter::default()),
        Format::Csv => Box::new(CsvAdapter::default()),
    }
}

/// Metadata about the source document a schema was inferred from.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SourceMetadata {
    /// File name without path.
    pub file: String,
    /// Full path to the file.
    pub path: PathBuf,
    /// SHA-256 hash of the document contents.
    pub hash: String,
    /// Document size in bytes.
    pub size_bytes: u64,
    /// Format the document was parsed as.
    pub format: Format,
    /// Number of samples contributed to inference.
    pub sample_count: usize,
    /// When the analysis was performed.
    pub analyzed_at: DateTime<Utc>,
}

impl SourceMetadata {
    /// Build metadata for a parsed document.
    pub fn new(path: PathBuf, bytes: &[u8], format: Format, sample_count: usize) -> Self {
        let mut hasher = Sha256::new();
        hasher.update(bytes);
        let hash = format!("sha256:{:x}", hasher.finalize());

        let file = path
            .file_name()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default();

        Self {
            file,
            path,
            hash,
            size_bytes: bytes.len() as u64,
            format,
            sample_count,
            analyzed_at: Utc::now(),
        }
    }
}

/// Textual rendering of a scalar value. None for Null and for nested
/// structures, which each format handles its own way.
pub(crate) fn scalar_text(value: &Value) -> Option<String> {
    match value {
        Value::Bool(b) => Some(b.to_string()),
        Value::Number(n) => Some(match n.as_i64() {
            Some(i) => i.to_string(),
            None => n.as_f64().to_string(),
        }),
        Value::String(s) => Some(s.clone()),
        Value::Null | Value::Sequence(_) | Value::Mapping(_) => None,
    }
}
