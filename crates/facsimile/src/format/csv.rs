//! CSV adapter with delimiter detection.
//!
//! Each row becomes a Record value keyed by the header names, with every
//! cell typed String; numeric/boolean coercion happens during inference.
//! Serialization writes the union of generated field names as the header,
//! in first-appearance order.

use std::io::BufRead;

use indexmap::IndexMap;
use tracing::debug;

use crate::error::{FacsimileError, Result};
use crate::value::Value;

use super::{scalar_text, FormatAdapter};

/// Delimiters to try when auto-detecting.
const DELIMITERS: &[u8] = &[b'\t', b',', b';', b'|'];

/// Parses and renders delimited tabular documents.
pub struct CsvAdapter {
    /// Delimiter to use (None = auto-detect on parse, comma on serialize).
    pub delimiter: Option<u8>,
    /// Quote character.
    pub quote: u8,
}

impl Default for CsvAdapter {
    fn default() -> Self {
        Self {
            delimiter: None,
            quote: b'"',
        }
    }
}

impl FormatAdapter for CsvAdapter {
    fn parse(&self, bytes: &[u8]) -> Result<Vec<Value>> {
        let delimiter = match self.delimiter {
            Some(d) => d,
            None => detect_delimiter(bytes)?,
        };

        let mut reader = csv::ReaderBuilder::new()
            .delimiter(delimiter)
            .quote(self.quote)
            .flexible(true)
            .from_reader(bytes);

        let headers: Vec<String> = reader.headers()?.iter().map(|s| s.to_string()).collect();
        if headers.is_empty() {
            return Err(FacsimileError::EmptyInput("no columns found".to_string()));
        }

        let mut samples = Vec::new();
        for result in reader.records() {
            let record = result?;
            let mut cells: Vec<String> = record.iter().map(|s| s.to_string()).collect();
            // Pad short rows, drop spillover beyond the header width.
            cells.resize(headers.len(), String::new());

            let fields: IndexMap<String, Value> = headers
                .iter()
                .cloned()
                .zip(cells.into_iter().map(Value::String))
                .collect();
            samples.push(Value::Mapping(fields));
        }

        if samples.is_empty() {
            return Err(FacsimileError::EmptyInput("no data rows found".to_string()));
        }
        debug!(rows = samples.len(), columns = headers.len(), "parsed CSV document");
        Ok(samples)
    }

    fn serialize(&self, values: &[Value]) -> Result<Vec<u8>> {
        // Header is the union of field names, in first-appearance order.
        let mut headers: Vec<String> = Vec::new();
        for value in values {
            let Value::Mapping(fields) = value else {
                return Err(FacsimileError::UnsupportedShape(format!(
                    "CSV rows must be flat records, got {}",
                    value.kind_name()
                )));
            };
            for key in fields.keys() {
                if !headers.iter().any(|h| h == key) {
                    headers.push(key.clone());
                }
            }
        }

        let mut writer = csv::WriterBuilder::new()
            .delimiter(self.delimiter.unwrap_or(b','))
            .quote(self.quote)
            .from_writer(Vec::new());

        writer.write_record(&headers)?;
        for value in values {
            let Value::Mapping(fields) = value else {
                unreachable!("checked above");
            };
            let mut row = Vec::with_capacity(headers.len());
            for header in &headers {
                let cell = match fields.get(header) {
                    None | Some(Value::Null) => String::new(),
                    Some(scalar) => scalar_text(scalar).ok_or_else(|| {
                        FacsimileError::UnsupportedShape(format!(
                            "CSV cell '{header}' holds a nested {}",
                            scalar.kind_name()
                        ))
                    })?,
                };
                row.push(cell);
            }
            writer.write_record(&row)?;
        }

        writer
            .into_inner()
            .map_err(|e| FacsimileError::UnsupportedShape(e.to_string()))
    }
}

/// Detect the delimiter by analyzing the first few lines: the candidate
/// with the highest consistent per-line count wins, with a slight bonus
/// for tab since it rarely appears in actual data.
fn detect_delimiter(bytes: &[u8]) -> Result<u8> {
    let lines: Vec<String> = bytes
        .lines()
        .take(10)
        .map_while(|l| l.ok())
        .filter(|l| !l.trim().is_empty())
        .collect();

    if lines.is_empty() {
        return Err(FacsimileError::EmptyInput("no lines to analyze".to_string()));
    }

    let mut best_delimiter = b',';
    let mut best_score = 0usize;

    for &delim in DELIMITERS {
        let counts: Vec<usize> = lines
            .iter()
            .map(|line| count_delimiter_in_line(line, delim))
            .collect();

        let first_count = counts[0];
        if first_count == 0 {
            continue;
        }

        let consistent = counts.iter().all(|&c| c == first_count);
        let score = if consistent {
            first_count * 1000 + (if delim == b'\t' { 100 } else { 0 })
        } else {
            first_count
        };

        if score > best_score {
            best_score = score;
            best_delimiter = delim;
        }
    }

    Ok(best_delimiter)
}

/// Count delimiter occurrences in a line, respecting quotes.
fn count_delimiter_in_line(line: &str, delimiter: u8) -> usize {
    let delim_char = delimiter as char;
    let mut count = 0;
    let mut in_quotes = false;

    for ch in line.chars() {
        match ch {
            '"' => in_quotes = !in_quotes,
            c if c == delim_char && !in_quotes => count += 1,
            _ => {}
        }
    }

    count
}
