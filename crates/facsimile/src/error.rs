//! Error types for the Facsimile library.

use std::path::PathBuf;
use thiserror::Error;

/// Main error type for Facsimile operations.
#[derive(Debug, Error)]
pub enum FacsimileError {
    /// Error reading or accessing a file.
    #[error("IO error for '{path}': {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Inference was asked to run over zero samples.
    #[error("Empty input: {0}")]
    EmptyInput(String),

    /// Error parsing or writing JSON.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Error from the CSV library.
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// Error parsing or writing XML.
    #[error("XML error: {0}")]
    Xml(String),

    /// File format not supported or not recognized.
    #[error("Unsupported format: {0}")]
    UnsupportedFormat(String),

    /// A value tree cannot be expressed in the target format.
    #[error("Unsupported shape: {0}")]
    UnsupportedShape(String),

    /// Generation requested against a schema with unresolved or empty
    /// constraints. Signals a logic bug in estimation rather than bad input.
    #[error("Invalid schema: {0}")]
    InvalidSchema(String),

    /// Configuration error.
    #[error("Configuration error: {0}")]
    Config(String),
}

impl From<quick_xml::Error> for FacsimileError {
    fn from(e: quick_xml::Error) -> Self {
        FacsimileError::Xml(e.to_string())
    }
}

/// Result type alias for Facsimile operations.
pub type Result<T> = std::result::Result<T, FacsimileError>;
