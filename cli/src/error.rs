//! Error types for the Grizzly import pipeline.
//!
//! One enum per layer:
//!
//! - [`ConfigError`] - Configuration loading and validation
//! - [`SourceError`] - Locating and reading the course extract
//! - [`TransformError`] - Projection, binding, and field transforms
//! - [`WriteError`] - Persisting the processed file
//! - [`ApiError`] - Grizzly API calls
//! - [`PipelineError`] - Top-level run errors
//!
//! Error conversion is automatic via `From` implementations,
//! allowing `?` to work across error boundaries.

use std::path::PathBuf;

use reqwest::StatusCode;
use thiserror::Error;

use crate::models::Field;

// =============================================================================
// Configuration Errors
// =============================================================================

/// Errors while loading the configuration document.
///
/// All of these are fatal and happen before any processing starts.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The configuration file does not exist.
    #[error("Configuration file not found: {}", .0.display())]
    NotFound(PathBuf),

    /// The configuration file exists but could not be read.
    #[error("Failed to read configuration file {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The document is not valid JSON or does not match the config types.
    #[error("Invalid configuration JSON: {0}")]
    Json(#[from] serde_json::Error),

    /// The document failed schema validation.
    #[error("Invalid configuration: {}", .errors.join("; "))]
    Invalid { errors: Vec<String> },

    /// A credential is needed but neither the document nor the environment provides it.
    #[error("Missing credential: {0}")]
    MissingCredential(String),
}

// =============================================================================
// Source Errors
// =============================================================================

/// Errors while locating, converting, or reading the course extract.
#[derive(Debug, Error)]
pub enum SourceError {
    /// Failed to read or write a file.
    #[error("I/O error on {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Malformed delimited text.
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// The spreadsheet could not be opened or read.
    #[error("Spreadsheet error in {}: {message}", .path.display())]
    Spreadsheet { path: PathBuf, message: String },

    /// The extract has no rows at all.
    #[error("Extract is empty")]
    EmptyFile,

    /// The extract has no header row.
    #[error("No headers found in extract")]
    NoHeaders,

    /// The term data directory does not exist.
    #[error("Could not access the data directory at {}", .0.display())]
    NoDataDirectory(PathBuf),

    /// The term data directory holds no `.xlsx` extract.
    #[error("No .xlsx extract found in {}", .0.display())]
    NoDataFile(PathBuf),
}

// =============================================================================
// Transformation Errors
// =============================================================================

/// Errors raised while turning the extract into course records.
#[derive(Debug, Error)]
pub enum TransformError {
    /// A requested column is not in the source schema.
    #[error("Unknown column: {0}")]
    UnknownColumn(String),

    /// Two projected columns resolve to the same course field.
    #[error("Column '{column}' resolves to {}, which another column already provides", .field.canonical_name())]
    DuplicateField { column: String, field: Field },

    /// A row or header does not have as many fields as the target schema.
    #[error("Schema arity mismatch{}: expected {expected} fields, found {found}", line_suffix(.line))]
    SchemaArityMismatch {
        line: Option<usize>,
        expected: usize,
        found: usize,
    },

    /// The external course reference has fewer than three `_` segments.
    #[error("Malformed course reference on line {line}: '{reference}'")]
    MalformedReference { line: usize, reference: String },

    /// A date cell could not be parsed.
    #[error("Invalid date in column '{}' on line {line}: '{value}'", .field.canonical_name())]
    InvalidDate {
        line: usize,
        field: Field,
        value: String,
    },

    /// A row names an instructor but carries no section key.
    #[error("Missing section key (Class#) on line {line}")]
    MissingSectionKey { line: usize },
}

fn line_suffix(line: &Option<usize>) -> String {
    line.map(|l| format!(" on line {l}")).unwrap_or_default()
}

// =============================================================================
// Write Errors
// =============================================================================

/// Errors while persisting the processed file.
///
/// Output is staged in a temporary sibling, so none of these leave a
/// partially written file at the destination.
#[derive(Debug, Error)]
pub enum WriteError {
    /// Failed to create the staging file or its directory.
    #[error("Failed to write {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Failed to encode a row.
    #[error("Failed to encode row: {0}")]
    Csv(#[from] csv::Error),
}

// =============================================================================
// API Errors
// =============================================================================

/// Errors from the Grizzly API.
#[derive(Debug, Error)]
pub enum ApiError {
    /// The HTTP client could not be built.
    #[error("Failed to build HTTP client: {0}")]
    Client(#[source] reqwest::Error),

    /// The request never produced a response.
    #[error("HTTP request to {url} failed: {source}")]
    Http {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    /// Login returned a non-2xx status.
    #[error("We did not successfully login to API ({status}): {body}")]
    Authentication { status: StatusCode, body: String },

    /// Login succeeded but the response carried no token.
    #[error("Invalid login response: {0}")]
    InvalidResponse(String),

    /// An authenticated call was attempted before logging in.
    #[error("Not logged in")]
    NotAuthenticated,

    /// A read endpoint returned a non-2xx status.
    #[error("Request to {url} failed ({status}): {body}")]
    Request {
        url: String,
        status: StatusCode,
        body: String,
    },

    /// Section ingestion returned a non-2xx status.
    #[error("Section submission rejected ({status}): {body}")]
    Submission { status: StatusCode, body: String },
}

// =============================================================================
// Pipeline Errors (top-level)
// =============================================================================

/// Top-level errors for a run.
///
/// Wraps every lower-level error so the CLI can report any of them uniformly.
#[derive(Debug, Error)]
pub enum PipelineError {
    /// Configuration error.
    #[error("Config error: {0}")]
    Config(#[from] ConfigError),

    /// Source error.
    #[error("Source error: {0}")]
    Source(#[from] SourceError),

    /// Transformation error.
    #[error("Transform error: {0}")]
    Transform(#[from] TransformError),

    /// Write error.
    #[error("Write error: {0}")]
    Write(#[from] WriteError),

    /// API error.
    #[error("API error: {0}")]
    Api(#[from] ApiError),
}

// =============================================================================
// Result Type Aliases
// =============================================================================

/// Result type for configuration loading.
pub type ConfigResult<T> = Result<T, ConfigError>;

/// Result type for source operations.
pub type SourceResult<T> = Result<T, SourceError>;

/// Result type for transformation operations.
pub type TransformResult<T> = Result<T, TransformError>;

/// Result type for writing the processed file.
pub type WriteResult<T> = Result<T, WriteError>;

/// Result type for API operations.
pub type ApiResult<T> = Result<T, ApiError>;

/// Result type for pipeline operations.
pub type PipelineResult<T> = Result<T, PipelineError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_conversion_chain() {
        let source_err = SourceError::EmptyFile;
        let pipeline_err: PipelineError = source_err.into();
        assert!(pipeline_err.to_string().contains("empty"));

        let transform_err = TransformError::UnknownColumn("Class#".into());
        let pipeline_err: PipelineError = transform_err.into();
        assert!(pipeline_err.to_string().contains("Class#"));
    }

    #[test]
    fn test_malformed_reference_names_row() {
        let err = TransformError::MalformedReference {
            line: 7,
            reference: "nope".into(),
        };
        let msg = err.to_string();
        assert!(msg.contains("line 7"));
        assert!(msg.contains("nope"));
    }

    #[test]
    fn test_arity_mismatch_format() {
        let header = TransformError::SchemaArityMismatch {
            line: None,
            expected: 13,
            found: 12,
        };
        assert_eq!(
            header.to_string(),
            "Schema arity mismatch: expected 13 fields, found 12"
        );

        let row = TransformError::SchemaArityMismatch {
            line: Some(4),
            expected: 13,
            found: 14,
        };
        assert!(row.to_string().contains("on line 4"));
    }

    #[test]
    fn test_invalid_date_uses_canonical_name() {
        let err = TransformError::InvalidDate {
            line: 3,
            field: Field::EndDate,
            value: "someday".into(),
        };
        assert!(err.to_string().contains("end_date"));
    }
}
