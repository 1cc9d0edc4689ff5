//! # Grizzly - CUNYfirst course extract processing
//!
//! Grizzly turns the CUNYfirst course-roster extract into one canonical row
//! per course section and submits the result to the Grizzly API.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────┐     ┌─────────────┐     ┌─────────────┐     ┌─────────────┐
//! │  .xlsx/CSV  │────▶│   Parser    │────▶│  Transform  │────▶│  Canonical  │
//! │  extract    │     │  (auto-enc) │     │ (consolid.) │     │  CSV + API  │
//! └─────────────┘     └─────────────┘     └─────────────┘     └─────────────┘
//! ```
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use grizzly::{config::Config, process_file, summarize, DEFAULT_GROUP_FIELDS};
//! use std::path::Path;
//!
//! let config = Config::load("config.json")?;
//! let outcome = process_file(&config, Path::new("out/extract.csv"))?;
//! println!("{}", summarize(&outcome.records, &DEFAULT_GROUP_FIELDS).render());
//! ```
//!
//! ## Modules
//!
//! - [`error`] - Hierarchical error types
//! - [`models`] - Course rows, fields, and pipeline records
//! - [`config`] - Run configuration
//! - [`validation`] - Configuration schema validation
//! - [`parser`] - Extract discovery and reading with auto-detection
//! - [`schema`] - Canonical schema binding and the output file
//! - [`transform`] - Field transforms, filtering, consolidation, and pipeline
//! - [`summary`] - Group-by counts
//! - [`api`] - Grizzly API client
//! - [`logs`] - Run log
//! - [`command`] - One full run, as the CLI performs it

// Core modules
pub mod error;
pub mod logs;
pub mod models;

// Configuration
pub mod config;
pub mod validation;

// Parsing
pub mod parser;
pub mod schema;

// Transformation
pub mod summary;
pub mod transform;

// HTTP API
pub mod api;

// Entry point
pub mod command;

// =============================================================================
// Re-exports - Error types
// =============================================================================

pub use error::{
    ApiError, ConfigError, PipelineError, PipelineResult, SourceError, TransformError, WriteError,
};

// =============================================================================
// Re-exports - Models
// =============================================================================

pub use models::{
    ConsolidatedRecord, CourseRow, Field, RawRecord, Record, TransformedRecord, CANONICAL_SCHEMA,
    INSTRUCTOR_DELIMITER,
};

// =============================================================================
// Re-exports - Parsing and schema
// =============================================================================

pub use parser::{
    detect_delimiter, detect_encoding, parse_bytes_auto, parse_file_auto, resolve_source,
    ParseResult, SourceSelection, SourceTable,
};
pub use schema::{bind, deserialize, rename, serialize};

// =============================================================================
// Re-exports - Transformation
// =============================================================================

pub use transform::{
    consolidate, exclude, extract_plain_id, process_file, process_table, project, remap_org_unit,
    ProcessOutcome,
};

// =============================================================================
// Re-exports - Summary, API, and runs
// =============================================================================

pub use api::GrizzlyClient;
pub use command::{run, RunOptions, RunReport};
pub use summary::{summarize, Summary, DEFAULT_GROUP_FIELDS};
