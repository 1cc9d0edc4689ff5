//! High-level pipeline: extract in, canonical file out.
//!
//! Stages run in a fixed order with no branching or retry:
//!
//! 1. Project to the configured columns
//! 2. Bind typed records, matching columns to fields by header
//! 3. Exclude configured org units
//! 4. Remap org units and extract course ids
//! 5. Consolidate instructors, one row per section
//! 6. Serialize (only in [`process_file`])
//!
//! Any failure aborts the run before the output file is touched.
//!
//! # Example
//!
//! ```rust,ignore
//! use grizzly::config::Config;
//! use grizzly::transform::process_file;
//! use std::path::Path;
//!
//! let config = Config::load("config.json")?;
//! let outcome = process_file(&config, Path::new("out/extract.csv"))?;
//! println!("{} sections", outcome.records.len());
//! ```

use std::path::{Path, PathBuf};

use super::fields::transform_all;
use super::filter::{exclude, project};
use super::grouper::{consolidate, SectionConflict};
use crate::config::{Config, DataConfig};
use crate::error::{PipelineResult, TransformResult};
use crate::logs::{log_info, log_info_indent, log_success, log_warning, log_warning_indent};
use crate::models::{ConsolidatedRecord, Field};
use crate::parser::{is_spreadsheet, parse_file_auto, read_xlsx, SourceTable};
use crate::schema::{bind, serialize};

/// Result of one pipeline run.
#[derive(Debug, Clone)]
pub struct ProcessOutcome {
    /// One row per section, in first-seen order.
    pub records: Vec<ConsolidatedRecord>,
    /// Fields where a dropped duplicate row disagreed with the kept one.
    pub conflicts: Vec<SectionConflict>,
    /// Data rows read from the extract.
    pub read: usize,
    /// Rows dropped by org-unit exclusion.
    pub excluded: usize,
    /// Where the canonical file was written, if it was.
    pub output: Option<PathBuf>,
}

/// Run the pure stages over an in-memory extract.
///
/// Nothing is written; see [`process_file`] for the full run.
pub fn process_table(table: &SourceTable, data: &DataConfig) -> TransformResult<ProcessOutcome> {
    let raw = bind(project(table, &data.columns)?)?;
    let read = raw.len();

    let kept = exclude(raw, Field::AcadOrg, &data.acad_orgs_to_remove);
    let excluded = read - kept.len();
    log_info(format!(
        "Removed records from acad orgs: {}",
        join_set(data.acad_orgs_to_remove.iter())
    ));
    if excluded > 0 {
        log_info_indent(format!("{} rows dropped", excluded), 1);
    }

    let transformed = transform_all(kept, data)?;
    let mut remaps: Vec<String> = data
        .acad_org_transforms
        .iter()
        .map(|(from, to)| format!("{from} → {to}"))
        .collect();
    remaps.sort();
    log_info(format!("Remapped programs: {}", join_set(remaps.iter())));

    let mut programs: Vec<&str> = transformed.iter().map(|r| r.row.acad_org.as_str()).collect();
    programs.sort_unstable();
    programs.dedup();
    log_info(format!("Number of unique programs: {}", programs.len()));
    log_info("Extracted BB course IDs from URLs");

    let consolidation = consolidate(transformed);
    log_info("Collected instructor names");
    log_info("Updated instructor names for courses with multiple instructors");
    log_info("Removed duplicate course records");
    log_success(format!("{} course sections", consolidation.records.len()));

    if !consolidation.conflicts.is_empty() {
        log_warning(format!(
            "{} fields differ between duplicate rows (first row kept)",
            consolidation.conflicts.len()
        ));
        for c in consolidation.conflicts.iter().take(10) {
            log_warning_indent(
                format!(
                    "Class# {} {}: '{}' (line {}) kept, '{}' (line {}) dropped",
                    c.class_number, c.field, c.first, c.first_line, c.value, c.line
                ),
                1,
            );
        }
    }

    Ok(ProcessOutcome {
        records: consolidation.records,
        conflicts: consolidation.conflicts,
        read,
        excluded,
        output: None,
    })
}

/// Read an extract, process it, and write the canonical file to
/// [`Config::processed_path`].
pub fn process_file(config: &Config, source: &Path) -> PipelineResult<ProcessOutcome> {
    let table = read_source(source)?;
    log_success("Successfully opened raw data for processing & cleaning");
    log_info_indent(format!("{} rows, {} columns", table.len(), table.headers.len()), 1);

    let mut outcome = process_table(&table, &config.data)?;

    let dest = config.processed_path();
    serialize(&outcome.records, &dest)?;
    log_success(format!("Saved processed file as: {}", dest.display()));

    outcome.output = Some(dest);
    Ok(outcome)
}

fn read_source(path: &Path) -> PipelineResult<SourceTable> {
    if is_spreadsheet(path) {
        return Ok(read_xlsx(path)?);
    }
    let parsed = parse_file_auto(path)?;
    log_info(format!(
        "Detected encoding {} and separator '{}'",
        parsed.encoding.name(),
        format_delimiter(parsed.delimiter)
    ));
    Ok(parsed.table)
}

fn join_set<'a>(items: impl Iterator<Item = &'a String>) -> String {
    let items: Vec<&str> = items.map(String::as_str).collect();
    if items.is_empty() {
        "(none)".to_string()
    } else {
        items.join(", ")
    }
}

fn format_delimiter(d: char) -> &'static str {
    match d {
        ';' => ";",
        ',' => ",",
        '\t' => "TAB",
        '|' => "|",
        _ => "?",
    }
}
