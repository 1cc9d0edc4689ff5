//! Canonical schema binding.
//!
//! Each projected column is matched to a course [`Field`] by its header, so
//! the configured column order does not change which values land where.
//! Rows are then bound into typed [`RawRecord`]s. The [`output`] submodule
//! writes and re-reads the canonical artifact, whose header is
//! [`CANONICAL_SCHEMA`].
//!
//! ```text
//! SourceTable (configured columns, any order)
//!        │ column_fields   header → Field, positional for unknown headers
//!        │ rename          to canonical names, arity-checked
//!        ▼
//! SourceTable (canonical headers)
//!        │ bind            dates parsed, section key checked
//!        ▼
//! Vec<RawRecord>
//! ```

pub mod dates;
pub mod output;

use crate::error::{TransformError, TransformResult};
use crate::logs::log_warning;
use crate::models::{CourseRow, Field, RawRecord, CANONICAL_SCHEMA};
use crate::parser::SourceTable;

pub use dates::{parse_date, DATE_FORMAT};
pub use output::{deserialize, serialize};

/// Rename a table's columns to `target`, by position.
///
/// The header and every row must have exactly `target.len()` fields.
pub fn rename(table: SourceTable, target: &[&str]) -> TransformResult<SourceTable> {
    if table.headers.len() != target.len() {
        return Err(TransformError::SchemaArityMismatch {
            line: None,
            expected: target.len(),
            found: table.headers.len(),
        });
    }
    if let Some(row) = table.rows.iter().find(|r| r.values.len() != target.len()) {
        return Err(TransformError::SchemaArityMismatch {
            line: Some(row.line),
            expected: target.len(),
            found: row.values.len(),
        });
    }

    Ok(SourceTable {
        headers: target.iter().map(|name| name.to_string()).collect(),
        rows: table.rows,
    })
}

/// The course field each column holds.
///
/// Extract headers and canonical names are matched by name. Columns with any
/// other header take the fields left unclaimed, in canonical order, so a
/// table with no recognizable headers is renamed purely by position.
pub fn column_fields(headers: &[String]) -> TransformResult<Vec<Field>> {
    if headers.len() != CANONICAL_SCHEMA.len() {
        return Err(TransformError::SchemaArityMismatch {
            line: None,
            expected: CANONICAL_SCHEMA.len(),
            found: headers.len(),
        });
    }

    let mut named: Vec<Option<Field>> = Vec::with_capacity(headers.len());
    for header in headers {
        let field = Field::from_source_header(header).or_else(|| Field::from_canonical(header));
        if let Some(field) = field {
            if named.contains(&Some(field)) {
                return Err(TransformError::DuplicateField {
                    column: header.clone(),
                    field,
                });
            }
        }
        named.push(field);
    }

    let unclaimed: Vec<Field> = Field::ALL
        .into_iter()
        .filter(|f| !named.contains(&Some(*f)))
        .collect();
    let mut unclaimed = unclaimed.into_iter();
    let mut fields = Vec::with_capacity(headers.len());
    for (header, field) in headers.iter().zip(named) {
        let field = match field {
            Some(field) => field,
            None => {
                // Arity is checked above and names are distinct, so one is left.
                let field = unclaimed
                    .next()
                    .ok_or_else(|| TransformError::UnknownColumn(header.clone()))?;
                log_warning(format!(
                    "Column '{}' is not a known extract header; read as {} by position",
                    header,
                    field.canonical_name()
                ));
                field
            }
        };
        fields.push(field);
    }
    Ok(fields)
}

/// Bind a projected table into raw records.
///
/// Columns are matched to fields by [`column_fields`]. Date cells are
/// parsed; a blank date is absent. A row that names an instructor without a
/// `Class#` is rejected.
pub fn bind(table: SourceTable) -> TransformResult<Vec<RawRecord>> {
    let fields = column_fields(&table.headers)?;
    let names: Vec<&str> = fields.iter().map(|f| f.canonical_name()).collect();
    let table = rename(table, &names)?;

    table
        .rows
        .into_iter()
        .map(|source| {
            let line = source.line;
            let mut row = CourseRow::default();
            for (field, value) in fields.iter().copied().zip(source.values) {
                set_field(&mut row, field, value, line)?;
            }
            if row.section_key().is_none() && !row.instructor.trim().is_empty() {
                return Err(TransformError::MissingSectionKey { line });
            }
            Ok(RawRecord { line, row })
        })
        .collect()
}

fn set_field(row: &mut CourseRow, field: Field, value: String, line: usize) -> TransformResult<()> {
    let slot = match field {
        Field::AcadOrg => &mut row.acad_org,
        Field::Session => &mut row.session,
        Field::Term => &mut row.term,
        Field::ClassStatus => &mut row.status,
        Field::Subject => &mut row.subject,
        Field::CatalogNumber => &mut row.catalog_number,
        Field::Section => &mut row.section_number,
        Field::Title => &mut row.title,
        Field::ClassNumber => &mut row.class_number,
        Field::InstructorName => &mut row.instructor,
        Field::CourseReference => &mut row.course_reference,
        Field::StartDate | Field::EndDate => {
            let date = if value.trim().is_empty() {
                None
            } else {
                Some(parse_date(&value).ok_or_else(|| TransformError::InvalidDate {
                    line,
                    field,
                    value: value.clone(),
                })?)
            };
            if field == Field::StartDate {
                row.start_date = date;
            } else {
                row.end_date = date;
            }
            return Ok(());
        }
    };
    *slot = value;
    Ok(())
}
