//! Per-field transforms.
//!
//! Pure functions from one raw value to one normalized value, plus
//! [`transform_record`] which applies them to a whole record.

use std::collections::HashMap;

use thiserror::Error;

use crate::config::DataConfig;
use crate::error::{TransformError, TransformResult};
use crate::models::{RawRecord, TransformedRecord};

/// A course reference with fewer than three `_`-delimited segments.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("malformed course reference: '{0}'")]
pub struct MalformedReference(pub String);

/// Rename an org unit through the remap table; unmapped codes pass through.
///
/// Not a fixed point: if a mapped-to code is itself a key, a second
/// application moves it again.
pub fn remap_org_unit<'a>(code: &'a str, transforms: &'a HashMap<String, String>) -> &'a str {
    transforms.get(code).map(String::as_str).unwrap_or(code)
}

/// Extract the plain Blackboard course id from a course reference.
///
/// The id is the third `_`-delimited segment:
/// `blackboard_course_12345_xyz` yields `12345`. The references look like
/// URLs but only the embedded token matters.
pub fn extract_plain_id(reference: &str) -> Result<&str, MalformedReference> {
    reference
        .split('_')
        .nth(2)
        .ok_or_else(|| MalformedReference(reference.to_string()))
}

/// Remap the org unit and extract the course id of one record.
pub fn transform_record(raw: RawRecord, data: &DataConfig) -> TransformResult<TransformedRecord> {
    let RawRecord { line, mut row } = raw;

    row.course_reference = extract_plain_id(&row.course_reference)
        .map_err(|e| TransformError::MalformedReference {
            line,
            reference: e.0,
        })?
        .to_string();
    row.acad_org = remap_org_unit(&row.acad_org, &data.acad_org_transforms).to_string();

    Ok(TransformedRecord { line, row })
}

/// Transform every record, stopping at the first malformed reference.
pub fn transform_all(
    records: Vec<RawRecord>,
    data: &DataConfig,
) -> TransformResult<Vec<TransformedRecord>> {
    records
        .into_iter()
        .map(|r| transform_record(r, data))
        .collect()
}
