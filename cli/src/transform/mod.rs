//! Transformation module.
//!
//! This module turns the extract into canonical course sections:
//! - Fields: Org-unit remap and course id extraction
//! - Filter: Column projection and org-unit exclusion
//! - Grouper: Instructor consolidation, one row per section
//! - Pipeline: The stages in order

pub mod fields;
pub mod filter;
pub mod grouper;
pub mod pipeline;

pub use fields::{extract_plain_id, remap_org_unit, transform_all, transform_record, MalformedReference};
pub use filter::{exclude, project};
pub use grouper::{consolidate, Consolidation, SectionConflict};
pub use pipeline::{process_file, process_table, ProcessOutcome};
