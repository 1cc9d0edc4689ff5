//! Fold multi-instructor sections into one row per section.
//!
//! CUNYfirst lists a co-taught section once per instructor, every row sharing
//! the same `Class#`. Grouping joins the names and keeps the first row.
//!
//! # Architecture
//!
//! ```text
//! Transformed rows (one per instructor)    →  Consolidated rows
//! ┌──────────────────────────┐       ┌────────────────────────────────┐
//! │ Class#: 100, Name: Smith │       │ Class#: 100, Name: Smith/Jones │
//! │ Class#: 100, Name: Jones │  →    ├────────────────────────────────┤
//! │ Class#: 200, Name: Lee   │       │ Class#: 200, Name: Lee         │
//! └──────────────────────────┘       └────────────────────────────────┘
//! ```
//!
//! Names are appended in encounter order and never de-duplicated. All other
//! fields come from the first row seen for the key ("first wins"); later rows
//! that disagree are reported as [`SectionConflict`]s, not merged.

use std::collections::HashMap;

use serde::Serialize;

use crate::models::{ConsolidatedRecord, Field, TransformedRecord, INSTRUCTOR_DELIMITER};

/// A later row for a section whose value differs from the kept row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SectionConflict {
    pub class_number: String,
    pub field: &'static str,
    /// Line of the kept (first) row.
    pub first_line: usize,
    pub first: String,
    /// Line of the discarded row.
    pub line: usize,
    pub value: String,
}

/// Result of consolidation.
#[derive(Debug, Clone, Default)]
pub struct Consolidation {
    /// One row per section key, in first-seen order. Keyless rows pass
    /// through where they appeared.
    pub records: Vec<ConsolidatedRecord>,
    pub conflicts: Vec<SectionConflict>,
}

/// Group rows by section key, join instructor names, keep the first row.
///
/// Infallible: rows without a key were already checked to carry no
/// instructor and are passed through untouched.
pub fn consolidate(rows: Vec<TransformedRecord>) -> Consolidation {
    let mut slots: HashMap<String, usize> = HashMap::new();
    let mut kept: Vec<(TransformedRecord, Option<Vec<String>>)> = Vec::new();
    let mut conflicts = Vec::new();

    for record in rows {
        let Some(key) = record.row.section_key().map(str::to_string) else {
            kept.push((record, None));
            continue;
        };

        match slots.get(&key) {
            Some(&slot) => {
                let (first, names) = &mut kept[slot];
                conflicts.extend(compare(first, &record, &key));
                if let Some(names) = names {
                    names.push(record.row.instructor);
                }
            }
            None => {
                slots.insert(key, kept.len());
                let names = vec![record.row.instructor.clone()];
                kept.push((record, Some(names)));
            }
        }
    }

    let records = kept
        .into_iter()
        .map(|(TransformedRecord { line, mut row }, names)| {
            if let Some(names) = names {
                row.instructor = names.join(INSTRUCTOR_DELIMITER);
            }
            ConsolidatedRecord { line, row }
        })
        .collect();

    Consolidation { records, conflicts }
}

fn compare(first: &TransformedRecord, later: &TransformedRecord, key: &str) -> Vec<SectionConflict> {
    Field::ALL
        .into_iter()
        .filter(|f| *f != Field::InstructorName)
        .filter_map(|field| {
            let kept = first.row.value(field);
            let value = later.row.value(field);
            (kept != value).then(|| SectionConflict {
                class_number: key.to_string(),
                field: field.canonical_name(),
                first_line: first.line,
                first: kept.into_owned(),
                line: later.line,
                value: value.into_owned(),
            })
        })
        .collect()
}
