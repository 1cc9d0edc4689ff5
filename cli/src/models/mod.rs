//! Domain models for the course import pipeline.
//!
//! - [`Field`] - The 13 course columns, with source and canonical names
//! - [`CourseRow`] - One course section's values, serialized in canonical order
//! - [`RawRecord`], [`TransformedRecord`], [`ConsolidatedRecord`] - The row at
//!   each pipeline stage
//! - [`Record`] - Read access shared by every stage

use std::borrow::Cow;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Delimiter placed between instructor names of a co-taught section.
pub const INSTRUCTOR_DELIMITER: &str = "/";

/// Output header, in the fixed order the Grizzly API ingests.
pub const CANONICAL_SCHEMA: [&str; 13] = [
    "acad_org",
    "session",
    "cf_term_id",
    "cf_status",
    "course_subject",
    "course_number",
    "section_number",
    "course_title",
    "cf_course_id",
    "instructor_name",
    "start_date",
    "end_date",
    "bb_course_id",
];

// =============================================================================
// Field
// =============================================================================

/// A course column.
///
/// Variants are declared in canonical output order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Field {
    AcadOrg,
    Session,
    Term,
    ClassStatus,
    Subject,
    CatalogNumber,
    Section,
    Title,
    ClassNumber,
    InstructorName,
    StartDate,
    EndDate,
    CourseReference,
}

impl Field {
    /// Every field, in canonical order.
    pub const ALL: [Field; 13] = [
        Field::AcadOrg,
        Field::Session,
        Field::Term,
        Field::ClassStatus,
        Field::Subject,
        Field::CatalogNumber,
        Field::Section,
        Field::Title,
        Field::ClassNumber,
        Field::InstructorName,
        Field::StartDate,
        Field::EndDate,
        Field::CourseReference,
    ];

    /// Header of this column in the CUNYfirst extract.
    pub fn source_header(self) -> &'static str {
        match self {
            Field::AcadOrg => "Acad Org",
            Field::Session => "Session",
            Field::Term => "Term",
            Field::ClassStatus => "Class Stat",
            Field::Subject => "Subject",
            Field::CatalogNumber => "Catalog#",
            Field::Section => "Section",
            Field::Title => "Class Title",
            Field::ClassNumber => "Class#",
            Field::InstructorName => "Name",
            Field::StartDate => "Start Date",
            Field::EndDate => "End Date",
            Field::CourseReference => "Blackboard Course ID",
        }
    }

    /// Name of this column in the canonical output schema.
    pub fn canonical_name(self) -> &'static str {
        CANONICAL_SCHEMA[self as usize]
    }

    /// Look up a field by its canonical name.
    pub fn from_canonical(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|f| f.canonical_name() == name)
    }

    /// Look up a field by its extract header.
    pub fn from_source_header(header: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|f| f.source_header() == header)
    }
}

// =============================================================================
// Course rows
// =============================================================================

/// Values of one course section row.
///
/// Serde names are the canonical schema, and field declaration order is the
/// canonical column order, so serializing a `CourseRow` yields a
/// canonical output row.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CourseRow {
    #[serde(rename = "acad_org")]
    pub acad_org: String,
    #[serde(rename = "session")]
    pub session: String,
    #[serde(rename = "cf_term_id")]
    pub term: String,
    #[serde(rename = "cf_status")]
    pub status: String,
    #[serde(rename = "course_subject")]
    pub subject: String,
    #[serde(rename = "course_number")]
    pub catalog_number: String,
    #[serde(rename = "section_number")]
    pub section_number: String,
    #[serde(rename = "course_title")]
    pub title: String,
    /// Section identity key (`Class#`).
    #[serde(rename = "cf_course_id")]
    pub class_number: String,
    #[serde(rename = "instructor_name")]
    pub instructor: String,
    #[serde(rename = "start_date")]
    pub start_date: Option<NaiveDate>,
    #[serde(rename = "end_date")]
    pub end_date: Option<NaiveDate>,
    /// Blackboard course reference; a plain id once transformed.
    #[serde(rename = "bb_course_id")]
    pub course_reference: String,
}

impl CourseRow {
    /// Text value of a field. Dates render as `YYYY-MM-DD`, absent dates as "".
    pub fn value(&self, field: Field) -> Cow<'_, str> {
        match field {
            Field::AcadOrg => Cow::Borrowed(&self.acad_org),
            Field::Session => Cow::Borrowed(&self.session),
            Field::Term => Cow::Borrowed(&self.term),
            Field::ClassStatus => Cow::Borrowed(&self.status),
            Field::Subject => Cow::Borrowed(&self.subject),
            Field::CatalogNumber => Cow::Borrowed(&self.catalog_number),
            Field::Section => Cow::Borrowed(&self.section_number),
            Field::Title => Cow::Borrowed(&self.title),
            Field::ClassNumber => Cow::Borrowed(&self.class_number),
            Field::InstructorName => Cow::Borrowed(&self.instructor),
            Field::StartDate => format_date(self.start_date),
            Field::EndDate => format_date(self.end_date),
            Field::CourseReference => Cow::Borrowed(&self.course_reference),
        }
    }

    /// Section identity key, or `None` when the `Class#` cell is blank.
    pub fn section_key(&self) -> Option<&str> {
        let key = self.class_number.trim();
        (!key.is_empty()).then_some(key)
    }
}

fn format_date(date: Option<NaiveDate>) -> Cow<'static, str> {
    match date {
        Some(d) => Cow::Owned(d.format("%Y-%m-%d").to_string()),
        None => Cow::Borrowed(""),
    }
}

/// Read access to a course row at any pipeline stage.
pub trait Record {
    /// 1-based line of the extract this row came from.
    fn line(&self) -> usize;

    /// The row's values.
    fn row(&self) -> &CourseRow;
}

macro_rules! stage_record {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq)]
        pub struct $name {
            pub line: usize,
            pub row: CourseRow,
        }

        impl Record for $name {
            fn line(&self) -> usize {
                self.line
            }

            fn row(&self) -> &CourseRow {
                &self.row
            }
        }
    };
}

stage_record!(
    /// One row of the source extract, as read.
    RawRecord
);

stage_record!(
    /// A raw record after org-unit remapping and course id extraction.
    TransformedRecord
);

stage_record!(
    /// One row per section key, with instructors joined.
    ///
    /// `line` is the line of the first source row for the section.
    ConsolidatedRecord
);
