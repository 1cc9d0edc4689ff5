//! Group-by counts for eyeballing a run.
//!
//! Not a contract: groups are listed in the order first seen, and the
//! rendered table is for people.

use std::collections::HashMap;
use std::fmt::Write as _;

use serde::Serialize;

use crate::models::{Field, Record};

/// Fields the CLI groups by.
pub const DEFAULT_GROUP_FIELDS: [Field; 2] = [Field::AcadOrg, Field::Session];

/// One group and the number of rows in it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GroupCount {
    pub key: Vec<String>,
    pub count: usize,
}

/// Counts per group plus the total row count.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Summary {
    #[serde(skip)]
    pub fields: Vec<Field>,
    pub groups: Vec<GroupCount>,
    pub total: usize,
}

/// Count rows per distinct value tuple of `fields`.
pub fn summarize<R: Record>(records: &[R], fields: &[Field]) -> Summary {
    let mut index: HashMap<Vec<String>, usize> = HashMap::new();
    let mut groups: Vec<GroupCount> = Vec::new();

    for record in records {
        let key: Vec<String> = fields
            .iter()
            .map(|f| record.row().value(*f).into_owned())
            .collect();
        match index.get(&key) {
            Some(&i) => groups[i].count += 1,
            None => {
                index.insert(key.clone(), groups.len());
                groups.push(GroupCount { key, count: 1 });
            }
        }
    }

    Summary {
        fields: fields.to_vec(),
        groups,
        total: records.len(),
    }
}

impl Summary {
    /// Fixed-width table, one line per group, then the record count.
    pub fn render(&self) -> String {
        let mut headers: Vec<&str> = self.fields.iter().map(|f| f.source_header()).collect();
        headers.push("Course count");

        let rows: Vec<Vec<String>> = self
            .groups
            .iter()
            .map(|g| {
                let mut cells = g.key.clone();
                cells.push(g.count.to_string());
                cells
            })
            .collect();

        let widths: Vec<usize> = headers
            .iter()
            .enumerate()
            .map(|(i, h)| {
                rows.iter()
                    .map(|r| r[i].chars().count())
                    .chain(std::iter::once(h.chars().count()))
                    .max()
                    .unwrap_or(0)
            })
            .collect();
        let last = headers.len() - 1;

        let mut out = String::from("Summary count\n");
        let header_cells: Vec<String> = headers.iter().map(|h| h.to_string()).collect();
        push_line(&mut out, &header_cells, &widths, last);
        let rule: Vec<String> = widths.iter().map(|w| "-".repeat(*w)).collect();
        push_line(&mut out, &rule, &widths, last);
        for row in &rows {
            push_line(&mut out, row, &widths, last);
        }
        let _ = write!(out, "Record count: {}", self.total);
        out
    }
}

/// Left-align every column except the count, which is right-aligned.
fn push_line(out: &mut String, cells: &[String], widths: &[usize], last: usize) {
    let line: Vec<String> = cells
        .iter()
        .zip(widths)
        .enumerate()
        .map(|(i, (cell, &w))| {
            if i == last {
                format!("{:>w$}", cell)
            } else {
                format!("{:<w$}", cell)
            }
        })
        .collect();
    let _ = writeln!(out, "{}", line.join("  ").trim_end());
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{ConsolidatedRecord, CourseRow};

    fn record(org: &str, session: &str) -> ConsolidatedRecord {
        ConsolidatedRecord {
            line: 2,
            row: CourseRow {
                acad_org: org.into(),
                session: session.into(),
                ..CourseRow::default()
            },
        }
    }

    #[test]
    fn test_counts_in_first_seen_order() {
        let records = vec![
            record("MALS", "1"),
            record("ARTS", "1"),
            record("MALS", "1"),
            record("MALS", "7W1"),
        ];

        let summary = summarize(&records, &DEFAULT_GROUP_FIELDS);
        assert_eq!(summary.total, 4);
        assert_eq!(
            summary.groups,
            vec![
                GroupCount { key: vec!["MALS".into(), "1".into()], count: 2 },
                GroupCount { key: vec!["ARTS".into(), "1".into()], count: 1 },
                GroupCount { key: vec!["MALS".into(), "7W1".into()], count: 1 },
            ]
        );
    }

    #[test]
    fn test_counts_sum_to_total() {
        let records = vec![record("A", "1"), record("B", "1"), record("A", "2")];
        let summary = summarize(&records, &[Field::Session]);

        let sum: usize = summary.groups.iter().map(|g| g.count).sum();
        assert_eq!(sum, summary.total);
        assert_eq!(summary.groups.len(), 2);
    }

    #[test]
    fn test_render() {
        let records = vec![record("MALS", "1"), record("MALS", "1"), record("ARTS", "7W1")];
        let rendered = summarize(&records, &DEFAULT_GROUP_FIELDS).render();

        let expected = "\
Summary count
Acad Org  Session  Course count
--------  -------  ------------
MALS      1                   2
ARTS      7W1                 1
Record count: 3";
        assert_eq!(rendered, expected);
    }

    #[test]
    fn test_render_empty() {
        let records: Vec<ConsolidatedRecord> = Vec::new();
        let rendered = summarize(&records, &DEFAULT_GROUP_FIELDS).render();

        assert!(rendered.contains("Acad Org  Session  Course count"));
        assert!(rendered.ends_with("Record count: 0"));
    }
}
