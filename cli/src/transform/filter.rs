//! Column projection and row exclusion.

use std::collections::BTreeSet;

use crate::error::{TransformError, TransformResult};
use crate::models::{Field, Record};
use crate::parser::{SourceRow, SourceTable};

/// Restrict a table to exactly `columns`, in that order.
///
/// Every requested column must be in the source header. Short rows yield
/// empty cells for the missing positions.
pub fn project(table: &SourceTable, columns: &[String]) -> TransformResult<SourceTable> {
    let indices = columns
        .iter()
        .map(|name| {
            table
                .column_index(name)
                .ok_or_else(|| TransformError::UnknownColumn(name.clone()))
        })
        .collect::<TransformResult<Vec<usize>>>()?;

    let rows = table
        .rows
        .iter()
        .map(|row| SourceRow {
            line: row.line,
            values: indices
                .iter()
                .map(|&i| row.values.get(i).cloned().unwrap_or_default())
                .collect(),
        })
        .collect();

    Ok(SourceTable {
        headers: columns.to_vec(),
        rows,
    })
}

/// Drop the records whose `field` value is in `excluded`, keeping order.
pub fn exclude<R: Record>(records: Vec<R>, field: Field, excluded: &BTreeSet<String>) -> Vec<R> {
    if excluded.is_empty() {
        return records;
    }
    records
        .into_iter()
        .filter(|r| !excluded.contains(r.row().value(field).as_ref()))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{CourseRow, RawRecord};
    use crate::parser::parse_delimited;

    fn record(line: usize, org: &str) -> RawRecord {
        RawRecord {
            line,
            row: CourseRow {
                acad_org: org.into(),
                class_number: line.to_string(),
                ..CourseRow::default()
            },
        }
    }

    fn names(columns: &[&str]) -> Vec<String> {
        columns.iter().map(|c| c.to_string()).collect()
    }

    #[test]
    fn test_project_reorders_and_drops() {
        let table = parse_delimited("Class#,Extra,Acad Org\n100,x,MALS\n200,y,ARTS", ',').unwrap();

        let projected = project(&table, &names(&["Acad Org", "Class#"])).unwrap();
        assert_eq!(projected.headers, vec!["Acad Org", "Class#"]);
        assert_eq!(projected.rows[0].values, vec!["MALS", "100"]);
        assert_eq!(projected.rows[1].values, vec!["ARTS", "200"]);
        assert_eq!(projected.rows[1].line, 3);
    }

    #[test]
    fn test_project_unknown_column() {
        let table = parse_delimited("Class#,Name\n100,Smith", ',').unwrap();

        match project(&table, &names(&["Class#", "Room"])) {
            Err(TransformError::UnknownColumn(name)) => assert_eq!(name, "Room"),
            other => panic!("unexpected result: {other:?}"),
        }
    }

    #[test]
    fn test_project_pads_short_rows() {
        let table = parse_delimited("a,b,c\n1,2", ',').unwrap();

        let projected = project(&table, &names(&["c", "a"])).unwrap();
        assert_eq!(projected.rows[0].values, vec!["", "1"]);
    }

    #[test]
    fn test_exclude_keeps_order() {
        let records = vec![record(2, "MALS"), record(3, "EXCL"), record(4, "ARTS")];
        let excluded = BTreeSet::from(["EXCL".to_string()]);

        let kept = exclude(records, Field::AcadOrg, &excluded);
        let orgs: Vec<&str> = kept.iter().map(|r| r.row.acad_org.as_str()).collect();
        assert_eq!(orgs, vec!["MALS", "ARTS"]);
    }

    #[test]
    fn test_exclude_cardinality() {
        let records = vec![
            record(2, "A"),
            record(3, "B"),
            record(4, "A"),
            record(5, "C"),
            record(6, "B"),
        ];
        let excluded = BTreeSet::from(["A".to_string(), "B".to_string()]);
        let matching = records
            .iter()
            .filter(|r| excluded.contains(&r.row.acad_org))
            .count();
        let total = records.len();

        let kept = exclude(records, Field::AcadOrg, &excluded);
        assert_eq!(kept.len(), total - matching);
        assert!(kept.iter().all(|r| !excluded.contains(&r.row.acad_org)));
    }

    #[test]
    fn test_exclude_empty_set_is_noop() {
        let records = vec![record(2, "A"), record(3, "B")];
        let kept = exclude(records.clone(), Field::AcadOrg, &BTreeSet::new());
        assert_eq!(kept, records);
    }
}
