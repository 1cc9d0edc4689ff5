//! Spreadsheet extracts.
//!
//! CUNYfirst delivers the roster as `.xlsx`. The first worksheet is read into
//! a [`SourceTable`], and [`convert_to_csv`] writes it out as UTF-8 CSV so
//! later runs (and people) can work from the plain-text copy.

use std::path::Path;

use calamine::{open_workbook, Data, Reader, Xlsx};
use chrono::{Duration, NaiveDate};

use super::{SourceRow, SourceTable};
use crate::error::{SourceError, SourceResult};

/// Read the first worksheet of an `.xlsx` file.
///
/// Date cells become `YYYY-MM-DD`; whole-number cells lose their `.0`.
pub fn read_xlsx(path: &Path) -> SourceResult<SourceTable> {
    let spreadsheet_error = |message: String| SourceError::Spreadsheet {
        path: path.to_path_buf(),
        message,
    };

    let mut workbook: Xlsx<_> =
        open_workbook(path).map_err(|e: calamine::XlsxError| spreadsheet_error(e.to_string()))?;

    let sheet_name = workbook
        .sheet_names()
        .first()
        .cloned()
        .ok_or_else(|| spreadsheet_error("workbook has no sheets".to_string()))?;

    let range = workbook
        .worksheet_range(&sheet_name)
        .map_err(|e| spreadsheet_error(format!("cannot read sheet '{}': {}", sheet_name, e)))?;

    let mut rows = range.rows().enumerate();
    let headers: Vec<String> = match rows.next() {
        Some((_, header)) => header.iter().map(|c| cell_to_string(c).trim().to_string()).collect(),
        None => return Err(SourceError::EmptyFile),
    };
    if headers.iter().all(|h| h.is_empty()) {
        return Err(SourceError::NoHeaders);
    }

    let mut table = SourceTable {
        headers,
        rows: Vec::new(),
    };

    for (idx, row) in rows {
        let values: Vec<String> = row.iter().map(|c| cell_to_string(c).trim().to_string()).collect();
        if values.iter().all(|v| v.is_empty()) {
            continue;
        }
        table.rows.push(SourceRow {
            line: idx + 1,
            values,
        });
    }

    Ok(table)
}

/// Convert an `.xlsx` extract to UTF-8 CSV at `dest`.
///
/// Returns the number of data rows written.
pub fn convert_to_csv(xlsx: &Path, dest: &Path) -> SourceResult<usize> {
    let table = read_xlsx(xlsx)?;

    if let Some(parent) = dest.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent).map_err(|e| SourceError::Io {
            path: parent.to_path_buf(),
            source: e,
        })?;
    }

    let mut writer = csv::WriterBuilder::new()
        .flexible(true)
        .from_path(dest)?;
    writer.write_record(&table.headers)?;
    for row in &table.rows {
        writer.write_record(&row.values)?;
    }
    writer.flush().map_err(|e| SourceError::Io {
        path: dest.to_path_buf(),
        source: e,
    })?;

    Ok(table.len())
}

fn cell_to_string(cell: &Data) -> String {
    match cell {
        Data::Empty => String::new(),
        Data::Float(f) if f.fract() == 0.0 && f.abs() < 1e15 => format!("{}", *f as i64),
        Data::DateTime(dt) => excel_serial_to_date(dt.as_f64())
            .map(|d| d.format("%Y-%m-%d").to_string())
            .unwrap_or_else(|| dt.as_f64().to_string()),
        Data::DateTimeIso(s) => s.split('T').next().unwrap_or(s).to_string(),
        other => other.to_string(),
    }
}

/// Convert an Excel 1900-system serial day number to a date.
fn excel_serial_to_date(serial: f64) -> Option<NaiveDate> {
    if !serial.is_finite() || serial < 1.0 {
        return None;
    }
    // Day 0 is 1899-12-30 once Excel's phantom 1900-02-29 is accounted for.
    let epoch = NaiveDate::from_ymd_opt(1899, 12, 30)?;
    epoch.checked_add_signed(Duration::days(serial.floor() as i64))
}
