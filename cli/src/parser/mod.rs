//! Extract reading with encoding and delimiter auto-detection.
//!
//! Loads the course extract into a [`SourceTable`]: the header row plus every
//! data row as strings. No course-specific logic here; columns are bound to
//! typed records later, in [`crate::schema`].

pub mod discover;
pub mod xlsx;

use std::path::Path;

use encoding_rs::{Encoding, UTF_8, WINDOWS_1252};

use crate::error::{SourceError, SourceResult};

pub use discover::{locate_datafile, resolve_source, term_directory, SourceSelection};
pub use xlsx::{convert_to_csv, read_xlsx};

/// A row of the extract with the line it was read from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceRow {
    /// 1-based line number (the header is line 1).
    pub line: usize,
    pub values: Vec<String>,
}

/// The extract as read: untyped, column order as in the file.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SourceTable {
    pub headers: Vec<String>,
    pub rows: Vec<SourceRow>,
}

impl SourceTable {
    /// Position of a column by header name.
    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.headers.iter().position(|h| h == name)
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

/// A parsed extract and what was detected along the way.
#[derive(Debug, Clone)]
pub struct ParseResult {
    pub table: SourceTable,
    pub encoding: &'static Encoding,
    pub delimiter: char,
}

/// Candidate delimiters, in order of preference on ties.
const DELIMITERS: [char; 4] = [',', ';', '\t', '|'];

/// Guess the text encoding of an extract.
///
/// Valid UTF-8 is taken as such. Otherwise chardet's guess is mapped to a
/// WHATWG label; anything unrecognized is read as Windows-1252, which is what
/// CUNYfirst exports use when they are not UTF-8.
pub fn detect_encoding(bytes: &[u8]) -> &'static Encoding {
    if std::str::from_utf8(bytes).is_ok() {
        return UTF_8;
    }
    let (charset, _, _) = chardet::detect(bytes);
    Encoding::for_label(chardet::charset2encoding(&charset).as_bytes()).unwrap_or(WINDOWS_1252)
}

/// Decode bytes, dropping a leading byte-order mark.
pub fn decode_content(bytes: &[u8], encoding: &'static Encoding) -> String {
    let (text, _, _) = encoding.decode(bytes);
    text.into_owned()
}

/// Pick the delimiter that occurs most often in the header line.
///
/// Defaults to `,` when none of the candidates appear.
pub fn detect_delimiter(content: &str) -> char {
    let header = content.lines().find(|l| !l.trim().is_empty()).unwrap_or("");
    DELIMITERS
        .into_iter()
        .rev()
        .map(|d| (d, header.matches(d).count()))
        .filter(|&(_, count)| count > 0)
        .max_by_key(|&(_, count)| count)
        .map_or(',', |(d, _)| d)
}

/// Parse delimited text into a table.
///
/// Cells are trimmed and blank lines skipped. Rows may be ragged; arity is
/// checked when the table is renamed.
pub fn parse_delimited(content: &str, delimiter: char) -> SourceResult<SourceTable> {
    if content.trim().is_empty() {
        return Err(SourceError::EmptyFile);
    }

    let mut reader = csv::ReaderBuilder::new()
        .delimiter(delimiter as u8)
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(content.as_bytes());

    let headers: Vec<String> = reader.headers()?.iter().map(str::to_string).collect();
    if headers.iter().all(|h| h.is_empty()) {
        return Err(SourceError::NoHeaders);
    }

    let mut rows = Vec::new();
    for (idx, record) in reader.records().enumerate() {
        let record = record?;
        let line = record
            .position()
            .map(|p| p.line() as usize)
            .unwrap_or(idx + 2);
        rows.push(SourceRow {
            line,
            values: record.iter().map(str::to_string).collect(),
        });
    }

    Ok(SourceTable { headers, rows })
}

/// Parse extract bytes with auto-detection of encoding and delimiter.
pub fn parse_bytes_auto(bytes: &[u8]) -> SourceResult<ParseResult> {
    let encoding = detect_encoding(bytes);
    let content = decode_content(bytes, encoding);
    let delimiter = detect_delimiter(&content);
    let table = parse_delimited(&content, delimiter)?;

    Ok(ParseResult {
        table,
        encoding,
        delimiter,
    })
}

/// Read a delimited extract file with auto-detection.
pub fn parse_file_auto(path: &Path) -> SourceResult<ParseResult> {
    let bytes = std::fs::read(path).map_err(|e| SourceError::Io {
        path: path.to_path_buf(),
        source: e,
    })?;
    parse_bytes_auto(&bytes)
}

/// Whether a path names a spreadsheet rather than delimited text.
pub fn is_spreadsheet(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case("xlsx") || e.eq_ignore_ascii_case("xlsm"))
}
