//! Finding the extract to process.
//!
//! Extracts are dropped into `{data_directory}/{term} {year}/` as `.xlsx`
//! files; the newest one wins. A spreadsheet is converted to CSV at the
//! configured `output_filename` before it is read.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::SystemTime;

use super::{convert_to_csv, is_spreadsheet};
use crate::config::Config;
use crate::error::{SourceError, SourceResult};
use crate::logs::{log_info, log_success};

/// Which extract a run should read.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SourceSelection {
    /// An explicit file, `.xlsx` or delimited text.
    File(PathBuf),
    /// The newest `.xlsx` in the term's data directory.
    Term { term: String, year: u16 },
    /// The CSV left by an earlier conversion.
    Converted,
}

impl SourceSelection {
    /// Selection for the command-line flags: an explicit file wins, then a
    /// complete term and year, then the converted CSV.
    pub fn from_flags(input: Option<PathBuf>, term: Option<String>, year: Option<u16>) -> Self {
        match (input, term, year) {
            (Some(path), _, _) => SourceSelection::File(path),
            (None, Some(term), Some(year)) => SourceSelection::Term { term, year },
            _ => SourceSelection::Converted,
        }
    }
}

/// Resolve a selection to the delimited file the pipeline should read.
///
/// Spreadsheets are converted to [`Config::converted_path`] first.
pub fn resolve_source(config: &Config, selection: &SourceSelection) -> SourceResult<PathBuf> {
    let path = match selection {
        SourceSelection::File(path) => path.clone(),
        SourceSelection::Term { term, year } => {
            let directory = term_directory(config, term, *year)?;
            locate_datafile(&directory)?
        }
        SourceSelection::Converted => return Ok(config.converted_path()),
    };

    if is_spreadsheet(&path) {
        let dest = config.converted_path();
        let rows = convert_to_csv(&path, &dest)?;
        log_success(format!(
            "Converted xlsx file to {} ({} rows)",
            dest.display(),
            rows
        ));
        Ok(dest)
    } else {
        Ok(path)
    }
}

/// The data directory for a term, which must exist.
pub fn term_directory(config: &Config, term: &str, year: u16) -> SourceResult<PathBuf> {
    let directory = config.term_directory(term, year);
    if directory.is_dir() {
        log_info(format!("Found the data directory at: {}", directory.display()));
        Ok(directory)
    } else {
        Err(SourceError::NoDataDirectory(directory))
    }
}

/// The most recently created `.xlsx` file in `directory`.
///
/// Falls back to modification time where the platform has no creation time.
pub fn locate_datafile(directory: &Path) -> SourceResult<PathBuf> {
    let io_error = |e: std::io::Error| SourceError::Io {
        path: directory.to_path_buf(),
        source: e,
    };

    let mut newest: Option<(SystemTime, PathBuf)> = None;
    for entry in fs::read_dir(directory).map_err(io_error)? {
        let path = entry.map_err(io_error)?.path();
        if !path.is_file() || !is_spreadsheet(&path) {
            continue;
        }
        let metadata = fs::metadata(&path).map_err(io_error)?;
        let stamp = metadata
            .created()
            .or_else(|_| metadata.modified())
            .unwrap_or(SystemTime::UNIX_EPOCH);

        if newest.as_ref().map_or(true, |(best, _)| stamp > *best) {
            newest = Some((stamp, path));
        }
    }

    let (_, path) = newest.ok_or_else(|| SourceError::NoDataFile(directory.to_path_buf()))?;
    log_info(format!("Current datafile: {}", path.display()));
    Ok(path)
}
