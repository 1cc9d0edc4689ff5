//! The processed artifact: canonical CSV on disk.

use std::fs::Permissions;
use std::path::Path;

use tempfile::NamedTempFile;

use crate::error::{PipelineResult, SourceError, TransformError, WriteError, WriteResult};
use crate::models::{ConsolidatedRecord, CourseRow, CANONICAL_SCHEMA};

/// Mode given to a newly created output file on unix.
#[cfg(unix)]
const OUTPUT_MODE: u32 = 0o644;

/// Write records as canonical CSV at `dest`.
///
/// The header is always written, even with no rows. Output goes to a
/// temporary file in the destination directory which is then moved over
/// `dest`, so a failure leaves nothing behind. The file ends up with the
/// permissions of the file it replaces, or world-readable if it is new.
pub fn serialize(records: &[ConsolidatedRecord], dest: &Path) -> WriteResult<()> {
    let io_error = |path: &Path| {
        let path = path.to_path_buf();
        move |source: std::io::Error| WriteError::Io { path, source }
    };

    let dir = match dest.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    std::fs::create_dir_all(dir).map_err(io_error(dir))?;
    let mut staged = NamedTempFile::new_in(dir).map_err(io_error(dir))?;

    {
        let mut writer = csv::WriterBuilder::new()
            .has_headers(false)
            .from_writer(&mut staged);
        writer.write_record(CANONICAL_SCHEMA)?;
        for record in records {
            writer.serialize(&record.row)?;
        }
        writer.flush().map_err(io_error(dest))?;
    }
    publish_permissions(&staged, dest).map_err(io_error(dest))?;

    staged
        .persist(dest)
        .map_err(|e| io_error(dest)(e.error))?;
    Ok(())
}

/// Staging files are created owner-only; give the output the mode a plain
/// write would have.
fn publish_permissions(staged: &NamedTempFile, dest: &Path) -> std::io::Result<()> {
    let permissions = match std::fs::metadata(dest) {
        Ok(existing) => existing.permissions(),
        Err(_) => default_permissions(staged)?,
    };
    staged.as_file().set_permissions(permissions)
}

#[cfg(unix)]
fn default_permissions(_staged: &NamedTempFile) -> std::io::Result<Permissions> {
    use std::os::unix::fs::PermissionsExt;
    Ok(Permissions::from_mode(OUTPUT_MODE))
}

#[cfg(not(unix))]
fn default_permissions(staged: &NamedTempFile) -> std::io::Result<Permissions> {
    Ok(staged.as_file().metadata()?.permissions())
}

/// Read a canonical CSV back into consolidated records.
///
/// The header must be exactly the canonical schema.
pub fn deserialize(path: &Path) -> PipelineResult<Vec<ConsolidatedRecord>> {
    let bytes = std::fs::read(path).map_err(|e| SourceError::Io {
        path: path.to_path_buf(),
        source: e,
    })?;
    let mut reader = csv::Reader::from_reader(bytes.as_slice());

    let headers = reader.headers().map_err(SourceError::from)?.clone();
    if headers.len() != CANONICAL_SCHEMA.len() {
        return Err(TransformError::SchemaArityMismatch {
            line: Some(1),
            expected: CANONICAL_SCHEMA.len(),
            found: headers.len(),
        }
        .into());
    }
    if let Some((found, _)) = headers
        .iter()
        .zip(CANONICAL_SCHEMA)
        .find(|(found, expected)| found != expected)
    {
        return Err(TransformError::UnknownColumn(found.to_string()).into());
    }

    let mut records = Vec::new();
    for (idx, result) in reader.deserialize::<CourseRow>().enumerate() {
        let row = result.map_err(SourceError::from)?;
        records.push(ConsolidatedRecord { line: idx + 2, row });
    }
    Ok(records)
}
