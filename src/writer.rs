//! CSV persistence of a collected result set
//!
//! The output is a two-column table, `url,data`, one row per record in
//! collection order. Fields are quoted only when they contain a delimiter, a
//! quote or a line break. The file is written next to the destination and
//! renamed into place, so a failed write leaves any previous file untouched
//! and never produces a partial one.

use std::fs::File;
use std::path::{Path, PathBuf};

use crate::error::WriteError;
use crate::types::ResultSet;

/// Header row of the output table
pub const HEADER: [&str; 2] = ["url", "data"];

/// Write `results` to `destination`, replacing any existing file
///
/// Writing the same result set twice yields byte-identical files. An empty
/// result set produces a header-only file.
///
/// # Errors
///
/// - [`WriteError::Encoding`] if a payload is not valid UTF-8 (checked
///   before anything touches the disk)
/// - [`WriteError::Open`] if the destination directory or file cannot be created
/// - [`WriteError::Csv`] if serialization fails
/// - [`WriteError::Persist`] if the finished file cannot be moved into place
pub fn write(results: &ResultSet, destination: impl AsRef<Path>) -> Result<(), WriteError> {
    let destination = destination.as_ref();

    let rows = results
        .iter()
        .map(|record| {
            std::str::from_utf8(record.payload())
                .map(|text| (record.endpoint().as_str(), text))
                .map_err(|_| WriteError::Encoding {
                    endpoint: record.endpoint().to_string(),
                })
        })
        .collect::<Result<Vec<_>, _>>()?;

    if let Some(parent) = destination.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent).map_err(|source| WriteError::Open {
            path: parent.to_path_buf(),
            source,
        })?;
    }

    let staging = staging_path(destination);
    let file = File::create(&staging).map_err(|source| WriteError::Open {
        path: staging.clone(),
        source,
    })?;

    let written = write_rows(file, &rows);
    if let Err(e) = written {
        let _ = std::fs::remove_file(&staging);
        return Err(e);
    }

    std::fs::rename(&staging, destination).map_err(|source| {
        let _ = std::fs::remove_file(&staging);
        WriteError::Persist {
            path: destination.to_path_buf(),
            source,
        }
    })?;

    tracing::info!(
        path = %destination.display(),
        rows = rows.len(),
        "Data successfully written"
    );

    Ok(())
}

fn write_rows(file: File, rows: &[(&str, &str)]) -> Result<(), WriteError> {
    let mut writer = csv::WriterBuilder::new()
        .terminator(csv::Terminator::Any(b'\n'))
        .from_writer(file);

    writer.write_record(HEADER)?;
    for (url, data) in rows {
        writer.write_record([url, data])?;
    }

    // into_inner flushes the buffered rows and surfaces any late I/O error
    writer
        .into_inner()
        .map_err(|e| WriteError::Csv(csv::Error::from(e.into_error())))?;
    Ok(())
}

/// Sibling path the table is staged at before the final rename.
fn staging_path(destination: &Path) -> PathBuf {
    let mut name = destination
        .file_name()
        .map(|n| n.to_os_string())
        .unwrap_or_default();
    name.push(".partial");
    destination.with_file_name(name)
}
