//! CSV output shared by every pipeline.
//!
//! Rows are written as-is with the `csv` crate's default quoting. Extracted
//! tables are often ragged (a one-cell title row above a wide header), so
//! the writer is flexible about field counts.

use std::path::Path;

use crate::BatchError;

/// Writes `rows` to a new CSV file at `path`, replacing any existing file.
///
/// Returns the number of rows written.
///
/// # Errors
///
/// Returns [`BatchError::Csv`] if the file cannot be created or written.
pub fn write_rows<I, R, F>(path: &Path, rows: I) -> Result<usize, BatchError>
where
    I: IntoIterator<Item = R>,
    R: IntoIterator<Item = F>,
    F: AsRef<[u8]>,
{
    let mut writer = csv::WriterBuilder::new()
        .flexible(true)
        .terminator(csv::Terminator::Any(b'\n'))
        .from_path(path)?;

    let mut count = 0;
    for row in rows {
        writer.write_record(row)?;
        count += 1;
    }
    writer.flush()?;

    log::trace!("Wrote {count} row(s) to {}", path.display());

    Ok(count)
}
