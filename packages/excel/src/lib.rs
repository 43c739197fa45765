#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Spreadsheet to CSV conversion for PREA report workbooks.
//!
//! Each `.xlsx`/`.xls` workbook in the input folder becomes exactly one CSV
//! with the same stem in the output folder. Only the first worksheet is
//! converted; its used range is written row for row, header row included.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use calamine::{Data, ExcelDateTime, Range, Reader, open_workbook_auto};
use chrono::NaiveDateTime;
use prea_batch::progress::ProgressCallback;
use prea_batch::{BatchError, RunSummary, csv_writer, files};
use prea_report_models::ExcelConfig;

/// File extensions treated as spreadsheets.
pub const SPREADSHEET_EXTENSIONS: &[&str] = &["xlsx", "xls"];

/// How date cells are written: `2021-01-01 00:00:00`.
pub const DATETIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Errors that can occur while converting workbooks.
#[derive(Debug, thiserror::Error)]
pub enum ExcelError {
    /// The workbook could not be opened or a worksheet could not be read.
    #[error("Workbook error in {}: {source}", path.display())]
    Workbook {
        /// Path of the offending workbook.
        path: PathBuf,
        /// Underlying `calamine` error.
        source: calamine::Error,
    },

    /// The workbook has no worksheet to convert.
    #[error("Workbook {} has no worksheets", .0.display())]
    NoWorksheet(PathBuf),

    /// Listing inputs or writing CSV output failed.
    #[error(transparent)]
    Batch(#[from] BatchError),
}

/// Renders one cell the way it should appear in the CSV.
///
/// Whole-number floats print without a fractional part (`3.0` → `3`), which
/// is how `f64`'s `Display` already behaves. Date cells are rendered with
/// [`DATETIME_FORMAT`]; durations keep their serial value.
#[must_use]
pub fn cell_to_string(cell: &Data) -> String {
    match cell {
        Data::Empty => String::new(),
        Data::String(s) | Data::DateTimeIso(s) | Data::DurationIso(s) => s.clone(),
        Data::Float(f) => f.to_string(),
        Data::Int(i) => i.to_string(),
        Data::Bool(true) => "True".to_owned(),
        Data::Bool(false) => "False".to_owned(),
        Data::DateTime(dt) => datetime_to_string(dt),
        Data::Error(e) => e.to_string(),
    }
}

fn datetime_to_string(dt: &ExcelDateTime) -> String {
    let datetime: Option<NaiveDateTime> = dt.as_datetime().filter(|_| dt.is_datetime());
    datetime.map_or_else(
        || dt.to_string(),
        |datetime| datetime.format(DATETIME_FORMAT).to_string(),
    )
}

/// Writes every row of `range` to `path`.
///
/// Returns the number of rows written, which equals the range height.
///
/// # Errors
///
/// Returns [`ExcelError::Batch`] if the CSV cannot be written.
pub fn write_range(range: &Range<Data>, path: &Path) -> Result<usize, ExcelError> {
    let rows = range
        .rows()
        .map(|row| row.iter().map(cell_to_string).collect::<Vec<_>>());
    Ok(csv_writer::write_rows(path, rows)?)
}

/// Converts the first worksheet of the workbook at `path` into
/// `{output_dir}/{stem}.csv`.
///
/// Returns the path of the written CSV.
///
/// # Errors
///
/// Returns [`ExcelError::Workbook`] if the workbook cannot be read,
/// [`ExcelError::NoWorksheet`] if it is empty, or [`ExcelError::Batch`] if
/// the CSV cannot be written.
pub fn convert_workbook(path: &Path, output_dir: &Path) -> Result<PathBuf, ExcelError> {
    let workbook_error = |source| ExcelError::Workbook {
        path: path.to_path_buf(),
        source,
    };

    let mut workbook = open_workbook_auto(path).map_err(workbook_error)?;
    let range = workbook
        .worksheet_range_at(0)
        .ok_or_else(|| ExcelError::NoWorksheet(path.to_path_buf()))?
        .map_err(workbook_error)?;

    let csv_path = output_dir.join(format!("{}.csv", files::file_stem(path)));
    let rows = write_range(&range, &csv_path)?;

    log::debug!(
        "{}: {rows} row(s) x {} column(s)",
        files::file_name(path),
        range.width()
    );

    Ok(csv_path)
}

/// Converts every spreadsheet in `config.input_dir`.
///
/// The output folder is created if needed. Any unreadable workbook aborts
/// the run.
///
/// # Errors
///
/// Returns the first [`ExcelError`] encountered.
pub fn convert_all(
    config: &ExcelConfig,
    progress: &Arc<dyn ProgressCallback>,
) -> Result<RunSummary, ExcelError> {
    files::ensure_dir(&config.output_dir)?;
    let inputs = files::list_inputs(&config.input_dir, SPREADSHEET_EXTENSIONS)?;

    let mut summary = RunSummary {
        files_seen: inputs.len() as u64,
        ..RunSummary::default()
    };
    progress.set_total(summary.files_seen);

    for path in &inputs {
        let name = files::file_name(path);
        progress.set_message(name.clone());

        let csv_path = convert_workbook(path, &config.output_dir)?;
        summary.pages_scanned += 1;
        log::info!("Converted {name} to CSV.");
        summary.record_write(csv_path);

        progress.inc(1);
    }

    progress.finish(format!(
        "Converted {} spreadsheet(s)",
        summary.csvs_written()
    ));

    Ok(summary)
}
