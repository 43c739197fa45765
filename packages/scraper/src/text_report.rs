//! Free-text PREA report reconstruction.
//!
//! Some report PDFs defeat table detection: columns drift, and facility
//! names wrap or run into the figures. For those, the incident table is
//! rebuilt line by line from the plain page text:
//!
//! ```text
//! PREA INCIDENT REPORTS - 2022        <- title, carries the year
//! Facility Allegations Substantiated  <- header, split on whitespace
//! Central State Facility 12 5         <- data: name, then numbers
//! ...
//! TOTALS 40 11                        <- end of the table, not captured
//! ```
//!
//! The facility name is everything before the first digit on a line, so
//! names that themselves contain digits are split early.

use std::sync::{Arc, LazyLock};

use prea_batch::progress::ProgressCallback;
use prea_batch::{RunSummary, csv_writer, files, year};
use prea_pdf::{PdfBackend, PdfDocument};
use prea_report_models::{REPORT_MARKER, Row, TOTALS_MARKER, TextConfig, YearFallback};
use regex::Regex;

use crate::windowed::page_csv_name;
use crate::{ReportFile, ScrapeError, report_files};

static FACILITY_ROW: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new("^(.*?)([0-9].*)$").unwrap_or_else(|e| panic!("bad facility regex: {e}"))
});

/// One PREA incident table rebuilt from a page's text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReportPage {
    /// The trimmed title line, e.g. `PREA INCIDENT REPORTS - 2022`.
    pub title: String,
    /// Year named in the title, if it is the report year or the one before.
    pub year: Option<i32>,
    /// Column names from the line after the title.
    pub header: Option<Row>,
    /// Facility rows: name followed by its numeric fields.
    pub rows: Vec<Row>,
}

impl ReportPage {
    /// Whether the page has a header and at least one data row.
    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.header.is_some() && !self.rows.is_empty()
    }

    /// The CSV rows: bare title, then the header, then the data.
    #[must_use]
    pub fn csv_rows(&self) -> Vec<Row> {
        let mut out = Vec::with_capacity(self.rows.len() + 2);
        out.push(vec![self.title.clone()]);
        out.push(self.header.clone().unwrap_or_default());
        out.extend(self.rows.iter().cloned());
        out
    }
}

/// Returns the year a title line refers to.
///
/// The previous year is checked first: a line naming both years belongs to
/// the earlier one.
#[must_use]
pub fn title_year(line: &str, report_year: i32) -> Option<i32> {
    year::title_years(report_year)
        .into_iter()
        .find(|y| line.contains(&y.to_string()))
}

/// Splits a data line into the facility name and its numeric fields.
///
/// Returns `None` for lines with no digit.
///
/// ```
/// use prea_scraper::text_report::split_facility_row;
///
/// assert_eq!(
///     split_facility_row("Central State Facility 12 5 0 3").unwrap(),
///     vec!["Central State Facility", "12", "5", "0", "3"],
/// );
/// assert_eq!(split_facility_row("Continued on next page"), None);
/// ```
#[must_use]
pub fn split_facility_row(line: &str) -> Option<Row> {
    let caps = FACILITY_ROW.captures(line)?;
    let facility = caps.get(1).map_or("", |m| m.as_str()).trim().to_owned();
    let numbers = caps.get(2).map_or("", |m| m.as_str()).split_whitespace();

    let mut row = vec![facility];
    row.extend(numbers.map(str::to_owned));
    Some(row)
}

/// Scans `text` for a PREA incident table.
///
/// Returns `None` when the page has no title line. The scan stops at the
/// first `TOTALS` line after the title; that line is dropped. Further title
/// lines on the same page are ignored.
#[must_use]
pub fn parse_page(text: &str, report_year: i32) -> Option<ReportPage> {
    let mut page: Option<ReportPage> = None;

    for line in text.lines() {
        let Some(report) = page.as_mut() else {
            if line.contains(REPORT_MARKER) {
                let report = ReportPage {
                    title: line.trim().to_owned(),
                    year: title_year(line, report_year),
                    header: None,
                    rows: Vec::new(),
                };
                log::debug!("Found report for year {:?}: {}", report.year, report.title);
                page = Some(report);
            }
            continue;
        };

        if line.contains(TOTALS_MARKER) {
            log::trace!("End of report: {line}");
            break;
        }

        if line.contains(REPORT_MARKER) {
            log::trace!("Ignoring repeated title line: {line}");
            continue;
        }

        if report.header.is_none() {
            let header: Row = line.split_whitespace().map(str::to_owned).collect();
            log::debug!("Headers: {header:?}");
            report.header = Some(header);
        } else if let Some(row) = split_facility_row(line) {
            log::trace!("Data row: {row:?}");
            report.rows.push(row);
        } else {
            log::trace!("Dropping line without figures: {line}");
        }
    }

    page
}

/// Resolves the year a parsed page is written under.
fn resolve_year(page: &ReportPage, report: &ReportFile, fallback: YearFallback) -> Option<i32> {
    page.year.or(match fallback {
        YearFallback::Skip => None,
        YearFallback::Filename => Some(report.year),
    })
}

/// Rebuilds and writes the report table from every page of `doc`.
///
/// # Errors
///
/// Returns [`ScrapeError`] if a page cannot be read or a CSV cannot be
/// written.
pub fn scrape_document(
    doc: &dyn PdfDocument,
    report: &ReportFile,
    config: &TextConfig,
    summary: &mut RunSummary,
) -> Result<(), ScrapeError> {
    for page_num in 1..=doc.page_count() {
        summary.pages_scanned += 1;

        let Some(text) = doc.extract_text(page_num)? else {
            log::info!("No text found on page {page_num} of {}", report.name);
            continue;
        };
        log::trace!("Extracted text from page {page_num}:\n{text}");

        let Some(page) = parse_page(&text, report.year) else {
            log::debug!("No report title on page {page_num} of {}", report.name);
            continue;
        };

        if !page.is_complete() {
            log::info!("No valid data found for page {page_num} of {}", report.name);
            continue;
        }

        let Some(year) = resolve_year(&page, report, config.year_fallback) else {
            log::warn!(
                "Dropping page {page_num} of {}: title {:?} names neither {} nor {}",
                report.name,
                page.title,
                report.year - 1,
                report.year
            );
            continue;
        };

        let csv_path = config.output_dir.join(page_csv_name(year, page_num));
        csv_writer::write_rows(&csv_path, page.csv_rows())?;
        log::info!("CSV written to {}", csv_path.display());
        summary.record_write(csv_path);
    }

    Ok(())
}

/// Runs the free-text scraper over `config.input_dir`.
///
/// # Errors
///
/// Returns the first [`ScrapeError`] encountered.
pub fn scrape_text(
    config: &TextConfig,
    backend: &dyn PdfBackend,
    progress: &Arc<dyn ProgressCallback>,
) -> Result<RunSummary, ScrapeError> {
    files::ensure_dir(&config.output_dir)?;

    let mut summary = RunSummary::default();
    let reports = report_files(&config.input_dir, config.years.as_ref(), &mut summary)?;
    progress.set_total(reports.len() as u64);

    for report in &reports {
        log::info!("Processing: {}", report.name);
        progress.set_message(report.name.clone());

        let doc = backend.open(&report.path)?;
        scrape_document(doc.as_ref(), report, config, &mut summary)?;

        progress.inc(1);
    }

    progress.finish(format!(
        "Rebuilt {} report page(s)",
        summary.csvs_written()
    ));

    Ok(summary)
}
