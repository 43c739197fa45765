//! Page-windowed structured table scraper.
//!
//! For report years whose layout has been checked by hand, the incident
//! tables are known to sit inside a fixed page range. Inside that window no
//! title matching is done: every table's first row is its header and the
//! remaining rows are data. Pages outside the window are never read.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use prea_batch::progress::ProgressCallback;
use prea_batch::{RunSummary, csv_writer, files};
use prea_pdf::{PdfBackend, PdfDocument};
use prea_report_models::{PageWindow, Row, Table, WindowedConfig};

use crate::{ReportFile, ScrapeError, report_files};

/// Splits `table` into its header row and data rows.
///
/// Returns `None` unless the header has at least one non-blank cell and
/// there is at least one data row. A header row made only of blank cells
/// is rejected even though it is not empty.
#[must_use]
pub fn split_header(table: &Table) -> Option<(&Row, &[Row])> {
    let (header, data) = table.split_first()?;
    if header.iter().all(|cell| cell.trim().is_empty()) || data.is_empty() {
        return None;
    }
    Some((header, data))
}

/// CSV filename for `page` of the `year` report.
#[must_use]
pub fn page_csv_name(year: i32, page: u32) -> String {
    format!("PREA_Report_{year}_page_{page}.csv")
}

/// Scrapes the pages of `window` in `doc`, writing at most one CSV per page.
///
/// When a page holds several tables with a header and data, the last one
/// is written.
///
/// # Errors
///
/// Returns [`ScrapeError`] if a page cannot be read or a CSV cannot be
/// written.
pub fn scrape_window(
    doc: &dyn PdfDocument,
    window: &PageWindow,
    output_dir: &Path,
    summary: &mut RunSummary,
) -> Result<(), ScrapeError> {
    let page_count = doc.page_count();
    if window.exceeds(page_count) {
        log::warn!(
            "The {} page window ({}..{}) extends past the last page ({page_count}); \
             scanning the pages that exist",
            window.year,
            window.start,
            window.end.map_or_else(|| "end".to_owned(), |e| e.to_string()),
        );
    }

    for page in window.pages(page_count) {
        summary.pages_scanned += 1;
        let tables = doc.extract_tables(page)?;

        if tables.is_empty() {
            log::info!("No tables found on page {page} of the {} report", window.year);
            continue;
        }

        let mut selected = None;
        for table in &tables {
            match split_header(table) {
                Some((header, data)) => {
                    log::debug!(
                        "Headers on page {page} of the {} report: {header:?}",
                        window.year
                    );
                    log::debug!(
                        "Data on page {page} of the {} report: {} row(s)",
                        window.year,
                        data.len()
                    );
                    selected = Some(table);
                }
                None => log::debug!(
                    "Skipping table on page {page} of the {} report: no header or data",
                    window.year
                ),
            }
        }

        let Some(table) = selected else {
            log::info!(
                "Skipping CSV write for page {page} of the {} report: no valid headers or data",
                window.year
            );
            continue;
        };

        let csv_path: PathBuf = output_dir.join(page_csv_name(window.year, page));
        csv_writer::write_rows(&csv_path, table)?;
        log::info!("CSV written to {}", csv_path.display());
        summary.record_write(csv_path);
    }

    Ok(())
}

/// Runs the windowed scraper over `config.input_dir`.
///
/// Files whose year has no configured page window are skipped.
///
/// # Errors
///
/// Returns the first [`ScrapeError`] encountered.
pub fn scrape_windowed(
    config: &WindowedConfig,
    backend: &dyn PdfBackend,
    progress: &Arc<dyn ProgressCallback>,
) -> Result<RunSummary, ScrapeError> {
    files::ensure_dir(&config.output_dir)?;

    let mut summary = RunSummary::default();
    let mut targets: Vec<(ReportFile, &PageWindow)> = Vec::new();
    for report in report_files(&config.input_dir, config.years.as_ref(), &mut summary)? {
        if let Some(window) = config.window_for(report.year) {
            targets.push((report, window));
        } else {
            log::info!(
                "Skipping file {}: no page window is configured for {}",
                report.name,
                report.year
            );
            summary.skip_file();
        }
    }
    progress.set_total(targets.len() as u64);

    for (report, window) in &targets {
        log::info!("Processing: {}", report.name);
        progress.set_message(report.name.clone());

        let doc = backend.open(&report.path)?;
        scrape_window(doc.as_ref(), window, &config.output_dir, &mut summary)?;

        progress.inc(1);
    }

    progress.finish(format!(
        "Wrote {} page table(s)",
        summary.csvs_written()
    ));

    Ok(summary)
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeSet;

    use prea_batch::progress::null_progress;

    use super::*;
    use crate::fixtures::{FixtureBackend, read_lines, row};

    fn config(dir: &Path) -> WindowedConfig {
        let config = WindowedConfig {
            input_dir: dir.join("pdf_files"),
            output_dir: dir.join("csv_files"),
            ..WindowedConfig::default()
        };
        std::fs::create_dir(&config.input_dir).unwrap();
        config
    }

    fn page_table(page: u32) -> Table {
        vec![
            row(&["Facility", "Incidents"]),
            row(&[&format!("Unit {page}"), "1"]),
        ]
    }

    #[test]
    fn split_header_requires_header_and_data() {
        let table = vec![row(&["Facility", "Incidents"]), row(&["Alpha", "3"])];
        let (header, data) = split_header(&table).unwrap();
        assert_eq!(header, &row(&["Facility", "Incidents"]));
        assert_eq!(data.len(), 1);

        assert!(split_header(&vec![row(&["Facility", "Incidents"])]).is_none());
        assert!(split_header(&vec![row(&["", " "]), row(&["Alpha", "3"])]).is_none());
        assert!(split_header(&Vec::new()).is_none());
    }

    #[test]
    fn blank_header_table_is_not_written() {
        let dir = tempfile::tempdir().unwrap();
        let config = config(dir.path());
        let blank_header = vec![row(&["", "  "]), row(&["Alpha", "3"])];
        let backend = FixtureBackend::default().with_tables(
            "PREA_2013.pdf",
            vec![Vec::new(), vec![blank_header], Vec::new()],
        );
        backend.populate(&config.input_dir);

        let summary = scrape_windowed(&config, &backend, &null_progress()).unwrap();

        assert_eq!(summary.pages_scanned, 2);
        assert!(summary.written.is_empty());
        assert!(!config.output_dir.join("PREA_Report_2013_page_2.csv").exists());
    }

    #[test]
    fn only_pages_inside_2013_window_are_read() {
        let dir = tempfile::tempdir().unwrap();
        let config = config(dir.path());
        let pages: Vec<Vec<Table>> = (1..=10).map(|p| vec![page_table(p)]).collect();
        let backend = FixtureBackend::default().with_tables("PREA_2013.pdf", pages);
        backend.populate(&config.input_dir);

        let summary = scrape_windowed(&config, &backend, &null_progress()).unwrap();

        let names: Vec<String> = summary.written.iter().map(|p| files::file_name(p)).collect();
        assert_eq!(
            names,
            vec![
                "PREA_Report_2013_page_2.csv",
                "PREA_Report_2013_page_3.csv",
                "PREA_Report_2013_page_4.csv",
                "PREA_Report_2013_page_5.csv",
            ]
        );
        assert_eq!(summary.pages_scanned, 4);
        assert_eq!(
            read_lines(&config.output_dir.join("PREA_Report_2013_page_5.csv")),
            vec!["Facility,Incidents", "Unit 5,1"]
        );
    }

    #[test]
    fn open_window_runs_to_last_page() {
        let dir = tempfile::tempdir().unwrap();
        let config = config(dir.path());
        let pages: Vec<Vec<Table>> = (1..=11).map(|p| vec![page_table(p)]).collect();
        let backend = FixtureBackend::default().with_tables("PREA_2023_annual.pdf", pages);
        backend.populate(&config.input_dir);

        let summary = scrape_windowed(&config, &backend, &null_progress()).unwrap();

        assert_eq!(summary.pages_scanned, 3);
        assert_eq!(summary.csvs_written(), 3);
        assert!(config.output_dir.join("PREA_Report_2023_page_9.csv").exists());
        assert!(config.output_dir.join("PREA_Report_2023_page_11.csv").exists());
    }

    #[test]
    fn short_document_scans_only_existing_pages() {
        let dir = tempfile::tempdir().unwrap();
        let config = config(dir.path());
        let pages: Vec<Vec<Table>> = (1..=3).map(|p| vec![page_table(p)]).collect();
        let backend = FixtureBackend::default().with_tables("PREA_2013.pdf", pages);
        backend.populate(&config.input_dir);

        let summary = scrape_windowed(&config, &backend, &null_progress()).unwrap();

        assert_eq!(summary.pages_scanned, 2);
        assert_eq!(summary.csvs_written(), 2);
    }

    #[test]
    fn last_complete_table_on_a_page_wins() {
        let dir = tempfile::tempdir().unwrap();
        let config = config(dir.path());
        let first = vec![row(&["Facility", "Incidents"]), row(&["Alpha", "3"])];
        let second = vec![row(&["Facility", "Substantiated"]), row(&["Alpha", "1"])];
        let header_only = vec![row(&["Notes"])];
        let backend = FixtureBackend::default().with_tables(
            "PREA_2013.pdf",
            vec![
                Vec::new(),
                vec![first, second, header_only],
                Vec::new(),
                vec![vec![row(&["Facility"])]],
            ],
        );
        backend.populate(&config.input_dir);

        let summary = scrape_windowed(&config, &backend, &null_progress()).unwrap();

        assert_eq!(summary.csvs_written(), 1);
        assert_eq!(
            read_lines(&config.output_dir.join("PREA_Report_2013_page_2.csv")),
            vec!["Facility,Substantiated", "Alpha,1"]
        );
    }

    #[test]
    fn years_without_window_or_outside_list_are_skipped() {
        let dir = tempfile::tempdir().unwrap();
        let config = WindowedConfig {
            years: Some(BTreeSet::from([2013, 2020, 2021])),
            ..config(dir.path())
        };
        let pages: Vec<Vec<Table>> = (1..=12).map(|p| vec![page_table(p)]).collect();
        let backend = FixtureBackend::default()
            .with_tables("PREA_2020.pdf", pages.clone())
            .with_tables("PREA_2022.pdf", pages);
        backend.populate(&config.input_dir);

        let summary = scrape_windowed(&config, &backend, &null_progress()).unwrap();

        assert_eq!(summary.files_seen, 2);
        assert_eq!(summary.files_skipped, 2);
        assert_eq!(summary.pages_scanned, 0);
    }
}
