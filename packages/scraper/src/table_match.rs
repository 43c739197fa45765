//! Title-matching structured table scraper.
//!
//! Report PDFs carry several tables per page, only some of which are the
//! incident tables. An incident table is recognized by its very first cell,
//! which holds the report title `PREA INCIDENT REPORTS - {year}`. The title
//! may name the report's own year or the year before it, since a report
//! published for one year often covers the prior fiscal year.
//!
//! Matching tables are written verbatim: every row, with no header/data
//! distinction.

use std::path::Path;
use std::sync::Arc;

use prea_batch::progress::ProgressCallback;
use prea_batch::{RunSummary, csv_writer, files, year};
use prea_pdf::{PdfBackend, PdfDocument};
use prea_report_models::{REPORT_MARKER, Table, TablesConfig};

use crate::{ReportFile, ScrapeError, report_files};

/// Whether `table` is a PREA incident table for `report_year`.
///
/// Only the first cell of the first row is inspected. Tables with no rows
/// or an empty first row never match.
#[must_use]
pub fn matches_report_title(table: &Table, report_year: i32) -> bool {
    let Some(first_cell) = table.first().and_then(|row| row.first()) else {
        return false;
    };

    year::title_years(report_year)
        .iter()
        .any(|y| first_cell.contains(&format!("{REPORT_MARKER} - {y}")))
}

/// CSV filename for table `table_index` (1-based) on `page` of the document
/// with filename stem `stem`.
#[must_use]
pub fn table_csv_name(stem: &str, page: u32, table_index: usize) -> String {
    format!("{stem}_page_{page}_table_{table_index}.csv")
}

/// Writes every matching table in `doc` to `output_dir`.
///
/// # Errors
///
/// Returns [`ScrapeError`] if a page cannot be read or a CSV cannot be
/// written.
pub fn scrape_document(
    doc: &dyn PdfDocument,
    report: &ReportFile,
    output_dir: &Path,
    summary: &mut RunSummary,
) -> Result<(), ScrapeError> {
    for page in 1..=doc.page_count() {
        summary.pages_scanned += 1;
        let tables = doc.extract_tables(page)?;

        for (idx, table) in tables.iter().enumerate() {
            if !matches_report_title(table, report.year) {
                log::trace!(
                    "{}: table {} on page {page} is not a report table",
                    report.name,
                    idx + 1
                );
                continue;
            }

            let csv_path = output_dir.join(table_csv_name(&report.stem, page, idx + 1));
            csv_writer::write_rows(&csv_path, table)?;
            log::info!(
                "Matching table {} from page {page} saved to {}",
                idx + 1,
                csv_path.display()
            );
            summary.record_write(csv_path);
        }
    }

    Ok(())
}

/// Runs the title-matching scraper over `config.input_dir`.
///
/// # Errors
///
/// Returns the first [`ScrapeError`] encountered; files after it are not
/// processed.
pub fn scrape_tables(
    config: &TablesConfig,
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
        scrape_document(doc.as_ref(), report, &config.output_dir, &mut summary)?;

        progress.inc(1);
    }

    progress.finish(format!(
        "Saved {} matching table(s)",
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

    fn config(dir: &Path) -> TablesConfig {
        let config = TablesConfig {
            input_dir: dir.join("pdf_files"),
            output_dir: dir.join("csv_files"),
            ..TablesConfig::default()
        };
        std::fs::create_dir(&config.input_dir).unwrap();
        config
    }

    #[test]
    fn matches_current_and_previous_year_titles() {
        let current = vec![row(&["PREA INCIDENT REPORTS - 2023"])];
        let previous = vec![row(&["Table 4: PREA INCIDENT REPORTS - 2022 (FY)"])];
        let older = vec![row(&["PREA INCIDENT REPORTS - 2021"])];
        let next = vec![row(&["PREA INCIDENT REPORTS - 2024"])];

        assert!(matches_report_title(&current, 2023));
        assert!(matches_report_title(&previous, 2023));
        assert!(!matches_report_title(&older, 2023));
        assert!(!matches_report_title(&next, 2023));
    }

    #[test]
    fn only_the_first_cell_is_inspected() {
        let table = vec![
            row(&["Facility", "PREA INCIDENT REPORTS - 2023"]),
            row(&["PREA INCIDENT REPORTS - 2023"]),
        ];
        assert!(!matches_report_title(&table, 2023));
    }

    #[test]
    fn empty_tables_never_match() {
        assert!(!matches_report_title(&Vec::new(), 2023));
        assert!(!matches_report_title(&vec![Vec::new()], 2023));
    }

    #[test]
    fn title_needs_the_dash_separator() {
        let table = vec![row(&["PREA INCIDENT REPORTS 2023"])];
        assert!(!matches_report_title(&table, 2023));
    }

    #[test]
    fn writes_matching_table_verbatim() {
        let dir = tempfile::tempdir().unwrap();
        let config = config(dir.path());
        let mut pages = vec![String::new(); 8];
        pages.push(
            "PREA INCIDENT REPORTS - 2023\nFacility    Incidents\nAlpha       3\n".to_owned(),
        );
        let page_refs: Vec<&str> = pages.iter().map(String::as_str).collect();
        let backend = FixtureBackend::default().with_text("PREA_2023_Report.pdf", &page_refs);
        backend.populate(&config.input_dir);

        let summary = scrape_tables(&config, &backend, &null_progress()).unwrap();

        let expected = config.output_dir.join("PREA_2023_Report_page_9_table_1.csv");
        assert_eq!(summary.written, vec![expected.clone()]);
        assert_eq!(summary.pages_scanned, 9);
        assert_eq!(
            read_lines(&expected),
            vec!["PREA INCIDENT REPORTS - 2023", "Facility,Incidents", "Alpha,3"]
        );
    }

    #[test]
    fn row_count_matches_table_and_other_tables_are_ignored() {
        let dir = tempfile::tempdir().unwrap();
        let config = config(dir.path());
        let report_table = vec![
            row(&["PREA INCIDENT REPORTS - 2020", "", ""]),
            row(&["Facility", "Allegations", "Substantiated"]),
            row(&["North Unit", "4", "1"]),
            row(&["South Unit", "0", "0"]),
            row(&["TOTALS", "4", "1"]),
        ];
        let staffing = vec![row(&["Staffing levels"]), row(&["North", "12"])];
        let backend = FixtureBackend::default().with_tables(
            "PREA_Report_2021.pdf",
            vec![vec![staffing.clone()], vec![staffing, report_table.clone()]],
        );
        backend.populate(&config.input_dir);

        let summary = scrape_tables(&config, &backend, &null_progress()).unwrap();

        let expected = config.output_dir.join("PREA_Report_2021_page_2_table_2.csv");
        assert_eq!(summary.written, vec![expected.clone()]);
        assert_eq!(read_lines(&expected).len(), report_table.len());
        assert_eq!(read_lines(&expected)[4], "TOTALS,4,1");
    }

    #[test]
    fn skips_years_outside_allow_list() {
        let dir = tempfile::tempdir().unwrap();
        let config = TablesConfig {
            years: Some(BTreeSet::from([2013])),
            ..config(dir.path())
        };
        let backend = FixtureBackend::default()
            .with_text("PREA_2023.pdf", &["PREA INCIDENT REPORTS - 2023\nA  1\nB  2\n"])
            .with_text("no_year.pdf", &["PREA INCIDENT REPORTS - 2023\nA  1\nB  2\n"]);
        backend.populate(&config.input_dir);

        let summary = scrape_tables(&config, &backend, &null_progress()).unwrap();

        assert_eq!(summary.files_seen, 2);
        assert_eq!(summary.files_skipped, 2);
        assert!(summary.written.is_empty());
        assert_eq!(std::fs::read_dir(&config.output_dir).unwrap().count(), 0);
    }

    #[test]
    fn unreadable_pdf_aborts_the_run() {
        let dir = tempfile::tempdir().unwrap();
        let config = config(dir.path());
        std::fs::write(config.input_dir.join("PREA_2013.pdf"), b"").unwrap();

        let result = scrape_tables(&config, &FixtureBackend::default(), &null_progress());

        assert!(matches!(result, Err(ScrapeError::Pdf(_))));
    }
}
