#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! PREA incident table scrapers.
//!
//! Three independent strategies for pulling "PREA INCIDENT REPORTS" tables
//! out of a folder of report PDFs:
//!
//! - [`table_match`]: keep structured tables whose first cell carries the
//!   report title for the file's year (or the year before).
//! - [`windowed`]: keep every structured table inside a hand-identified
//!   page window per report year.
//! - [`text_report`]: rebuild the table from free page text when table
//!   detection is unreliable.
//!
//! Each run is sequential and stops at the first library or I/O failure.
//! Filtering decisions (unknown year, no matching table) are logged and
//! skipped.

pub mod table_match;
pub mod text_report;
pub mod windowed;

use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

use prea_batch::{BatchError, RunSummary, files, year};
use prea_pdf::PdfError;

/// File extensions treated as report PDFs.
pub const PDF_EXTENSIONS: &[&str] = &["pdf"];

/// Errors that abort a scrape run.
#[derive(Debug, thiserror::Error)]
pub enum ScrapeError {
    /// Opening or reading a PDF failed.
    #[error(transparent)]
    Pdf(#[from] PdfError),

    /// Listing inputs or writing CSV output failed.
    #[error(transparent)]
    Batch(#[from] BatchError),
}

/// A report PDF whose filename yielded an accepted report year.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReportFile {
    pub path: PathBuf,
    /// Filename including extension.
    pub name: String,
    /// Filename without extension.
    pub stem: String,
    pub year: i32,
}

/// Lists the PDFs in `input_dir` and keeps those whose filename year passes
/// `years` (`None` accepts any year).
///
/// Every PDF counts toward `summary.files_seen`; rejected ones are logged
/// and counted as skipped.
///
/// # Errors
///
/// Returns [`ScrapeError::Batch`] if the folder cannot be listed.
pub fn report_files(
    input_dir: &Path,
    years: Option<&BTreeSet<i32>>,
    summary: &mut RunSummary,
) -> Result<Vec<ReportFile>, ScrapeError> {
    let paths = files::list_inputs(input_dir, PDF_EXTENSIONS)?;
    summary.files_seen += paths.len() as u64;

    let mut reports = Vec::with_capacity(paths.len());
    for path in paths {
        let name = files::file_name(&path);

        let Some(year) = year::extract_year(&name) else {
            log::info!("No valid year found in filename: {name}. Skipping this file.");
            summary.skip_file();
            continue;
        };

        if !prea_report_models::year_allowed(years, year) {
            log::info!("Skipping {name}: year {year} is not in the valid years list.");
            summary.skip_file();
            continue;
        }

        reports.push(ReportFile {
            stem: files::file_stem(&path),
            name,
            path,
            year,
        });
    }

    Ok(reports)
}

#[cfg(test)]
pub(crate) mod fixtures {
    use std::collections::BTreeMap;
    use std::path::Path;

    use prea_pdf::{PageTexts, PdfBackend, PdfDocument, PdfError};
    use prea_report_models::Table;

    /// A document whose tables are given directly, page by page.
    #[derive(Debug, Clone)]
    pub struct TableDoc(pub Vec<Vec<Table>>);

    impl PdfDocument for TableDoc {
        fn page_count(&self) -> u32 {
            u32::try_from(self.0.len()).unwrap()
        }

        fn extract_text(&self, _page: u32) -> Result<Option<String>, PdfError> {
            Ok(None)
        }

        fn extract_tables(&self, page: u32) -> Result<Vec<Table>, PdfError> {
            self.0
                .get(page as usize - 1)
                .cloned()
                .ok_or(PdfError::PageOutOfRange {
                    page,
                    page_count: self.page_count(),
                })
        }
    }

    #[derive(Debug, Clone)]
    pub enum Fixture {
        Text(PageTexts),
        Tables(TableDoc),
    }

    /// Serves fixture documents by filename.
    #[derive(Debug, Default)]
    pub struct FixtureBackend {
        docs: BTreeMap<String, Fixture>,
    }

    impl FixtureBackend {
        pub fn with_text(mut self, name: &str, pages: &[&str]) -> Self {
            let pages = pages.iter().map(|&p| p.to_owned()).collect();
            self.docs
                .insert(name.to_owned(), Fixture::Text(PageTexts::new(pages)));
            self
        }

        pub fn with_tables(mut self, name: &str, pages: Vec<Vec<Table>>) -> Self {
            self.docs
                .insert(name.to_owned(), Fixture::Tables(TableDoc(pages)));
            self
        }

        /// Creates an empty placeholder file for every fixture so the
        /// folder listing finds them.
        pub fn populate(&self, dir: &Path) {
            for name in self.docs.keys() {
                std::fs::write(dir.join(name), b"").unwrap();
            }
        }
    }

    impl PdfBackend for FixtureBackend {
        fn open(&self, path: &Path) -> Result<Box<dyn PdfDocument>, PdfError> {
            let name = path.file_name().unwrap().to_string_lossy().into_owned();
            match self.docs.get(&name) {
                Some(Fixture::Text(doc)) => Ok(Box::new(doc.clone())),
                Some(Fixture::Tables(doc)) => Ok(Box::new(doc.clone())),
                None => Err(PdfError::Extraction(format!("no fixture for {name}"))),
            }
        }
    }

    pub fn row(cells: &[&str]) -> Vec<String> {
        cells.iter().map(|&c| c.to_owned()).collect()
    }

    pub fn read_lines(path: &Path) -> Vec<String> {
        std::fs::read_to_string(path)
            .unwrap()
            .lines()
            .map(str::to_owned)
            .collect()
    }
}
