#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! PDF page text and table extraction for PREA incident reports.
//!
//! The scrapers only ever ask a PDF two questions per page: "what is the
//! text?" and "what tables are on it?". Both live behind the narrow
//! [`PdfDocument`] trait so the report heuristics can be exercised against
//! synthetic pages ([`PageTexts`]) without a real PDF engine.
//!
//! The production backend, [`PdfExtractBackend`], uses pure-Rust text
//! extraction ([`pdf_extract`]) and finds tables in the laid-out text with
//! [`text_table::detect_tables`].

pub mod text_table;

use std::panic::{self, AssertUnwindSafe};
use std::path::Path;

use prea_report_models::{Table, TableSettings};

/// Errors specific to PDF extraction.
#[derive(Debug, thiserror::Error)]
pub enum PdfError {
    /// Reading the PDF file failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// PDF text extraction failed.
    #[error("PDF extraction error: {0}")]
    Extraction(String),

    /// A page outside the document was requested.
    #[error("page {page} is out of range (document has {page_count} pages)")]
    PageOutOfRange {
        /// The requested 1-based page number.
        page: u32,
        /// Number of pages in the document.
        page_count: u32,
    },
}

/// An opened PDF, addressed by 1-based page number.
pub trait PdfDocument {
    /// Number of pages in the document.
    fn page_count(&self) -> u32;

    /// Returns the plain text of `page`, or `None` when the page has no
    /// extractable text.
    ///
    /// # Errors
    ///
    /// Returns [`PdfError::PageOutOfRange`] for a page the document does
    /// not have.
    fn extract_text(&self, page: u32) -> Result<Option<String>, PdfError>;

    /// Returns every table detected on `page`, top to bottom.
    ///
    /// # Errors
    ///
    /// Returns [`PdfError::PageOutOfRange`] for a page the document does
    /// not have.
    fn extract_tables(&self, page: u32) -> Result<Vec<Table>, PdfError>;
}

/// Opens PDF files as [`PdfDocument`]s.
pub trait PdfBackend {
    /// Opens the PDF at `path`.
    ///
    /// # Errors
    ///
    /// Returns [`PdfError`] if the file cannot be read or parsed.
    fn open(&self, path: &Path) -> Result<Box<dyn PdfDocument>, PdfError>;
}

/// A document held as one string of laid-out text per page.
#[derive(Debug, Clone)]
pub struct PageTexts {
    pages: Vec<String>,
    settings: TableSettings,
}

impl PageTexts {
    /// Creates a document from page texts (page 1 first) using default
    /// table settings.
    #[must_use]
    pub fn new(pages: Vec<String>) -> Self {
        Self {
            pages,
            settings: TableSettings::default(),
        }
    }

    /// Overrides the table detection settings.
    #[must_use]
    pub const fn with_settings(mut self, settings: TableSettings) -> Self {
        self.settings = settings;
        self
    }

    fn page(&self, page: u32) -> Result<&str, PdfError> {
        page.checked_sub(1)
            .and_then(|idx| self.pages.get(idx as usize))
            .map(String::as_str)
            .ok_or(PdfError::PageOutOfRange {
                page,
                page_count: self.page_count(),
            })
    }
}

impl PdfDocument for PageTexts {
    fn page_count(&self) -> u32 {
        u32::try_from(self.pages.len()).unwrap_or(u32::MAX)
    }

    fn extract_text(&self, page: u32) -> Result<Option<String>, PdfError> {
        let text = self.page(page)?;
        if text.trim().is_empty() {
            return Ok(None);
        }
        Ok(Some(text.to_owned()))
    }

    fn extract_tables(&self, page: u32) -> Result<Vec<Table>, PdfError> {
        let text = self.page(page)?;
        Ok(text_table::detect_tables(text, &self.settings))
    }
}

/// [`PdfBackend`] built on [`pdf_extract`].
#[derive(Debug, Clone, Default)]
pub struct PdfExtractBackend {
    settings: TableSettings,
}

impl PdfExtractBackend {
    /// Creates a backend that detects tables with `settings`.
    #[must_use]
    pub const fn new(settings: TableSettings) -> Self {
        Self { settings }
    }
}

impl PdfBackend for PdfExtractBackend {
    fn open(&self, path: &Path) -> Result<Box<dyn PdfDocument>, PdfError> {
        let bytes = std::fs::read(path)?;
        log::debug!("Read {} bytes from {}", bytes.len(), path.display());

        let pages = extract_pages(&bytes)?;
        log::debug!("Extracted {} page(s) of text from {}", pages.len(), path.display());

        Ok(Box::new(PageTexts::new(pages).with_settings(self.settings)))
    }
}

/// Extracts one string per page.
///
/// `pdf_extract` panics on some malformed documents instead of returning
/// an error, so the call runs inside [`panic::catch_unwind`].
fn extract_pages(bytes: &[u8]) -> Result<Vec<String>, PdfError> {
    let result = panic::catch_unwind(AssertUnwindSafe(|| {
        pdf_extract::extract_text_from_mem_by_pages(bytes)
    }));
    match result {
        Ok(Ok(pages)) => Ok(pages),
        Ok(Err(e)) => Err(PdfError::Extraction(format!(
            "failed to extract text from PDF: {e}"
        ))),
        Err(_) => Err(PdfError::Extraction(
            "PDF extraction panicked (malformed document)".to_owned(),
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn doc() -> PageTexts {
        PageTexts::new(vec![
            "Cover page".to_owned(),
            "   \n".to_owned(),
            "PREA INCIDENT REPORTS - 2022\nFacility  Incidents\nAlpha  3\n".to_owned(),
        ])
    }

    #[test]
    fn pages_are_one_based() {
        let doc = doc();
        assert_eq!(doc.page_count(), 3);
        assert_eq!(doc.extract_text(1).unwrap().as_deref(), Some("Cover page"));
        assert!(matches!(
            doc.extract_text(0),
            Err(PdfError::PageOutOfRange { page: 0, page_count: 3 })
        ));
        assert!(matches!(
            doc.extract_tables(4),
            Err(PdfError::PageOutOfRange { page: 4, .. })
        ));
    }

    #[test]
    fn blank_page_has_no_text() {
        assert_eq!(doc().extract_text(2).unwrap(), None);
    }

    #[test]
    fn tables_come_from_page_text() {
        let tables = doc().extract_tables(3).unwrap();
        assert_eq!(tables.len(), 1);
        assert_eq!(tables[0][0], vec!["PREA INCIDENT REPORTS - 2022"]);
        assert_eq!(tables[0].len(), 3);
    }

    #[test]
    fn non_pdf_bytes_are_an_extraction_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("PREA_2023.pdf");
        std::fs::write(&path, b"not a pdf").unwrap();

        let result = PdfExtractBackend::default().open(&path);

        assert!(matches!(result, Err(PdfError::Extraction(_))));
    }

    #[test]
    fn missing_file_is_an_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let result = PdfExtractBackend::default().open(&dir.path().join("absent.pdf"));
        assert!(matches!(result, Err(PdfError::Io(_))));
    }
}
