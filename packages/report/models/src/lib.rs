#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Row, table, and pipeline configuration types for PREA report extraction.
//!
//! Every pipeline in the toolchain (spreadsheet conversion and the three PDF
//! scrapers) consumes one section of [`Config`]. The defaults here mirror the
//! embedded `default.toml` shipped with `prea_batch`, so a config file only
//! needs to name the settings it changes.

use std::collections::BTreeSet;
use std::ops::RangeInclusive;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use strum_macros::{AsRefStr, Display, EnumString};

/// A single extracted row: ordered string fields.
pub type Row = Vec<String>;

/// An extracted table: ordered rows, the first of which is usually a title
/// or header row.
pub type Table = Vec<Row>;

/// Title marker that opens every PREA incident table.
pub const REPORT_MARKER: &str = "PREA INCIDENT REPORTS";

/// Line marker that closes a PREA incident table in page text.
pub const TOTALS_MARKER: &str = "TOTALS";

/// The batch pipelines an operator can run.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    AsRefStr,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum PipelineKind {
    /// Spreadsheet to CSV conversion.
    Excel,
    /// Structured tables whose first cell carries the report title.
    Tables,
    /// Structured tables inside a fixed page window per report year.
    Windowed,
    /// Report reconstruction from free page text.
    Text,
}

impl PipelineKind {
    pub const ALL: &[Self] = &[Self::Excel, Self::Tables, Self::Windowed, Self::Text];

    /// Human-readable menu label.
    #[must_use]
    pub const fn label(&self) -> &'static str {
        match self {
            Self::Excel => "Convert spreadsheets to CSV",
            Self::Tables => "Scrape PDF tables by report title",
            Self::Windowed => "Scrape PDF tables in known page windows",
            Self::Text => "Reconstruct reports from PDF text",
        }
    }
}

/// What the free-text scraper does when the title line names neither the
/// report year nor the year before it.
#[derive(
    Debug,
    Clone,
    Copy,
    Default,
    PartialEq,
    Eq,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    AsRefStr,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum YearFallback {
    /// Drop the page without writing anything.
    #[default]
    Skip,
    /// Use the year parsed from the document's filename.
    Filename,
}

/// An inclusive, 1-based page range known to hold the data for one report
/// year.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PageWindow {
    /// Report year this window applies to.
    pub year: i32,
    /// First page to inspect (1-based).
    pub start: u32,
    /// Last page to inspect. `None` runs through the end of the document.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end: Option<u32>,
}

impl PageWindow {
    /// Returns the pages of this window that exist in a document with
    /// `page_count` pages.
    ///
    /// The range is empty when the window starts past the last page.
    #[must_use]
    pub fn pages(&self, page_count: u32) -> RangeInclusive<u32> {
        let end = self.end.map_or(page_count, |end| end.min(page_count));
        self.start..=end
    }

    /// Whether this window asks for pages the document does not have.
    #[must_use]
    pub fn exceeds(&self, page_count: u32) -> bool {
        self.start > page_count || self.end.is_some_and(|end| end > page_count)
    }
}

/// Settings for detecting tables in laid-out page text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct TableSettings {
    /// Minimum run of spaces that separates two cells on a line.
    pub min_column_gap: usize,
    /// Minimum number of multi-cell lines a block needs to count as a table.
    pub min_table_rows: usize,
}

impl Default for TableSettings {
    fn default() -> Self {
        Self {
            min_column_gap: 2,
            min_table_rows: 2,
        }
    }
}

/// Spreadsheet conversion settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ExcelConfig {
    /// Folder scanned for `.xlsx`/`.xls` files.
    pub input_dir: PathBuf,
    /// Folder receiving one CSV per workbook.
    pub output_dir: PathBuf,
}

impl Default for ExcelConfig {
    fn default() -> Self {
        Self {
            input_dir: PathBuf::from("excel_files"),
            output_dir: PathBuf::from("clean_csvs"),
        }
    }
}

/// Title-matching table scraper settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct TablesConfig {
    pub input_dir: PathBuf,
    pub output_dir: PathBuf,
    /// Report years this scraper understands. `None` accepts any year.
    ///
    /// A section that leaves `years` out accepts any year; only an omitted
    /// section keeps the built-in list.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub years: Option<BTreeSet<i32>>,
}

impl Default for TablesConfig {
    fn default() -> Self {
        Self {
            input_dir: PathBuf::from("pdf_files"),
            output_dir: PathBuf::from("csv_files"),
            years: Some(BTreeSet::from([2013, 2020, 2021, 2022, 2023])),
        }
    }
}

/// Page-windowed table scraper settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct WindowedConfig {
    pub input_dir: PathBuf,
    pub output_dir: PathBuf,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub years: Option<BTreeSet<i32>>,
    /// Hand-identified page ranges, one per report year.
    pub page_windows: Vec<PageWindow>,
}

impl WindowedConfig {
    /// Returns the page window configured for `year`, if any.
    #[must_use]
    pub fn window_for(&self, year: i32) -> Option<&PageWindow> {
        self.page_windows.iter().find(|w| w.year == year)
    }
}

impl Default for WindowedConfig {
    fn default() -> Self {
        Self {
            input_dir: PathBuf::from("pdf_files"),
            output_dir: PathBuf::from("csv_files"),
            years: Some(BTreeSet::from([2013, 2021, 2023])),
            page_windows: vec![
                PageWindow {
                    year: 2013,
                    start: 2,
                    end: Some(5),
                },
                PageWindow {
                    year: 2021,
                    start: 10,
                    end: None,
                },
                PageWindow {
                    year: 2023,
                    start: 9,
                    end: None,
                },
            ],
        }
    }
}

/// Free-text scraper settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct TextConfig {
    pub input_dir: PathBuf,
    pub output_dir: PathBuf,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub years: Option<BTreeSet<i32>>,
    pub year_fallback: YearFallback,
}

impl Default for TextConfig {
    fn default() -> Self {
        Self {
            input_dir: PathBuf::from("pdf_files"),
            output_dir: PathBuf::from("csv_files"),
            years: None,
            year_fallback: YearFallback::Skip,
        }
    }
}

/// Complete toolchain configuration, one section per pipeline.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    pub excel: ExcelConfig,
    pub tables: TablesConfig,
    pub windowed: WindowedConfig,
    pub text: TextConfig,
    pub pdf: TableSettings,
}

/// Whether `year` passes an optional allow-list.
#[must_use]
pub fn year_allowed(years: Option<&BTreeSet<i32>>, year: i32) -> bool {
    years.is_none_or(|years| years.contains(&year))
}
