//! Report-year inference from filenames.

use std::sync::LazyLock;

use regex::Regex;

static YEAR_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new("[0-9]{4}").unwrap_or_else(|e| panic!("bad year regex: {e}")));

/// Returns the first run of four digits in `filename` as a year.
///
/// There is no plausibility check: `report_0042.pdf` yields `42`, and a
/// filename carrying an ID before the year yields the ID.
///
/// ```
/// use prea_batch::year::extract_year;
///
/// assert_eq!(extract_year("PREA_Report_2021_final.pdf"), Some(2021));
/// assert_eq!(extract_year("annual_report.pdf"), None);
/// ```
#[must_use]
pub fn extract_year(filename: &str) -> Option<i32> {
    YEAR_PATTERN
        .find(filename)
        .and_then(|m| m.as_str().parse().ok())
}

/// The years a report's title may name: its own year, or the year before it
/// when the reporting period spans a fiscal boundary.
#[must_use]
pub const fn title_years(report_year: i32) -> [i32; 2] {
    [report_year - 1, report_year]
}
