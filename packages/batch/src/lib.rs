#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Shared batch utilities for the PREA report extraction pipelines.
//!
//! Every pipeline is the same straight-line loop: list the input folder,
//! infer a report year from each filename, extract rows, and write CSV
//! files. The pieces of that loop that do not depend on the input format
//! live here: [`year`] extraction, input [`files`] discovery, the
//! [`csv_writer`], [`config`] loading, [`progress`] reporting, and the
//! [`RunSummary`] each pipeline returns.

pub mod config;
pub mod csv_writer;
pub mod files;
pub mod progress;
pub mod year;

use std::path::PathBuf;

use serde::Serialize;

/// Errors that can occur in shared batch plumbing.
#[derive(Debug, thiserror::Error)]
pub enum BatchError {
    /// An I/O operation failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Writing a CSV file failed.
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// The configuration could not be parsed or is inconsistent.
    #[error("Invalid configuration: {message}")]
    Config {
        /// Description of what went wrong.
        message: String,
    },
}

/// Counters for one pipeline run.
///
/// Skips are the filtering decisions (unknown year, year outside the
/// allow-list, no usable data); they are logged and never abort a run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RunSummary {
    /// Input files matching the pipeline's extensions.
    pub files_seen: u64,
    /// Files skipped before any page was read.
    pub files_skipped: u64,
    /// Pages (or worksheets) examined.
    pub pages_scanned: u64,
    /// Every CSV file written, in write order.
    pub written: Vec<PathBuf>,
}

impl RunSummary {
    /// Number of CSV files written.
    #[must_use]
    pub fn csvs_written(&self) -> usize {
        self.written.len()
    }

    /// Records a skipped file.
    pub const fn skip_file(&mut self) {
        self.files_skipped += 1;
    }

    /// Records a written CSV file.
    pub fn record_write(&mut self, path: PathBuf) {
        self.written.push(path);
    }
}
