//! Runs one pipeline against the resolved configuration.
//!
//! Shared by the subcommands and the interactive menu so both paths build
//! the same backend and progress bar and report the same summary.

use std::path::PathBuf;
use std::time::Instant;

use prea_batch::RunSummary;
use prea_cli_utils::{IndicatifProgress, MultiProgress};
use prea_pdf::PdfExtractBackend;
use prea_report_models::{Config, PipelineKind};

/// Folder overrides applied on top of a pipeline's configured section.
#[derive(Debug, Default, Clone)]
pub struct DirOverrides {
    pub input_dir: Option<PathBuf>,
    pub output_dir: Option<PathBuf>,
}

/// Applies `overrides` to the section of `config` that `kind` reads.
pub fn apply_overrides(config: &mut Config, kind: PipelineKind, overrides: DirOverrides) {
    let (input_dir, output_dir) = match kind {
        PipelineKind::Excel => (&mut config.excel.input_dir, &mut config.excel.output_dir),
        PipelineKind::Tables => (&mut config.tables.input_dir, &mut config.tables.output_dir),
        PipelineKind::Windowed => (
            &mut config.windowed.input_dir,
            &mut config.windowed.output_dir,
        ),
        PipelineKind::Text => (&mut config.text.input_dir, &mut config.text.output_dir),
    };

    if let Some(dir) = overrides.input_dir {
        *input_dir = dir;
    }
    if let Some(dir) = overrides.output_dir {
        *output_dir = dir;
    }
}

/// Returns the input and output folders `kind` will use.
#[must_use]
pub fn dirs_for(config: &Config, kind: PipelineKind) -> (PathBuf, PathBuf) {
    match kind {
        PipelineKind::Excel => (
            config.excel.input_dir.clone(),
            config.excel.output_dir.clone(),
        ),
        PipelineKind::Tables => (
            config.tables.input_dir.clone(),
            config.tables.output_dir.clone(),
        ),
        PipelineKind::Windowed => (
            config.windowed.input_dir.clone(),
            config.windowed.output_dir.clone(),
        ),
        PipelineKind::Text => (
            config.text.input_dir.clone(),
            config.text.output_dir.clone(),
        ),
    }
}

/// Runs `kind` to completion.
///
/// # Errors
///
/// Returns the first error the pipeline hits; the batch stops there.
pub fn run(
    kind: PipelineKind,
    config: &Config,
    multi: &MultiProgress,
) -> Result<RunSummary, Box<dyn std::error::Error>> {
    let start = Instant::now();
    let progress = IndicatifProgress::files_bar(multi, kind.label());
    let backend = PdfExtractBackend::new(config.pdf);

    let summary = match kind {
        PipelineKind::Excel => prea_excel::convert_all(&config.excel, &progress)?,
        PipelineKind::Tables => {
            prea_scraper::table_match::scrape_tables(&config.tables, &backend, &progress)?
        }
        PipelineKind::Windowed => {
            prea_scraper::windowed::scrape_windowed(&config.windowed, &backend, &progress)?
        }
        PipelineKind::Text => {
            prea_scraper::text_report::scrape_text(&config.text, &backend, &progress)?
        }
    };

    log::info!(
        "{kind} complete: {} file(s) seen, {} skipped, {} CSV(s) written in {:.1}s",
        summary.files_seen,
        summary.files_skipped,
        summary.csvs_written(),
        start.elapsed().as_secs_f64()
    );

    Ok(summary)
}
