//! Interactive menu for running a pipeline without memorizing flags.

use std::path::{Path, PathBuf};

use dialoguer::{Confirm, Input, Select};
use prea_cli_utils::MultiProgress;
use prea_report_models::{Config, PipelineKind, YearFallback};

use crate::pipeline::{self, DirOverrides};

const FALLBACKS: &[YearFallback] = &[YearFallback::Skip, YearFallback::Filename];

const fn fallback_label(fallback: YearFallback) -> &'static str {
    match fallback {
        YearFallback::Skip => "Skip the page",
        YearFallback::Filename => "Use the year from the filename",
    }
}

/// Prompts for a pipeline and its folders, then runs it.
///
/// # Errors
///
/// Returns an error if a prompt fails or the pipeline aborts.
pub fn run(mut config: Config, multi: &MultiProgress) -> Result<(), Box<dyn std::error::Error>> {
    let labels: Vec<&str> = PipelineKind::ALL.iter().map(PipelineKind::label).collect();

    let idx = Select::new()
        .with_prompt("What would you like to do?")
        .items(&labels)
        .default(0)
        .interact()?;
    let kind = PipelineKind::ALL[idx];

    let (input_dir, output_dir) = pipeline::dirs_for(&config, kind);
    let overrides = DirOverrides {
        input_dir: Some(prompt_dir("Input folder", &input_dir)?),
        output_dir: Some(prompt_dir("Output folder", &output_dir)?),
    };
    pipeline::apply_overrides(&mut config, kind, overrides);

    if kind == PipelineKind::Text {
        let labels: Vec<&str> = FALLBACKS.iter().map(|f| fallback_label(*f)).collect();
        let default = FALLBACKS
            .iter()
            .position(|f| *f == config.text.year_fallback)
            .unwrap_or(0);
        let idx = Select::new()
            .with_prompt("When a title names neither the report year nor the year before")
            .items(&labels)
            .default(default)
            .interact()?;
        config.text.year_fallback = FALLBACKS[idx];
    }

    let proceed = Confirm::new()
        .with_prompt(format!("Run \"{}\"?", kind.label()))
        .default(true)
        .interact()?;
    if !proceed {
        println!("Cancelled.");
        return Ok(());
    }

    let summary = pipeline::run(kind, &config, multi)?;
    println!("Wrote {} CSV file(s).", summary.csvs_written());

    Ok(())
}

fn prompt_dir(prompt: &str, default: &Path) -> Result<PathBuf, Box<dyn std::error::Error>> {
    let input: String = Input::new()
        .with_prompt(prompt)
        .default(default.display().to_string())
        .interact_text()?;

    Ok(PathBuf::from(input.trim()))
}
