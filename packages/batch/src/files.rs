//! Input discovery and output folder setup.

use std::path::{Path, PathBuf};

use crate::BatchError;

/// Lists the files in `dir` whose extension is one of `extensions`,
/// compared ASCII case-insensitively, sorted by filename.
///
/// Subdirectories are ignored; the listing is not recursive.
///
/// # Errors
///
/// Returns [`BatchError::Io`] if the directory cannot be read.
pub fn list_inputs(dir: &Path, extensions: &[&str]) -> Result<Vec<PathBuf>, BatchError> {
    let mut paths = Vec::new();

    for entry in std::fs::read_dir(dir)? {
        let path = entry?.path();
        if !path.is_file() {
            continue;
        }
        let matches = path
            .extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| extensions.iter().any(|e| ext.eq_ignore_ascii_case(e)));
        if matches {
            paths.push(path);
        }
    }

    paths.sort_by(|a, b| a.file_name().cmp(&b.file_name()));
    log::debug!(
        "Found {} input file(s) in {} matching {extensions:?}",
        paths.len(),
        dir.display()
    );

    Ok(paths)
}

/// Creates `dir` (and its parents) if it does not exist yet.
///
/// # Errors
///
/// Returns [`BatchError::Io`] if the directory cannot be created.
pub fn ensure_dir(dir: &Path) -> Result<(), BatchError> {
    std::fs::create_dir_all(dir)?;
    Ok(())
}

/// The final path component as UTF-8, lossily converted.
#[must_use]
pub fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default()
}

/// The filename without its last extension, lossily converted.
#[must_use]
pub fn file_stem(path: &Path) -> String {
    path.file_stem()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default()
}
