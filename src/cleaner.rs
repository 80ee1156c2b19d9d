//! Post-hoc re-derivation of the chosen answer from the raw model text.
//!
//! The inline parse keeps the first character of the response, which breaks
//! as soon as a model explains itself before answering. The cleaner instead
//! takes the last stand-alone option letter in the text and writes a
//! `_cleaned` companion file, keeping the inline parse in a backup column.

use std::path::{Path, PathBuf};
use std::sync::OnceLock;

use regex::Regex;

use crate::dataset::{columns, CsvTable};
use crate::error::BenchError;

/// Marker in the file name of cleaned companions.
pub const CLEANED_MARKER: &str = "_cleaned";
pub const NOT_TEXT: &str = "EMPTY";
pub const INVALID: &str = "INVALID";

fn option_letter() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\b[A-E]\b").expect("static regex"))
}

/// Returns the last stand-alone A-E letter in `text` (case-insensitive).
///
/// Letters inside words ("dúvida", "Alternativa") never count.
///
/// `None` yields [`NOT_TEXT`]; text without any option letter yields [`INVALID`].
pub fn extract_last_valid_option(text: Option<&str>) -> String {
    let Some(text) = text else {
        return NOT_TEXT.to_string();
    };
    let upper = text.to_uppercase();
    option_letter()
        .find_iter(&upper)
        .last()
        .map(|m| m.as_str().to_string())
        .unwrap_or_else(|| INVALID.to_string())
}

pub fn is_cleaned(path: &Path) -> bool {
    path.file_name()
        .and_then(|n| n.to_str())
        .is_some_and(|n| n.contains(CLEANED_MARKER))
}

/// Companion path: `runs/x.csv` -> `runs/x_cleaned.csv`.
pub fn cleaned_path(path: &Path) -> PathBuf {
    let stem = path
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or_default();
    path.with_file_name(format!("{stem}{CLEANED_MARKER}.csv"))
}

/// Outcome of cleaning one batch file.
#[derive(Debug, Clone, PartialEq)]
pub struct CleanedFile {
    pub source: PathBuf,
    pub output: PathBuf,
    /// Rows whose chosen answer differs from the inline parse
    pub changed: usize,
}

#[derive(Debug, Default, Clone, PartialEq)]
pub struct CleanSummary {
    pub cleaned: Vec<CleanedFile>,
    /// Already-cleaned files and files without a raw-response column
    pub skipped: Vec<PathBuf>,
    pub failed: Vec<(PathBuf, String)>,
}

/// Cleans one batch file.
///
/// Returns `Ok(None)` when the file has no raw-response column.
pub fn clean_file(path: &Path) -> Result<Option<CleanedFile>, BenchError> {
    let mut table = CsvTable::read(path)?;
    let Some(raw_col) = table.column(columns::RAW_RESPONSE) else {
        log::info!(
            "skipping {}: column '{}' missing",
            path.display(),
            columns::RAW_RESPONSE
        );
        return Ok(None);
    };

    let previous = match table.column(columns::CHOSEN) {
        Some(col) => table.column_values(col),
        None => vec![String::new(); table.len()],
    };
    // an empty cell is a missing response, not an empty string
    let cleaned: Vec<String> = (0..table.len())
        .map(|row| {
            let raw = table.get(row, raw_col);
            extract_last_valid_option((!raw.is_empty()).then_some(raw))
        })
        .collect();
    let changed = previous
        .iter()
        .zip(&cleaned)
        .filter(|(old, new)| old != new)
        .count();

    table.set_column(columns::LEGACY_CHOSEN, previous);
    table.set_column(columns::CHOSEN, cleaned);

    let output = cleaned_path(path);
    table.write(&output)?;
    log::info!("cleaned {} -> {}", path.display(), output.display());
    if changed > 0 {
        log::info!("   {changed} answers corrected in this file");
    }

    Ok(Some(CleanedFile {
        source: path.to_path_buf(),
        output,
        changed,
    }))
}

/// Cleans every `*.csv` in `dir` that is not already a cleaned companion.
///
/// A file that fails to process is recorded and the rest continue.
pub fn clean_directory(dir: &Path) -> Result<CleanSummary, BenchError> {
    let mut files: Vec<PathBuf> = std::fs::read_dir(dir)?
        .filter_map(|entry| entry.ok().map(|e| e.path()))
        .filter(|p| p.extension().is_some_and(|ext| ext == "csv"))
        .collect();
    files.sort();

    if files.is_empty() {
        log::warn!("no .csv files found in {}", dir.display());
    } else {
        log::info!("found {} files to process", files.len());
    }

    let mut summary = CleanSummary::default();
    for path in files {
        if is_cleaned(&path) {
            summary.skipped.push(path);
            continue;
        }
        match clean_file(&path) {
            Ok(Some(done)) => summary.cleaned.push(done),
            Ok(None) => summary.skipped.push(path),
            Err(err) => {
                log::error!("failed to process {}: {err}", path.display());
                summary.failed.push((path, err.to_string()));
            }
        }
    }
    Ok(summary)
}
