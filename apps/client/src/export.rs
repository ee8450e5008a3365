//! Writes the current analysis to a dated JSON file.

use std::path::{Path, PathBuf};

use chrono::NaiveDate;
use tracing::info;

use crate::errors::ClientError;
use crate::models::AnalysisResult;

/// `cv_analysis_YYYY-MM-DD.json`
pub fn export_file_name(date: NaiveDate) -> String {
    format!("cv_analysis_{}.json", date.format("%Y-%m-%d"))
}

/// Pretty-printed JSON, two-space indented.
pub fn render(result: &AnalysisResult) -> Result<String, ClientError> {
    Ok(serde_json::to_string_pretty(result)?)
}

/// Writes `result` into `dir` under the dated file name and returns the path.
/// An existing export from the same day is overwritten.
pub fn write_export(
    result: &AnalysisResult,
    dir: &Path,
    date: NaiveDate,
) -> Result<PathBuf, ClientError> {
    std::fs::create_dir_all(dir)?;
    let path = dir.join(export_file_name(date));
    std::fs::write(&path, render(result)?)?;
    info!("Exported analysis to {}", path.display());
    Ok(path)
}
