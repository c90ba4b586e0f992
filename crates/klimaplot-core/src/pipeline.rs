//! Batch orchestration: header detection → re-parse → column resolution →
//! chart composition per input file.
//!
//! Per-file failures are recorded and logged, never fatal for the batch; only
//! artifact persistence failures (and invalid configuration) propagate. Files
//! are processed strictly in input order, each attempted exactly once.

use std::path::{Path, PathBuf};

use klimaplot_parser::{read_table_file, StructuredTable};
use serde::Serialize;
use tracing::{info, warn};

use crate::chart::{self, ChartGrid, ChartSeries, COMBINED_ARTIFACT_NAME};
use crate::column_resolver::resolve_columns;
use crate::config::{LayoutMode, PipelineConfig};
use crate::error::Result;
use crate::header_matcher::find_header_row;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FileStatus {
    Rendered,
    HeaderNotFound,
    ColumnsAbsent,
    ReadError,
}

#[derive(Debug, Clone, Serialize)]
pub struct FileReport {
    pub path: String,
    pub status: FileStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

/// Outcome of one batch run. Held by the caller; the core keeps no state
/// across batches.
#[derive(Debug, Serialize)]
pub struct BatchReport {
    pub reports: Vec<FileReport>,
    pub artifacts: Vec<PathBuf>,
}

impl BatchReport {
    pub fn rendered_count(&self) -> usize {
        self.reports
            .iter()
            .filter(|report| report.status == FileStatus::Rendered)
            .count()
    }

    pub fn skipped_count(&self) -> usize {
        self.reports.len() - self.rendered_count()
    }

    /// True when no input produced a chart, as opposed to a persistence
    /// failure, which is an error instead.
    pub fn is_all_failed(&self) -> bool {
        self.rendered_count() == 0
    }
}

/// Runs the full pipeline over `paths`, writing artifacts under `out_dir`.
pub fn run_batch(paths: &[PathBuf], config: &PipelineConfig, out_dir: &Path) -> Result<BatchReport> {
    config.validate()?;
    std::fs::create_dir_all(out_dir)?;

    if config.plot.layout == LayoutMode::Combined && paths.len() >= 2 {
        run_combined(paths, config, out_dir)
    } else {
        run_individual(paths, config, out_dir)
    }
}

fn run_combined(paths: &[PathBuf], config: &PipelineConfig, out_dir: &Path) -> Result<BatchReport> {
    // The grid is sized for the whole batch up front; every input owns the
    // cell at its batch position, rendered or not.
    let combined_path = out_dir.join(COMBINED_ARTIFACT_NAME);
    let grid = ChartGrid::new(&combined_path, paths.len(), &config.plot)?;

    let mut reports = Vec::with_capacity(paths.len());
    for (slot, path) in paths.iter().enumerate() {
        match prepare_series(path, config) {
            Ok(series) => {
                grid.draw(slot, &series, &config.plot)?;
                reports.push(report_rendered(path));
            }
            Err(outcome) => reports.push(report_skipped(path, outcome)),
        }
    }

    let mut artifacts = Vec::new();
    if reports
        .iter()
        .any(|report| report.status == FileStatus::Rendered)
    {
        artifacts.push(grid.present()?);
    } else {
        // The backend flushes its canvas on drop; an all-failed batch must
        // not leave a blank grid behind as if it were an artifact.
        drop(grid);
        let _ = std::fs::remove_file(&combined_path);
    }

    info!(
        files = paths.len(),
        artifacts = artifacts.len(),
        "combined batch finished"
    );
    Ok(BatchReport { reports, artifacts })
}

fn run_individual(
    paths: &[PathBuf],
    config: &PipelineConfig,
    out_dir: &Path,
) -> Result<BatchReport> {
    let mut reports = Vec::with_capacity(paths.len());
    let mut artifacts = Vec::new();

    for path in paths {
        match prepare_series(path, config) {
            Ok(series) => {
                // Saved immediately; a later file's failure cannot undo it.
                artifacts.push(chart::render_individual(&series, &config.plot, out_dir)?);
                reports.push(report_rendered(path));
            }
            Err(outcome) => reports.push(report_skipped(path, outcome)),
        }
    }

    info!(
        files = paths.len(),
        artifacts = artifacts.len(),
        "individual batch finished"
    );
    Ok(BatchReport { reports, artifacts })
}

fn prepare_series(
    path: &Path,
    config: &PipelineConfig,
) -> std::result::Result<ChartSeries, (FileStatus, String)> {
    let raw = read_table_file(path).map_err(|err| (FileStatus::ReadError, err.to_string()))?;

    let header_row = find_header_row(&raw, &config.header).ok_or_else(|| {
        (
            FileStatus::HeaderNotFound,
            "no row reached the match threshold".to_string(),
        )
    })?;

    let table = StructuredTable::from_raw(&raw, header_row).ok_or_else(|| {
        (
            FileStatus::HeaderNotFound,
            format!("header row {header_row} out of range"),
        )
    })?;

    let binding = resolve_columns(&table, &config.variants).ok_or_else(|| {
        (
            FileStatus::ColumnsAbsent,
            "temperature and/or humidity columns not found".to_string(),
        )
    })?;

    Ok(ChartSeries::from_table(file_stem(path), &table, &binding))
}

fn file_stem(path: &Path) -> String {
    path.file_stem()
        .map(|stem| stem.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

fn report_rendered(path: &Path) -> FileReport {
    FileReport {
        path: path.display().to_string(),
        status: FileStatus::Rendered,
        message: None,
    }
}

fn report_skipped(path: &Path, (status, message): (FileStatus, String)) -> FileReport {
    warn!(
        file = %path.display(),
        status = ?status,
        message = %message,
        "skipping file"
    );
    FileReport {
        path: path.display().to_string(),
        status,
        message: Some(message),
    }
}
