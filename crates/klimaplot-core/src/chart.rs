//! Dual-axis chart composition.
//!
//! Every chart draws temperature on the left axis and relative humidity on an
//! independently scaled right axis over a shared time axis; the two
//! measurements have incommensurable ranges and must not share a scale. Axis
//! bounds come from the caller, not from the data, so all charts of a batch
//! stay visually comparable.

use std::ops::Range;
use std::path::{Path, PathBuf};

use klimaplot_parser::StructuredTable;
use plotters::coord::ranged1d::{DefaultFormatting, KeyPointHint, Ranged};
use plotters::coord::Shift;
use plotters::prelude::*;
use plotters::style::FontTransform;

use crate::column_resolver::ColumnBinding;
use crate::config::PlotSpec;
use crate::error::{PipelineError, Result};

pub const COMBINED_ARTIFACT_NAME: &str = "Plots.png";
pub const INDIVIDUAL_ARTIFACT_SUFFIX: &str = "_plot.png";

const GRID_COLUMNS: usize = 2;

// Figure geometry in inches; dpi scales it into pixels.
const COMBINED_WIDTH_IN: f64 = 15.0;
const COMBINED_ROW_HEIGHT_IN: f64 = 5.0;
const SINGLE_WIDTH_IN: f64 = 8.0;
const SINGLE_HEIGHT_IN: f64 = 6.0;

const TEMPERATURE_COLOR: RGBColor = RED;
const HUMIDITY_COLOR: RGBColor = BLUE;

/// One chartable series extracted from a structured table.
///
/// The title doubles as the artifact base name in individual mode.
#[derive(Debug, Clone)]
pub struct ChartSeries {
    pub title: String,
    pub timestamps: Vec<String>,
    pub temperature: Vec<(usize, f64)>,
    pub humidity: Vec<(usize, f64)>,
}

impl ChartSeries {
    /// Extracts the bound columns of `table` into plottable point vectors.
    /// Cells that do not parse as numbers become gaps rather than points.
    pub fn from_table(
        title: impl Into<String>,
        table: &StructuredTable,
        binding: &ColumnBinding,
    ) -> Self {
        let timestamps = table
            .column(&binding.timestamp)
            .map(|cells| cells.iter().map(|cell| cell.to_string()).collect())
            .unwrap_or_default();

        Self {
            title: title.into(),
            timestamps,
            temperature: numeric_points(table, &binding.temperature),
            humidity: numeric_points(table, &binding.humidity),
        }
    }

    pub fn len(&self) -> usize {
        self.timestamps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.timestamps.is_empty()
    }
}

fn numeric_points(table: &StructuredTable, column: &str) -> Vec<(usize, f64)> {
    table
        .column(column)
        .map(|cells| {
            cells
                .iter()
                .enumerate()
                .filter_map(|(index, cell)| parse_optional_f64(cell).map(|value| (index, value)))
                .collect()
        })
        .unwrap_or_default()
}

// Logger exports use either decimal separator depending on locale.
fn parse_optional_f64(cell: &str) -> Option<f64> {
    let trimmed = cell.trim();
    if trimmed.is_empty() {
        return None;
    }
    trimmed
        .parse::<f64>()
        .ok()
        .or_else(|| trimmed.replace(',', ".").parse::<f64>().ok())
}

/// X coordinate over sample indices whose key points are the
/// stride-subsampled tick positions (stride = samples / tick count). Tick
/// labels are the raw timestamp strings looked up by index.
#[derive(Debug, Clone)]
pub struct SampleAxis {
    len: usize,
    tick_count: usize,
}

impl SampleAxis {
    pub fn new(len: usize, tick_count: usize) -> Self {
        Self { len, tick_count }
    }
}

impl Ranged for SampleAxis {
    type FormatOption = DefaultFormatting;
    type ValueType = usize;

    fn map(&self, value: &usize, limit: (i32, i32)) -> i32 {
        if self.len <= 1 {
            return limit.0;
        }
        let fraction = *value as f64 / (self.len - 1) as f64;
        limit.0 + (fraction * (limit.1 - limit.0) as f64) as i32
    }

    fn key_points<Hint: KeyPointHint>(&self, _hint: Hint) -> Vec<usize> {
        tick_positions(self.len, self.tick_count)
    }

    fn range(&self) -> Range<usize> {
        0..self.len
    }
}

/// Stride-subsampled tick indices across `len` samples.
pub fn tick_positions(len: usize, tick_count: usize) -> Vec<usize> {
    if len == 0 || tick_count == 0 {
        return Vec::new();
    }
    let stride = (len / tick_count).max(1);
    (0..len).step_by(stride).collect()
}

/// Combined-mode grid dimensions for `n` inputs: two columns, ceil(n/2) rows.
pub fn grid_dimensions(n: usize) -> (usize, usize) {
    ((n + GRID_COLUMNS - 1) / GRID_COLUMNS, GRID_COLUMNS)
}

/// Combined-mode figure: one backend split into a fixed two-column grid sized
/// for the whole batch before any per-file work. The cell count never changes
/// once allocated; an odd batch leaves its trailing cell undrawn.
pub struct ChartGrid<'a> {
    root: DrawingArea<BitMapBackend<'a>, Shift>,
    cells: Vec<DrawingArea<BitMapBackend<'a>, Shift>>,
    path: &'a Path,
}

impl<'a> ChartGrid<'a> {
    pub fn new(path: &'a Path, input_count: usize, spec: &PlotSpec) -> Result<Self> {
        let (rows, cols) = grid_dimensions(input_count);
        let width = (COMBINED_WIDTH_IN * spec.dpi as f64) as u32;
        let height = (COMBINED_ROW_HEIGHT_IN * rows as f64 * spec.dpi as f64) as u32;

        let root = BitMapBackend::new(path, (width, height)).into_drawing_area();
        root.fill(&WHITE).map_err(render_err)?;
        let cells = root.split_evenly((rows, cols));

        Ok(Self { root, cells, path })
    }

    pub fn cell_count(&self) -> usize {
        self.cells.len()
    }

    /// Draws one chart into the cell reserved for input position `slot`.
    /// Cells of skipped files stay blank; they are never reflowed.
    pub fn draw(&self, slot: usize, series: &ChartSeries, spec: &PlotSpec) -> Result<()> {
        let cell = self.cells.get(slot).ok_or_else(|| {
            PipelineError::Render(format!(
                "grid slot {slot} out of range ({} cells)",
                self.cells.len()
            ))
        })?;
        draw_dual_axis_chart(cell, series, spec)
    }

    /// Persists the combined artifact. Failure here is fatal for the batch.
    pub fn present(self) -> Result<PathBuf> {
        self.root
            .present()
            .map_err(|err| PipelineError::Persist(format!("{}: {err}", self.path.display())))?;
        Ok(self.path.to_path_buf())
    }
}

/// Renders one file's chart as its own artifact, named after the input stem.
pub fn render_individual(series: &ChartSeries, spec: &PlotSpec, out_dir: &Path) -> Result<PathBuf> {
    let path = out_dir.join(format!("{}{}", series.title, INDIVIDUAL_ARTIFACT_SUFFIX));
    let width = (SINGLE_WIDTH_IN * spec.dpi as f64) as u32;
    let height = (SINGLE_HEIGHT_IN * spec.dpi as f64) as u32;

    let root = BitMapBackend::new(&path, (width, height)).into_drawing_area();
    root.fill(&WHITE).map_err(render_err)?;
    draw_dual_axis_chart(&root, series, spec)?;
    root.present()
        .map_err(|err| PipelineError::Persist(format!("{}: {err}", path.display())))?;
    drop(root);

    Ok(path)
}

fn draw_dual_axis_chart(
    area: &DrawingArea<BitMapBackend<'_>, Shift>,
    series: &ChartSeries,
    spec: &PlotSpec,
) -> Result<()> {
    let (temp_min, temp_max) = spec.temp_range;
    let (relh_min, relh_max) = spec.relh_range;

    // Font and spacing are in pixels; scale them with dpi so charts look the
    // same at every resolution.
    let scale = spec.dpi as f64 / 100.0;
    let stroke = (scale.round() as u32).max(1);

    let x_axis = SampleAxis::new(series.len(), spec.timestamp_count);
    let mut chart = ChartBuilder::on(area)
        .caption(&series.title, ("sans-serif", 18.0 * scale).into_font())
        .margin((10.0 * scale) as u32)
        .x_label_area_size((70.0 * scale) as u32)
        .y_label_area_size((55.0 * scale) as u32)
        .right_y_label_area_size((55.0 * scale) as u32)
        .build_cartesian_2d(x_axis.clone(), temp_min..temp_max)
        .map_err(render_err)?
        .set_secondary_coord(x_axis, relh_min..relh_max);

    let timestamps = &series.timestamps;
    chart
        .configure_mesh()
        .disable_x_mesh()
        .disable_y_mesh()
        .y_desc("Temperature [°C]")
        .axis_style(&TEMPERATURE_COLOR)
        .y_label_style(
            ("sans-serif", 13.0 * scale)
                .into_font()
                .color(&TEMPERATURE_COLOR),
        )
        .x_label_style(
            ("sans-serif", 12.0 * scale)
                .into_font()
                .transform(FontTransform::Rotate90),
        )
        .x_label_formatter(&|index: &usize| {
            timestamps.get(*index).cloned().unwrap_or_default()
        })
        .draw()
        .map_err(render_err)?;

    chart
        .configure_secondary_axes()
        .y_desc("Relative Humidity [%rF]")
        .axis_style(&HUMIDITY_COLOR)
        .label_style(
            ("sans-serif", 13.0 * scale)
                .into_font()
                .color(&HUMIDITY_COLOR),
        )
        .draw()
        .map_err(render_err)?;

    chart
        .draw_series(LineSeries::new(
            series.temperature.iter().copied(),
            TEMPERATURE_COLOR.stroke_width(stroke),
        ))
        .map_err(render_err)?;
    chart
        .draw_secondary_series(LineSeries::new(
            series.humidity.iter().copied(),
            HUMIDITY_COLOR.stroke_width(stroke),
        ))
        .map_err(render_err)?;

    Ok(())
}

fn render_err<E: std::fmt::Display>(err: E) -> PipelineError {
    PipelineError::Render(err.to_string())
}
