use klimaplot_core::chart::{
    grid_dimensions, render_individual, tick_positions, ChartGrid, ChartSeries, SampleAxis,
};
use klimaplot_core::column_resolver::ColumnBinding;
use klimaplot_core::config::{LayoutMode, PlotSpec};
use klimaplot_parser::{RawTable, StructuredTable};
use plotters::coord::ranged1d::Ranged;

fn small_spec(layout: LayoutMode) -> PlotSpec {
    PlotSpec {
        dpi: 40,
        timestamp_count: 5,
        layout,
        ..PlotSpec::default()
    }
}

fn sample_series() -> ChartSeries {
    let raw = RawTable::new(vec![
        vec!["Datum/Uhrzeit".into(), "Temperatur[°C]".into(), "rel.Luftfeuchte[%rF]".into()],
        vec!["01.03.2024 00:00".into(), "21,4".into(), "45".into()],
        vec!["01.03.2024 00:15".into(), "21.6".into(), "46".into()],
        vec!["01.03.2024 00:30".into(), "n/a".into(), "47".into()],
        vec!["01.03.2024 00:45".into(), "21,3".into(), "".into()],
    ]);
    let table = StructuredTable::from_raw(&raw, 0).expect("header row in range");
    let binding = ColumnBinding {
        timestamp: "Datum/Uhrzeit".to_string(),
        temperature: "Temperatur[°C]".to_string(),
        humidity: "rel.Luftfeuchte[%rF]".to_string(),
    };
    ChartSeries::from_table("sample", &table, &binding)
}

#[test]
fn grid_is_two_columns_with_half_rows_rounded_up() {
    assert_eq!(grid_dimensions(1), (1, 2));
    assert_eq!(grid_dimensions(2), (1, 2));
    assert_eq!(grid_dimensions(3), (2, 2));
    assert_eq!(grid_dimensions(4), (2, 2));
    assert_eq!(grid_dimensions(5), (3, 2));
}

#[test]
fn tick_positions_follow_the_stride() {
    assert_eq!(tick_positions(100, 10), (0..100).step_by(10).collect::<Vec<_>>());
    assert_eq!(tick_positions(4, 10), vec![0, 1, 2, 3]);
    assert!(tick_positions(0, 10).is_empty());
    assert!(tick_positions(10, 0).is_empty());
}

#[test]
fn series_parses_both_decimal_separators_and_leaves_gaps() {
    let series = sample_series();

    assert_eq!(series.len(), 4);
    assert_eq!(
        series.temperature,
        vec![(0, 21.4), (1, 21.6), (3, 21.3)]
    );
    assert_eq!(series.humidity, vec![(0, 45.0), (1, 46.0), (2, 47.0)]);
}

#[test]
fn sample_axis_maps_endpoints_onto_the_pixel_range() {
    let axis = SampleAxis::new(10, 5);

    assert_eq!(axis.map(&0, (100, 300)), 100);
    assert_eq!(axis.map(&9, (100, 300)), 300);
    assert_eq!(axis.range(), 0..10);
}

#[test]
fn combined_grid_reserves_a_cell_per_input() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join("Plots.png");
    let spec = small_spec(LayoutMode::Combined);

    let grid = ChartGrid::new(&path, 3, &spec).expect("grid allocation failed");
    // ceil(3/2) rows of two columns; the trailing cell stays undrawn.
    assert_eq!(grid.cell_count(), 4);
}

#[test]
fn individual_artifact_is_named_after_the_input_stem() {
    let dir = tempfile::tempdir().expect("tempdir");
    let spec = small_spec(LayoutMode::Individual);

    let artifact =
        render_individual(&sample_series(), &spec, dir.path()).expect("render failed");

    assert_eq!(
        artifact.file_name().and_then(|name| name.to_str()),
        Some("sample_plot.png")
    );
    let metadata = std::fs::metadata(&artifact).expect("artifact missing");
    assert!(metadata.len() > 0);
}
