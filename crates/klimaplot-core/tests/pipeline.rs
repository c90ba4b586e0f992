use std::path::PathBuf;

use klimaplot_core::config::{LayoutMode, PipelineConfig, PlotSpec};
use klimaplot_core::error::PipelineError;
use klimaplot_core::pipeline::{run_batch, FileStatus};

fn fixture(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("../klimaplot-parser/tests/data")
        .join(name)
}

fn test_config(layout: LayoutMode) -> PipelineConfig {
    PipelineConfig {
        plot: PlotSpec {
            dpi: 40,
            timestamp_count: 5,
            layout,
            ..PlotSpec::default()
        },
        ..PipelineConfig::default()
    }
}

#[test]
fn combined_batch_renders_both_files_into_one_artifact() {
    // Header at row 3 in the first file, row 5 in the second.
    let dir = tempfile::tempdir().expect("tempdir");
    let paths = vec![fixture("klimalogg_office.csv"), fixture("hygro_basement.csv")];

    let report = run_batch(&paths, &test_config(LayoutMode::Combined), dir.path())
        .expect("batch failed");

    assert_eq!(report.rendered_count(), 2);
    assert_eq!(report.artifacts.len(), 1);
    assert_eq!(
        report.artifacts[0].file_name().and_then(|name| name.to_str()),
        Some("Plots.png")
    );
    assert!(report.artifacts[0].exists());
}

#[test]
fn headerless_file_produces_no_chart_and_a_header_not_found_report() {
    let dir = tempfile::tempdir().expect("tempdir");
    let paths = vec![fixture("noheader_diag.csv")];

    let report = run_batch(&paths, &test_config(LayoutMode::Combined), dir.path())
        .expect("batch failed");

    assert!(report.is_all_failed());
    assert!(report.artifacts.is_empty());
    assert_eq!(report.reports.len(), 1);
    assert_eq!(report.reports[0].status, FileStatus::HeaderNotFound);
}

#[test]
fn all_failed_combined_batch_leaves_no_artifact_behind() {
    let dir = tempfile::tempdir().expect("tempdir");
    let paths = vec![fixture("noheader_diag.csv"), fixture("noheader_diag.csv")];

    let report = run_batch(&paths, &test_config(LayoutMode::Combined), dir.path())
        .expect("batch failed");

    assert!(report.is_all_failed());
    assert!(report.artifacts.is_empty());
    assert!(!dir.path().join("Plots.png").exists());
}

#[test]
fn odd_combined_batch_still_produces_one_artifact() {
    let dir = tempfile::tempdir().expect("tempdir");
    let paths = vec![
        fixture("klimalogg_office.csv"),
        fixture("hygro_basement.csv"),
        fixture("pseudo_header_duplicate.csv"),
    ];

    let report = run_batch(&paths, &test_config(LayoutMode::Combined), dir.path())
        .expect("batch failed");

    assert_eq!(report.rendered_count(), 3);
    assert_eq!(report.artifacts.len(), 1);
}

#[test]
fn missing_columns_skip_rendering_but_keep_their_slot() {
    let dir = tempfile::tempdir().expect("tempdir");
    let paths = vec![fixture("klimalogg_office.csv"), fixture("thermo_only.csv")];

    let report = run_batch(&paths, &test_config(LayoutMode::Combined), dir.path())
        .expect("batch failed");

    assert_eq!(report.rendered_count(), 1);
    assert_eq!(report.skipped_count(), 1);
    assert_eq!(report.reports[1].status, FileStatus::ColumnsAbsent);
    // Slot order matches input order even around the skipped file.
    assert_eq!(report.reports[0].status, FileStatus::Rendered);
    assert_eq!(report.artifacts.len(), 1);
}

#[test]
fn unreadable_file_does_not_abort_its_siblings() {
    let dir = tempfile::tempdir().expect("tempdir");
    let paths = vec![fixture("does_not_exist.csv"), fixture("klimalogg_office.csv")];

    let report = run_batch(&paths, &test_config(LayoutMode::Individual), dir.path())
        .expect("batch failed");

    assert_eq!(report.reports[0].status, FileStatus::ReadError);
    assert_eq!(report.reports[1].status, FileStatus::Rendered);
    assert_eq!(report.artifacts.len(), 1);
}

#[test]
fn individual_mode_names_artifacts_after_their_inputs() {
    let dir = tempfile::tempdir().expect("tempdir");
    let paths = vec![fixture("klimalogg_office.csv"), fixture("hygro_basement.csv")];

    let report = run_batch(&paths, &test_config(LayoutMode::Individual), dir.path())
        .expect("batch failed");

    let names: Vec<_> = report
        .artifacts
        .iter()
        .filter_map(|path| path.file_name().and_then(|name| name.to_str()))
        .collect();
    assert_eq!(names, ["klimalogg_office_plot.png", "hygro_basement_plot.png"]);
}

#[test]
fn inverted_range_is_rejected_before_any_work() {
    let dir = tempfile::tempdir().expect("tempdir");
    let mut config = test_config(LayoutMode::Combined);
    config.plot.temp_range = (30.0, 5.0);

    let err = run_batch(&[fixture("klimalogg_office.csv")], &config, dir.path()).unwrap_err();
    assert!(matches!(err, PipelineError::Config(_)));
}
