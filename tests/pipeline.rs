use appendix_figures::data::summary::DEFAULT_SCENARIO_LABELS;
use appendix_figures::data::{
    DataLoader, GridError, LoaderError, ScenarioLabels, SummaryError, SummaryFormatter,
};
use appendix_figures::{
    run_heatmap_figures, run_table_figure, HeatmapFigureOptions, PipelineError,
    TableFigureOptions,
};
use std::path::{Path, PathBuf};

fn write(dir: &Path, name: &str, body: &str) -> PathBuf {
    let path = dir.join(name);
    std::fs::write(&path, body).unwrap();
    path
}

const SUMMARY_CSV: &str = "Scenario,log10(C_a)_p05,log10(C_a)_p50,log10(C_a)_p95,\
log10(C_m)_p05,log10(C_m)_p50,log10(C_m)_p95,P(C_m > C_a)
base,1.234,5.678,9.012,2.0,3.5,4.999,0.900
forensic,0.5,1.5,2.5,3.0,4.0,5.0,1.000
alignment,-1.0,0.25,1.75,0.1,0.2,0.3,0.333
";

/// 9 x 6 grid where `S` rises with A, crossing 0.5 mid-grid.
fn grid_csv() -> String {
    let mut body = String::from("A,log10E,S\n");
    for e in 0..6 {
        for a in 1..=9 {
            let a = a as f64 / 10.0;
            let s = (a + e as f64 * 0.02).min(1.0);
            body.push_str(&format!("{a},{e},{s}\n"));
        }
    }
    body
}

fn table_opts(dir: &Path, in_csv: PathBuf, labels: Option<ScenarioLabels>) -> TableFigureOptions {
    TableFigureOptions {
        in_csv,
        out_png: dir.join("figures").join("table.png"),
        labels,
        dpi: 50,
    }
}

fn heatmap_opts(dir: &Path, in_csv: PathBuf) -> HeatmapFigureOptions {
    HeatmapFigureOptions {
        in_csv,
        out_heatmap: dir.join("figures").join("heatmap.png"),
        out_regime: dir.join("figures").join("regime.png"),
        dpi: 72,
    }
}

#[test]
fn missing_share_column_writes_nothing() {
    let dir = tempfile::tempdir().unwrap();
    let csv = write(
        dir.path(),
        "grid.csv",
        "A,log10E,E,delta\n0.1,0,1,0.2\n0.5,0,1,0.1\n",
    );
    let opts = heatmap_opts(dir.path(), csv);

    let mut written = Vec::new();
    let err = run_heatmap_figures(&opts, |p| written.push(p.to_path_buf())).unwrap_err();

    assert!(err.to_string().contains("\"S\""));
    match err {
        PipelineError::Grid(GridError::Loader(LoaderError::MissingColumns(names))) => {
            assert_eq!(names, vec!["S"])
        }
        other => panic!("unexpected error: {other}"),
    }
    assert!(written.is_empty());
    assert!(!opts.out_heatmap.exists());
    assert!(!opts.out_regime.exists());
}

#[test]
fn duplicate_cells_fail_before_rendering() {
    let dir = tempfile::tempdir().unwrap();
    let csv = write(dir.path(), "grid.csv", "A,log10E,S\n0.1,0,0.2\n0.1,0,0.3\n");
    let opts = heatmap_opts(dir.path(), csv);

    let err = run_heatmap_figures(&opts, |_| {}).unwrap_err();
    assert!(matches!(
        err,
        PipelineError::Grid(GridError::DuplicateCell { .. })
    ));
    assert!(!opts.out_heatmap.exists());
}

#[test]
fn unreadable_input_is_io_error() {
    let dir = tempfile::tempdir().unwrap();
    let opts = heatmap_opts(dir.path(), dir.path().join("missing.csv"));
    let err = run_heatmap_figures(&opts, |_| {}).unwrap_err();
    assert!(matches!(err, PipelineError::Loader(LoaderError::Io { .. })));
}

#[test]
fn table_missing_probability_column_fails() {
    let dir = tempfile::tempdir().unwrap();
    let csv = write(
        dir.path(),
        "summary.csv",
        "Scenario,log10(C_a)_p05,log10(C_a)_p50,log10(C_a)_p95,log10(C_m)_p05,log10(C_m)_p50,log10(C_m)_p95\n\
         base,1,2,3,4,5,6\n",
    );
    let opts = TableFigureOptions {
        in_csv: csv,
        out_png: dir.path().join("table.png"),
        labels: Some(ScenarioLabels::default()),
        dpi: 72,
    };

    let err = run_table_figure(&opts, |_| {}).unwrap_err();
    match err {
        PipelineError::Summary(SummaryError::Loader(LoaderError::MissingColumns(names))) => {
            assert_eq!(names, vec!["P(C_m > C_a)"])
        }
        other => panic!("unexpected error: {other}"),
    }
    assert!(!opts.out_png.exists());
}

#[test]
fn label_file_round_trips_through_loader() {
    let dir = tempfile::tempdir().unwrap();
    let path = write(dir.path(), "labels.json", r#"{"base": "Base reality"}"#);
    let labels = ScenarioLabels::from_json_file(&path).unwrap();
    assert_eq!(
        labels.apply(vec!["base".into(), "other".into()]),
        vec!["Base reality".to_string(), "other".to_string()]
    );
}

#[test]
fn malformed_label_file_is_rejected() {
    let dir = tempfile::tempdir().unwrap();
    let path = write(dir.path(), "labels.json", "[1, 2");
    assert!(matches!(
        ScenarioLabels::from_json_file(&path),
        Err(SummaryError::LabelFormat { .. })
    ));
}

#[test]
fn table_figure_is_written_and_cropped() {
    let dir = tempfile::tempdir().unwrap();
    let csv = write(dir.path(), "summary.csv", SUMMARY_CSV);
    let opts = table_opts(dir.path(), csv, Some(ScenarioLabels::default()));

    let mut written = Vec::new();
    run_table_figure(&opts, |p| written.push(p.to_path_buf())).unwrap();

    assert_eq!(written, vec![opts.out_png.clone()]);
    let img = image::open(&opts.out_png).unwrap().to_rgb8();
    let (w, h) = img.dimensions();
    // Uncropped canvas is 16in x 4.8in
    assert!(w > 0 && w < 16 * 50, "width {w}");
    assert!(h > 0 && h < (4.8 * 50.0) as u32, "height {h}");
}

#[test]
fn three_rows_render_default_labels() {
    let dir = tempfile::tempdir().unwrap();
    let csv = write(dir.path(), "summary.csv", SUMMARY_CSV);

    let mut loader = DataLoader::new();
    loader.load_csv(&csv).unwrap();
    let df = loader.into_dataframe().unwrap();
    let rows = SummaryFormatter::build_rows(&df, Some(&ScenarioLabels::default())).unwrap();
    let names: Vec<&str> = rows.iter().map(|r| r.scenario.as_str()).collect();
    assert_eq!(names, DEFAULT_SCENARIO_LABELS.to_vec());
    assert_eq!(rows[0].probability, "0.9");
    assert_eq!(rows[1].probability, "1");

    let relabeled = table_opts(dir.path(), csv.clone(), Some(ScenarioLabels::default()));
    run_table_figure(&relabeled, |_| {}).unwrap();
    let with_labels = image::open(&relabeled.out_png).unwrap().to_rgb8();

    let mut kept = table_opts(dir.path(), csv, None);
    kept.out_png = dir.path().join("figures").join("table_kept.png");
    run_table_figure(&kept, |_| {}).unwrap();
    let with_names = image::open(&kept.out_png).unwrap().to_rgb8();

    // Narrative labels span two lines, so the labeled table is taller
    assert_ne!(with_labels.as_raw(), with_names.as_raw());
    assert!(with_labels.height() > with_names.height());
}

#[test]
fn heatmap_figures_written_in_order() {
    let dir = tempfile::tempdir().unwrap();
    let csv = write(dir.path(), "grid.csv", &grid_csv());
    let mut opts = heatmap_opts(dir.path(), csv);
    opts.dpi = 40;

    let mut written = Vec::new();
    run_heatmap_figures(&opts, |p| written.push(p.to_path_buf())).unwrap();

    assert_eq!(written, vec![opts.out_heatmap.clone(), opts.out_regime.clone()]);
    for path in &written {
        let img = image::open(path).unwrap().to_rgb8();
        let (w, h) = img.dimensions();
        // 8.5in x 6in canvas before cropping
        assert!(w > 0 && w <= 340, "{}: width {w}", path.display());
        assert!(h > 0 && h <= 240, "{}: height {h}", path.display());
    }
}
