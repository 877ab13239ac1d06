use std::collections::{HashMap, VecDeque};
use std::path::Path;

use anyhow::Result;
use ndarray::Array4;
use tempfile::TempDir;

use radprof::chart::{ChartRenderer, ChartSpec, Series};
use radprof::ctx::{BackgroundConfig, RunConfig};
use radprof::editor::{AcceptSeed, RoiDraft, ScriptedEditor};
use radprof::geometry::{Point, Shape, ShapeKind};
use radprof::scene::runner::run_scene;
use radprof::scene::{Scene, read_table_rows};
use radprof::source::MemorySource;

struct StubChart;

impl ChartRenderer for StubChart {
    fn render(&self, path: &Path, _spec: &ChartSpec, _series: &[Series]) -> Result<()> {
        std::fs::write(path, b"chart")?;
        Ok(())
    }
}

fn rectangle(min_row: f64, min_col: f64, max_row: f64, max_col: f64) -> Shape {
    Shape::new(
        ShapeKind::Rectangle,
        vec![
            Point::new(min_row, min_col),
            Point::new(max_row, max_col),
        ],
    )
}

fn config() -> RunConfig {
    RunConfig {
        scenes: Vec::new(),
        channels: vec!["DAPI".to_string(), "GFP".to_string()],
        selected: vec!["DAPI".to_string(), "GFP".to_string()],
        pixel_size: 1.0,
        unit: "px".to_string(),
        fraction: 0.5,
        reload: false,
        background: BackgroundConfig::default(),
        analyze: false,
    }
}

fn source() -> MemorySource {
    let mut data = Array4::zeros((2, 1, 16, 16));
    for r in 0..16 {
        for c in 0..16 {
            data[[0, 0, r, c]] = 10.0;
            data[[1, 0, r, c]] = (r + c) as f64;
        }
    }
    MemorySource::new(vec![("SceneA".to_string(), data)], None)
}

fn editor_with(drafts: Vec<RoiDraft>) -> ScriptedEditor {
    let mut map = HashMap::new();
    map.insert("SceneA".to_string(), VecDeque::from(drafts));
    ScriptedEditor::new(map)
}

#[test]
fn degenerate_roi_leaves_table_one_row_short() {
    let tmp = TempDir::new().unwrap();
    let mut src = source();
    let scene = Scene::new("SceneA", 0, config().channels);
    // Second ROI is entirely out of frame; the batch must not abort.
    let mut editor = editor_with(vec![RoiDraft {
        shapes: vec![rectangle(2.0, 2.0, 12.0, 12.0), rectangle(30.0, 30.0, 40.0, 40.0)],
        centers: vec![Point::new(7.0, 7.0), Point::new(35.0, 35.0)],
        z_slice: 0,
    }]);

    let run = run_scene(&mut src, &mut editor, &StubChart, &config(), &scene, tmp.path()).unwrap();
    assert_eq!(run.processed, 1);
    assert_eq!(run.skipped, 1);

    let rows = read_table_rows(&tmp.path().join("SceneA").join("SceneA_Table.csv")).unwrap();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].roi, 0);
    assert!(tmp.path().join("SceneA").join("ROI_0").is_dir());
    assert!(!tmp.path().join("SceneA").join("ROI_1").exists());
}

#[test]
fn scene_directory_name_is_sanitized() {
    let tmp = TempDir::new().unwrap();
    let mut data = Array4::zeros((2, 1, 16, 16));
    data.fill(1.0);
    let mut src = MemorySource::new(vec![("Pos:0/A".to_string(), data)], None);
    let scene = Scene::new("Pos:0/A", 0, config().channels);
    // Scripted drafts are keyed by the normalized display name.
    let mut map = HashMap::new();
    map.insert(
        "Pos_0_A".to_string(),
        VecDeque::from(vec![RoiDraft {
            shapes: vec![rectangle(1.0, 1.0, 9.0, 9.0)],
            centers: vec![Point::new(5.0, 5.0)],
            z_slice: 0,
        }]),
    );
    let mut editor = ScriptedEditor::new(map);

    let run = run_scene(&mut src, &mut editor, &StubChart, &config(), &scene, tmp.path()).unwrap();
    assert_eq!(run.processed, 1);
    assert!(tmp.path().join("Pos_0_A").is_dir());
    assert!(tmp.path().join("Pos_0_A").join("Pos_0_A_Table.csv").exists());
    assert!(tmp.path().join("Pos_0_A").join("ROI_0").is_dir());
}

#[test]
fn background_subtraction_runs_before_profiling() {
    let tmp = TempDir::new().unwrap();
    let mut src = source();
    let scene = Scene::new("SceneA", 0, config().channels);
    let mut cfg = config();
    cfg.background = BackgroundConfig {
        enabled: true,
        channels: vec!["DAPI".to_string()],
        std_devs: 1.0,
        z_slice: 0,
    };
    let mut editor = editor_with(vec![RoiDraft {
        shapes: vec![rectangle(2.0, 2.0, 12.0, 12.0)],
        centers: vec![Point::new(7.0, 7.0)],
        z_slice: 0,
    }]);

    run_scene(&mut src, &mut editor, &StubChart, &cfg, &scene, tmp.path()).unwrap();

    let record = std::fs::read_to_string(tmp.path().join("SceneA").join("Background.txt")).unwrap();
    assert!(record.starts_with("DAPI: mean=10.000000, std=0.000000, threshold=10.000000"));

    // The uniform channel collapses to zero after subtraction.
    let curve = radprof::profile::radial::RadialCurve::read_csv(
        &tmp.path().join("SceneA").join("ROI_0").join("Radial.csv"),
    )
    .unwrap();
    let dapi = curve.channels.iter().position(|c| c == "DAPI").unwrap();
    assert!(curve.columns[dapi].iter().all(|v| *v == 0.0));
    let gfp = curve.channels.iter().position(|c| c == "GFP").unwrap();
    assert!(curve.columns[gfp].iter().any(|v| *v > 0.0));
}

#[test]
fn reload_reprocesses_previous_rois_without_redrawing() {
    let tmp = TempDir::new().unwrap();
    let mut src = source();
    let scene = Scene::new("SceneA", 0, config().channels);
    let mut editor = editor_with(vec![RoiDraft {
        shapes: vec![rectangle(2.0, 2.0, 12.0, 12.0)],
        centers: vec![Point::new(7.0, 7.0)],
        z_slice: 0,
    }]);
    run_scene(&mut src, &mut editor, &StubChart, &config(), &scene, tmp.path()).unwrap();

    // Second run: no script, seed comes from the persisted table.
    let mut cfg = config();
    cfg.reload = true;
    let mut accept = AcceptSeed;
    let run =
        run_scene(&mut src, &mut accept, &StubChart, &cfg, &scene, tmp.path()).unwrap();
    assert_eq!(run.processed, 1);
    let rows = read_table_rows(&tmp.path().join("SceneA").join("SceneA_Table.csv")).unwrap();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].center_abs, Point::new(7.0, 7.0));
}
