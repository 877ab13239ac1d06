use std::path::Path;

use assert_cmd::Command;
use ndarray::Array2;
use tempfile::TempDir;

use radprof::io::tiff::write_gray16;

fn write_source(root: &Path) {
    let scene = root.join("SceneA");
    std::fs::create_dir_all(&scene).unwrap();
    let mut dapi = Array2::zeros((16, 16));
    let mut gfp = Array2::zeros((16, 16));
    for r in 0..16 {
        for c in 0..16 {
            dapi[[r, c]] = 100.0;
            gfp[[r, c]] = (r * 2 + c) as f64;
        }
    }
    write_gray16(&scene.join("C0_Z0.tiff"), dapi.view()).unwrap();
    write_gray16(&scene.join("C1_Z0.tiff"), gfp.view()).unwrap();
}

fn write_rois(path: &Path) {
    std::fs::write(
        path,
        r#"{
  "SceneA": [
    {
      "z": 0,
      "shapes": [
        { "kind": "rectangle", "vertices": [[2.0, 2.0], [12.0, 12.0]] },
        { "kind": "ellipse", "vertices": [[4.0, 4.0], [14.0, 14.0]] }
      ],
      "centers": [[7.0, 7.0], [9.0, 9.0]]
    }
  ]
}"#,
    )
    .unwrap();
}

#[test]
fn full_run_produces_the_documented_layout() {
    let input = TempDir::new().unwrap();
    let out = TempDir::new().unwrap();
    write_source(input.path());
    let rois = input.path().join("rois.json");
    write_rois(&rois);

    let mut cmd = Command::cargo_bin("radprof").unwrap();
    cmd.args([
        "run",
        "--input",
        input.path().to_str().unwrap(),
        "--out",
        out.path().to_str().unwrap(),
        "--channel",
        "DAPI",
        "--channel",
        "GFP",
        "--rois",
        rois.to_str().unwrap(),
        "--fraction",
        "0.5",
        "--analyze",
    ]);
    cmd.assert().success();

    let scene_dir = out.path().join("RadialProfiles").join("SceneA");
    for roi in ["ROI_0", "ROI_1"] {
        let dir = scene_dir.join(roi);
        assert!(dir.join(format!("{}_DAPI.tiff", roi)).exists());
        assert!(dir.join(format!("{}_GFP.tiff", roi)).exists());
        assert!(dir.join("Radial.csv").exists());
        assert!(dir.join("RadialPlot.png").exists());
        assert!(dir.join("RadialNormalized.csv").exists());
        assert!(dir.join("RadialPlotNormalized.png").exists());
        assert!(dir.join("FractionalRadius.csv").exists());
        assert!(dir.join("Coordinates.csv").exists());
    }
    assert!(scene_dir.join("SceneA_MasterTable.csv").exists());
    assert!(!scene_dir.join("SceneA_Table.csv").exists());

    let summary = out
        .path()
        .join("RadialProfiles")
        .join("SceneMeanMinRads.txt");
    let content = std::fs::read_to_string(summary).unwrap();
    assert!(content.starts_with("SceneA: "));

    let header = std::fs::read_to_string(scene_dir.join("ROI_0").join("Radial.csv")).unwrap();
    assert!(header.starts_with("Distance [px],DAPI,GFP"));
}

#[test]
fn background_subtraction_writes_the_diagnostic_record() {
    let input = TempDir::new().unwrap();
    let out = TempDir::new().unwrap();
    write_source(input.path());
    let rois = input.path().join("rois.json");
    write_rois(&rois);

    let mut cmd = Command::cargo_bin("radprof").unwrap();
    cmd.args([
        "run",
        "--input",
        input.path().to_str().unwrap(),
        "--out",
        out.path().to_str().unwrap(),
        "--channel",
        "DAPI",
        "--channel",
        "GFP",
        "--rois",
        rois.to_str().unwrap(),
        "--subtract-background",
        "--background-channel",
        "DAPI",
        "--std-devs",
        "1.0",
    ]);
    cmd.assert().success();

    let record = out
        .path()
        .join("RadialProfiles")
        .join("SceneA")
        .join("Background.txt");
    let content = std::fs::read_to_string(record).unwrap();
    assert!(content.starts_with("DAPI: mean=100.000000, std=0.000000, threshold=100.000000"));
}

#[test]
fn scenes_subcommand_lists_dimensions() {
    let input = TempDir::new().unwrap();
    write_source(input.path());

    let mut cmd = Command::cargo_bin("radprof").unwrap();
    let assert = cmd
        .args(["scenes", "--input", input.path().to_str().unwrap()])
        .assert()
        .success();
    let stdout = String::from_utf8(assert.get_output().stdout.clone()).unwrap();
    assert!(stdout.contains("SceneA: 2 channels, 1 z-slices, 16x16"));
}

#[test]
fn unknown_channel_fails_fast_by_name() {
    let input = TempDir::new().unwrap();
    let out = TempDir::new().unwrap();
    write_source(input.path());

    let mut cmd = Command::cargo_bin("radprof").unwrap();
    cmd.args([
        "run",
        "--input",
        input.path().to_str().unwrap(),
        "--out",
        out.path().to_str().unwrap(),
        "--channel",
        "DAPI",
        "--channel",
        "GFP",
        "--select",
        "TRITC",
    ]);
    let assert = cmd.assert().failure();
    let stderr = String::from_utf8(assert.get_output().stderr.clone()).unwrap();
    assert!(stderr.contains("TRITC"));
}
