use ndarray::Array2;
use tempfile::TempDir;

use radprof::profile::background::{
    BackgroundFit, append_record, fit_normal, subtract_threshold,
};

#[test]
fn normal_fit_recovers_mean_and_std() {
    let plane = Array2::from_shape_vec((1, 2), vec![8.0, 12.0]).unwrap();
    let fit = fit_normal(plane.view());
    assert!((fit.mean - 10.0).abs() < 1e-12);
    assert!((fit.std - 2.0).abs() < 1e-12);
}

#[test]
fn threshold_subtraction_matches_mean_plus_k_std() {
    // mean=10, std=2, one standard deviation: uniform 20 becomes 8.
    let fit = BackgroundFit { mean: 10.0, std: 2.0 };
    let threshold = fit.threshold(1.0);
    assert_eq!(threshold, 12.0);
    let mut plane = Array2::from_elem((4, 4), 20.0);
    subtract_threshold(&mut plane, threshold);
    assert!(plane.iter().all(|v| (*v - 8.0).abs() < 1e-12));
}

#[test]
fn below_background_clips_to_zero() {
    let mut plane = Array2::from_elem((2, 2), 5.0);
    subtract_threshold(&mut plane, 12.0);
    assert!(plane.iter().all(|v| *v == 0.0));
}

#[test]
fn record_accumulates_one_line_per_channel() {
    let tmp = TempDir::new().unwrap();
    let path = tmp.path().join("Background.txt");
    let fit = BackgroundFit { mean: 10.0, std: 2.0 };
    append_record(&path, "DAPI", &fit, 12.0).unwrap();
    append_record(&path, "GFP", &fit, 14.0).unwrap();
    let content = std::fs::read_to_string(&path).unwrap();
    let lines: Vec<&str> = content.lines().collect();
    assert_eq!(lines.len(), 2);
    assert!(lines[0].starts_with("DAPI: mean=10.000000, std=2.000000, threshold=12.000000"));
    assert!(lines[1].contains("threshold=14.000000"));
}
