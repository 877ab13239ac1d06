//! Fractional-radius analysis over a scene's persisted radial curves.
//!
//! Runs strictly after profiling: normalizes every curve's distance axis,
//! finds the minimum normalized radius containing the configured fraction of
//! total intensity, joins the results into the master table and appends the
//! per-scene mean to the cross-scene summary.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use tracing::{info, warn};

use crate::chart::{ChartRenderer, ChartSpec, Series, color_for};
use crate::io::tables;
use crate::math::stats;
use crate::profile::radial::RadialCurve;
use crate::scene::{self, SCENE_TABLE_COLUMNS, Scene};

/// Analysis result for one ROI: minimum normalized radius per channel.
#[derive(Debug, Clone)]
pub struct AnalysisRow {
    pub roi: usize,
    pub channels: Vec<String>,
    pub min_radii: Vec<f64>,
}

/// Normalize a distance axis to `[0, 1]`.
///
/// A curve whose maximum distance is zero has no radial extent to normalize
/// against and is rejected by name rather than silently dividing by zero.
pub fn normalize_distances(distances: &[f64]) -> Result<Vec<f64>> {
    let max = distances.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    if distances.is_empty() || max <= 0.0 {
        bail!("degenerate radial curve: no nonzero distances to normalize");
    }
    Ok(distances.iter().map(|d| d / max).collect())
}

/// Minimum normalized radius containing `fraction` of the total intensity:
/// the `norm_x` at the first index whose cumulative intensity reaches
/// `fraction * total`. Ties resolve to the first qualifying index; no
/// interpolation.
pub fn min_fractional_radius(norm_x: &[f64], intensities: &[f64], fraction: f64) -> f64 {
    let total: f64 = intensities.iter().filter(|v| v.is_finite()).sum();
    let target = fraction * total;
    match stats::cumulative_threshold_index(intensities, target) {
        Some(idx) => norm_x[idx],
        None => 0.0,
    }
}

/// Analyze every ROI directory of one scene and join the results into the
/// master table. Returns the scene's mean minimum radius.
///
/// Unlike per-ROI profiling, failures here abort the whole scene: the join
/// needs a complete set of curves, so a missing or corrupt `Radial.csv` is
/// not individually recoverable.
pub fn analyze_scene(
    scene: &Scene,
    profiles_root: &Path,
    fraction: f64,
    chart: &dyn ChartRenderer,
) -> Result<f64> {
    let scene_dir = scene.dir(profiles_root);
    let roi_dirs = roi_directories(&scene_dir)?;
    if roi_dirs.is_empty() {
        bail!("scene '{}' has no ROI directories to analyze", scene.name);
    }

    let mut rows = Vec::with_capacity(roi_dirs.len());
    for (roi, dir) in &roi_dirs {
        let row = analyze_roi(*roi, dir, scene, fraction, chart)
            .with_context(|| format!("ROI_{} analysis failed", roi))?;
        rows.push(row);
    }

    join_master_table(scene, profiles_root, &rows)?;

    let all_minima: Vec<f64> = rows.iter().flat_map(|r| r.min_radii.clone()).collect();
    let mean = stats::mean(&all_minima);
    info!(scene = %scene.name, rois = rows.len(), mean, "scene analyzed");
    Ok(mean)
}

/// `ROI_<n>` subdirectories of a scene directory, ordered by index.
/// Non-directory siblings (tables, background records) are ignored.
fn roi_directories(scene_dir: &Path) -> Result<Vec<(usize, PathBuf)>> {
    let mut dirs = Vec::new();
    let entries = std::fs::read_dir(scene_dir)
        .with_context(|| format!("unreadable scene directory {}", scene_dir.display()))?;
    for entry in entries {
        let path = entry?.path();
        if !path.is_dir() {
            continue;
        }
        let Some(name) = path.file_name().and_then(|n| n.to_str()) else {
            continue;
        };
        if let Some(index) = name.strip_prefix("ROI_").and_then(|s| s.parse().ok()) {
            dirs.push((index, path));
        }
    }
    dirs.sort_by_key(|(index, _)| *index);
    Ok(dirs)
}

fn analyze_roi(
    roi: usize,
    dir: &Path,
    scene: &Scene,
    fraction: f64,
    chart: &dyn ChartRenderer,
) -> Result<AnalysisRow> {
    let curve = RadialCurve::read_csv(&dir.join("Radial.csv"))?;
    let norm_x = normalize_distances(&curve.distances)?;

    let normalized_path = dir.join("RadialNormalized.csv");
    write_normalized(&normalized_path, &norm_x, &curve)?;

    let min_radii: Vec<f64> = curve
        .columns
        .iter()
        .map(|column| min_fractional_radius(&norm_x, column, fraction))
        .collect();
    write_fractional(&dir.join("FractionalRadius.csv"), &curve.channels, &min_radii)?;

    let spec = ChartSpec {
        title: format!("ROI_{} normalized radial profile", roi),
        x_label: "Normalized distance".to_string(),
        y_label: "Mean intensity".to_string(),
        x: norm_x,
    };
    let series: Vec<Series> = curve
        .channels
        .iter()
        .zip(&curve.columns)
        .map(|(label, values)| Series {
            label: label.clone(),
            color: series_color(scene, label),
            values: values.clone(),
        })
        .collect();
    chart.render(&dir.join("RadialPlotNormalized.png"), &spec, &series)?;

    Ok(AnalysisRow {
        roi,
        channels: curve.channels,
        min_radii,
    })
}

fn series_color(scene: &Scene, label: &str) -> (u8, u8, u8) {
    scene
        .channels
        .iter()
        .position(|c| c == label)
        .map(|i| color_for(&scene.colors[i]))
        .unwrap_or_else(|| color_for("grey"))
}

fn write_normalized(path: &Path, norm_x: &[f64], curve: &RadialCurve) -> Result<()> {
    let file =
        File::create(path).with_context(|| format!("failed to create {}", path.display()))?;
    let mut w = BufWriter::new(file);
    writeln!(w, "NormDistance,{}", curve.channels.join(","))?;
    for (i, x) in norm_x.iter().enumerate() {
        write!(w, "{}", x)?;
        for column in &curve.columns {
            write!(w, ",{}", column[i])?;
        }
        writeln!(w)?;
    }
    w.flush()?;
    Ok(())
}

fn write_fractional(path: &Path, channels: &[String], min_radii: &[f64]) -> Result<()> {
    let file =
        File::create(path).with_context(|| format!("failed to create {}", path.display()))?;
    let mut w = BufWriter::new(file);
    writeln!(w, "Channel,MinRadius")?;
    for (channel, radius) in channels.iter().zip(min_radii) {
        writeln!(w, "{},{}", channel, radius)?;
    }
    w.flush()?;
    Ok(())
}

/// Join analysis rows onto the scene table, keyed by ROI identifier, and
/// replace the intermediate table with the master table.
fn join_master_table(scene: &Scene, profiles_root: &Path, rows: &[AnalysisRow]) -> Result<()> {
    let table_path = scene.table_path(profiles_root);
    let scene_rows = scene::read_table_rows(&table_path)?;
    if scene_rows.len() != rows.len() {
        bail!(
            "scene table lists {} ROIs but {} were analyzed",
            scene_rows.len(),
            rows.len()
        );
    }

    let channels = &rows[0].channels;
    let mut header: Vec<String> = SCENE_TABLE_COLUMNS.iter().map(|s| s.to_string()).collect();
    for channel in channels {
        header.push(format!("MinRadius_{}", channel));
    }

    let mut joined = Vec::with_capacity(scene_rows.len());
    for scene_row in &scene_rows {
        let analysis = rows
            .iter()
            .find(|r| r.roi == scene_row.roi)
            .with_context(|| format!("ROI_{} missing from analysis results", scene_row.roi))?;
        if &analysis.channels != channels {
            bail!("ROI_{} was profiled with different channels", scene_row.roi);
        }
        let mut fields = scene_row.to_fields();
        fields.extend(analysis.min_radii.iter().map(|r| r.to_string()));
        joined.push(fields);
    }

    let master_path = scene.master_table_path(profiles_root);
    tables::write_table(&master_path, &header, &joined)?;

    // The intermediate table is now redundant; removal is best-effort.
    if !tables::remove_best_effort(&table_path) {
        warn!(path = %table_path.display(), "could not remove intermediate scene table");
    }
    Ok(())
}
