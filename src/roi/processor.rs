//! Per-ROI processing: masking, cropping, radial binning, artifact output.
//!
//! Every failure inside a single ROI is converted into a skip result so one
//! malformed ROI can never abort the batch.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use ndarray::Array2;
use tracing::info;

use crate::chart::{ChartRenderer, ChartSpec, Series};
use crate::geometry::{Point, Shape, ShapeKind};
use crate::profile::radial::{self, RadialCurve};
use crate::io::tiff;
use crate::roi::Roi;

/// One profiled channel handed to the processor: label, chart color and the
/// full-frame intensity plane at the ROI's z-slice.
pub struct ChannelPlane {
    pub label: String,
    pub color: (u8, u8, u8),
    pub plane: Array2<f64>,
}

pub struct RoiJob<'a> {
    pub index: usize,
    pub roi: &'a Roi,
    pub mask: &'a Array2<bool>,
    pub z_slice: usize,
    pub channels: &'a [ChannelPlane],
    pub pixel_size: f64,
    pub unit: &'a str,
    pub scene_dir: &'a Path,
    pub chart: &'a dyn ChartRenderer,
}

#[derive(Debug, Clone)]
pub struct RoiArtifacts {
    pub dir: PathBuf,
    pub images: Vec<PathBuf>,
    pub curve: PathBuf,
    pub plot: PathBuf,
    pub coordinates: PathBuf,
}

#[derive(Debug, Clone)]
pub struct RoiRecord {
    pub index: usize,
    pub kind: ShapeKind,
    pub z_slice: usize,
    pub center_abs: Point,
    pub center_rel: (usize, usize),
    pub artifacts: RoiArtifacts,
}

/// Outcome of one ROI: artifacts on success, a logged reason on skip.
#[derive(Debug, Clone)]
pub enum RoiOutcome {
    Processed(RoiRecord),
    Skipped { index: usize, reason: String },
}

pub fn process(job: &RoiJob<'_>) -> RoiOutcome {
    match try_process(job) {
        Ok(record) => RoiOutcome::Processed(record),
        Err(err) => RoiOutcome::Skipped {
            index: job.index,
            reason: format!("{:#}", err),
        },
    }
}

fn try_process(job: &RoiJob<'_>) -> Result<RoiRecord> {
    let (height, width) = job.mask.dim();
    let bbox = job.roi.shape.bounding_box().clamp(height, width);
    if bbox.is_degenerate() {
        bail!("clamped bounding box is empty");
    }

    let center = job.roi.center;
    let cr = center.row.round() as i64;
    let cc = center.col.round() as i64;
    if cr < bbox.min_row || cr >= bbox.max_row || cc < bbox.min_col || cc >= bbox.max_col {
        bail!(
            "center ({:.1}, {:.1}) lies outside the clamped bounding box",
            center.row,
            center.col
        );
    }
    let center_rel = ((cr - bbox.min_row) as usize, (cc - bbox.min_col) as usize);
    let radius = radial::supported_radius(&bbox, center);

    let dir = job.scene_dir.join(format!("ROI_{}", job.index));
    std::fs::create_dir_all(&dir)
        .with_context(|| format!("failed to create {}", dir.display()))?;

    let mut images = Vec::with_capacity(job.channels.len());
    let mut labels = Vec::with_capacity(job.channels.len());
    let mut means = Vec::with_capacity(job.channels.len());
    let mut counts: Vec<u64> = Vec::new();
    for channel in job.channels {
        let crop = masked_crop(&channel.plane, job.mask, &bbox)?;
        let image_path = dir.join(format!("ROI_{}_{}.tiff", job.index, channel.label));
        tiff::write_gray16(&image_path, crop.view())?;
        images.push(image_path);

        let profile = radial::bin_by_distance(crop.view(), center_rel);
        means.push(profile.means());
        counts = profile.counts;
        labels.push(channel.label.clone());
    }

    let curve = RadialCurve::assemble(labels, &means, &counts, radius, job.pixel_size, job.unit);
    let curve_path = dir.join("Radial.csv");
    curve.write_csv(&curve_path)?;

    let coords_path = dir.join("Coordinates.csv");
    write_coordinates(&coords_path, &job.roi.shape, center, job.z_slice)?;

    let plot_path = dir.join("RadialPlot.png");
    let spec = ChartSpec {
        title: format!("ROI_{} radial profile", job.index),
        x_label: format!("Distance [{}]", job.unit),
        y_label: "Mean intensity".to_string(),
        x: curve.distances.clone(),
    };
    let series: Vec<Series> = curve
        .channels
        .iter()
        .zip(&curve.columns)
        .zip(job.channels)
        .map(|((label, values), channel)| Series {
            label: label.clone(),
            color: channel.color,
            values: values.clone(),
        })
        .collect();
    job.chart.render(&plot_path, &spec, &series)?;

    info!(roi = job.index, bins = curve.distances.len(), "ROI profiled");
    Ok(RoiRecord {
        index: job.index,
        kind: job.roi.shape.kind,
        z_slice: job.z_slice,
        center_abs: center,
        center_rel,
        artifacts: RoiArtifacts {
            dir,
            images,
            curve: curve_path,
            plot: plot_path,
            coordinates: coords_path,
        },
    })
}

/// Crop the plane to the clamped box, zeroing pixels outside the mask.
fn masked_crop(
    plane: &Array2<f64>,
    mask: &Array2<bool>,
    bbox: &crate::geometry::BoundingBox,
) -> Result<Array2<f64>> {
    if plane.dim() != mask.dim() {
        bail!("mask and plane shapes disagree");
    }
    let mut crop = Array2::zeros((bbox.height(), bbox.width()));
    for r in 0..bbox.height() {
        for c in 0..bbox.width() {
            let src = (bbox.min_row as usize + r, bbox.min_col as usize + c);
            if mask[src] {
                crop[[r, c]] = plane[src];
            }
        }
    }
    Ok(crop)
}

/// Persist the raw shape for later reload: kind, z, center and vertex list.
fn write_coordinates(path: &Path, shape: &Shape, center: Point, z_slice: usize) -> Result<()> {
    let file =
        File::create(path).with_context(|| format!("failed to create {}", path.display()))?;
    let mut w = BufWriter::new(file);
    writeln!(w, "Shape,{}", shape.kind.as_str())?;
    writeln!(w, "Z,{}", z_slice)?;
    writeln!(w, "Center,{},{}", center.row, center.col)?;
    for v in &shape.vertices {
        writeln!(w, "Vertex,{},{}", v.row, v.col)?;
    }
    w.flush()?;
    Ok(())
}

/// Read back a `Coordinates.csv` written by [`write_coordinates`].
pub fn read_coordinates(path: &Path) -> Result<(Shape, Point, usize)> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read {}", path.display()))?;
    let mut kind = None;
    let mut z_slice = 0usize;
    let mut center = None;
    let mut vertices = Vec::new();
    for (idx, line) in content.lines().enumerate() {
        let fields: Vec<&str> = line.split(',').collect();
        match fields.as_slice() {
            ["Shape", k] => {
                kind = ShapeKind::parse(k);
                if kind.is_none() {
                    bail!("{}:{} unknown shape kind '{}'", path.display(), idx + 1, k);
                }
            }
            ["Z", z] => {
                z_slice = z
                    .parse()
                    .with_context(|| format!("{}:{} bad z-slice", path.display(), idx + 1))?;
            }
            ["Center", r, c] => {
                center = Some(Point::new(parse_f64(r, path, idx)?, parse_f64(c, path, idx)?));
            }
            ["Vertex", r, c] => {
                vertices.push(Point::new(parse_f64(r, path, idx)?, parse_f64(c, path, idx)?));
            }
            _ => bail!("{}:{} unrecognized record", path.display(), idx + 1),
        }
    }
    let kind = kind.with_context(|| format!("{}: missing Shape record", path.display()))?;
    let center = center.with_context(|| format!("{}: missing Center record", path.display()))?;
    if vertices.is_empty() {
        bail!("{}: no vertices recorded", path.display());
    }
    Ok((Shape::new(kind, vertices), center, z_slice))
}

fn parse_f64(s: &str, path: &Path, idx: usize) -> Result<f64> {
    s.parse::<f64>()
        .with_context(|| format!("{}:{} bad number '{}'", path.display(), idx + 1, s))
}
