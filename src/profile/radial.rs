//! Radial intensity binning.
//!
//! Pixels of a cropped plane are binned by the integer floor of their
//! Euclidean distance to a center expressed in the same cropped frame.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use anyhow::{Context, Result, bail};
use ndarray::ArrayView2;

use crate::geometry::{BoundingBox, Point};

/// Per-distance intensity sums and supporting pixel counts.
#[derive(Debug, Clone)]
pub struct RadialProfile {
    pub sums: Vec<f64>,
    pub counts: Vec<u64>,
}

impl RadialProfile {
    /// Mean intensity per distance bin. Bins with no supporting pixels are
    /// reported as NaN, never as zero.
    pub fn means(&self) -> Vec<f64> {
        self.sums
            .iter()
            .zip(&self.counts)
            .map(|(s, c)| if *c == 0 { f64::NAN } else { s / *c as f64 })
            .collect()
    }
}

/// Bin every pixel of `plane` by its floor-distance to `center`.
///
/// Accumulation is commutative, so iteration order never affects the
/// resulting per-bin means.
pub fn bin_by_distance(plane: ArrayView2<'_, f64>, center: (usize, usize)) -> RadialProfile {
    let (height, width) = plane.dim();
    let (cr, cc) = (center.0 as f64, center.1 as f64);
    let mut sums: Vec<f64> = Vec::new();
    let mut counts: Vec<u64> = Vec::new();
    for r in 0..height {
        for c in 0..width {
            let dr = r as f64 - cr;
            let dc = c as f64 - cc;
            let d = (dr * dr + dc * dc).sqrt().floor() as usize;
            if d >= sums.len() {
                sums.resize(d + 1, 0.0);
                counts.resize(d + 1, 0);
            }
            sums[d] += plane[[r, c]];
            counts[d] += 1;
        }
    }
    RadialProfile { sums, counts }
}

/// Largest distance fully supported by the crop: the maximum of the four
/// distances from the absolute center to the clamped bounding-box edges.
pub fn supported_radius(clamped: &BoundingBox, center_abs: Point) -> usize {
    let spans = [
        center_abs.row - clamped.min_row as f64,
        clamped.max_row as f64 - center_abs.row,
        center_abs.col - clamped.min_col as f64,
        clamped.max_col as f64 - center_abs.col,
    ];
    spans.iter().fold(0.0f64, |m, s| m.max(*s)).floor() as usize
}

/// One radial curve per ROI: a shared distance axis plus one mean-intensity
/// column per profiled channel. Immutable once assembled.
#[derive(Debug, Clone)]
pub struct RadialCurve {
    pub distances: Vec<f64>,
    pub unit: String,
    pub channels: Vec<String>,
    pub columns: Vec<Vec<f64>>,
}

impl RadialCurve {
    /// Assemble a curve from per-channel bin means, truncated to `radius`
    /// bins and with unsupported (empty) bins dropped.
    pub fn assemble(
        channels: Vec<String>,
        per_channel_means: &[Vec<f64>],
        counts: &[u64],
        radius: usize,
        pixel_size: f64,
        unit: &str,
    ) -> Self {
        let n_bins = counts.len().min(radius);
        let mut distances = Vec::with_capacity(n_bins);
        let mut columns: Vec<Vec<f64>> = vec![Vec::with_capacity(n_bins); channels.len()];
        for idx in 0..n_bins {
            if counts[idx] == 0 {
                continue;
            }
            distances.push(idx as f64 * pixel_size);
            for (col, means) in columns.iter_mut().zip(per_channel_means) {
                col.push(means[idx]);
            }
        }
        Self {
            distances,
            unit: unit.to_string(),
            channels,
            columns,
        }
    }

    pub fn write_csv(&self, path: &Path) -> Result<()> {
        let file = File::create(path)
            .with_context(|| format!("failed to create {}", path.display()))?;
        let mut w = BufWriter::new(file);
        writeln!(w, "Distance [{}],{}", self.unit, self.channels.join(","))?;
        for (i, d) in self.distances.iter().enumerate() {
            write!(w, "{}", d)?;
            for col in &self.columns {
                write!(w, ",{}", col[i])?;
            }
            writeln!(w)?;
        }
        w.flush()?;
        Ok(())
    }

    pub fn read_csv(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read {}", path.display()))?;
        let mut lines = content.lines();
        let header = lines.next().context("radial curve file is empty")?;
        let mut cells = header.split(',');
        let first = cells.next().unwrap_or_default();
        let unit = first
            .strip_prefix("Distance [")
            .and_then(|s| s.strip_suffix(']'))
            .with_context(|| format!("{}: malformed curve header", path.display()))?
            .to_string();
        let channels: Vec<String> = cells.map(|s| s.to_string()).collect();
        if channels.is_empty() {
            bail!("{}: curve has no intensity columns", path.display());
        }

        let mut distances = Vec::new();
        let mut columns: Vec<Vec<f64>> = vec![Vec::new(); channels.len()];
        for (idx, line) in lines.enumerate() {
            if line.trim().is_empty() {
                continue;
            }
            let fields: Vec<&str> = line.split(',').collect();
            if fields.len() != channels.len() + 1 {
                bail!("{}:{} malformed curve row", path.display(), idx + 2);
            }
            let parse = |s: &str| -> Result<f64> {
                s.parse::<f64>()
                    .with_context(|| format!("{}:{} bad number '{}'", path.display(), idx + 2, s))
            };
            distances.push(parse(fields[0])?);
            for (col, field) in columns.iter_mut().zip(&fields[1..]) {
                col.push(parse(field)?);
            }
        }
        Ok(Self {
            distances,
            unit,
            channels,
            columns,
        })
    }
}
