//! Per-channel background estimation.
//!
//! A normal distribution is fitted to the flattened intensities of one
//! z-slice; `mean + k * std` becomes the threshold subtracted from every
//! pixel of that slice, clipped at zero.

use std::fs::OpenOptions;
use std::io::Write;
use std::path::Path;

use anyhow::{Context, Result};
use ndarray::{Array2, ArrayView2};

use crate::math::stats;

#[derive(Debug, Clone, Copy)]
pub struct BackgroundFit {
    pub mean: f64,
    pub std: f64,
}

impl BackgroundFit {
    pub fn threshold(&self, std_devs: f64) -> f64 {
        self.mean + std_devs * self.std
    }
}

/// Fit a normal distribution to the flattened plane.
pub fn fit_normal(plane: ArrayView2<'_, f64>) -> BackgroundFit {
    let values: Vec<f64> = plane.iter().copied().collect();
    let mean = stats::mean(&values);
    let std = stats::std_dev(&values, mean);
    BackgroundFit { mean, std }
}

/// Subtract `threshold` from every pixel, clipping negative results to zero
/// so "below background" never wraps around.
pub fn subtract_threshold(plane: &mut Array2<f64>, threshold: f64) {
    plane.mapv_inplace(|v| (v - threshold).max(0.0));
}

/// Append one diagnostic line for a fitted channel to the per-scene record.
/// The record is informational only; nothing downstream reads it back.
pub fn append_record(
    path: &Path,
    channel: &str,
    fit: &BackgroundFit,
    threshold: f64,
) -> Result<()> {
    let mut file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .with_context(|| format!("failed to open {}", path.display()))?;
    writeln!(
        file,
        "{}: mean={:.6}, std={:.6}, threshold={:.6}",
        channel, fit.mean, fit.std, threshold
    )?;
    Ok(())
}
