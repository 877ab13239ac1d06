//! 16-bit grayscale TIFF input and output for intensity planes.

use std::path::Path;

use anyhow::{Context, Result};
use image::{ImageBuffer, Luma};
use ndarray::{Array2, ArrayView2};

/// Write a plane as 16-bit grayscale. Intensities are rounded and clamped to
/// the u16 range.
pub fn write_gray16(path: &Path, plane: ArrayView2<'_, f64>) -> Result<()> {
    let (height, width) = plane.dim();
    let img = ImageBuffer::<Luma<u16>, Vec<u16>>::from_fn(width as u32, height as u32, |x, y| {
        let v = plane[[y as usize, x as usize]].round().clamp(0.0, u16::MAX as f64);
        Luma([v as u16])
    });
    img.save(path)
        .with_context(|| format!("failed to write {}", path.display()))?;
    Ok(())
}

/// Read a grayscale image into an f64 plane.
pub fn read_gray16(path: &Path) -> Result<Array2<f64>> {
    let img = image::open(path)
        .with_context(|| format!("failed to open {}", path.display()))?
        .to_luma16();
    let (width, height) = img.dimensions();
    let mut plane = Array2::zeros((height as usize, width as usize));
    for (x, y, pixel) in img.enumerate_pixels() {
        plane[[y as usize, x as usize]] = pixel.0[0] as f64;
    }
    Ok(plane)
}
