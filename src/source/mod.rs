//! Image source boundary.
//!
//! A source exposes the scenes of a multi-scene acquisition, a settable
//! current scene, per-channel per-z intensity planes and an optional
//! physical pixel size. Decoding of vendor formats happens behind this
//! trait; the engine itself never touches files from the microscope.

use anyhow::Result;
use ndarray::Array2;

pub mod memory;
pub mod tiff_dir;

pub use memory::MemorySource;
pub use tiff_dir::TiffDirSource;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SourceDims {
    pub channels: usize,
    pub z_slices: usize,
    pub height: usize,
    pub width: usize,
}

pub trait ImageSource {
    fn scene_names(&self) -> &[String];

    /// Make `index` the current scene; dims and planes refer to it afterward.
    fn set_scene(&mut self, index: usize) -> Result<()>;

    fn dims(&self) -> SourceDims;

    /// Intensity plane of the current scene for one channel and z-slice.
    fn plane(&self, channel: usize, z: usize) -> Result<Array2<f64>>;

    /// Physical size of one pixel along the spatial axes, if known.
    fn pixel_size(&self) -> Option<f64>;
}
