//! In-memory image source backed by owned arrays, `(channel, z, y, x)` per
//! scene. Used by the tests and by embedders that already hold pixel data.

use anyhow::{Result, bail};
use ndarray::{Array2, Array4};

use super::{ImageSource, SourceDims};

pub struct MemorySource {
    names: Vec<String>,
    scenes: Vec<Array4<f64>>,
    current: usize,
    pixel_size: Option<f64>,
}

impl MemorySource {
    pub fn new(scenes: Vec<(String, Array4<f64>)>, pixel_size: Option<f64>) -> Self {
        let (names, scenes) = scenes.into_iter().unzip();
        Self {
            names,
            scenes,
            current: 0,
            pixel_size,
        }
    }
}

impl ImageSource for MemorySource {
    fn scene_names(&self) -> &[String] {
        &self.names
    }

    fn set_scene(&mut self, index: usize) -> Result<()> {
        if index >= self.scenes.len() {
            bail!("scene index {} out of range ({})", index, self.scenes.len());
        }
        self.current = index;
        Ok(())
    }

    fn dims(&self) -> SourceDims {
        let (channels, z_slices, height, width) = self.scenes[self.current].dim();
        SourceDims {
            channels,
            z_slices,
            height,
            width,
        }
    }

    fn plane(&self, channel: usize, z: usize) -> Result<Array2<f64>> {
        let dims = self.dims();
        if channel >= dims.channels || z >= dims.z_slices {
            bail!("plane ({}, {}) out of range", channel, z);
        }
        Ok(self.scenes[self.current]
            .index_axis(ndarray::Axis(0), channel)
            .index_axis(ndarray::Axis(0), z)
            .to_owned())
    }

    fn pixel_size(&self) -> Option<f64> {
        self.pixel_size
    }
}
