//! Directory-of-TIFFs image source.
//!
//! Layout: one subdirectory per scene, holding `C<channel>_Z<z>.tiff`
//! grayscale planes. All planes of a scene must share one shape; the channel
//! and z counts are scanned from the file names at open time.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use ndarray::Array2;

use super::{ImageSource, SourceDims};
use crate::io::tiff;

pub struct TiffDirSource {
    names: Vec<String>,
    scene_dirs: Vec<PathBuf>,
    current: usize,
    dims: SourceDims,
    planes: HashMap<(usize, usize), PathBuf>,
    pixel_size: Option<f64>,
}

impl TiffDirSource {
    pub fn open(root: &Path) -> Result<Self> {
        let mut scene_dirs: Vec<PathBuf> = Vec::new();
        let entries = std::fs::read_dir(root)
            .with_context(|| format!("unreadable image source {}", root.display()))?;
        for entry in entries {
            let path = entry?.path();
            if path.is_dir() {
                scene_dirs.push(path);
            }
        }
        if scene_dirs.is_empty() {
            bail!("image source {} contains no scene directories", root.display());
        }
        scene_dirs.sort();
        let names = scene_dirs
            .iter()
            .map(|p| {
                p.file_name()
                    .map(|n| n.to_string_lossy().to_string())
                    .unwrap_or_default()
            })
            .collect();

        let mut source = Self {
            names,
            scene_dirs,
            current: 0,
            dims: SourceDims {
                channels: 0,
                z_slices: 0,
                height: 0,
                width: 0,
            },
            planes: HashMap::new(),
            pixel_size: None,
        };
        source.scan_current()?;
        Ok(source)
    }

    pub fn with_pixel_size(mut self, pixel_size: Option<f64>) -> Self {
        self.pixel_size = pixel_size;
        self
    }

    fn scan_current(&mut self) -> Result<()> {
        let dir = &self.scene_dirs[self.current];
        let mut planes = HashMap::new();
        let mut channels = 0usize;
        let mut z_slices = 0usize;
        for entry in std::fs::read_dir(dir)
            .with_context(|| format!("unreadable scene directory {}", dir.display()))?
        {
            let path = entry?.path();
            let Some(stem) = path.file_stem().and_then(|s| s.to_str()) else {
                continue;
            };
            let Some((channel, z)) = parse_plane_name(stem) else {
                continue;
            };
            channels = channels.max(channel + 1);
            z_slices = z_slices.max(z + 1);
            planes.insert((channel, z), path);
        }
        if planes.is_empty() {
            bail!("scene directory {} holds no C<i>_Z<k> planes", dir.display());
        }
        for c in 0..channels {
            for z in 0..z_slices {
                if !planes.contains_key(&(c, z)) {
                    bail!("scene {} is missing plane C{}_Z{}", dir.display(), c, z);
                }
            }
        }

        let first = tiff::read_gray16(&planes[&(0, 0)])?;
        let (height, width) = first.dim();
        self.dims = SourceDims {
            channels,
            z_slices,
            height,
            width,
        };
        self.planes = planes;
        Ok(())
    }
}

fn parse_plane_name(stem: &str) -> Option<(usize, usize)> {
    let (c_part, z_part) = stem.split_once('_')?;
    let channel = c_part.strip_prefix('C')?.parse::<usize>().ok()?;
    let z = z_part.strip_prefix('Z')?.parse::<usize>().ok()?;
    Some((channel, z))
}

impl ImageSource for TiffDirSource {
    fn scene_names(&self) -> &[String] {
        &self.names
    }

    fn set_scene(&mut self, index: usize) -> Result<()> {
        if index >= self.scene_dirs.len() {
            bail!("scene index {} out of range ({})", index, self.scene_dirs.len());
        }
        self.current = index;
        self.scan_current()
    }

    fn dims(&self) -> SourceDims {
        self.dims
    }

    fn plane(&self, channel: usize, z: usize) -> Result<Array2<f64>> {
        let path = self
            .planes
            .get(&(channel, z))
            .with_context(|| format!("no plane for channel {}, z {}", channel, z))?;
        let plane = tiff::read_gray16(path)?;
        if plane.dim() != (self.dims.height, self.dims.width) {
            bail!("plane {} disagrees with scene shape", path.display());
        }
        Ok(plane)
    }

    fn pixel_size(&self) -> Option<f64> {
        self.pixel_size
    }
}
