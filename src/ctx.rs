//! Run configuration and mutable pipeline context.

use std::path::{Path, PathBuf};

use anyhow::{Result, bail};

use crate::chart::ChartRenderer;
use crate::editor::RoiEditor;
use crate::scene::Scene;
use crate::scene::runner::SceneRun;
use crate::source::ImageSource;

#[derive(Debug, Clone)]
pub struct BackgroundConfig {
    pub enabled: bool,
    pub channels: Vec<String>,
    pub std_devs: f64,
    pub z_slice: usize,
}

impl Default for BackgroundConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            channels: Vec::new(),
            std_devs: 2.0,
            z_slice: 0,
        }
    }
}

/// The full configuration surface of one run. Values come from whatever
/// front end drives the pipeline; nothing here is read from disk.
#[derive(Debug, Clone)]
pub struct RunConfig {
    /// Scene display names to process; empty means every scene.
    pub scenes: Vec<String>,
    /// Channel labels, ordered by source channel index.
    pub channels: Vec<String>,
    /// Channels whose radial profile is computed; empty means all.
    pub selected: Vec<String>,
    pub pixel_size: f64,
    pub unit: String,
    /// Intensity fraction in (0, 1] for the minimum-radius statistic.
    pub fraction: f64,
    pub reload: bool,
    pub background: BackgroundConfig,
    pub analyze: bool,
}

impl RunConfig {
    pub fn validate(&self) -> Result<()> {
        if !(self.fraction > 0.0 && self.fraction <= 1.0) {
            bail!("intensity fraction must be in (0, 1], got {}", self.fraction);
        }
        if self.pixel_size <= 0.0 {
            bail!("pixel size must be positive, got {}", self.pixel_size);
        }
        if self.background.enabled && self.background.channels.is_empty() {
            bail!("background subtraction enabled without channels");
        }
        Ok(())
    }
}

#[derive(Debug, Clone)]
pub struct OutputPaths {
    pub out_dir: PathBuf,
    pub profiles_root: PathBuf,
    pub summary_path: PathBuf,
}

impl OutputPaths {
    pub fn new(out_dir: &Path) -> Self {
        let profiles_root = out_dir.join("RadialProfiles");
        let summary_path = profiles_root.join("SceneMeanMinRads.txt");
        Self {
            out_dir: out_dir.to_path_buf(),
            profiles_root,
            summary_path,
        }
    }
}

pub struct Ctx {
    pub config: RunConfig,
    pub output: OutputPaths,
    pub source: Box<dyn ImageSource>,
    pub editor: Box<dyn RoiEditor>,
    pub chart: Box<dyn ChartRenderer>,
    /// Resolved by the scene stage.
    pub scenes: Vec<Scene>,
    /// Filled by the profiling stage.
    pub runs: Vec<SceneRun>,
    /// Filled by the analysis stage: `(scene, mean minimum radius)`.
    pub scene_means: Vec<(String, f64)>,
}

impl Ctx {
    pub fn new(
        config: RunConfig,
        out_dir: &Path,
        source: Box<dyn ImageSource>,
        editor: Box<dyn RoiEditor>,
        chart: Box<dyn ChartRenderer>,
    ) -> Self {
        Self {
            config,
            output: OutputPaths::new(out_dir),
            source,
            editor,
            chart,
            scenes: Vec::new(),
            runs: Vec::new(),
            scene_means: Vec::new(),
        }
    }
}
