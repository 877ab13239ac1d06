//! Per-scene sequencing: background subtraction, ROI acquisition, masking,
//! ROI processing and incremental table output.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use ndarray::Array2;
use tracing::{info, warn};

use crate::chart::{self, ChartRenderer};
use crate::ctx::RunConfig;
use crate::editor::{RoiEditor, RoiSeed};
use crate::geometry;
use crate::profile::background;
use crate::roi::processor::{self, ChannelPlane, RoiJob};
use crate::roi::{self, RoiOutcome};
use crate::scene::{ChannelMap, Scene, SceneTable, SceneTableRow};
use crate::source::ImageSource;

#[derive(Debug, Clone)]
pub struct SceneRun {
    pub scene: String,
    pub processed: usize,
    pub skipped: usize,
    pub table_path: PathBuf,
}

pub fn run_scene(
    source: &mut dyn ImageSource,
    editor: &mut dyn RoiEditor,
    chart: &dyn ChartRenderer,
    config: &RunConfig,
    scene: &Scene,
    profiles_root: &Path,
) -> Result<SceneRun> {
    source.set_scene(scene.source_index)?;
    let dims = source.dims();
    if scene.channels.len() != dims.channels {
        bail!(
            "scene '{}' exposes {} channels, {} labels configured",
            scene.name,
            dims.channels,
            scene.channels.len()
        );
    }
    let map = ChannelMap::new(scene.channels.clone())?;
    let selected = map.resolve(&config.selected)?;

    let scene_dir = scene.dir(profiles_root);
    std::fs::create_dir_all(&scene_dir)
        .with_context(|| format!("failed to create {}", scene_dir.display()))?;

    // Planes rewritten by background subtraction, keyed by (channel, z).
    let mut overrides: HashMap<(usize, usize), Array2<f64>> = HashMap::new();
    if config.background.enabled {
        let z = config.background.z_slice;
        if z >= dims.z_slices {
            bail!("background z-slice {} out of range ({})", z, dims.z_slices);
        }
        let record_path = scene_dir.join("Background.txt");
        for label in &config.background.channels {
            let idx = map.index_of(label)?;
            let mut plane = source.plane(idx, z)?;
            let fit = background::fit_normal(plane.view());
            let threshold = fit.threshold(config.background.std_devs);
            background::subtract_threshold(&mut plane, threshold);
            background::append_record(&record_path, label, &fit, threshold)?;
            info!(
                scene = %scene.name,
                channel = %label,
                mean = fit.mean,
                std = fit.std,
                threshold,
                "background subtracted"
            );
            overrides.insert((idx, z), plane);
        }
    }

    let seed = if config.reload {
        match load_seed(scene, profiles_root) {
            Ok(Some(seed)) => {
                info!(scene = %scene.name, rois = seed.shapes.len(), "previous ROIs offered as seed");
                seed
            }
            Ok(None) => RoiSeed::default(),
            Err(err) => {
                warn!(scene = %scene.name, error = %format!("{:#}", err), "failed to reload previous ROIs");
                RoiSeed::default()
            }
        }
    } else {
        RoiSeed::default()
    };

    let set = roi::acquire(editor, scene, seed)?;
    if set.z_slice >= dims.z_slices {
        bail!("ROI z-slice {} out of range ({})", set.z_slice, dims.z_slices);
    }
    let masks = geometry::to_masks(&set.shapes(), dims.height, dims.width);

    let mut channels = Vec::with_capacity(selected.len());
    for (label, idx) in config.selected.iter().zip(&selected) {
        let plane = match overrides.remove(&(*idx, set.z_slice)) {
            Some(plane) => plane,
            None => source.plane(*idx, set.z_slice)?,
        };
        channels.push(ChannelPlane {
            label: label.clone(),
            color: chart::color_for(&scene.colors[*idx]),
            plane,
        });
    }

    let pixel_size = config.pixel_size;
    let mut table = SceneTable::create(scene.table_path(profiles_root))?;
    let mut skipped = 0usize;
    for (index, roi) in set.rois.iter().enumerate() {
        let job = RoiJob {
            index,
            roi,
            mask: &masks[index],
            z_slice: set.z_slice,
            channels: &channels,
            pixel_size,
            unit: &config.unit,
            scene_dir: &scene_dir,
            chart,
        };
        match processor::process(&job) {
            RoiOutcome::Processed(record) => {
                table.append(&SceneTableRow::from_record(&record, &scene_dir))?;
            }
            RoiOutcome::Skipped { index, reason } => {
                skipped += 1;
                warn!(scene = %scene.name, roi = index, reason = %reason, "ROI skipped");
            }
        }
    }

    info!(
        scene = %scene.name,
        processed = table.rows(),
        skipped,
        "scene finished"
    );
    Ok(SceneRun {
        scene: scene.name.clone(),
        processed: table.rows(),
        skipped,
        table_path: table.path().to_path_buf(),
    })
}

/// Load the ROI seed persisted by a previous run, if any table survives.
/// The master table wins over the intermediate scene table, which analysis
/// removes after joining.
fn load_seed(scene: &Scene, profiles_root: &Path) -> Result<Option<RoiSeed>> {
    let candidates = [
        scene.master_table_path(profiles_root),
        scene.table_path(profiles_root),
    ];
    let Some(table_path) = candidates.iter().find(|p| p.exists()) else {
        return Ok(None);
    };
    let rows = super::read_table_rows(table_path)?;
    let scene_dir = scene.dir(profiles_root);
    let mut shapes = Vec::with_capacity(rows.len());
    let mut centers = Vec::with_capacity(rows.len());
    let mut z_slice = 0usize;
    for (i, row) in rows.iter().enumerate() {
        let coords_path = scene_dir
            .join(format!("ROI_{}", row.roi))
            .join("Coordinates.csv");
        let (shape, center, z) = processor::read_coordinates(&coords_path)?;
        shapes.push(shape);
        centers.push(center);
        if i == 0 {
            z_slice = z;
        }
    }
    Ok(Some(RoiSeed {
        shapes,
        centers,
        z_slice,
    }))
}
