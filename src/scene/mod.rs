//! Scene metadata, channel mapping and the per-scene table.

use std::collections::HashMap;
use std::fs::{File, OpenOptions};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};

use crate::geometry::{Point, ShapeKind};
use crate::roi::RoiRecord;

pub mod runner;

pub use runner::{SceneRun, run_scene};

/// Default viewer colormaps: first three channels get distinct colors, the
/// rest fall back to grey.
const DEFAULT_COLORS: [&str; 3] = ["blue", "red", "green"];

/// One sample/condition within the acquisition.
#[derive(Debug, Clone)]
pub struct Scene {
    /// Display name, normalized to be filesystem safe.
    pub name: String,
    /// Index into the image source's scene list.
    pub source_index: usize,
    pub channels: Vec<String>,
    pub colors: Vec<String>,
}

impl Scene {
    pub fn new(raw_name: &str, source_index: usize, channels: Vec<String>) -> Self {
        let colors = (0..channels.len())
            .map(|i| DEFAULT_COLORS.get(i).copied().unwrap_or("grey").to_string())
            .collect();
        Self {
            name: sanitize_name(raw_name),
            source_index,
            channels,
            colors,
        }
    }

    pub fn dir(&self, profiles_root: &Path) -> PathBuf {
        profiles_root.join(&self.name)
    }

    pub fn table_path(&self, profiles_root: &Path) -> PathBuf {
        self.dir(profiles_root).join(format!("{}_Table.csv", self.name))
    }

    pub fn master_table_path(&self, profiles_root: &Path) -> PathBuf {
        self.dir(profiles_root)
            .join(format!("{}_MasterTable.csv", self.name))
    }
}

/// Replace path-unsafe characters in a scene display name.
pub fn sanitize_name(name: &str) -> String {
    name.replace([':', '/'], "_")
}

/// Typed mapping from channel label to channel index, validated once at
/// scene-load time so unknown labels fail fast with their name.
#[derive(Debug, Clone)]
pub struct ChannelMap {
    labels: Vec<String>,
    index: HashMap<String, usize>,
}

impl ChannelMap {
    pub fn new(labels: Vec<String>) -> Result<Self> {
        let mut index = HashMap::new();
        for (i, label) in labels.iter().enumerate() {
            if label.contains(',') {
                bail!("channel label '{}' contains a comma", label);
            }
            if index.insert(label.clone(), i).is_some() {
                bail!("duplicate channel label '{}'", label);
            }
        }
        Ok(Self { labels, index })
    }

    pub fn labels(&self) -> &[String] {
        &self.labels
    }

    pub fn len(&self) -> usize {
        self.labels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }

    pub fn index_of(&self, label: &str) -> Result<usize> {
        self.index
            .get(label)
            .copied()
            .with_context(|| format!("unknown channel '{}'", label))
    }

    /// Resolve a selection of labels to indices, failing on the first
    /// unknown name.
    pub fn resolve(&self, labels: &[String]) -> Result<Vec<usize>> {
        labels.iter().map(|l| self.index_of(l)).collect()
    }
}

pub const SCENE_TABLE_COLUMNS: [&str; 9] = [
    "ROI",
    "Shape",
    "Z",
    "CenterRow",
    "CenterCol",
    "CropCenterRow",
    "CropCenterCol",
    "Curve",
    "Plot",
];

/// One row of the per-scene table.
#[derive(Debug, Clone)]
pub struct SceneTableRow {
    pub roi: usize,
    pub kind: ShapeKind,
    pub z_slice: usize,
    pub center_abs: Point,
    pub center_rel: (usize, usize),
    pub curve: String,
    pub plot: String,
}

impl SceneTableRow {
    pub fn from_record(record: &RoiRecord, scene_dir: &Path) -> Self {
        let rel = |p: &Path| {
            p.strip_prefix(scene_dir)
                .unwrap_or(p)
                .to_string_lossy()
                .to_string()
        };
        Self {
            roi: record.index,
            kind: record.kind,
            z_slice: record.z_slice,
            center_abs: record.center_abs,
            center_rel: record.center_rel,
            curve: rel(&record.artifacts.curve),
            plot: rel(&record.artifacts.plot),
        }
    }

    pub fn to_fields(&self) -> Vec<String> {
        vec![
            self.roi.to_string(),
            self.kind.as_str().to_string(),
            self.z_slice.to_string(),
            self.center_abs.row.to_string(),
            self.center_abs.col.to_string(),
            self.center_rel.0.to_string(),
            self.center_rel.1.to_string(),
            self.curve.clone(),
            self.plot.clone(),
        ]
    }

    pub fn from_fields(fields: &[String], path: &Path) -> Result<Self> {
        if fields.len() < SCENE_TABLE_COLUMNS.len() {
            bail!("{}: truncated table row", path.display());
        }
        let parse_usize = |s: &String| -> Result<usize> {
            s.parse()
                .with_context(|| format!("{}: bad integer '{}'", path.display(), s))
        };
        let parse_f64 = |s: &String| -> Result<f64> {
            s.parse()
                .with_context(|| format!("{}: bad number '{}'", path.display(), s))
        };
        let kind = ShapeKind::parse(&fields[1])
            .with_context(|| format!("{}: unknown shape '{}'", path.display(), fields[1]))?;
        Ok(Self {
            roi: parse_usize(&fields[0])?,
            kind,
            z_slice: parse_usize(&fields[2])?,
            center_abs: Point::new(parse_f64(&fields[3])?, parse_f64(&fields[4])?),
            center_rel: (parse_usize(&fields[5])?, parse_usize(&fields[6])?),
            curve: fields[7].clone(),
            plot: fields[8].clone(),
        })
    }
}

/// Append-only scene table writer. Each row is flushed as soon as it is
/// written, so a crash mid-scene leaves a valid prefix of completed rows.
pub struct SceneTable {
    writer: BufWriter<File>,
    path: PathBuf,
    rows: usize,
}

impl SceneTable {
    pub fn create(path: PathBuf) -> Result<Self> {
        let file = File::create(&path)
            .with_context(|| format!("failed to create {}", path.display()))?;
        let mut writer = BufWriter::new(file);
        writeln!(writer, "{}", SCENE_TABLE_COLUMNS.join(","))?;
        writer.flush()?;
        Ok(Self {
            writer,
            path,
            rows: 0,
        })
    }

    pub fn append(&mut self, row: &SceneTableRow) -> Result<()> {
        writeln!(self.writer, "{}", row.to_fields().join(","))?;
        self.writer.flush()?;
        self.rows += 1;
        Ok(())
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn rows(&self) -> usize {
        self.rows
    }
}

/// Read the rows of a scene (or master) table; surplus analysis columns on
/// master rows are ignored.
pub fn read_table_rows(path: &Path) -> Result<Vec<SceneTableRow>> {
    let (header, raw_rows) = crate::io::tables::read_table(path)?;
    if header.len() < SCENE_TABLE_COLUMNS.len()
        || header[..SCENE_TABLE_COLUMNS.len()]
            .iter()
            .zip(SCENE_TABLE_COLUMNS)
            .any(|(a, b)| a != b)
    {
        bail!("{}: unexpected table header", path.display());
    }
    raw_rows
        .iter()
        .map(|fields| SceneTableRow::from_fields(fields, path))
        .collect()
}

/// Append one `<scene>: <mean>` line to the cross-scene summary. The file
/// accumulates across runs.
pub fn append_scene_mean(summary_path: &Path, scene_name: &str, mean: f64) -> Result<()> {
    let mut file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(summary_path)
        .with_context(|| format!("failed to open {}", summary_path.display()))?;
    writeln!(file, "{}: {:.6}", scene_name, mean)?;
    Ok(())
}
