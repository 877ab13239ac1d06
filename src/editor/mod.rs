//! ROI editor boundary.
//!
//! The editor owns the interactive drawing session: it receives seed shapes
//! and centers, blocks until the operator finishes, and hands back the final
//! draft plus the z-slice the shapes were drawn on. The engine only sees
//! this synchronous contract. Headless adapters cover scripted runs and the
//! accept-previous-ROIs reload path.

use std::collections::HashMap;
use std::collections::VecDeque;
use std::path::Path;

use anyhow::{Context, Result, bail};
use serde::Deserialize;

use crate::geometry::{Point, Shape, ShapeKind};
use crate::scene::Scene;

/// Shapes and centers offered to the editor when a session opens.
#[derive(Debug, Clone, Default)]
pub struct RoiSeed {
    pub shapes: Vec<Shape>,
    pub centers: Vec<Point>,
    pub z_slice: usize,
}

/// What the operator left behind when the session closed.
#[derive(Debug, Clone)]
pub struct RoiDraft {
    pub shapes: Vec<Shape>,
    pub centers: Vec<Point>,
    pub z_slice: usize,
}

impl RoiDraft {
    pub fn into_seed(self) -> RoiSeed {
        RoiSeed {
            shapes: self.shapes,
            centers: self.centers,
            z_slice: self.z_slice,
        }
    }
}

pub trait RoiEditor {
    /// Run one drawing session for `scene`, blocking until the operator is
    /// done. Zero shapes is a valid outcome.
    fn collect(&mut self, scene: &Scene, seed: &RoiSeed) -> Result<RoiDraft>;
}

/// Editor that accepts the offered seed unchanged. Serves the reload path,
/// where a previous run's ROIs are taken over without redrawing.
pub struct AcceptSeed;

impl RoiEditor for AcceptSeed {
    fn collect(&mut self, _scene: &Scene, seed: &RoiSeed) -> Result<RoiDraft> {
        Ok(RoiDraft {
            shapes: seed.shapes.clone(),
            centers: seed.centers.clone(),
            z_slice: seed.z_slice,
        })
    }
}

#[derive(Debug, Deserialize)]
struct ShapeSpec {
    kind: String,
    vertices: Vec<[f64; 2]>,
}

#[derive(Debug, Deserialize)]
struct DraftSpec {
    #[serde(default)]
    z: usize,
    shapes: Vec<ShapeSpec>,
    centers: Vec<[f64; 2]>,
}

/// Editor replaying prepared drafts, keyed by scene display name. Each
/// `collect` call pops the next draft for the scene; an exhausted queue
/// yields an empty draft.
pub struct ScriptedEditor {
    drafts: HashMap<String, VecDeque<RoiDraft>>,
}

impl ScriptedEditor {
    pub fn new(drafts: HashMap<String, VecDeque<RoiDraft>>) -> Self {
        Self { drafts }
    }

    pub fn from_json(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read ROI file {}", path.display()))?;
        let raw: HashMap<String, Vec<DraftSpec>> = serde_json::from_str(&content)
            .with_context(|| format!("malformed ROI file {}", path.display()))?;
        let mut drafts = HashMap::new();
        for (scene, specs) in raw {
            let mut queue = VecDeque::new();
            for spec in specs {
                queue.push_back(draft_from_spec(spec, path)?);
            }
            drafts.insert(scene, queue);
        }
        Ok(Self { drafts })
    }
}

fn draft_from_spec(spec: DraftSpec, path: &Path) -> Result<RoiDraft> {
    let mut shapes = Vec::with_capacity(spec.shapes.len());
    for s in spec.shapes {
        let kind = ShapeKind::parse(&s.kind)
            .with_context(|| format!("{}: unknown shape kind '{}'", path.display(), s.kind))?;
        if s.vertices.is_empty() {
            bail!("{}: shape without vertices", path.display());
        }
        let vertices = s.vertices.iter().map(|v| Point::new(v[0], v[1])).collect();
        shapes.push(Shape::new(kind, vertices));
    }
    let centers = spec.centers.iter().map(|c| Point::new(c[0], c[1])).collect();
    Ok(RoiDraft {
        shapes,
        centers,
        z_slice: spec.z,
    })
}

impl RoiEditor for ScriptedEditor {
    fn collect(&mut self, scene: &Scene, seed: &RoiSeed) -> Result<RoiDraft> {
        match self.drafts.get_mut(&scene.name).and_then(|q| q.pop_front()) {
            Some(draft) => Ok(draft),
            // A scripted session cannot re-prompt the operator, so an
            // exhausted queue can only accept the seed as-is. A seed that
            // would be rejected again must fail instead of looping forever.
            None if seed.shapes.len() == seed.centers.len() => Ok(RoiDraft {
                shapes: seed.shapes.clone(),
                centers: seed.centers.clone(),
                z_slice: seed.z_slice,
            }),
            None => bail!(
                "ROI script for scene '{}' ran out of drafts with {} shapes and {} centers",
                scene.name,
                seed.shapes.len(),
                seed.centers.len()
            ),
        }
    }
}
