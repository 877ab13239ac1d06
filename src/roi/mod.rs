//! ROI types and the ROI-set acquisition state machine.

use anyhow::Result;
use tracing::warn;

use crate::editor::{RoiDraft, RoiEditor, RoiSeed};
use crate::geometry::{Point, Shape};
use crate::scene::Scene;

pub mod processor;

pub use processor::{RoiArtifacts, RoiOutcome, RoiRecord};

/// One user-drawn shape paired with exactly one center point.
#[derive(Debug, Clone)]
pub struct Roi {
    pub shape: Shape,
    pub center: Point,
}

/// An accepted ROI set: pairing is guaranteed by construction.
#[derive(Debug, Clone)]
pub struct RoiSet {
    pub rois: Vec<Roi>,
    pub z_slice: usize,
}

impl RoiSet {
    pub fn shapes(&self) -> Vec<Shape> {
        self.rois.iter().map(|r| r.shape.clone()).collect()
    }
}

/// Acquisition state machine. A drawing session produces a draft; the draft
/// is accepted iff its center and shape counts agree, otherwise the drawn
/// data is carried forward as the seed of the next session.
#[derive(Debug)]
pub enum Acquisition {
    AwaitingInput { seed: RoiSeed },
    Validating { draft: RoiDraft },
    Accepted(RoiSet),
    Rejected { seed: RoiSeed },
}

impl Acquisition {
    pub fn new(seed: RoiSeed) -> Self {
        Acquisition::AwaitingInput { seed }
    }

    /// Validate a finished drawing session.
    pub fn validate(draft: RoiDraft) -> Self {
        if draft.shapes.len() == draft.centers.len() {
            let z_slice = draft.z_slice;
            let rois = draft
                .shapes
                .into_iter()
                .zip(draft.centers)
                .map(|(shape, center)| Roi { shape, center })
                .collect();
            Acquisition::Accepted(RoiSet { rois, z_slice })
        } else {
            Acquisition::Rejected {
                seed: draft.into_seed(),
            }
        }
    }
}

/// Drive the state machine against an editor until a set is accepted.
///
/// Blocks inside `RoiEditor::collect`; this is the pipeline's only
/// suspension point. Zero ROIs is a valid accepted result.
pub fn acquire(editor: &mut dyn RoiEditor, scene: &Scene, seed: RoiSeed) -> Result<RoiSet> {
    let mut state = Acquisition::new(seed);
    loop {
        state = match state {
            Acquisition::AwaitingInput { seed } => {
                let draft = editor.collect(scene, &seed)?;
                Acquisition::Validating { draft }
            }
            Acquisition::Validating { draft } => Acquisition::validate(draft),
            Acquisition::Accepted(set) => return Ok(set),
            Acquisition::Rejected { seed } => {
                warn!(
                    scene = %scene.name,
                    shapes = seed.shapes.len(),
                    centers = seed.centers.len(),
                    "ROI set rejected, re-opening session with previous data"
                );
                Acquisition::AwaitingInput { seed }
            }
        };
    }
}
