//! Analysis stage: fractional-radius analysis per scene.
//!
//! A scene whose join fails is reported and left behind; the remaining
//! scenes still get their analysis.

use anyhow::Result;
use tracing::error;

use crate::analysis;
use crate::ctx::Ctx;
use crate::pipeline::Stage;
use crate::scene;

pub struct Stage3Analysis;

impl Stage3Analysis {
    pub fn new() -> Self {
        Self
    }
}

impl Stage for Stage3Analysis {
    fn name(&self) -> &'static str {
        "stage3_analysis"
    }

    fn run(&self, ctx: &mut Ctx) -> Result<()> {
        if !ctx.config.analyze {
            return Ok(());
        }
        let scenes = ctx.scenes.clone();
        for s in &scenes {
            match analysis::analyze_scene(
                s,
                &ctx.output.profiles_root,
                ctx.config.fraction,
                ctx.chart.as_ref(),
            ) {
                Ok(mean) => {
                    scene::append_scene_mean(&ctx.output.summary_path, &s.name, mean)?;
                    ctx.scene_means.push((s.name.clone(), mean));
                }
                Err(err) => {
                    error!(
                        scene = %s.name,
                        error = %format!("{:#}", err),
                        "scene analysis failed"
                    );
                }
            }
        }
        Ok(())
    }
}
