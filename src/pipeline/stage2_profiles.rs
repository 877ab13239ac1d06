//! Profiling stage: run every resolved scene through the scene runner,
//! strictly one at a time.

use anyhow::Result;

use crate::ctx::Ctx;
use crate::pipeline::Stage;
use crate::scene::runner;

pub struct Stage2Profiles;

impl Stage2Profiles {
    pub fn new() -> Self {
        Self
    }
}

impl Stage for Stage2Profiles {
    fn name(&self) -> &'static str {
        "stage2_profiles"
    }

    fn run(&self, ctx: &mut Ctx) -> Result<()> {
        let scenes = ctx.scenes.clone();
        for scene in &scenes {
            let run = runner::run_scene(
                ctx.source.as_mut(),
                ctx.editor.as_mut(),
                ctx.chart.as_ref(),
                &ctx.config,
                scene,
                &ctx.output.profiles_root,
            )?;
            ctx.runs.push(run);
        }
        Ok(())
    }
}
