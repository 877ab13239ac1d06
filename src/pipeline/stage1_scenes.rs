//! Scene resolution: enumerate the source's scenes, apply the operator's
//! selection and validate the channel configuration before any output is
//! produced. Unknown names are fatal here, by name.

use anyhow::{Result, bail};
use tracing::info;

use crate::ctx::Ctx;
use crate::pipeline::Stage;
use crate::scene::{ChannelMap, Scene, sanitize_name};

pub struct Stage1Scenes;

impl Stage1Scenes {
    pub fn new() -> Self {
        Self
    }
}

impl Stage for Stage1Scenes {
    fn name(&self) -> &'static str {
        "stage1_scenes"
    }

    fn run(&self, ctx: &mut Ctx) -> Result<()> {
        let names: Vec<String> = ctx.source.scene_names().to_vec();
        if names.is_empty() {
            bail!("image source exposes no scenes");
        }

        // Channel labels default to Channel_<n> from the source's count.
        ctx.source.set_scene(0)?;
        let dims = ctx.source.dims();
        if ctx.config.channels.is_empty() {
            ctx.config.channels = (1..=dims.channels)
                .map(|n| format!("Channel_{}", n))
                .collect();
        }
        if ctx.config.channels.len() != dims.channels {
            bail!(
                "{} channel labels configured, source exposes {}",
                ctx.config.channels.len(),
                dims.channels
            );
        }
        let map = ChannelMap::new(ctx.config.channels.clone())?;
        if ctx.config.selected.is_empty() {
            ctx.config.selected = ctx.config.channels.clone();
        }
        map.resolve(&ctx.config.selected)?;
        if ctx.config.background.enabled {
            map.resolve(&ctx.config.background.channels)?;
        }

        let selected_scenes: Vec<(usize, String)> = if ctx.config.scenes.is_empty() {
            names.iter().cloned().enumerate().collect()
        } else {
            let mut resolved = Vec::with_capacity(ctx.config.scenes.len());
            for wanted in &ctx.config.scenes {
                let found = names
                    .iter()
                    .position(|n| n == wanted || sanitize_name(n) == sanitize_name(wanted));
                match found {
                    Some(index) => resolved.push((index, names[index].clone())),
                    None => bail!("unknown scene '{}'", wanted),
                }
            }
            resolved
        };

        ctx.scenes = selected_scenes
            .into_iter()
            .map(|(index, name)| Scene::new(&name, index, ctx.config.channels.clone()))
            .collect();
        info!(scenes = ctx.scenes.len(), "scenes resolved");
        Ok(())
    }
}
