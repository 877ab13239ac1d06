use anyhow::Result;
use clap::Parser;
use tracing::error;
use tracing_subscriber::EnvFilter;

use radprof::analysis;
use radprof::chart::PlottersRenderer;
use radprof::cli::{AnalyzeArgs, Cli, Commands, RunArgs, ScenesArgs};
use radprof::ctx::{BackgroundConfig, Ctx, OutputPaths, RunConfig};
use radprof::editor::{AcceptSeed, RoiEditor, ScriptedEditor};
use radprof::pipeline::Pipeline;
use radprof::pipeline::stage0_scaffold::Stage0Scaffold;
use radprof::pipeline::stage1_scenes::Stage1Scenes;
use radprof::pipeline::stage2_profiles::Stage2Profiles;
use radprof::pipeline::stage3_analysis::Stage3Analysis;
use radprof::scene::{Scene, append_scene_mean, sanitize_name};
use radprof::source::{ImageSource, TiffDirSource};

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();
    match cli.command {
        Commands::Run(args) => run(args),
        Commands::Analyze(args) => analyze(args),
        Commands::Scenes(args) => scenes(args),
    }
}

fn run(args: RunArgs) -> Result<()> {
    let source = TiffDirSource::open(&args.input)?.with_pixel_size(args.pixel_size);
    let pixel_size = source.pixel_size().unwrap_or(1.0);
    let default_unit = if source.pixel_size().is_some() { "um" } else { "px" };
    let unit = args.unit.unwrap_or_else(|| default_unit.to_string());

    let editor: Box<dyn RoiEditor> = match &args.rois {
        Some(path) => Box::new(ScriptedEditor::from_json(path)?),
        None => Box::new(AcceptSeed),
    };

    let config = RunConfig {
        scenes: args.scenes,
        channels: args.channels,
        selected: args.selected,
        pixel_size,
        unit,
        fraction: args.fraction,
        reload: args.reload,
        background: BackgroundConfig {
            enabled: args.subtract_background,
            channels: args.background_channels,
            std_devs: args.std_devs,
            z_slice: args.background_z,
        },
        analyze: args.analyze,
    };

    let mut ctx = Ctx::new(
        config,
        &args.out,
        Box::new(source),
        editor,
        Box::new(PlottersRenderer),
    );
    let pipeline = Pipeline::new(vec![
        Box::new(Stage0Scaffold::new()),
        Box::new(Stage1Scenes::new()),
        Box::new(Stage2Profiles::new()),
        Box::new(Stage3Analysis::new()),
    ]);
    pipeline.run(&mut ctx)?;

    for run in &ctx.runs {
        println!(
            "{}: {} ROIs profiled, {} skipped",
            run.scene, run.processed, run.skipped
        );
    }
    for (scene, mean) in &ctx.scene_means {
        println!("{}: mean minimum radius {:.6}", scene, mean);
    }
    Ok(())
}

fn analyze(args: AnalyzeArgs) -> Result<()> {
    let output = OutputPaths::new(&args.out);
    if !(args.fraction > 0.0 && args.fraction <= 1.0) {
        anyhow::bail!("intensity fraction must be in (0, 1], got {}", args.fraction);
    }

    let scene_names: Vec<String> = if args.scenes.is_empty() {
        let mut names = Vec::new();
        for entry in std::fs::read_dir(&output.profiles_root)? {
            let path = entry?.path();
            if path.is_dir() {
                if let Some(name) = path.file_name().and_then(|n| n.to_str()) {
                    names.push(name.to_string());
                }
            }
        }
        names.sort();
        names
    } else {
        args.scenes.iter().map(|s| sanitize_name(s)).collect()
    };
    if scene_names.is_empty() {
        anyhow::bail!(
            "no scene directories under {}",
            output.profiles_root.display()
        );
    }

    let chart = PlottersRenderer;
    for name in &scene_names {
        let scene = Scene::new(name, 0, Vec::new());
        match analysis::analyze_scene(&scene, &output.profiles_root, args.fraction, &chart) {
            Ok(mean) => {
                append_scene_mean(&output.summary_path, &scene.name, mean)?;
                println!("{}: mean minimum radius {:.6}", scene.name, mean);
            }
            Err(err) => {
                error!(scene = %scene.name, error = %format!("{:#}", err), "scene analysis failed");
            }
        }
    }
    Ok(())
}

fn scenes(args: ScenesArgs) -> Result<()> {
    let mut source = TiffDirSource::open(&args.input)?;
    let names = source.scene_names().to_vec();
    for (index, name) in names.iter().enumerate() {
        source.set_scene(index)?;
        let dims = source.dims();
        println!(
            "{}: {} channels, {} z-slices, {}x{}",
            name, dims.channels, dims.z_slices, dims.height, dims.width
        );
    }
    Ok(())
}
