use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

#[derive(Debug, Parser)]
#[command(name = "radprof", version, about = "Radial profiling of fluorescence ROIs")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    Run(RunArgs),
    Analyze(AnalyzeArgs),
    Scenes(ScenesArgs),
}

#[derive(Debug, Args)]
pub struct RunArgs {
    #[arg(long, help = "Image source directory (scene subdirs of C<i>_Z<k>.tiff planes)")]
    pub input: PathBuf,

    #[arg(long)]
    pub out: PathBuf,

    #[arg(long = "scene", help = "Scene display name to process (repeatable; default all)")]
    pub scenes: Vec<String>,

    #[arg(
        long = "channel",
        help = "Channel label, ordered by channel index (repeatable; default Channel_<n>)"
    )]
    pub channels: Vec<String>,

    #[arg(
        long = "select",
        help = "Channel to profile radially (repeatable; default all channels)"
    )]
    pub selected: Vec<String>,

    #[arg(long, help = "Physical pixel size; overrides the source's value")]
    pub pixel_size: Option<f64>,

    #[arg(long, help = "Unit label for the distance axis")]
    pub unit: Option<String>,

    #[arg(long, default_value_t = 0.5, help = "Intensity fraction in (0, 1]")]
    pub fraction: f64,

    #[arg(long, help = "JSON file of scripted ROI drafts per scene")]
    pub rois: Option<PathBuf>,

    #[arg(long, default_value_t = false, help = "Reload ROIs persisted by a previous run")]
    pub reload: bool,

    #[arg(long, default_value_t = false)]
    pub subtract_background: bool,

    #[arg(long = "background-channel", help = "Channel to background-subtract (repeatable)")]
    pub background_channels: Vec<String>,

    #[arg(long, default_value_t = 2.0, help = "Std-dev multiplier for the background threshold")]
    pub std_devs: f64,

    #[arg(long, default_value_t = 0, help = "Z-slice used for background estimation")]
    pub background_z: usize,

    #[arg(long, default_value_t = false, help = "Run fractional-radius analysis after profiling")]
    pub analyze: bool,
}

#[derive(Debug, Args)]
pub struct AnalyzeArgs {
    #[arg(long, help = "Output directory of a previous run (holds RadialProfiles/)")]
    pub out: PathBuf,

    #[arg(long = "scene", help = "Scene to analyze (repeatable; default all)")]
    pub scenes: Vec<String>,

    #[arg(long, default_value_t = 0.5, help = "Intensity fraction in (0, 1]")]
    pub fraction: f64,
}

#[derive(Debug, Args)]
pub struct ScenesArgs {
    #[arg(long, help = "Image source directory")]
    pub input: PathBuf,
}
