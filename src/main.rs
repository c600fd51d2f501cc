mod cache;
mod config;
mod date_gen;
mod error;
mod fit;
mod format;
mod geodesy;
mod histogram;
mod readers;
mod render;
mod stages;
mod trends;
mod utils;

use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;
use std::time::Duration;
use tracing::info;
use tracing_subscriber::{EnvFilter, fmt};

use config::Config;
use geodesy::AreaParams;

/// Baltic sea-ice concentration study
#[derive(Parser, Debug)]
#[command(name = "baltic-ice")]
#[command(
    version,
    about = "Areas, histograms, trends, maps and animations of Baltic sea-ice concentration charts"
)]
struct Cli {
    /// JSON configuration file
    #[arg(long, global = true, env = "BALTIC_ICE_CONFIG")]
    config: Option<PathBuf>,

    /// Directory searched recursively for the NetCDF ice charts
    #[arg(long, global = true)]
    data_dir: Option<PathBuf>,

    /// Directory receiving every artefact
    #[arg(long, global = true)]
    output_dir: Option<PathBuf>,

    /// Font strip written by `alphabet` and read by `maps`
    #[arg(long, global = true)]
    font_strip: Option<PathBuf>,

    /// Print debug messages
    #[arg(long, global = true)]
    debug: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Args, Debug, Clone, Copy)]
struct AreaArgs {
    /// Tolerance of the Vincenty formula iterations
    #[arg(long, default_value_t = 1.0e-12)]
    eps: f64,

    /// Number of levels to split shapes into when calculating their area
    #[arg(long, default_value_t = 1, value_parser = clap::value_parser!(u32).range(1..))]
    level: u32,

    /// Maximum number of Vincenty iterations
    #[arg(long, default_value_t = 1_000_000)]
    n_iter: u32,
}

impl From<AreaArgs> for AreaParams {
    fn from(args: AreaArgs) -> Self {
        AreaParams {
            eps: args.eps,
            level: args.level,
            n_iter: args.n_iter,
        }
    }
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Render the font strip used to annotate the maps
    Alphabet {
        /// TrueType font to render
        font: PathBuf,
    },
    /// Check every chart shares one grid and mask; cache the grid, pixel areas and area fit
    CheckData {
        #[command(flatten)]
        area: AreaArgs,
    },
    /// Study the grid spacing and pixel areas of one chart
    GridStudy {
        /// NetCDF ice chart
        file: PathBuf,

        #[command(flatten)]
        area: AreaArgs,
    },
    /// Draw an annotated concentration map of every chart with sea ice
    Maps,
    /// Build area histograms, the daily trend series and the winter totals
    Histograms,
    /// Plot each day's histogram against the equivalent-area series
    Plots,
    /// Put each day's map and plot side by side
    Frames,
    /// Assemble the frames into GIF, MP4 and WEBP animations
    Animate {
        /// Frames per second
        #[arg(long, default_value_t = 25, value_parser = clap::value_parser!(u32).range(1..))]
        fps: u32,

        /// Timeout for the ffmpeg calls [s]
        #[arg(long, default_value_t = 60.0)]
        timeout: f64,
    },
}

fn init_tracing(debug: bool) {
    let level = if debug { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    fmt().with_env_filter(filter).with_target(false).init();
}

fn load_config(cli: &Cli) -> Result<Config, config::ConfigError> {
    let mut config = match &cli.config {
        Some(path) => Config::from_file(path)?,
        None => Config::default(),
    };

    if let Some(data_dir) = &cli.data_dir {
        config = config.with_data_dir(data_dir.clone());
    }
    if let Some(output_dir) = &cli.output_dir {
        config = config.with_output_dir(output_dir.clone());
    }
    if let Some(font_strip) = &cli.font_strip {
        config = config.with_font_strip(font_strip.clone());
    }

    Ok(config)
}

fn timeout_from_secs(seconds: f64) -> Result<Duration, Box<dyn std::error::Error>> {
    Ok(Duration::try_from_secs_f64(seconds)?)
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    init_tracing(cli.debug);

    let config = load_config(&cli)?;
    info!(
        "Charts from {} to {} in \"{}\"",
        config.start_date(),
        config.end_date(),
        config.data_dir().display()
    );

    match &cli.command {
        Commands::Alphabet { font } => stages::alphabet::run(&config, font)?,
        Commands::CheckData { area } => stages::check_data::run(&config, &(*area).into())?,
        Commands::GridStudy { file, area } => {
            stages::grid_study::run(&config, file, &(*area).into())?
        }
        Commands::Maps => stages::maps::run(&config)?,
        Commands::Histograms => stages::histograms::run(&config)?,
        Commands::Plots => stages::plots::run(&config)?,
        Commands::Frames => stages::frames::run(&config)?,
        Commands::Animate { fps, timeout } => {
            stages::animate::run(&config, *fps, timeout_from_secs(*timeout)?)?
        }
    }

    Ok(())
}
