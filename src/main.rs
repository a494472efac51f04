mod app;

use std::fs;
use std::io::{self, Write};
use std::path::PathBuf;

use anyhow::{Context, Result, anyhow};
use clap::{Parser, ValueEnum};
use flight_graph::{
    Canvas, GeoScales, LayoutMode, Simulation, SimulationConfig, load_config, load_network,
};
use tracing::info;
use tracing_subscriber::EnvFilter;

pub(crate) const GEO_MARGIN: f32 = 40.0;

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
enum ModeArg {
    Network,
    Map,
}

impl From<ModeArg> for LayoutMode {
    fn from(mode: ModeArg) -> Self {
        match mode {
            ModeArg::Network => LayoutMode::Network,
            ModeArg::Map => LayoutMode::Map,
        }
    }
}

#[derive(Debug, Parser)]
#[command(author, version, about)]
struct Args {
    /// Flight dataset (JSON with `airports` and `routes`).
    dataset: PathBuf,

    /// Simulation parameters overriding the defaults.
    #[arg(long)]
    config: Option<PathBuf>,

    #[arg(long, value_enum, default_value_t = ModeArg::Network)]
    mode: ModeArg,

    #[arg(long, default_value_t = 960.0)]
    width: f32,

    #[arg(long, default_value_t = 600.0)]
    height: f32,

    /// Run without a window and print the final positions as JSON.
    #[arg(long)]
    headless: bool,

    #[arg(long)]
    alpha_decay: Option<f32>,

    #[arg(long)]
    velocity_decay: Option<f32>,

    #[arg(long, default_value_t = 300)]
    ticks: u32,

    /// Write headless output here instead of stdout.
    #[arg(long)]
    output: Option<PathBuf>,
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();
}

fn main() -> Result<()> {
    init_tracing();
    let args = Args::parse();

    let mut config = match &args.config {
        Some(path) => load_config(path)?,
        None => SimulationConfig::default(),
    };
    if let Some(alpha_decay) = args.alpha_decay {
        config.alpha_decay = alpha_decay;
    }
    if let Some(velocity_decay) = args.velocity_decay {
        config.velocity_decay = velocity_decay;
    }
    config.validate().context("invalid simulation parameters")?;
    let canvas = Canvas::new(args.width, args.height);

    if args.headless {
        return run_headless(&args, canvas, config);
    }

    let options = eframe::NativeOptions {
        viewport: eframe::egui::ViewportBuilder::default()
            .with_inner_size([args.width + 280.0, args.height + 60.0]),
        ..Default::default()
    };
    let dataset = args.dataset.clone();
    let mode = LayoutMode::from(args.mode);

    eframe::run_native(
        "flight-graph",
        options,
        Box::new(move |cc| {
            Ok(Box::new(app::FlightGraphApp::new(
                cc,
                dataset.clone(),
                config.clone(),
                mode,
            )))
        }),
    )
    .map_err(|error| anyhow!("viewer failed: {error}"))
}

fn run_headless(args: &Args, canvas: Canvas, config: SimulationConfig) -> Result<()> {
    let network = load_network(&args.dataset)?;
    let points = network.geo_points().collect::<Vec<_>>();
    let scales = GeoScales::fit(&points, canvas, GEO_MARGIN);

    let mut simulation = Simulation::new(&network, canvas, &scales, config)
        .context("failed to construct simulation")?;
    let mode = LayoutMode::from(args.mode);
    if mode != simulation.mode() {
        simulation.set_mode(mode);
    }

    for _ in 0..args.ticks {
        simulation.tick();
    }
    let snapshot = simulation.snapshot();
    info!(
        ticks = snapshot.tick,
        alpha = snapshot.alpha,
        state = ?snapshot.state,
        "headless run finished"
    );

    let json = serde_json::to_string_pretty(&snapshot.record())
        .context("failed to serialize snapshot")?;
    match &args.output {
        Some(path) => fs::write(path, format!("{json}\n"))
            .with_context(|| format!("failed to write {}", path.display()))?,
        None => {
            let mut stdout = io::stdout().lock();
            writeln!(stdout, "{json}").context("failed to write snapshot to stdout")?;
        }
    }
    Ok(())
}
