//! Brainfield Application
//!
//! Headless front end for the brain activity dashboard. Renders simulated
//! or recorded device snapshots to PNG frames.
//!
//! # Usage
//!
//! ```bash
//! # Ten frames of one simulated device
//! brainfield render --scenario mixed --frames 10 --out frames/
//!
//! # Render a recorded snapshot with custom artwork
//! brainfield render --snapshot device3.json --fill fill.png --outline outline.png
//!
//! # Twelve simulated devices through the dashboard
//! brainfield demo --devices 12 --ticks 30
//!
//! # Electrode table
//! brainfield electrodes
//! ```

mod simulate;

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{bail, Context};
use brainfield_core::{ColorTheme, DeviceSnapshot, PipelineConfig, ELECTRODES, MAX_DEVICES};
use brainfield_render::{synthetic_templates, BrainPanel, Dashboard, RasterCanvas, TemplateSet};
use clap::{Parser, Subcommand, ValueEnum};
use tracing::{debug, info, warn, Level};
use tracing_subscriber::FmtSubscriber;

use crate::simulate::{Scenario, Simulator};

/// Size of the procedurally drawn templates
const SYNTHETIC_TEMPLATE_SIZE: u32 = 512;

/// Brainfield Application
#[derive(Parser, Debug)]
#[command(name = "brainfield")]
#[command(author, version, about = "Brain activity field renderer", long_about = None)]
struct Cli {
    /// Logging verbosity level
    #[arg(short, long, default_value = "info")]
    log_level: String,

    /// Pipeline configuration file (JSON)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Render frames of a single device panel
    Render {
        /// Snapshot file (JSON); simulated when absent
        #[arg(short, long)]
        snapshot: Option<PathBuf>,

        /// Simulated activity pattern
        #[arg(long, value_enum, default_value = "mixed")]
        scenario: Scenario,

        /// Simulated device id
        #[arg(short, long, default_value = "0")]
        device: u32,

        /// Number of frames
        #[arg(short, long, default_value = "1")]
        frames: u32,

        #[command(flatten)]
        output: OutputArgs,
    },

    /// Run simulated devices through the dashboard
    Demo {
        /// Number of devices (at most 12)
        #[arg(long, default_value = "12")]
        devices: u32,

        /// Simulation ticks before the final frame is written
        #[arg(long, default_value = "20")]
        ticks: u32,

        /// Activity pattern
        #[arg(long, value_enum, default_value = "burst")]
        scenario: Scenario,

        #[command(flatten)]
        output: OutputArgs,
    },

    /// List electrode positions
    Electrodes,
}

#[derive(clap::Args, Debug)]
struct OutputArgs {
    /// Output directory
    #[arg(short, long, default_value = "frames")]
    out: PathBuf,

    /// Frame width
    #[arg(long, default_value = "400")]
    width: u32,

    /// Frame height
    #[arg(long, default_value = "400")]
    height: u32,

    /// Color theme, overriding the config file
    #[arg(long, value_enum)]
    theme: Option<ThemeArg>,

    /// Fill template image (PNG)
    #[arg(long, requires = "outline")]
    fill: Option<PathBuf>,

    /// Outline template image (PNG)
    #[arg(long, requires = "fill")]
    outline: Option<PathBuf>,

    /// Simulator seed
    #[arg(long, default_value = "7")]
    seed: u64,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum ThemeArg {
    Ember,
    Viridis,
    Ocean,
}

impl From<ThemeArg> for ColorTheme {
    fn from(theme: ThemeArg) -> Self {
        match theme {
            ThemeArg::Ember => Self::Ember,
            ThemeArg::Viridis => Self::Viridis,
            ThemeArg::Ocean => Self::Ocean,
        }
    }
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    let log_level = match cli.log_level.to_lowercase().as_str() {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "info" => Level::INFO,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        _ => Level::INFO,
    };

    let subscriber = FmtSubscriber::builder()
        .with_max_level(log_level)
        .with_target(true)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false)
        .finish();

    tracing::subscriber::set_global_default(subscriber)?;

    info!("Brainfield v{}", env!("CARGO_PKG_VERSION"));

    let config = load_config(cli.config.as_deref())?;

    match cli.command {
        Commands::Render { snapshot, scenario, device, frames, output } => {
            run_render(config, snapshot.as_deref(), scenario, device, frames, &output)?;
        }
        Commands::Demo { devices, ticks, scenario, output } => {
            run_demo(config, devices, ticks, scenario, &output)?;
        }
        Commands::Electrodes => list_electrodes(),
    }

    Ok(())
}

/// Load and validate the pipeline configuration, or use defaults.
fn load_config(path: Option<&Path>) -> anyhow::Result<PipelineConfig> {
    let Some(path) = path else {
        return Ok(PipelineConfig::default());
    };
    let text = fs::read_to_string(path).with_context(|| format!("reading config {}", path.display()))?;
    let config: PipelineConfig =
        serde_json::from_str(&text).with_context(|| format!("parsing config {}", path.display()))?;
    config.validate().with_context(|| format!("invalid config {}", path.display()))?;
    info!(path = %path.display(), grid_size = config.grid_size, theme = ?config.theme, "Loaded configuration");
    Ok(config)
}

fn apply_overrides(mut config: PipelineConfig, output: &OutputArgs) -> PipelineConfig {
    if let Some(theme) = output.theme {
        config = config.with_theme(theme.into());
    }
    config
}

/// Template images from disk, or the built-in silhouette.
///
/// A decode failure is not fatal: the panel renders without a silhouette.
fn load_templates(output: &OutputArgs, config: &PipelineConfig) -> Option<TemplateSet> {
    let policy = config.theme.mask_policy();
    let (Some(fill), Some(outline)) = (&output.fill, &output.outline) else {
        debug!("Using built-in templates");
        return Some(synthetic_templates(SYNTHETIC_TEMPLATE_SIZE, SYNTHETIC_TEMPLATE_SIZE, policy));
    };

    let read = |path: &Path| fs::read(path).with_context(|| format!("reading template {}", path.display()));
    let decoded = read(fill)
        .and_then(|f| read(outline).map(|o| (f, o)))
        .and_then(|(f, o)| TemplateSet::decode(&f, &o, policy).context("decoding templates"));

    match decoded {
        Ok(set) => Some(set),
        Err(e) => {
            warn!("Template images unusable, rendering without silhouette: {e:#}");
            None
        }
    }
}

fn read_snapshot(path: &Path) -> anyhow::Result<DeviceSnapshot> {
    let text = fs::read_to_string(path).with_context(|| format!("reading snapshot {}", path.display()))?;
    serde_json::from_str(&text).with_context(|| format!("parsing snapshot {}", path.display()))
}

fn save_frame(canvas: RasterCanvas, path: &Path) -> anyhow::Result<()> {
    canvas.into_image().save(path).with_context(|| format!("writing {}", path.display()))?;
    debug!(path = %path.display(), "Frame written");
    Ok(())
}

/// Render frames of one panel.
fn run_render(
    config: PipelineConfig,
    snapshot_path: Option<&Path>,
    scenario: Scenario,
    device: u32,
    frames: u32,
    output: &OutputArgs,
) -> anyhow::Result<()> {
    let config = apply_overrides(config, output);
    fs::create_dir_all(&output.out).with_context(|| format!("creating {}", output.out.display()))?;

    let recorded = snapshot_path.map(read_snapshot).transpose()?;
    let device_id = recorded.as_ref().map_or(device, |s| s.device_id);

    let templates = load_templates(output, &config);
    let mut panel = BrainPanel::new(device_id, config, brainfield_render::seed_for_device(device_id))?;
    panel.mount();
    panel.templates_decoded(templates.ok_or_else(|| brainfield_render::TemplateError::Unavailable {
        reason: "template images unusable".to_string(),
    }));

    let mut simulator = Simulator::new(scenario, output.seed);
    if let Some(snapshot) = recorded {
        info!(device_id, channels = snapshot.channels.len(), "Rendering recorded snapshot");
        panel.submit_snapshot(Arc::new(snapshot));
    } else {
        info!(device_id, ?scenario, "Rendering simulated snapshots");
    }

    for frame in 0..frames {
        if snapshot_path.is_none() {
            panel.submit_snapshot(Arc::new(simulator.snapshot(device_id)));
            simulator.advance();
        }
        let mut canvas = RasterCanvas::new(output.width, output.height);
        let report = panel.render_frame(&mut canvas);
        if report.fallback.is_some() {
            warn!(frame, fallback = ?report.fallback, "Frame rendered with fallback");
        }
        info!(
            frame,
            field = report.field_computed,
            markers = report.markers_drawn,
            active = report.active_channels,
            "Frame rendered"
        );
        save_frame(canvas, &output.out.join(format!("device{device_id}_frame{frame:03}.png")))?;
    }

    Ok(())
}

/// Drive simulated devices through the dashboard and write their last frames.
fn run_demo(config: PipelineConfig, devices: u32, ticks: u32, scenario: Scenario, output: &OutputArgs) -> anyhow::Result<()> {
    if devices as usize > MAX_DEVICES {
        bail!("at most {MAX_DEVICES} devices can be shown, got {devices}");
    }
    let config = apply_overrides(config, output);
    fs::create_dir_all(&output.out).with_context(|| format!("creating {}", output.out.display()))?;

    let templates = load_templates(output, &config);
    let mut dashboard = Dashboard::new(config, templates)?;
    let mut simulator = Simulator::new(scenario, output.seed);

    for tick in 0..ticks.max(1) {
        let batch: Vec<_> = (0..devices).map(|id| Arc::new(simulator.snapshot(id))).collect();
        dashboard.apply_snapshots(batch)?;
        simulator.advance();

        let last = tick + 1 >= ticks.max(1);
        for device_id in dashboard.device_ids().collect::<Vec<_>>() {
            let mut canvas = RasterCanvas::new(output.width, output.height);
            let report = dashboard.render_device(device_id, &mut canvas)?;
            if last {
                println!("{}", serde_json::to_string(&report)?);
                save_frame(canvas, &output.out.join(format!("device{device_id}.png")))?;
            }
        }
    }

    info!(devices = dashboard.len(), out = %output.out.display(), "Demo frames written");
    Ok(())
}

/// Print the electrode table.
fn list_electrodes() {
    println!("{:<4} {:<6} {:>8} {:>8}", "ID", "Name", "X", "Y");
    for e in &ELECTRODES {
        println!("{:<4} {:<6} {:>8.1} {:>8.1}", e.channel_id, e.name, e.template_x, e.template_y);
    }
}
