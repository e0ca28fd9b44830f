//! Kinetic CLI
//!
//! Inspect capability detection, list reveal presets, and preview a page's
//! motion headlessly.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use kinetic_animation::{BlendingMask, Preset};
use kinetic_core::{AnimationController, CapabilityProvider, MotionConfig};
use kinetic_platform::SystemCapabilities;
use serde_json::json;
use std::path::PathBuf;
use tracing::info;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

mod preview;

use preview::{PreviewOptions, Viewport};

#[derive(Parser)]
#[command(name = "kinetic")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Kinetic motion engine CLI", long_about = None)]
struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Motion configuration file
    #[arg(short, long, global = true, default_value = "motion.toml")]
    config: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the detected capability profile
    Capabilities,

    /// List reveal presets with their keyframes and timing
    Presets {
        /// Only show this preset
        name: Option<String>,
    },

    /// Simulate scrolling a sample page and print frame samples
    Preview {
        /// Final scroll offset in pixels
        #[arg(short, long, default_value = "1500")]
        scroll: f32,

        /// Viewport size as WIDTHxHEIGHT
        #[arg(long, default_value = "1280x800")]
        viewport: Viewport,

        /// Frames to spend reaching the final offset
        #[arg(short, long, default_value = "60")]
        frames: u32,

        /// Extra frames to run after the scroll stops
        #[arg(long, default_value = "180")]
        settle: u32,

        /// Print a sample every N frames
        #[arg(long, default_value = "30")]
        every: u32,

        /// Simulate a reduced-motion preference
        #[arg(long)]
        reduced_motion: bool,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("info")
    };

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(filter)
        .init();

    let config = MotionConfig::load_or_default(&cli.config);

    match cli.command {
        Commands::Capabilities => cmd_capabilities(&config),

        Commands::Presets { name } => cmd_presets(&config, name.as_deref()),

        Commands::Preview {
            scroll,
            viewport,
            frames,
            settle,
            every,
            reduced_motion,
        } => cmd_preview(
            config,
            PreviewOptions {
                scroll,
                viewport,
                frames,
                settle,
                every,
                reduced_motion,
            },
        ),
    }
}

fn print_json(value: &serde_json::Value) -> Result<()> {
    let text = serde_json::to_string_pretty(value).context("failed to serialize output")?;
    println!("{}", text);
    Ok(())
}

fn cmd_capabilities(config: &MotionConfig) -> Result<()> {
    let provider = SystemCapabilities::new();
    let signals = provider.read_signals().ok();
    let controller = AnimationController::mount(&provider, &config.capability);

    info!("capability provider: {}", provider.name());

    print_json(&json!({
        "provider": provider.name(),
        "hydrated": controller.is_hydrated(),
        "signals": signals,
        "profile": controller.profile(),
        "supports_intersection": controller.supports_intersection(),
        "fallback": config.capability.fallback,
    }))
}

fn cmd_presets(config: &MotionConfig, name: Option<&str>) -> Result<()> {
    let presets: Vec<Preset> = match name {
        Some(name) => vec![name
            .parse()
            .with_context(|| format!("no preset named '{}'", name))?],
        None => Preset::ALL.to_vec(),
    };

    let listing: Vec<serde_json::Value> = presets
        .into_iter()
        .map(|preset| {
            let pair = preset.keyframes();
            json!({
                "name": preset.name(),
                "hidden": pair.hidden,
                "visible": pair.visible,
                "transition": preset.transition(&config.reveal),
                "root_margin": preset.root_margin(&config.reveal),
                "once": config.reveal.once || preset.forces_once(),
            })
        })
        .collect();

    let mask = BlendingMask::from_config(&config.mask).context("invalid [mask] section")?;
    print_json(&json!({
        "presets": listing,
        "hero_mask": mask.layers().to_vec(),
    }))
}

fn cmd_preview(config: MotionConfig, options: PreviewOptions) -> Result<()> {
    info!(
        "previewing scroll to {}px at {}",
        options.scroll, options.viewport
    );
    let samples = preview::run(config, &options)?;
    print_json(&json!({ "samples": samples }))
}
