use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;

use clap::{Parser, Subcommand};
use glam::Vec2;
use serde::Serialize;
use sidescroll_assets::{FsSource, ImageCrateDecoder, StagedAssetPipeline, TextureState};
use sidescroll_common::{DiagnosticsConfig, RuntimeConfig};
use sidescroll_render::{DebugTextDrawer, DrawPass};
use sidescroll_runtime::FrameDriver;
use tracing_subscriber::EnvFilter;

mod demo;

use demo::{Sprite, Walker};

#[derive(Parser)]
#[command(name = "sidescroll-cli", about = "Headless host for the sidescroll runtime")]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print engine version and crate info
    Info,
    /// Run the walking-character demo headlessly
    Run {
        /// Number of frames to simulate with a fixed frame delta
        #[arg(short, long, default_value = "600")]
        frames: u64,
        /// Simulated frame time in milliseconds
        #[arg(long, default_value = "16.7")]
        frame_ms: f64,
        /// Run against the wall clock for this many seconds instead
        #[arg(long)]
        realtime: Option<f64>,
        /// Simulation ticks per second
        #[arg(long, default_value = "60")]
        tick_rate: f64,
        /// Directory sprite keys are resolved against
        #[arg(long, default_value = "Assets/Sprites")]
        assets_root: PathBuf,
        /// Sprite keys to load, one renderable each
        #[arg(long, value_delimiter = ',', default_value = "player/idle_1.png,ground.png")]
        sprites: Vec<String>,
        /// Sprite keys to register but keep hidden
        #[arg(long, value_delimiter = ',')]
        hidden: Vec<String>,
        /// Log timing samples every N ticks
        #[arg(long)]
        diagnostics: Option<u64>,
    },
    /// Stage-load assets and report how many frames the pipeline needed
    Load {
        /// Asset keys relative to the assets root
        #[arg(required = true)]
        keys: Vec<String>,
        #[arg(long, default_value = "Assets/Sprites")]
        assets_root: PathBuf,
        /// Emit the report as JSON
        #[arg(long)]
        json: bool,
    },
}

#[derive(Debug, Serialize)]
struct LoadReport {
    frames: u64,
    elapsed_ms: f64,
    assets: Vec<LoadedAsset>,
}

#[derive(Debug, Serialize)]
struct LoadedAsset {
    key: String,
    state: String,
    width: u32,
    height: u32,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(filter))
        .init();

    match cli.command {
        Commands::Info => {
            println!("sidescroll-cli v{}", env!("CARGO_PKG_VERSION"));
            println!("common: {}", sidescroll_common::crate_info());
            println!("kernel: {}", sidescroll_kernel::crate_info());
            println!("render: {}", sidescroll_render::crate_info());
            println!("assets: {}", sidescroll_assets::crate_info());
            println!("runtime: {}", sidescroll_runtime::crate_info());
        }
        Commands::Run {
            frames,
            frame_ms,
            realtime,
            tick_rate,
            assets_root,
            sprites,
            hidden,
            diagnostics,
        } => {
            let config = RuntimeConfig {
                tick_rate_hz: tick_rate,
                assets_root,
                diagnostics: DiagnosticsConfig {
                    enabled: diagnostics.is_some(),
                    sample_every_n_ticks: diagnostics.unwrap_or(60),
                },
            };
            run_demo(config, &sprites, &hidden, frames, frame_ms / 1000.0, realtime)?;
        }
        Commands::Load {
            keys,
            assets_root,
            json,
        } => {
            let report = load_assets(assets_root, &keys);
            if json {
                println!("{}", serde_json::to_string_pretty(&report)?);
            } else {
                println!(
                    "Loaded {} assets in {} frames ({:.2} ms)",
                    report.assets.len(),
                    report.frames,
                    report.elapsed_ms
                );
                for a in &report.assets {
                    println!("  {:<32} {:<12} {}x{}", a.key, a.state, a.width, a.height);
                }
            }
        }
    }

    Ok(())
}

fn run_demo(
    config: RuntimeConfig,
    sprite_keys: &[String],
    hidden: &[String],
    frames: u64,
    frame_delta: f64,
    realtime: Option<f64>,
) -> anyhow::Result<()> {
    let source = FsSource::new(&config.assets_root);
    let mut driver = FrameDriver::new(config, source, ImageCrateDecoder)?;

    let walker = Arc::new(Walker::new(
        Vec2::new(0.0, 400.0),
        Vec2::new(200.0, 0.0),
        0.0,
        1280.0,
    ));
    driver.tick_registry().register(&walker);

    // First sprite follows the walker; the rest are static scenery below it.
    let mut sprites = Vec::new();
    for (i, key) in sprite_keys.iter().enumerate() {
        let texture = driver.assets_mut().request_load(key);
        let sprite = if i == 0 {
            Sprite::new(key.as_str(), 10, texture).following(walker.clone())
        } else {
            Sprite::new(key.as_str(), -(i as i32), texture)
        };
        sprite.set_visible(!hidden.contains(key));
        let sprite = Arc::new(sprite);
        driver.render_registry().register(&sprite);
        sprites.push(sprite);
    }

    let ran = match realtime {
        Some(seconds) => {
            let start = Instant::now();
            driver.run_until(|_| start.elapsed().as_secs_f64() < seconds)?
        }
        None => {
            for _ in 0..frames {
                driver.run_frame(frame_delta)?;
            }
            frames
        }
    };

    println!(
        "Ran {ran} frames: ticks={}, alpha={:.3}, pending_assets={}",
        driver.clock().tick_count(),
        driver.clock().interpolation_alpha(),
        driver.assets().pending_count()
    );
    let pos = walker.position();
    println!("Walker at ({:.1}, {:.1})", pos.x, pos.y);
    for sprite in &sprites {
        let (w, h) = sprite.texture().size();
        println!(
            "  {:<32} {:?} {w}x{h} drawn_at={:?}",
            sprite.texture().key(),
            sprite.texture().state(),
            sprite.drawn_at()
        );
    }
    print!(
        "{}",
        DebugTextDrawer::new().draw(
            &driver.render_registry().snapshot(),
            driver.clock().interpolation_alpha()
        )
    );
    Ok(())
}

fn load_assets(assets_root: PathBuf, keys: &[String]) -> LoadReport {
    let mut pipeline = StagedAssetPipeline::new(FsSource::new(assets_root), ImageCrateDecoder);
    let start = Instant::now();
    let handles: Vec<_> = keys.iter().map(|k| pipeline.request_load(k)).collect();

    let mut frames = 0;
    while !pipeline.is_idle() {
        pipeline.advance_one_frame();
        frames += 1;
    }
    let elapsed_ms = start.elapsed().as_secs_f64() * 1e3;

    let assets = handles
        .iter()
        .map(|t| {
            let (width, height) = t.size();
            let state = match t.state() {
                TextureState::Pending => "pending",
                TextureState::Resident => "resident",
                TextureState::Placeholder => "placeholder",
            };
            LoadedAsset {
                key: t.key().to_string(),
                state: state.to_string(),
                width,
                height,
            }
        })
        .collect();

    LoadReport {
        frames,
        elapsed_ms,
        assets,
    }
}
