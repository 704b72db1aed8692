mod app;
mod bindings;
mod demo;
mod ui;

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::Parser;

use lumen_engine::config::EngineConfig;
use lumen_engine::core::{LoopParts, PresentationLoop, ShutdownReport, StopReason};
use lumen_engine::logging::{init_logging, LoggingConfig};
use lumen_engine::scene::Scene;
use lumen_engine::time::SystemClock;
use lumen_engine::window::NativeWindow;

use app::StudioApp;
use bindings::{StudioRender, StudioScene, StudioUi};

/// Deferred-rendering demo: a spinning torus behind a small control dialog.
#[derive(Debug, Parser)]
#[command(name = "lumen-studio", version)]
struct Args {
    /// TOML engine configuration; defaults are used when omitted.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Stop after this many presented frames.
    #[arg(long)]
    frames: Option<u64>,

    /// `env_logger` filter, overriding the configuration and RUST_LOG.
    #[arg(long)]
    log: Option<String>,
}

fn main() -> ExitCode {
    let args = Args::parse();

    let config = match load_config(&args) {
        Ok(config) => config,
        Err(e) => {
            init_logging(LoggingConfig::default());
            log::error!("{:#}", e);
            return ExitCode::FAILURE;
        }
    };
    init_logging(LoggingConfig::from_engine(&config));

    match run(&config) {
        Ok(report) => {
            log::info!(
                "stopped after {} frames ({:?}); streamer: {} iterations, {} tasks, {} failures",
                report.frames,
                report.reason,
                report.streamer.iterations,
                report.streamer.tasks,
                report.streamer.failures
            );
            match report.reason {
                StopReason::Failed(_) => ExitCode::FAILURE,
                _ => ExitCode::SUCCESS,
            }
        }
        Err(e) => {
            log::error!("setup failed: {:#}", e);
            ExitCode::FAILURE
        }
    }
}

fn load_config(args: &Args) -> Result<EngineConfig> {
    let mut config = match &args.config {
        Some(path) => EngineConfig::load(path)?,
        None => EngineConfig::default(),
    };
    if args.frames.is_some() {
        config.max_frames = args.frames;
    }
    if args.log.is_some() {
        config.log_filter = args.log.clone();
    }
    Ok(config)
}

fn run(config: &EngineConfig) -> Result<ShutdownReport> {
    let window = NativeWindow::new(&config.window).context("open window")?;

    let mut scene = Scene::new();
    let mut scene_backend = StudioScene::new();
    let demo = demo::build(&mut scene, &mut scene_backend, config.texture_size).context("build demo scene")?;

    let render = StudioRender::new(&window, &scene_backend);
    let ui = StudioUi::new(config.window.title.clone(), [1.0; 3]);
    let app = StudioApp::new(ui.ids());

    let parts = LoopParts {
        window,
        scene_backend,
        render,
        ui,
        scene,
    };
    let presentation = PresentationLoop::new(config, parts, app, Box::new(SystemClock::new()))?
        .with_cadence_binding(demo::cadence_binding(&demo, config.texture_size));

    Ok(presentation.run())
}
