mod engine;
mod graph;
mod util;
mod viewer;

use std::fs;
use std::path::PathBuf;

use anyhow::{Context, Result, anyhow};
use clap::Parser;

use crate::engine::EngineConfig;
use crate::viewer::ViewerApp;

#[derive(Debug, Parser)]
#[command(author, version, about)]
struct Args {
    /// Graph snapshot JSON file with "nodes" and "links" arrays.
    snapshot: PathBuf,

    /// World-space layout width.
    #[arg(long)]
    width: Option<f32>,

    /// World-space layout height.
    #[arg(long)]
    height: Option<f32>,

    /// Settle window after a declutter pass, in milliseconds.
    #[arg(long)]
    settle_ms: Option<u64>,
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args = Args::parse();
    let raw = fs::read_to_string(&args.snapshot)
        .with_context(|| format!("failed to read snapshot {}", args.snapshot.display()))?;
    let graph = graph::parse_snapshot(&raw)?;
    log::info!(
        "loaded {} node(s), {} link(s), {} dropped",
        graph.node_count(),
        graph.links.len(),
        graph.dropped_links()
    );

    let mut config = EngineConfig::default();
    if let Some(width) = args.width {
        config.viewport.width = width;
    }
    if let Some(height) = args.height {
        config.viewport.height = height;
    }
    if let Some(settle_ms) = args.settle_ms {
        config.settle_ms = settle_ms;
    }

    let options = eframe::NativeOptions {
        viewport: eframe::egui::ViewportBuilder::default()
            .with_inner_size([config.viewport.width + 260.0, config.viewport.height]),
        ..Default::default()
    };

    eframe::run_native(
        "memograph",
        options,
        Box::new(move |cc| Ok(Box::new(ViewerApp::new(cc, graph, config)))),
    )
    .map_err(|error| anyhow!("viewer failed to start: {error}"))
}
