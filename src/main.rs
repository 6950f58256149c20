use anyhow::Context;
use clap::Parser as ClapParser;
use layer_tree::compositor::{next_frame_number, test_scene, RasterOutput, Rasterizer};
use layer_tree::{DrawCommand, Paint, Rect, Settings};
use serde::Serialize;
use std::path::PathBuf;

#[derive(ClapParser, Debug)]
#[command(
    name = "layer-tree",
    version,
    about = "Preroll and paint a demo layer tree, printing the recorded canvas commands"
)]
struct Cli {
    /// TOML settings file. Defaults apply when omitted.
    #[arg(long, value_name = "FILE")]
    config: Option<PathBuf>,
    /// Draw a diagnostic fill over every offscreen group.
    #[arg(long)]
    checkerboard: bool,
    /// Print one JSON report per frame instead of the command list.
    #[arg(long)]
    json: bool,
    /// Number of frames to render.
    #[arg(long, default_value_t = 1)]
    frames: u32,
}

#[derive(Debug, Serialize)]
struct FrameReport {
    frame_number: u64,
    paint_bounds: [f64; 4],
    leaf_count: usize,
    save_layers: usize,
    checkerboards: usize,
    commands: Vec<String>,
}

impl FrameReport {
    fn new(output: &RasterOutput, paint_bounds: Rect, leaf_count: usize) -> Self {
        let checkerboard = Paint::checkerboard();
        Self {
            frame_number: output.frame_number,
            paint_bounds: [
                paint_bounds.x0,
                paint_bounds.y0,
                paint_bounds.x1,
                paint_bounds.y1,
            ],
            leaf_count,
            save_layers: output
                .commands
                .iter()
                .filter(|c| matches!(c, DrawCommand::SaveLayer { .. }))
                .count(),
            checkerboards: output
                .commands
                .iter()
                .filter(|c| matches!(c, DrawCommand::DrawRect(_, paint) if *paint == checkerboard))
                .count(),
            commands: output.commands.iter().map(|c| format!("{c:?}")).collect(),
        }
    }
}

/// Prerolls and paints `frames` copies of the demo scene, one at a time.
fn render_frames(
    settings: &Settings,
    frames: u32,
    rasterizer: &Rasterizer,
) -> anyhow::Result<Vec<FrameReport>> {
    let mut reports = Vec::with_capacity(frames as usize);
    for _ in 0..frames {
        let frame = test_scene(settings.clone()).preroll(next_frame_number());
        let bounds = frame.paint_bounds();
        let leaf_count = frame.leaf_bounds().len();

        rasterizer.submit(frame)?;
        let output = rasterizer.recv()?;
        if let Err(err) = &output.result {
            anyhow::bail!("frame {} failed to paint: {err}", output.frame_number);
        }
        reports.push(FrameReport::new(&output, bounds, leaf_count));
    }
    Ok(reports)
}

fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();
    let cli = Cli::parse();

    let mut settings = match &cli.config {
        Some(path) => Settings::load(path)?,
        None => Settings::default(),
    };
    if cli.checkerboard {
        settings.debug.checkerboard_offscreen_layers = true;
    }
    log::debug!("settings: {settings:?}");

    let rasterizer = Rasterizer::spawn().context("failed to start raster thread")?;
    let reports = render_frames(&settings, cli.frames, &rasterizer)?;
    rasterizer.shutdown();

    for report in &reports {
        if cli.json {
            println!("{}", serde_json::to_string(report)?);
        } else {
            println!("-- frame {} --", report.frame_number);
            for command in &report.commands {
                println!("{command}");
            }
        }
    }
    Ok(())
}
