//! Demo binary: runs the overlay pipeline against synthetic camera and
//! detector sources and writes the capture artifact to disk.

use anyhow::Result;
use clap::Parser;
use log::info;
use selfie_overlay::config::Config;
use selfie_overlay::detector::{CameraSource, SyntheticCamera, SyntheticDetector};
use selfie_overlay::landmarks::LandmarkScheme;
use selfie_overlay::scheduler::{OverlayAssets, RenderScheduler};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Path to configuration file (YAML format)
    #[arg(short = 'C', long)]
    config: Option<String>,

    /// Output path for the captured JPEG
    #[arg(short, long, default_value = "capture.jpg")]
    output: PathBuf,

    /// Optional path to save the final preview frame (PNG)
    #[arg(short, long)]
    preview: Option<PathBuf>,

    /// Number of preview frames to simulate before capturing
    #[arg(short, long, default_value = "90")]
    frames: u32,

    /// Synthetic camera dimensions
    #[arg(long, default_value = "640")]
    cam_width: u32,
    #[arg(long, default_value = "480")]
    cam_height: u32,

    /// Enable debug output
    #[arg(short, long)]
    debug: bool,
}

fn main() -> Result<()> {
    let args = Args::parse();

    if args.debug {
        env_logger::init_from_env(env_logger::Env::new().default_filter_or("debug"));
    } else {
        env_logger::init_from_env(env_logger::Env::new().default_filter_or("info"));
    }

    info!("Selfie accessory overlay - demo run");

    let config = if let Some(path) = &args.config {
        info!("Loading configuration from: {path}");
        Config::from_file(path)?
    } else {
        Config::default()
    };
    config.validate()?;

    let assets = match OverlayAssets::load(&config.assets) {
        Ok(assets) => assets,
        Err(e) => {
            log::warn!("Failed to load configured assets ({e}), using placeholders");
            OverlayAssets::placeholder(config.output.width, config.output.height)
        }
    };

    let scheme = LandmarkScheme::from_name(&config.tracking.scheme)?;
    let mut camera = SyntheticCamera::new(args.cam_width, args.cam_height);
    let detector = SyntheticDetector::new(scheme);
    let mut scheduler = RenderScheduler::new(&config, Box::new(detector), assets)?;

    // Simulated preview loop at 30 fps: tracking runs at its own throttled
    // cadence inside the scheduler, rendering runs every frame.
    let mut last_preview = None;
    let mut detections = 0u32;
    for i in 0..args.frames {
        let timestamp = f64::from(i) / 30.0;
        let frame = camera.frame()?;
        if scheduler.tick_tracking(&frame, timestamp) {
            detections += 1;
        }
        last_preview = Some(scheduler.render_preview(&frame));
    }
    info!(
        "Simulated {} preview frames ({} tracking ticks)",
        args.frames, detections
    );

    if let (Some(path), Some(preview)) = (&args.preview, &last_preview) {
        preview.save(path)?;
        info!("Preview frame written to {}", path.display());
    }

    let frame = camera.frame()?;
    let jpeg = scheduler.capture(&frame)?;
    std::fs::write(&args.output, &jpeg)?;
    info!(
        "Capture written to {} ({} bytes)",
        args.output.display(),
        jpeg.len()
    );

    Ok(())
}
