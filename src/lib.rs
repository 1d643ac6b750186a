//! Selfie accessory overlay pipeline.
//!
//! This library overlays virtual accessory artwork onto a live selfie feed:
//! 1. A detector (external, black-box) reports normalized 2-D facial landmarks
//! 2. An adaptive One-Euro filter bank smooths detector jitter per point
//! 3. The geometry engine derives head yaw and a cylindrical multi-segment
//!    warp that wraps the flat accessory around the forehead
//! 4. The overlay renderer paints the warp segments back to front
//! 5. The compositor layers background, camera frame, overlay, and watermark
//!    into a fixed-resolution output, reconciling the mirrored preview space
//!    with the non-mirrored capture space
//!
//! # Examples
//!
//! ```
//! use selfie_overlay::config::Config;
//! use selfie_overlay::detector::{CameraSource, SyntheticCamera, SyntheticDetector};
//! use selfie_overlay::landmarks::LandmarkScheme;
//! use selfie_overlay::scheduler::{OverlayAssets, RenderScheduler};
//!
//! # fn main() -> selfie_overlay::Result<()> {
//! let mut config = Config::default();
//! config.output.width = 270;
//! config.output.height = 480;
//!
//! let mut camera = SyntheticCamera::new(320, 240);
//! let detector = SyntheticDetector::new(LandmarkScheme::dlib68());
//! let assets = OverlayAssets::placeholder(config.output.width, config.output.height);
//! let mut scheduler = RenderScheduler::new(&config, Box::new(detector), assets)?;
//!
//! // Preview loop: tracking throttled, rendering every frame
//! for i in 0..10 {
//!     let timestamp = f64::from(i) / 30.0;
//!     let frame = camera.frame()?;
//!     scheduler.tick_tracking(&frame, timestamp);
//!     let _preview = scheduler.render_preview(&frame);
//! }
//!
//! // One-shot capture: unmirrored, encoded JPEG
//! let frame = camera.frame()?;
//! let jpeg = scheduler.capture(&frame)?;
//! assert!(!jpeg.is_empty());
//! # Ok(())
//! # }
//! ```

/// Landmark data model and detector-scheme capability maps
pub mod landmarks;

/// Temporal filtering for noisy landmark streams
pub mod filters;

/// Head orientation and accessory placement geometry
pub mod geometry;

/// Warp-segment painting
pub mod overlay;

/// Layered frame compositing and output encoding
pub mod compositor;

/// Loop orchestration and the capture path
pub mod scheduler;

/// External camera and detector interfaces
pub mod detector;

/// Error types and result handling
pub mod error;

/// Configuration management
pub mod config;

/// Constants used throughout the pipeline
pub mod constants;

/// Small numeric helpers
pub mod utils;

pub use error::{Error, Result};
