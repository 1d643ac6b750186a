//! Loop orchestration: throttled tracking, preview rendering, and the
//! one-shot capture path.
//!
//! Execution is single-threaded and cooperative. The tracking tick and the
//! preview renderer are decoupled through a single "last known landmarks"
//! slot — newest wins, no queue, no backpressure. The capture path is a
//! one-shot operation guarded against reentrancy.

use crate::compositor::{CompositeFrame, FrameCompositor};
use crate::config::{AssetConfig, Config};
use crate::detector::LandmarkDetector;
use crate::filters::LandmarkSmoother;
use crate::geometry::GeometryEngine;
use crate::landmarks::{LandmarkScheme, LandmarkSet};
use crate::{Error, Result};
use image::{Rgba, RgbaImage};
use log::{debug, info, warn};

/// The artwork layers the compositor needs; loaded up front so the capture
/// path never composites with half-decoded images.
pub struct OverlayAssets {
    pub background: RgbaImage,
    pub accessory: RgbaImage,
    pub watermark: RgbaImage,
}

impl OverlayAssets {
    /// Load all three assets from the configured paths.
    ///
    /// # Errors
    ///
    /// Returns an error if any image cannot be read or decoded.
    pub fn load(config: &AssetConfig) -> Result<Self> {
        Ok(Self {
            background: image::open(&config.background)?.to_rgba8(),
            accessory: image::open(&config.accessory)?.to_rgba8(),
            watermark: image::open(&config.watermark)?.to_rgba8(),
        })
    }

    /// Procedural stand-in artwork for demos and tests: a vertical-gradient
    /// background, a banded accessory strip, and a small solid watermark.
    #[must_use]
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    pub fn placeholder(width: u32, height: u32) -> Self {
        let background = RgbaImage::from_fn(width.max(1), height.max(1), |_, y| {
            let t = f64::from(y) / f64::from(height.max(1));
            Rgba([30, (40.0 + t * 120.0) as u8, (90.0 + t * 100.0) as u8, 255])
        });
        let accessory = RgbaImage::from_fn(256, 96, |x, _| {
            if (x / 16) % 2 == 0 {
                Rgba([220, 180, 40, 255])
            } else {
                Rgba([180, 40, 60, 255])
            }
        });
        let watermark = RgbaImage::from_pixel(48, 16, Rgba([255, 255, 255, 200]));
        Self {
            background,
            accessory,
            watermark,
        }
    }
}

/// Drives the tracking loop at a bounded cadence, renders mirrored preview
/// frames, and performs guarded one-shot captures.
pub struct RenderScheduler {
    detector: Box<dyn LandmarkDetector>,
    smoother: LandmarkSmoother,
    geometry: GeometryEngine,
    compositor: FrameCompositor,
    assets: OverlayAssets,
    /// Last known landmarks in frame-space (unmirrored) normalized
    /// coordinates, exactly as the detector reported them. Written only by
    /// the tracking tick; the preview path mirrors on read.
    latest: Option<LandmarkSet>,
    tracking_interval: f64,
    last_track: Option<f64>,
    /// Consecutive "no face" ticks; the slot outlives a momentary dropout
    /// and is cleared once this exceeds the staleness budget.
    missed_ticks: u32,
    max_missed_ticks: u32,
    face_was_lost: bool,
    capture_in_flight: bool,
}

impl RenderScheduler {
    /// Build a scheduler from configuration, a detector, and loaded assets.
    ///
    /// # Errors
    ///
    /// Returns an error for an unknown landmark scheme name.
    pub fn new(
        config: &Config,
        detector: Box<dyn LandmarkDetector>,
        assets: OverlayAssets,
    ) -> Result<Self> {
        let scheme = LandmarkScheme::from_name(&config.tracking.scheme)?;
        info!(
            "Scheduler ready: {} scheme, {:.1} Hz tracking, {}x{} output",
            scheme.name(),
            config.tracking.tracking_hz,
            config.output.width,
            config.output.height
        );
        Ok(Self {
            detector,
            smoother: LandmarkSmoother::new(config.filter.clone()),
            geometry: GeometryEngine::new(config.geometry.clone(), scheme),
            compositor: FrameCompositor::new(config.output.clone()),
            assets,
            latest: None,
            tracking_interval: 1.0 / config.tracking.tracking_hz,
            last_track: None,
            missed_ticks: 0,
            max_missed_ticks: config.geometry.max_stale_frames,
            face_was_lost: false,
            capture_in_flight: false,
        })
    }

    /// Run one tracking tick against the mirrored preview frame.
    ///
    /// Returns `true` when a detection pass actually ran; ticks arriving
    /// faster than the configured cadence are skipped. Detector failures
    /// are logged and swallowed so the loop keeps going.
    pub fn tick_tracking(&mut self, frame: &RgbaImage, timestamp_s: f64) -> bool {
        if let Some(last) = self.last_track {
            if timestamp_s - last < self.tracking_interval {
                return false;
            }
        }
        self.last_track = Some(timestamp_s);

        match self.detector.detect(frame) {
            Ok(Some(set)) => {
                if self.face_was_lost {
                    // Tracking restart: stale filter state would drag the
                    // reacquired face toward its last position.
                    debug!("Face reacquired, resetting filter state");
                    self.smoother.reset();
                    self.face_was_lost = false;
                }
                self.missed_ticks = 0;
                let smoothed = self.smoother.smooth(&set, timestamp_s);
                self.latest = Some(smoothed);
            }
            Ok(None) => {
                // A momentary dropout keeps the slot; only a sustained one
                // clears it, matching the geometry staleness policy.
                self.face_was_lost = true;
                self.missed_ticks = self.missed_ticks.saturating_add(1);
                if self.missed_ticks > self.max_missed_ticks && self.latest.take().is_some() {
                    debug!(
                        "Face lost for {} ticks, dropping last landmarks",
                        self.missed_ticks
                    );
                }
            }
            Err(e) => {
                warn!("Detector failed on this frame, retrying next tick: {e}");
            }
        }
        true
    }

    /// Last landmarks produced by the tracking loop, frame space.
    #[must_use]
    pub fn latest_landmarks(&self) -> Option<&LandmarkSet> {
        self.latest.as_ref()
    }

    /// Render one mirrored preview frame from the latest (possibly stale)
    /// landmarks.
    pub fn render_preview(&mut self, frame: &RgbaImage) -> CompositeFrame {
        let fit = self.compositor.camera_fit(frame);
        // Geometry runs in the same mirrored space the preview draws in
        let set = self.latest.as_ref().map(LandmarkSet::mirrored).unwrap_or_default();
        let pixel_set = fit.map_set(&set, frame.width(), frame.height());
        let geometry = self.geometry.place(&pixel_set);

        self.compositor.composite(
            &self.assets.background,
            frame,
            Some((&self.assets.accessory, &geometry)),
            &self.assets.watermark,
            true,
        )
    }

    /// One-shot capture: composite the unmirrored frame at full output
    /// resolution and encode it.
    ///
    /// Geometry is re-run against the frame-space landmarks; the
    /// preview-time overlay computation is never reused here.
    ///
    /// # Errors
    ///
    /// Returns [`Error::CaptureBusy`] while another capture is in flight,
    /// or an encoding error if producing the output artifact fails.
    pub fn capture(&mut self, frame: &RgbaImage) -> Result<Vec<u8>> {
        if self.capture_in_flight {
            return Err(Error::CaptureBusy);
        }
        self.capture_in_flight = true;
        let result = self.capture_inner(frame);
        self.capture_in_flight = false;
        result
    }

    fn capture_inner(&mut self, frame: &RgbaImage) -> Result<Vec<u8>> {
        let fit = self.compositor.camera_fit(frame);
        let geometry = match &self.latest {
            Some(set) => {
                let pixel_set = fit.map_set(set, frame.width(), frame.height());
                self.geometry.place_once(&pixel_set)
            }
            None => {
                debug!("Capturing without landmarks, overlay skipped");
                crate::geometry::OverlayGeometry::empty()
            }
        };

        let composite = self.compositor.composite(
            &self.assets.background,
            frame,
            Some((&self.assets.accessory, &geometry)),
            &self.assets.watermark,
            false,
        );
        self.compositor
            .encode(&composite)
            .map_err(|e| Error::Capture(e.to_string()))
    }

    /// Stop tracking: clear the landmark slot, filter state, and the
    /// geometry cache so a later restart behaves like a fresh session.
    pub fn stop_tracking(&mut self) {
        self.latest = None;
        self.last_track = None;
        self.missed_ticks = 0;
        self.face_was_lost = false;
        self.smoother.reset();
        self.geometry.reset();
        info!("Tracking stopped, state cleared");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::detector::SyntheticDetector;
    use crate::landmarks::LandmarkScheme;

    struct FailingDetector;

    impl LandmarkDetector for FailingDetector {
        fn detect(&mut self, _frame: &RgbaImage) -> Result<Option<LandmarkSet>> {
            Err(Error::Detector("model not loaded".to_string()))
        }
    }

    struct NoFaceDetector;

    impl LandmarkDetector for NoFaceDetector {
        fn detect(&mut self, _frame: &RgbaImage) -> Result<Option<LandmarkSet>> {
            Ok(None)
        }
    }

    fn small_config() -> Config {
        let mut config = Config::default();
        config.output.width = 48;
        config.output.height = 64;
        config.output.watermark_inset = 2;
        config
    }

    fn scheduler_with(detector: Box<dyn LandmarkDetector>) -> RenderScheduler {
        RenderScheduler::new(
            &small_config(),
            detector,
            OverlayAssets::placeholder(48, 64),
        )
        .unwrap()
    }

    #[test]
    fn test_tracking_is_throttled() {
        let mut scheduler =
            scheduler_with(Box::new(SyntheticDetector::new(LandmarkScheme::dlib68())));
        let frame = RgbaImage::new(24, 32);
        assert!(scheduler.tick_tracking(&frame, 0.0));
        // 15 Hz cadence: 10 ms later is too soon
        assert!(!scheduler.tick_tracking(&frame, 0.010));
        assert!(scheduler.tick_tracking(&frame, 0.080));
    }

    #[test]
    fn test_detector_failure_keeps_loop_alive() {
        let mut scheduler = scheduler_with(Box::new(FailingDetector));
        let frame = RgbaImage::new(24, 32);
        assert!(scheduler.tick_tracking(&frame, 0.0));
        assert!(scheduler.latest_landmarks().is_none());
        // Preview still renders (without overlay)
        let preview = scheduler.render_preview(&frame);
        assert_eq!((preview.width(), preview.height()), (48, 64));
    }

    #[test]
    fn test_slot_preserves_detector_coordinates() {
        // The slot holds frame-space landmarks exactly as detected; the
        // first smoothed sample passes through untouched.
        let mut scheduler =
            scheduler_with(Box::new(SyntheticDetector::new(LandmarkScheme::dlib68())));
        let frame = RgbaImage::new(24, 32);
        scheduler.tick_tracking(&frame, 0.0);

        let expected = SyntheticDetector::new(LandmarkScheme::dlib68()).face_at(0.0);
        let stored = scheduler.latest_landmarks().unwrap();
        for (a, b) in stored.points().iter().zip(expected.points()) {
            assert!(a.x.to_bits() == b.x.to_bits() && a.y.to_bits() == b.y.to_bits());
        }
    }

    #[test]
    fn test_no_face_clears_slot_only_after_staleness_budget() {
        let mut scheduler =
            scheduler_with(Box::new(SyntheticDetector::new(LandmarkScheme::dlib68())));
        let frame = RgbaImage::new(24, 32);
        scheduler.tick_tracking(&frame, 0.0);
        assert!(scheduler.latest_landmarks().is_some());

        // Dropout: the slot outlives max_stale_frames (default 8) misses,
        // so a capture taken during the window still carries the face
        scheduler.detector = Box::new(NoFaceDetector);
        for i in 0..8 {
            scheduler.tick_tracking(&frame, 1.0 + f64::from(i));
            assert!(scheduler.latest_landmarks().is_some(), "miss {i}");
        }
        scheduler.tick_tracking(&frame, 10.0);
        assert!(scheduler.latest_landmarks().is_none());
    }

    #[test]
    fn test_capture_produces_jpeg() {
        let mut scheduler =
            scheduler_with(Box::new(SyntheticDetector::new(LandmarkScheme::dlib68())));
        let frame = RgbaImage::from_pixel(24, 32, Rgba([128, 128, 128, 255]));
        scheduler.tick_tracking(&frame, 0.0);

        let bytes = scheduler.capture(&frame).unwrap();
        assert!(bytes.len() > 2);
        assert_eq!(&bytes[..2], &[0xFF, 0xD8], "JPEG SOI marker");
        // The guard is released after a successful capture
        assert!(scheduler.capture(&frame).is_ok());
    }

    #[test]
    fn test_capture_reentrancy_guard() {
        let mut scheduler =
            scheduler_with(Box::new(SyntheticDetector::new(LandmarkScheme::dlib68())));
        let frame = RgbaImage::new(24, 32);
        scheduler.capture_in_flight = true;
        assert!(matches!(
            scheduler.capture(&frame),
            Err(Error::CaptureBusy)
        ));
        scheduler.capture_in_flight = false;
        assert!(scheduler.capture(&frame).is_ok());
    }

    #[test]
    fn test_stop_tracking_clears_state() {
        let mut scheduler =
            scheduler_with(Box::new(SyntheticDetector::new(LandmarkScheme::dlib68())));
        let frame = RgbaImage::new(24, 32);
        scheduler.tick_tracking(&frame, 0.0);
        assert!(scheduler.latest_landmarks().is_some());

        scheduler.stop_tracking();
        assert!(scheduler.latest_landmarks().is_none());
        // Throttle state is cleared too: the next tick runs immediately
        assert!(scheduler.tick_tracking(&frame, 0.001));
    }
}
