//! External collaborator interfaces: camera frames in, landmarks out.
//!
//! The landmark detector is a black box producing normalized 0..1 points in
//! a fixed scheme; the core never assumes a specific scheme beyond the
//! configured capability map. Synthetic implementations back the demo
//! binary and the integration tests with fully deterministic input.

use crate::landmarks::{LandmarkRole, LandmarkScheme, LandmarkSet, Point2D};
use crate::Result;
use image::{Rgba, RgbaImage};

/// A live video frame source.
pub trait CameraSource {
    /// Current frame dimensions in pixels.
    fn dimensions(&self) -> (u32, u32);

    /// Produce the current frame.
    ///
    /// # Errors
    ///
    /// Returns an error if the underlying device fails.
    fn frame(&mut self) -> Result<RgbaImage>;
}

/// An asynchronous-in-spirit landmark detector, driven one frame at a time.
pub trait LandmarkDetector {
    /// Detect landmarks in a frame.
    ///
    /// `Ok(None)` means no face was found. Coordinates are normalized 0..1
    /// in the same orientation as the frame handed in.
    ///
    /// # Errors
    ///
    /// Returns an error when detection itself fails; callers log and
    /// continue with the next frame.
    fn detect(&mut self, frame: &RgbaImage) -> Result<Option<LandmarkSet>>;
}

/// Deterministic camera producing a shaded gradient that drifts per frame.
pub struct SyntheticCamera {
    width: u32,
    height: u32,
    tick: u32,
}

impl SyntheticCamera {
    #[must_use]
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            tick: 0,
        }
    }
}

impl CameraSource for SyntheticCamera {
    fn dimensions(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    fn frame(&mut self) -> Result<RgbaImage> {
        let phase = self.tick % 255;
        self.tick = self.tick.wrapping_add(1);
        Ok(RgbaImage::from_fn(self.width, self.height, |x, y| {
            let r = ((x * 255) / self.width.max(1)) as u8;
            let g = ((y * 255) / self.height.max(1)) as u8;
            Rgba([r, g, phase as u8, 255])
        }))
    }
}

/// Deterministic detector producing a parametric face that sweeps its yaw
/// left and right over time.
pub struct SyntheticDetector {
    scheme: LandmarkScheme,
    tick: u32,
    /// Peak normalized nose offset relative to face width
    sweep: f64,
}

impl SyntheticDetector {
    #[must_use]
    pub fn new(scheme: LandmarkScheme) -> Self {
        Self {
            scheme,
            tick: 0,
            sweep: 0.25,
        }
    }

    /// Build the parametric face for an explicit phase in radians.
    #[must_use]
    pub fn face_at(&self, phase: f64) -> LandmarkSet {
        let center = Point2D::new(0.5, 0.45);
        let face_half_width = 0.16;
        let nose_dx = phase.sin() * self.sweep * face_half_width * 2.0;

        // Everything defaults to the face center; the roles the geometry
        // engine consumes get real positions.
        let mut points = vec![center; self.scheme.point_count()];
        let mut set = |role: LandmarkRole, p: Point2D| {
            points[self.scheme.index(role)] = p;
        };
        set(
            LandmarkRole::LeftJaw,
            Point2D::new(center.x - face_half_width, center.y + 0.02),
        );
        set(
            LandmarkRole::RightJaw,
            Point2D::new(center.x + face_half_width, center.y + 0.02),
        );
        set(
            LandmarkRole::NoseTip,
            Point2D::new(center.x + nose_dx, center.y + 0.05),
        );
        set(
            LandmarkRole::LeftBrowOuter,
            Point2D::new(center.x - 0.11, center.y - 0.10),
        );
        set(
            LandmarkRole::LeftBrowInner,
            Point2D::new(center.x - 0.04, center.y - 0.11),
        );
        set(
            LandmarkRole::RightBrowInner,
            Point2D::new(center.x + 0.04, center.y - 0.11),
        );
        set(
            LandmarkRole::RightBrowOuter,
            Point2D::new(center.x + 0.11, center.y - 0.10),
        );
        LandmarkSet::new(points)
    }
}

impl LandmarkDetector for SyntheticDetector {
    fn detect(&mut self, _frame: &RgbaImage) -> Result<Option<LandmarkSet>> {
        let phase = f64::from(self.tick) * 0.12;
        self.tick = self.tick.wrapping_add(1);
        Ok(Some(self.face_at(phase)))
    }
}
