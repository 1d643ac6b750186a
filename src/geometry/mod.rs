//! Landmark-to-placement geometry.
//!
//! Converts a landmark set into a head-yaw estimate and an ordered list of
//! warp segments that paint a flat accessory image so it reads as wrapping
//! around the forehead. The forehead is modeled as a cylinder viewed from
//! the front; samples across the accessory width map to angles on that
//! cylinder, yielding lateral offset, perspective scale, and shading per
//! segment.

pub mod affine;

use crate::config::GeometryConfig;
use crate::landmarks::{LandmarkRole, LandmarkScheme, LandmarkSet, Point2D};
use affine::{solve_affine, AffineTransform};
use std::cmp::Ordering;

/// One destination strip plus its source slice in the accessory image.
///
/// Destination values are relative to the overlay anchor; `offset` runs
/// along the tilted brow axis. Source slice coordinates are normalized to
/// the accessory image width.
#[derive(Debug, Clone, PartialEq)]
pub struct WarpSegment {
    /// Lateral offset from the overlay anchor along the brow axis, pixels
    pub offset: f64,
    /// Strip rotation (head roll), radians
    pub rotation: f64,
    /// Perspective scale in (0, 1]; 1.0 is on-axis
    pub scale: f64,
    /// Destination strip width, pixels
    pub dest_width: f64,
    /// Destination strip height, pixels (perspective-scaled)
    pub dest_height: f64,
    /// Alpha/brightness multiplier in [0, 1]
    pub brightness: f64,
    /// Depth on the unit cylinder; larger is nearer the camera
    pub z: f64,
    /// Source slice left edge, normalized [0, 1]
    pub src_x: f64,
    /// Source slice width, normalized
    pub src_width: f64,
}

/// Pixel-space placement of the whole overlay plus its ordered segments.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct OverlayGeometry {
    /// Forehead anchor in the target drawing space, pixels
    pub anchor: Point2D,
    /// Head roll (brow-line tilt), radians
    pub rotation: f64,
    /// Unscaled accessory height, pixels
    pub height: f64,
    /// Segments sorted ascending by depth (back-to-front paint order)
    pub segments: Vec<WarpSegment>,
}

impl OverlayGeometry {
    #[must_use]
    pub fn empty() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }
}

/// Derives head orientation and accessory placement from landmark sets.
///
/// Owns a one-slot cache of the last non-empty placement so momentary
/// detection loss does not flicker the overlay; the cache is discarded after
/// `max_stale_frames` consecutive misses.
#[derive(Debug)]
pub struct GeometryEngine {
    config: GeometryConfig,
    scheme: LandmarkScheme,
    last_good: Option<OverlayGeometry>,
    missed_frames: u32,
}

impl GeometryEngine {
    #[must_use]
    pub fn new(config: GeometryConfig, scheme: LandmarkScheme) -> Self {
        Self {
            config,
            scheme,
            last_good: None,
            missed_frames: 0,
        }
    }

    #[must_use]
    pub fn scheme(&self) -> &LandmarkScheme {
        &self.scheme
    }

    /// Estimate head yaw in degrees from a landmark set (any uniform
    /// coordinate space; the estimate is scale-invariant).
    ///
    /// The raw signal is the nose-tip offset from the jaw midpoint, relative
    /// to the jaw width, scaled by the empirical `yaw_scale`. With a
    /// mirrored tracking source (selfie preview) the sign is negated so the
    /// reported estimate stays in unmirrored head convention; the warp
    /// itself always follows the nose in the coordinate space it draws in.
    /// The result is clamped to a symmetric range so the wrap stays visually
    /// plausible at extreme angles. Missing landmarks yield 0.
    #[must_use]
    pub fn estimate_yaw(&self, set: &LandmarkSet, mirrored: bool) -> f64 {
        let yaw = self.screen_yaw(set);
        if mirrored {
            -yaw
        } else {
            yaw
        }
    }

    /// Yaw in the set's own (screen) coordinate space: positive when the
    /// nose points toward +x.
    fn screen_yaw(&self, set: &LandmarkSet) -> f64 {
        let (Some(left), Some(right), Some(nose)) = (
            self.scheme.point(set, LandmarkRole::LeftJaw),
            self.scheme.point(set, LandmarkRole::RightJaw),
            self.scheme.point(set, LandmarkRole::NoseTip),
        ) else {
            return 0.0;
        };

        let jaw_width = (right.x - left.x).abs();
        if jaw_width <= f64::EPSILON {
            return 0.0;
        }

        let center_x = (left.x + right.x) / 2.0;
        let yaw = (nose.x - center_x) / jaw_width * self.config.yaw_scale;
        yaw.clamp(-self.config.yaw_clamp_deg, self.config.yaw_clamp_deg)
    }

    /// Compute the overlay placement for a pixel-space landmark set, with
    /// last-known-good fallback.
    ///
    /// Missing or insufficient landmarks never panic: the cached placement
    /// is served for at most `max_stale_frames` consecutive misses, after
    /// which an empty geometry is returned and the cache dropped.
    pub fn place(&mut self, set: &LandmarkSet) -> OverlayGeometry {
        match self.compute(set) {
            Some(geometry) if !geometry.is_empty() => {
                self.missed_frames = 0;
                self.last_good = Some(geometry.clone());
                geometry
            }
            _ => {
                self.missed_frames = self.missed_frames.saturating_add(1);
                if self.missed_frames <= self.config.max_stale_frames {
                    if let Some(last) = &self.last_good {
                        return last.clone();
                    }
                } else if self.last_good.take().is_some() {
                    log::debug!(
                        "Dropping stale overlay placement after {} missed frames",
                        self.missed_frames
                    );
                }
                OverlayGeometry::empty()
            }
        }
    }

    /// One-shot placement without touching the last-known-good cache.
    ///
    /// The capture path re-runs geometry against un-mirrored landmarks; it
    /// must not pollute the preview cache nor reuse preview continuity.
    #[must_use]
    pub fn place_once(&self, set: &LandmarkSet) -> OverlayGeometry {
        self.compute(set).unwrap_or_default()
    }

    /// Single-quad placement: the affine transform mapping the accessory
    /// unit square's corner triangle onto the placed, rotated rectangle.
    /// Used when the full multi-segment curve is not needed. Degenerate
    /// placements fall back to the identity transform.
    #[must_use]
    pub fn place_quad(&self, set: &LandmarkSet) -> Option<AffineTransform> {
        let placement = self.placement(set)?;
        let (sin, cos) = placement.rotation.sin_cos();
        let (hw, hh) = (placement.width / 2.0, placement.height / 2.0);

        let corner = |dx: f64, dy: f64| {
            Point2D::new(
                placement.anchor.x + dx * cos - dy * sin,
                placement.anchor.y + dx * sin + dy * cos,
            )
        };

        let src = [
            Point2D::new(0.0, 0.0),
            Point2D::new(1.0, 0.0),
            Point2D::new(0.0, 1.0),
        ];
        let dst = [corner(-hw, -hh), corner(hw, -hh), corner(-hw, hh)];
        Some(solve_affine(&src, &dst))
    }

    /// Clear the last-known-good cache (tracking stopped or restarted).
    pub fn reset(&mut self) {
        self.last_good = None;
        self.missed_frames = 0;
    }

    /// Brow-derived anchor, tilt, and sizing. `None` when required
    /// landmarks are absent or degenerate.
    fn placement(&self, set: &LandmarkSet) -> Option<Placement> {
        if set.len() < self.scheme.min_len() {
            return None;
        }
        let left = self.scheme.point(set, LandmarkRole::LeftBrowOuter)?;
        let right = self.scheme.point(set, LandmarkRole::RightBrowOuter)?;

        let face_width = left.distance(right);
        if face_width <= f64::EPSILON {
            return None;
        }

        let mut rotation = (right.y - left.y).atan2(right.x - left.x);
        // Mirrored sets carry swapped brow endpoints; fold the axis back
        // upright so the accessory never renders upside down.
        if rotation.cos() < 0.0 {
            rotation -= std::f64::consts::PI.copysign(rotation);
        }
        let width = face_width * self.config.width_multiplier;
        let height = width * self.config.accessory_aspect;

        // Anchored above the brow line so the accessory sits on the
        // forehead, not over the eyes.
        let anchor = Point2D::new(
            (left.x + right.x) / 2.0,
            (left.y + right.y) / 2.0 - height * self.config.vertical_offset,
        );

        Some(Placement {
            anchor,
            rotation,
            width,
            height,
        })
    }

    fn compute(&self, set: &LandmarkSet) -> Option<OverlayGeometry> {
        let placement = self.placement(set)?;
        // Screen-space sign: the wrap slides toward wherever the nose
        // points in the space the segments are drawn in.
        let yaw_rad = self.screen_yaw(set).to_radians() * self.config.yaw_wrap_fraction;

        let n = self.config.segment_count.max(3);
        let wrap = self.config.wrap_angle_deg.to_radians();
        let half_width = placement.width / 2.0;

        // Sample the cylinder across the accessory width. Offsets are kept
        // for all samples so culled neighbors still define true spacing.
        let mut samples = Vec::with_capacity(n);
        #[allow(clippy::cast_precision_loss)]
        for i in 0..n {
            let u = i as f64 / (n - 1) as f64;
            let angle = (u - 0.5) * wrap + yaw_rad;
            samples.push((u, angle.sin() * half_width, angle.cos()));
        }

        let mut segments = Vec::with_capacity(n);
        for (i, &(u, offset, z)) in samples.iter().enumerate() {
            if z < self.config.backface_threshold {
                continue;
            }

            let gap_prev = if i > 0 {
                (offset - samples[i - 1].1).abs()
            } else {
                0.0
            };
            let gap_next = if i + 1 < n {
                (samples[i + 1].1 - offset).abs()
            } else {
                0.0
            };
            // Wide enough to bridge the gap to each neighbor with margin,
            // so overlapping slices never show seams near the silhouette.
            let dest_width = gap_prev.max(gap_next) * self.config.seam_margin;
            if dest_width <= 0.0 {
                continue;
            }

            let scale = self.config.camera_distance
                / (self.config.camera_distance + (1.0 - z) * self.config.perspective_strength);
            let brightness = (self.config.base_brightness + z * self.config.brightness_range)
                .clamp(0.0, 1.0);

            let src_width = (dest_width / placement.width).min(1.0);
            let src_x = (u - src_width / 2.0).clamp(0.0, 1.0 - src_width);

            segments.push(WarpSegment {
                offset,
                rotation: placement.rotation,
                scale,
                dest_width,
                dest_height: placement.height * scale,
                brightness,
                z,
                src_x,
                src_width,
            });
        }

        // Back-to-front so overlapping slices composite correctly.
        segments.sort_by(|a, b| a.z.partial_cmp(&b.z).unwrap_or(Ordering::Equal));

        Some(OverlayGeometry {
            anchor: placement.anchor,
            rotation: placement.rotation,
            height: placement.height,
            segments,
        })
    }
}

struct Placement {
    anchor: Point2D,
    rotation: f64,
    width: f64,
    height: f64,
}
