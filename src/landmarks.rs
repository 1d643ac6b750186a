//! Landmark data model: 2-D points, ordered landmark sets, and the
//! role-to-index capability maps for the supported detector schemes.

use crate::constants::{DLIB68_LANDMARKS, MEDIAPIPE468_LANDMARKS};
use crate::{Error, Result};

/// A 2-D point, either normalized (0..1 relative to frame dimensions) or in
/// pixel space. Every function consuming a `Point2D` documents which
/// convention it expects.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Point2D {
    pub x: f64,
    pub y: f64,
}

impl Point2D {
    #[must_use]
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Convert a normalized point to pixel space.
    #[must_use]
    pub fn to_pixel(self, width: f64, height: f64) -> Self {
        Self {
            x: self.x * width,
            y: self.y * height,
        }
    }

    /// Euclidean distance to another point in the same space as `self`.
    #[must_use]
    pub fn distance(self, other: Self) -> f64 {
        (self.x - other.x).hypot(self.y - other.y)
    }
}

/// An ordered sequence of detector-reported points. Index positions are
/// semantically fixed by the active [`LandmarkScheme`] and must not be mixed
/// across schemes.
#[derive(Debug, Clone, Default)]
pub struct LandmarkSet {
    points: Vec<Point2D>,
    /// Pre-flip coordinates retained by [`mirrored`](Self::mirrored);
    /// `1 - x` rounds in binary floating point, so a second flip restores
    /// these instead of recomputing.
    pre_flip: Option<Vec<Point2D>>,
}

impl PartialEq for LandmarkSet {
    fn eq(&self, other: &Self) -> bool {
        self.points == other.points
    }
}

impl LandmarkSet {
    #[must_use]
    pub fn new(points: Vec<Point2D>) -> Self {
        Self {
            points,
            pre_flip: None,
        }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.points.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    #[must_use]
    pub fn get(&self, index: usize) -> Option<Point2D> {
        self.points.get(index).copied()
    }

    #[must_use]
    pub fn points(&self) -> &[Point2D] {
        &self.points
    }

    /// Horizontally mirror normalized coordinates (x -> 1 - x, y unchanged).
    ///
    /// Applying this twice returns the original set exactly. `1 - (1 - x)`
    /// is not `x` for every f64, so the flip keeps the pre-flip coordinates
    /// and a round trip restores them bit for bit. Used to reconcile the
    /// mirrored live-preview space with the non-mirrored capture space.
    #[must_use]
    pub fn mirrored(&self) -> Self {
        if let Some(points) = &self.pre_flip {
            return Self::new(points.clone());
        }
        Self {
            points: self
                .points
                .iter()
                .map(|p| Point2D::new(1.0 - p.x, p.y))
                .collect(),
            pre_flip: Some(self.points.clone()),
        }
    }

    /// Map every point through `f`, preserving order.
    #[must_use]
    pub fn map<F: Fn(Point2D) -> Point2D>(&self, f: F) -> Self {
        Self::new(self.points.iter().map(|&p| f(p)).collect())
    }
}

/// Anatomical roles the geometry engine needs resolved to concrete indices.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LandmarkRole {
    LeftJaw,
    RightJaw,
    NoseTip,
    LeftBrowOuter,
    LeftBrowInner,
    RightBrowInner,
    RightBrowOuter,
}

/// Named capability map from [`LandmarkRole`] to an index in the active
/// detector's landmark scheme. Schemes are injected as configuration so no
/// geometry code hard-codes detector-specific indices.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LandmarkScheme {
    name: &'static str,
    point_count: usize,
    left_jaw: usize,
    right_jaw: usize,
    nose_tip: usize,
    left_brow_outer: usize,
    left_brow_inner: usize,
    right_brow_inner: usize,
    right_brow_outer: usize,
}

impl LandmarkScheme {
    /// The 68-point dlib-style scheme.
    #[must_use]
    pub fn dlib68() -> Self {
        Self {
            name: "dlib68",
            point_count: DLIB68_LANDMARKS,
            left_jaw: 0,
            right_jaw: 16,
            nose_tip: 30,
            left_brow_outer: 17,
            left_brow_inner: 21,
            right_brow_inner: 22,
            right_brow_outer: 26,
        }
    }

    /// The 468-point MediaPipe face-mesh scheme.
    #[must_use]
    pub fn mediapipe468() -> Self {
        Self {
            name: "mediapipe468",
            point_count: MEDIAPIPE468_LANDMARKS,
            left_jaw: 234,
            right_jaw: 454,
            nose_tip: 1,
            left_brow_outer: 70,
            left_brow_inner: 107,
            right_brow_inner: 336,
            right_brow_outer: 300,
        }
    }

    /// Look up a scheme by its configured name.
    ///
    /// # Errors
    ///
    /// Returns an error for unknown scheme names.
    pub fn from_name(name: &str) -> Result<Self> {
        match name.to_lowercase().as_str() {
            "dlib68" | "68" => Ok(Self::dlib68()),
            "mediapipe468" | "468" => Ok(Self::mediapipe468()),
            _ => Err(Error::Config(format!("Unknown landmark scheme: {name}"))),
        }
    }

    #[must_use]
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Total number of points the detector reports for this scheme.
    #[must_use]
    pub fn point_count(&self) -> usize {
        self.point_count
    }

    #[must_use]
    pub fn index(&self, role: LandmarkRole) -> usize {
        match role {
            LandmarkRole::LeftJaw => self.left_jaw,
            LandmarkRole::RightJaw => self.right_jaw,
            LandmarkRole::NoseTip => self.nose_tip,
            LandmarkRole::LeftBrowOuter => self.left_brow_outer,
            LandmarkRole::LeftBrowInner => self.left_brow_inner,
            LandmarkRole::RightBrowInner => self.right_brow_inner,
            LandmarkRole::RightBrowOuter => self.right_brow_outer,
        }
    }

    /// Minimum set length required before any role lookup is meaningful.
    #[must_use]
    pub fn min_len(&self) -> usize {
        let indices = [
            self.left_jaw,
            self.right_jaw,
            self.nose_tip,
            self.left_brow_outer,
            self.left_brow_inner,
            self.right_brow_inner,
            self.right_brow_outer,
        ];
        indices.into_iter().max().unwrap_or(0) + 1
    }

    /// Resolve a role against a landmark set, `None` if the index is absent.
    #[must_use]
    pub fn point(&self, set: &LandmarkSet, role: LandmarkRole) -> Option<Point2D> {
        set.get(self.index(role))
    }
}
