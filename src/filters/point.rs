//! 2-D point filtering and whole-set landmark smoothing.

use super::one_euro::OneEuroFilter;
use crate::config::FilterConfig;
use crate::landmarks::{LandmarkSet, Point2D};

/// Two independent One-Euro instances (x, y) composed into a point filter.
/// No joint correlation between the axes is modeled.
#[derive(Debug, Clone)]
pub struct PointFilter {
    x: OneEuroFilter,
    y: OneEuroFilter,
}

impl PointFilter {
    #[must_use]
    pub fn new(config: &FilterConfig) -> Self {
        Self {
            x: OneEuroFilter::new(config.min_cutoff, config.beta, config.d_cutoff),
            y: OneEuroFilter::new(config.min_cutoff, config.beta, config.d_cutoff),
        }
    }

    /// Filter one point sample at an explicit timestamp in seconds.
    pub fn filter_at(&mut self, point: Point2D, timestamp_s: f64) -> Point2D {
        Point2D::new(
            self.x.filter_at(point.x, timestamp_s),
            self.y.filter_at(point.y, timestamp_s),
        )
    }

    pub fn reset(&mut self) {
        self.x.reset();
        self.y.reset();
    }
}

/// Applies one [`PointFilter`] per tracked index to a landmark set.
///
/// Filter state is owned by the tracking session: it is created on the first
/// smoothed set and must be [`reset`](LandmarkSmoother::reset) when tracking
/// restarts (face lost then reacquired, or detector reinitialized).
#[derive(Debug)]
pub struct LandmarkSmoother {
    config: FilterConfig,
    filters: Vec<PointFilter>,
}

impl LandmarkSmoother {
    #[must_use]
    pub fn new(config: FilterConfig) -> Self {
        Self {
            config,
            filters: Vec::new(),
        }
    }

    /// Smooth a landmark set (any coordinate space; the filters are
    /// space-agnostic). The per-index filter bank is sized lazily from the
    /// first set; a length change means the detector scheme changed, which
    /// drops all filter state.
    pub fn smooth(&mut self, set: &LandmarkSet, timestamp_s: f64) -> LandmarkSet {
        if self.filters.len() != set.len() {
            if !self.filters.is_empty() {
                log::warn!(
                    "Landmark count changed from {} to {}, resetting filter bank",
                    self.filters.len(),
                    set.len()
                );
            }
            self.filters = vec![PointFilter::new(&self.config); set.len()];
        }

        let points = set
            .points()
            .iter()
            .zip(self.filters.iter_mut())
            .map(|(&p, f)| f.filter_at(p, timestamp_s))
            .collect();
        LandmarkSet::new(points)
    }

    /// Drop all per-point filter state.
    pub fn reset(&mut self) {
        for filter in &mut self.filters {
            filter.reset();
        }
    }
}
