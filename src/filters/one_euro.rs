//! Adaptive One-Euro scalar filter.

use super::low_pass::LowPassFilter;
use crate::constants::{MIN_TIME_DELTA, NOMINAL_FRAME_INTERVAL};
use std::f64::consts::PI;
use std::time::Instant;

/// Adaptive one-pole smoothing for a single scalar sampled at irregular
/// intervals.
///
/// Two cascaded low-pass stages: one on the raw derivative estimate at the
/// fixed `d_cutoff`, one on the value itself whose cutoff rises with the
/// filtered speed (`min_cutoff + beta * |speed|`). Near-stationary input is
/// smoothed hard; fast motion passes with little lag.
///
/// Parameter intuition: higher `min_cutoff` means less smoothing at rest,
/// higher `beta` means faster response to motion, higher `d_cutoff` means a
/// noisier speed estimate.
#[derive(Debug, Clone)]
pub struct OneEuroFilter {
    min_cutoff: f64,
    beta: f64,
    d_cutoff: f64,
    value_lp: LowPassFilter,
    deriv_lp: LowPassFilter,
    last_timestamp: Option<f64>,
    epoch: Instant,
}

/// Smoothing factor for a one-pole stage at the given cutoff and interval.
fn smoothing_alpha(cutoff: f64, dt: f64) -> f64 {
    let r = 2.0 * PI * cutoff * dt;
    r / (r + 1.0)
}

impl OneEuroFilter {
    /// Create a new filter.
    ///
    /// # Panics
    ///
    /// Panics if `min_cutoff` or `d_cutoff` is not positive, or if `beta` is
    /// negative.
    #[must_use]
    pub fn new(min_cutoff: f64, beta: f64, d_cutoff: f64) -> Self {
        assert!(min_cutoff > 0.0, "Minimum cutoff must be positive");
        assert!(beta >= 0.0, "Beta must be non-negative");
        assert!(d_cutoff > 0.0, "Derivative cutoff must be positive");
        Self {
            min_cutoff,
            beta,
            d_cutoff,
            value_lp: LowPassFilter::new(),
            deriv_lp: LowPassFilter::new(),
            last_timestamp: None,
            epoch: Instant::now(),
        }
    }

    /// Filter one sample using the wall clock for the timestamp.
    pub fn filter(&mut self, value: f64) -> f64 {
        let timestamp = self.epoch.elapsed().as_secs_f64();
        self.filter_at(value, timestamp)
    }

    /// Filter one sample at an explicit timestamp in seconds.
    ///
    /// The first call returns `value` unchanged and initializes state. When
    /// no previous timestamp exists the nominal frame interval (1/60 s) is
    /// assumed; degenerate deltas (<= 0) are floored to a small positive
    /// epsilon, so this never divides by zero and never panics.
    pub fn filter_at(&mut self, value: f64, timestamp_s: f64) -> f64 {
        let dt = match self.last_timestamp {
            Some(last) => (timestamp_s - last).max(MIN_TIME_DELTA),
            None => NOMINAL_FRAME_INTERVAL,
        };
        self.last_timestamp = Some(timestamp_s);

        let derivative = match self.value_lp.last() {
            Some(last) => (value - last) / dt,
            None => 0.0,
        };
        let speed = self
            .deriv_lp
            .filter_with_alpha(derivative, smoothing_alpha(self.d_cutoff, dt));

        let cutoff = self.beta.mul_add(speed.abs(), self.min_cutoff);
        self.value_lp
            .filter_with_alpha(value, smoothing_alpha(cutoff, dt))
    }

    /// Drop all state; the next `filter` call behaves as the first ever.
    pub fn reset(&mut self) {
        self.value_lp.reset();
        self.deriv_lp.reset();
        self.last_timestamp = None;
    }
}
