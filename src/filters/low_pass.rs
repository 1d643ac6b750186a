//! First-order low-pass primitive.

/// One-pole low-pass filter with a per-sample smoothing factor.
///
/// The One-Euro filter recomputes its smoothing factor on every sample from
/// the elapsed time and the current cutoff, so the factor is an argument to
/// [`LowPassFilter::filter_with_alpha`] rather than a construction parameter.
#[derive(Debug, Clone, Default)]
pub struct LowPassFilter {
    last: Option<f64>,
}

impl LowPassFilter {
    #[must_use]
    pub fn new() -> Self {
        Self { last: None }
    }

    /// Apply one sample with the given smoothing factor in [0, 1].
    ///
    /// The first sample passes through unchanged; no filtering is possible
    /// with a single sample.
    pub fn filter_with_alpha(&mut self, value: f64, alpha: f64) -> f64 {
        let alpha = alpha.clamp(0.0, 1.0);
        let filtered = match self.last {
            Some(last) => alpha.mul_add(value - last, last),
            None => value,
        };
        self.last = Some(filtered);
        filtered
    }

    /// Previous filtered output, if any sample has been seen.
    #[must_use]
    pub fn last(&self) -> Option<f64> {
        self.last
    }

    pub fn reset(&mut self) {
        self.last = None;
    }
}
