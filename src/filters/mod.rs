//! Temporal filtering for noisy landmark streams.
//!
//! The smoothing primitive is an adaptive One-Euro filter: a one-pole
//! low-pass whose cutoff is modulated by the filtered speed of the signal,
//! so slow motion is smoothed aggressively while fast motion tracks with
//! low lag.

/// Fixed-coefficient one-pole primitive used inside the adaptive filter
pub mod low_pass;

/// Adaptive One-Euro scalar filter
pub mod one_euro;

/// 2-D point filter pair and the whole-set landmark smoother
pub mod point;

pub use low_pass::LowPassFilter;
pub use one_euro::OneEuroFilter;
pub use point::{LandmarkSmoother, PointFilter};
