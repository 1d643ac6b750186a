//! Error types for the overlay pipeline.

use thiserror::Error;

/// Main error type for the library
#[derive(Error, Debug)]
pub enum Error {
    /// File I/O operation failed
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Image decoding or encoding failed
    #[error("Image processing error: {0}")]
    Image(#[from] image::ImageError),

    /// Landmark detector failed on a frame
    #[error("Detector error: {0}")]
    Detector(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Capture-time composite or encoding failure
    #[error("Capture failed: {0}")]
    Capture(String),

    /// A capture was requested while another one is still in flight
    #[error("a capture is already in flight")]
    CaptureBusy,
}

/// Convenience type alias for Results with our Error type
pub type Result<T> = std::result::Result<T, Error>;
