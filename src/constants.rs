//! Constants used throughout the pipeline

/// Number of landmarks in the dlib-style 68-point scheme
pub const DLIB68_LANDMARKS: usize = 68;

/// Number of landmarks in the MediaPipe face-mesh scheme
pub const MEDIAPIPE468_LANDMARKS: usize = 468;

/// Interval assumed when a filter has no previous timestamp (1/60 s)
pub const NOMINAL_FRAME_INTERVAL: f64 = 1.0 / 60.0;

/// Floor applied to degenerate (zero or negative) time deltas, seconds
pub const MIN_TIME_DELTA: f64 = 1e-3;

/// Determinant magnitude below which an affine solve is treated as degenerate
pub const DETERMINANT_EPSILON: f64 = 1e-9;

/// Default One-Euro filter parameters
pub const DEFAULT_MIN_CUTOFF: f64 = 1.0;
pub const DEFAULT_BETA: f64 = 0.007;
pub const DEFAULT_D_CUTOFF: f64 = 1.0;

/// Default fixed output resolution (portrait capture)
pub const DEFAULT_OUTPUT_WIDTH: u32 = 1080;
pub const DEFAULT_OUTPUT_HEIGHT: u32 = 1920;

/// Default JPEG quality factor for the capture artifact
pub const DEFAULT_JPEG_QUALITY: u8 = 90;

/// Default watermark inset from the bottom-right corner, pixels
pub const DEFAULT_WATERMARK_INSET: u32 = 48;

/// Default landmark-detection cadence, Hz
pub const DEFAULT_TRACKING_HZ: f64 = 15.0;

/// Symmetric clamp applied to the head-yaw estimate, degrees
pub const DEFAULT_YAW_CLAMP_DEG: f64 = 60.0;

/// Empirical scale from normalized nose offset (relative to face width) to degrees
pub const DEFAULT_YAW_SCALE: f64 = 140.0;

/// Fraction of the yaw estimate folded into the cylindrical wrap
pub const DEFAULT_YAW_WRAP_FRACTION: f64 = 0.6;

/// Angular extent of the forehead cylinder covered by the accessory, degrees
pub const DEFAULT_WRAP_ANGLE_DEG: f64 = 150.0;

/// Accessory width as a multiple of the measured face width
pub const DEFAULT_WIDTH_MULTIPLIER: f64 = 1.55;

/// Accessory height/width aspect ratio
pub const DEFAULT_ACCESSORY_ASPECT: f64 = 0.42;

/// Vertical anchor offset above the brow line, as a fraction of accessory height
pub const DEFAULT_VERTICAL_OFFSET: f64 = 0.55;

/// Number of cylindrical samples across the accessory width
pub const DEFAULT_SEGMENT_COUNT: usize = 24;

/// Virtual camera distance for the perspective scale term
pub const DEFAULT_CAMERA_DISTANCE: f64 = 3.0;

/// Strength of the depth-dependent perspective scaling
pub const DEFAULT_PERSPECTIVE_STRENGTH: f64 = 1.2;

/// Brightness of a segment facing fully away plus the depth-dependent range
pub const DEFAULT_BASE_BRIGHTNESS: f64 = 0.62;
pub const DEFAULT_BRIGHTNESS_RANGE: f64 = 0.38;

/// Depth below which a sample is treated as the occluded back of the head
pub const DEFAULT_BACKFACE_THRESHOLD: f64 = 0.05;

/// Segment widths bridge the gap to the widest neighbor times this margin
pub const DEFAULT_SEAM_MARGIN: f64 = 1.6;

/// Consecutive missed frames after which cached placement is discarded
pub const DEFAULT_MAX_STALE_FRAMES: u32 = 8;
