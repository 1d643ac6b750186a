//! Configuration management for the overlay pipeline

use crate::constants::{
    DEFAULT_ACCESSORY_ASPECT, DEFAULT_BACKFACE_THRESHOLD, DEFAULT_BASE_BRIGHTNESS, DEFAULT_BETA,
    DEFAULT_BRIGHTNESS_RANGE, DEFAULT_CAMERA_DISTANCE, DEFAULT_D_CUTOFF, DEFAULT_JPEG_QUALITY,
    DEFAULT_MAX_STALE_FRAMES, DEFAULT_MIN_CUTOFF, DEFAULT_OUTPUT_HEIGHT, DEFAULT_OUTPUT_WIDTH,
    DEFAULT_PERSPECTIVE_STRENGTH, DEFAULT_SEAM_MARGIN, DEFAULT_SEGMENT_COUNT,
    DEFAULT_TRACKING_HZ, DEFAULT_VERTICAL_OFFSET, DEFAULT_WATERMARK_INSET,
    DEFAULT_WIDTH_MULTIPLIER, DEFAULT_WRAP_ANGLE_DEG, DEFAULT_YAW_CLAMP_DEG, DEFAULT_YAW_SCALE,
    DEFAULT_YAW_WRAP_FRACTION,
};
use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Application configuration
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct Config {
    /// Landmark smoothing configuration
    pub filter: FilterConfig,

    /// Accessory placement and warp configuration
    pub geometry: GeometryConfig,

    /// Output frame configuration
    pub output: OutputConfig,

    /// Tracking loop configuration
    pub tracking: TrackingConfig,

    /// Artwork asset paths
    pub assets: AssetConfig,
}

/// One-Euro filter parameters
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FilterConfig {
    /// Baseline cutoff at zero speed; higher means less smoothing at rest
    pub min_cutoff: f64,

    /// Speed sensitivity; higher means faster response to motion
    pub beta: f64,

    /// Cutoff for the derivative low-pass itself
    pub d_cutoff: f64,
}

/// Placement and cylindrical-warp parameters. The numeric values are
/// empirical tuning constants, preserved as configuration rather than
/// derived.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeometryConfig {
    /// Scale from normalized nose offset (relative to face width) to degrees
    pub yaw_scale: f64,

    /// Symmetric clamp on the yaw estimate, degrees
    pub yaw_clamp_deg: f64,

    /// Fraction of the yaw estimate folded into the cylindrical wrap
    pub yaw_wrap_fraction: f64,

    /// Angular extent of the forehead cylinder the accessory spans, degrees
    pub wrap_angle_deg: f64,

    /// Accessory width as a multiple of the measured face width (> 1)
    pub width_multiplier: f64,

    /// Accessory height/width aspect ratio
    pub accessory_aspect: f64,

    /// Vertical anchor offset above the brow line, fraction of accessory height
    pub vertical_offset: f64,

    /// Number of cylindrical samples across the accessory width
    pub segment_count: usize,

    /// Virtual camera distance for the perspective scale term
    pub camera_distance: f64,

    /// Strength of the depth-dependent perspective scaling
    pub perspective_strength: f64,

    /// Brightness floor plus depth-dependent range
    pub base_brightness: f64,
    pub brightness_range: f64,

    /// Depth below which a sample is culled as the back of the head
    pub backface_threshold: f64,

    /// Segment widths bridge the widest neighbor gap times this margin
    pub seam_margin: f64,

    /// Consecutive missed frames before cached placement is discarded
    pub max_stale_frames: u32,
}

/// Output frame configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    /// Output width in pixels
    pub width: u32,

    /// Output height in pixels
    pub height: u32,

    /// JPEG quality factor (1-100)
    pub jpeg_quality: u8,

    /// Watermark inset from the bottom-right corner, pixels
    pub watermark_inset: u32,
}

/// Tracking loop configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TrackingConfig {
    /// Detector cadence, Hz (decoupled from display refresh)
    pub tracking_hz: f64,

    /// Landmark scheme name ("dlib68" or "mediapipe468")
    pub scheme: String,
}

/// Artwork asset paths
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AssetConfig {
    /// Background scene image
    pub background: PathBuf,

    /// Accessory artwork
    pub accessory: PathBuf,

    /// Watermark image
    pub watermark: PathBuf,
}

impl Default for FilterConfig {
    fn default() -> Self {
        Self {
            min_cutoff: DEFAULT_MIN_CUTOFF,
            beta: DEFAULT_BETA,
            d_cutoff: DEFAULT_D_CUTOFF,
        }
    }
}

impl Default for GeometryConfig {
    fn default() -> Self {
        Self {
            yaw_scale: DEFAULT_YAW_SCALE,
            yaw_clamp_deg: DEFAULT_YAW_CLAMP_DEG,
            yaw_wrap_fraction: DEFAULT_YAW_WRAP_FRACTION,
            wrap_angle_deg: DEFAULT_WRAP_ANGLE_DEG,
            width_multiplier: DEFAULT_WIDTH_MULTIPLIER,
            accessory_aspect: DEFAULT_ACCESSORY_ASPECT,
            vertical_offset: DEFAULT_VERTICAL_OFFSET,
            segment_count: DEFAULT_SEGMENT_COUNT,
            camera_distance: DEFAULT_CAMERA_DISTANCE,
            perspective_strength: DEFAULT_PERSPECTIVE_STRENGTH,
            base_brightness: DEFAULT_BASE_BRIGHTNESS,
            brightness_range: DEFAULT_BRIGHTNESS_RANGE,
            backface_threshold: DEFAULT_BACKFACE_THRESHOLD,
            seam_margin: DEFAULT_SEAM_MARGIN,
            max_stale_frames: DEFAULT_MAX_STALE_FRAMES,
        }
    }
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            width: DEFAULT_OUTPUT_WIDTH,
            height: DEFAULT_OUTPUT_HEIGHT,
            jpeg_quality: DEFAULT_JPEG_QUALITY,
            watermark_inset: DEFAULT_WATERMARK_INSET,
        }
    }
}

impl Default for TrackingConfig {
    fn default() -> Self {
        Self {
            tracking_hz: DEFAULT_TRACKING_HZ,
            scheme: "dlib68".to_string(),
        }
    }
}

impl Default for AssetConfig {
    fn default() -> Self {
        Self {
            background: PathBuf::from("assets/background.png"),
            accessory: PathBuf::from("assets/accessory.png"),
            watermark: PathBuf::from("assets/watermark.png"),
        }
    }
}

impl Config {
    /// Load configuration from a YAML file
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        serde_yaml::from_str(&content)
            .map_err(|e| Error::Config(format!("Failed to parse config: {e}")))
    }

    /// Save configuration to a YAML file
    ///
    /// # Errors
    ///
    /// Returns an error if serialization or writing fails.
    pub fn to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let content = serde_yaml::to_string(self)
            .map_err(|e| Error::Config(format!("Failed to serialize config: {e}")))?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Validate configuration
    ///
    /// # Errors
    ///
    /// Returns a `Config` error describing the first invalid field.
    pub fn validate(&self) -> Result<()> {
        if self.filter.min_cutoff <= 0.0 {
            return Err(Error::Config("min_cutoff must be positive".to_string()));
        }
        if self.filter.beta < 0.0 {
            return Err(Error::Config("beta must be non-negative".to_string()));
        }
        if self.filter.d_cutoff <= 0.0 {
            return Err(Error::Config("d_cutoff must be positive".to_string()));
        }

        if self.geometry.yaw_clamp_deg <= 0.0 {
            return Err(Error::Config("yaw_clamp_deg must be positive".to_string()));
        }
        if self.geometry.width_multiplier <= 1.0 {
            return Err(Error::Config(
                "width_multiplier must be greater than 1".to_string(),
            ));
        }
        if self.geometry.accessory_aspect <= 0.0 {
            return Err(Error::Config("accessory_aspect must be positive".to_string()));
        }
        if self.geometry.segment_count < 3 {
            return Err(Error::Config("segment_count must be at least 3".to_string()));
        }
        if self.geometry.camera_distance <= 0.0 {
            return Err(Error::Config("camera_distance must be positive".to_string()));
        }
        if !(-1.0..1.0).contains(&self.geometry.backface_threshold) {
            return Err(Error::Config(
                "backface_threshold must be in (-1, 1)".to_string(),
            ));
        }
        if self.geometry.seam_margin < 1.0 {
            return Err(Error::Config("seam_margin must be at least 1".to_string()));
        }
        if !(0.0..=1.0).contains(&self.geometry.yaw_wrap_fraction) {
            return Err(Error::Config(
                "yaw_wrap_fraction must be between 0.0 and 1.0".to_string(),
            ));
        }
        if self.geometry.wrap_angle_deg <= 0.0 || self.geometry.wrap_angle_deg >= 360.0 {
            return Err(Error::Config(
                "wrap_angle_deg must be in (0, 360)".to_string(),
            ));
        }

        if self.output.width == 0 || self.output.height == 0 {
            return Err(Error::Config(
                "Output dimensions must be greater than 0".to_string(),
            ));
        }
        if self.output.jpeg_quality == 0 || self.output.jpeg_quality > 100 {
            return Err(Error::Config(
                "JPEG quality must be between 1 and 100".to_string(),
            ));
        }

        if self.tracking.tracking_hz <= 0.0 {
            return Err(Error::Config("tracking_hz must be positive".to_string()));
        }
        crate::landmarks::LandmarkScheme::from_name(&self.tracking.scheme)?;

        Ok(())
    }
}

/// Example configuration file content
pub const EXAMPLE_CONFIG: &str = r#"# Selfie accessory overlay configuration

# Landmark smoothing (One-Euro)
filter:
  min_cutoff: 1.0
  beta: 0.007
  d_cutoff: 1.0

# Accessory placement and cylindrical warp
geometry:
  yaw_scale: 140.0
  yaw_clamp_deg: 60.0
  yaw_wrap_fraction: 0.6
  wrap_angle_deg: 150.0
  width_multiplier: 1.55
  accessory_aspect: 0.42
  vertical_offset: 0.55
  segment_count: 24
  camera_distance: 3.0
  perspective_strength: 1.2
  base_brightness: 0.62
  brightness_range: 0.38
  backface_threshold: 0.05
  seam_margin: 1.6
  max_stale_frames: 8

# Output frame
output:
  width: 1080
  height: 1920
  jpeg_quality: 90
  watermark_inset: 48

# Tracking loop
tracking:
  tracking_hz: 15.0
  scheme: "dlib68"

# Artwork assets
assets:
  background: "assets/background.png"
  accessory: "assets/accessory.png"
  watermark: "assets/watermark.png"
"#;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        assert!(Config::default().validate().is_ok());
    }

    #[test]
    fn test_example_config_parses_and_validates() {
        let config: Config = serde_yaml::from_str(EXAMPLE_CONFIG).unwrap();
        assert!(config.validate().is_ok());
        assert_eq!(config.output.width, 1080);
        assert_eq!(config.tracking.scheme, "dlib68");
    }

    #[test]
    fn test_partial_config_uses_defaults() {
        let config: Config = serde_yaml::from_str("output:\n  width: 720\n  height: 1280\n").unwrap();
        assert_eq!(config.output.width, 720);
        assert_eq!(config.filter.min_cutoff, DEFAULT_MIN_CUTOFF);
    }

    #[test]
    fn test_validate_rejects_bad_values() {
        let mut config = Config::default();
        config.filter.min_cutoff = 0.0;
        assert!(config.validate().is_err());

        let mut config = Config::default();
        config.geometry.width_multiplier = 0.9;
        assert!(config.validate().is_err());

        let mut config = Config::default();
        config.geometry.segment_count = 2;
        assert!(config.validate().is_err());

        let mut config = Config::default();
        config.output.jpeg_quality = 0;
        assert!(config.validate().is_err());

        let mut config = Config::default();
        config.tracking.scheme = "unknown".to_string();
        assert!(config.validate().is_err());
    }
}
