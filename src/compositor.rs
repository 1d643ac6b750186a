//! Layered frame compositing.
//!
//! Produces one fixed-resolution output image from four ordered layers:
//! background scene, camera frame (cover-fit, center-cropped), accessory
//! overlay, and watermark. The live preview mirrors the camera layer
//! (selfie convention); the capture path composites the unmirrored frame.

use crate::config::OutputConfig;
use crate::geometry::OverlayGeometry;
use crate::landmarks::{LandmarkSet, Point2D};
use crate::overlay::OverlayRenderer;
use crate::Result;
use image::codecs::jpeg::JpegEncoder;
use image::imageops::{self, FilterType};
use image::{DynamicImage, RgbaImage};

/// The output surface; allocated per composite, encoded then discarded.
pub type CompositeFrame = RgbaImage;

/// Cover-fit mapping of a source image into the output canvas: scale to
/// fill the constraining axis, center-crop the other.
///
/// The overlay must be drawn in the same coordinate space as the cropped
/// camera frame, so this mapping is shared with landmark conversion.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CoverFit {
    pub scale: f64,
    pub dx: f64,
    pub dy: f64,
}

impl CoverFit {
    /// Compute the cover fit of a `src_w x src_h` image into an
    /// `out_w x out_h` canvas.
    #[must_use]
    pub fn compute(src_w: u32, src_h: u32, out_w: u32, out_h: u32) -> Self {
        if src_w == 0 || src_h == 0 {
            return Self {
                scale: 1.0,
                dx: 0.0,
                dy: 0.0,
            };
        }
        let scale = (f64::from(out_w) / f64::from(src_w)).max(f64::from(out_h) / f64::from(src_h));
        Self {
            scale,
            dx: (f64::from(out_w) - f64::from(src_w) * scale) / 2.0,
            dy: (f64::from(out_h) - f64::from(src_h) * scale) / 2.0,
        }
    }

    /// Map a normalized source-frame point into output pixel space.
    #[must_use]
    pub fn map_normalized(&self, p: Point2D, src_w: u32, src_h: u32) -> Point2D {
        Point2D::new(
            self.dx + p.x * f64::from(src_w) * self.scale,
            self.dy + p.y * f64::from(src_h) * self.scale,
        )
    }

    /// Map a whole normalized landmark set into output pixel space.
    #[must_use]
    pub fn map_set(&self, set: &LandmarkSet, src_w: u32, src_h: u32) -> LandmarkSet {
        set.map(|p| self.map_normalized(p, src_w, src_h))
    }
}

/// Composes background, camera frame, overlay, and watermark into the final
/// fixed-size output.
#[derive(Debug, Clone)]
pub struct FrameCompositor {
    config: OutputConfig,
}

impl FrameCompositor {
    #[must_use]
    pub fn new(config: OutputConfig) -> Self {
        Self { config }
    }

    #[must_use]
    pub fn output_size(&self) -> (u32, u32) {
        (self.config.width, self.config.height)
    }

    /// Cover fit of a camera frame into the output canvas.
    #[must_use]
    pub fn camera_fit(&self, frame: &RgbaImage) -> CoverFit {
        CoverFit::compute(
            frame.width(),
            frame.height(),
            self.config.width,
            self.config.height,
        )
    }

    /// Compose the four layers. `overlay` carries the accessory image plus
    /// geometry already expressed in output pixel space; pass `None` to
    /// skip the overlay (no usable landmarks this frame). When `mirrored`
    /// is set the camera layer is flipped horizontally (live-preview selfie
    /// convention); the caller is responsible for feeding landmark geometry
    /// in the matching convention.
    #[must_use]
    pub fn composite(
        &self,
        background: &RgbaImage,
        camera: &RgbaImage,
        overlay: Option<(&RgbaImage, &OverlayGeometry)>,
        watermark: &RgbaImage,
        mirrored: bool,
    ) -> CompositeFrame {
        let mut canvas = RgbaImage::from_pixel(
            self.config.width,
            self.config.height,
            image::Rgba([0, 0, 0, 255]),
        );

        self.draw_cover(&mut canvas, background);

        if mirrored {
            let flipped = imageops::flip_horizontal(camera);
            self.draw_cover(&mut canvas, &flipped);
        } else {
            self.draw_cover(&mut canvas, camera);
        }

        if let Some((accessory, geometry)) = overlay {
            OverlayRenderer::render(&mut canvas, accessory, geometry);
        }

        self.draw_watermark(&mut canvas, watermark);
        canvas
    }

    /// Encode a composite frame as JPEG at the configured quality.
    ///
    /// # Errors
    ///
    /// Returns an error if encoding fails; this is the one failure class
    /// surfaced to the user, since it loses the requested capture.
    pub fn encode(&self, frame: &CompositeFrame) -> Result<Vec<u8>> {
        let rgb = DynamicImage::ImageRgba8(frame.clone()).to_rgb8();
        let mut buffer = Vec::new();
        let mut encoder = JpegEncoder::new_with_quality(&mut buffer, self.config.jpeg_quality);
        encoder.encode_image(&rgb)?;
        Ok(buffer)
    }

    /// Draw a layer cover-fit into the canvas, skipping degenerate images.
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    fn draw_cover(&self, canvas: &mut RgbaImage, layer: &RgbaImage) {
        if layer.width() == 0 || layer.height() == 0 {
            log::debug!("Skipping layer with zero dimensions");
            return;
        }

        let fit = CoverFit::compute(
            layer.width(),
            layer.height(),
            self.config.width,
            self.config.height,
        );
        let scaled_w = (f64::from(layer.width()) * fit.scale).round().max(1.0) as u32;
        let scaled_h = (f64::from(layer.height()) * fit.scale).round().max(1.0) as u32;

        if scaled_w == layer.width() && scaled_h == layer.height() {
            imageops::overlay(canvas, layer, fit.dx as i64, fit.dy as i64);
        } else {
            let scaled = imageops::resize(layer, scaled_w, scaled_h, FilterType::Triangle);
            imageops::overlay(canvas, &scaled, fit.dx as i64, fit.dy as i64);
        }
    }

    /// Draw the watermark at a fixed inset from the bottom-right corner.
    fn draw_watermark(&self, canvas: &mut RgbaImage, watermark: &RgbaImage) {
        if watermark.width() == 0 || watermark.height() == 0 {
            log::debug!("Skipping watermark with zero dimensions");
            return;
        }

        let x = i64::from(self.config.width)
            - i64::from(watermark.width())
            - i64::from(self.config.watermark_inset);
        let y = i64::from(self.config.height)
            - i64::from(watermark.height())
            - i64::from(self.config.watermark_inset);
        imageops::overlay(canvas, watermark, x, y);
    }
}
