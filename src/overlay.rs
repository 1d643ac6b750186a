//! Warp-segment painter.
//!
//! Draws an ordered [`WarpSegment`] list onto an RGBA canvas. Each segment
//! is a rotated, scaled strip of the accessory image centered on its anchor
//! offset; destination pixels are inverse-mapped into the source slice and
//! bilinearly sampled, with the segment brightness applied as an alpha
//! multiplier.

use crate::geometry::{OverlayGeometry, WarpSegment};
use crate::landmarks::Point2D;
use crate::utils::{clamp_channel, lerp};
use image::RgbaImage;

/// Paints overlay geometry onto a drawing surface.
pub struct OverlayRenderer;

impl OverlayRenderer {
    /// Draw all segments, back to front, onto `canvas`.
    ///
    /// Transform state is computed per segment from scratch, so one
    /// segment's transform never leaks into the next. Malformed accessory
    /// images (zero dimensions) and empty segment lists are skipped
    /// silently; this never fails.
    pub fn render(canvas: &mut RgbaImage, accessory: &RgbaImage, geometry: &OverlayGeometry) {
        if geometry.is_empty() {
            return;
        }
        if accessory.width() == 0 || accessory.height() == 0 {
            log::debug!("Skipping overlay: accessory image has zero dimensions");
            return;
        }

        for segment in &geometry.segments {
            Self::draw_segment(canvas, accessory, geometry.anchor, segment);
        }
    }

    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    fn draw_segment(
        canvas: &mut RgbaImage,
        accessory: &RgbaImage,
        anchor: Point2D,
        segment: &WarpSegment,
    ) {
        if segment.dest_width <= 0.0 || segment.dest_height <= 0.0 {
            return;
        }

        let (sin, cos) = segment.rotation.sin_cos();
        // Segment anchor: lateral offset rotated onto the brow axis
        let cx = anchor.x + segment.offset * cos;
        let cy = anchor.y + segment.offset * sin;

        let hw = segment.dest_width / 2.0;
        let hh = segment.dest_height / 2.0;

        // Axis-aligned bounds of the rotated strip
        let bound_w = hw * cos.abs() + hh * sin.abs();
        let bound_h = hw * sin.abs() + hh * cos.abs();

        let x0 = ((cx - bound_w).floor().max(0.0)) as u32;
        let y0 = ((cy - bound_h).floor().max(0.0)) as u32;
        let x1 = ((cx + bound_w).ceil().min(f64::from(canvas.width()))) as u32;
        let y1 = ((cy + bound_h).ceil().min(f64::from(canvas.height()))) as u32;

        let tex_w = f64::from(accessory.width());
        let tex_h = f64::from(accessory.height());

        for py in y0..y1 {
            for px in x0..x1 {
                let dx = f64::from(px) + 0.5 - cx;
                let dy = f64::from(py) + 0.5 - cy;

                // Rotate back into the strip's local frame
                let lx = dx * cos + dy * sin;
                let ly = -dx * sin + dy * cos;
                if lx.abs() > hw || ly.abs() > hh {
                    continue;
                }

                let u = segment.src_x + (lx / segment.dest_width + 0.5) * segment.src_width;
                let v = ly / segment.dest_height + 0.5;
                let [r, g, b, a] = sample_bilinear(accessory, u * tex_w - 0.5, v * tex_h - 0.5);
                let alpha = a * segment.brightness;
                if alpha <= 0.0 {
                    continue;
                }

                blend_pixel(canvas, px, py, r, g, b, alpha);
            }
        }
    }
}

/// Bilinear sample at floating pixel coordinates, clamped at the borders.
/// Returns channels in 0..=255 plus alpha in 0..=1.
fn sample_bilinear(image: &RgbaImage, x: f64, y: f64) -> [f64; 4] {
    let max_x = f64::from(image.width() - 1);
    let max_y = f64::from(image.height() - 1);
    let x = x.clamp(0.0, max_x);
    let y = y.clamp(0.0, max_y);

    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    let (ix, iy) = (x.floor() as u32, y.floor() as u32);
    let (fx, fy) = (x.fract(), y.fract());
    let ix1 = (ix + 1).min(image.width() - 1);
    let iy1 = (iy + 1).min(image.height() - 1);

    let p00 = image.get_pixel(ix, iy).0;
    let p10 = image.get_pixel(ix1, iy).0;
    let p01 = image.get_pixel(ix, iy1).0;
    let p11 = image.get_pixel(ix1, iy1).0;

    let mut out = [0.0; 4];
    for c in 0..4 {
        let top = lerp(f64::from(p00[c]), f64::from(p10[c]), fx);
        let bottom = lerp(f64::from(p01[c]), f64::from(p11[c]), fx);
        out[c] = lerp(top, bottom, fy);
    }
    out[3] /= 255.0;
    out
}

/// Source-over blend of one pixel with a premultiplied-alpha-free source.
fn blend_pixel(canvas: &mut RgbaImage, x: u32, y: u32, r: f64, g: f64, b: f64, alpha: f64) {
    let dst = canvas.get_pixel_mut(x, y);
    let da = f64::from(dst.0[3]) / 255.0;
    let out_a = alpha + da * (1.0 - alpha);
    if out_a <= 0.0 {
        return;
    }

    for (c, src) in [r, g, b].into_iter().enumerate() {
        let blended =
            (src * alpha + f64::from(dst.0[c]) * da * (1.0 - alpha)) / out_a;
        dst.0[c] = clamp_channel(blended);
    }
    dst.0[3] = clamp_channel(out_a * 255.0);
}
