//! Three-point affine solve.

use crate::constants::DETERMINANT_EPSILON;
use crate::landmarks::Point2D;

/// 2x3 affine transform: `x' = a*x + c*y + e`, `y' = b*x + d*y + f`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AffineTransform {
    pub a: f64,
    pub b: f64,
    pub c: f64,
    pub d: f64,
    pub e: f64,
    pub f: f64,
}

impl AffineTransform {
    pub const IDENTITY: Self = Self {
        a: 1.0,
        b: 0.0,
        c: 0.0,
        d: 1.0,
        e: 0.0,
        f: 0.0,
    };

    #[must_use]
    pub fn apply(&self, p: Point2D) -> Point2D {
        Point2D::new(
            self.a.mul_add(p.x, self.c.mul_add(p.y, self.e)),
            self.b.mul_add(p.x, self.d.mul_add(p.y, self.f)),
        )
    }
}

impl Default for AffineTransform {
    fn default() -> Self {
        Self::IDENTITY
    }
}

/// Solve the affine transform mapping a source triangle onto a destination
/// triangle via Cramer's-rule elimination.
///
/// Collinear source points (near-zero determinant) fall back to the identity
/// transform rather than producing NaN or infinite coefficients.
#[must_use]
pub fn solve_affine(src: &[Point2D; 3], dst: &[Point2D; 3]) -> AffineTransform {
    let x10 = src[1].x - src[0].x;
    let y10 = src[1].y - src[0].y;
    let x20 = src[2].x - src[0].x;
    let y20 = src[2].y - src[0].y;

    let det = x10.mul_add(y20, -(x20 * y10));
    if det.abs() < DETERMINANT_EPSILON {
        return AffineTransform::IDENTITY;
    }

    let dx10 = dst[1].x - dst[0].x;
    let dx20 = dst[2].x - dst[0].x;
    let dy10 = dst[1].y - dst[0].y;
    let dy20 = dst[2].y - dst[0].y;

    let a = dx10.mul_add(y20, -(dx20 * y10)) / det;
    let c = dx20.mul_add(x10, -(dx10 * x20)) / det;
    let b = dy10.mul_add(y20, -(dy20 * y10)) / det;
    let d = dy20.mul_add(x10, -(dy10 * x20)) / det;
    let e = dst[0].x - a * src[0].x - c * src[0].y;
    let f = dst[0].y - b * src[0].x - d * src[0].y;

    AffineTransform { a, b, c, d, e, f }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_close(p: Point2D, q: Point2D) {
        assert!(
            (p.x - q.x).abs() < 1e-9 && (p.y - q.y).abs() < 1e-9,
            "{p:?} != {q:?}"
        );
    }

    #[test]
    fn test_reproduces_correspondences() {
        let src = [
            Point2D::new(0.0, 0.0),
            Point2D::new(1.0, 0.0),
            Point2D::new(0.0, 1.0),
        ];
        let dst = [
            Point2D::new(2.0, 3.0),
            Point2D::new(4.0, 3.5),
            Point2D::new(1.5, 6.0),
        ];
        let t = solve_affine(&src, &dst);
        for i in 0..3 {
            assert_close(t.apply(src[i]), dst[i]);
        }
    }

    #[test]
    fn test_general_triangle() {
        let src = [
            Point2D::new(10.0, -4.0),
            Point2D::new(3.0, 7.0),
            Point2D::new(-5.0, 2.0),
        ];
        let dst = [
            Point2D::new(0.0, 0.0),
            Point2D::new(100.0, 20.0),
            Point2D::new(-30.0, 55.0),
        ];
        let t = solve_affine(&src, &dst);
        for i in 0..3 {
            assert_close(t.apply(src[i]), dst[i]);
        }
    }

    #[test]
    fn test_collinear_source_falls_back_to_identity() {
        let src = [
            Point2D::new(0.0, 0.0),
            Point2D::new(1.0, 1.0),
            Point2D::new(2.0, 2.0),
        ];
        let dst = [
            Point2D::new(5.0, 5.0),
            Point2D::new(6.0, 6.0),
            Point2D::new(7.0, 7.0),
        ];
        assert_eq!(solve_affine(&src, &dst), AffineTransform::IDENTITY);
    }

    #[test]
    fn test_identity_apply() {
        let p = Point2D::new(12.5, -3.0);
        assert_eq!(AffineTransform::IDENTITY.apply(p), p);
    }
}
