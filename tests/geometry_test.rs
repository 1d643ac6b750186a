//! Geometry engine integration tests over the public API, exercising both
//! landmark schemes and the affine solve primitive.

use selfie_overlay::config::GeometryConfig;
use selfie_overlay::geometry::affine::{solve_affine, AffineTransform};
use selfie_overlay::geometry::{GeometryEngine, OverlayGeometry};
use selfie_overlay::landmarks::{LandmarkRole, LandmarkScheme, LandmarkSet, Point2D};

/// A synthetic pixel-space face for the given scheme, with the nose tip
/// shifted by `nose_dx` pixels.
fn face_for(scheme: &LandmarkScheme, nose_dx: f64) -> LandmarkSet {
    let mut points = vec![Point2D::new(320.0, 260.0); scheme.point_count()];
    let mut place = |role: LandmarkRole, x: f64, y: f64| {
        points[scheme.index(role)] = Point2D::new(x, y);
    };
    place(LandmarkRole::LeftJaw, 220.0, 250.0);
    place(LandmarkRole::RightJaw, 420.0, 250.0);
    place(LandmarkRole::NoseTip, 320.0 + nose_dx, 270.0);
    place(LandmarkRole::LeftBrowOuter, 250.0, 200.0);
    place(LandmarkRole::LeftBrowInner, 300.0, 195.0);
    place(LandmarkRole::RightBrowInner, 340.0, 195.0);
    place(LandmarkRole::RightBrowOuter, 390.0, 200.0);
    LandmarkSet::new(points)
}

#[test]
fn test_affine_solve_reproduces_known_transform() {
    // T(p) = (2x - y + 3, x + y - 1)
    let src = [
        Point2D::new(0.0, 0.0),
        Point2D::new(1.0, 0.0),
        Point2D::new(0.0, 1.0),
    ];
    let dst = [
        Point2D::new(3.0, -1.0),
        Point2D::new(5.0, 0.0),
        Point2D::new(2.0, 0.0),
    ];
    let t = solve_affine(&src, &dst);

    let p = t.apply(Point2D::new(0.5, 0.5));
    assert!((p.x - 3.5).abs() < 1e-9);
    assert!(p.y.abs() < 1e-9);
}

#[test]
fn test_affine_solve_degenerate_falls_back_to_identity() {
    // Collinear source points: no unique solution
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
    let t = solve_affine(&src, &dst);
    assert_eq!(t, AffineTransform::IDENTITY);

    let p = t.apply(Point2D::new(3.0, 4.0));
    assert!((p.x - 3.0).abs() < 1e-12 && (p.y - 4.0).abs() < 1e-12);
}

#[test]
fn test_both_schemes_agree_on_yaw() {
    let dlib = LandmarkScheme::dlib68();
    let mediapipe = LandmarkScheme::mediapipe468();
    let engine_a = GeometryEngine::new(GeometryConfig::default(), LandmarkScheme::dlib68());
    let engine_b = GeometryEngine::new(GeometryConfig::default(), LandmarkScheme::mediapipe468());

    // Identical role positions in both index layouts
    let yaw_a = engine_a.estimate_yaw(&face_for(&dlib, 30.0), false);
    let yaw_b = engine_b.estimate_yaw(&face_for(&mediapipe, 30.0), false);
    assert!((yaw_a - yaw_b).abs() < 1e-9);
    assert!(yaw_a > 0.0);
}

#[test]
fn test_yaw_is_scale_invariant() {
    let scheme = LandmarkScheme::dlib68();
    let engine = GeometryEngine::new(GeometryConfig::default(), scheme.clone());

    let full = face_for(&scheme, 40.0);
    let half = full.map(|p| Point2D::new(p.x * 0.5, p.y * 0.5));
    let yaw_full = engine.estimate_yaw(&full, false);
    let yaw_half = engine.estimate_yaw(&half, false);
    assert!((yaw_full - yaw_half).abs() < 1e-9);
}

#[test]
fn test_placement_with_mediapipe_scheme() {
    let scheme = LandmarkScheme::mediapipe468();
    let mut engine = GeometryEngine::new(GeometryConfig::default(), scheme.clone());

    let geometry = engine.place(&face_for(&scheme, 0.0));
    assert!(!geometry.is_empty());
    // Brow midpoint is x = 320; the anchor sits above the brow line
    assert!((geometry.anchor.x - 320.0).abs() < 1e-9);
    assert!(geometry.anchor.y < 200.0);
}

#[test]
fn test_wrap_covers_accessory_source_range() {
    let scheme = LandmarkScheme::dlib68();
    let mut engine = GeometryEngine::new(GeometryConfig::default(), scheme.clone());

    let geometry = engine.place(&face_for(&scheme, 0.0));
    let min_src = geometry
        .segments
        .iter()
        .map(|s| s.src_x)
        .fold(f64::MAX, f64::min);
    let max_src = geometry
        .segments
        .iter()
        .map(|s| s.src_x + s.src_width)
        .fold(0.0, f64::max);
    // Frontal face, default wrap: the whole artwork strip is sampled
    assert!(min_src.abs() < 1e-9);
    assert!((max_src - 1.0).abs() < 1e-9);
    for segment in &geometry.segments {
        assert!(segment.src_x >= 0.0 && segment.src_x + segment.src_width <= 1.0 + 1e-12);
    }
}

#[test]
fn test_yaw_shifts_visible_segments() {
    let scheme = LandmarkScheme::dlib68();
    let mut engine = GeometryEngine::new(GeometryConfig::default(), scheme.clone());

    let frontal = engine.place(&face_for(&scheme, 0.0));
    let turned = engine.place(&face_for(&scheme, 65.0));

    let mean_offset = |g: &OverlayGeometry| {
        #[allow(clippy::cast_precision_loss)]
        let n = g.segments.len() as f64;
        g.segments.iter().map(|s| s.offset).sum::<f64>() / n
    };
    // Turning the head slides the wrap sideways around the cylinder
    assert!(mean_offset(&frontal).abs() < 1e-6);
    assert!(mean_offset(&turned).abs() > 1.0);
}

#[test]
fn test_cache_survives_momentary_dropout_only() {
    let scheme = LandmarkScheme::dlib68();
    let config = GeometryConfig {
        max_stale_frames: 3,
        ..GeometryConfig::default()
    };
    let mut engine = GeometryEngine::new(config, scheme.clone());

    let good = engine.place(&face_for(&scheme, 0.0));
    let empty = LandmarkSet::default();
    for _ in 0..3 {
        assert_eq!(engine.place(&empty), good);
    }
    assert!(engine.place(&empty).is_empty());

    // A fresh detection repopulates the cache
    let reacquired = engine.place(&face_for(&scheme, 10.0));
    assert!(!reacquired.is_empty());
    assert_eq!(engine.place(&empty), reacquired);
}

#[test]
fn test_wrap_shading_follows_the_on_screen_nose() {
    let scheme = LandmarkScheme::dlib68();
    let mut engine = GeometryEngine::new(GeometryConfig::default(), scheme.clone());

    // Tilted brows so head roll is exercised too
    let mut set = face_for(&scheme, 40.0);
    set = {
        let mut points = set.points().to_vec();
        points[scheme.index(LandmarkRole::LeftBrowOuter)] = Point2D::new(250.0, 205.0);
        points[scheme.index(LandmarkRole::RightBrowOuter)] = Point2D::new(390.0, 195.0);
        LandmarkSet::new(points)
    };
    // The same head seen in a horizontally reflected space (nose at -x)
    let flipped = set.map(|p| Point2D::new(1400.0 - p.x, p.y));

    let direct = engine.place(&set);
    let reflected = engine.place(&flipped);

    // The dim, compressed far side of the wrap sits on the side the nose
    // points toward in the drawing space
    let dimmest_offset = |g: &OverlayGeometry| {
        g.segments
            .iter()
            .min_by(|a, b| a.brightness.partial_cmp(&b.brightness).unwrap())
            .unwrap()
            .offset
    };
    assert!(dimmest_offset(&direct) > 0.0, "nose at +x, shading at +x");
    assert!(dimmest_offset(&reflected) < 0.0, "nose at -x, shading at -x");

    // The two placements are exact lateral reflections of each other
    assert_eq!(direct.segments.len(), reflected.segments.len());
    let key = |s: &selfie_overlay::geometry::WarpSegment| (s.offset, s.scale, s.brightness);
    let mut d: Vec<_> = direct.segments.iter().map(key).collect();
    let mut r: Vec<_> = reflected.segments.iter().map(key).collect();
    d.sort_by(|a, b| a.0.partial_cmp(&b.0).unwrap());
    r.sort_by(|a, b| a.0.partial_cmp(&b.0).unwrap());
    for (j, rj) in r.iter().enumerate() {
        let dj = d[d.len() - 1 - j];
        assert!((rj.0 + dj.0).abs() < 1e-6, "{} vs {}", rj.0, dj.0);
        assert!((rj.1 - dj.1).abs() < 1e-9);
        assert!((rj.2 - dj.2).abs() < 1e-9);
    }
    assert!((reflected.anchor.x - (1400.0 - direct.anchor.x)).abs() < 1e-6);
    assert!((reflected.anchor.y - direct.anchor.y).abs() < 1e-6);
    assert!((reflected.rotation + direct.rotation).abs() < 1e-9);

    // The reported orientation estimate is still canonical under the flag
    let canonical = engine.estimate_yaw(&set, false);
    assert!((engine.estimate_yaw(&flipped, true) - canonical).abs() < 1e-9);
}
