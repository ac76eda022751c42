//! Property tests for the EAR estimator

use drowsy_watch::geometry::{EyeShape, FaceObservation, Point2D};
use proptest::prelude::*;

fn eye_strategy() -> impl Strategy<Value = EyeShape> {
    // Rings with a clearly non-degenerate horizontal corner distance.
    (
        -500.0f64..500.0,
        -500.0f64..500.0,
        10.0f64..200.0,
        0.1f64..100.0,
    )
        .prop_map(|(x, y, width, lid)| {
            EyeShape::new([
                Point2D::new(x, y),
                Point2D::new(x + width * 0.25, y + lid),
                Point2D::new(x + width * 0.75, y + lid),
                Point2D::new(x + width, y),
                Point2D::new(x + width * 0.75, y - lid),
                Point2D::new(x + width * 0.25, y - lid),
            ])
        })
}

proptest! {
    /// EAR is a ratio of distances, so uniform scaling must not change it.
    #[test]
    fn ear_is_scale_invariant(eye in eye_strategy(), k in 0.01f64..100.0) {
        let original = eye.aspect_ratio().unwrap();

        let scaled_points = (*eye.points()).map(|p| Point2D::new(p.x * k, p.y * k));
        let scaled = EyeShape::new(scaled_points).aspect_ratio().unwrap();

        prop_assert!((original - scaled).abs() < 1e-6 * original.max(1.0));
    }

    /// EAR is translation invariant.
    #[test]
    fn ear_is_translation_invariant(eye in eye_strategy(), dx in -1000.0f64..1000.0, dy in -1000.0f64..1000.0) {
        let original = eye.aspect_ratio().unwrap();

        let moved_points = (*eye.points()).map(|p| Point2D::new(p.x + dx, p.y + dy));
        let moved = EyeShape::new(moved_points).aspect_ratio().unwrap();

        prop_assert!((original - moved).abs() < 1e-9);
    }

    /// EAR never comes out negative, infinite or NaN for valid rings.
    #[test]
    fn ear_is_finite_and_non_negative(eye in eye_strategy()) {
        let ear = eye.aspect_ratio().unwrap();
        prop_assert!(ear.is_finite());
        prop_assert!(ear >= 0.0);
    }

    /// A wider lid opening never decreases the EAR of the same ring.
    #[test]
    fn ear_grows_with_lid_distance(x in -100.0f64..100.0, width in 10.0f64..100.0, lid in 0.1f64..20.0) {
        let ring = |l: f64| {
            EyeShape::new([
                Point2D::new(x, 0.0),
                Point2D::new(x + width * 0.25, l),
                Point2D::new(x + width * 0.75, l),
                Point2D::new(x + width, 0.0),
                Point2D::new(x + width * 0.75, -l),
                Point2D::new(x + width * 0.25, -l),
            ])
        };

        let narrow = ring(lid).aspect_ratio().unwrap();
        let wide = ring(lid * 2.0).aspect_ratio().unwrap();
        prop_assert!(wide > narrow);
    }
}

#[test]
fn test_reference_shape() {
    // The worked example from the estimator contract: (2 + 2) / (2 * 4).
    let eye = EyeShape::new([
        Point2D::new(0.0, 0.0),
        Point2D::new(1.0, 1.0),
        Point2D::new(3.0, 1.0),
        Point2D::new(4.0, 0.0),
        Point2D::new(3.0, -1.0),
        Point2D::new(1.0, -1.0),
    ]);
    assert!((eye.aspect_ratio().unwrap() - 0.5).abs() < 1e-12);

    let face = FaceObservation::new(eye, eye);
    assert!((face.average_ear().unwrap() - 0.5).abs() < 1e-12);
}
