//! Eye geometry and the eye aspect ratio (EAR) estimator.
//!
//! The EAR is the ratio of the vertical lid distances to the horizontal
//! corner distance of a six-point eye ring. It drops sharply when the lid
//! closes, which makes it a cheap per-frame eye-openness signal.

use crate::constants::{EPSILON, EYE_POINTS};
use crate::{Error, Result};

/// A 2D point in image pixel space
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Point2D {
    /// Horizontal pixel coordinate
    pub x: f64,
    /// Vertical pixel coordinate
    pub y: f64,
}

impl Point2D {
    /// Create a new point
    #[must_use]
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Euclidean distance to another point
    #[must_use]
    pub fn distance(self, other: Self) -> f64 {
        (self.x - other.x).hypot(self.y - other.y)
    }
}

/// Ordered six-point ring describing one eye.
///
/// The ordering is anatomical and significant: points 0 and 3 are the
/// horizontal corners, pairs (1, 5) and (2, 4) are the vertical lid pairs.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EyeShape {
    points: [Point2D; EYE_POINTS],
}

impl EyeShape {
    /// Create an eye shape from six ordered points
    #[must_use]
    pub const fn new(points: [Point2D; EYE_POINTS]) -> Self {
        Self { points }
    }

    /// Create an eye shape from a slice of exactly six ordered points
    ///
    /// # Errors
    ///
    /// Returns an error if the slice does not contain exactly six points.
    pub fn from_slice(points: &[Point2D]) -> Result<Self> {
        let points: [Point2D; EYE_POINTS] = points
            .try_into()
            .map_err(|_| Error::InvalidInput(format!("expected {EYE_POINTS} eye points, got {}", points.len())))?;
        Ok(Self { points })
    }

    /// The ordered ring points
    #[must_use]
    pub const fn points(&self) -> &[Point2D; EYE_POINTS] {
        &self.points
    }

    /// Compute the eye aspect ratio for this ring:
    /// `(|p1-p5| + |p2-p4|) / (2 * |p0-p3|)`
    ///
    /// # Errors
    ///
    /// Returns [`Error::DegenerateEyeShape`] if the horizontal corner
    /// distance is zero; the ratio is undefined and must not silently
    /// propagate as infinity or NaN.
    pub fn aspect_ratio(&self) -> Result<f64> {
        let p = &self.points;
        let vertical_a = p[1].distance(p[5]);
        let vertical_b = p[2].distance(p[4]);
        let horizontal = p[0].distance(p[3]);

        if horizontal < EPSILON {
            return Err(Error::DegenerateEyeShape);
        }

        Ok((vertical_a + vertical_b) / (2.0 * horizontal))
    }
}

/// Both eye rings of a single detected face in a single frame.
///
/// Observations are not retained across frames.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FaceObservation {
    /// Left eye ring
    pub left_eye: EyeShape,
    /// Right eye ring
    pub right_eye: EyeShape,
}

impl FaceObservation {
    /// Create an observation from the two eye rings
    #[must_use]
    pub const fn new(left_eye: EyeShape, right_eye: EyeShape) -> Self {
        Self { left_eye, right_eye }
    }

    /// Arithmetic mean of the left and right EAR.
    ///
    /// This scalar is the only signal the drowsiness state machine consumes.
    /// No cross-frame smoothing is applied here.
    ///
    /// # Errors
    ///
    /// Returns an error if either eye ring is degenerate.
    pub fn average_ear(&self) -> Result<f64> {
        let left = self.left_eye.aspect_ratio()?;
        let right = self.right_eye.aspect_ratio()?;
        Ok((left + right) / 2.0)
    }
}
