//! Facial landmark contract.
//!
//! The pipeline consumes 68-point landmark sets through the
//! [`LandmarkOracle`] trait, so the core never depends on a concrete
//! detector backend. Of the 68 points only the two six-point eye rings
//! (indices 36..42 and 42..48) are used downstream.

use crate::constants::{EYE_POINTS, LEFT_EYE_START, NUM_FACIAL_LANDMARKS, RIGHT_EYE_START};
use crate::geometry::{EyeShape, FaceObservation, Point2D};
use crate::{Error, Result};

/// Ordered 68-point landmark set for one detected face
#[derive(Debug, Clone, PartialEq)]
pub struct FaceLandmarks {
    points: Vec<Point2D>,
}

impl FaceLandmarks {
    /// Create a landmark set from exactly 68 ordered points
    ///
    /// # Errors
    ///
    /// Returns an error if the point count is not 68.
    pub fn new(points: Vec<Point2D>) -> Result<Self> {
        if points.len() != NUM_FACIAL_LANDMARKS {
            return Err(Error::InvalidInput(format!(
                "expected {NUM_FACIAL_LANDMARKS} landmarks, got {}",
                points.len()
            )));
        }
        Ok(Self { points })
    }

    /// All 68 ordered points
    #[must_use]
    pub fn points(&self) -> &[Point2D] {
        &self.points
    }

    /// The six left-eye ring points (indices 36..42)
    #[must_use]
    pub fn left_eye_points(&self) -> &[Point2D] {
        &self.points[LEFT_EYE_START..LEFT_EYE_START + EYE_POINTS]
    }

    /// The six right-eye ring points (indices 42..48)
    #[must_use]
    pub fn right_eye_points(&self) -> &[Point2D] {
        &self.points[RIGHT_EYE_START..RIGHT_EYE_START + EYE_POINTS]
    }

    /// Extract the per-frame eye observation consumed by the estimator
    #[must_use]
    pub fn eye_observation(&self) -> FaceObservation {
        // Ring lengths are fixed by construction.
        let left = EyeShape::from_slice(self.left_eye_points()).expect("left eye ring has six points");
        let right = EyeShape::from_slice(self.right_eye_points()).expect("right eye ring has six points");
        FaceObservation::new(left, right)
    }
}

/// Landmark detection backend.
///
/// Given a frame, returns the 68-point landmark set of every detected face,
/// in detection order. An empty vector means no face was found; that is not
/// an error.
pub trait LandmarkOracle<Frame> {
    /// Detect facial landmarks in a frame
    ///
    /// # Errors
    ///
    /// Returns an error if the backend itself fails; absence of faces is
    /// reported as an empty result.
    fn detect(&mut self, frame: &Frame) -> Result<Vec<FaceLandmarks>>;
}
