//! ONNX-backed landmark oracle.
//!
//! Classic Haar cascade face localization followed by a 68-point landmark
//! model run through `ONNX` Runtime. Only available with the `app` feature.

use std::path::Path;
use std::sync::Arc;

use ndarray::{Array1, Array4, CowArray};
use opencv::core::{Mat, Rect, Size, Vector, CV_32F};
use opencv::imgproc::{self, InterpolationFlags};
use opencv::objdetect::CascadeClassifier;
use opencv::prelude::*;
use ort::{Environment, Session, Value};

use crate::constants::{DEFAULT_LANDMARK_INPUT_SIZE, NUM_FACIAL_LANDMARKS};
use crate::geometry::Point2D;
use crate::landmarks::{FaceLandmarks, LandmarkOracle};
use crate::{Error, Result};

/// Minimum face size accepted by the cascade, in pixels
const MIN_FACE_SIZE: i32 = 60;

/// Haar cascade face localizer
pub struct FaceFinder {
    classifier: CascadeClassifier,
}

impl FaceFinder {
    /// Load a Haar cascade from an XML file
    ///
    /// # Errors
    ///
    /// Returns an error if the cascade file cannot be loaded.
    pub fn new<P: AsRef<Path>>(cascade_path: P) -> Result<Self> {
        let path = cascade_path.as_ref();
        if !path.exists() {
            return Err(Error::ModelError(format!("Face cascade not found: {}", path.display())));
        }

        log::info!("Loading face cascade: {}", path.display());
        let classifier = CascadeClassifier::new(&path.to_string_lossy())?;

        Ok(Self { classifier })
    }

    /// Locate face bounding boxes in a BGR frame
    ///
    /// # Errors
    ///
    /// Returns an error if an `OpenCV` operation fails.
    pub fn detect(&mut self, frame: &Mat) -> Result<Vec<Rect>> {
        let mut gray = Mat::default();
        imgproc::cvt_color(frame, &mut gray, imgproc::COLOR_BGR2GRAY, 0)?;

        let mut faces = Vector::<Rect>::new();
        self.classifier.detect_multi_scale(
            &gray,
            &mut faces,
            1.1,
            3,
            0,
            Size::new(MIN_FACE_SIZE, MIN_FACE_SIZE),
            Size::default(),
        )?;

        Ok(faces.to_vec())
    }
}

/// 68-point facial landmark detector using `ONNX` Runtime
pub struct MarkDetector {
    session: Session,
    input_size: i32,
}

impl MarkDetector {
    /// Create a new landmark detector from an `ONNX` model file
    ///
    /// # Errors
    ///
    /// Returns an error if the model file cannot be loaded or the `ONNX`
    /// runtime environment cannot be created.
    pub fn new<P: AsRef<Path>>(model_path: P) -> Result<Self> {
        log::info!("Initializing MarkDetector with model: {}", model_path.as_ref().display());

        let environment = Arc::new(
            Environment::builder()
                .with_name("mark_detector")
                .with_log_level(ort::LoggingLevel::Warning)
                .build()?,
        );

        let session = ort::SessionBuilder::new(&environment)?
            .with_optimization_level(ort::GraphOptimizationLevel::Level3)?
            .with_model_from_file(model_path)?;

        if session.inputs.is_empty() {
            return Err(Error::ModelInputError("Model has no inputs".to_string()));
        }

        Ok(Self {
            session,
            input_size: DEFAULT_LANDMARK_INPUT_SIZE,
        })
    }

    /// Detect the 68 landmarks in a face region, in face-region pixel
    /// coordinates
    ///
    /// # Errors
    ///
    /// Returns an error if preprocessing, inference, or output extraction
    /// fails.
    pub fn detect(&self, face_image: &Mat) -> Result<Vec<Point2D>> {
        let input = self.preprocess(face_image)?;
        let marks = self.forward(input)?;
        self.postprocess(&marks, face_image)
    }

    /// Resize, convert BGR to RGB and normalize to [0, 1]
    #[allow(clippy::cast_sign_loss)] // OpenCV dimensions are positive
    fn preprocess(&self, image: &Mat) -> Result<Array4<f32>> {
        let size = self.input_size as usize;

        let mut resized = Mat::default();
        imgproc::resize(
            image,
            &mut resized,
            Size::new(self.input_size, self.input_size),
            0.0,
            0.0,
            InterpolationFlags::INTER_LINEAR as i32,
        )?;

        let mut rgb_image = Mat::default();
        imgproc::cvt_color(&resized, &mut rgb_image, imgproc::COLOR_BGR2RGB, 0)?;

        let mut float_image = Mat::default();
        rgb_image.convert_to(&mut float_image, CV_32F, 1.0 / 255.0, 0.0)?;

        let mut data = vec![0.0f32; size * size * 3];
        for row in 0..self.input_size {
            for col in 0..self.input_size {
                let pixel = float_image.at_2d::<opencv::core::Vec3f>(row, col)?;
                let base = ((row as usize) * size + col as usize) * 3;
                data[base] = pixel[0];
                data[base + 1] = pixel[1];
                data[base + 2] = pixel[2];
            }
        }

        Array4::from_shape_vec((1, size, size, 3), data)
            .map_err(|e| Error::ModelInputError(format!("Failed to create input array: {e}")))
    }

    /// Run the model and flatten its output
    fn forward(&self, input: Array4<f32>) -> Result<Array1<f32>> {
        let cow_array = CowArray::from(input.into_dyn());
        let input_tensor = Value::from_array(self.session.allocator(), &cow_array)?;

        let outputs = self.session.run(vec![input_tensor])?;

        let marks_output = outputs
            .into_iter()
            .next()
            .ok_or_else(|| Error::ModelOutputError("No output from model".to_string()))?;

        let marks_tensor = marks_output.try_extract::<f32>()?;
        let marks_view = marks_tensor.view();
        let marks_data = marks_view
            .as_slice()
            .ok_or_else(|| Error::ModelOutputError("Failed to get output data".to_string()))?;

        Ok(Array1::from(marks_data.to_vec()))
    }

    /// Scale normalized model output back to face-region coordinates
    fn postprocess(&self, marks: &Array1<f32>, face_image: &Mat) -> Result<Vec<Point2D>> {
        if marks.len() < NUM_FACIAL_LANDMARKS * 2 {
            return Err(Error::ModelOutputError(format!(
                "expected {} output values, got {}",
                NUM_FACIAL_LANDMARKS * 2,
                marks.len()
            )));
        }

        let face_width = f64::from(face_image.cols());
        let face_height = f64::from(face_image.rows());
        let input_size = f64::from(self.input_size);

        let points = (0..NUM_FACIAL_LANDMARKS)
            .map(|i| {
                let x = f64::from(marks[i * 2]) * face_width / input_size;
                let y = f64::from(marks[i * 2 + 1]) * face_height / input_size;
                Point2D::new(x, y)
            })
            .collect();

        Ok(points)
    }
}

/// Landmark oracle combining cascade face localization with the `ONNX`
/// landmark model.
pub struct OnnxLandmarkOracle {
    faces: FaceFinder,
    marks: MarkDetector,
}

impl OnnxLandmarkOracle {
    /// Load both models
    ///
    /// # Errors
    ///
    /// Returns an error if either model fails to load.
    pub fn new<P: AsRef<Path>, Q: AsRef<Path>>(cascade_path: P, landmarks_path: Q) -> Result<Self> {
        Ok(Self {
            faces: FaceFinder::new(cascade_path)?,
            marks: MarkDetector::new(landmarks_path)?,
        })
    }
}

impl LandmarkOracle<Mat> for OnnxLandmarkOracle {
    fn detect(&mut self, frame: &Mat) -> Result<Vec<FaceLandmarks>> {
        let boxes = self.faces.detect(frame)?;
        let mut results = Vec::with_capacity(boxes.len());

        for bbox in boxes {
            let face_roi = Mat::roi(frame, bbox)?;
            let face_image = face_roi.try_clone()?;
            let local_points = self.marks.detect(&face_image)?;

            // Shift from face-region to full-frame coordinates.
            let points = local_points
                .into_iter()
                .map(|p| Point2D::new(p.x + f64::from(bbox.x), p.y + f64::from(bbox.y)))
                .collect();

            results.push(FaceLandmarks::new(points)?);
        }

        Ok(results)
    }
}
