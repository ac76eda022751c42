//! Main application module: capture loop, overlay rendering and alarm wiring.
//!
//! One frame is fully processed before the next begins: capture, detect,
//! estimate, classify, then render and apply alarm actions. The core stays
//! pure; this module owns all side effects.

use log::{info, warn};
use opencv::{
    core::{Mat, Point, Rect, Scalar},
    highgui::{self, WINDOW_NORMAL},
    imgproc::{self, FONT_HERSHEY_SIMPLEX, LINE_AA},
    prelude::*,
    videoio::{self, VideoCapture, CAP_PROP_BUFFERSIZE},
};

use crate::{
    alarm::{self, AlarmSink, NullAlarm},
    config::{AlarmConfig, Config},
    constants::{PROGRESS_BAR_HEIGHT, PROGRESS_BAR_WIDTH},
    detection::OnnxLandmarkOracle,
    drowsiness::{AlarmAction, DrowsinessLevel},
    error::Result,
    landmarks::{FaceLandmarks, LandmarkOracle},
    monitor::{FaceMonitor, FaceReport},
};

const WINDOW_NAME: &str = "Drowsiness Monitor";

/// Video source type
#[derive(Debug, Clone)]
pub enum VideoSource {
    /// Webcam index
    Camera(i32),
    /// Video file path
    File(String),
}

/// Main application struct
pub struct DrowsyWatchApp {
    config: Config,
    video_source: VideoSource,
    oracle: OnnxLandmarkOracle,
    monitor: FaceMonitor,
    alarm: Box<dyn AlarmSink>,
    video_capture: VideoCapture,
}

impl DrowsyWatchApp {
    /// Create a new drowsiness monitoring application
    ///
    /// # Errors
    ///
    /// Returns an error if the video source cannot be opened or a model
    /// fails to load. An unavailable alarm backend is not an error; the
    /// application degrades to visual-only alerts.
    pub fn new(config: Config, video_source: VideoSource) -> Result<Self> {
        info!("Initializing drowsiness monitor");
        config.validate()?;

        let mut video_capture = match &video_source {
            VideoSource::Camera(index) => {
                info!("Opening camera {index}");
                let mut cap = VideoCapture::new(*index, videoio::CAP_ANY)?;

                // Reduce buffer size for lower latency (webcam only)
                cap.set(CAP_PROP_BUFFERSIZE, 1.0)?;

                cap
            }
            VideoSource::File(path) => {
                info!("Opening video file: {path}");
                VideoCapture::from_file(path, videoio::CAP_ANY)?
            }
        };

        if !video_capture.is_opened()? {
            return Err(crate::Error::InvalidInput("Could not open video source".to_string()));
        }

        let oracle = OnnxLandmarkOracle::new(&config.models.face_cascade, &config.models.face_landmarks)?;
        let monitor = FaceMonitor::new(config.detection.clone());
        let alarm = make_alarm(&config.alarm);

        if config.display.gui {
            highgui::named_window(WINDOW_NAME, WINDOW_NORMAL)?;
        }

        Ok(Self {
            config,
            video_source,
            oracle,
            monitor,
            alarm,
            video_capture,
        })
    }

    /// Run the main monitoring loop until the stream ends or the user quits
    ///
    /// # Errors
    ///
    /// Returns an error only on total failure of the frame source or the
    /// display; per-frame detection problems are logged and skipped.
    pub fn run(&mut self) -> Result<()> {
        info!("Starting monitoring loop");

        let result = self.frame_loop();

        // An active alarm must not outlive the processing loop.
        let cleanup = self.monitor.finish();
        alarm::apply(cleanup, self.alarm.as_mut());

        info!("Monitoring stopped");
        result
    }

    fn frame_loop(&mut self) -> Result<()> {
        loop {
            let mut frame = Mat::default();
            if !self.video_capture.read(&mut frame)? || frame.empty() {
                if matches!(self.video_source, VideoSource::File(_)) {
                    info!("End of video file reached");
                    return Ok(());
                }
                warn!("Failed to read frame, retrying...");
                continue;
            }

            if self.config.camera.flip_x {
                let temp = frame.clone();
                opencv::core::flip(&temp, &mut frame, 1)?;
            }

            // A failed detection is a skipped frame, never a dead loop.
            let landmark_sets = match self.oracle.detect(&frame) {
                Ok(sets) => sets,
                Err(e) => {
                    warn!("Landmark detection failed: {e}");
                    Vec::new()
                }
            };

            let observations: Vec<_> = landmark_sets.iter().map(FaceLandmarks::eye_observation).collect();
            let summary = self.monitor.observe(&observations);

            for action in &summary.alarm_actions {
                if *action == AlarmAction::Start {
                    warn!("DROWSINESS ALERT!");
                }
                alarm::apply(*action, self.alarm.as_mut());
            }

            if self.config.display.gui {
                for report in &summary.reports {
                    self.draw_overlay(&mut frame, report, &landmark_sets[report.slot])?;
                }

                highgui::imshow(WINDOW_NAME, &frame)?;

                let key = highgui::wait_key(1)?;
                if key == 27 || key == i32::from(b'q') {
                    info!("Exit requested by user");
                    return Ok(());
                }
            }
        }
    }

    /// Draw the per-face overlay: eye landmarks, status, EAR readout and the
    /// alarm progress bar
    #[allow(clippy::cast_possible_truncation)] // pixel coordinates
    fn draw_overlay(&self, frame: &mut Mat, report: &FaceReport, landmarks: &FaceLandmarks) -> Result<()> {
        let assessment = &report.assessment;

        let status_color = match assessment.level {
            DrowsinessLevel::Awake => Scalar::new(0.0, 255.0, 0.0, 0.0),
            DrowsinessLevel::SlightlyDrowsy => Scalar::new(0.0, 255.0, 255.0, 0.0),
            DrowsinessLevel::VeryDrowsy => Scalar::new(0.0, 0.0, 255.0, 0.0),
        };
        let white = Scalar::new(255.0, 255.0, 255.0, 0.0);

        if self.config.display.show_landmarks {
            let left_color = Scalar::new(0.0, 255.0, 255.0, 0.0);
            let right_color = Scalar::new(255.0, 0.0, 255.0, 0.0);
            for (points, color) in [
                (landmarks.left_eye_points(), left_color),
                (landmarks.right_eye_points(), right_color),
            ] {
                for p in points {
                    let center = Point::new(p.x as i32, p.y as i32);
                    imgproc::circle(frame, center, 2, color, imgproc::FILLED, LINE_AA, 0)?;
                }
            }
        }

        imgproc::put_text(
            frame,
            &format!("EAR: {:.2}", assessment.avg_ear),
            Point::new(10, 30),
            FONT_HERSHEY_SIMPLEX,
            0.7,
            white,
            2,
            LINE_AA,
            false,
        )?;

        if assessment.level == DrowsinessLevel::VeryDrowsy {
            imgproc::put_text(
                frame,
                "DROWSINESS ALERT!",
                Point::new(10, 60),
                FONT_HERSHEY_SIMPLEX,
                1.0,
                Scalar::new(0.0, 0.0, 255.0, 0.0),
                3,
                LINE_AA,
                false,
            )?;
        }

        imgproc::put_text(
            frame,
            &format!("Status: {}", assessment.level),
            Point::new(10, 90),
            FONT_HERSHEY_SIMPLEX,
            0.7,
            status_color,
            2,
            LINE_AA,
            false,
        )?;

        // Progress toward the alarm threshold
        let bar = Rect::new(10, 120, PROGRESS_BAR_WIDTH, PROGRESS_BAR_HEIGHT);
        imgproc::rectangle(frame, bar, white, 2, LINE_AA, 0)?;

        let fill_width = i32::from(assessment.progress_percent) * PROGRESS_BAR_WIDTH / 100;
        if fill_width > 0 {
            let fill = Rect::new(bar.x, bar.y, fill_width, bar.height);
            imgproc::rectangle(frame, fill, status_color, imgproc::FILLED, LINE_AA, 0)?;
        }

        imgproc::put_text(
            frame,
            &format!("Progress: {}%", assessment.progress_percent),
            Point::new(bar.x, bar.y + bar.height + 20),
            FONT_HERSHEY_SIMPLEX,
            0.5,
            white,
            1,
            LINE_AA,
            false,
        )?;

        Ok(())
    }
}

/// Build the alarm sink from configuration, degrading to a no-op sink when
/// audio is disabled or unavailable.
fn make_alarm(config: &AlarmConfig) -> Box<dyn AlarmSink> {
    if !config.enabled {
        info!("Audible alarm disabled, running visual-only");
        return Box::new(NullAlarm);
    }

    #[cfg(feature = "audio")]
    {
        match crate::alarm::audio::AudioAlarm::new(&config.sound_path) {
            Ok(sink) => return Box::new(sink),
            Err(e) => warn!("Alarm sound unavailable ({e}), continuing visual-only"),
        }
    }

    #[cfg(not(feature = "audio"))]
    warn!("Built without the `audio` feature, alarm is visual-only");

    Box::new(NullAlarm)
}
