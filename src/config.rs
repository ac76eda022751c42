//! Configuration management for the drowsiness monitoring application

use crate::drowsiness::DrowsinessConfig;
use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Application configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Drowsiness detection parameters
    pub detection: DrowsinessConfig,

    /// Model file paths
    pub models: ModelConfig,

    /// Camera configuration
    pub camera: CameraConfig,

    /// Display configuration
    pub display: DisplayConfig,

    /// Alarm configuration
    pub alarm: AlarmConfig,
}

/// Model file paths configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ModelConfig {
    /// Path to the Haar cascade face detector
    pub face_cascade: PathBuf,

    /// Path to the 68-point facial landmarks ONNX model
    pub face_landmarks: PathBuf,
}

/// Camera configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CameraConfig {
    /// Camera device index
    pub index: i32,

    /// Flip the image horizontally (mirror view)
    pub flip_x: bool,
}

/// Display configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DisplayConfig {
    /// Show the camera window with overlays
    pub gui: bool,

    /// Draw the per-eye landmark dots
    pub show_landmarks: bool,
}

/// Alarm configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AlarmConfig {
    /// Enable audible alarm playback
    pub enabled: bool,

    /// Path to the alarm sound file
    pub sound_path: PathBuf,
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            face_cascade: PathBuf::from("assets/haarcascade_frontalface_default.xml"),
            face_landmarks: PathBuf::from("assets/face_landmarks.onnx"),
        }
    }
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self { index: 0, flip_x: false }
    }
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            gui: true,
            show_landmarks: true,
        }
    }
}

impl Default for AlarmConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            sound_path: PathBuf::from("assets/alarm.wav"),
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

        serde_yaml::from_str(&content).map_err(|e| Error::ConfigError(format!("Failed to parse config: {e}")))
    }

    /// Save configuration to a YAML file
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration cannot be serialized or the
    /// file cannot be written.
    pub fn to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let content =
            serde_yaml::to_string(self).map_err(|e| Error::ConfigError(format!("Failed to serialize config: {e}")))?;

        std::fs::write(path, content)?;

        Ok(())
    }

    /// Validate configuration
    ///
    /// # Errors
    ///
    /// Returns an error if any parameter is out of range.
    pub fn validate(&self) -> Result<()> {
        self.detection.validate()?;

        if self.camera.index < 0 {
            return Err(Error::ConfigError("Camera index must be non-negative".to_string()));
        }

        Ok(())
    }
}

/// Example configuration file content
pub const EXAMPLE_CONFIG: &str = r#"# Drowsiness Monitor Configuration

# Detection parameters
detection:
  ear_threshold: 0.25
  consec_frames_threshold: 48
  reset_on_lost_face: false

# Model paths
models:
  face_cascade: "assets/haarcascade_frontalface_default.xml"
  face_landmarks: "assets/face_landmarks.onnx"

# Camera settings
camera:
  index: 0
  flip_x: false

# Display settings
display:
  gui: true
  show_landmarks: true

# Alarm settings
alarm:
  enabled: true
  sound_path: "assets/alarm.wav"
"#;
