//! Drowsiness detection from the eye aspect ratio (EAR) of facial landmarks.
//!
//! The library turns a noisy per-frame eye-openness signal into a robust,
//! debounced three-level drowsiness classification with an edge-triggered
//! alarm lifecycle:
//!
//! 1. Six-point eye rings per eye are reduced to a scalar EAR and averaged
//!    across both eyes ([`geometry`]).
//! 2. A per-face state machine counts consecutive low-EAR frames and emits a
//!    classification, an alarm progress percentage and an alarm start/stop
//!    action ([`drowsiness`]).
//! 3. A monitoring session drives one state machine per detected face and
//!    applies the lost-face and shutdown policies ([`monitor`]).
//!
//! The core is pure and synchronous; camera capture, ONNX landmark
//! detection and on-screen rendering live behind the `app` feature, audible
//! alarm playback behind the `audio` feature.
//!
//! # Examples
//!
//! ```
//! use drowsy_watch::drowsiness::{AlarmAction, DrowsinessConfig, DrowsinessLevel, DrowsinessState};
//!
//! let config = DrowsinessConfig::default();
//! let mut state = DrowsinessState::new();
//!
//! // A single blink frame does not change the classification.
//! let report = state.update(0.1, &config);
//! assert_eq!(report.level, DrowsinessLevel::Awake);
//! assert_eq!(report.alarm_action, AlarmAction::None);
//!
//! // Sustained closed eyes escalate and trigger the alarm exactly once.
//! let mut started = 0;
//! for _ in 0..100 {
//!     if state.update(0.1, &config).alarm_action == AlarmAction::Start {
//!         started += 1;
//!     }
//! }
//! assert_eq!(started, 1);
//!
//! // Recovery resets in a single frame and stops the alarm.
//! let report = state.update(0.35, &config);
//! assert_eq!(report.level, DrowsinessLevel::Awake);
//! assert_eq!(report.alarm_action, AlarmAction::Stop);
//! ```

/// Eye geometry and the EAR estimator
pub mod geometry;

/// Drowsiness state machine with hysteresis and alarm lifecycle
pub mod drowsiness;

/// Per-face monitoring session
pub mod monitor;

/// Alarm playback capability
pub mod alarm;

/// Facial landmark contract and eye-ring extraction
pub mod landmarks;

/// Configuration management
pub mod config;

/// Error types and result handling
pub mod error;

/// Constants used throughout the application
pub mod constants;

/// ONNX-backed landmark detection
#[cfg(feature = "app")]
pub mod detection;

/// Main application module
#[cfg(feature = "app")]
pub mod app;

pub use error::{Error, Result};
