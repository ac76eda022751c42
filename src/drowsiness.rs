//! Drowsiness state machine.
//!
//! Turns the noisy per-frame EAR signal into a debounced three-level
//! classification with an edge-triggered alarm lifecycle. A single blink
//! frame never changes the classification; only a sustained run of
//! consecutive low-EAR frames escalates it, and the alarm fires exactly once
//! per sustained event.

use serde::{Deserialize, Serialize};

use crate::constants::{DEFAULT_CONSEC_FRAMES, DEFAULT_EAR_THRESHOLD};
use crate::{Error, Result};

/// Drowsiness classification level
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum DrowsinessLevel {
    /// Eyes open, or closed for too few frames to matter
    #[default]
    Awake,
    /// Eyes closed for more than a third of the alarm threshold
    SlightlyDrowsy,
    /// Eyes closed for the full alarm threshold
    VeryDrowsy,
}

impl std::fmt::Display for DrowsinessLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Awake => write!(f, "Awake"),
            Self::SlightlyDrowsy => write!(f, "Slightly Drowsy"),
            Self::VeryDrowsy => write!(f, "Very Drowsy"),
        }
    }
}

/// Edge-triggered alarm action descriptor.
///
/// The state machine performs no I/O itself; the caller applies the returned
/// action to an [`AlarmSink`](crate::alarm::AlarmSink). `Start` and `Stop`
/// are each emitted exactly once per sustained event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AlarmAction {
    /// Nothing to do this frame
    #[default]
    None,
    /// Begin looping alarm playback
    Start,
    /// Halt alarm playback
    Stop,
}

/// Drowsiness detection parameters
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DrowsinessConfig {
    /// EAR values below this count as "eyes closed"
    pub ear_threshold: f64,

    /// Consecutive closed-eye frames required to declare very drowsy
    /// and trigger the alarm
    pub consec_frames_threshold: u32,

    /// Reset the consecutive-frame counter when a tracked face is not
    /// detected in a frame. The default keeps the counter, so a momentary
    /// detection dropout does not look like "eyes open".
    pub reset_on_lost_face: bool,
}

impl Default for DrowsinessConfig {
    fn default() -> Self {
        Self {
            ear_threshold: DEFAULT_EAR_THRESHOLD,
            consec_frames_threshold: DEFAULT_CONSEC_FRAMES,
            reset_on_lost_face: false,
        }
    }
}

impl DrowsinessConfig {
    /// Validate detection parameters
    ///
    /// # Errors
    ///
    /// Returns an error if the EAR threshold is outside (0, 1) or the frame
    /// threshold is zero.
    pub fn validate(&self) -> Result<()> {
        if !(self.ear_threshold > 0.0 && self.ear_threshold < 1.0) {
            return Err(Error::ConfigError(
                "EAR threshold must be between 0.0 and 1.0 exclusive".to_string(),
            ));
        }
        if self.consec_frames_threshold == 0 {
            return Err(Error::ConfigError(
                "Consecutive frame threshold must be greater than 0".to_string(),
            ));
        }
        Ok(())
    }
}

/// Per-frame output of the state machine
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FrameAssessment {
    /// Classification for this frame
    pub level: DrowsinessLevel,
    /// How far the counter has progressed toward the alarm threshold,
    /// rounded and clamped to 0..=100
    pub progress_percent: u8,
    /// The averaged EAR that produced this assessment
    pub avg_ear: f64,
    /// Alarm transition to apply, if any
    pub alarm_action: AlarmAction,
}

/// Per-face drowsiness state, persisting across frames.
///
/// Invariant: `alarm_on` is only ever set after the counter reached the
/// configured threshold since its last reset, and it clears only when the
/// counter resets on recovery, never by timeout.
#[derive(Debug, Clone, Copy, Default)]
pub struct DrowsinessState {
    consecutive_low_frames: u32,
    alarm_on: bool,
}

impl DrowsinessState {
    /// Create a fresh state: counter zero, alarm off, classification awake
    #[must_use]
    pub const fn new() -> Self {
        Self {
            consecutive_low_frames: 0,
            alarm_on: false,
        }
    }

    /// Current consecutive-low-EAR frame count
    #[must_use]
    pub const fn consecutive_low_frames(&self) -> u32 {
        self.consecutive_low_frames
    }

    /// Whether the alarm is currently considered active
    #[must_use]
    pub const fn alarm_on(&self) -> bool {
        self.alarm_on
    }

    /// Advance the state machine by one frame.
    ///
    /// Low EAR increments the counter and escalates the classification over
    /// two nested thresholds; the alarm starts exactly once when the counter
    /// reaches the full threshold. High EAR resets the counter in a single
    /// frame and stops the alarm exactly once if it was active.
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)] // progress is clamped to 0..=100
    pub fn update(&mut self, avg_ear: f64, config: &DrowsinessConfig) -> FrameAssessment {
        if avg_ear < config.ear_threshold {
            self.consecutive_low_frames = self.consecutive_low_frames.saturating_add(1);

            let progress = (f64::from(self.consecutive_low_frames) * 100.0
                / f64::from(config.consec_frames_threshold))
            .round()
            .clamp(0.0, 100.0) as u8;

            // Nested thresholds: the one-third rule alone never downgrades
            // a frame that already reached the full threshold.
            let level = if self.consecutive_low_frames >= config.consec_frames_threshold {
                DrowsinessLevel::VeryDrowsy
            } else if self.consecutive_low_frames > config.consec_frames_threshold / 3 {
                DrowsinessLevel::SlightlyDrowsy
            } else {
                DrowsinessLevel::Awake
            };

            let alarm_action = if level == DrowsinessLevel::VeryDrowsy && !self.alarm_on {
                self.alarm_on = true;
                AlarmAction::Start
            } else {
                AlarmAction::None
            };

            FrameAssessment {
                level,
                progress_percent: progress,
                avg_ear,
                alarm_action,
            }
        } else {
            self.consecutive_low_frames = 0;

            let alarm_action = if self.alarm_on {
                self.alarm_on = false;
                AlarmAction::Stop
            } else {
                AlarmAction::None
            };

            FrameAssessment {
                level: DrowsinessLevel::Awake,
                progress_percent: 0,
                avg_ear,
                alarm_action,
            }
        }
    }

    /// Apply the configured lost-face policy for a frame without an
    /// observation.
    ///
    /// With the default no-reset policy this is a no-op: a missed detection
    /// must not look like open eyes. With `reset_on_lost_face` the counter
    /// resets and an active alarm is stopped.
    pub fn face_lost(&mut self, config: &DrowsinessConfig) -> AlarmAction {
        if !config.reset_on_lost_face {
            return AlarmAction::None;
        }

        self.consecutive_low_frames = 0;
        if self.alarm_on {
            self.alarm_on = false;
            AlarmAction::Stop
        } else {
            AlarmAction::None
        }
    }

    /// Force the alarm flag off, returning `Stop` if it was active.
    ///
    /// Used as shutdown cleanup so an active alarm never outlives the
    /// processing loop.
    pub fn clear_alarm(&mut self) -> AlarmAction {
        if self.alarm_on {
            self.alarm_on = false;
            AlarmAction::Stop
        } else {
            AlarmAction::None
        }
    }
}
