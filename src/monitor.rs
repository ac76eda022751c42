//! Per-face monitoring session.
//!
//! Wraps the EAR estimator and the drowsiness state machine for zero or more
//! faces per frame. Faces are tracked by detection-order slot; cross-frame
//! re-identification is out of scope, so stable slots require a stable
//! detector ordering.

use log::warn;

use crate::drowsiness::{AlarmAction, DrowsinessConfig, DrowsinessState, FrameAssessment};
use crate::geometry::FaceObservation;

/// Assessment for one observed face in one frame
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FaceReport {
    /// Detection-order slot of the face
    pub slot: usize,
    /// The state machine output for this frame
    pub assessment: FrameAssessment,
}

/// Everything the presentation layer needs from one processed frame
#[derive(Debug, Clone, Default)]
pub struct FrameSummary {
    /// One report per face that produced a valid EAR, in detection order
    pub reports: Vec<FaceReport>,
    /// Alarm transitions to apply this frame, including stops from
    /// lost-face resets. `AlarmAction::None` entries are omitted.
    pub alarm_actions: Vec<AlarmAction>,
}

/// Drives one [`DrowsinessState`] per tracked face slot.
pub struct FaceMonitor {
    config: DrowsinessConfig,
    states: Vec<DrowsinessState>,
}

impl FaceMonitor {
    /// Create a monitor with the given detection parameters
    #[must_use]
    pub fn new(config: DrowsinessConfig) -> Self {
        Self {
            config,
            states: Vec::new(),
        }
    }

    /// The detection parameters in use
    #[must_use]
    pub const fn config(&self) -> &DrowsinessConfig {
        &self.config
    }

    /// Number of face slots currently tracked
    #[must_use]
    pub fn tracked_faces(&self) -> usize {
        self.states.len()
    }

    /// Read-only view of a slot's state, if it exists
    #[must_use]
    pub fn state(&self, slot: usize) -> Option<&DrowsinessState> {
        self.states.get(slot)
    }

    /// Process one frame's worth of face observations.
    ///
    /// Each observed face advances its slot's state machine. A face whose
    /// eye geometry is degenerate is skipped for the frame and keeps its
    /// previous state. Slots with no observation this frame follow the
    /// configured lost-face policy.
    pub fn observe(&mut self, faces: &[FaceObservation]) -> FrameSummary {
        if self.states.len() < faces.len() {
            self.states.resize_with(faces.len(), DrowsinessState::default);
        }

        let mut summary = FrameSummary::default();

        for (slot, face) in faces.iter().enumerate() {
            match face.average_ear() {
                Ok(avg_ear) => {
                    let assessment = self.states[slot].update(avg_ear, &self.config);
                    if assessment.alarm_action != AlarmAction::None {
                        summary.alarm_actions.push(assessment.alarm_action);
                    }
                    summary.reports.push(FaceReport { slot, assessment });
                }
                Err(e) => {
                    // Skip classification for this face; previous state is
                    // retained, matching the lost-detection policy.
                    warn!("Skipping face {slot}: {e}");
                }
            }
        }

        // Previously tracked slots that produced no observation this frame.
        for state in self.states.iter_mut().skip(faces.len()) {
            let action = state.face_lost(&self.config);
            if action != AlarmAction::None {
                summary.alarm_actions.push(action);
            }
        }

        summary
    }

    /// Shutdown cleanup: clear every active alarm flag.
    ///
    /// Returns `Stop` if any slot had an active alarm, so the caller can
    /// silence the sink before the processing loop ends.
    pub fn finish(&mut self) -> AlarmAction {
        let mut any_active = false;
        for state in &mut self.states {
            if state.clear_alarm() == AlarmAction::Stop {
                any_active = true;
            }
        }
        if any_active {
            AlarmAction::Stop
        } else {
            AlarmAction::None
        }
    }
}
