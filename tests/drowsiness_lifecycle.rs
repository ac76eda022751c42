//! Integration tests for the drowsiness state machine and alarm lifecycle

use drowsy_watch::alarm::{self, AlarmSink};
use drowsy_watch::drowsiness::{AlarmAction, DrowsinessConfig, DrowsinessLevel, DrowsinessState};
use drowsy_watch::geometry::{EyeShape, FaceObservation, Point2D};
use drowsy_watch::monitor::FaceMonitor;

/// Alarm sink that records every call, for asserting the lifecycle
#[derive(Default)]
struct RecordingAlarm {
    calls: Vec<&'static str>,
}

impl AlarmSink for RecordingAlarm {
    fn start(&mut self) {
        self.calls.push("start");
    }
    fn stop(&mut self) {
        self.calls.push("stop");
    }
}

fn eye(openness: f64) -> EyeShape {
    EyeShape::new([
        Point2D::new(10.0, 20.0),
        Point2D::new(12.0, 20.0 + openness),
        Point2D::new(16.0, 20.0 + openness),
        Point2D::new(18.0, 20.0),
        Point2D::new(16.0, 20.0 - openness),
        Point2D::new(12.0, 20.0 - openness),
    ])
}

fn face(openness: f64) -> FaceObservation {
    FaceObservation::new(eye(openness), eye(openness))
}

#[test]
fn test_full_drowsiness_episode() {
    let config = DrowsinessConfig::default();
    let mut state = DrowsinessState::new();
    let mut sink = RecordingAlarm::default();

    // 47 closed-eye frames: slightly drowsy at most, alarm off.
    for _ in 0..47 {
        let report = state.update(0.1, &config);
        assert_ne!(report.level, DrowsinessLevel::VeryDrowsy);
        alarm::apply(report.alarm_action, &mut sink);
    }
    assert!(sink.calls.is_empty());
    assert!(!state.alarm_on());

    // Frame 48 crosses the threshold.
    let report = state.update(0.1, &config);
    assert_eq!(report.level, DrowsinessLevel::VeryDrowsy);
    assert_eq!(report.progress_percent, 100);
    alarm::apply(report.alarm_action, &mut sink);
    assert_eq!(sink.calls, vec!["start"]);

    // The alarm is sustained, not restarted, while eyes stay closed.
    for _ in 0..30 {
        let report = state.update(0.1, &config);
        assert_eq!(report.level, DrowsinessLevel::VeryDrowsy);
        alarm::apply(report.alarm_action, &mut sink);
    }
    assert_eq!(sink.calls, vec!["start"]);

    // One open-eye frame ends the episode with exactly one stop.
    let report = state.update(0.3, &config);
    assert_eq!(report.level, DrowsinessLevel::Awake);
    assert_eq!(report.progress_percent, 0);
    alarm::apply(report.alarm_action, &mut sink);
    assert_eq!(sink.calls, vec!["start", "stop"]);

    // Staying awake emits nothing further.
    for _ in 0..10 {
        let report = state.update(0.3, &config);
        alarm::apply(report.alarm_action, &mut sink);
    }
    assert_eq!(sink.calls, vec!["start", "stop"]);
}

#[test]
fn test_blinks_never_escalate() {
    let config = DrowsinessConfig::default();
    let mut state = DrowsinessState::new();

    // Alternating blink/open frames for a long stretch.
    for _ in 0..200 {
        let low = state.update(0.1, &config);
        assert_eq!(low.level, DrowsinessLevel::Awake);
        assert_eq!(low.alarm_action, AlarmAction::None);

        let high = state.update(0.3, &config);
        assert_eq!(high.level, DrowsinessLevel::Awake);
        assert_eq!(high.alarm_action, AlarmAction::None);
    }
}

#[test]
fn test_detection_dropout_does_not_reset_progress() {
    let mut monitor = FaceMonitor::new(DrowsinessConfig::default());
    let mut sink = RecordingAlarm::default();

    // 40 closed-eye frames, then a detection dropout, then 8 more.
    for _ in 0..40 {
        for action in monitor.observe(&[face(0.2)]).alarm_actions {
            alarm::apply(action, &mut sink);
        }
    }
    for _ in 0..12 {
        let summary = monitor.observe(&[]);
        assert!(summary.alarm_actions.is_empty());
    }
    for _ in 0..7 {
        for action in monitor.observe(&[face(0.2)]).alarm_actions {
            alarm::apply(action, &mut sink);
        }
    }
    assert!(sink.calls.is_empty());

    // The 48th observed low frame triggers, proving the counter survived
    // the dropout.
    let summary = monitor.observe(&[face(0.2)]);
    assert_eq!(summary.reports[0].assessment.level, DrowsinessLevel::VeryDrowsy);
    for action in summary.alarm_actions {
        alarm::apply(action, &mut sink);
    }
    assert_eq!(sink.calls, vec!["start"]);
}

#[test]
fn test_custom_thresholds() {
    let config = DrowsinessConfig {
        ear_threshold: 0.3,
        consec_frames_threshold: 6,
        reset_on_lost_face: false,
    };
    let mut state = DrowsinessState::new();

    // 6 / 3 = 2, so escalation starts on the third low frame.
    let levels: Vec<_> = (0..6).map(|_| state.update(0.25, &config).level).collect();
    assert_eq!(
        levels,
        vec![
            DrowsinessLevel::Awake,
            DrowsinessLevel::Awake,
            DrowsinessLevel::SlightlyDrowsy,
            DrowsinessLevel::SlightlyDrowsy,
            DrowsinessLevel::SlightlyDrowsy,
            DrowsinessLevel::VeryDrowsy,
        ]
    );
}

#[test]
fn test_shutdown_silences_active_alarm() {
    let mut monitor = FaceMonitor::new(DrowsinessConfig::default());
    let mut sink = RecordingAlarm::default();

    for _ in 0..50 {
        for action in monitor.observe(&[face(0.2)]).alarm_actions {
            alarm::apply(action, &mut sink);
        }
    }
    assert_eq!(sink.calls, vec!["start"]);

    // Shutdown cleanup stops the alarm even without a recovery frame.
    alarm::apply(monitor.finish(), &mut sink);
    assert_eq!(sink.calls, vec!["start", "stop"]);
}

#[test]
fn test_progress_tracks_counter_fraction() {
    let config = DrowsinessConfig::default();
    let mut state = DrowsinessState::new();

    // 24 of 48 frames is exactly half way.
    let mut last = 0;
    for _ in 0..24 {
        last = state.update(0.1, &config).progress_percent;
    }
    assert_eq!(last, 50);

    // Progress saturates at 100 well past the threshold.
    for _ in 0..100 {
        last = state.update(0.1, &config).progress_percent;
    }
    assert_eq!(last, 100);
}
