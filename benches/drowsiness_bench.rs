//! Benchmarks for the per-frame hot path: EAR estimation and the state
//! machine update.

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use drowsy_watch::drowsiness::{DrowsinessConfig, DrowsinessState};
use drowsy_watch::geometry::{EyeShape, FaceObservation, Point2D};
use drowsy_watch::monitor::FaceMonitor;

fn sample_face(openness: f64) -> FaceObservation {
    let eye = EyeShape::new([
        Point2D::new(100.0, 200.0),
        Point2D::new(110.0, 200.0 + openness),
        Point2D::new(130.0, 200.0 + openness),
        Point2D::new(140.0, 200.0),
        Point2D::new(130.0, 200.0 - openness),
        Point2D::new(110.0, 200.0 - openness),
    ]);
    FaceObservation::new(eye, eye)
}

fn bench_ear(c: &mut Criterion) {
    let face = sample_face(8.0);

    c.bench_function("average_ear", |b| {
        b.iter(|| black_box(face).average_ear().unwrap());
    });
}

fn bench_state_machine(c: &mut Criterion) {
    let config = DrowsinessConfig::default();

    c.bench_function("state_machine_update", |b| {
        let mut state = DrowsinessState::new();
        let mut ear = 0.1;
        b.iter(|| {
            // Alternate between drowsy runs and recovery so both branches
            // are exercised.
            ear = if ear < 0.25 { 0.3 } else { 0.1 };
            state.update(black_box(ear), &config)
        });
    });
}

fn bench_monitor_frame(c: &mut Criterion) {
    let faces = [sample_face(2.0), sample_face(8.0)];

    c.bench_function("monitor_observe_two_faces", |b| {
        let mut monitor = FaceMonitor::new(DrowsinessConfig::default());
        b.iter(|| monitor.observe(black_box(&faces)));
    });
}

criterion_group!(benches, bench_ear, bench_state_machine, bench_monitor_frame);
criterion_main!(benches);
