use super::*;
use crate::test_support::capture_logs;

fn metrics(fps: f64, count: usize, complexity: f64) -> FrameMetrics {
    FrameMetrics {
        fps,
        primitive_count: count,
        complexity,
        memory_mb: count as f64 * 0.002,
    }
}

#[test]
fn starts_on_scene_graph_at_high_quality() {
    let c = ModeController::default();
    assert_eq!(c.backend(), BackendKind::SceneGraph);
    assert_eq!(c.quality(), Quality::High);
    assert_eq!(c.cooldown_remaining(), 0);
}

#[test]
fn light_load_stays_scene_graph_ultra() {
    let mut c = ModeController::default();
    for _ in 0..300 {
        let d = c.evaluate(&metrics(60.0, 50, 0.2));
        assert_eq!(d.backend, BackendKind::SceneGraph);
        assert_eq!(d.quality, Quality::Ultra);
        assert!(!d.switched);
        assert_eq!(d.reason, DecisionReason::Steady);
    }
}

#[test]
fn heavy_load_switches_and_holds_through_cooldown() {
    let mut c = ModeController::default();
    let d = c.evaluate(&metrics(18.0, 1500, 0.5));
    assert_eq!(d.backend, BackendKind::Raster);
    assert_eq!(d.quality, Quality::Performance);
    assert!(d.switched);
    assert_eq!(
        d.reason,
        DecisionReason::LowFps {
            fps: 18.0,
            min_fps: 30.0
        }
    );
    assert_eq!(d.cooldown_remaining, 180);

    // fps recovers on frame 2 and the load disappears; the backend still holds.
    for frame in 2..=180 {
        let d = c.evaluate(&metrics(60.0, 50, 0.1));
        assert_eq!(d.backend, BackendKind::Raster, "frame {frame}");
        assert!(!d.switched);
        assert!(matches!(d.reason, DecisionReason::Cooldown { .. }));
    }

    let d = c.evaluate(&metrics(60.0, 50, 0.1));
    assert_eq!(d.backend, BackendKind::SceneGraph);
    assert_eq!(d.reason, DecisionReason::Recovered);
    assert!(d.switched);
}

#[test]
fn oscillating_fps_switches_at_most_once_per_cooldown() {
    let cfg = ControllerConfig::default();
    let cooldown = cfg.cooldown_frames as usize;
    let mut c = ModeController::new(cfg, QualityPolicy::default());
    let mut switch_frames = Vec::new();
    for frame in 0..2000usize {
        let fps = if frame % 2 == 0 { 20.0 } else { 59.0 };
        if c.evaluate(&metrics(fps, 100, 0.2)).switched {
            switch_frames.push(frame);
        }
    }
    assert!(!switch_frames.is_empty());
    for pair in switch_frames.windows(2) {
        assert!(pair[1] - pair[0] >= cooldown, "{switch_frames:?}");
    }
}

#[test]
fn forward_trigger_does_not_satisfy_reverse() {
    // A count past the forward threshold flips to raster; holding that same count never
    // flips back, because the reverse threshold is stricter.
    let mut c = ModeController::default();
    let d = c.evaluate(&metrics(60.0, 1001, 0.2));
    assert_eq!(d.backend, BackendKind::Raster);
    assert_eq!(
        d.reason,
        DecisionReason::TooManyPrimitives {
            count: 1001,
            max: 1000
        }
    );
    for _ in 0..1000 {
        assert_eq!(c.evaluate(&metrics(60.0, 1001, 0.2)).backend, BackendKind::Raster);
    }
    // Between the reverse and forward thresholds: no forward trigger, no reverse either.
    for _ in 0..500 {
        assert_eq!(c.evaluate(&metrics(60.0, 900, 0.2)).backend, BackendKind::Raster);
    }
    assert_eq!(c.evaluate(&metrics(60.0, 799, 0.2)).backend, BackendKind::SceneGraph);
}

#[test]
fn values_exactly_at_a_forward_threshold_trigger_but_never_reverse() {
    let cfg = ControllerConfig {
        cooldown_frames: 0,
        ..ControllerConfig::default()
    };
    let calm = FrameMetrics {
        fps: 60.0,
        primitive_count: 10,
        complexity: 0.1,
        memory_mb: 0.1,
    };
    let at_threshold = [
        FrameMetrics { fps: 30.0, ..calm },
        FrameMetrics {
            primitive_count: 1000,
            ..calm
        },
        FrameMetrics {
            complexity: 0.8,
            ..calm
        },
        FrameMetrics {
            memory_mb: 50.0,
            ..calm
        },
    ];
    for m in at_threshold {
        let mut c = ModeController::new(cfg.clone(), QualityPolicy::default());
        let d = c.evaluate(&m);
        assert_eq!(d.backend, BackendKind::Raster, "{m:?}");
        assert!(d.switched);
        // Cooldown is off, so only the reverse criteria keep it on raster.
        for _ in 0..50 {
            assert_eq!(c.evaluate(&m).backend, BackendKind::Raster, "{m:?}");
        }
        assert_eq!(c.evaluate(&calm).backend, BackendKind::SceneGraph);
    }
}

#[test]
fn reasons_follow_criterion_order() {
    let mut c = ModeController::default();
    let d = c.evaluate(&FrameMetrics {
        fps: 60.0,
        primitive_count: 10,
        complexity: 0.95,
        memory_mb: 80.0,
    });
    assert!(matches!(d.reason, DecisionReason::HighComplexity { .. }));

    c.reset();
    let d = c.evaluate(&FrameMetrics {
        fps: 60.0,
        primitive_count: 10,
        complexity: 0.1,
        memory_mb: 80.0,
    });
    assert!(matches!(d.reason, DecisionReason::HighMemory { .. }));
    assert_eq!(d.reason.to_string(), "memory 80.0MB above 50.0MB");
}

#[test]
fn reverse_requires_every_criterion() {
    let mut c = ModeController::new(
        ControllerConfig {
            cooldown_frames: 0,
            ..ControllerConfig::default()
        },
        QualityPolicy::default(),
    );
    c.evaluate(&metrics(10.0, 10, 0.1));
    assert_eq!(c.backend(), BackendKind::Raster);
    // fps good but not above 0.9 * 60.
    assert_eq!(c.evaluate(&metrics(54.0, 10, 0.1)).backend, BackendKind::Raster);
    // complexity not under 0.8 * 0.8.
    assert_eq!(c.evaluate(&metrics(60.0, 10, 0.65)).backend, BackendKind::Raster);
    assert_eq!(c.evaluate(&metrics(60.0, 10, 0.63)).backend, BackendKind::SceneGraph);
}

#[test]
fn forcing_bypasses_cooldown_and_restarts_it() {
    let mut c = ModeController::default();
    c.evaluate(&metrics(10.0, 10, 0.1));
    assert_eq!(c.backend(), BackendKind::Raster);
    assert!(c.cooldown_remaining() > 0);

    c.force_backend(Some(BackendKind::SceneGraph));
    let d = c.evaluate(&metrics(10.0, 10, 0.1));
    assert_eq!(d.backend, BackendKind::SceneGraph);
    assert!(d.switched);
    assert_eq!(d.reason, DecisionReason::Forced);
    assert_eq!(d.cooldown_remaining, 180);

    // Terrible metrics, still pinned.
    let d = c.evaluate(&metrics(1.0, 9000, 1.0));
    assert_eq!(d.backend, BackendKind::SceneGraph);
    assert_eq!(d.quality, Quality::Performance);

    c.force_backend(None);
    let d = c.evaluate(&metrics(1.0, 9000, 1.0));
    assert_eq!(d.backend, BackendKind::SceneGraph);
    assert!(matches!(d.reason, DecisionReason::Cooldown { .. }));
}

#[test]
fn reset_restores_initial_state() {
    let mut c = ModeController::default();
    c.force_backend(Some(BackendKind::Raster));
    c.evaluate(&metrics(60.0, 10, 0.1));
    c.reset();
    assert_eq!(c.backend(), BackendKind::SceneGraph);
    assert_eq!(c.quality(), Quality::High);
    assert_eq!(c.cooldown_remaining(), 0);
    assert_eq!(c.forced(), None);
}

#[test]
fn switch_is_logged_with_fields() {
    let (_, logs) = capture_logs(|| {
        let mut c = ModeController::default();
        c.evaluate(&metrics(18.0, 1500, 0.5));
    });
    assert!(logs.contains("render backend switched"), "{logs}");
    assert!(logs.contains("from=scene_graph"), "{logs}");
    assert!(logs.contains("to=raster"), "{logs}");
}
