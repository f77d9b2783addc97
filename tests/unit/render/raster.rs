use super::*;
use crate::control::quality::Quality;
use crate::foundation::core::{Point, VectorId};
use std::sync::Arc;

use crate::control::controller::BackendKind;
use crate::model::paint::{GradientKind, GradientSpec, GradientStop, Paint};
use crate::render::geometry::subpaths;
use crate::model::surface::BaseShape;
use crate::render::sink::{DrawPaint, RecordingSink};

fn field(n: u32) -> Vec<VectorState> {
    let palette = [
        Rgba8::rgb(240, 80, 80),
        Rgba8::rgb(80, 240, 80),
        Rgba8::rgb(80, 80, 240),
    ];
    (0..n)
        .map(|i| {
            VectorState::new(
                VectorId(i),
                Point::new(f64::from(i % 20) * 16.0 + 8.0, f64::from(i / 20) * 16.0 + 8.0),
            )
            .with_angle(f64::from(i) * 0.37)
            .with_length(12.0)
            .with_width(if i % 4 == 0 { 2.0 } else { 1.0 })
            .with_paint(palette[(i % 3) as usize])
        })
        .collect()
}

#[test]
fn strategy_follows_threshold_and_quality() {
    let high = Quality::High.settings();
    let perf = Quality::Performance.settings();
    assert_eq!(choose_strategy(&high, 100, 100), RasterStrategy::Direct);
    assert_eq!(choose_strategy(&high, 101, 100), RasterStrategy::Batched);
    assert_eq!(choose_strategy(&perf, 5000, 100), RasterStrategy::Direct);
    assert_eq!(visible_count(5, &perf), 3);
}

#[test]
fn direct_and_batched_produce_same_subpaths() {
    for shape in [
        BaseShape::Line,
        BaseShape::Arrow,
        BaseShape::Triangle,
        BaseShape::Curve,
        BaseShape::Dot,
    ] {
        let surface = SurfaceConfig::new(320, 320).with_shape(shape);
        let q = Quality::High.settings();
        let v = field(300);

        let mut direct = RecordingSink::new();
        let a = draw_direct(&mut direct, &v, &surface, &q);
        let mut batched = RecordingSink::new();
        let b = draw_batched(&mut batched, &v, &surface, &q);

        assert_eq!(a.drawn, b.drawn);
        assert_eq!(direct.canonical_subpaths(), batched.canonical_subpaths(), "{shape:?}");
        assert!(b.draw_calls < a.draw_calls, "{shape:?}");
    }
}

#[test]
fn batches_by_style_in_first_seen_order() {
    let surface = SurfaceConfig::new(320, 320);
    let q = Quality::High.settings();
    let mut sink = RecordingSink::new();
    let stats = draw_batched(&mut sink, &field(12), &surface, &q);
    // 3 colors x 2 widths.
    assert_eq!(stats.draw_calls, 6);
    assert_eq!(sink.calls.len(), 6);
    assert_eq!(sink.calls[0].paint, DrawPaint::Solid(Rgba8::rgb(240, 80, 80)));
    assert_eq!(sink.calls[0].width, 2.0);
    assert_eq!(sink.calls[1].paint, DrawPaint::Solid(Rgba8::rgb(80, 240, 80)));
    assert_eq!(sink.calls[1].width, 1.0);
}

#[test]
fn stride_hides_and_non_finite_is_counted() {
    let surface = SurfaceConfig::new(320, 320);
    let q = Quality::Performance.settings();
    let mut v = field(10);
    v[2].angle = f64::NAN;
    let mut sink = RecordingSink::new();
    let stats = draw_direct(&mut sink, &v, &surface, &q);
    assert_eq!(stats.hidden, 5);
    assert_eq!(stats.faulted, 1);
    assert_eq!(stats.drawn, 4);
    assert_eq!(sink.calls.len(), 4);
}

#[test]
fn opacity_scales_solid_alpha() {
    let surface = SurfaceConfig::new(64, 64);
    let q = Quality::High.settings();
    let mut v = VectorState::new(VectorId(0), Point::new(10.0, 10.0))
        .with_paint(Rgba8::rgb(200, 100, 50));
    v.opacity = 0.5;
    let mut sink = RecordingSink::new();
    draw_direct(&mut sink, &[v], &surface, &q);
    assert_eq!(sink.calls[0].paint, DrawPaint::Solid(Rgba8::new(200, 100, 50, 128)));
}

#[test]
fn gradients_run_from_anchor_to_tip() {
    let surface = SurfaceConfig::new(64, 64);
    let q = Quality::High.settings();
    let spec = Arc::new(GradientSpec::linear(
        Rgba8::rgb(0, 0, 0),
        Rgba8::rgb(200, 100, 50),
    ));
    let mut v = VectorState::new(VectorId(0), Point::new(10.0, 10.0))
        .with_length(20.0)
        .with_angle(std::f64::consts::FRAC_PI_2)
        .with_paint(Paint::Gradient(Arc::clone(&spec)));
    v.opacity = 0.5;
    let mut sink = RecordingSink::new();
    draw_direct(&mut sink, &[v], &surface, &q);

    let DrawPaint::Gradient {
        spec: got,
        opacity,
        from,
        to,
    } = &sink.calls[0].paint
    else {
        panic!("expected a gradient paint, got {:?}", sink.calls[0].paint);
    };
    assert!(Arc::ptr_eq(got, &spec));
    assert_eq!(*opacity, 0.5);
    assert_eq!(*from, Point::new(10.0, 10.0));
    assert!((to.x - 10.0).abs() < 1e-9 && (to.y - 30.0).abs() < 1e-9, "{to:?}");
    assert_eq!(sink.calls[0].paint.flat_color(), Rgba8::new(100, 50, 25, 128));
}

#[test]
fn degenerate_gradients_fall_back_to_their_mean() {
    let one_stop = GradientSpec {
        kind: GradientKind::Radial,
        stops: vec![GradientStop {
            offset: 0.3,
            color: Rgba8::rgb(10, 20, 30),
        }],
    };
    let v = VectorState::new(VectorId(0), Point::new(4.0, 4.0))
        .with_paint(Paint::Gradient(Arc::new(one_stop)));
    assert_eq!(DrawPaint::for_vector(&v), DrawPaint::Solid(Rgba8::rgb(10, 20, 30)));

    let flat = VectorState::new(VectorId(1), Point::new(4.0, 4.0))
        .with_length(0.0)
        .with_paint(Paint::Gradient(Arc::new(GradientSpec::linear(
            Rgba8::rgb(0, 0, 0),
            Rgba8::rgb(200, 100, 50),
        ))));
    assert_eq!(DrawPaint::for_vector(&flat), DrawPaint::Solid(Rgba8::rgb(100, 50, 25)));
}

#[test]
fn batching_keeps_gradient_axes_apart() {
    let surface = SurfaceConfig::new(320, 320);
    let q = Quality::High.settings();
    let spec = Arc::new(GradientSpec::linear(Rgba8::rgb(255, 0, 0), Rgba8::rgb(0, 0, 255)));
    let at = |i: u32, x: f64| {
        VectorState::new(VectorId(i), Point::new(x, 40.0))
            .with_length(30.0)
            .with_paint(Paint::Gradient(Arc::clone(&spec)))
    };
    // Two coincident primitives share a call; the third has its own axis.
    let v = vec![at(0, 20.0), at(1, 20.0), at(2, 120.0)];
    let mut sink = RecordingSink::new();
    let stats = draw_batched(&mut sink, &v, &surface, &q);
    assert_eq!(stats.draw_calls, 2);
    assert_eq!(subpaths(&sink.calls[0].path).len(), 2);
    let DrawPaint::Gradient { from, .. } = &sink.calls[1].paint else {
        panic!("expected a gradient paint");
    };
    assert_eq!(from.x, 120.0);
}

#[test]
fn backend_paints_gradients_along_the_primitive() {
    let surface = SurfaceConfig::new(80, 16).with_background(Rgba8::rgb(0, 0, 0));
    let v = vec![
        VectorState::new(VectorId(0), Point::new(10.0, 8.0))
            .with_length(60.0)
            .with_width(6.0)
            .with_paint(Paint::Gradient(Arc::new(GradientSpec::linear(
                Rgba8::rgb(255, 0, 0),
                Rgba8::rgb(0, 0, 255),
            )))),
    ];
    let mut b = RasterBackend::default();
    b.draw(&DrawRequest {
        vectors: &v,
        surface: &surface,
        quality: Quality::High.settings(),
        overlay: None,
    })
    .unwrap();
    let frame = b.read_frame().unwrap();
    let near_anchor = frame.pixel(14, 8).unwrap();
    let near_tip = frame.pixel(66, 8).unwrap();
    assert!(near_anchor[0] > 180 && near_anchor[2] < 80, "{near_anchor:?}");
    assert!(near_tip[2] > 180 && near_tip[0] < 80, "{near_tip:?}");
}

fn overlay() -> DebugOverlay {
    DebugOverlay {
        backend: BackendKind::Raster,
        quality: Quality::Medium,
        fps: Some(42.04),
        primitive_count: 1200,
        complexity: 0.61,
        memory_mb: 2.4,
    }
}

#[test]
fn overlay_label_carries_every_metric() {
    let mut sink = RecordingSink::new();
    draw_overlay(&mut sink, &overlay());
    assert_eq!(sink.texts.len(), 1);
    let label = &sink.texts[0];
    for field in ["raster", "medium", "fps 42.0", "n 1200", "cx 0.61", "mem 2.4MB"] {
        assert!(label.text.contains(field), "{field} missing from {:?}", label.text);
    }
    assert!(overlay().panel().contains(label.origin));
    // Panel plus three tracks and three fills.
    assert_eq!(sink.calls.len(), 7);
}

#[test]
fn backend_draws_overlay_label_glyphs() {
    let surface = SurfaceConfig::new(420, 80).with_background(Rgba8::rgb(0, 0, 0));
    let draw = |b: &mut RasterBackend, overlay: Option<&DebugOverlay>| {
        b.draw(&DrawRequest {
            vectors: &[],
            surface: &surface,
            quality: Quality::High.settings(),
            overlay,
        })
        .unwrap();
        b.read_frame().unwrap()
    };
    let mut b = RasterBackend::default();
    if !b.has_label_font() {
        return;
    }
    let o = overlay();
    let frame = draw(&mut b, Some(&o));
    // The label band sits between the panel top and the first meter.
    let lit = (16..380)
        .flat_map(|x| (13..28).map(move |y| (x, y)))
        .filter(|&(x, y)| frame.pixel(x, y).is_some_and(|p| p[0] > 120))
        .count();
    assert!(lit > 20, "only {lit} label pixels lit");

    let mut missing = RasterBackend::new(RasterOpts {
        overlay_font: Some("/nonexistent/overlay.ttf".into()),
        ..RasterOpts::default()
    });
    assert!(!missing.has_label_font());
    let bare = draw(&mut missing, Some(&o));
    assert_eq!(bare.pixel(40, 18), bare.pixel(200, 18));
}

#[test]
fn aliased_output_lands_on_pixel_grid() {
    let surface = SurfaceConfig::new(64, 64);
    let q = Quality::Performance.settings();
    let v = VectorState::new(VectorId(0), Point::new(10.3, 10.6))
        .with_angle(0.3)
        .with_width(1.4);
    let mut sink = RecordingSink::new();
    draw_direct(&mut sink, &[v], &surface, &q);
    let call = &sink.calls[0];
    assert_eq!(call.width, 1.0);
    for el in call.path.elements() {
        if let kurbo::PathEl::MoveTo(p) | kurbo::PathEl::LineTo(p) = el {
            assert_eq!(p.x, p.x.round());
            assert_eq!(p.y, p.y.round());
        }
    }
}

#[test]
fn backend_paints_background_and_primitives() {
    let surface = SurfaceConfig::new(32, 32).with_background(Rgba8::rgb(0, 0, 255));
    let v = vec![
        VectorState::new(VectorId(0), Point::new(4.0, 16.0))
            .with_length(24.0)
            .with_width(4.0)
            .with_paint(Rgba8::rgb(255, 0, 0)),
    ];
    let mut b = RasterBackend::default();
    let stats = b
        .draw(&DrawRequest {
            vectors: &v,
            surface: &surface,
            quality: Quality::High.settings(),
            overlay: None,
        })
        .unwrap();
    assert_eq!(stats.strategy, Some(RasterStrategy::Direct));
    assert_eq!(stats.drawn, 1);
    let frame = b.read_frame().unwrap();
    assert_eq!((frame.width, frame.height), (32, 32));
    assert_eq!(frame.pixel(1, 1), Some([0, 0, 255, 255]));
    let mid = frame.pixel(16, 16).unwrap();
    assert!(mid[0] > 200 && mid[2] < 60, "{mid:?}");
}

#[test]
fn oversized_surface_is_a_backend_error() {
    let surface = SurfaceConfig::new(70_000, 10);
    let mut b = RasterBackend::default();
    let err = b
        .draw(&DrawRequest {
            vectors: &[],
            surface: &surface,
            quality: Quality::High.settings(),
            overlay: None,
        })
        .unwrap_err();
    assert!(!err.is_recoverable());
    assert!(err.to_string().starts_with("backend error:"));
}

#[test]
fn release_drops_the_surface() {
    let surface = SurfaceConfig::new(8, 8);
    let mut b = RasterBackend::default();
    b.draw(&DrawRequest {
        vectors: &[],
        surface: &surface,
        quality: Quality::High.settings(),
        overlay: None,
    })
    .unwrap();
    b.release();
    assert!(b.read_frame().is_err());
}
