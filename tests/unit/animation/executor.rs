use super::*;
use crate::animation::props::props_from_value;
use crate::foundation::core::VectorId;
use crate::test_support::{AlwaysErr, Counter, Panics, Reorders, Spin, capture_logs, ctx, row};
use serde_json::json;

fn executor() -> Executor {
    let mut r = AnimationRegistry::new();
    r.register(Arc::new(Spin));
    r.register(Arc::new(AlwaysErr));
    r.register(Arc::new(Panics));
    r.register(Arc::new(Reorders));
    Executor::new(r)
}

#[test]
fn unknown_id_returns_input_unchanged_and_warns() {
    let mut ex = executor();
    let input = row(4);
    let (out, logs) = capture_logs(|| ex.execute("doesNotExist", &input, &AnimationProps::new(), &ctx()));
    assert_eq!(out, input);
    assert!(logs.contains("unknown animation module"), "logs: {logs}");
    assert!(logs.contains("doesNotExist"));
    assert_eq!(ex.stats().registry_misses, 1);
    assert_eq!(ex.stats().executions, 0);
}

#[test]
fn try_execute_reports_registry_miss() {
    let mut ex = executor();
    let err = ex
        .try_execute(InstanceId(0), "nope", &row(1), &AnimationProps::new(), &ctx())
        .unwrap_err();
    assert!(matches!(err, VecfieldError::RegistryMiss(ref id) if id == "nope"));
}

#[test]
fn output_is_new_and_shape_preserving() {
    let mut ex = executor();
    let input = row(16);
    let props = props_from_value(json!({"step": 0.5}));
    let out = ex.execute("spin", &input, &props, &ctx());
    assert_eq!(out.len(), input.len());
    for (a, b) in input.iter().zip(&out) {
        assert_eq!(a.id, b.id);
        assert_eq!(a.origin(), b.origin());
        assert_eq!(a.angle, 0.0);
        assert!((b.angle - 0.5).abs() < 1e-12);
    }
}

#[test]
fn invalid_props_merge_over_defaults() {
    let mut ex = executor();
    // "step" is missing entirely; merging supplies the default 0.1 and keeps the extra key.
    let props = props_from_value(json!({"unrelated": 1}));
    let (merged, how) = resolve_props(ex.registry().get("spin").unwrap().as_ref(), &props);
    assert_eq!(how, PropsResolution::MergedWithDefaults);
    assert_eq!(merged.get("unrelated"), Some(&json!(1)));

    let out = ex.execute("spin", &row(2), &props, &ctx());
    assert!((out[0].angle - 0.1).abs() < 1e-12);
    assert_eq!(ex.stats().validation_fallbacks, 1);
}

#[test]
fn props_still_invalid_after_merge_fall_back_to_defaults() {
    let ex = executor();
    let props = props_from_value(json!({"step": 7.0, "unrelated": 1}));
    let module = ex.registry().get("spin").unwrap().clone();
    let ((resolved, how), logs) = capture_logs(|| resolve_props(module.as_ref(), &props));
    assert_eq!(how, PropsResolution::DefaultsOnly);
    assert_eq!(resolved, module.default_props());
    assert!(logs.contains("using defaults"), "logs: {logs}");
}

#[test]
fn errors_panics_and_shape_violations_fail_open() {
    let mut ex = executor();
    let input = row(5);
    for id in ["always-err", "panics", "reorders"] {
        let out = ex.execute(id, &input, &AnimationProps::new(), &ctx());
        assert_eq!(out, input, "{id} must pass input through");
        let err = ex
            .try_execute(InstanceId(0), id, &input, &AnimationProps::new(), &ctx())
            .unwrap_err();
        assert!(matches!(err, VecfieldError::Execution { .. }), "{id}: {err}");
    }
    assert_eq!(ex.stats().faults, 6);
}

#[test]
fn fault_is_logged_with_module_id() {
    let mut ex = executor();
    let (_, logs) = capture_logs(|| ex.execute("always-err", &row(1), &AnimationProps::new(), &ctx()));
    assert!(logs.contains("animation module fault"), "logs: {logs}");
    assert!(logs.contains("always-err"));
}

#[test]
fn anchor_rewrites_are_rejected() {
    struct Mover;
    impl AnimationModule for Mover {
        fn id(&self) -> &str {
            "mover"
        }
        fn default_props(&self) -> AnimationProps {
            AnimationProps::new()
        }
        fn animate(
            &self,
            vectors: &[VectorState],
            _props: &AnimationProps,
            _ctx: &AnimationContext,
            _scratch: &mut ModuleScratch,
        ) -> VecfieldResult<Vec<VectorState>> {
            // Rebuilding from scratch is the only way to move an anchor.
            Ok(vectors
                .iter()
                .map(|v| VectorState::new(v.id, crate::foundation::core::Point::new(-1.0, -1.0)))
                .collect())
        }
    }

    let mut ex = executor();
    ex.register(Arc::new(Mover));
    let input = row(3);
    assert_eq!(ex.execute("mover", &input, &AnimationProps::new(), &ctx()), input);
}

#[test]
fn scratch_is_scoped_per_instance() {
    let counter = Arc::new(Counter::default());
    let mut ex = executor();
    ex.register(counter.clone());

    let input = row(2);
    let a = InstanceId(1);
    let b = InstanceId(2);
    for _ in 0..3 {
        ex.execute_for(a, "counter", &input, &AnimationProps::new(), &ctx());
    }
    let out_b = ex.execute_for(b, "counter", &input, &AnimationProps::new(), &ctx());
    let out_a = ex.execute_for(a, "counter", &input, &AnimationProps::new(), &ctx());

    assert_eq!(out_b[0].angle, 1.0);
    assert_eq!(out_a[0].angle, 4.0);
    assert_eq!(*counter.inits.lock().unwrap(), 2);
    assert_eq!(ex.scratch_count(), 2);

    ex.release_instance(a);
    assert_eq!(*counter.destroys.lock().unwrap(), 1);
    let again = ex.execute_for(a, "counter", &input, &AnimationProps::new(), &ctx());
    assert_eq!(again[0].angle, 1.0);
}

#[test]
fn unregister_and_reset_run_destroy_hooks() {
    let counter = Arc::new(Counter::default());
    let mut ex = executor();
    ex.register(counter.clone());
    ex.execute_for(InstanceId(1), "counter", &row(1), &AnimationProps::new(), &ctx());
    ex.execute_for(InstanceId(2), "counter", &row(1), &AnimationProps::new(), &ctx());

    ex.unregister("counter");
    assert_eq!(*counter.destroys.lock().unwrap(), 2);
    assert_eq!(ex.scratch_count(), 0);

    ex.register(counter.clone());
    ex.execute("counter", &row(1), &AnimationProps::new(), &ctx());
    ex.reset();
    assert_eq!(*counter.destroys.lock().unwrap(), 3);
    assert_eq!(ex.stats(), ExecutorStats::default());
}

#[test]
fn ids_survive_every_module() {
    let mut ex = Executor::new(AnimationRegistry::with_builtins());
    let input = row(12);
    let ids: Vec<String> = ex.registry().ids();
    for id in ids {
        for frame in 0..4 {
            let c = ctx().at_frame(frame, 60.0);
            let out = ex.execute(&id, &input, &AnimationProps::new(), &c);
            assert_eq!(out.len(), input.len());
            assert!(out.iter().zip(&input).all(|(a, b)| a.id == b.id));
        }
    }
    assert_eq!(input[3].id, VectorId(3));
    assert_eq!(ex.stats().faults, 0);
}
