use std::collections::HashMap;

use super::*;

fn env(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
    let map: HashMap<String, String> = pairs
        .iter()
        .map(|(k, v)| ((*k).to_owned(), (*v).to_owned()))
        .collect();
    move |k| map.get(k).cloned()
}

#[test]
fn empty_json_is_all_defaults() {
    assert_eq!(PipelineOpts::from_json_str("{}").unwrap(), PipelineOpts::default());
}

#[test]
fn nested_partial_json() {
    let opts = PipelineOpts::from_json_str(
        r#"{"controller": {"cooldown_frames": 10}, "raster": {"batch_threshold": 5}, "instance": 3}"#,
    )
    .unwrap();
    assert_eq!(opts.controller.cooldown_frames, 10);
    assert_eq!(opts.controller.min_fps, 30.0);
    assert_eq!(opts.raster.batch_threshold, 5);
    assert_eq!(opts.instance, InstanceId(3));
}

#[test]
fn malformed_json_is_a_config_error() {
    let err = PipelineOpts::from_json_str("{\"controller\": 3}").unwrap_err();
    assert!(matches!(err, VecfieldError::Config(_)), "{err}");
}

#[test]
fn invalid_values_in_json_are_rejected() {
    let err = PipelineOpts::from_json_str(r#"{"telemetry": {"window": 0}}"#).unwrap_err();
    assert!(err.to_string().contains("window"), "{err}");
}

#[test]
fn overrides_apply_on_top() {
    let opts = PipelineOpts::default()
        .with_overrides(env(&[
            (ENV_COOLDOWN_FRAMES, "12"),
            (ENV_MIN_FPS, "24.5"),
            (ENV_TARGET_FPS, "120"),
            (ENV_MAX_SCENE_PRIMITIVES, " 4000 "),
            (ENV_TELEMETRY_WINDOW, "30"),
        ]))
        .unwrap();
    assert_eq!(opts.controller.cooldown_frames, 12);
    assert_eq!(opts.controller.min_fps, 24.5);
    assert_eq!(opts.controller.target_fps, 120.0);
    assert_eq!(opts.controller.max_primitives_for_scene_graph, 4000);
    assert_eq!(opts.telemetry.window, 30);
}

#[test]
fn unparsable_override_names_the_variable() {
    let err = PipelineOpts::default()
        .with_overrides(env(&[(ENV_COOLDOWN_FRAMES, "soon")]))
        .unwrap_err();
    assert!(err.to_string().contains(ENV_COOLDOWN_FRAMES), "{err}");
}

#[test]
fn zero_window_override_fails_validation() {
    assert!(
        PipelineOpts::default()
            .with_overrides(env(&[(ENV_TELEMETRY_WINDOW, "0")]))
            .is_err()
    );
}
