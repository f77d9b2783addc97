use super::*;
use crate::test_support::{Spin, capture_logs};

#[test]
fn register_get_has_unregister() {
    let mut r = AnimationRegistry::new();
    assert!(r.is_empty());
    assert!(r.register(Arc::new(Spin)).is_none());
    assert!(r.has("spin"));
    assert_eq!(r.get("spin").map(|m| m.id().to_owned()), Some("spin".to_owned()));
    assert_eq!(r.len(), 1);
    assert!(r.unregister("spin").is_some());
    assert!(!r.has("spin"));
    assert!(r.unregister("spin").is_none());
}

#[test]
fn overwrite_warns_and_last_write_wins() {
    let mut r = AnimationRegistry::new();
    r.register(Arc::new(Spin));
    let first = r.get("spin").cloned().unwrap();

    let (prev, logs) = capture_logs(|| r.register(Arc::new(Spin)));
    assert!(prev.is_some_and(|p| Arc::ptr_eq(&p, &first)));
    assert!(logs.contains("re-registered"), "logs: {logs}");
    assert!(!Arc::ptr_eq(r.get("spin").unwrap(), &first));
    assert_eq!(r.len(), 1);
}

#[test]
fn get_all_is_sorted_by_id() {
    let r = AnimationRegistry::with_builtins();
    let ids: Vec<String> = r.get_all().iter().map(|m| m.id().to_owned()).collect();
    let mut sorted = ids.clone();
    sorted.sort();
    assert_eq!(ids, sorted);
    assert_eq!(ids, r.ids());
    for id in ["still", "rotate", "wave", "pulse", "pointer", "flocking"] {
        assert!(r.has(id), "missing builtin {id}");
    }
}
