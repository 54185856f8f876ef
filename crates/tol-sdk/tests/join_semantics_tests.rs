//! 合并语义测试
//!
//! 通过 `tol_sdk` 公开 API 验证合并结果的形状、顺序、首个失败规则和去重注册。

use std::collections::BTreeMap;
use std::sync::Arc;
use tol_sdk::{
    CollectingObserver, DiagnosticLevel, Failure, JoinConfig, JoinMetrics, JoinOptions, Promise,
    PromiseState, join_mapping, join_mapping_with, join_sequence, join_sequence_with,
};

type Child = Promise<i32, Failure<String>>;

fn fail(kind: &str, message: &str) -> Failure<String> {
    Failure::new(kind.to_string(), message)
}

#[test]
fn test_sequence_of_resolved_children() {
    let joined = join_sequence(vec![
        Child::resolved(1),
        Child::resolved(2),
        Child::resolved(3),
    ]);
    assert_eq!(joined.outcome(), Some(Ok(vec![1, 2, 3])));
}

#[test]
fn test_sequence_reversed_settle_order() {
    let children: Vec<Child> = (0..3).map(|_| Promise::new()).collect();
    let joined = join_sequence(children.clone());

    children[2].resolve(30).unwrap();
    children[1].resolve(20).unwrap();
    assert_eq!(joined.state(), PromiseState::Pending);
    children[0].resolve(10).unwrap();

    assert_eq!(joined.outcome(), Some(Ok(vec![10, 20, 30])));
}

#[test]
fn test_mapping_settles_after_last_key() {
    let fa: Child = Promise::new();
    let fb: Child = Promise::new();
    let joined = join_mapping([("a", fa.clone()), ("b", fb.clone())]);

    fb.resolve(2).unwrap();
    assert!(!joined.is_done());
    fa.resolve(1).unwrap();

    assert_eq!(joined.outcome(), Some(Ok(BTreeMap::from([("a", 1), ("b", 2)]))));
}

#[test]
fn test_empty_sequence_and_mapping() {
    assert_eq!(
        join_sequence(Vec::<Child>::new()).outcome(),
        Some(Ok(Vec::new()))
    );
    assert_eq!(
        join_mapping(Vec::<(u8, Child)>::new()).outcome(),
        Some(Ok(BTreeMap::new()))
    );
}

#[test]
fn test_first_failure_by_position_not_time() {
    let collector = Arc::new(CollectingObserver::<Failure<String>>::new());
    let options = JoinOptions::<Failure<String>>::new().with_observer(collector.clone());

    let ok: Child = Promise::new();
    let e1: Child = Promise::new();
    let e2: Child = Promise::new();
    let joined = join_sequence_with(vec![ok.clone(), e1.clone(), e2.clone()], options);

    e2.reject(fail("timeout", "E2")).unwrap();
    ok.resolve(0).unwrap();
    assert!(!joined.is_done());
    e1.reject(fail("crash", "E1")).unwrap();

    assert_eq!(joined.outcome(), Some(Err(fail("crash", "E1"))));
    assert_eq!(collector.take(), vec![(2, fail("timeout", "E2"))]);
}

#[test]
fn test_no_fail_fast_on_early_rejection() {
    let first: Child = Promise::new();
    let rest: Vec<Child> = (0..3).map(|_| Promise::new()).collect();
    let mut children = vec![first.clone()];
    children.extend(rest.iter().cloned());
    let joined = join_sequence(children);

    first.reject(fail("crash", "early")).unwrap();
    for (i, child) in rest.iter().enumerate() {
        assert_eq!(joined.state(), PromiseState::Pending);
        child.resolve(i as i32).unwrap();
    }

    assert_eq!(joined.outcome(), Some(Err(fail("crash", "early"))));
}

#[test]
fn test_repeated_child_registered_once() {
    let metrics = Arc::new(JoinMetrics::new());
    let options = JoinOptions::<Failure<String>>::new().with_metrics(metrics.clone());
    let a: Child = Promise::new();
    let b: Child = Promise::new();

    let joined = join_sequence_with(vec![a.clone(), a.clone(), b.clone(), a.clone()], options);
    assert_eq!(a.callback_registrations(), 1);
    assert_eq!(b.callback_registrations(), 1);
    assert_eq!(metrics.snapshot().children_registered, 2);

    a.resolve(5).unwrap();
    b.resolve(6).unwrap();
    assert_eq!(joined.outcome(), Some(Ok(vec![5, 5, 6, 5])));
}

#[test]
fn test_equal_values_from_distinct_children() {
    let a: Child = Promise::new();
    let b: Child = Promise::new();
    let joined = join_sequence(vec![a.clone(), b.clone()]);

    a.resolve(4).unwrap();
    assert!(!joined.is_done());
    b.resolve(4).unwrap();
    assert_eq!(joined.outcome(), Some(Ok(vec![4, 4])));
}

#[test]
fn test_already_settled_children_complete_synchronously() {
    let joined = join_sequence(vec![
        Child::resolved(1),
        Child::rejected(fail("crash", "boom")),
    ]);
    assert_eq!(joined.outcome(), Some(Err(fail("crash", "boom"))));
}

#[test]
fn test_quiet_kinds_loaded_from_config() {
    let config: JoinConfig<String> = JoinConfig::from_toml_str(
        r#"
diagnostic_level = "warn"
quiet_kinds = ["cancelled"]
"#,
    )
    .unwrap();
    assert_eq!(config.diagnostic_level, DiagnosticLevel::Warn);

    let metrics = Arc::new(JoinMetrics::new());
    let options = JoinOptions::<Failure<String>>::from_config(config).with_metrics(metrics.clone());

    let joined = join_mapping_with(
        [
            ("a", Child::rejected(fail("crash", "primary"))),
            ("b", Child::rejected(fail("cancelled", "hushed"))),
            ("c", Child::rejected(fail("timeout", "loud"))),
        ],
        options,
    );

    assert_eq!(joined.outcome(), Some(Err(fail("crash", "primary"))));
    let snapshot = metrics.snapshot();
    assert_eq!(snapshot.secondary_failures, 2);
    assert_eq!(snapshot.quiet_suppressed, 1);
    assert_eq!(snapshot.diagnostics_emitted, 1);
    assert_eq!(snapshot.joins_failed, 1);
}

#[test]
fn test_metrics_shared_across_joins() {
    let metrics = Arc::new(JoinMetrics::new());
    let options = JoinOptions::<Failure<String>>::new().with_metrics(metrics.clone());

    let pending: Child = Promise::new();
    let _ok = join_sequence_with(vec![Child::resolved(1)], options.clone());
    let _err = join_sequence_with(vec![Child::rejected(fail("crash", "x"))], options.clone());
    let waiting = join_sequence_with(vec![pending.clone()], options);

    let snapshot = metrics.snapshot();
    assert_eq!(snapshot.joins_started, 3);
    assert_eq!(snapshot.joins_settled(), 2);
    assert_eq!(snapshot.joins_pending(), 1);

    pending.resolve(2).unwrap();
    assert!(waiting.is_done());
    assert_eq!(metrics.snapshot().joins_pending(), 0);
}
