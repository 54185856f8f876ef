//! 把多个子 Promise 合并为一个 Promise
//!
//! # 语义
//!
//! - 输入为有序序列（[`join_sequence`]）或键值映射（[`join_mapping`]），输出保持相同形状和顺序
//! - 每个不同的子 Promise（按 [`PromiseId`] 身份判断）只注册一次完成回调
//! - 只有在所有不同的子 Promise 都 settle 之后才做判定，不会因为某个子 Promise 提前失败而提前结束
//! - 判定时按输入顺序遍历一次：首个失败决定合并结果，其余失败只作为诊断输出
//!   （种类属于静默集合的不输出），并通知 [`FailureObserver`](crate::FailureObserver)
//! - 空输入立即以相同形状的空结果成功
//!
//! # 线程安全
//!
//! 子 Promise 可以在任意线程上 settle。"移除 + 判断是否最后一个"与"领取汇总遍历"
//! 在同一把锁内完成，因此汇总遍历恰好执行一次，合并结果恰好 settle 一次。
//!
//! # 内存
//!
//! 未完成的 Join 由其子 Promise 的回调保持存活。子 Promise 永不 settle 时，
//! 合并结果和全部子 Promise 都不会被释放。

use crate::{DiagnosticLevel, JoinOptions, SuppressedFailure};
use parking_lot::Mutex;
use std::collections::{BTreeMap, HashSet};
use std::fmt;
use std::sync::Arc;
use std::sync::atomic::Ordering;
use tol_future::{Classify, Promise, PromiseId};

/// 合并有序序列
///
/// 等价于 `join_sequence_with(children, JoinOptions::default())`。
///
/// # 示例
///
/// ```rust
/// use tol_future::{Failure, Promise};
/// use tol_join::join_sequence;
///
/// let a: Promise<i32, Failure<&str>> = Promise::new();
/// let b = Promise::resolved(2);
///
/// let joined = join_sequence(vec![a.clone(), b]);
/// assert!(!joined.is_done());
///
/// a.resolve(1).unwrap();
/// assert_eq!(joined.outcome(), Some(Ok(vec![1, 2])));
/// ```
pub fn join_sequence<T, E>(children: impl IntoIterator<Item = Promise<T, E>>) -> Promise<Vec<T>, E>
where
    T: Clone + Send + 'static,
    E: Classify + Clone + fmt::Debug + Send + 'static,
    E::Kind: Send + Sync,
{
    join_sequence_with(children, JoinOptions::default())
}

/// 合并有序序列（带选项）
pub fn join_sequence_with<T, E>(
    children: impl IntoIterator<Item = Promise<T, E>>,
    options: JoinOptions<E>,
) -> Promise<Vec<T>, E>
where
    T: Clone + Send + 'static,
    E: Classify + Clone + fmt::Debug + Send + 'static,
    E::Kind: Send + Sync,
{
    let children = children.into_iter().map(|child| ((), child)).collect();
    join_keyed(children, options, |values| {
        values.into_iter().map(|((), value)| value).collect()
    })
}

/// 合并键值映射
///
/// 输入的迭代顺序决定"首个失败"的判定顺序。重复的键以后出现的值为准。
///
/// # 示例
///
/// ```rust
/// use std::collections::BTreeMap;
/// use tol_future::{Failure, Promise};
/// use tol_join::join_mapping;
///
/// let children: Vec<(&str, Promise<i32, Failure<()>>)> = vec![
///     ("a", Promise::resolved(1)),
///     ("b", Promise::resolved(2)),
/// ];
///
/// let joined = join_mapping(children);
/// let expected = BTreeMap::from([("a", 1), ("b", 2)]);
/// assert_eq!(joined.outcome(), Some(Ok(expected)));
/// ```
pub fn join_mapping<K, T, E>(
    children: impl IntoIterator<Item = (K, Promise<T, E>)>,
) -> Promise<BTreeMap<K, T>, E>
where
    K: Ord + Send + 'static,
    T: Clone + Send + 'static,
    E: Classify + Clone + fmt::Debug + Send + 'static,
    E::Kind: Send + Sync,
{
    join_mapping_with(children, JoinOptions::default())
}

/// 合并键值映射（带选项）
pub fn join_mapping_with<K, T, E>(
    children: impl IntoIterator<Item = (K, Promise<T, E>)>,
    options: JoinOptions<E>,
) -> Promise<BTreeMap<K, T>, E>
where
    K: Ord + Send + 'static,
    T: Clone + Send + 'static,
    E: Classify + Clone + fmt::Debug + Send + 'static,
    E::Kind: Send + Sync,
{
    join_keyed(children.into_iter().collect(), options, |values| {
        values.into_iter().collect()
    })
}

/// 序列和映射共享的汇总逻辑，`shape` 负责把 (键, 值) 列表还原为输出形状
fn join_keyed<K, T, E, R>(
    children: Vec<(K, Promise<T, E>)>,
    options: JoinOptions<E>,
    shape: fn(Vec<(K, T)>) -> R,
) -> Promise<R, E>
where
    K: Send + 'static,
    T: Clone + Send + 'static,
    E: Classify + Clone + fmt::Debug + Send + 'static,
    E::Kind: Send + Sync,
    R: Send + 'static,
{
    if let Some(metrics) = options.metrics() {
        metrics.joins_started.fetch_add(1, Ordering::Relaxed);
    }

    if children.is_empty() {
        if let Some(metrics) = options.metrics() {
            metrics.joins_succeeded.fetch_add(1, Ordering::Relaxed);
        }
        return Promise::resolved(shape(Vec::new()));
    }

    // 先建好完整的等待集合再注册回调：已完成的子 Promise 会在注册时同步回调，
    // 此时集合里仍有其他成员，不会提前触发汇总
    let mut pending = HashSet::with_capacity(children.len());
    let mut distinct = Vec::with_capacity(children.len());
    for (_, child) in &children {
        if pending.insert(child.id()) {
            distinct.push(child.clone());
        }
    }

    let joined = Promise::new();
    tracing::debug!(
        joined = %joined.id(),
        children = children.len(),
        distinct = distinct.len(),
        "join started"
    );

    let aggregation = Arc::new(Aggregation {
        joined: joined.clone(),
        progress: Mutex::new(Progress {
            pending,
            children: Some(children),
        }),
        options,
        shape,
    });

    for child in distinct {
        if let Some(metrics) = aggregation.options.metrics() {
            metrics.children_registered.fetch_add(1, Ordering::Relaxed);
        }
        let aggregation = Arc::clone(&aggregation);
        child.add_done_callback(move |settled| aggregation.on_child_settled(settled.id()));
    }

    joined
}

/// 子 Promise 的回调持有 `Arc<Aggregation>`，而 `children` 又持有子 Promise，
/// 二者构成引用环，直到最后一个子 Promise settle 后 `children` 被取走才解开。
/// 永不 settle 的子 Promise 会让整个 Join 一直驻留内存，即使调用方已丢弃所有句柄。
struct Progress<K, T, E> {
    /// 尚未 settle 的不同子 Promise
    pending: HashSet<PromiseId>,
    /// 原始输入；被最后一个回调取走，保证汇总只执行一次
    children: Option<Vec<(K, Promise<T, E>)>>,
}

struct Aggregation<K, T, E: Classify, R> {
    joined: Promise<R, E>,
    progress: Mutex<Progress<K, T, E>>,
    options: JoinOptions<E>,
    shape: fn(Vec<(K, T)>) -> R,
}

impl<K, T, E, R> Aggregation<K, T, E, R>
where
    T: Clone,
    E: Classify + Clone + fmt::Debug,
{
    fn on_child_settled(&self, id: PromiseId) {
        let children = {
            let mut progress = self.progress.lock();
            progress.pending.remove(&id);
            if !progress.pending.is_empty() {
                return;
            }
            progress.children.take()
        };

        if let Some(children) = children {
            self.aggregate(children);
        }
    }

    fn aggregate(&self, children: Vec<(K, Promise<T, E>)>) {
        let mut values = Vec::with_capacity(children.len());
        let mut failed = false;

        for (position, (key, child)) in children.into_iter().enumerate() {
            match child.outcome() {
                Some(Ok(value)) => values.push((key, value)),
                Some(Err(error)) if failed => self.report_suppressed(position, &error),
                Some(Err(error)) => {
                    failed = true;
                    self.settle_failure(position, error);
                },
                None => {
                    tracing::error!(
                        joined = %self.joined.id(),
                        child = %child.id(),
                        position,
                        "child promise still pending after its completion callback"
                    );
                },
            }
        }

        if failed {
            return;
        }

        match self.joined.resolve((self.shape)(values)) {
            Ok(()) => {
                if let Some(metrics) = self.options.metrics() {
                    metrics.joins_succeeded.fetch_add(1, Ordering::Relaxed);
                }
                tracing::debug!(joined = %self.joined.id(), "join resolved");
            },
            Err(err) => tracing::warn!("joined promise settled externally: {err}"),
        }
    }

    fn settle_failure(&self, position: usize, error: E) {
        let kind = error.kind();
        match self.joined.reject(error) {
            Ok(()) => {
                if let Some(metrics) = self.options.metrics() {
                    metrics.joins_failed.fetch_add(1, Ordering::Relaxed);
                }
                tracing::debug!(
                    joined = %self.joined.id(),
                    position,
                    ?kind,
                    "join rejected by first failure"
                );
            },
            Err(err) => tracing::warn!("joined promise settled externally: {err}"),
        }
    }

    fn report_suppressed(&self, position: usize, error: &E) {
        let kind = error.kind();
        let quiet = self.options.quiet_kinds().contains(&kind);

        self.options.observers().notify(&SuppressedFailure {
            position,
            error,
            quiet,
        });

        let metrics = self.options.metrics();
        if let Some(metrics) = metrics {
            metrics.secondary_failures.fetch_add(1, Ordering::Relaxed);
        }
        if quiet {
            if let Some(metrics) = metrics {
                metrics.quiet_suppressed.fetch_add(1, Ordering::Relaxed);
            }
            return;
        }

        let joined = self.joined.id();
        match self.options.diagnostic_level() {
            DiagnosticLevel::Off => return,
            DiagnosticLevel::Debug => {
                tracing::debug!(%joined, position, ?kind, ?error, "multiple failures in joined promise")
            },
            DiagnosticLevel::Info => {
                tracing::info!(%joined, position, ?kind, ?error, "multiple failures in joined promise")
            },
            DiagnosticLevel::Warn => {
                tracing::warn!(%joined, position, ?kind, ?error, "multiple failures in joined promise")
            },
            DiagnosticLevel::Error => {
                tracing::error!(%joined, position, ?kind, ?error, "multiple failures in joined promise")
            },
        }
        if let Some(metrics) = metrics {
            metrics.diagnostics_emitted.fetch_add(1, Ordering::Relaxed);
        }
    }
}
