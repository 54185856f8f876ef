//! Join 指标模块
//!
//! 提供原子计数器，用于观察 Join 的完成情况和诊断输出量。
//! 所有计数器都使用原子操作，可以在任何线程安全地读取，不会引入锁竞争。

use std::sync::atomic::{AtomicU64, Ordering};

/// Join 实时指标
///
/// 通过 [`JoinOptions::with_metrics`](crate::JoinOptions::with_metrics) 挂到一个或多个 Join 上，
/// 多个 Join 可以共享同一个实例。
///
/// # 使用示例
///
/// ```rust
/// use tol_join::JoinMetrics;
/// use std::sync::Arc;
/// use std::sync::atomic::Ordering;
///
/// let metrics = Arc::new(JoinMetrics::default());
/// metrics.joins_started.fetch_add(1, Ordering::Relaxed);
///
/// let snapshot = metrics.snapshot();
/// assert_eq!(snapshot.joins_started, 1);
/// ```
#[derive(Debug, Default)]
pub struct JoinMetrics {
    /// 创建的 Join 总数
    pub joins_started: AtomicU64,

    /// 以成功结束的 Join 数
    pub joins_succeeded: AtomicU64,

    /// 以失败结束的 Join 数
    pub joins_failed: AtomicU64,

    /// 注册的子回调数（每个不同的子 Promise 一次）
    pub children_registered: AtomicU64,

    /// 次要失败总数（首个失败之后的所有失败）
    pub secondary_failures: AtomicU64,

    /// 因种类属于静默集合而未输出诊断的次要失败数
    pub quiet_suppressed: AtomicU64,

    /// 实际输出的诊断条数
    pub diagnostics_emitted: AtomicU64,
}

impl JoinMetrics {
    /// 创建新的指标实例（所有计数器初始化为 0）
    pub fn new() -> Self {
        Self::default()
    }

    /// 获取指标快照
    pub fn snapshot(&self) -> JoinMetricsSnapshot {
        JoinMetricsSnapshot {
            joins_started: self.joins_started.load(Ordering::Relaxed),
            joins_succeeded: self.joins_succeeded.load(Ordering::Relaxed),
            joins_failed: self.joins_failed.load(Ordering::Relaxed),
            children_registered: self.children_registered.load(Ordering::Relaxed),
            secondary_failures: self.secondary_failures.load(Ordering::Relaxed),
            quiet_suppressed: self.quiet_suppressed.load(Ordering::Relaxed),
            diagnostics_emitted: self.diagnostics_emitted.load(Ordering::Relaxed),
        }
    }

    /// 重置所有计数器
    pub fn reset(&self) {
        self.joins_started.store(0, Ordering::Relaxed);
        self.joins_succeeded.store(0, Ordering::Relaxed);
        self.joins_failed.store(0, Ordering::Relaxed);
        self.children_registered.store(0, Ordering::Relaxed);
        self.secondary_failures.store(0, Ordering::Relaxed);
        self.quiet_suppressed.store(0, Ordering::Relaxed);
        self.diagnostics_emitted.store(0, Ordering::Relaxed);
    }
}

/// 指标快照（不可变，用于读取）
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct JoinMetricsSnapshot {
    pub joins_started: u64,
    pub joins_succeeded: u64,
    pub joins_failed: u64,
    pub children_registered: u64,
    pub secondary_failures: u64,
    pub quiet_suppressed: u64,
    pub diagnostics_emitted: u64,
}

impl JoinMetricsSnapshot {
    /// 已结束的 Join 数
    pub fn joins_settled(&self) -> u64 {
        self.joins_succeeded + self.joins_failed
    }

    /// 仍在等待子 Promise 的 Join 数
    pub fn joins_pending(&self) -> u64 {
        self.joins_started.saturating_sub(self.joins_settled())
    }

    /// 失败率（百分比）
    ///
    /// 返回 0.0 到 100.0 之间的值。没有已结束的 Join 时返回 0.0。
    pub fn failure_rate(&self) -> f64 {
        let settled = self.joins_settled();
        if settled == 0 {
            return 0.0;
        }
        (self.joins_failed as f64 / settled as f64) * 100.0
    }
}
