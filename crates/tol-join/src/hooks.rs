//! 次要失败观察者（Observer Hook）
//!
//! Join 只把"首个"失败交给调用方，其余失败默认只输出诊断后丢弃。
//! 需要拿到全部失败的调用方可以注册 [`FailureObserver`]：
//! 每个次要失败（包括静默种类的）都会通知所有观察者，但不会改变 Join 的结果。
//!
//! # 使用示例
//!
//! ```rust
//! use tol_join::{CollectingObserver, ObserverSet};
//! use tol_future::Failure;
//! use std::sync::Arc;
//!
//! let collector = Arc::new(CollectingObserver::<Failure<u8>>::new());
//! let mut observers: ObserverSet<Failure<u8>> = ObserverSet::new();
//! observers.add(collector.clone());
//! assert_eq!(observers.len(), 1);
//! ```

use parking_lot::Mutex;
use std::sync::Arc;

/// 一个被降级为诊断的次要失败
#[derive(Debug)]
pub struct SuppressedFailure<'a, E> {
    /// 在输入集合中的位置（映射输入按迭代顺序计）
    pub position: usize,
    /// 原始错误
    pub error: &'a E,
    /// 种类是否属于静默集合
    pub quiet: bool,
}

/// 次要失败回调 Trait
///
/// 在最后一个子 Promise settle 的线程上同步调用，实现应尽快返回。
pub trait FailureObserver<E>: Send + Sync {
    /// 当一个失败被降级为诊断时调用
    fn on_suppressed(&self, failure: &SuppressedFailure<'_, E>);
}

impl<E, F> FailureObserver<E> for F
where
    F: Fn(&SuppressedFailure<'_, E>) + Send + Sync,
{
    fn on_suppressed(&self, failure: &SuppressedFailure<'_, E>) {
        self(failure)
    }
}

/// 观察者集合
pub struct ObserverSet<E> {
    observers: Vec<Arc<dyn FailureObserver<E>>>,
}

impl<E> ObserverSet<E> {
    pub const fn new() -> Self {
        Self {
            observers: Vec::new(),
        }
    }

    /// 添加观察者
    pub fn add(&mut self, observer: Arc<dyn FailureObserver<E>>) {
        self.observers.push(observer);
    }

    /// 以闭包形式添加观察者
    pub fn add_fn<F>(&mut self, observer: F)
    where
        F: Fn(&SuppressedFailure<'_, E>) + Send + Sync + 'static,
    {
        self.observers.push(Arc::new(observer));
    }

    /// 移除所有观察者
    pub fn clear(&mut self) {
        self.observers.clear();
    }

    /// 通知所有观察者（按添加顺序）
    pub fn notify(&self, failure: &SuppressedFailure<'_, E>) {
        for observer in &self.observers {
            observer.on_suppressed(failure);
        }
    }

    pub fn len(&self) -> usize {
        self.observers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.observers.is_empty()
    }
}

impl<E> Default for ObserverSet<E> {
    fn default() -> Self {
        Self::new()
    }
}

impl<E> Clone for ObserverSet<E> {
    fn clone(&self) -> Self {
        Self {
            observers: self.observers.clone(),
        }
    }
}

impl<E> std::fmt::Debug for ObserverSet<E> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ObserverSet")
            .field("len", &self.observers.len())
            .finish()
    }
}

/// 收集所有次要失败的观察者
///
/// 静默种类的失败同样被收集。
#[derive(Debug)]
pub struct CollectingObserver<E> {
    collected: Mutex<Vec<(usize, E)>>,
}

impl<E> CollectingObserver<E> {
    pub fn new() -> Self {
        Self {
            collected: Mutex::new(Vec::new()),
        }
    }

    /// 取出已收集的 (位置, 错误)，并清空内部缓冲
    pub fn take(&self) -> Vec<(usize, E)> {
        std::mem::take(&mut *self.collected.lock())
    }

    pub fn len(&self) -> usize {
        self.collected.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.collected.lock().is_empty()
    }
}

impl<E> Default for CollectingObserver<E> {
    fn default() -> Self {
        Self::new()
    }
}

impl<E: Clone + Send> FailureObserver<E> for CollectingObserver<E> {
    fn on_suppressed(&self, failure: &SuppressedFailure<'_, E>) {
        self.collected
            .lock()
            .push((failure.position, failure.error.clone()));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[test]
    fn test_observer_set_add_and_clear() {
        let mut observers: ObserverSet<String> = ObserverSet::new();
        assert!(observers.is_empty());

        observers.add(Arc::new(CollectingObserver::new()));
        assert_eq!(observers.len(), 1);

        observers.clear();
        assert!(observers.is_empty());
    }

    #[test]
    fn test_notify_reaches_every_observer() {
        let collector = Arc::new(CollectingObserver::<String>::new());
        let quiet_count = Arc::new(AtomicUsize::new(0));

        let mut observers: ObserverSet<String> = ObserverSet::new();
        observers.add(collector.clone());
        let counter = quiet_count.clone();
        observers.add_fn(move |failure| {
            if failure.quiet {
                counter.fetch_add(1, Ordering::SeqCst);
            }
        });

        let loud = "loud".to_string();
        let hushed = "hushed".to_string();
        observers.notify(&SuppressedFailure {
            position: 1,
            error: &loud,
            quiet: false,
        });
        observers.notify(&SuppressedFailure {
            position: 3,
            error: &hushed,
            quiet: true,
        });

        assert_eq!(quiet_count.load(Ordering::SeqCst), 1);
        assert_eq!(
            collector.take(),
            vec![(1, "loud".to_string()), (3, "hushed".to_string())]
        );
        assert!(collector.is_empty());
    }

    #[test]
    fn test_cloned_set_shares_observers() {
        let collector = Arc::new(CollectingObserver::<u32>::new());
        let mut observers: ObserverSet<u32> = ObserverSet::new();
        observers.add(collector.clone());

        let cloned = observers.clone();
        cloned.notify(&SuppressedFailure {
            position: 0,
            error: &7u32,
            quiet: false,
        });

        assert_eq!(collector.len(), 1);
    }
}
