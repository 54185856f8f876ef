//! 单次赋值 Promise
//!
//! `Promise<T, E>` 是一个可克隆的句柄，所有克隆共享同一个状态槽和同一个 [`PromiseId`]。
//! 状态只能从 `Pending` 迁移一次到 `Resolved` 或 `Rejected`，之后不可变。
//!
//! # 回调语义
//!
//! - 每次 `add_done_callback` 注册的回调恰好触发一次
//! - settle 之前注册：在 settle 的线程上、释放状态锁之后依次触发
//! - settle 之后注册：在注册线程上同步触发
//!
//! # 线程安全
//!
//! 状态槽由 `parking_lot::Mutex` 保护，settle 的"检查 + 写入"在同一把锁内完成，
//! 并发的多次 settle 中只有一次成功。

use crate::PromiseError;
use parking_lot::Mutex;
use std::fmt;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::task::{Context, Poll, Waker};

static NEXT_PROMISE_ID: AtomicU64 = AtomicU64::new(1);

/// Promise 身份标识
///
/// 进程内唯一，构造时分配。克隆的 Promise 共享同一个 ID。
/// Join 组合器用它按身份（而不是按值）去重子 Promise。
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct PromiseId(u64);

impl PromiseId {
    fn next() -> Self {
        PromiseId(NEXT_PROMISE_ID.fetch_add(1, Ordering::Relaxed))
    }

    /// 原始数值
    pub fn as_u64(self) -> u64 {
        self.0
    }
}

impl fmt::Display for PromiseId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Promise 状态（只读视图）
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PromiseState {
    /// 尚未 settle
    #[default]
    Pending,
    /// 已成功
    Resolved,
    /// 已失败
    Rejected,
}

impl PromiseState {
    /// 是否已 settle（终态）
    pub fn is_settled(self) -> bool {
        self != Self::Pending
    }
}

type Callback<T, E> = Box<dyn FnOnce(&Promise<T, E>) + Send + 'static>;

enum Slot<T, E> {
    Pending {
        callbacks: Vec<Callback<T, E>>,
        wakers: Vec<Waker>,
    },
    Resolved(T),
    Rejected(E),
}

impl<T, E> Slot<T, E> {
    fn state(&self) -> PromiseState {
        match self {
            Slot::Pending { .. } => PromiseState::Pending,
            Slot::Resolved(_) => PromiseState::Resolved,
            Slot::Rejected(_) => PromiseState::Rejected,
        }
    }
}

struct Shared<T, E> {
    id: PromiseId,
    slot: Mutex<Slot<T, E>>,
    /// 累计注册过的回调数量（含 settle 之后同步触发的）
    registrations: AtomicU64,
}

/// 单次赋值 Promise
///
/// # 示例
///
/// ```rust
/// use tol_future::Promise;
/// use std::sync::Arc;
/// use std::sync::atomic::{AtomicUsize, Ordering};
///
/// let promise: Promise<u32, String> = Promise::new();
/// let fired = Arc::new(AtomicUsize::new(0));
///
/// let counter = fired.clone();
/// promise.add_done_callback(move |p| {
///     assert_eq!(p.outcome(), Some(Ok(7)));
///     counter.fetch_add(1, Ordering::SeqCst);
/// });
///
/// promise.resolve(7).unwrap();
/// assert_eq!(fired.load(Ordering::SeqCst), 1);
///
/// // 第二次 settle 被拒绝，结果保持不变
/// assert!(promise.reject("late".to_string()).is_err());
/// assert_eq!(promise.outcome(), Some(Ok(7)));
/// ```
pub struct Promise<T, E> {
    shared: Arc<Shared<T, E>>,
}

impl<T, E> Promise<T, E> {
    /// 创建一个 Pending 状态的 Promise
    pub fn new() -> Self {
        Self::with_slot(Slot::Pending {
            callbacks: Vec::new(),
            wakers: Vec::new(),
        })
    }

    /// 创建一个已成功的 Promise
    pub fn resolved(value: T) -> Self {
        Self::with_slot(Slot::Resolved(value))
    }

    /// 创建一个已失败的 Promise
    pub fn rejected(error: E) -> Self {
        Self::with_slot(Slot::Rejected(error))
    }

    fn with_slot(slot: Slot<T, E>) -> Self {
        Self {
            shared: Arc::new(Shared {
                id: PromiseId::next(),
                slot: Mutex::new(slot),
                registrations: AtomicU64::new(0),
            }),
        }
    }

    /// 身份标识
    pub fn id(&self) -> PromiseId {
        self.shared.id
    }

    /// 两个句柄是否指向同一个 Promise
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.shared, &other.shared)
    }

    /// 当前状态
    pub fn state(&self) -> PromiseState {
        self.shared.slot.lock().state()
    }

    /// 是否已 settle
    pub fn is_done(&self) -> bool {
        self.state().is_settled()
    }

    /// 以成功值 settle
    ///
    /// # 错误
    ///
    /// 已经 settle 过时返回 [`PromiseError::AlreadySettled`]，已存储的结果不变。
    pub fn resolve(&self, value: T) -> Result<(), PromiseError> {
        self.settle(Slot::Resolved(value))
    }

    /// 以错误 settle
    ///
    /// # 错误
    ///
    /// 已经 settle 过时返回 [`PromiseError::AlreadySettled`]，已存储的结果不变。
    pub fn reject(&self, error: E) -> Result<(), PromiseError> {
        self.settle(Slot::Rejected(error))
    }

    fn settle(&self, outcome: Slot<T, E>) -> Result<(), PromiseError> {
        let mut slot = self.shared.slot.lock();
        let previous = std::mem::replace(&mut *slot, outcome);
        match previous {
            Slot::Pending { callbacks, wakers } => {
                // 释放锁后再通知：回调里可以自由读取结果或注册新回调
                drop(slot);
                for waker in wakers {
                    waker.wake();
                }
                for callback in callbacks {
                    callback(self);
                }
                Ok(())
            },
            settled => {
                *slot = settled;
                Err(PromiseError::AlreadySettled { id: self.id() })
            },
        }
    }

    /// 注册完成回调
    ///
    /// 回调恰好触发一次：
    /// - 尚未 settle：排队，settle 时在 settle 的线程上触发
    /// - 已经 settle：立即在当前线程同步触发
    pub fn add_done_callback<F>(&self, callback: F)
    where
        F: FnOnce(&Promise<T, E>) + Send + 'static,
    {
        self.shared.registrations.fetch_add(1, Ordering::Relaxed);
        {
            let mut slot = self.shared.slot.lock();
            if let Slot::Pending { callbacks, .. } = &mut *slot {
                callbacks.push(Box::new(callback));
                return;
            }
        }
        callback(self);
    }

    /// 累计注册过的回调数量
    ///
    /// 主要用于测试和调试（例如验证 Join 对重复子 Promise 只注册一次回调）。
    pub fn callback_registrations(&self) -> u64 {
        self.shared.registrations.load(Ordering::Relaxed)
    }

    /// 借用已存储的结果
    ///
    /// Pending 时返回 `None`。闭包在状态锁内执行，不要在其中访问同一个 Promise。
    pub fn with_outcome<R>(&self, f: impl FnOnce(Result<&T, &E>) -> R) -> Option<R> {
        match &*self.shared.slot.lock() {
            Slot::Pending { .. } => None,
            Slot::Resolved(value) => Some(f(Ok(value))),
            Slot::Rejected(error) => Some(f(Err(error))),
        }
    }

    /// 读取结果（克隆）
    ///
    /// 可重复调用；Pending 时返回 `None`。
    pub fn outcome(&self) -> Option<Result<T, E>>
    where
        T: Clone,
        E: Clone,
    {
        self.with_outcome(|outcome| match outcome {
            Ok(value) => Ok(value.clone()),
            Err(error) => Err(error.clone()),
        })
    }
}

impl<T, E> Default for Promise<T, E> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T, E> Clone for Promise<T, E> {
    fn clone(&self) -> Self {
        Self {
            shared: Arc::clone(&self.shared),
        }
    }
}

impl<T, E> fmt::Debug for Promise<T, E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Promise")
            .field("id", &self.id())
            .field("state", &self.state())
            .finish()
    }
}

impl<T, E> Future for Promise<T, E>
where
    T: Clone,
    E: Clone,
{
    type Output = Result<T, E>;

    fn poll(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        let mut slot = self.shared.slot.lock();
        match &mut *slot {
            Slot::Pending { wakers, .. } => {
                if !wakers.iter().any(|w| w.will_wake(cx.waker())) {
                    wakers.push(cx.waker().clone());
                }
                Poll::Pending
            },
            Slot::Resolved(value) => Poll::Ready(Ok(value.clone())),
            Slot::Rejected(error) => Poll::Ready(Err(error.clone())),
        }
    }
}
