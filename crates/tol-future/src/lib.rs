//! # tol-future - 单次赋值 Promise
//!
//! 为 Join 组合器提供底层的 Future/Promise 抽象：
//!
//! - 创建 Pending 实例，`resolve` / `reject` 恰好一次
//! - 查询是否完成，重复读取已存储的结果或错误
//! - 注册完成回调：每次注册恰好触发一次，已完成时立即触发
//! - 实现 `std::future::Future`，可在任意异步运行时中 `.await`
//!
//! 调度、取消、超时都不属于本 crate 的职责。
//!
//! # 快速开始
//!
//! ```rust
//! use tol_future::{Promise, PromiseState};
//!
//! let promise: Promise<&str, ()> = Promise::new();
//! assert_eq!(promise.state(), PromiseState::Pending);
//!
//! promise.resolve("ready").unwrap();
//! assert_eq!(promise.outcome(), Some(Ok("ready")));
//! ```

mod classify;
mod error;
mod promise;

pub use classify::{Classify, Failure};
pub use error::PromiseError;
pub use promise::{Promise, PromiseId, PromiseState};
