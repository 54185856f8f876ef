//! # tol-join - Promise 合并组合器
//!
//! 把任意数量、各自独立调度的 [`Promise`](tol_future::Promise) 合并为一个 Promise：
//!
//! - 等待所有不同的子 Promise 完成后才判定（没有 fail-fast）
//! - 成功时按输入的形状和顺序汇总结果（序列 → `Vec`，映射 → `BTreeMap`）
//! - 失败时取输入顺序中的首个失败；其余失败只输出诊断，可按错误种类静默
//! - 同一个 Promise 出现在多个位置时只注册一次回调
//!
//! 合并结果本身也是 Promise，可以继续参与下一层合并，也可以直接 `.await`。
//!
//! # 模块
//!
//! - `join` - 组合器入口
//! - `config` - 诊断级别、TOML 配置、运行时选项
//! - `hooks` - 次要失败观察者
//! - `metrics` - 原子计数器
//! - `quiet` - 静默错误种类集合

mod config;
mod error;
pub mod hooks;
mod join;
pub mod metrics;
mod quiet;

pub use config::{DiagnosticLevel, JoinConfig, JoinOptions};
pub use error::ConfigError;
pub use hooks::{CollectingObserver, FailureObserver, ObserverSet, SuppressedFailure};
pub use join::{join_mapping, join_mapping_with, join_sequence, join_sequence_with};
pub use metrics::{JoinMetrics, JoinMetricsSnapshot};
pub use quiet::QuietKinds;
