//! tol SDK - Promise 与合并组合器
//!
//! # 架构设计
//!
//! 从底层到高层：
//!
//! - **Promise 层** (`future`): 单次赋值 Promise、身份标识、错误分类
//! - **合并层** (`join`): 等待全部完成、首个失败决定结果的合并组合器
//!
//! # 快速开始
//!
//! ```rust
//! use tol_sdk::prelude::*;
//!
//! #[derive(Debug, Clone, PartialEq, Eq, Hash)]
//! enum Kind {
//!     Cancelled,
//!     Crashed,
//! }
//!
//! let fitness: Promise<f64, Failure<Kind>> = Promise::new();
//! let options: JoinOptions<Failure<Kind>> = JoinOptions::new().with_quiet_kinds([Kind::Cancelled]);
//! let joined = join_sequence_with(vec![fitness.clone(), Promise::resolved(0.5)], options);
//!
//! fitness.resolve(1.5).unwrap();
//! assert_eq!(joined.outcome(), Some(Ok(vec![1.5, 0.5])));
//! ```

mod logging;
pub mod prelude;

pub use tol_future as future;
pub use tol_join as join;

// --- 常用类型 ---
pub use tol_future::{Classify, Failure, Promise, PromiseError, PromiseId, PromiseState};
pub use tol_join::{
    CollectingObserver, ConfigError, DiagnosticLevel, FailureObserver, JoinConfig, JoinMetrics,
    JoinMetricsSnapshot, JoinOptions, ObserverSet, QuietKinds, SuppressedFailure, join_mapping,
    join_mapping_with, join_sequence, join_sequence_with,
};

pub use logging::{LoggerError, init_logger, try_init_logger};
