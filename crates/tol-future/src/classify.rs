//! 错误分类
//!
//! Join 组合器需要按"错误种类"过滤次要失败的诊断输出。
//! 这里用显式的 `Classify` trait 携带种类信息，按值结构比较，而不是运行时类型判断。

use std::fmt;
use std::hash::Hash;
use thiserror::Error;

/// 可分类的错误
///
/// `Kind` 是一个可比较、可哈希的判别值（通常是一个无字段枚举）。
///
/// # 示例
///
/// ```rust
/// use tol_future::{Classify, Failure};
///
/// #[derive(Debug, Clone, PartialEq, Eq, Hash)]
/// enum Kind {
///     Timeout,
///     Crashed,
/// }
///
/// let err = Failure::new(Kind::Crashed, "simulator exited");
/// assert_eq!(err.kind(), Kind::Crashed);
/// ```
pub trait Classify {
    /// 错误种类
    type Kind: Eq + Hash + Clone + fmt::Debug;

    /// 返回该错误的种类
    fn kind(&self) -> Self::Kind;
}

/// 通用失败类型：种类 + 描述信息
///
/// 适用于不想定义专用错误类型的场景。
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{kind:?}: {message}")]
pub struct Failure<K> {
    kind: K,
    message: String,
}

impl<K> Failure<K> {
    /// 创建新的失败
    pub fn new(kind: K, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }

    /// 描述信息
    pub fn message(&self) -> &str {
        &self.message
    }
}

impl<K> Classify for Failure<K>
where
    K: Eq + Hash + Clone + fmt::Debug,
{
    type Kind = K;

    fn kind(&self) -> K {
        self.kind.clone()
    }
}
