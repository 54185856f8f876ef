//! Promise 层错误类型定义

use crate::PromiseId;
use thiserror::Error;

/// Promise 操作错误
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum PromiseError {
    /// Promise 已经被 settle（resolve 或 reject），不允许第二次写入
    #[error("Promise {id} already settled")]
    AlreadySettled { id: PromiseId },
}
