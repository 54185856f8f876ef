//! 日志初始化
//!
//! 库 crate 只通过 `tracing` 宏输出日志（包括 Join 的次要失败诊断），
//! 是否输出、输出到哪里由应用在启动时决定。

use thiserror::Error;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::filter::LevelFilter;

/// 日志初始化错误
#[derive(Error, Debug)]
pub enum LoggerError {
    /// 全局 subscriber 已经被设置
    #[error("Global tracing subscriber already set: {0}")]
    Subscriber(#[from] tracing::subscriber::SetGlobalDefaultError),

    /// `log` 桥接已经被设置
    #[error("log bridge already set: {0}")]
    LogBridge(#[from] log::SetLoggerError),
}

/// 初始化日志（fmt 输出 + `RUST_LOG` 过滤 + `log` 桥接）
///
/// 未设置 `RUST_LOG` 时默认 `info`。
///
/// # 错误
///
/// 进程内已经初始化过时返回错误。
///
/// 先安装 `log` 桥接：桥接失败时不会安装 subscriber。桥接成功而 subscriber
/// 安装失败时，`log` 记录转发给已存在的全局 subscriber。
pub fn try_init_logger() -> Result<(), LoggerError> {
    let filter = EnvFilter::builder()
        .with_default_directive(LevelFilter::INFO.into())
        .from_env_lossy();
    let subscriber = tracing_subscriber::fmt().with_env_filter(filter).finish();

    tracing_log::LogTracer::init()?;
    tracing::subscriber::set_global_default(subscriber)?;
    Ok(())
}

/// 初始化日志，重复调用时静默忽略
pub fn init_logger() {
    if let Err(err) = try_init_logger() {
        tracing::debug!("logger already initialized: {err}");
    }
}
