//! # Join 配置
//!
//! - [`JoinConfig`]: 可序列化的配置（诊断级别 + 静默错误种类），可从 TOML 加载
//! - [`JoinOptions`]: 运行时选项，额外携带观察者和指标等动态组件
//!
//! 配置文件示例：
//!
//! ```toml
//! diagnostic_level = "warn"
//! quiet_kinds = ["cancelled", "timeout"]
//! ```

use crate::{ConfigError, FailureObserver, JoinMetrics, ObserverSet, QuietKinds};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::fs;
use std::path::Path;
use std::sync::Arc;
use tol_future::Classify;

/// 次要失败诊断的日志级别
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DiagnosticLevel {
    /// 不输出
    Off,
    Debug,
    Info,
    Warn,
    /// 默认：与失败同等严重
    #[default]
    Error,
}

/// 可序列化的 Join 配置
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct JoinConfig<K> {
    /// 次要失败诊断的日志级别
    pub diagnostic_level: DiagnosticLevel,

    /// 静默错误种类
    pub quiet_kinds: Vec<K>,
}

impl<K> Default for JoinConfig<K> {
    fn default() -> Self {
        Self {
            diagnostic_level: DiagnosticLevel::default(),
            quiet_kinds: Vec::new(),
        }
    }
}

impl<K: DeserializeOwned> JoinConfig<K> {
    /// 从 TOML 字符串解析
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(content)?)
    }

    /// 从文件加载配置
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }
}

impl<K: Serialize> JoinConfig<K> {
    /// 序列化为 TOML
    pub fn to_toml_string(&self) -> Result<String, ConfigError> {
        Ok(toml::to_string(self)?)
    }

    /// 保存配置到文件
    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<(), ConfigError> {
        fs::write(path, self.to_toml_string()?)?;
        Ok(())
    }
}

/// Join 运行时选项
///
/// # 示例
///
/// ```rust
/// use tol_join::{DiagnosticLevel, JoinMetrics, JoinOptions};
/// use tol_future::Failure;
/// use std::sync::Arc;
///
/// let metrics = Arc::new(JoinMetrics::new());
/// let options: JoinOptions<Failure<&str>> = JoinOptions::new()
///     .with_quiet_kinds(["cancelled"])
///     .with_diagnostic_level(DiagnosticLevel::Warn)
///     .with_metrics(metrics);
///
/// assert!(options.quiet_kinds().contains(&"cancelled"));
/// ```
pub struct JoinOptions<E: Classify> {
    quiet: QuietKinds<E::Kind>,
    observers: ObserverSet<E>,
    metrics: Option<Arc<JoinMetrics>>,
    diagnostic_level: DiagnosticLevel,
}

impl<E: Classify> JoinOptions<E> {
    /// 默认选项：无静默种类、无观察者、无指标、诊断级别 `Error`
    pub fn new() -> Self {
        Self {
            quiet: QuietKinds::new(),
            observers: ObserverSet::new(),
            metrics: None,
            diagnostic_level: DiagnosticLevel::default(),
        }
    }

    /// 由配置构造
    pub fn from_config(config: JoinConfig<E::Kind>) -> Self {
        Self::new()
            .with_quiet_kinds(config.quiet_kinds)
            .with_diagnostic_level(config.diagnostic_level)
    }

    /// 添加静默错误种类
    pub fn with_quiet_kinds(mut self, kinds: impl IntoIterator<Item = E::Kind>) -> Self {
        self.quiet.extend(kinds);
        self
    }

    /// 添加次要失败观察者
    pub fn with_observer(mut self, observer: Arc<dyn FailureObserver<E>>) -> Self {
        self.observers.add(observer);
        self
    }

    /// 挂载指标计数器
    pub fn with_metrics(mut self, metrics: Arc<JoinMetrics>) -> Self {
        self.metrics = Some(metrics);
        self
    }

    /// 设置诊断级别
    pub fn with_diagnostic_level(mut self, level: DiagnosticLevel) -> Self {
        self.diagnostic_level = level;
        self
    }

    pub fn quiet_kinds(&self) -> &QuietKinds<E::Kind> {
        &self.quiet
    }

    pub fn observers(&self) -> &ObserverSet<E> {
        &self.observers
    }

    pub fn metrics(&self) -> Option<&JoinMetrics> {
        self.metrics.as_deref()
    }

    pub fn diagnostic_level(&self) -> DiagnosticLevel {
        self.diagnostic_level
    }
}

impl<E: Classify> Default for JoinOptions<E> {
    fn default() -> Self {
        Self::new()
    }
}

impl<E: Classify> Clone for JoinOptions<E> {
    fn clone(&self) -> Self {
        Self {
            quiet: self.quiet.clone(),
            observers: self.observers.clone(),
            metrics: self.metrics.clone(),
            diagnostic_level: self.diagnostic_level,
        }
    }
}

impl<E: Classify> fmt::Debug for JoinOptions<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("JoinOptions")
            .field("quiet", &self.quiet)
            .field("observers", &self.observers)
            .field("metrics", &self.metrics.is_some())
            .field("diagnostic_level", &self.diagnostic_level)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::CollectingObserver;
    use tol_future::Failure;

    #[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
    #[serde(rename_all = "snake_case")]
    enum Kind {
        Cancelled,
        Timeout,
        SimulatorCrash,
    }

    #[test]
    fn test_default_config() {
        let config: JoinConfig<Kind> = JoinConfig::default();
        assert_eq!(config.diagnostic_level, DiagnosticLevel::Error);
        assert!(config.quiet_kinds.is_empty());
    }

    #[test]
    fn test_parse_full_config() {
        let config: JoinConfig<Kind> = JoinConfig::from_toml_str(
            r#"
diagnostic_level = "warn"
quiet_kinds = ["cancelled", "simulator_crash"]
"#,
        )
        .unwrap();

        assert_eq!(config.diagnostic_level, DiagnosticLevel::Warn);
        assert_eq!(
            config.quiet_kinds,
            vec![Kind::Cancelled, Kind::SimulatorCrash]
        );
    }

    #[test]
    fn test_parse_empty_config_uses_defaults() {
        let config: JoinConfig<Kind> = JoinConfig::from_toml_str("").unwrap();
        assert_eq!(config, JoinConfig::default());
    }

    #[test]
    fn test_parse_unknown_kind_fails() {
        let result = JoinConfig::<Kind>::from_toml_str(r#"quiet_kinds = ["meteor"]"#);
        assert!(matches!(result, Err(ConfigError::Parse(_))));
    }

    #[test]
    fn test_save_and_load_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("join.toml");

        let config = JoinConfig {
            diagnostic_level: DiagnosticLevel::Off,
            quiet_kinds: vec![Kind::Timeout],
        };
        config.save_to_file(&path).unwrap();

        let loaded: JoinConfig<Kind> = JoinConfig::load_from_file(&path).unwrap();
        assert_eq!(loaded, config);
    }

    #[test]
    fn test_load_missing_file() {
        let result = JoinConfig::<Kind>::load_from_file("/nonexistent/tol/join.toml");
        assert!(matches!(result, Err(ConfigError::Io(_))));
    }

    #[test]
    fn test_options_from_config() {
        let config = JoinConfig {
            diagnostic_level: DiagnosticLevel::Info,
            quiet_kinds: vec![Kind::Cancelled, Kind::Timeout],
        };
        let options: JoinOptions<Failure<Kind>> = JoinOptions::from_config(config);

        assert_eq!(options.diagnostic_level(), DiagnosticLevel::Info);
        assert_eq!(options.quiet_kinds().len(), 2);
        assert!(options.quiet_kinds().contains(&Kind::Timeout));
        assert!(options.metrics().is_none());
    }

    #[test]
    fn test_options_builder() {
        let collector = Arc::new(CollectingObserver::<Failure<Kind>>::new());
        let options = JoinOptions::<Failure<Kind>>::default()
            .with_quiet_kinds([Kind::Cancelled])
            .with_observer(collector)
            .with_metrics(Arc::new(JoinMetrics::new()));

        let cloned = options.clone();
        assert_eq!(cloned.observers().len(), 1);
        assert!(cloned.metrics().is_some());
        assert!(format!("{:?}", cloned).contains("JoinOptions"));
    }
}
