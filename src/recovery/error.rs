//! 原文恢复模块统一错误处理
//!
//! 提供结构化错误类型和错误处理机制

use std::fmt;

use thiserror::Error;

/// 恢复错误类型
#[derive(Error, Debug, Clone)]
pub enum RecoveryError {
    /// 配置错误
    #[error("配置错误: {0}")]
    ConfigError(String),

    /// 网络错误
    #[error("网络错误: {0}")]
    NetworkError(String),

    /// 影子请求返回非成功状态
    #[error("影子请求被拒绝: {0}")]
    ShadowRequestRejected(String),

    /// 输入验证错误
    #[error("输入无效: {0}")]
    InvalidInput(String),

    /// 解析错误
    #[error("解析错误: {0}")]
    ParseError(String),

    /// 序列化错误
    #[error("序列化错误: {0}")]
    SerializationError(String),

    /// 超时错误
    #[error("操作超时: {0}")]
    TimeoutError(String),

    /// 内部错误
    #[error("内部错误: {0}")]
    InternalError(String),
}

impl RecoveryError {
    /// 检查错误是否可重试
    pub fn is_retryable(&self) -> bool {
        match self {
            RecoveryError::NetworkError(_) => true,
            RecoveryError::TimeoutError(_) => true,
            RecoveryError::ShadowRequestRejected(_) => true,
            RecoveryError::ConfigError(_) => false,
            RecoveryError::InvalidInput(_) => false,
            RecoveryError::ParseError(_) => false,
            RecoveryError::SerializationError(_) => false,
            RecoveryError::InternalError(_) => false,
        }
    }

    /// 获取错误的严重程度
    pub fn severity(&self) -> ErrorSeverity {
        match self {
            RecoveryError::ConfigError(_) => ErrorSeverity::Critical,
            RecoveryError::NetworkError(_) => ErrorSeverity::Warning,
            RecoveryError::ShadowRequestRejected(_) => ErrorSeverity::Warning,
            RecoveryError::InvalidInput(_) => ErrorSeverity::Info,
            RecoveryError::ParseError(_) => ErrorSeverity::Error,
            RecoveryError::SerializationError(_) => ErrorSeverity::Error,
            RecoveryError::TimeoutError(_) => ErrorSeverity::Warning,
            RecoveryError::InternalError(_) => ErrorSeverity::Critical,
        }
    }

    /// 获取错误类别
    pub fn category(&self) -> ErrorCategory {
        match self {
            RecoveryError::ConfigError(_) => ErrorCategory::Configuration,
            RecoveryError::NetworkError(_) => ErrorCategory::Network,
            RecoveryError::ShadowRequestRejected(_) => ErrorCategory::Network,
            RecoveryError::InvalidInput(_) => ErrorCategory::Input,
            RecoveryError::ParseError(_) => ErrorCategory::Parsing,
            RecoveryError::SerializationError(_) => ErrorCategory::Serialization,
            RecoveryError::TimeoutError(_) => ErrorCategory::Timeout,
            RecoveryError::InternalError(_) => ErrorCategory::Internal,
        }
    }

    /// 创建带上下文的错误
    pub fn with_context<T: fmt::Display>(mut self, context: T) -> Self {
        let new_msg = match &self {
            RecoveryError::ConfigError(msg)
            | RecoveryError::NetworkError(msg)
            | RecoveryError::ShadowRequestRejected(msg)
            | RecoveryError::InvalidInput(msg)
            | RecoveryError::ParseError(msg)
            | RecoveryError::SerializationError(msg)
            | RecoveryError::TimeoutError(msg)
            | RecoveryError::InternalError(msg) => format!("{} (上下文: {})", msg, context),
        };

        match &mut self {
            RecoveryError::ConfigError(ref mut msg)
            | RecoveryError::NetworkError(ref mut msg)
            | RecoveryError::ShadowRequestRejected(ref mut msg)
            | RecoveryError::InvalidInput(ref mut msg)
            | RecoveryError::ParseError(ref mut msg)
            | RecoveryError::SerializationError(ref mut msg)
            | RecoveryError::TimeoutError(ref mut msg)
            | RecoveryError::InternalError(ref mut msg) => *msg = new_msg,
        }

        self
    }
}

/// 错误严重程度
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ErrorSeverity {
    Info,
    Warning,
    Error,
    Critical,
}

/// 错误类别
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCategory {
    Configuration,
    Network,
    Input,
    Timeout,
    Parsing,
    Serialization,
    Internal,
}

impl From<reqwest::Error> for RecoveryError {
    fn from(error: reqwest::Error) -> Self {
        if error.is_timeout() {
            RecoveryError::TimeoutError(format!("HTTP请求超时: {}", error))
        } else {
            RecoveryError::NetworkError(format!("HTTP请求失败: {}", error))
        }
    }
}

impl From<serde_json::Error> for RecoveryError {
    fn from(error: serde_json::Error) -> Self {
        if error.is_data() || error.is_syntax() || error.is_eof() {
            RecoveryError::ParseError(format!("JSON解析错误: {}", error))
        } else {
            RecoveryError::SerializationError(format!("JSON序列化错误: {}", error))
        }
    }
}

impl From<toml::de::Error> for RecoveryError {
    fn from(error: toml::de::Error) -> Self {
        RecoveryError::ParseError(format!("TOML解析错误: {}", error))
    }
}

impl From<url::ParseError> for RecoveryError {
    fn from(error: url::ParseError) -> Self {
        RecoveryError::InvalidInput(format!("URL无效: {}", error))
    }
}

impl From<std::io::Error> for RecoveryError {
    fn from(error: std::io::Error) -> Self {
        RecoveryError::InternalError(format!("IO错误: {}", error))
    }
}

impl From<tokio::time::error::Elapsed> for RecoveryError {
    fn from(error: tokio::time::error::Elapsed) -> Self {
        RecoveryError::TimeoutError(format!("异步操作超时: {}", error))
    }
}

/// 错误结果类型别名
pub type RecoveryResult<T> = Result<T, RecoveryError>;

/// 错误统计信息
#[derive(Debug, Clone, Default)]
pub struct ErrorStats {
    pub total_errors: usize,
    pub by_category: std::collections::HashMap<ErrorCategory, usize>,
    pub by_severity: std::collections::HashMap<ErrorSeverity, usize>,
    pub retryable_errors: usize,
    pub critical_errors: usize,
}

impl ErrorStats {
    /// 记录错误
    pub fn record_error(&mut self, error: &RecoveryError) {
        self.total_errors += 1;

        let category = error.category();
        *self.by_category.entry(category).or_insert(0) += 1;

        let severity = error.severity();
        *self.by_severity.entry(severity).or_insert(0) += 1;

        if error.is_retryable() {
            self.retryable_errors += 1;
        }

        if severity == ErrorSeverity::Critical {
            self.critical_errors += 1;
        }
    }

    /// 重置统计
    pub fn reset(&mut self) {
        *self = Default::default();
    }
}

/// 错误处理助手函数
pub mod helpers {
    use super::*;

    /// 按严重程度记录错误，不改变控制流
    pub fn trace_error(error: &RecoveryError) {
        match error.severity() {
            ErrorSeverity::Info => tracing::info!("恢复信息: {}", error),
            ErrorSeverity::Warning => tracing::warn!("恢复警告: {}", error),
            ErrorSeverity::Error => tracing::error!("恢复错误: {}", error),
            ErrorSeverity::Critical => tracing::error!("恢复严重错误: {}", error),
        }
    }

    /// 创建输入验证错误
    pub fn validation_error<T: fmt::Display>(msg: T) -> RecoveryError {
        RecoveryError::InvalidInput(msg.to_string())
    }
}
