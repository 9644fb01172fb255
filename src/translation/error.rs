//! 翻译模块统一错误处理
//!
//! 提供结构化错误类型和错误处理机制

use std::fmt;

use thiserror::Error;

/// 翻译错误类型
#[derive(Error, Debug, Clone, PartialEq)]
pub enum TranslationError {
    /// 配置错误
    #[error("配置错误: {0}")]
    ConfigError(String),

    /// 网络错误
    #[error("网络错误: {0}")]
    NetworkError(String),

    /// 单个翻译服务返回的错误
    #[error("翻译服务 {provider} 出错: {message}")]
    ProviderError { provider: String, message: String },

    /// 翻译结果为空或与原文相同
    #[error("翻译结果不可用")]
    EmptyTranslation,

    /// 超时错误
    #[error("操作超时: {0}")]
    TimeoutError(String),

    /// 没有配置任何翻译服务
    #[error("没有可用的翻译服务")]
    NoProviders,

    /// 批次中的每一个词都翻译失败
    #[error("批次翻译全部失败 ({attempted} 个词)")]
    BatchFailed { attempted: usize },

    /// 解析错误
    #[error("解析错误: {0}")]
    ParseError(String),

    /// 序列化错误
    #[error("序列化错误: {0}")]
    SerializationError(String),

    /// DOM 操作错误
    #[error("DOM 操作错误: {0}")]
    DomError(String),

    /// 内部错误
    #[error("内部错误: {0}")]
    InternalError(String),
}

impl TranslationError {
    /// 检查错误是否可重试
    pub fn is_retryable(&self) -> bool {
        match self {
            TranslationError::NetworkError(_) => true,
            TranslationError::TimeoutError(_) => true,
            TranslationError::ProviderError { .. } => true,
            TranslationError::BatchFailed { .. } => true,
            TranslationError::ConfigError(_) => true,
            TranslationError::EmptyTranslation => false,
            TranslationError::NoProviders => false,
            TranslationError::ParseError(_) => false,
            TranslationError::SerializationError(_) => false,
            TranslationError::DomError(_) => false,
            TranslationError::InternalError(_) => false,
        }
    }

    /// 获取错误的严重程度
    pub fn severity(&self) -> ErrorSeverity {
        match self {
            TranslationError::ConfigError(_) => ErrorSeverity::Critical,
            TranslationError::NetworkError(_) => ErrorSeverity::Warning,
            TranslationError::ProviderError { .. } => ErrorSeverity::Warning,
            TranslationError::EmptyTranslation => ErrorSeverity::Info,
            TranslationError::TimeoutError(_) => ErrorSeverity::Warning,
            TranslationError::NoProviders => ErrorSeverity::Critical,
            TranslationError::BatchFailed { .. } => ErrorSeverity::Error,
            TranslationError::ParseError(_) => ErrorSeverity::Error,
            TranslationError::SerializationError(_) => ErrorSeverity::Error,
            TranslationError::DomError(_) => ErrorSeverity::Warning,
            TranslationError::InternalError(_) => ErrorSeverity::Critical,
        }
    }

    /// 获取错误类别
    pub fn category(&self) -> ErrorCategory {
        match self {
            TranslationError::ConfigError(_) => ErrorCategory::Configuration,
            TranslationError::NetworkError(_) => ErrorCategory::Network,
            TranslationError::ProviderError { .. } => ErrorCategory::Service,
            TranslationError::EmptyTranslation => ErrorCategory::Service,
            TranslationError::TimeoutError(_) => ErrorCategory::Timeout,
            TranslationError::NoProviders => ErrorCategory::Configuration,
            TranslationError::BatchFailed { .. } => ErrorCategory::Processing,
            TranslationError::ParseError(_) => ErrorCategory::Parsing,
            TranslationError::SerializationError(_) => ErrorCategory::Serialization,
            TranslationError::DomError(_) => ErrorCategory::Dom,
            TranslationError::InternalError(_) => ErrorCategory::Internal,
        }
    }

    /// 创建带上下文的错误
    pub fn with_context<T: fmt::Display>(self, context: T) -> Self {
        let new_msg = format!("{} (上下文: {})", self, context);

        match self {
            TranslationError::ConfigError(_) => TranslationError::ConfigError(new_msg),
            TranslationError::NetworkError(_) => TranslationError::NetworkError(new_msg),
            TranslationError::ProviderError { provider, .. } => TranslationError::ProviderError {
                provider,
                message: new_msg,
            },
            TranslationError::TimeoutError(_) => TranslationError::TimeoutError(new_msg),
            TranslationError::ParseError(_) => TranslationError::ParseError(new_msg),
            TranslationError::SerializationError(_) => {
                TranslationError::SerializationError(new_msg)
            }
            TranslationError::DomError(_) => TranslationError::DomError(new_msg),
            TranslationError::InternalError(_) => TranslationError::InternalError(new_msg),
            other => other,
        }
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
    Service,
    Timeout,
    Processing,
    Parsing,
    Serialization,
    Dom,
    Internal,
}

impl From<std::io::Error> for TranslationError {
    fn from(error: std::io::Error) -> Self {
        TranslationError::InternalError(format!("IO错误: {}", error))
    }
}

impl From<serde_json::Error> for TranslationError {
    fn from(error: serde_json::Error) -> Self {
        TranslationError::SerializationError(format!("JSON序列化错误: {}", error))
    }
}

impl From<toml::de::Error> for TranslationError {
    fn from(error: toml::de::Error) -> Self {
        TranslationError::ParseError(format!("TOML解析错误: {}", error))
    }
}

impl From<reqwest::Error> for TranslationError {
    fn from(error: reqwest::Error) -> Self {
        if error.is_timeout() {
            TranslationError::TimeoutError(error.to_string())
        } else if error.is_decode() {
            TranslationError::ParseError(format!("响应解析失败: {}", error))
        } else {
            TranslationError::NetworkError(error.to_string())
        }
    }
}

impl From<tokio::time::error::Elapsed> for TranslationError {
    fn from(error: tokio::time::error::Elapsed) -> Self {
        TranslationError::TimeoutError(format!("异步操作超时: {}", error))
    }
}

/// 错误结果类型别名
pub type TranslationResult<T> = Result<T, TranslationError>;

/// 错误处理助手函数
pub mod helpers {
    use super::*;

    /// 按严重程度记录错误
    pub fn log_error(error: &TranslationError) {
        match error.severity() {
            ErrorSeverity::Info => tracing::info!("翻译信息: {}", error),
            ErrorSeverity::Warning => tracing::warn!("翻译警告: {}", error),
            ErrorSeverity::Error => tracing::error!("翻译错误: {}", error),
            ErrorSeverity::Critical => tracing::error!("翻译严重错误: {}", error),
        }
    }

    /// 创建翻译服务错误
    pub fn provider_error<P: fmt::Display, T: fmt::Display>(
        provider: P,
        msg: T,
    ) -> TranslationError {
        TranslationError::ProviderError {
            provider: provider.to_string(),
            message: msg.to_string(),
        }
    }

    /// 创建配置错误
    pub fn config_error<T: fmt::Display>(msg: T) -> TranslationError {
        TranslationError::ConfigError(msg.to_string())
    }

    /// 创建超时错误
    pub fn timeout_error<T: fmt::Display>(msg: T) -> TranslationError {
        TranslationError::TimeoutError(msg.to_string())
    }

    /// 创建DOM操作错误
    pub fn dom_error<T: fmt::Display>(msg: T) -> TranslationError {
        TranslationError::DomError(msg.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classification() {
        let err = helpers::provider_error("deeplx", "502 Bad Gateway");
        assert!(err.is_retryable());
        assert_eq!(err.category(), ErrorCategory::Service);
        assert_eq!(err.severity(), ErrorSeverity::Warning);

        assert!(!TranslationError::EmptyTranslation.is_retryable());
        assert_eq!(TranslationError::NoProviders.severity(), ErrorSeverity::Critical);
    }

    #[test]
    fn test_with_context_keeps_variant() {
        let err = TranslationError::NetworkError("connection reset".to_string())
            .with_context("word=cat");
        match err {
            TranslationError::NetworkError(msg) => {
                assert!(msg.contains("connection reset"));
                assert!(msg.contains("word=cat"));
            }
            other => panic!("unexpected variant: {:?}", other),
        }

        // Unit-like variants are returned unchanged
        assert_eq!(
            TranslationError::EmptyTranslation.with_context("x"),
            TranslationError::EmptyTranslation
        );
    }
}
