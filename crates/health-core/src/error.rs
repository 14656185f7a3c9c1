use std::fmt::Display;
use std::time::Duration;
use thiserror::Error;

/// 导出器统一错误类型
#[derive(Error, Debug)]
pub enum HealthError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Upstream call {operation} failed: {message}")]
    Upstream {
        operation: &'static str,
        message: String,
    },

    #[error("Upstream call {operation} returned no {field}")]
    MissingField {
        operation: &'static str,
        field: &'static str,
    },

    #[error("Upstream call {operation} returned no result for event {event_arn}")]
    EmptyResult {
        operation: &'static str,
        event_arn: String,
    },

    #[error("Notification error: {0}")]
    Notification(String),

    #[error("Metrics error: {0}")]
    Metrics(String),

    #[error("Scrape cycle exceeded deadline of {0:?}")]
    Timeout(Duration),
}

/// Result 类型别名
pub type Result<T> = std::result::Result<T, HealthError>;

impl HealthError {
    /// 创建上游调用错误
    pub fn upstream(operation: &'static str, err: impl Display) -> Self {
        HealthError::Upstream {
            operation,
            message: err.to_string(),
        }
    }

    pub fn missing_field(operation: &'static str, field: &'static str) -> Self {
        HealthError::MissingField { operation, field }
    }

    pub fn empty_result(operation: &'static str, event_arn: impl Into<String>) -> Self {
        HealthError::EmptyResult {
            operation,
            event_arn: event_arn.into(),
        }
    }
}
