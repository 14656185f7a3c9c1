use crate::message::ChatMessage;
use async_trait::async_trait;
use thiserror::Error;

/// 通知错误
#[derive(Debug, Error)]
pub enum NotifyError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Chat API returned status {0}")]
    Status(u16),

    #[error("Chat API rejected message: {0}")]
    Api(String),
}

impl From<NotifyError> for health_core::HealthError {
    fn from(err: NotifyError) -> Self {
        health_core::HealthError::Notification(err.to_string())
    }
}

/// 通知器 trait
#[async_trait]
pub trait Notifier: Send + Sync {
    /// 发送通知，失败即返回错误
    async fn send(&self, message: &ChatMessage) -> Result<(), NotifyError>;

    /// 通知器名称
    fn name(&self) -> &str;
}
