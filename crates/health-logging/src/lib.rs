use serde::{Deserialize, Serialize};
use std::str::FromStr;
use thiserror::Error;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt, EnvFilter};

pub const DEFAULT_LOG_LEVEL: &str = "info";

#[derive(Debug, Error)]
pub enum LoggingError {
    #[error("Unknown log format: {0} (expected text or json)")]
    UnknownFormat(String),

    #[error("Failed to initialize logging: {0}")]
    Init(String),
}

/// 日志输出格式
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Text,
    Json,
}

impl FromStr for LogFormat {
    type Err = LoggingError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "text" | "" => Ok(LogFormat::Text),
            "json" => Ok(LogFormat::Json),
            other => Err(LoggingError::UnknownFormat(other.to_string())),
        }
    }
}

/// 日志配置
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogSettings {
    pub level: String,
    pub format: LogFormat,
}

impl Default for LogSettings {
    fn default() -> Self {
        Self {
            level: DEFAULT_LOG_LEVEL.to_string(),
            format: LogFormat::Text,
        }
    }
}

/// 根据级别构建过滤器；`RUST_LOG` 优先
///
/// 第二个返回值表示级别无法解析、已回退到默认级别。
pub fn env_filter(level: &str) -> (EnvFilter, bool) {
    if std::env::var_os(EnvFilter::DEFAULT_ENV).is_some() {
        if let Ok(filter) = EnvFilter::try_from_default_env() {
            return (filter, false);
        }
    }

    match level.trim().parse::<tracing::Level>() {
        Ok(parsed) => (EnvFilter::new(parsed.to_string().to_lowercase()), false),
        Err(_) => (EnvFilter::new(DEFAULT_LOG_LEVEL), true),
    }
}

/// 安装全局 tracing 订阅者
pub fn init_logging(settings: &LogSettings) -> Result<(), LoggingError> {
    let (filter, fell_back) = env_filter(&settings.level);
    let registry = tracing_subscriber::registry().with(filter);

    let installed = match settings.format {
        LogFormat::Text => registry.with(fmt::layer().with_target(true)).try_init(),
        LogFormat::Json => registry
            .with(fmt::layer().json().with_current_span(false))
            .try_init(),
    };
    installed.map_err(|e| LoggingError::Init(e.to_string()))?;

    if fell_back {
        tracing::warn!(
            level = %settings.level,
            "Couldn't parse log level, using default: {}",
            DEFAULT_LOG_LEVEL
        );
    }

    Ok(())
}
