use thiserror::Error;

/// 配置错误，启动阶段即终止
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("No region configured (use a comma separated list or \"all-regions\")")]
    MissingRegions,

    #[error("Invalid timezone {name:?}: {reason}")]
    InvalidTimezone { name: String, reason: String },

    #[error("Invalid ignore-resource-event entry {0:?} (expected <event type>:<resource identifier>)")]
    InvalidIgnorePair(String),

    #[error("Invalid duration for {key}: {reason}")]
    InvalidDuration { key: &'static str, reason: String },

    #[error("Invalid listen address {0:?}")]
    InvalidListenAddress(String),

    #[error("Invalid metrics path {0:?} (must start with '/' and not be '/' or '/health')")]
    InvalidMetricsPath(String),

    #[error("Invalid log format: {0}")]
    InvalidLogFormat(String),

    #[error("Failed to load configuration: {0}")]
    Load(#[from] config::ConfigError),
}

impl From<ConfigError> for health_core::HealthError {
    fn from(err: ConfigError) -> Self {
        health_core::HealthError::Config(err.to_string())
    }
}
