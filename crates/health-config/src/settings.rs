use crate::error::ConfigError;
use health_logging::{LogFormat, LogSettings};
use serde::{Deserialize, Serialize};

/// 不按区域过滤的哨兵值
pub const ALL_REGIONS: &str = "all-regions";

pub(crate) const DEFAULTS: &[(&str, &str)] = &[
    ("listen_address", "0.0.0.0:8080"),
    ("metrics_path", "/metrics"),
    ("regions", ALL_REGIONS),
    ("log_level", "info"),
    ("log_format", "text"),
    ("ignore_events", ""),
    ("ignore_resources", ""),
    ("ignore_resource_event", ""),
    ("timezone", "UTC"),
    ("scrape_timeout", "50s"),
    ("time_shift", "0s"),
];

/// 未校验的原始配置，键与命令行参数一一对应
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Settings {
    pub listen_address: String,
    pub metrics_path: String,
    pub regions: String,
    pub log_level: String,
    pub log_format: String,
    #[serde(default)]
    pub slack_token: Option<String>,
    #[serde(default)]
    pub slack_channel: Option<String>,
    #[serde(default)]
    pub assume_role: Option<String>,
    pub ignore_events: String,
    pub ignore_resources: String,
    pub ignore_resource_event: String,
    pub timezone: String,
    pub scrape_timeout: String,
    pub time_shift: String,
}

impl Settings {
    /// 日志配置需在其余校验之前取出，校验阶段的告警才有输出
    pub fn log_settings(&self) -> Result<LogSettings, ConfigError> {
        let format = self
            .log_format
            .parse::<LogFormat>()
            .map_err(|e| ConfigError::InvalidLogFormat(e.to_string()))?;

        Ok(LogSettings {
            level: self.log_level.clone(),
            format,
        })
    }
}
