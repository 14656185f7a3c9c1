use crate::error::ConfigError;
use crate::settings::{Settings, ALL_REGIONS};
use chrono_tz::Tz;
use health_core::FilterConfig;
use std::collections::BTreeSet;
use std::net::SocketAddr;
use std::time::Duration;
use tracing::warn;

/// 聊天通知目标，频道与令牌必须同时提供
#[derive(Clone, PartialEq, Eq)]
pub struct NotificationSettings {
    pub channel: String,
    pub token: String,
}

impl std::fmt::Debug for NotificationSettings {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NotificationSettings")
            .field("channel", &self.channel)
            .field("token", &"***")
            .finish()
    }
}

/// 校验后的导出器配置，启动后只读
#[derive(Debug, Clone)]
pub struct ExporterConfig {
    pub listen_address: SocketAddr,
    pub metrics_path: String,

    /// `None` 表示不按区域过滤
    pub regions: Option<Vec<String>>,

    pub filter: FilterConfig,
    pub timezone: Tz,
    pub notification: Option<NotificationSettings>,
    pub assume_role: Option<String>,

    /// 仅用于调试：首个窗口的起点向前偏移
    pub time_shift: Duration,

    /// 单次抓取的截止时间，`None` 表示不限制
    pub scrape_timeout: Option<Duration>,
}

impl ExporterConfig {
    pub fn from_settings(settings: Settings) -> Result<Self, ConfigError> {
        // 日志格式不合法时整份配置无效
        settings.log_settings()?;

        let scrape_timeout = parse_duration("scrape_timeout", &settings.scrape_timeout)?;

        Ok(Self {
            listen_address: parse_listen_address(&settings.listen_address)?,
            metrics_path: parse_metrics_path(&settings.metrics_path)?,
            regions: parse_regions(&settings.regions)?,
            filter: FilterConfig {
                ignored_event_types: split_list(&settings.ignore_events),
                ignored_resources: split_list(&settings.ignore_resources),
                ignored_resource_events: parse_resource_events(&settings.ignore_resource_event)?,
            },
            timezone: parse_timezone(&settings.timezone)?,
            notification: notification_settings(settings.slack_channel, settings.slack_token),
            assume_role: settings.assume_role.filter(|role| !role.trim().is_empty()),
            time_shift: parse_duration("time_shift", &settings.time_shift)?,
            scrape_timeout: (!scrape_timeout.is_zero()).then_some(scrape_timeout),
        })
    }
}

/// 支持 `:8080` 形式的监听地址
fn parse_listen_address(raw: &str) -> Result<SocketAddr, ConfigError> {
    let raw = raw.trim();
    let candidate = if raw.starts_with(':') {
        format!("0.0.0.0{}", raw)
    } else {
        raw.to_string()
    };

    candidate
        .parse()
        .map_err(|_| ConfigError::InvalidListenAddress(raw.to_string()))
}

/// 落地页与存活检查已占用的路径
const RESERVED_PATHS: [&str; 2] = ["/", "/health"];

fn parse_metrics_path(raw: &str) -> Result<String, ConfigError> {
    let path = raw.trim();
    // ':' 与 '*' 会被路由当作路径参数
    if !path.starts_with('/')
        || RESERVED_PATHS.contains(&path)
        || path.contains(&[':', '*'][..])
    {
        return Err(ConfigError::InvalidMetricsPath(raw.to_string()));
    }
    Ok(path.to_string())
}

fn parse_regions(raw: &str) -> Result<Option<Vec<String>>, ConfigError> {
    let raw = raw.trim();
    if raw == ALL_REGIONS {
        return Ok(None);
    }

    let regions: Vec<String> = split_list(raw).into_iter().collect();
    if regions.is_empty() {
        return Err(ConfigError::MissingRegions);
    }
    Ok(Some(regions))
}

/// 逗号分隔，去空白、去空项，排序去重
fn split_list(raw: &str) -> BTreeSet<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|item| !item.is_empty())
        .map(str::to_string)
        .collect()
}

/// 以第一个 `:` 切分，资源标识本身可以是包含 `:` 的 ARN
fn parse_resource_events(raw: &str) -> Result<BTreeSet<(String, String)>, ConfigError> {
    split_list(raw)
        .into_iter()
        .map(|entry| match entry.split_once(':') {
            Some((event, resource)) if !event.trim().is_empty() && !resource.trim().is_empty() => {
                Ok((event.trim().to_string(), resource.trim().to_string()))
            }
            _ => Err(ConfigError::InvalidIgnorePair(entry)),
        })
        .collect()
}

fn parse_timezone(raw: &str) -> Result<Tz, ConfigError> {
    let name = raw.trim();
    if name.is_empty() {
        return Ok(Tz::UTC);
    }

    name.parse::<Tz>().map_err(|e| ConfigError::InvalidTimezone {
        name: name.to_string(),
        reason: e.to_string(),
    })
}

fn parse_duration(key: &'static str, raw: &str) -> Result<Duration, ConfigError> {
    humantime::parse_duration(raw.trim()).map_err(|e| ConfigError::InvalidDuration {
        key,
        reason: e.to_string(),
    })
}

fn notification_settings(
    channel: Option<String>,
    token: Option<String>,
) -> Option<NotificationSettings> {
    let channel = channel.filter(|c| !c.trim().is_empty());
    let token = token.filter(|t| !t.trim().is_empty());

    match (channel, token) {
        (Some(channel), Some(token)) => Some(NotificationSettings { channel, token }),
        (None, None) => None,
        (channel, _) => {
            warn!(
                channel_set = channel.is_some(),
                "Slack notifications disabled: both channel and token are required"
            );
            None
        }
    }
}
