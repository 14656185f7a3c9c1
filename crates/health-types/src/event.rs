use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// 事件作用域
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EventScope {
    /// 无作用域
    #[default]
    None,
    /// 公共事件（区域内所有账号）
    Public,
    /// 仅影响特定账号
    AccountSpecific,
}

impl EventScope {
    pub fn as_str(&self) -> &'static str {
        match self {
            EventScope::None => "NONE",
            EventScope::Public => "PUBLIC",
            EventScope::AccountSpecific => "ACCOUNT_SPECIFIC",
        }
    }

    /// 解析上游返回的作用域代码，未知值按 `None` 处理
    pub fn from_code(code: &str) -> Self {
        match code {
            "PUBLIC" => EventScope::Public,
            "ACCOUNT_SPECIFIC" => EventScope::AccountSpecific,
            _ => EventScope::None,
        }
    }
}

impl fmt::Display for EventScope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// 事件状态
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EventStatus {
    Open,
    Upcoming,
    Closed,
}

impl EventStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            EventStatus::Open => "open",
            EventStatus::Upcoming => "upcoming",
            EventStatus::Closed => "closed",
        }
    }

    pub fn from_code(code: &str) -> Option<Self> {
        match code {
            "open" => Some(EventStatus::Open),
            "upcoming" => Some(EventStatus::Upcoming),
            "closed" => Some(EventStatus::Closed),
            _ => None,
        }
    }

    /// 未关闭的事件视为活跃
    pub fn is_active(&self) -> bool {
        !matches!(self, EventStatus::Closed)
    }
}

impl fmt::Display for EventStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// 受影响的资源
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AffectedResource {
    /// 资源标识（实例 ID、名称或 ARN，取决于资源类型）
    pub identifier: String,

    /// 类型提示（实体 ARN）
    #[serde(skip_serializing_if = "Option::is_none")]
    pub kind_hint: Option<String>,

    /// 资源所属账号
    #[serde(skip_serializing_if = "Option::is_none")]
    pub account_id: Option<String>,
}

impl AffectedResource {
    pub fn new(identifier: impl Into<String>) -> Self {
        Self {
            identifier: identifier.into(),
            kind_hint: None,
            account_id: None,
        }
    }

    pub fn with_kind_hint(mut self, kind_hint: impl Into<String>) -> Self {
        self.kind_hint = Some(kind_hint.into());
        self
    }

    pub fn with_account(mut self, account_id: impl Into<String>) -> Self {
        self.account_id = Some(account_id.into());
        self
    }
}

/// 事件列表接口返回的摘要
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawEventSummary {
    pub arn: String,
    pub type_code: String,
    pub service: String,
    pub region: String,
    pub status: Option<EventStatus>,
    pub last_updated: Option<DateTime<Utc>>,
    #[serde(default)]
    pub event_scope: EventScope,
}

impl RawEventSummary {
    pub fn new(arn: impl Into<String>) -> Self {
        Self {
            arn: arn.into(),
            type_code: String::new(),
            service: String::new(),
            region: String::new(),
            status: None,
            last_updated: None,
            event_scope: EventScope::None,
        }
    }
}

/// 事件详情接口返回的字段
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventDetail {
    pub service: String,
    pub region: String,
    pub type_code: String,
    pub category: String,
    pub status: EventStatus,
    pub event_scope: EventScope,
    pub start_time: DateTime<Utc>,
    pub end_time: Option<DateTime<Utc>>,
    pub latest_description: String,
}

/// 补全后的健康事件
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HealthEvent {
    /// 事件 ARN（唯一标识）
    pub arn: String,
    pub event_scope: EventScope,

    /// 受影响账号，保持分页返回顺序
    pub affected_accounts: Vec<String>,

    /// 受影响资源，保持分页返回顺序
    pub affected_resources: Vec<AffectedResource>,

    pub status: EventStatus,
    pub service: String,
    pub region: String,
    pub type_code: String,
    pub category: String,
    pub start_time: DateTime<Utc>,
    pub end_time: Option<DateTime<Utc>>,
    pub latest_description: String,
}

impl HealthEvent {
    /// 由详情、账号与资源组装事件
    pub fn from_detail(
        arn: impl Into<String>,
        event_scope: EventScope,
        detail: EventDetail,
        affected_accounts: Vec<String>,
        affected_resources: Vec<AffectedResource>,
    ) -> Self {
        Self {
            arn: arn.into(),
            event_scope,
            affected_accounts,
            affected_resources,
            status: detail.status,
            service: detail.service,
            region: detail.region,
            type_code: detail.type_code,
            category: detail.category,
            start_time: detail.start_time,
            end_time: detail.end_time,
            latest_description: detail.latest_description,
        }
    }

    pub fn resource_ids(&self) -> impl Iterator<Item = &str> {
        self.affected_resources.iter().map(|r| r.identifier.as_str())
    }

    pub fn is_active(&self) -> bool {
        self.status.is_active()
    }
}
