//! 上游协作方接口
//!
//! 每个方法对应一次上游调用（分页接口对应一页），由 AWS SDK 适配器或测试替身实现。

use crate::error::Result;
use crate::pagination::{Page, Paginated};
use async_trait::async_trait;
use health_types::{
    AffectedResource, EventDetail, EventScope, OrganizationAccount, RawEventSummary, ScrapeWindow,
};

/// 事件列表查询条件
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EventQuery {
    /// 按 lastUpdatedTime 过滤的时间窗口
    pub window: ScrapeWindow,

    /// 区域过滤，`None` 表示不过滤
    pub regions: Option<Vec<String>>,
}

impl EventQuery {
    pub fn new(window: ScrapeWindow, regions: Option<Vec<String>>) -> Self {
        Self { window, regions }
    }
}

/// 组织模式下受影响账号的一页
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AffectedAccountsPage {
    pub accounts: Vec<String>,
    pub event_scope: EventScope,
    pub next_token: Option<String>,
}

impl Paginated for AffectedAccountsPage {
    fn next_token(&self) -> Option<&str> {
        self.next_token.as_deref()
    }
}

/// 健康事件服务
#[async_trait]
pub trait HealthApi: Send + Sync {
    /// 组织级健康访问是否已启用
    async fn organization_access_enabled(&self) -> Result<bool>;

    async fn describe_events(
        &self,
        query: &EventQuery,
        next_token: Option<String>,
    ) -> Result<Page<RawEventSummary>>;

    async fn describe_events_for_organization(
        &self,
        query: &EventQuery,
        next_token: Option<String>,
    ) -> Result<Page<RawEventSummary>>;

    async fn describe_event_details(&self, event_arn: &str) -> Result<EventDetail>;

    /// `account_id` 仅在账号特定事件时提供
    async fn describe_event_details_for_organization(
        &self,
        event_arn: &str,
        account_id: Option<&str>,
    ) -> Result<EventDetail>;

    async fn describe_affected_accounts_for_organization(
        &self,
        event_arn: &str,
        next_token: Option<String>,
    ) -> Result<AffectedAccountsPage>;

    async fn describe_affected_entities(
        &self,
        event_arn: &str,
        next_token: Option<String>,
    ) -> Result<Page<AffectedResource>>;

    /// `account_ids` 为空时仅按事件 ARN 过滤，否则最多 10 个账号
    async fn describe_affected_entities_for_organization(
        &self,
        event_arn: &str,
        account_ids: &[String],
        next_token: Option<String>,
    ) -> Result<Page<AffectedResource>>;
}

/// 组织目录服务
#[async_trait]
pub trait OrganizationsApi: Send + Sync {
    async fn list_accounts(&self, next_token: Option<String>) -> Result<Page<OrganizationAccount>>;
}
