#![allow(dead_code)]

use async_trait::async_trait;
use chrono::{TimeZone, Utc};
use health_core::{
    AffectedAccountsPage, EventQuery, HealthApi, HealthError, OrganizationsApi, Page, Result,
};
use health_notify::{ChatMessage, Notifier, NotifyError};
use health_types::{
    AffectedResource, EventDetail, EventScope, EventStatus, OrganizationAccount, RawEventSummary,
    ScrapeWindow,
};
use std::collections::{HashMap, HashSet};
use std::sync::Mutex;
use std::time::Duration;

/// 上游调用记录
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Call {
    DescribeEvents {
        window: ScrapeWindow,
        regions: Option<Vec<String>>,
        token: Option<String>,
    },
    DescribeEventsForOrganization {
        window: ScrapeWindow,
        regions: Option<Vec<String>>,
        token: Option<String>,
    },
    EventDetails {
        arn: String,
    },
    EventDetailsForOrganization {
        arn: String,
        account: Option<String>,
    },
    AffectedAccounts {
        arn: String,
        token: Option<String>,
    },
    AffectedEntities {
        arn: String,
        token: Option<String>,
    },
    AffectedEntitiesForOrganization {
        arn: String,
        accounts: Vec<String>,
        token: Option<String>,
    },
}

/// 一个测试事件及其上游数据
#[derive(Debug, Clone)]
pub struct FakeEvent {
    pub arn: String,
    pub scope: EventScope,
    pub detail: EventDetail,
    pub accounts: Vec<String>,
    /// 组织模式下按账号返回的资源
    pub resources_by_account: HashMap<String, Vec<AffectedResource>>,
    /// 单账号模式或无账号时返回的资源
    pub resources: Vec<AffectedResource>,
}

impl FakeEvent {
    pub fn new(id: &str, type_code: &str, status: EventStatus) -> Self {
        Self {
            arn: format!("arn:aws:health:us-east-1::event/EC2/{}/{}", type_code, id),
            scope: EventScope::Public,
            detail: EventDetail {
                service: "EC2".to_string(),
                region: "us-east-1".to_string(),
                type_code: type_code.to_string(),
                category: "issue".to_string(),
                status,
                event_scope: EventScope::Public,
                start_time: Utc.with_ymd_and_hms(2024, 3, 1, 12, 0, 0).unwrap(),
                end_time: None,
                latest_description: format!("Description for {}", id),
            },
            accounts: Vec::new(),
            resources_by_account: HashMap::new(),
            resources: Vec::new(),
        }
    }

    pub fn account_specific(mut self, accounts: &[&str]) -> Self {
        self.scope = EventScope::AccountSpecific;
        self.detail.event_scope = EventScope::AccountSpecific;
        self.accounts = accounts.iter().map(|a| a.to_string()).collect();
        self
    }

    pub fn with_resources(mut self, resources: &[&str]) -> Self {
        self.resources = resources.iter().map(|r| AffectedResource::new(*r)).collect();
        self
    }

    pub fn with_account_resources(mut self, account: &str, resources: &[&str]) -> Self {
        self.resources_by_account.insert(
            account.to_string(),
            resources
                .iter()
                .map(|r| AffectedResource::new(*r).with_account(account))
                .collect(),
        );
        self
    }

    fn summary(&self) -> RawEventSummary {
        RawEventSummary {
            arn: self.arn.clone(),
            type_code: self.detail.type_code.clone(),
            service: self.detail.service.clone(),
            region: self.detail.region.clone(),
            status: Some(self.detail.status),
            last_updated: None,
            event_scope: self.scope,
        }
    }
}

/// 以数字下标作为令牌切页
fn paged<T: Clone>(items: &[T], token: Option<String>, size: usize) -> Page<T> {
    let start = token.and_then(|t| t.parse::<usize>().ok()).unwrap_or(0);
    let end = (start + size).min(items.len());
    let slice = items[start.min(end)..end].to_vec();

    if end < items.len() {
        Page::with_next_token(slice, end.to_string())
    } else {
        Page::last(slice)
    }
}

/// 内存中的 AWS Health 替身
pub struct FakeHealth {
    organization: Option<bool>,
    events: Vec<FakeEvent>,
    page_size: usize,
    delay: Option<Duration>,
    failing: Mutex<HashSet<&'static str>>,
    calls: Mutex<Vec<Call>>,
}

impl FakeHealth {
    pub fn new(events: Vec<FakeEvent>) -> Self {
        Self {
            organization: Some(false),
            events,
            page_size: 100,
            delay: None,
            failing: Mutex::new(HashSet::new()),
            calls: Mutex::new(Vec::new()),
        }
    }

    /// `None` 表示探测调用失败
    pub fn organization(mut self, enabled: Option<bool>) -> Self {
        self.organization = enabled;
        self
    }

    pub fn page_size(mut self, size: usize) -> Self {
        self.page_size = size;
        self
    }

    /// 事件列表调用的人为延迟
    pub fn delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    pub fn fail(&self, operation: &'static str) {
        self.failing.lock().unwrap().insert(operation);
    }

    pub fn recover(&self, operation: &'static str) {
        self.failing.lock().unwrap().remove(operation);
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    /// 每次事件列表首页调用的查询窗口
    pub fn windows(&self) -> Vec<ScrapeWindow> {
        self.calls()
            .into_iter()
            .filter_map(|call| match call {
                Call::DescribeEvents {
                    window,
                    token: None,
                    ..
                }
                | Call::DescribeEventsForOrganization {
                    window,
                    token: None,
                    ..
                } => Some(window),
                _ => None,
            })
            .collect()
    }

    fn record(&self, operation: &'static str, call: Call) -> Result<()> {
        self.calls.lock().unwrap().push(call);
        if self.failing.lock().unwrap().contains(operation) {
            return Err(HealthError::upstream(operation, "injected failure"));
        }
        Ok(())
    }

    fn event(&self, operation: &'static str, arn: &str) -> Result<&FakeEvent> {
        self.events
            .iter()
            .find(|e| e.arn == arn)
            .ok_or_else(|| HealthError::empty_result(operation, arn))
    }

    async fn list(&self, token: Option<String>) -> Page<RawEventSummary> {
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        let summaries: Vec<RawEventSummary> = self.events.iter().map(FakeEvent::summary).collect();
        paged(&summaries, token, self.page_size)
    }
}

#[async_trait]
impl HealthApi for FakeHealth {
    async fn organization_access_enabled(&self) -> Result<bool> {
        self.organization
            .ok_or_else(|| HealthError::upstream("DescribeHealthServiceStatusForOrganization", "AccessDenied"))
    }

    async fn describe_events(
        &self,
        query: &EventQuery,
        next_token: Option<String>,
    ) -> Result<Page<RawEventSummary>> {
        self.record(
            "DescribeEvents",
            Call::DescribeEvents {
                window: query.window,
                regions: query.regions.clone(),
                token: next_token.clone(),
            },
        )?;
        Ok(self.list(next_token).await)
    }

    async fn describe_events_for_organization(
        &self,
        query: &EventQuery,
        next_token: Option<String>,
    ) -> Result<Page<RawEventSummary>> {
        self.record(
            "DescribeEventsForOrganization",
            Call::DescribeEventsForOrganization {
                window: query.window,
                regions: query.regions.clone(),
                token: next_token.clone(),
            },
        )?;
        Ok(self.list(next_token).await)
    }

    async fn describe_event_details(&self, event_arn: &str) -> Result<EventDetail> {
        self.record(
            "DescribeEventDetails",
            Call::EventDetails {
                arn: event_arn.to_string(),
            },
        )?;
        Ok(self.event("DescribeEventDetails", event_arn)?.detail.clone())
    }

    async fn describe_event_details_for_organization(
        &self,
        event_arn: &str,
        account_id: Option<&str>,
    ) -> Result<EventDetail> {
        self.record(
            "DescribeEventDetailsForOrganization",
            Call::EventDetailsForOrganization {
                arn: event_arn.to_string(),
                account: account_id.map(str::to_string),
            },
        )?;
        Ok(self
            .event("DescribeEventDetailsForOrganization", event_arn)?
            .detail
            .clone())
    }

    async fn describe_affected_accounts_for_organization(
        &self,
        event_arn: &str,
        next_token: Option<String>,
    ) -> Result<AffectedAccountsPage> {
        self.record(
            "DescribeAffectedAccountsForOrganization",
            Call::AffectedAccounts {
                arn: event_arn.to_string(),
                token: next_token.clone(),
            },
        )?;
        let event = self.event("DescribeAffectedAccountsForOrganization", event_arn)?;
        let page = paged(&event.accounts, next_token, self.page_size);

        Ok(AffectedAccountsPage {
            accounts: page.items,
            event_scope: event.scope,
            next_token: page.next_token,
        })
    }

    async fn describe_affected_entities(
        &self,
        event_arn: &str,
        next_token: Option<String>,
    ) -> Result<Page<AffectedResource>> {
        self.record(
            "DescribeAffectedEntities",
            Call::AffectedEntities {
                arn: event_arn.to_string(),
                token: next_token.clone(),
            },
        )?;
        let event = self.event("DescribeAffectedEntities", event_arn)?;
        // 单账号接口：实体自带所属账号
        let resources: Vec<AffectedResource> = event
            .resources
            .iter()
            .cloned()
            .chain(event.accounts.iter().flat_map(|account| {
                event
                    .resources_by_account
                    .get(account)
                    .cloned()
                    .unwrap_or_default()
            }))
            .collect();
        Ok(paged(&resources, next_token, self.page_size))
    }

    async fn describe_affected_entities_for_organization(
        &self,
        event_arn: &str,
        account_ids: &[String],
        next_token: Option<String>,
    ) -> Result<Page<AffectedResource>> {
        self.record(
            "DescribeAffectedEntitiesForOrganization",
            Call::AffectedEntitiesForOrganization {
                arn: event_arn.to_string(),
                accounts: account_ids.to_vec(),
                token: next_token.clone(),
            },
        )?;
        let event = self.event("DescribeAffectedEntitiesForOrganization", event_arn)?;

        let resources: Vec<AffectedResource> = if account_ids.is_empty() {
            event.resources.clone()
        } else {
            account_ids
                .iter()
                .flat_map(|account| {
                    event
                        .resources_by_account
                        .get(account)
                        .cloned()
                        .unwrap_or_default()
                })
                .collect()
        };
        Ok(paged(&resources, next_token, self.page_size))
    }
}

/// 内存中的组织目录替身，每页一个账号
pub struct FakeOrganizations {
    accounts: Vec<OrganizationAccount>,
    calls: Mutex<usize>,
}

impl FakeOrganizations {
    pub fn new(accounts: &[(&str, &str)]) -> Self {
        Self {
            accounts: accounts
                .iter()
                .map(|(id, name)| OrganizationAccount::new(*id, *name))
                .collect(),
            calls: Mutex::new(0),
        }
    }

    pub fn calls(&self) -> usize {
        *self.calls.lock().unwrap()
    }
}

#[async_trait]
impl OrganizationsApi for FakeOrganizations {
    async fn list_accounts(&self, next_token: Option<String>) -> Result<Page<OrganizationAccount>> {
        *self.calls.lock().unwrap() += 1;
        Ok(paged(&self.accounts, next_token, 1))
    }
}

/// 记录消息的通知器
#[derive(Default)]
pub struct RecordingNotifier {
    messages: Mutex<Vec<ChatMessage>>,
    reject: bool,
}

impl RecordingNotifier {
    pub fn rejecting() -> Self {
        Self {
            messages: Mutex::new(Vec::new()),
            reject: true,
        }
    }

    pub fn messages(&self) -> Vec<ChatMessage> {
        self.messages.lock().unwrap().clone()
    }
}

#[async_trait]
impl Notifier for RecordingNotifier {
    async fn send(&self, message: &ChatMessage) -> std::result::Result<(), NotifyError> {
        if self.reject {
            return Err(NotifyError::Api("channel_not_found".to_string()));
        }
        self.messages.lock().unwrap().push(message.clone());
        Ok(())
    }

    fn name(&self) -> &str {
        "recording"
    }
}
