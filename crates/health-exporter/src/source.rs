//! 事件获取与补全
//!
//! 运行模式在启动时探测一次：组织级健康访问已启用时走组织接口，否则走单账号接口。

use futures::TryStreamExt;
use health_core::{collect_items, paginate, EventQuery, HealthApi, HealthError, Result};
use health_types::{EventScope, HealthEvent, RawEventSummary};
use tracing::{debug, info, warn};

/// 受影响实体查询单次最多携带的账号数（上游过滤条件上限）
pub const ACCOUNT_BATCH_SIZE: usize = 10;

/// 事件来源
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventSource {
    /// 单账号
    Account,
    /// 整个组织
    Organization,
}

impl EventSource {
    /// 探测组织级访问；探测失败按单账号处理
    pub async fn detect(api: &dyn HealthApi) -> Self {
        let source = match api.organization_access_enabled().await {
            Ok(true) => EventSource::Organization,
            Ok(false) => EventSource::Account,
            Err(e) => {
                warn!(error = %e, "Organization access probe failed, using single-account mode");
                EventSource::Account
            }
        };

        info!(mode = source.as_str(), "Event source selected");
        source
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            EventSource::Account => "account",
            EventSource::Organization => "organization",
        }
    }

    pub fn is_organization(&self) -> bool {
        matches!(self, EventSource::Organization)
    }

    /// 取完窗口内所有事件摘要
    pub async fn fetch(
        &self,
        api: &dyn HealthApi,
        query: &EventQuery,
    ) -> Result<Vec<RawEventSummary>> {
        let summaries = match self {
            EventSource::Account => {
                collect_items(|token| api.describe_events(query, token)).await?
            }
            EventSource::Organization => {
                collect_items(|token| api.describe_events_for_organization(query, token)).await?
            }
        };

        debug!(
            mode = self.as_str(),
            count = summaries.len(),
            from = %query.window.from,
            to = %query.window.to,
            "Event summaries fetched"
        );
        Ok(summaries)
    }

    /// 补全单个事件，任一上游调用失败即返回错误
    pub async fn enrich(&self, api: &dyn HealthApi, summary: &RawEventSummary) -> Result<HealthEvent> {
        match self {
            EventSource::Account => enrich_account_event(api, &summary.arn).await,
            EventSource::Organization => enrich_organization_event(api, &summary.arn).await,
        }
    }
}

async fn enrich_account_event(api: &dyn HealthApi, arn: &str) -> Result<HealthEvent> {
    let detail = api.describe_event_details(arn).await?;
    let resources = collect_items(|token| api.describe_affected_entities(arn, token)).await?;

    // 单账号接口不返回账号列表，从实体所属账号推出，按首次出现排序
    let mut accounts: Vec<String> = Vec::new();
    for account in resources.iter().filter_map(|r| r.account_id.as_deref()) {
        if !accounts.iter().any(|a| a == account) {
            accounts.push(account.to_string());
        }
    }

    let scope = detail.event_scope;
    if scope == EventScope::AccountSpecific && accounts.is_empty() {
        return Err(HealthError::missing_field(
            "DescribeAffectedEntities",
            "awsAccountId",
        ));
    }
    Ok(HealthEvent::from_detail(arn, scope, detail, accounts, resources))
}

async fn enrich_organization_event(api: &dyn HealthApi, arn: &str) -> Result<HealthEvent> {
    // 1. 受影响账号，作用域以最后一页为准
    let (accounts, scope) = paginate(|token| api.describe_affected_accounts_for_organization(arn, token))
        .try_fold(
            (Vec::new(), EventScope::None),
            |(mut accounts, _), page| async move {
                accounts.extend(page.accounts);
                Ok((accounts, page.event_scope))
            },
        )
        .await?;

    // 2. 账号特定事件必须用一个代表账号查询详情
    let representative = match scope {
        EventScope::AccountSpecific => Some(
            accounts
                .first()
                .map(String::as_str)
                .ok_or_else(|| {
                    HealthError::missing_field(
                        "DescribeAffectedAccountsForOrganization",
                        "affectedAccounts",
                    )
                })?,
        ),
        EventScope::Public | EventScope::None => None,
    };
    let detail = api
        .describe_event_details_for_organization(arn, representative)
        .await?;

    // 3. 受影响资源，按账号分批，结果按批次顺序拼接
    let resources = if accounts.is_empty() {
        collect_items(|token| api.describe_affected_entities_for_organization(arn, &[], token))
            .await?
    } else {
        let mut resources = Vec::new();
        for batch in accounts.chunks(ACCOUNT_BATCH_SIZE) {
            let page = collect_items(|token| {
                api.describe_affected_entities_for_organization(arn, batch, token)
            })
            .await?;
            resources.extend(page);
        }
        resources
    };

    debug!(
        event_arn = %arn,
        scope = %scope,
        accounts = accounts.len(),
        resources = resources.len(),
        "Organization event enriched"
    );

    Ok(HealthEvent::from_detail(arn, scope, detail, accounts, resources))
}
