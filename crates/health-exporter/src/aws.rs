//! AWS SDK 适配器
//!
//! AWS Health 是全局服务，客户端固定使用 us-east-1。

use async_trait::async_trait;
use aws_config::sts::AssumeRoleProvider;
use aws_config::{BehaviorVersion, Region, SdkConfig};
use aws_sdk_health::error::DisplayErrorContext;
use aws_sdk_health::primitives::DateTime as SmithyDateTime;
use aws_sdk_health::types::{
    DateTimeRange, EntityFilter, Event, EventAccountFilter, EventDescription, EventFilter,
    OrganizationEvent, OrganizationEventFilter,
};
use chrono::{DateTime, Utc};
use health_core::{
    AffectedAccountsPage, EventQuery, HealthApi, HealthError, OrganizationsApi, Page, Result,
};
use health_types::{
    AffectedResource, EventDetail, EventScope, EventStatus, OrganizationAccount, RawEventSummary,
};
use tracing::info;

pub const HEALTH_REGION: &str = "us-east-1";

const SESSION_NAME: &str = "aws-health-exporter";
const ORGANIZATION_ACCESS_ENABLED: &str = "ENABLED";

/// 加载默认凭证链；指定角色时在其上叠加 STS AssumeRole
pub async fn load_sdk_config(assume_role: Option<&str>) -> SdkConfig {
    let loader = aws_config::defaults(BehaviorVersion::latest()).region(Region::new(HEALTH_REGION));

    let Some(role) = assume_role else {
        return loader.load().await;
    };

    let base = aws_config::defaults(BehaviorVersion::latest())
        .region(Region::new(HEALTH_REGION))
        .load()
        .await;
    let provider = AssumeRoleProvider::builder(role)
        .session_name(SESSION_NAME)
        .configure(&base)
        .build()
        .await;

    info!(role = %role, "Assuming role for AWS credentials");
    loader.credentials_provider(provider).load().await
}

fn to_smithy(at: DateTime<Utc>) -> SmithyDateTime {
    SmithyDateTime::from_secs_and_nanos(at.timestamp(), at.timestamp_subsec_nanos())
}

fn to_chrono(at: &SmithyDateTime) -> Option<DateTime<Utc>> {
    DateTime::from_timestamp(at.secs(), at.subsec_nanos())
}

fn time_range(query: &EventQuery) -> DateTimeRange {
    DateTimeRange::builder()
        .from(to_smithy(query.window.from))
        .to(to_smithy(query.window.to))
        .build()
}

fn upstream<E>(operation: &'static str) -> impl FnOnce(E) -> HealthError
where
    E: std::error::Error + 'static,
{
    move |err| HealthError::upstream(operation, DisplayErrorContext(&err))
}

fn account_event_summary(event: &Event) -> Result<RawEventSummary> {
    let arn = event
        .arn()
        .ok_or_else(|| HealthError::missing_field("DescribeEvents", "arn"))?;

    Ok(RawEventSummary {
        arn: arn.to_string(),
        type_code: event.event_type_code().unwrap_or_default().to_string(),
        service: event.service().unwrap_or_default().to_string(),
        region: event.region().unwrap_or_default().to_string(),
        status: event.status_code().and_then(|s| EventStatus::from_code(s.as_str())),
        last_updated: event.last_updated_time().and_then(to_chrono),
        event_scope: event
            .event_scope_code()
            .map(|s| EventScope::from_code(s.as_str()))
            .unwrap_or_default(),
    })
}

fn organization_event_summary(event: &OrganizationEvent) -> Result<RawEventSummary> {
    let arn = event
        .arn()
        .ok_or_else(|| HealthError::missing_field("DescribeEventsForOrganization", "arn"))?;

    Ok(RawEventSummary {
        arn: arn.to_string(),
        type_code: event.event_type_code().unwrap_or_default().to_string(),
        service: event.service().unwrap_or_default().to_string(),
        region: event.region().unwrap_or_default().to_string(),
        status: event.status_code().and_then(|s| EventStatus::from_code(s.as_str())),
        last_updated: event.last_updated_time().and_then(to_chrono),
        event_scope: event
            .event_scope_code()
            .map(|s| EventScope::from_code(s.as_str()))
            .unwrap_or_default(),
    })
}

fn event_detail(
    operation: &'static str,
    event: Option<&Event>,
    description: Option<&EventDescription>,
) -> Result<EventDetail> {
    let event = event.ok_or_else(|| HealthError::missing_field(operation, "event"))?;

    let status = event
        .status_code()
        .and_then(|s| EventStatus::from_code(s.as_str()))
        .ok_or_else(|| HealthError::missing_field(operation, "statusCode"))?;
    let start_time = event
        .start_time()
        .and_then(to_chrono)
        .ok_or_else(|| HealthError::missing_field(operation, "startTime"))?;

    Ok(EventDetail {
        service: event.service().unwrap_or_default().to_string(),
        region: event.region().unwrap_or_default().to_string(),
        type_code: event.event_type_code().unwrap_or_default().to_string(),
        category: event
            .event_type_category()
            .map(|c| c.as_str().to_string())
            .unwrap_or_default(),
        status,
        event_scope: event
            .event_scope_code()
            .map(|s| EventScope::from_code(s.as_str()))
            .unwrap_or_default(),
        start_time,
        end_time: event.end_time().and_then(to_chrono),
        latest_description: description
            .and_then(|d| d.latest_description())
            .unwrap_or_default()
            .to_string(),
    })
}

fn affected_resources(entities: &[aws_sdk_health::types::AffectedEntity]) -> Vec<AffectedResource> {
    entities
        .iter()
        .map(|entity| {
            let mut resource = AffectedResource::new(entity.entity_value().unwrap_or_default());
            if let Some(arn) = entity.entity_arn() {
                resource = resource.with_kind_hint(arn);
            }
            match entity.aws_account_id() {
                Some(account) => resource.with_account(account),
                None => resource,
            }
        })
        .collect()
}

fn account_filter(event_arn: &str, account_id: Option<&str>) -> Result<EventAccountFilter> {
    EventAccountFilter::builder()
        .event_arn(event_arn)
        .set_aws_account_id(account_id.map(str::to_string))
        .build()
        .map_err(|e| HealthError::Config(e.to_string()))
}

fn page<T>(items: Vec<T>, next_token: Option<&str>) -> Page<T> {
    Page {
        items,
        next_token: next_token.map(str::to_string),
    }
}

/// AWS Health 客户端
#[derive(Debug, Clone)]
pub struct AwsHealthClient {
    client: aws_sdk_health::Client,
}

impl AwsHealthClient {
    pub fn new(config: &SdkConfig) -> Self {
        Self {
            client: aws_sdk_health::Client::new(config),
        }
    }
}

#[async_trait]
impl HealthApi for AwsHealthClient {
    async fn organization_access_enabled(&self) -> Result<bool> {
        let output = self
            .client
            .describe_health_service_status_for_organization()
            .send()
            .await
            .map_err(upstream("DescribeHealthServiceStatusForOrganization"))?;

        Ok(output.health_service_access_status_for_organization()
            == Some(ORGANIZATION_ACCESS_ENABLED))
    }

    async fn describe_events(
        &self,
        query: &EventQuery,
        next_token: Option<String>,
    ) -> Result<Page<RawEventSummary>> {
        let filter = EventFilter::builder()
            .last_updated_times(time_range(query))
            .set_regions(query.regions.clone())
            .build();

        let output = self
            .client
            .describe_events()
            .filter(filter)
            .set_next_token(next_token)
            .send()
            .await
            .map_err(upstream("DescribeEvents"))?;

        let items = output
            .events()
            .iter()
            .map(account_event_summary)
            .collect::<Result<Vec<_>>>()?;
        Ok(page(items, output.next_token()))
    }

    async fn describe_events_for_organization(
        &self,
        query: &EventQuery,
        next_token: Option<String>,
    ) -> Result<Page<RawEventSummary>> {
        let filter = OrganizationEventFilter::builder()
            .last_updated_time(time_range(query))
            .set_regions(query.regions.clone())
            .build();

        let output = self
            .client
            .describe_events_for_organization()
            .filter(filter)
            .set_next_token(next_token)
            .send()
            .await
            .map_err(upstream("DescribeEventsForOrganization"))?;

        let items = output
            .events()
            .iter()
            .map(organization_event_summary)
            .collect::<Result<Vec<_>>>()?;
        Ok(page(items, output.next_token()))
    }

    async fn describe_event_details(&self, event_arn: &str) -> Result<EventDetail> {
        const OPERATION: &str = "DescribeEventDetails";

        let output = self
            .client
            .describe_event_details()
            .event_arns(event_arn)
            .send()
            .await
            .map_err(upstream(OPERATION))?;

        let details = output
            .successful_set()
            .first()
            .ok_or_else(|| HealthError::empty_result(OPERATION, event_arn))?;
        event_detail(OPERATION, details.event(), details.event_description())
    }

    async fn describe_event_details_for_organization(
        &self,
        event_arn: &str,
        account_id: Option<&str>,
    ) -> Result<EventDetail> {
        const OPERATION: &str = "DescribeEventDetailsForOrganization";

        let output = self
            .client
            .describe_event_details_for_organization()
            .organization_event_detail_filters(account_filter(event_arn, account_id)?)
            .send()
            .await
            .map_err(upstream(OPERATION))?;

        let details = output
            .successful_set()
            .first()
            .ok_or_else(|| HealthError::empty_result(OPERATION, event_arn))?;
        event_detail(OPERATION, details.event(), details.event_description())
    }

    async fn describe_affected_accounts_for_organization(
        &self,
        event_arn: &str,
        next_token: Option<String>,
    ) -> Result<AffectedAccountsPage> {
        let output = self
            .client
            .describe_affected_accounts_for_organization()
            .event_arn(event_arn)
            .set_next_token(next_token)
            .send()
            .await
            .map_err(upstream("DescribeAffectedAccountsForOrganization"))?;

        Ok(AffectedAccountsPage {
            accounts: output.affected_accounts().to_vec(),
            event_scope: output
                .event_scope_code()
                .map(|s| EventScope::from_code(s.as_str()))
                .unwrap_or_default(),
            next_token: output.next_token().map(str::to_string),
        })
    }

    async fn describe_affected_entities(
        &self,
        event_arn: &str,
        next_token: Option<String>,
    ) -> Result<Page<AffectedResource>> {
        let filter = EntityFilter::builder()
            .event_arns(event_arn)
            .build()
            .map_err(|e| HealthError::Config(e.to_string()))?;

        let output = self
            .client
            .describe_affected_entities()
            .filter(filter)
            .set_next_token(next_token)
            .send()
            .await
            .map_err(upstream("DescribeAffectedEntities"))?;

        Ok(page(affected_resources(output.entities()), output.next_token()))
    }

    async fn describe_affected_entities_for_organization(
        &self,
        event_arn: &str,
        account_ids: &[String],
        next_token: Option<String>,
    ) -> Result<Page<AffectedResource>> {
        let filters = if account_ids.is_empty() {
            vec![account_filter(event_arn, None)?]
        } else {
            account_ids
                .iter()
                .map(|account| account_filter(event_arn, Some(account)))
                .collect::<Result<Vec<_>>>()?
        };

        let output = self
            .client
            .describe_affected_entities_for_organization()
            .set_organization_entity_filters(Some(filters))
            .set_next_token(next_token)
            .send()
            .await
            .map_err(upstream("DescribeAffectedEntitiesForOrganization"))?;

        Ok(page(affected_resources(output.entities()), output.next_token()))
    }
}

/// AWS Organizations 客户端
#[derive(Debug, Clone)]
pub struct AwsOrganizationsClient {
    client: aws_sdk_organizations::Client,
}

impl AwsOrganizationsClient {
    pub fn new(config: &SdkConfig) -> Self {
        Self {
            client: aws_sdk_organizations::Client::new(config),
        }
    }
}

#[async_trait]
impl OrganizationsApi for AwsOrganizationsClient {
    async fn list_accounts(&self, next_token: Option<String>) -> Result<Page<OrganizationAccount>> {
        let output = self
            .client
            .list_accounts()
            .set_next_token(next_token)
            .send()
            .await
            .map_err(|e| {
                HealthError::upstream(
                    "ListAccounts",
                    aws_sdk_organizations::error::DisplayErrorContext(&e),
                )
            })?;

        let items = output
            .accounts()
            .iter()
            .filter_map(|account| {
                let id = account.id()?;
                Some(OrganizationAccount::new(id, account.name().unwrap_or(id)))
            })
            .collect();
        Ok(page(items, output.next_token()))
    }
}
