use crate::message::{Attachment, AttachmentField, ChatMessage};
use chrono::{DateTime, Utc};
use chrono_tz::Tz;
use health_core::AccountDirectory;
use health_types::{AffectedResource, EventStatus, HealthEvent};

pub const ALL_ACCOUNTS: &str = "All accounts in region";
pub const ALL_RESOURCES: &str = "All resources in region";

/// 上游无法识别资源时返回的占位值
const UNKNOWN_RESOURCE: &str = "UNKNOWN";

const RESOLVED_COLOR: &str = "18be52";
const NEW_ISSUE_COLOR: &str = "danger";

/// 消息模板
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Template {
    /// 新问题：告警图标，红色
    NewIssue,
    /// 已解决：勾选图标，绿色，附带结束时间
    Resolved,
}

impl Template {
    pub fn for_status(status: EventStatus) -> Self {
        match status {
            EventStatus::Closed => Template::Resolved,
            EventStatus::Open | EventStatus::Upcoming => Template::NewIssue,
        }
    }

    pub fn color(&self) -> &'static str {
        match self {
            Template::NewIssue => NEW_ISSUE_COLOR,
            Template::Resolved => RESOLVED_COLOR,
        }
    }

    pub fn title(&self, service: &str, region: &str) -> String {
        match self {
            Template::NewIssue => format!(
                ":rotating_light:*[NEW] AWS Health reported an issue with the {} service in the {} region.*",
                service, region
            ),
            Template::Resolved => format!(
                ":heavy_check_mark:*[RESOLVED] The AWS Health issue with the {} service in the {} region is now resolved.*",
                service, region
            ),
        }
    }
}

/// 账号摘要：组织模式解析为显示名称，单账号模式使用原始 ID
pub fn account_summary(accounts: &[String], directory: Option<&AccountDirectory>) -> String {
    if accounts.is_empty() {
        return ALL_ACCOUNTS.to_string();
    }

    match directory {
        Some(directory) => directory.display_names(accounts).join(","),
        None => accounts.join(","),
    }
}

pub fn resource_summary(resources: &[AffectedResource]) -> String {
    let joined = resources
        .iter()
        .map(|r| r.identifier.as_str())
        .collect::<Vec<_>>()
        .join(",");

    if joined.is_empty() || joined == UNKNOWN_RESOURCE {
        return ALL_RESOURCES.to_string();
    }

    format!("`{}`", joined)
}

/// 按配置时区输出，格式与 `2024-01-02 15:04:05 -0300 -03` 一致
pub fn format_time(at: &DateTime<Utc>, timezone: Tz) -> String {
    at.with_timezone(&timezone)
        .format("%Y-%m-%d %H:%M:%S %z %Z")
        .to_string()
}

/// 渲染单个事件的通知
pub fn render_event(
    event: &HealthEvent,
    directory: Option<&AccountDirectory>,
    timezone: Tz,
) -> ChatMessage {
    let template = Template::for_status(event.status);

    let mut fields = vec![
        AttachmentField::short(
            "Account(s)",
            account_summary(&event.affected_accounts, directory),
        ),
        AttachmentField::short("Resource(s)", resource_summary(&event.affected_resources)),
        AttachmentField::short("Service", event.service.as_str()),
        AttachmentField::short("Region", event.region.as_str()),
        AttachmentField::short("Start Time", format_time(&event.start_time, timezone)),
        AttachmentField::short("Status", event.status.as_str()),
    ];

    if template == Template::Resolved {
        let end_time = event
            .end_time
            .as_ref()
            .map(|at| format_time(at, timezone))
            .unwrap_or_else(|| "-".to_string());
        fields.push(AttachmentField::short("End Time", end_time));
    }

    fields.push(AttachmentField::long("Event ARN", format!("`{}`", event.arn)));
    fields.push(AttachmentField::long(
        "Updates",
        event.latest_description.as_str(),
    ));

    ChatMessage::new(
        template.title(&event.service, &event.region),
        Attachment {
            color: template.color().to_string(),
            fields,
        },
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use health_types::{EventScope, OrganizationAccount};

    fn event(status: EventStatus) -> HealthEvent {
        HealthEvent {
            arn: "arn:aws:health:us-east-1::event/EC2/AWS_EC2_OPERATIONAL_ISSUE/abc".to_string(),
            event_scope: EventScope::Public,
            affected_accounts: vec![],
            affected_resources: vec![],
            status,
            service: "EC2".to_string(),
            region: "us-east-1".to_string(),
            type_code: "AWS_EC2_OPERATIONAL_ISSUE".to_string(),
            category: "issue".to_string(),
            start_time: Utc.with_ymd_and_hms(2024, 3, 1, 12, 30, 0).unwrap(),
            end_time: None,
            latest_description: "We are investigating increased API error rates.".to_string(),
        }
    }

    #[test]
    fn test_new_issue_region_wide() {
        let message = render_event(&event(EventStatus::Open), None, Tz::UTC);

        assert!(message.text.starts_with(":rotating_light:"));
        assert!(message.text.contains("reported an issue with the EC2 service in the us-east-1 region"));
        assert_eq!(message.attachments[0].color, "danger");
        assert_eq!(message.field("Account(s)").unwrap().value, ALL_ACCOUNTS);
        assert_eq!(message.field("Resource(s)").unwrap().value, ALL_RESOURCES);
        assert!(message.field("End Time").is_none());
        assert_eq!(
            message.field_titles(),
            vec![
                "Account(s)",
                "Resource(s)",
                "Service",
                "Region",
                "Start Time",
                "Status",
                "Event ARN",
                "Updates"
            ]
        );
    }

    #[test]
    fn test_resolved_without_end_time() {
        let mut closed = event(EventStatus::Closed);
        closed.affected_accounts = vec!["111111111111".to_string()];
        let message = render_event(&closed, None, Tz::UTC);

        assert!(message.text.starts_with(":heavy_check_mark:"));
        assert!(message.text.contains("is now resolved"));
        assert_eq!(message.attachments[0].color, "18be52");
        assert_eq!(message.field("End Time").unwrap().value, "-");
        assert_eq!(message.field("Account(s)").unwrap().value, "111111111111");

        let titles = message.field_titles();
        let status = titles.iter().position(|t| *t == "Status").unwrap();
        assert_eq!(titles[status + 1], "End Time");
        assert_eq!(titles.len(), 9);
    }

    #[test]
    fn test_resolved_with_end_time_in_timezone() {
        let mut closed = event(EventStatus::Closed);
        closed.end_time = Some(Utc.with_ymd_and_hms(2024, 3, 1, 15, 0, 0).unwrap());
        let message = render_event(&closed, None, chrono_tz::America::Sao_Paulo);

        assert_eq!(
            message.field("End Time").unwrap().value,
            "2024-03-01 12:00:00 -0300 -03"
        );
        assert_eq!(
            message.field("Start Time").unwrap().value,
            "2024-03-01 09:30:00 -0300 -03"
        );
    }

    #[test]
    fn test_arn_is_quoted() {
        let message = render_event(&event(EventStatus::Upcoming), None, Tz::UTC);
        let arn = message.field("Event ARN").unwrap();
        assert_eq!(
            arn.value,
            "`arn:aws:health:us-east-1::event/EC2/AWS_EC2_OPERATIONAL_ISSUE/abc`"
        );
        assert!(!arn.short);
    }

    #[test]
    fn test_account_names_resolved_through_directory() {
        let directory = AccountDirectory::from_accounts(vec![OrganizationAccount::new(
            "111111111111",
            "production",
        )]);
        let accounts = vec!["111111111111".to_string(), "222222222222".to_string()];

        assert_eq!(
            account_summary(&accounts, Some(&directory)),
            "production,222222222222"
        );
        assert_eq!(account_summary(&accounts, None), "111111111111,222222222222");
    }

    #[test]
    fn test_resource_summary() {
        assert_eq!(resource_summary(&[]), ALL_RESOURCES);
        assert_eq!(
            resource_summary(&[AffectedResource::new(UNKNOWN_RESOURCE)]),
            ALL_RESOURCES
        );
        assert_eq!(
            resource_summary(&[AffectedResource::new("i-1"), AffectedResource::new("i-2")]),
            "`i-1,i-2`"
        );
    }
}
