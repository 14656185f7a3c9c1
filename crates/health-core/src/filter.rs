use health_types::HealthEvent;
use std::collections::{BTreeSet, HashSet};
use std::fmt;

/// 命中的屏蔽规则
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SuppressionRule {
    /// 事件类型被忽略
    EventType,
    /// 所有受影响资源都被忽略
    Resource,
    /// 所有受影响资源都被 (事件类型, 资源) 对忽略
    ResourceEvent,
}

impl SuppressionRule {
    pub fn as_str(&self) -> &'static str {
        match self {
            SuppressionRule::EventType => "event_type",
            SuppressionRule::Resource => "resource",
            SuppressionRule::ResourceEvent => "resource_event",
        }
    }
}

impl fmt::Display for SuppressionRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// 屏蔽配置，启动时构建，之后只读
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FilterConfig {
    pub ignored_event_types: BTreeSet<String>,
    pub ignored_resources: BTreeSet<String>,
    /// (type_code, resource_id)
    pub ignored_resource_events: BTreeSet<(String, String)>,
}

impl FilterConfig {
    pub fn new<T, R, P>(event_types: T, resources: R, resource_events: P) -> Self
    where
        T: IntoIterator<Item = String>,
        R: IntoIterator<Item = String>,
        P: IntoIterator<Item = (String, String)>,
    {
        Self {
            ignored_event_types: event_types.into_iter().collect(),
            ignored_resources: resources.into_iter().collect(),
            ignored_resource_events: resource_events.into_iter().collect(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.ignored_event_types.is_empty()
            && self.ignored_resources.is_empty()
            && self.ignored_resource_events.is_empty()
    }

    /// 返回第一条命中的规则
    ///
    /// 多资源事件的屏蔽是全有或全无：只要还有一个资源未被忽略，整个事件照常上报。
    pub fn suppressed_by(&self, event: &HealthEvent) -> Option<SuppressionRule> {
        if self.ignored_event_types.contains(&event.type_code) {
            return Some(SuppressionRule::EventType);
        }

        if self.all_resources_ignored(event) {
            return Some(SuppressionRule::Resource);
        }

        if self.all_resources_ignored_for_type(event) {
            return Some(SuppressionRule::ResourceEvent);
        }

        None
    }

    pub fn suppressed(&self, event: &HealthEvent) -> bool {
        self.suppressed_by(event).is_some()
    }

    fn all_resources_ignored(&self, event: &HealthEvent) -> bool {
        if event.affected_resources.is_empty() || self.ignored_resources.is_empty() {
            return false;
        }

        event
            .resource_ids()
            .all(|id| self.ignored_resources.contains(id))
    }

    fn all_resources_ignored_for_type(&self, event: &HealthEvent) -> bool {
        if event.affected_resources.is_empty() {
            return false;
        }

        let covered: HashSet<&str> = self
            .ignored_resource_events
            .iter()
            .filter(|(type_code, _)| *type_code == event.type_code)
            .map(|(_, resource)| resource.as_str())
            .collect();

        if covered.is_empty() {
            return false;
        }

        event.resource_ids().all(|id| covered.contains(id))
    }
}

/// 事件是否被屏蔽
pub fn suppressed(config: &FilterConfig, event: &HealthEvent) -> bool {
    config.suppressed(event)
}
