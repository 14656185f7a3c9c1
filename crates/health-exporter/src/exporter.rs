//! 抓取编排
//!
//! 每次拉取指标触发一个抓取周期：获取 → 补全 → 屏蔽 → 输出。
//! 同一时刻只允许一个周期运行，时间窗口与账号目录都由周期锁保护。

use crate::emitter::Emitter;
use crate::source::EventSource;
use chrono::{DateTime, Utc};
use chrono_tz::Tz;
use health_core::{
    AccountDirectory, EventQuery, FilterConfig, HealthApi, HealthError, OrganizationsApi, Result,
};
use health_metrics::HealthMetrics;
use health_notify::Notifier;
use health_types::{HealthEvent, ScrapeWindow};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::Mutex;
use tracing::{debug, error, info};

/// 周期间共享的可变状态
struct ScrapeState {
    /// 上一个成功周期的窗口，下一个窗口从它的 `to` 开始
    window: ScrapeWindow,

    /// 组织模式下首个周期构建，之后不再刷新
    directory: Option<AccountDirectory>,
}

/// 健康事件导出器
pub struct HealthExporter {
    health: Arc<dyn HealthApi>,
    organizations: Option<Arc<dyn OrganizationsApi>>,
    source: EventSource,
    regions: Option<Vec<String>>,
    filter: FilterConfig,
    emitter: Emitter,
    metrics: Arc<HealthMetrics>,
    deadline: Option<Duration>,
    state: Mutex<ScrapeState>,
}

impl HealthExporter {
    pub fn builder(health: Arc<dyn HealthApi>, metrics: Arc<HealthMetrics>) -> HealthExporterBuilder {
        HealthExporterBuilder::new(health, metrics)
    }

    pub fn source(&self) -> EventSource {
        self.source
    }

    pub fn metrics(&self) -> &Arc<HealthMetrics> {
        &self.metrics
    }

    /// 最近一次成功周期的窗口
    pub async fn last_window(&self) -> ScrapeWindow {
        self.state.lock().await.window
    }

    /// 执行一个抓取周期，返回未被屏蔽的事件
    ///
    /// 出错时窗口不前移；调用方应将错误视为致命错误。
    pub async fn run_cycle(&self) -> Result<Vec<HealthEvent>> {
        let mut state = self.state.lock().await;
        let started = Instant::now();

        let result = match self.deadline {
            Some(deadline) => tokio::time::timeout(deadline, self.cycle(&mut state))
                .await
                .unwrap_or(Err(HealthError::Timeout(deadline))),
            None => self.cycle(&mut state).await,
        };

        self.metrics
            .record_cycle(result.is_ok(), started.elapsed().as_secs_f64());

        if let Err(e) = &result {
            error!(error = %e, from = %state.window.to, "Scrape cycle failed");
        }
        result
    }

    async fn cycle(&self, state: &mut ScrapeState) -> Result<Vec<HealthEvent>> {
        let window = state.window.next(Utc::now());
        info!(
            from = %window.from,
            to = %window.to,
            mode = self.source.as_str(),
            "Scrape cycle started"
        );

        if self.source.is_organization() && state.directory.is_none() {
            if let Some(organizations) = &self.organizations {
                state.directory = Some(AccountDirectory::build(organizations.as_ref()).await?);
            }
        }

        let query = EventQuery::new(window, self.regions.clone());
        let summaries = self.source.fetch(self.health.as_ref(), &query).await?;

        let mut events = Vec::with_capacity(summaries.len());
        for summary in &summaries {
            events.push(self.source.enrich(self.health.as_ref(), summary).await?);
        }

        // 获取与补全全部成功后才前移窗口
        state.window = window;
        debug!(next_from = %window.to, "Scrape window advanced");

        let fetched = events.len();
        let retained: Vec<HealthEvent> = events
            .into_iter()
            .filter(|event| match self.filter.suppressed_by(event) {
                Some(rule) => {
                    self.metrics.record_suppressed(rule.as_str());
                    debug!(
                        event_arn = %event.arn,
                        type_code = %event.type_code,
                        rule = %rule,
                        "Event suppressed"
                    );
                    false
                }
                None => true,
            })
            .collect();

        self.emitter
            .emit(&retained, state.directory.as_ref())
            .await?;

        info!(fetched, retained = retained.len(), "Scrape cycle completed");
        Ok(retained)
    }
}

/// 导出器构建器
pub struct HealthExporterBuilder {
    health: Arc<dyn HealthApi>,
    organizations: Option<Arc<dyn OrganizationsApi>>,
    source: EventSource,
    regions: Option<Vec<String>>,
    filter: FilterConfig,
    metrics: Arc<HealthMetrics>,
    notifier: Option<Arc<dyn Notifier>>,
    timezone: Tz,
    deadline: Option<Duration>,
    start: Option<DateTime<Utc>>,
}

impl HealthExporterBuilder {
    pub fn new(health: Arc<dyn HealthApi>, metrics: Arc<HealthMetrics>) -> Self {
        Self {
            health,
            organizations: None,
            source: EventSource::Account,
            regions: None,
            filter: FilterConfig::default(),
            metrics,
            notifier: None,
            timezone: Tz::UTC,
            deadline: None,
            start: None,
        }
    }

    pub fn source(mut self, source: EventSource) -> Self {
        self.source = source;
        self
    }

    /// 组织模式下用于解析账号名称
    pub fn organizations(mut self, organizations: Arc<dyn OrganizationsApi>) -> Self {
        self.organizations = Some(organizations);
        self
    }

    pub fn regions(mut self, regions: Option<Vec<String>>) -> Self {
        self.regions = regions;
        self
    }

    pub fn filter(mut self, filter: FilterConfig) -> Self {
        self.filter = filter;
        self
    }

    pub fn notifier(mut self, notifier: Arc<dyn Notifier>) -> Self {
        self.notifier = Some(notifier);
        self
    }

    pub fn timezone(mut self, timezone: Tz) -> Self {
        self.timezone = timezone;
        self
    }

    pub fn deadline(mut self, deadline: Option<Duration>) -> Self {
        self.deadline = deadline;
        self
    }

    /// 首个窗口的起点，默认为构建时刻
    pub fn start(mut self, start: DateTime<Utc>) -> Self {
        self.start = Some(start);
        self
    }

    pub fn build(self) -> HealthExporter {
        let start = self.start.unwrap_or_else(Utc::now);

        let mut emitter = Emitter::new(self.metrics.clone(), self.timezone);
        if let Some(notifier) = self.notifier {
            emitter = emitter.with_notifier(notifier);
        }

        info!(
            mode = self.source.as_str(),
            start = %start,
            notifications = emitter.notifications_enabled(),
            "Health exporter initialized"
        );

        HealthExporter {
            health: self.health,
            organizations: self.organizations,
            source: self.source,
            regions: self.regions,
            filter: self.filter,
            emitter,
            metrics: self.metrics,
            deadline: self.deadline,
            state: Mutex::new(ScrapeState {
                window: ScrapeWindow::new(start, start),
                directory: None,
            }),
        }
    }
}
