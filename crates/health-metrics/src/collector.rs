use health_types::HealthEvent;
use prometheus::{
    CounterVec, Encoder, GaugeVec, Histogram, HistogramOpts, Opts, Registry, TextEncoder,
};
use tracing::debug;

/// 指标命名空间
pub const NAMESPACE: &str = "aws_health";

/// 文本暴露格式的 Content-Type
pub const CONTENT_TYPE: &str = "text/plain; version=0.0.4";

const EVENT_LABELS: &[&str] = &[
    "region",
    "service",
    "event_scope",
    "category",
    "type_code",
    "account",
];

/// 健康事件指标
pub struct HealthMetrics {
    // 事件指标
    events: GaugeVec,
    events_suppressed_total: CounterVec,

    // 抓取指标
    scrape_cycles_total: CounterVec,
    scrape_duration: Histogram,

    registry: Registry,
}

impl HealthMetrics {
    pub fn new() -> Result<Self, prometheus::Error> {
        let registry = Registry::new();

        let events = GaugeVec::new(
            Opts::new(
                "events",
                "AWS Health events updated during the last scrape window (1 = open/upcoming, 0 = closed)",
            )
            .namespace(NAMESPACE),
            EVENT_LABELS,
        )?;
        registry.register(Box::new(events.clone()))?;

        let events_suppressed_total = CounterVec::new(
            Opts::new("events_suppressed_total", "Events dropped by ignore rules")
                .namespace(NAMESPACE),
            &["rule"],
        )?;
        registry.register(Box::new(events_suppressed_total.clone()))?;

        let scrape_cycles_total = CounterVec::new(
            Opts::new("scrape_cycles_total", "Completed scrape cycles").namespace(NAMESPACE),
            &["outcome"],
        )?;
        registry.register(Box::new(scrape_cycles_total.clone()))?;

        let scrape_duration = Histogram::with_opts(
            HistogramOpts::new("scrape_duration_seconds", "Duration of a scrape cycle")
                .namespace(NAMESPACE)
                .buckets(vec![0.1, 0.5, 1.0, 2.5, 5.0, 10.0, 30.0, 60.0]),
        )?;
        registry.register(Box::new(scrape_duration.clone()))?;

        #[cfg(target_os = "linux")]
        registry.register(Box::new(
            prometheus::process_collector::ProcessCollector::for_self(),
        ))?;

        Ok(Self {
            events,
            events_suppressed_total,
            scrape_cycles_total,
            scrape_duration,
            registry,
        })
    }

    /// 每个受影响账号记录一个观测值；没有账号时记录一个 `account` 为空串的观测值
    ///
    /// 标签集是固定的，空串在抓取端与缺失标签等价
    pub fn observe_event(&self, event: &HealthEvent) {
        let value = if event.is_active() { 1.0 } else { 0.0 };
        let scope = event.event_scope.as_str();

        let observe = |account: &str| {
            self.events
                .with_label_values(&[
                    event.region.as_str(),
                    event.service.as_str(),
                    scope,
                    event.category.as_str(),
                    event.type_code.as_str(),
                    account,
                ])
                .set(value);
        };

        if event.affected_accounts.is_empty() {
            observe("");
        } else {
            for account in &event.affected_accounts {
                observe(account);
            }
        }

        debug!(
            event_arn = %event.arn,
            accounts = event.affected_accounts.len(),
            value,
            "Event gauge observed"
        );
    }

    pub fn record_suppressed(&self, rule: &str) {
        self.events_suppressed_total.with_label_values(&[rule]).inc();
    }

    pub fn record_cycle(&self, success: bool, duration_secs: f64) {
        let outcome = if success { "success" } else { "failure" };
        self.scrape_cycles_total.with_label_values(&[outcome]).inc();
        self.scrape_duration.observe(duration_secs);
    }

    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    /// 以文本暴露格式导出当前快照
    pub fn export(&self) -> Result<String, prometheus::Error> {
        let encoder = TextEncoder::new();
        let metric_families = self.registry.gather();
        let mut buffer = Vec::new();
        encoder.encode(&metric_families, &mut buffer)?;
        String::from_utf8(buffer).map_err(|e| prometheus::Error::Msg(e.to_string()))
    }
}
