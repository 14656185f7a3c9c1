use chrono_tz::Tz;
use health_core::{AccountDirectory, Result};
use health_metrics::HealthMetrics;
use health_notify::{render_event, Notifier};
use health_types::HealthEvent;
use std::sync::Arc;
use tracing::info;

/// 将保留下来的事件写入指标，并按需发送聊天通知
pub struct Emitter {
    metrics: Arc<HealthMetrics>,
    notifier: Option<Arc<dyn Notifier>>,
    timezone: Tz,
}

impl Emitter {
    pub fn new(metrics: Arc<HealthMetrics>, timezone: Tz) -> Self {
        Self {
            metrics,
            notifier: None,
            timezone,
        }
    }

    pub fn with_notifier(mut self, notifier: Arc<dyn Notifier>) -> Self {
        self.notifier = Some(notifier);
        self
    }

    pub fn notifications_enabled(&self) -> bool {
        self.notifier.is_some()
    }

    /// 投递失败直接返回错误，不降级为只写指标
    pub async fn emit(
        &self,
        events: &[HealthEvent],
        directory: Option<&AccountDirectory>,
    ) -> Result<()> {
        for event in events {
            if let Some(notifier) = &self.notifier {
                let message = render_event(event, directory, self.timezone);
                notifier.send(&message).await?;
                info!(
                    event_arn = %event.arn,
                    status = %event.status,
                    notifier = notifier.name(),
                    "Notification sent"
                );
            }

            self.metrics.observe_event(event);
        }

        Ok(())
    }
}
