use anyhow::Context;
use chrono::Utc;
use clap::Parser;
use health_config::{ConfigLoader, ExporterConfig};
use health_exporter::aws::{self, AwsHealthClient, AwsOrganizationsClient};
use health_exporter::{create_router, AppState, EventSource, HealthExporter, ShutdownSignal, SignalHandler};
use health_logging::init_logging;
use health_metrics::HealthMetrics;
use health_notify::{SlackConfig, SlackNotifier};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{error, info};

#[derive(Parser, Debug)]
#[command(author, version, about = "Prometheus exporter for AWS Health events")]
struct Args {
    /// Optional TOML file with the same keys as the flags
    #[arg(long, env = "HEALTH_EXPORTER_CONFIG")]
    config: Option<PathBuf>,

    /// Address to listen on for HTTP requests
    #[arg(short = 'l', long, env = "LISTEN_ADDRESS")]
    listen_address: Option<String>,

    /// Path under which to expose metrics
    #[arg(short = 'm', long, env = "METRICS_PATH")]
    metrics_path: Option<String>,

    /// Comma separated regions, or all-regions
    #[arg(short = 'r', long, env = "REGIONS")]
    regions: Option<String>,

    #[arg(short = 'v', long, env = "LOG_LEVEL")]
    log_level: Option<String>,

    /// text or json
    #[arg(long, env = "LOG_FORMAT")]
    log_format: Option<String>,

    #[arg(long, env = "SLACK_TOKEN", hide_env_values = true)]
    slack_token: Option<String>,

    #[arg(long, env = "SLACK_CHANNEL")]
    slack_channel: Option<String>,

    /// Role ARN to assume for AWS credentials
    #[arg(long, env = "ASSUME_ROLE")]
    assume_role: Option<String>,

    /// Comma separated event type codes to ignore
    #[arg(long, env = "IGNORE_EVENTS")]
    ignore_events: Option<String>,

    /// Comma separated resource identifiers to ignore
    #[arg(long, env = "IGNORE_RESOURCES")]
    ignore_resources: Option<String>,

    /// Comma separated event_type_code:resource_id pairs to ignore
    #[arg(long, env = "IGNORE_RESOURCE_EVENT")]
    ignore_resource_event: Option<String>,

    /// IANA timezone for rendered times
    #[arg(long, env = "TZ")]
    timezone: Option<String>,

    /// Deadline for a single scrape cycle, 0s disables it
    #[arg(long, env = "SCRAPE_TIMEOUT")]
    scrape_timeout: Option<String>,

    #[arg(long, env = "TIME_SHIFT", hide = true)]
    time_shift: Option<String>,
}

impl Args {
    fn into_loader(self) -> ConfigLoader {
        let mut loader = ConfigLoader::new();
        if let Some(path) = &self.config {
            loader = loader.with_file(path);
        }

        loader
            .set_override("listen_address", self.listen_address)
            .set_override("metrics_path", self.metrics_path)
            .set_override("regions", self.regions)
            .set_override("log_level", self.log_level)
            .set_override("log_format", self.log_format)
            .set_override("slack_token", self.slack_token)
            .set_override("slack_channel", self.slack_channel)
            .set_override("assume_role", self.assume_role)
            .set_override("ignore_events", self.ignore_events)
            .set_override("ignore_resources", self.ignore_resources)
            .set_override("ignore_resource_event", self.ignore_resource_event)
            .set_override("timezone", self.timezone)
            .set_override("scrape_timeout", self.scrape_timeout)
            .set_override("time_shift", self.time_shift)
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    let settings = args.into_loader().load()?;

    // 先初始化日志，校验阶段的告警才能输出
    init_logging(&settings.log_settings()?)?;

    let config = ExporterConfig::from_settings(settings)?;
    info!(
        listen_address = %config.listen_address,
        metrics_path = %config.metrics_path,
        regions = ?config.regions,
        timezone = %config.timezone,
        "Starting AWS Health exporter"
    );

    let sdk_config = aws::load_sdk_config(config.assume_role.as_deref()).await;
    let health = Arc::new(AwsHealthClient::new(&sdk_config));
    let source = EventSource::detect(health.as_ref()).await;

    let metrics = Arc::new(HealthMetrics::new().context("failed to register metrics")?);
    let shift = chrono::Duration::from_std(config.time_shift).context("time shift out of range")?;

    let mut builder = HealthExporter::builder(health, metrics)
        .source(source)
        .regions(config.regions.clone())
        .filter(config.filter.clone())
        .timezone(config.timezone)
        .deadline(config.scrape_timeout)
        .start(Utc::now() - shift);

    if source.is_organization() {
        builder = builder.organizations(Arc::new(AwsOrganizationsClient::new(&sdk_config)));
    }
    if let Some(notification) = &config.notification {
        builder = builder.notifier(Arc::new(SlackNotifier::new(SlackConfig::new(
            notification.channel.clone(),
            notification.token.clone(),
        ))));
    }

    let (signals, mut shutdown_rx) = SignalHandler::new();
    let signals = Arc::new(signals);

    let app = create_router(AppState {
        exporter: Arc::new(builder.build()),
        signals: signals.clone(),
        metrics_path: config.metrics_path.clone(),
    });

    let system_signals = signals.clone();
    tokio::spawn(async move {
        if let Err(e) = system_signals.wait_for_system_signal().await {
            error!(error = %e, "Failed to install signal handlers");
        }
    });

    let listener = tokio::net::TcpListener::bind(config.listen_address)
        .await
        .with_context(|| format!("failed to bind {}", config.listen_address))?;
    info!(address = %config.listen_address, "HTTP server listening");

    let mut graceful_rx = signals.subscribe();
    axum::serve(listener, app)
        .with_graceful_shutdown(async move {
            let _ = graceful_rx.recv().await;
        })
        .await?;

    match shutdown_rx.try_recv() {
        Ok(ShutdownSignal::CycleFailed(reason)) => {
            anyhow::bail!("scrape cycle failed: {}", reason)
        }
        _ => {
            info!("Server stopped");
            Ok(())
        }
    }
}
