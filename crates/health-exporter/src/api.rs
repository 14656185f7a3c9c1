use crate::exporter::HealthExporter;
use crate::shutdown::SignalHandler;
use axum::{
    extract::State,
    http::{header, StatusCode},
    response::{Html, IntoResponse, Response},
    routing::get,
    Router,
};
use health_metrics::CONTENT_TYPE;
use std::sync::Arc;
use tracing::error;

#[derive(Clone)]
pub struct AppState {
    pub exporter: Arc<HealthExporter>,
    pub signals: Arc<SignalHandler>,
    pub metrics_path: String,
}

pub fn create_router(state: AppState) -> Router {
    let metrics_path = state.metrics_path.clone();

    Router::new()
        .route("/", get(landing_page))
        .route("/health", get(health))
        .route(&metrics_path, get(scrape))
        .with_state(state)
}

async fn health() -> &'static str {
    "OK"
}

async fn landing_page(State(state): State<AppState>) -> Html<String> {
    Html(format!(
        "<html>\n\
         <head><title>AWS Health Exporter</title></head>\n\
         <body>\n\
         <h1>AWS Health Exporter</h1>\n\
         <p><a href=\"{}\">Metrics</a></p>\n\
         </body>\n\
         </html>\n",
        state.metrics_path
    ))
}

/// 每次请求同步执行一个抓取周期，再返回当前指标快照
async fn scrape(State(state): State<AppState>) -> Response {
    if let Err(e) = state.exporter.run_cycle().await {
        state.signals.trigger_failure(e.to_string());
        return (
            StatusCode::INTERNAL_SERVER_ERROR,
            format!("scrape cycle failed: {}", e),
        )
            .into_response();
    }

    match state.exporter.metrics().export() {
        Ok(body) => ([(header::CONTENT_TYPE, CONTENT_TYPE)], body).into_response(),
        Err(e) => {
            error!(error = %e, "Failed to encode metrics");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                format!("failed to encode metrics: {}", e),
            )
                .into_response()
        }
    }
}
