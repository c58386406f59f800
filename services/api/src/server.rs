use crate::cli::ServeArgs;
use crate::infra::AppState;
use crate::routes::analytics_routes;
use axum::Extension;
use axum_prometheus::PrometheusMetricLayer;
use lifepulse::analytics::AnalyticsEngine;
use lifepulse::config::AppConfig;
use lifepulse::error::AppError;
use lifepulse::telemetry;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tracing::info;

pub(crate) async fn run(mut args: ServeArgs) -> Result<(), AppError> {
    let mut config = AppConfig::load()?;

    if let Some(host) = args.host.take() {
        config.server.host = host;
    }
    if let Some(port) = args.port.take() {
        config.server.port = port;
    }

    telemetry::init(&config.telemetry)?;

    let engine = AnalyticsEngine::new(config.analytics.engine_config())?;
    let (prometheus_layer, prometheus_handle) = PrometheusMetricLayer::pair();
    let readiness_flag = Arc::new(AtomicBool::new(false));
    let app_state = AppState {
        readiness: readiness_flag.clone(),
        metrics: Arc::new(prometheus_handle),
        engine: Arc::new(engine),
    };

    let app = analytics_routes()
        .layer(Extension(app_state))
        .layer(prometheus_layer);

    let addr = config.server.socket_addr()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    readiness_flag.store(true, Ordering::Release);

    info!(
        ?config.environment,
        %addr,
        deadband = config.analytics.trend_deadband,
        lookback_months = config.analytics.lookback_months,
        "lifepulse analytics service ready"
    );

    axum::serve(listener, app).await?;
    Ok(())
}
