use crate::cli::ServeArgs;
use crate::infra::{AppState, Integrations};
use crate::routes::with_webhook_routes;
use axum::Extension;
use axum_prometheus::PrometheusMetricLayer;
use hire_bridge::config::AppConfig;
use hire_bridge::error::AppError;
use hire_bridge::telemetry;
use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tracing::info;

pub(crate) async fn run(config_path: Option<&Path>, mut args: ServeArgs) -> Result<(), AppError> {
    let mut config = AppConfig::load(config_path)?;

    if let Some(host) = args.host.take() {
        config.server.host = host;
    }
    if let Some(port) = args.port.take() {
        config.server.port = port;
    }

    telemetry::init(&config.telemetry)?;

    let (prometheus_layer, prometheus_handle) = PrometheusMetricLayer::pair();
    let readiness_flag = Arc::new(AtomicBool::new(false));
    let app_state = AppState {
        readiness: readiness_flag.clone(),
        metrics: Arc::new(prometheus_handle),
    };

    let integrations = Integrations::connect(&config)?;
    let app = with_webhook_routes(
        integrations.provisioner(&config),
        integrations.notifier(&config),
    )
    .layer(Extension(app_state))
    .layer(prometheus_layer);

    let addr = config.server.socket_addr()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    readiness_flag.store(true, Ordering::Release);

    info!(
        ?config.environment,
        %addr,
        test_mode = config.hiring.test_mode,
        slack = integrations.has_chat(),
        "hire bridge listening"
    );

    axum::serve(listener, app).await?;
    Ok(())
}
