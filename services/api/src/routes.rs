use crate::infra::AppState;
use axum::http::{header, StatusCode};
use axum::response::IntoResponse;
use axum::routing::get;
use axum::{Extension, Json, Router};
use hire_bridge::integrations::bamboohr::HrisGateway;
use hire_bridge::integrations::slack::ChatNotifier;
use hire_bridge::integrations::teamtailor::AtsGateway;
use hire_bridge::workflows::compensation::{compensation_router, PayRateNotifier};
use hire_bridge::workflows::hiring::{hiring_router, HireProvisioningService};
use serde_json::json;
use std::sync::atomic::Ordering;
use std::sync::Arc;

pub(crate) fn with_webhook_routes<A, H, S>(
    provisioner: Arc<HireProvisioningService<A, H>>,
    notifier: Arc<PayRateNotifier<H, S>>,
) -> Router
where
    A: AtsGateway + 'static,
    H: HrisGateway + 'static,
    S: ChatNotifier + 'static,
{
    hiring_router(provisioner)
        .merge(compensation_router(notifier))
        .route("/health", get(healthcheck))
        .route("/ready", get(readiness_endpoint))
        .route("/metrics", get(metrics_endpoint))
}

pub(crate) async fn healthcheck() -> Json<serde_json::Value> {
    Json(json!({ "status": "ok" }))
}

pub(crate) async fn readiness_endpoint(Extension(state): Extension<AppState>) -> impl IntoResponse {
    if state.readiness.load(Ordering::Relaxed) {
        (StatusCode::OK, Json(json!({ "status": "ready" })))
    } else {
        (
            StatusCode::SERVICE_UNAVAILABLE,
            Json(json!({ "status": "starting" })),
        )
    }
}

pub(crate) async fn metrics_endpoint(Extension(state): Extension<AppState>) -> impl IntoResponse {
    (
        StatusCode::OK,
        [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
        state.metrics.render(),
    )
}
