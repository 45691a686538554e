use std::sync::Arc;

use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::post,
    Router,
};
use serde_json::{json, Value};
use tracing::error;

use super::service::{HireProvisioningService, ProvisioningError};
use crate::error::AppError;
use crate::integrations::bamboohr::HrisGateway;
use crate::integrations::teamtailor::AtsGateway;

pub const TEAMTAILOR_WEBHOOK_PATH: &str = "/api/v1/webhooks/teamtailor";

/// Router exposing the TeamTailor webhook receiver.
pub fn hiring_router<A, H>(service: Arc<HireProvisioningService<A, H>>) -> Router
where
    A: AtsGateway + 'static,
    H: HrisGateway + 'static,
{
    Router::new()
        .route(TEAMTAILOR_WEBHOOK_PATH, post(webhook_handler::<A, H>))
        .with_state(service)
}

pub(crate) async fn webhook_handler<A, H>(
    State(service): State<Arc<HireProvisioningService<A, H>>>,
    axum::Json(payload): axum::Json<Value>,
) -> Response
where
    A: AtsGateway + 'static,
    H: HrisGateway + 'static,
{
    match service.handle_payload(payload).await {
        Ok(report) => (StatusCode::CREATED, axum::Json(report)).into_response(),
        Err(ProvisioningError::Ignored { .. }) => {
            let payload = json!({
                "status": "ignored",
                "reason": "not a job_application.update event at the Hired stage",
            });
            (StatusCode::ACCEPTED, axum::Json(payload)).into_response()
        }
        Err(err) => {
            if !err.is_invalid_payload() {
                error!(error = %err, "provisioning failed");
            }
            AppError::from(err).into_response()
        }
    }
}
