use std::sync::Arc;

use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::post,
    Router,
};
use serde_json::{json, Value};

use super::service::PayRateNotifier;
use crate::error::AppError;
use crate::integrations::bamboohr::HrisGateway;
use crate::integrations::slack::ChatNotifier;

pub const COMPENSATION_WEBHOOK_PATH: &str = "/api/v1/webhooks/bamboohr/compensation";

pub fn compensation_router<H, S>(notifier: Arc<PayRateNotifier<H, S>>) -> Router
where
    H: HrisGateway + 'static,
    S: ChatNotifier + 'static,
{
    Router::new()
        .route(COMPENSATION_WEBHOOK_PATH, post(compensation_handler::<H, S>))
        .with_state(notifier)
}

pub(crate) async fn compensation_handler<H, S>(
    State(notifier): State<Arc<PayRateNotifier<H, S>>>,
    axum::Json(payload): axum::Json<Value>,
) -> Response
where
    H: HrisGateway + 'static,
    S: ChatNotifier + 'static,
{
    match notifier.handle_payload(payload).await {
        Ok(notices) => {
            let failed = notices.iter().filter(|delivery| delivery.failed()).count();
            if failed == 0 {
                return (StatusCode::OK, axum::Json(json!({ "notices": notices }))).into_response();
            }
            let payload = json!({
                "error": format!("{failed} of {} notice(s) not delivered", notices.len()),
                "notices": notices,
            });
            (StatusCode::BAD_GATEWAY, axum::Json(payload)).into_response()
        }
        Err(err) => AppError::from(err).into_response(),
    }
}
