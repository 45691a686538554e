use crate::config::ConfigError;
use crate::integrations::ApiError;
use crate::telemetry::TelemetryError;
use crate::workflows::compensation::CompensationError;
use crate::workflows::hiring::ProvisioningError;
use crate::workflows::requisition::RequisitionError;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;
use std::fmt;

#[derive(Debug)]
pub enum AppError {
    Config(ConfigError),
    Telemetry(TelemetryError),
    Io(std::io::Error),
    Server(axum::Error),
    Api(ApiError),
    Json(serde_json::Error),
    /// A command needs an integration whose credentials are not configured.
    NotConfigured(&'static str),
    /// A batch command finished but some of its items failed.
    Incomplete {
        failed: usize,
        total: usize,
        what: &'static str,
    },
    Provisioning(ProvisioningError),
    Compensation(CompensationError),
    Requisition(RequisitionError),
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppError::Config(err) => write!(f, "configuration error: {}", err),
            AppError::Telemetry(err) => write!(f, "telemetry error: {}", err),
            AppError::Io(err) => write!(f, "io error: {}", err),
            AppError::Server(err) => write!(f, "server error: {}", err),
            AppError::Api(err) => write!(f, "upstream error: {}", err),
            AppError::Json(err) => write!(f, "json error: {}", err),
            AppError::NotConfigured(key) => write!(f, "{} is not configured", key),
            AppError::Incomplete {
                failed,
                total,
                what,
            } => write!(f, "{} of {} {} failed", failed, total, what),
            AppError::Provisioning(err) => write!(f, "provisioning error: {}", err),
            AppError::Compensation(err) => write!(f, "compensation error: {}", err),
            AppError::Requisition(err) => write!(f, "requisition error: {}", err),
        }
    }
}

impl std::error::Error for AppError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            AppError::Config(err) => Some(err),
            AppError::Telemetry(err) => Some(err),
            AppError::Io(err) => Some(err),
            AppError::Server(err) => Some(err),
            AppError::Api(err) => Some(err),
            AppError::Json(err) => Some(err),
            AppError::NotConfigured(_) | AppError::Incomplete { .. } => None,
            AppError::Provisioning(err) => Some(err),
            AppError::Compensation(err) => Some(err),
            AppError::Requisition(err) => Some(err),
        }
    }
}

impl AppError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            AppError::Json(_) => StatusCode::BAD_REQUEST,
            AppError::Provisioning(err) if err.is_invalid_payload() => StatusCode::BAD_REQUEST,
            AppError::Compensation(_) => StatusCode::BAD_REQUEST,
            AppError::Requisition(RequisitionError::InvalidPageId(_)) => StatusCode::BAD_REQUEST,
            AppError::Api(_)
            | AppError::Provisioning(_)
            | AppError::Requisition(_)
            | AppError::Incomplete { .. } => StatusCode::BAD_GATEWAY,
            AppError::NotConfigured(_) => StatusCode::SERVICE_UNAVAILABLE,
            AppError::Config(_)
            | AppError::Telemetry(_)
            | AppError::Io(_)
            | AppError::Server(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let body = Json(json!({ "error": self.to_string() }));
        (status, body).into_response()
    }
}

impl From<ConfigError> for AppError {
    fn from(value: ConfigError) -> Self {
        Self::Config(value)
    }
}

impl From<TelemetryError> for AppError {
    fn from(value: TelemetryError) -> Self {
        Self::Telemetry(value)
    }
}

impl From<std::io::Error> for AppError {
    fn from(value: std::io::Error) -> Self {
        Self::Io(value)
    }
}

impl From<axum::Error> for AppError {
    fn from(value: axum::Error) -> Self {
        Self::Server(value)
    }
}

impl From<ApiError> for AppError {
    fn from(value: ApiError) -> Self {
        Self::Api(value)
    }
}

impl From<serde_json::Error> for AppError {
    fn from(value: serde_json::Error) -> Self {
        Self::Json(value)
    }
}

impl From<ProvisioningError> for AppError {
    fn from(value: ProvisioningError) -> Self {
        Self::Provisioning(value)
    }
}

impl From<CompensationError> for AppError {
    fn from(value: CompensationError) -> Self {
        Self::Compensation(value)
    }
}

impl From<RequisitionError> for AppError {
    fn from(value: RequisitionError) -> Self {
        Self::Requisition(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn maps_workflow_errors_to_statuses() {
        assert_eq!(
            AppError::from(ProvisioningError::MissingJobId).status_code(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            AppError::from(ProvisioningError::MetaFields(ApiError::Decode {
                endpoint: "meta/lists".to_string(),
                detail: "expected array".to_string(),
            }))
            .status_code(),
            StatusCode::BAD_GATEWAY
        );
        assert_eq!(
            AppError::from(RequisitionError::InvalidPageId("nope".to_string())).status_code(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            AppError::NotConfigured("NOTION_API").status_code(),
            StatusCode::SERVICE_UNAVAILABLE
        );
    }

    #[test]
    fn incomplete_batches_are_failures() {
        let err = AppError::Incomplete {
            failed: 2,
            total: 5,
            what: "payload(s)",
        };
        assert_eq!(err.to_string(), "2 of 5 payload(s) failed");
        assert_eq!(err.status_code(), StatusCode::BAD_GATEWAY);
        assert_eq!(
            AppError::from(CompensationError::NoEmployees).status_code(),
            StatusCode::BAD_REQUEST
        );
    }

    #[test]
    fn display_names_the_missing_integration() {
        assert_eq!(
            AppError::NotConfigured("SLACK_WEBHOOK_URL").to_string(),
            "SLACK_WEBHOOK_URL is not configured"
        );
    }
}
