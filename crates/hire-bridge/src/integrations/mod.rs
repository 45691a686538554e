//! Thin reqwest clients for the vendor APIs plus the gateway traits the
//! workflows are written against.

pub mod bamboohr;
pub(crate) mod lenient;
pub mod notion;
pub mod slack;
pub mod teamtailor;

use reqwest::header::HeaderMap;
use reqwest::{Response, StatusCode};
use serde::de::DeserializeOwned;

use crate::config::HttpConfig;

/// Failure of a single outbound vendor call.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("unable to build HTTP client: {0}")]
    Client(#[source] reqwest::Error),
    #[error("request to {endpoint} failed: {source}")]
    Transport {
        endpoint: String,
        #[source]
        source: reqwest::Error,
    },
    #[error("{endpoint} responded with {status}: {body}")]
    Status {
        endpoint: String,
        status: u16,
        body: String,
    },
    #[error("unexpected response from {endpoint}: {detail}")]
    Decode { endpoint: String, detail: String },
    #[error("{context}: {source}")]
    Io {
        context: String,
        #[source]
        source: std::io::Error,
    },
}

impl ApiError {
    /// HTTP status reported by the vendor, when the call got that far.
    pub fn status(&self) -> Option<u16> {
        match self {
            ApiError::Status { status, .. } => Some(*status),
            _ => None,
        }
    }

    pub(crate) fn transport(endpoint: &str, source: reqwest::Error) -> Self {
        ApiError::Transport {
            endpoint: endpoint.to_string(),
            source,
        }
    }

    pub(crate) fn decode(endpoint: &str, detail: impl ToString) -> Self {
        ApiError::Decode {
            endpoint: endpoint.to_string(),
            detail: detail.to_string(),
        }
    }
}

pub(crate) fn build_client(config: &HttpConfig, headers: HeaderMap) -> Result<reqwest::Client, ApiError> {
    reqwest::Client::builder()
        .timeout(config.timeout)
        .default_headers(headers)
        .build()
        .map_err(ApiError::Client)
}

/// Pass the response through when `accept` likes its status, otherwise turn
/// the body into an [`ApiError::Status`].
pub(crate) async fn check_status<F>(
    endpoint: &str,
    response: Response,
    accept: F,
) -> Result<Response, ApiError>
where
    F: Fn(StatusCode) -> bool,
{
    let status = response.status();
    if accept(status) {
        return Ok(response);
    }

    let body = response
        .text()
        .await
        .unwrap_or_else(|_| "<unreadable body>".to_string());
    Err(ApiError::Status {
        endpoint: endpoint.to_string(),
        status: status.as_u16(),
        body,
    })
}

pub(crate) async fn decode_json<T: DeserializeOwned>(
    endpoint: &str,
    response: Response,
) -> Result<T, ApiError> {
    let bytes = response
        .bytes()
        .await
        .map_err(|source| ApiError::transport(endpoint, source))?;
    serde_json::from_slice(&bytes).map_err(|err| ApiError::decode(endpoint, err))
}
