//! Slack incoming-webhook notifier.

use async_trait::async_trait;
use reqwest::header::HeaderMap;
use serde_json::Value;
use tracing::debug;

use super::{build_client, check_status, ApiError};
use crate::config::{HttpConfig, SlackConfig};

#[async_trait]
pub trait ChatNotifier: Send + Sync {
    /// Post a message body (`text` plus optional `blocks`).
    async fn post_message(&self, message: &Value) -> Result<(), ApiError>;
}

#[derive(Debug, Clone)]
pub struct SlackWebhookClient {
    http: reqwest::Client,
    webhook_url: String,
}

impl SlackWebhookClient {
    pub fn new(config: &SlackConfig, http: &HttpConfig) -> Result<Self, ApiError> {
        Ok(Self {
            http: build_client(http, HeaderMap::new())?,
            webhook_url: config.webhook_url.clone(),
        })
    }
}

#[async_trait]
impl ChatNotifier for SlackWebhookClient {
    async fn post_message(&self, message: &Value) -> Result<(), ApiError> {
        // Webhook URLs embed a secret; keep them out of logs and errors.
        let endpoint = "slack incoming webhook";
        debug!("posting slack message");
        let response = self
            .http
            .post(&self.webhook_url)
            .json(message)
            .send()
            .await
            .map_err(|source| ApiError::transport(endpoint, source.without_url()))?;
        check_status(endpoint, response, |status| status.is_success()).await?;
        Ok(())
    }
}
