use chrono::NaiveDate;
use hire_bridge::config::AppConfig;
use hire_bridge::error::AppError;
use hire_bridge::integrations::bamboohr::BambooHrClient;
use hire_bridge::integrations::notion::NotionClient;
use hire_bridge::integrations::slack::SlackWebhookClient;
use hire_bridge::integrations::teamtailor::TeamTailorClient;
use hire_bridge::workflows::compensation::PayRateNotifier;
use hire_bridge::workflows::hiring::{HireProvisioningService, ProvisioningSettings};
use hire_bridge::workflows::requisition::RequisitionSync;
use metrics_exporter_prometheus::PrometheusHandle;
use serde_json::Value;
use std::path::Path;
use std::sync::atomic::AtomicBool;
use std::sync::Arc;

pub(crate) type Provisioner = HireProvisioningService<TeamTailorClient, BambooHrClient>;
pub(crate) type Notifier = PayRateNotifier<BambooHrClient, SlackWebhookClient>;
pub(crate) type Requisitions = RequisitionSync<NotionClient, TeamTailorClient>;

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) readiness: Arc<AtomicBool>,
    pub(crate) metrics: Arc<PrometheusHandle>,
}

/// Vendor clients shared by every request; Notion and Slack are optional.
pub(crate) struct Integrations {
    ats: Arc<TeamTailorClient>,
    hris: Arc<BambooHrClient>,
    workspace: Option<Arc<NotionClient>>,
    chat: Option<Arc<SlackWebhookClient>>,
}

impl Integrations {
    pub(crate) fn connect(config: &AppConfig) -> Result<Self, AppError> {
        let ats = TeamTailorClient::new(&config.teamtailor, &config.http)?;
        let hris = BambooHrClient::new(&config.bamboohr, &config.http)?;
        let workspace = config
            .notion
            .as_ref()
            .map(|notion| NotionClient::new(notion, &config.http))
            .transpose()?;
        let chat = config
            .slack
            .as_ref()
            .map(|slack| SlackWebhookClient::new(slack, &config.http))
            .transpose()?;

        Ok(Self {
            ats: Arc::new(ats),
            hris: Arc::new(hris),
            workspace: workspace.map(Arc::new),
            chat: chat.map(Arc::new),
        })
    }

    pub(crate) fn provisioner(&self, config: &AppConfig) -> Arc<Provisioner> {
        Arc::new(HireProvisioningService::new(
            self.ats.clone(),
            self.hris.clone(),
            ProvisioningSettings::from_config(config),
        ))
    }

    pub(crate) fn notifier(&self, config: &AppConfig) -> Arc<Notifier> {
        Arc::new(PayRateNotifier::new(
            self.hris.clone(),
            self.chat.clone(),
            config.bamboohr.company_domain.clone(),
        ))
    }

    pub(crate) fn requisitions(&self, config: &AppConfig) -> Result<Requisitions, AppError> {
        let workspace = self
            .workspace
            .clone()
            .ok_or(AppError::NotConfigured("NOTION_API"))?;
        Ok(RequisitionSync::new(
            workspace,
            self.ats.clone(),
            config.teamtailor.location_id.clone(),
        ))
    }

    pub(crate) fn has_chat(&self) -> bool {
        self.chat.is_some()
    }

    /// The BambooHR client for read-only account lookups.
    pub(crate) fn hris(&self) -> Arc<BambooHrClient> {
        self.hris.clone()
    }
}

pub(crate) fn parse_date(raw: &str) -> Result<NaiveDate, String> {
    NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d")
        .map_err(|err| format!("failed to parse '{raw}' as YYYY-MM-DD ({err})"))
}

/// Read a saved webhook body from disk.
pub(crate) async fn read_payload(path: &Path) -> Result<Value, AppError> {
    let raw = tokio::fs::read_to_string(path).await?;
    Ok(serde_json::from_str(&raw)?)
}

/// A file may hold one payload or an array of them.
pub(crate) fn payload_batch(payload: Value) -> Vec<Value> {
    match payload {
        Value::Array(items) => items,
        single => vec![single],
    }
}

#[cfg(test)]
pub(crate) fn test_config(extra: &[(&str, &str)]) -> AppConfig {
    let mut values: std::collections::HashMap<String, String> = [
        ("BAMBOOHR_COMPANY_DOMAIN", "acme"),
        ("BAMBOOHR_API_KEY", "bamboo-key"),
        ("TEAMTAILOR_API_TOKEN", "tt-token"),
        ("BAMBOOHR_BASE_URL", "http://127.0.0.1:9/api/v1"),
        ("TEAMTAILOR_BASE_URL", "http://127.0.0.1:9/v1"),
    ]
    .iter()
    .map(|(key, value)| (key.to_string(), value.to_string()))
    .collect();
    for (key, value) in extra {
        values.insert(key.to_string(), value.to_string());
    }
    AppConfig::from_lookup(|key| values.get(key).cloned()).expect("test config loads")
}
