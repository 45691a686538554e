use std::sync::Arc;

use chrono::Utc;
use serde::Serialize;
use serde_json::Value;
use tracing::{error, info, warn};

use super::domain::CompensationChange;
use super::history::previous_pay_rate;
use super::message::{build_notice, PayRateNotice};
use super::CompensationError;
use crate::integrations::bamboohr::HrisGateway;
use crate::integrations::slack::ChatNotifier;

/// A rendered notice and whether it reached Slack.
#[derive(Debug, Clone, Serialize)]
pub struct NoticeDelivery {
    #[serde(flatten)]
    pub notice: PayRateNotice,
    pub posted: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub delivery_error: Option<String>,
}

impl NoticeDelivery {
    pub fn failed(&self) -> bool {
        self.delivery_error.is_some()
    }
}

/// Builds pay-rate notices from BambooHR webhooks and posts them to Slack.
pub struct PayRateNotifier<H, S> {
    hris: Arc<H>,
    chat: Option<Arc<S>>,
    company_domain: String,
}

impl<H, S> PayRateNotifier<H, S>
where
    H: HrisGateway + 'static,
    S: ChatNotifier + 'static,
{
    pub fn new(hris: Arc<H>, chat: Option<Arc<S>>, company_domain: impl Into<String>) -> Self {
        Self {
            hris,
            chat,
            company_domain: company_domain.into(),
        }
    }

    /// One delivery per listed employee; a failed post does not stop the rest.
    pub async fn handle_payload(
        &self,
        payload: Value,
    ) -> Result<Vec<NoticeDelivery>, CompensationError> {
        let changes = CompensationChange::from_payload(payload)?;
        let mut deliveries = Vec::with_capacity(changes.len());
        for change in &changes {
            deliveries.push(self.notify(change).await);
        }
        Ok(deliveries)
    }

    pub async fn notify(&self, change: &CompensationChange) -> NoticeDelivery {
        let previous = match self.hris.compensation_history(&change.employee_id).await {
            Ok(rows) => previous_pay_rate(&rows, &change.effective_date),
            Err(err) => {
                warn!(employee_id = %change.employee_id, error = %err, "compensation history unavailable");
                None
            }
        };

        let notice = build_notice(change, previous.as_deref(), &self.company_domain, Utc::now());
        info!(
            employee_id = %change.employee_id,
            kind = ?notice.metadata.kind,
            "pay rate notice prepared"
        );

        let Some(chat) = &self.chat else {
            info!("slack webhook not configured; notice not posted");
            return NoticeDelivery {
                notice,
                posted: false,
                delivery_error: None,
            };
        };

        match chat.post_message(&notice.slack_message()).await {
            Ok(()) => NoticeDelivery {
                notice,
                posted: true,
                delivery_error: None,
            },
            Err(err) => {
                error!(employee_id = %change.employee_id, error = %err, "pay rate notice not delivered");
                NoticeDelivery {
                    notice,
                    posted: false,
                    delivery_error: Some(err.to_string()),
                }
            }
        }
    }
}
